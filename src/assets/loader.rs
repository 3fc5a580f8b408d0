use std::sync::Arc;

use rayon::prelude::*;

use crate::assets::decode::{DecodedImage, decode_image};
use crate::assets::source::{FetchOpts, ImageSource, read_source_bytes};
use crate::foundation::error::{ReelError, ReelResult};

/// Fetches and decodes image sources concurrently, all-or-nothing.
pub struct AssetLoader {
    pool: Option<rayon::ThreadPool>,
    fetch: FetchOpts,
}

impl AssetLoader {
    /// Loader on rayon's global pool (`threads = None`) or a dedicated pool.
    pub fn new(threads: Option<usize>, fetch: FetchOpts) -> ReelResult<Self> {
        let pool = match threads {
            None => None,
            Some(n) => Some(build_thread_pool(n)?),
        };
        Ok(Self { pool, fetch })
    }

    /// Decode every source, preserving order.
    ///
    /// All decodes run to completion before the result is assembled. If any fails, the whole
    /// load fails with the error of the lowest failing index and no images are returned.
    #[tracing::instrument(skip_all, fields(count = sources.len()))]
    pub fn load_all(&self, sources: &[ImageSource]) -> ReelResult<Vec<Arc<DecodedImage>>> {
        let run = || -> Vec<ReelResult<Arc<DecodedImage>>> {
            sources
                .par_iter()
                .enumerate()
                .map(|(index, source)| self.load_one(index, source))
                .collect()
        };
        let settled = match &self.pool {
            Some(pool) => pool.install(run),
            None => run(),
        };

        let images = settled.into_iter().collect::<ReelResult<Vec<_>>>()?;
        tracing::info!(images = images.len(), "all images decoded");
        Ok(images)
    }

    fn load_one(&self, index: usize, source: &ImageSource) -> ReelResult<Arc<DecodedImage>> {
        let fail = |e: ReelError| ReelError::image_load(index, source.label(), e.to_string());
        let bytes = read_source_bytes(source, &self.fetch).map_err(fail)?;
        let image = decode_image(&bytes).map_err(fail)?;
        tracing::debug!(
            index,
            width = image.width,
            height = image.height,
            "decoded image"
        );
        Ok(Arc::new(image))
    }
}

fn build_thread_pool(threads: usize) -> ReelResult<rayon::ThreadPool> {
    if threads == 0 {
        return Err(ReelError::validation("loader threads must be > 0"));
    }
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("lovereel-decode-{i}"))
        .build()
        .map_err(|e| ReelError::validation(format!("failed to build decode thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/loader.rs"]
mod tests;
