use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context as _;

use crate::config::ExportConfig;
use crate::foundation::core::{Canvas, Rgba8};
use crate::foundation::error::{ReelError, ReelResult};

/// Reference canvas height the baseline offsets below were laid out for.
const REFERENCE_HEIGHT: f64 = 1280.0;
/// Subtitle baseline, measured up from the bottom edge at the reference height.
const SUBTITLE_BASELINE_FROM_BOTTOM: f64 = 150.0;
/// Caption baseline, measured up from the bottom edge at the reference height.
const CAPTION_BASELINE_FROM_BOTTOM: f64 = 70.0;

/// Caption overlay rasterized once per export, as premultiplied RGBA8 at canvas size.
///
/// The overlay text never changes during an export, so it is drawn on top of every frame
/// from this cached raster.
#[derive(Clone, Debug)]
pub struct CaptionOverlay {
    /// Overlay width in pixels (equals the canvas width).
    pub width: u32,
    /// Overlay height in pixels (equals the canvas height).
    pub height: u32,
    /// Premultiplied RGBA8 pixels.
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl CaptionOverlay {
    /// Lay out and rasterize the subtitle and `caption` for `cfg.canvas`.
    #[tracing::instrument(skip(cfg), fields(canvas = ?cfg.canvas))]
    pub fn render(caption: &str, cfg: &ExportConfig) -> ReelResult<Self> {
        let svg = overlay_svg(caption, cfg);
        let fontdb = build_fontdb(cfg.font_dir.as_deref());
        tracing::debug!(faces = fontdb.len(), "overlay font database ready");

        let opts = usvg::Options {
            fontdb,
            font_resolver: make_font_resolver(),
            ..Default::default()
        };
        let tree = usvg::Tree::from_data(svg.as_bytes(), &opts).context("parse overlay svg")?;

        let Canvas { width, height } = cfg.canvas;
        let rgba8_premul = rasterize_premul_rgba8(&tree, width, height)?;
        Ok(Self {
            width,
            height,
            rgba8_premul: Arc::new(rgba8_premul),
        })
    }

    /// True when no pixel of the overlay is visible.
    pub fn is_blank(&self) -> bool {
        self.rgba8_premul.chunks_exact(4).all(|px| px[3] == 0)
    }
}

/// SVG document for the overlay: subtitle line above the caption, both centered, with a soft
/// black shadow.
pub(crate) fn overlay_svg(caption: &str, cfg: &ExportConfig) -> String {
    let Canvas { width, height } = cfg.canvas;
    let w = f64::from(width);
    let h = f64::from(height);
    let k = h / REFERENCE_HEIGHT;
    let cx = w / 2.0;
    let subtitle_y = h - SUBTITLE_BASELINE_FROM_BOTTOM * k;
    let caption_y = h - CAPTION_BASELINE_FROM_BOTTOM * k;

    let mut svg = String::with_capacity(1024);
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
    );

    // Canvas shadowBlur is twice the gaussian standard deviation.
    let sigma = f64::from(cfg.shadow_blur_px) / 2.0;
    let group_filter = if sigma > 0.0 {
        let _ = write!(
            svg,
            r##"<defs><filter id="shadow" x="-50%" y="-50%" width="200%" height="200%"><feDropShadow dx="0" dy="0" stdDeviation="{sigma}" flood-color="#000000" flood-opacity="1"/></filter></defs>"##
        );
        r#" filter="url(#shadow)""#
    } else {
        ""
    };

    let _ = write!(svg, r#"<g text-anchor="middle"{group_filter}>"#);
    if !cfg.subtitle.trim().is_empty() {
        let _ = write!(
            svg,
            r#"<text x="{cx}" y="{subtitle_y}" font-family="serif" font-size="{}" {}>{}</text>"#,
            cfg.subtitle_size_px,
            fill_attrs(cfg.subtitle_color),
            xml_escape(&cfg.subtitle)
        );
    }
    if !caption.trim().is_empty() {
        let _ = write!(
            svg,
            r#"<text x="{cx}" y="{caption_y}" font-family="cursive" font-weight="bold" font-size="{}" {}>{}</text>"#,
            cfg.caption_size_px,
            fill_attrs(cfg.caption_color),
            xml_escape(caption)
        );
    }
    svg.push_str("</g></svg>");
    svg
}

fn fill_attrs(c: Rgba8) -> String {
    let hex = format!("#{:02x}{:02x}{:02x}", c.r, c.g, c.b);
    if c.a == 255 {
        format!(r#"fill="{hex}""#)
    } else {
        format!(r#"fill="{hex}" fill-opacity="{:.4}""#, f64::from(c.a) / 255.0)
    }
}

/// Escape text for use as SVG character data or attribute values.
pub(crate) fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    out
}

fn rasterize_premul_rgba8(tree: &usvg::Tree, width: u32, height: u32) -> ReelResult<Vec<u8>> {
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| ReelError::validation("failed to allocate overlay pixmap"))?;

    let sx = (width as f32) / tree.size().width();
    let sy = (height as f32) / tree.size().height();
    let xform = resvg::tiny_skia::Transform::from_scale(sx, sy);

    resvg::render(tree, xform, &mut pixmap.as_mut());
    Ok(pixmap.data().to_vec())
}

fn build_fontdb(font_dir: Option<&Path>) -> Arc<usvg::fontdb::Database> {
    let mut db = usvg::fontdb::Database::new();
    db.load_system_fonts();
    if let Some(dir) = font_dir {
        db.load_fonts_dir(dir);
        tracing::debug!(dir = %dir.display(), faces = db.len(), "loaded caption fonts");
    }
    Arc::new(db)
}

/// The overlay only asks for the `serif` and `cursive` generics. Anything the database cannot
/// match falls back to the first installed face.
fn make_font_resolver() -> usvg::FontResolver<'static> {
    usvg::FontResolver {
        select_font: Box::new(|font, fontdb| {
            let cursive = font
                .families()
                .iter()
                .any(|f| matches!(f, usvg::FontFamily::Cursive));
            let families = if cursive {
                [usvg::fontdb::Family::Cursive, usvg::fontdb::Family::Serif]
            } else {
                [usvg::fontdb::Family::Serif, usvg::fontdb::Family::SansSerif]
            };
            let query = usvg::fontdb::Query {
                families: &families,
                weight: usvg::fontdb::Weight(font.weight()),
                ..usvg::fontdb::Query::default()
            };
            fontdb
                .query(&query)
                .or_else(|| fontdb.faces().next().map(|f| f.id))
        }),
        select_fallback: usvg::FontResolver::default_fallback_selector(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/overlay.rs"]
mod tests;
