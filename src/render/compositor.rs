use std::collections::HashMap;
use std::sync::Arc;

use crate::assets::decode::DecodedImage;
use crate::config::{ExportConfig, FitMode};
use crate::foundation::core::{Affine, Canvas, Rgba8};
use crate::foundation::error::{ReelError, ReelResult};
use crate::render::frame::FrameRGBA;
use crate::render::overlay::CaptionOverlay;
use crate::timeline::{TimelineSample, fade_opacity, zoom_scale};

/// Result of one [`FrameCompositor::paint`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaintOutcome {
    /// The surface now holds a complete frame.
    Painted,
    /// The selected image is not available; the surface was left untouched.
    NotReady,
}

/// Paints slideshow frames onto a persistent CPU surface.
///
/// Each frame is: background fill, the current image zoomed about the canvas center and faded,
/// then the caption overlay at full opacity.
pub struct FrameCompositor {
    canvas: Canvas,
    width: u16,
    height: u16,
    background: Rgba8,
    zoom_factor: f64,
    fade_fraction: f64,
    fit: FitMode,
    images: Vec<Arc<DecodedImage>>,
    image_cache: HashMap<usize, vello_cpu::Image>,
    overlay: Option<vello_cpu::Image>,
    ctx: vello_cpu::RenderContext,
    pixmap: vello_cpu::Pixmap,
}

impl FrameCompositor {
    /// Compositor for one export over `images`, in timeline order.
    pub fn new(
        cfg: &ExportConfig,
        images: Vec<Arc<DecodedImage>>,
        overlay: Option<&CaptionOverlay>,
    ) -> ReelResult<Self> {
        let canvas = cfg.canvas;
        let width: u16 = canvas
            .width
            .try_into()
            .map_err(|_| ReelError::validation("canvas width exceeds u16"))?;
        let height: u16 = canvas
            .height
            .try_into()
            .map_err(|_| ReelError::validation("canvas height exceeds u16"))?;

        let overlay = match overlay {
            Some(o) if !o.is_blank() => {
                if o.width != canvas.width || o.height != canvas.height {
                    return Err(ReelError::validation(format!(
                        "overlay is {}x{}, canvas is {}x{}",
                        o.width, o.height, canvas.width, canvas.height
                    )));
                }
                let pixmap = premul_bytes_to_pixmap(&o.rgba8_premul, o.width, o.height)?;
                Some(image_paint(pixmap))
            }
            _ => None,
        };

        Ok(Self {
            canvas,
            width,
            height,
            background: cfg.background,
            zoom_factor: cfg.zoom_factor,
            fade_fraction: cfg.fade_fraction,
            fit: cfg.fit,
            images,
            image_cache: HashMap::new(),
            overlay,
            ctx: vello_cpu::RenderContext::new(width, height),
            pixmap: vello_cpu::Pixmap::new(width, height),
        })
    }

    /// Output canvas.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Paint the frame for `sample` onto the surface.
    pub fn paint(&mut self, sample: TimelineSample) -> ReelResult<PaintOutcome> {
        let Some(image) = self.images.get(sample.image_index).cloned() else {
            return Ok(PaintOutcome::NotReady);
        };
        let paint = self.image_paint_for(sample.image_index, &image)?;

        let p = sample.local_progress;
        let scale = zoom_scale(p, self.zoom_factor);
        let opacity = fade_opacity(p, self.fade_fraction) as f32;
        let transform = self.image_transform(&image, scale);

        let (w, h) = (f64::from(self.width), f64::from(self.height));
        let ctx = &mut self.ctx;
        ctx.reset();
        ctx.set_blend_mode(vello_cpu::peniko::BlendMode::default());
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);

        let Rgba8 { r, g, b, a } = self.background;
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, w, h));

        if opacity > 0.0 {
            ctx.set_transform(affine_to_cpu(transform));
            ctx.set_paint(paint);
            if opacity < 1.0 {
                ctx.push_opacity_layer(opacity);
            }
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                0.0,
                0.0,
                f64::from(image.width),
                f64::from(image.height),
            ));
            if opacity < 1.0 {
                ctx.pop_layer();
            }
        }

        if let Some(overlay) = &self.overlay {
            ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.set_paint(overlay.clone());
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, w, h));
        }

        clear_pixmap(&mut self.pixmap, [0, 0, 0, 0]);
        ctx.flush();
        ctx.render_to_pixmap(&mut self.pixmap);
        Ok(PaintOutcome::Painted)
    }

    /// Copy the current surface out as a premultiplied frame.
    pub fn snapshot(&self) -> FrameRGBA {
        FrameRGBA {
            width: self.canvas.width,
            height: self.canvas.height,
            data: self.pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        }
    }

    /// Paint `sample` and return the frame, or `None` when the image is not ready.
    pub fn render(&mut self, sample: TimelineSample) -> ReelResult<Option<FrameRGBA>> {
        match self.paint(sample)? {
            PaintOutcome::Painted => Ok(Some(self.snapshot())),
            PaintOutcome::NotReady => Ok(None),
        }
    }

    /// Image space to canvas space: fit to the canvas, then scale about the canvas center.
    fn image_transform(&self, image: &DecodedImage, scale: f64) -> Affine {
        let cw = f64::from(self.canvas.width);
        let ch = f64::from(self.canvas.height);
        let iw = f64::from(image.width);
        let ih = f64::from(image.height);

        let fit = match self.fit {
            FitMode::Stretch => Affine::scale_non_uniform(cw / iw, ch / ih),
            FitMode::Cover => {
                let k = (cw / iw).max(ch / ih);
                Affine::translate(((cw - iw * k) / 2.0, (ch - ih * k) / 2.0)) * Affine::scale(k)
            }
        };
        let zoom = Affine::translate((cw / 2.0, ch / 2.0))
            * Affine::scale(scale)
            * Affine::translate((-cw / 2.0, -ch / 2.0));
        zoom * fit
    }

    fn image_paint_for(
        &mut self,
        index: usize,
        image: &DecodedImage,
    ) -> ReelResult<vello_cpu::Image> {
        if let Some(paint) = self.image_cache.get(&index) {
            return Ok(paint.clone());
        }
        let pixmap = premul_bytes_to_pixmap(&image.rgba8_premul, image.width, image.height)?;
        let paint = image_paint(pixmap);
        self.image_cache.insert(index, paint.clone());
        Ok(paint)
    }
}

fn image_paint(pixmap: vello_cpu::Pixmap) -> vello_cpu::Image {
    vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    }
}

fn premul_bytes_to_pixmap(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> ReelResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| ReelError::validation(format!("image width {width} exceeds u16")))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| ReelError::validation(format!("image height {height} exceeds u16")))?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(ReelError::validation("image byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for px in rgba8_premul.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a,
        });
    }

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

fn clear_pixmap(pixmap: &mut vello_cpu::Pixmap, rgba: [u8; 4]) {
    for px in pixmap.data_as_u8_slice_mut().chunks_exact_mut(4) {
        px.copy_from_slice(&rgba);
    }
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
