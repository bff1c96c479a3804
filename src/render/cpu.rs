use std::collections::HashMap;
use std::sync::Arc;

use crate::assets::decode::PreparedImage;
use crate::assets::text::{ShapedText, TextBrushRgba8, TextLayoutEngine};
use crate::compile::plan::{DrawOp, ImageSlot, RenderPlan, TextOp, TextShadow};
use crate::foundation::core::{Affine, BezPath, Rect, Rgba8Premul};
use crate::foundation::error::{DpError, DpResult};
use crate::render::composite::{
    blur_rgba8_premul_q16, gaussian_kernel_q16, mask_alpha_in_place, over_in_place,
};

/// CPU-side RGBA8 frame produced by [`CpuRenderer::render`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Pixel at `(x, y)` as stored, or `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        Some([
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ])
    }
}

/// Rasters bound to the image slots of a [`RenderPlan`].
#[derive(Clone, Copy, Debug, Default)]
pub struct SceneImages<'a> {
    pub frame: Option<&'a PreparedImage>,
    pub photo: Option<&'a PreparedImage>,
}

impl<'a> SceneImages<'a> {
    pub fn get(&self, slot: ImageSlot) -> Option<&'a PreparedImage> {
        match slot {
            ImageSlot::Frame => self.frame,
            ImageSlot::Photo => self.photo,
        }
    }
}

/// Options for the CPU renderer.
#[derive(Debug, Clone, Copy)]
pub struct CpuRendererOpts {
    pub(crate) clear_rgba: Option<[u8; 4]>,
    pub(crate) shadows: bool,
}

impl Default for CpuRendererOpts {
    fn default() -> Self {
        Self {
            clear_rgba: None,
            shadows: true,
        }
    }
}

impl CpuRendererOpts {
    /// Override the plan's clear color with a straight-alpha RGBA8 color.
    pub fn with_clear_rgba(mut self, clear: Option<[u8; 4]>) -> Self {
        self.clear_rgba = clear;
        self
    }

    /// Enable or disable text drop shadows.
    pub fn with_shadow(mut self, enabled: bool) -> Self {
        self.shadows = enabled;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct BlurKernelKey {
    radius_px: u32,
    sigma_bits: u32,
}

/// Executes [`RenderPlan`]s with `vello_cpu`.
///
/// Every op is rasterized into a transparent layer which is then composited source-over onto the
/// target. Clipped images are masked by a rasterized clip path; text shadows are blurred layers.
pub struct CpuRenderer {
    opts: CpuRendererOpts,
    ctx: Option<vello_cpu::RenderContext>,
    blur_kernels: HashMap<BlurKernelKey, Arc<Vec<u32>>>,
    blur_scratch: Vec<u8>,
    blur_out: Vec<u8>,
}

impl Default for CpuRenderer {
    fn default() -> Self {
        Self::new(CpuRendererOpts::default())
    }
}

impl CpuRenderer {
    pub fn new(opts: CpuRendererOpts) -> Self {
        Self {
            opts,
            ctx: None,
            blur_kernels: HashMap::new(),
            blur_scratch: Vec::new(),
            blur_out: Vec::new(),
        }
    }

    pub fn opts(&self) -> CpuRendererOpts {
        self.opts
    }

    #[tracing::instrument(
        skip_all,
        fields(width = plan.canvas.width, height = plan.canvas.height, ops = plan.ops.len())
    )]
    pub fn render(
        &mut self,
        plan: &RenderPlan,
        images: &SceneImages<'_>,
        text: &mut TextLayoutEngine,
    ) -> DpResult<FrameRGBA> {
        let w: u16 = plan
            .canvas
            .width
            .try_into()
            .map_err(|_| DpError::evaluation("canvas width exceeds u16"))?;
        let h: u16 = plan
            .canvas
            .height
            .try_into()
            .map_err(|_| DpError::evaluation("canvas height exceeds u16"))?;

        let mut target = vello_cpu::Pixmap::new(w, h);
        let clear = self
            .opts
            .clear_rgba
            .map(premul_rgba8)
            .unwrap_or_else(|| plan.clear.to_array());
        clear_pixmap(&mut target, clear);

        let mut layer = vello_cpu::Pixmap::new(w, h);
        let mut mask: Option<vello_cpu::Pixmap> = None;
        let mut paints = SlotPaints::default();

        for op in &plan.ops {
            match op {
                DrawOp::Image { slot, dest } => {
                    let paint = paints.get(images, *slot)?;
                    self.draw_layer(&mut layer, |ctx| {
                        paint_image(ctx, paint, *dest);
                        Ok(())
                    })?;
                }
                DrawOp::ClippedImage { slot, dest, clip } => {
                    let paint = paints.get(images, *slot)?;
                    self.draw_layer(&mut layer, |ctx| {
                        paint_image(ctx, paint, *dest);
                        Ok(())
                    })?;
                    let mask = mask.get_or_insert_with(|| vello_cpu::Pixmap::new(w, h));
                    self.draw_layer(mask, |ctx| {
                        fill_path(ctx, clip, [255, 255, 255, 255]);
                        Ok(())
                    })?;
                    mask_alpha_in_place(layer.data_as_u8_slice_mut(), mask.data_as_u8_slice())?;
                }
                DrawOp::FillPath { path, color } => {
                    self.draw_layer(&mut layer, |ctx| {
                        fill_path(ctx, path, color.to_straight_rgba());
                        Ok(())
                    })?;
                }
                DrawOp::StrokePath {
                    path,
                    color,
                    width,
                    dash,
                } => {
                    let outline = match dash {
                        Some(pattern) => dashed(path, pattern),
                        None => path.clone(),
                    };
                    self.draw_layer(&mut layer, |ctx| {
                        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
                        set_solid_paint(ctx, color.to_straight_rgba());
                        ctx.set_stroke(vello_cpu::kurbo::Stroke::new(*width));
                        ctx.stroke_path(&bezpath_to_cpu(&outline));
                        Ok(())
                    })?;
                }
                DrawOp::Text(t) => {
                    if !text.has_fonts() {
                        tracing::warn!(text = %t.text, "no fonts registered; skipping text op");
                        continue;
                    }
                    self.exec_text(t, text, &mut target, &mut layer)?;
                    continue;
                }
            }
            over_in_place(target.data_as_u8_slice_mut(), layer.data_as_u8_slice())?;
        }

        Ok(FrameRGBA {
            width: u32::from(w),
            height: u32::from(h),
            data: target.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }

    fn exec_text(
        &mut self,
        op: &TextOp,
        engine: &mut TextLayoutEngine,
        target: &mut vello_cpu::Pixmap,
        layer: &mut vello_cpu::Pixmap,
    ) -> DpResult<()> {
        let [r, g, b, a] = op.color.to_straight_rgba();
        let shaped = engine.shape_line(
            &op.text,
            &op.font_family,
            op.font_size,
            TextBrushRgba8 { r, g, b, a },
        )?;
        if shaped.width <= 0.0 {
            return Ok(());
        }
        let font = vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from((*shaped.font_bytes).clone()),
            0,
        );

        let fitted = match op.max_width {
            Some(max) if max > 0.0 && shaped.width > max => max,
            _ => shaped.width,
        };
        let left = op.anchor.x + op.alignment.left_offset(fitted);
        let placement = Affine::translate((left, op.anchor.y - shaped.baseline))
            * Affine::scale_non_uniform(fitted / shaped.width, 1.0);

        if let Some(shadow) = op.shadow.filter(|_| self.opts.shadows) {
            let tr = Affine::translate(shadow.offset) * placement;
            self.draw_layer(layer, |ctx| {
                paint_glyphs(ctx, &shaped, &font, tr, Some(shadow.color));
                Ok(())
            })?;
            self.blur_layer(layer, &shadow)?;
            over_in_place(target.data_as_u8_slice_mut(), &self.blur_out)?;
        }

        self.draw_layer(layer, |ctx| {
            paint_glyphs(ctx, &shaped, &font, placement, None);
            Ok(())
        })?;
        over_in_place(target.data_as_u8_slice_mut(), layer.data_as_u8_slice())
    }

    /// Blur `layer` into `self.blur_out` with canvas `shadowBlur` semantics (sigma = blur / 2).
    fn blur_layer(&mut self, layer: &vello_cpu::Pixmap, shadow: &TextShadow) -> DpResult<()> {
        let sigma = (shadow.blur / 2.0).max(0.0) as f32;
        let radius_px = if sigma > 0.0 {
            (3.0 * sigma).ceil() as u32
        } else {
            0
        };
        let key = BlurKernelKey {
            radius_px,
            sigma_bits: sigma.to_bits(),
        };
        let kernel = match self.blur_kernels.get(&key) {
            Some(k) => k.clone(),
            None => {
                let k = Arc::new(gaussian_kernel_q16(radius_px, sigma)?);
                self.blur_kernels.insert(key, k.clone());
                k
            }
        };

        let src = layer.data_as_u8_slice();
        self.blur_scratch.resize(src.len(), 0);
        self.blur_out.resize(src.len(), 0);
        blur_rgba8_premul_q16(
            src,
            &mut self.blur_out,
            &mut self.blur_scratch,
            u32::from(layer.width()),
            u32::from(layer.height()),
            &kernel,
        );
        Ok(())
    }

    /// Rasterize `f` into `pixmap`, which is cleared to transparent first.
    fn draw_layer(
        &mut self,
        pixmap: &mut vello_cpu::Pixmap,
        f: impl FnOnce(&mut vello_cpu::RenderContext) -> DpResult<()>,
    ) -> DpResult<()> {
        let (width, height) = (pixmap.width(), pixmap.height());
        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == width && ctx.height() == height => ctx,
            _ => vello_cpu::RenderContext::new(width, height),
        };
        ctx.reset();
        clear_pixmap_to_transparent(pixmap);
        let out = f(&mut ctx);
        if out.is_ok() {
            ctx.flush();
            ctx.render_to_pixmap(pixmap);
        }
        self.ctx = Some(ctx);
        out
    }
}

/// Image paints built once per render call.
#[derive(Default)]
struct SlotPaints {
    frame: Option<ImagePaint>,
    photo: Option<ImagePaint>,
}

#[derive(Clone)]
struct ImagePaint {
    paint: vello_cpu::Image,
    w: f64,
    h: f64,
}

impl SlotPaints {
    fn get(&mut self, images: &SceneImages<'_>, slot: ImageSlot) -> DpResult<ImagePaint> {
        let cached = match slot {
            ImageSlot::Frame => &mut self.frame,
            ImageSlot::Photo => &mut self.photo,
        };
        if let Some(p) = cached {
            return Ok(p.clone());
        }
        let img = images
            .get(slot)
            .ok_or_else(|| DpError::evaluation(format!("no image bound to the {slot:?} slot")))?;
        let pixmap = pixmap_from_premul_bytes(&img.rgba8_premul, img.width, img.height)?;
        let paint = ImagePaint {
            paint: vello_cpu::Image {
                image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
                sampler: vello_cpu::peniko::ImageSampler::default(),
            },
            w: f64::from(img.width),
            h: f64::from(img.height),
        };
        *cached = Some(paint.clone());
        Ok(paint)
    }
}

fn paint_image(ctx: &mut vello_cpu::RenderContext, p: ImagePaint, dest: Rect) {
    if dest.width() <= 0.0 || dest.height() <= 0.0 {
        return;
    }
    let tr = Affine::translate((dest.x0, dest.y0))
        * Affine::scale_non_uniform(dest.width() / p.w, dest.height() / p.h);
    ctx.set_transform(affine_to_cpu(tr));
    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_paint(p.paint);
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, p.w, p.h));
}

fn fill_path(ctx: &mut vello_cpu::RenderContext, path: &BezPath, straight: [u8; 4]) {
    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    set_solid_paint(ctx, straight);
    ctx.fill_path(&bezpath_to_cpu(path));
}

fn set_solid_paint(ctx: &mut vello_cpu::RenderContext, [r, g, b, a]: [u8; 4]) {
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
}

/// Draw every glyph run of `shaped`. `color` overrides the layout brush.
fn paint_glyphs(
    ctx: &mut vello_cpu::RenderContext,
    shaped: &ShapedText,
    font: &vello_cpu::peniko::FontData,
    tr: Affine,
    color: Option<Rgba8Premul>,
) {
    ctx.set_transform(affine_to_cpu(tr));
    for line in shaped.layout.lines() {
        for item in line.items() {
            let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                continue;
            };
            let paint = match color {
                Some(c) => c.to_straight_rgba(),
                None => {
                    let b = run.style().brush;
                    [b.r, b.g, b.b, b.a]
                }
            };
            set_solid_paint(ctx, paint);

            let mut x = run.offset();
            let y = run.baseline();
            let glyphs: Vec<vello_cpu::Glyph> = run
                .glyphs()
                .map(|g| {
                    let out = vello_cpu::Glyph {
                        id: g.id,
                        x: x + g.x,
                        y: y - g.y,
                    };
                    x += g.advance;
                    out
                })
                .collect();
            ctx.glyph_run(font)
                .font_size(run.run().font_size())
                .fill_glyphs(glyphs.into_iter());
        }
    }
}

fn dashed(path: &BezPath, pattern: &[f64; 2]) -> BezPath {
    kurbo::dash(path.iter(), 0.0, pattern).collect()
}

fn clear_pixmap(pixmap: &mut vello_cpu::Pixmap, rgba: [u8; 4]) {
    for px in pixmap.data_as_u8_slice_mut().chunks_exact_mut(4) {
        px.copy_from_slice(&rgba);
    }
}

fn clear_pixmap_to_transparent(pixmap: &mut vello_cpu::Pixmap) {
    pixmap.data_as_u8_slice_mut().fill(0);
}

fn premul_rgba8([r, g, b, a]: [u8; 4]) -> [u8; 4] {
    Rgba8Premul::from_straight_rgba(r, g, b, a).to_array()
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let pt = |p: kurbo::Point| vello_cpu::kurbo::Point::new(p.x, p.y);
    let mut out = vello_cpu::kurbo::BezPath::new();
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => out.move_to(pt(p)),
            PathEl::LineTo(p) => out.line_to(pt(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(pt(p1), pt(p2)),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(pt(p1), pt(p2), pt(p3)),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

fn pixmap_from_premul_bytes(bytes: &[u8], width: u32, height: u32) -> DpResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| DpError::evaluation("pixmap width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| DpError::evaluation("pixmap height exceeds u16"))?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(DpError::evaluation("pixmap byte len mismatch"));
    }
    let pixels = bytes
        .chunks_exact(4)
        .map(|px| vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]]))
        .collect::<Vec<_>>();
    let opaque = bytes.chunks_exact(4).all(|px| px[3] == 255);
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels, w, h, !opaque,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
