use kurbo::Shape as _;

use crate::foundation::core::{BezPath, Canvas, Rgba8};
use crate::foundation::error::{FlipbookError, FlipbookResult};
use crate::raster::pixel_buffer::PixelBuffer;
use crate::render::ops::{premul_dst_out_in_place, premul_over_in_place};
use crate::scene::model::{Layer, Shape, Stroke, ToolKind};
use crate::stroke::outline::{OutlineOpts, build_outline};

const PATH_TOLERANCE: f64 = 0.1;

/// Paints a layer's raster, strokes and shapes into one straight-alpha [`PixelBuffer`].
///
/// Vector content is rasterized with `vello_cpu`; the render context is kept between calls
/// and only rebuilt when the canvas size changes.
pub struct LayerRasterizer {
    outline: OutlineOpts,
    ctx: Option<vello_cpu::RenderContext>,
}

impl Default for LayerRasterizer {
    fn default() -> Self {
        Self::new(OutlineOpts::default())
    }
}

impl LayerRasterizer {
    /// Rasterizer using `outline` for stroke widths; the render context is created lazily.
    pub fn new(outline: OutlineOpts) -> Self {
        Self { outline, ctx: None }
    }

    /// Stroke width law in use.
    pub fn outline_opts(&self) -> &OutlineOpts {
        &self.outline
    }

    /// Flatten `layer` at canvas size: the raster (clipped at the origin) first, then every
    /// valid stroke in order, then every valid shape in order.
    ///
    /// Strokes and shapes that break their invariants are logged and skipped. Layer
    /// visibility, opacity and blend mode are not applied here.
    pub fn rasterize_layer(&mut self, layer: &Layer, canvas: Canvas) -> FlipbookResult<PixelBuffer> {
        let (w, h) = canvas_u16(canvas)?;

        let mut acc = match &layer.raster {
            Some(raster) if raster.width() == canvas.width && raster.height() == canvas.height => {
                raster.to_premul()
            }
            Some(raster) => {
                let mut fitted = PixelBuffer::new(canvas.width, canvas.height);
                fitted.blit(raster, 0, 0);
                fitted.to_premul()
            }
            None => vec![0u8; canvas.pixel_count() * 4],
        };

        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == w && ctx.height() == h => ctx,
            _ => vello_cpu::RenderContext::new(w, h),
        };
        ctx.reset();

        let result = self.paint_vectors(layer, &mut ctx, &mut acc, w, h);
        self.ctx = Some(ctx);
        result?;

        PixelBuffer::from_premul(canvas.width, canvas.height, &acc)
    }

    fn paint_vectors(
        &self,
        layer: &Layer,
        ctx: &mut vello_cpu::RenderContext,
        acc: &mut [u8],
        w: u16,
        h: u16,
    ) -> FlipbookResult<()> {
        let mut pending = false;

        for (i, stroke) in layer.strokes.iter().enumerate() {
            if let Err(e) = stroke.validate() {
                tracing::warn!(layer = %layer.name, stroke = i, error = %e, "skipping invalid stroke");
                continue;
            }
            let Some(path) = self.stroke_path(stroke)? else {
                continue;
            };
            match stroke.tool {
                ToolKind::Brush => {
                    fill(ctx, &path, stroke.color);
                    pending = true;
                }
                ToolKind::Eraser => {
                    if pending {
                        flush_over(ctx, acc, w, h)?;
                        pending = false;
                    }
                    fill(ctx, &path, Rgba8::new(255, 255, 255, stroke.color.a));
                    let mask = render(ctx, w, h);
                    premul_dst_out_in_place(acc, mask.data_as_u8_slice())?;
                }
            }
        }

        for (i, shape) in layer.shapes.iter().enumerate() {
            if let Err(e) = shape.validate() {
                tracing::warn!(layer = %layer.name, shape = i, error = %e, "skipping invalid shape");
                continue;
            }
            paint_shape(ctx, shape)?;
            pending = true;
        }

        if pending {
            flush_over(ctx, acc, w, h)?;
        }
        Ok(())
    }

    /// Filled outline of `stroke` under this rasterizer's width law.
    pub fn stroke_path(&self, stroke: &Stroke) -> FlipbookResult<Option<BezPath>> {
        stroke_fill_path(stroke, &self.outline)
    }
}

/// Closed fill path for a stroke; a single sample becomes a dot of the local width.
pub fn stroke_fill_path(stroke: &Stroke, opts: &OutlineOpts) -> FlipbookResult<Option<BezPath>> {
    match stroke.points.as_slice() {
        [] => Ok(None),
        [p] => {
            let r = opts.width_at(stroke.base_size, stroke.pressure_at(0)) / 2.0;
            Ok(Some(kurbo::Circle::new(*p, r).to_path(PATH_TOLERANCE)))
        }
        points => {
            let outline = build_outline(points, stroke.pressure_slice(), stroke.base_size, opts)?;
            Ok((!outline.is_empty()).then(|| outline.to_path()))
        }
    }
}

/// Rasterize a single layer with default outline options.
pub fn rasterize_layer(layer: &Layer, canvas: Canvas) -> FlipbookResult<PixelBuffer> {
    LayerRasterizer::default().rasterize_layer(layer, canvas)
}

fn paint_shape(ctx: &mut vello_cpu::RenderContext, shape: &Shape) -> FlipbookResult<()> {
    let path = shape.to_path()?;
    if let Some(color) = shape.fill {
        fill(ctx, &path, color);
    }
    if let Some(outline) = shape.outline {
        fill(ctx, &expand_outline(&path, outline.width), outline.color);
    }
    Ok(())
}

/// Fillable area covered by stroking `path` with `width`.
pub(crate) fn expand_outline(path: &BezPath, width: f64) -> BezPath {
    kurbo::stroke(
        path.iter(),
        &kurbo::Stroke::new(width),
        &kurbo::StrokeOpts::default(),
        PATH_TOLERANCE,
    )
}

fn fill(ctx: &mut vello_cpu::RenderContext, path: &BezPath, color: Rgba8) {
    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
        color.r, color.g, color.b, color.a,
    ));
    ctx.fill_path(&bezpath_to_cpu(path));
}

/// Render everything queued on `ctx` into a fresh pixmap and reset the context.
fn render(ctx: &mut vello_cpu::RenderContext, w: u16, h: u16) -> vello_cpu::Pixmap {
    let mut pixmap = vello_cpu::Pixmap::new(w, h);
    ctx.flush();
    ctx.render_to_pixmap(&mut pixmap);
    ctx.reset();
    pixmap
}

// `vello_cpu` renders into a fresh buffer, so queued paint lands in a temp pixmap that is then
// premul-over'd onto the accumulator.
fn flush_over(
    ctx: &mut vello_cpu::RenderContext,
    acc: &mut [u8],
    w: u16,
    h: u16,
) -> FlipbookResult<()> {
    let tmp = render(ctx, w, h);
    premul_over_in_place(acc, tmp.data_as_u8_slice())
}

pub(crate) fn canvas_u16(canvas: Canvas) -> FlipbookResult<(u16, u16)> {
    let w: u16 = canvas
        .width
        .try_into()
        .map_err(|_| FlipbookError::validation("canvas width exceeds u16"))?;
    let h: u16 = canvas
        .height
        .try_into()
        .map_err(|_| FlipbookError::validation("canvas height exceeds u16"))?;
    if w == 0 || h == 0 {
        return Err(FlipbookError::validation("canvas width/height must be > 0"));
    }
    Ok((w, h))
}

// Our kurbo and the one vello_cpu re-exports are distinct crate instances.
fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;
    use vello_cpu::kurbo::Point as CpuPoint;

    let pt = |p: kurbo::Point| CpuPoint::new(p.x, p.y);
    let mut out = vello_cpu::kurbo::BezPath::new();
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => out.move_to(pt(p)),
            PathEl::LineTo(p) => out.line_to(pt(p)),
            PathEl::QuadTo(a, b) => out.quad_to(pt(a), pt(b)),
            PathEl::CurveTo(a, b, c) => out.curve_to(pt(a), pt(b), pt(c)),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/rasterize.rs"]
mod tests;
