use crate::foundation::core::{Canvas, Rgba8};
use crate::foundation::error::FlipbookResult;
use crate::foundation::math::{u8_from_unit, unit_from_u8};
use crate::raster::pixel_buffer::PixelBuffer;
use crate::render::rasterize::{LayerRasterizer, canvas_u16};
use crate::scene::model::{BlendMode, Layer};
use crate::stroke::outline::OutlineOpts;

/// Options for flattening a layer stack.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CompositeOpts {
    /// Initial accumulator color; transparent black when `None`.
    pub background: Option<Rgba8>,
    /// Stroke width law used when rasterizing layers.
    pub outline: OutlineOpts,
}

/// Separable blend function `B(dst, src)` on normalized channels.
fn blend_channel(mode: BlendMode, d: f32, s: f32) -> f32 {
    match mode {
        BlendMode::Normal => s,
        BlendMode::Multiply => d * s,
        BlendMode::Screen => 1.0 - (1.0 - d) * (1.0 - s),
        BlendMode::Overlay => {
            if d < 0.5 {
                2.0 * d * s
            } else {
                1.0 - 2.0 * (1.0 - d) * (1.0 - s)
            }
        }
        BlendMode::Darken => d.min(s),
        BlendMode::Lighten => d.max(s),
    }
}

/// Blend one straight-alpha `src` pixel onto `dst`.
///
/// Where the destination is opaque this is a lerp from `dst` towards `B(dst, src)` by
/// `src.a * opacity`. Over translucent destination the blend result is mixed with the raw
/// source by destination alpha, so blending onto transparency degrades to `normal`.
pub fn blend_pixel(dst: Rgba8, src: Rgba8, mode: BlendMode, opacity: f32) -> Rgba8 {
    let a = unit_from_u8(src.a) * opacity.clamp(0.0, 1.0);
    if a <= 0.0 {
        return dst;
    }
    let da = unit_from_u8(dst.a);
    let out_a = a + da * (1.0 - a);
    if out_a <= 0.0 {
        return Rgba8::TRANSPARENT;
    }

    let channel = |d: u8, s: u8| {
        let (d, s) = (unit_from_u8(d), unit_from_u8(s));
        let mixed = match mode {
            BlendMode::Normal => s,
            _ => (1.0 - da) * s + da * blend_channel(mode, d, s),
        };
        u8_from_unit((mixed * a + d * da * (1.0 - a)) / out_a)
    };

    Rgba8::new(
        channel(dst.r, src.r),
        channel(dst.g, src.g),
        channel(dst.b, src.b),
        u8_from_unit(out_a),
    )
}

/// Blend every pixel of `src` onto `dst` (same dimensions).
pub(crate) fn blend_buffer(dst: &mut PixelBuffer, src: &PixelBuffer, mode: BlendMode, opacity: f32) {
    for (d, s) in dst
        .as_bytes_mut()
        .chunks_exact_mut(4)
        .zip(src.as_bytes().chunks_exact(4))
    {
        if s[3] == 0 {
            continue;
        }
        let out = blend_pixel(
            Rgba8::new(d[0], d[1], d[2], d[3]),
            Rgba8::new(s[0], s[1], s[2], s[3]),
            mode,
            opacity,
        );
        d.copy_from_slice(&out.to_array());
    }
}

/// Flattens layer stacks bottom-to-top, reusing one [`LayerRasterizer`] between calls.
pub struct LayerCompositor {
    opts: CompositeOpts,
    rasterizer: LayerRasterizer,
}

impl Default for LayerCompositor {
    fn default() -> Self {
        Self::new(CompositeOpts::default())
    }
}

impl LayerCompositor {
    /// Compositor with its own rasterizer.
    pub fn new(opts: CompositeOpts) -> Self {
        Self {
            opts,
            rasterizer: LayerRasterizer::new(opts.outline),
        }
    }

    /// Options this compositor was built with.
    pub fn opts(&self) -> &CompositeOpts {
        &self.opts
    }

    /// Rasterize one layer at canvas size without applying its opacity or blend mode.
    pub fn rasterize(&mut self, layer: &Layer, canvas: Canvas) -> FlipbookResult<PixelBuffer> {
        self.rasterizer.rasterize_layer(layer, canvas)
    }

    /// Flatten `layers` (bottom first) into one buffer of canvas size.
    ///
    /// Hidden layers are skipped without being rasterized. A layer that cannot be rasterized
    /// or carries an out-of-range opacity is logged and treated as transparent.
    #[tracing::instrument(skip(self, layers), fields(layers = layers.len()))]
    pub fn composite(&mut self, layers: &[Layer], canvas: Canvas) -> FlipbookResult<PixelBuffer> {
        canvas_u16(canvas)?;
        let background = self.opts.background.unwrap_or(Rgba8::TRANSPARENT);
        let mut out = PixelBuffer::filled(canvas.width, canvas.height, background);

        if layers.is_empty() {
            tracing::warn!("compositing a frame with no layers");
            return Ok(out);
        }

        for layer in layers.iter().filter(|l| l.visible) {
            if !layer.opacity.is_finite() || !(0.0..=1.0).contains(&layer.opacity) {
                tracing::warn!(layer = %layer.name, opacity = layer.opacity, "layer opacity out of range, skipping");
                continue;
            }
            if layer.opacity == 0.0 || layer.is_blank() {
                continue;
            }
            match self.rasterizer.rasterize_layer(layer, canvas) {
                Ok(img) => blend_buffer(&mut out, &img, layer.blend_mode, layer.opacity),
                Err(e) => {
                    tracing::warn!(layer = %layer.name, error = %e, "layer failed to rasterize, treating as transparent");
                }
            }
        }
        Ok(out)
    }
}

/// Flatten a layer stack with one-off compositor state.
pub fn composite_layers(
    layers: &[Layer],
    canvas: Canvas,
    opts: &CompositeOpts,
) -> FlipbookResult<PixelBuffer> {
    LayerCompositor::new(*opts).composite(layers, canvas)
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
