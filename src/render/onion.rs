use crate::foundation::core::Rgb8;
use crate::foundation::error::{FlipbookError, FlipbookResult};
use crate::raster::pixel_buffer::PixelBuffer;
use crate::render::compositor::{CompositeOpts, LayerCompositor, blend_buffer};
use crate::scene::model::{AnimationSequence, BlendMode};

/// Neighbour-frame overlay settings for the drawing view.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct OnionSkinOpts {
    /// Previous frames to show.
    pub before: u32,
    /// Following frames to show.
    pub after: u32,
    /// Opacity of the nearest neighbour.
    pub opacity: f32,
    /// Multiplier applied per extra frame of distance.
    pub falloff: f32,
    /// Recolor previous frames; `None` keeps their own colors.
    pub tint_before: Option<Rgb8>,
    /// Recolor following frames; `None` keeps their own colors.
    pub tint_after: Option<Rgb8>,
}

impl Default for OnionSkinOpts {
    fn default() -> Self {
        Self {
            before: 1,
            after: 1,
            opacity: 0.3,
            falloff: 0.5,
            tint_before: Some(Rgb8::new(255, 64, 64)),
            tint_after: Some(Rgb8::new(64, 200, 64)),
        }
    }
}

impl OnionSkinOpts {
    /// Reject opacity or falloff outside `[0, 1]`.
    pub fn validate(&self) -> FlipbookResult<()> {
        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(FlipbookError::validation("onion skin opacity must be in [0, 1]"));
        }
        if !(0.0..=1.0).contains(&self.falloff) {
            return Err(FlipbookError::validation("onion skin falloff must be in [0, 1]"));
        }
        Ok(())
    }

    /// Overlay opacity for a neighbour `distance` frames away (`distance >= 1`).
    pub fn opacity_at(&self, distance: u32) -> f32 {
        let steps = distance.saturating_sub(1).min(i32::MAX as u32) as i32;
        self.opacity * self.falloff.powi(steps)
    }
}

fn tint(buf: &mut PixelBuffer, color: Rgb8) {
    for px in buf.as_bytes_mut().chunks_exact_mut(4) {
        if px[3] != 0 {
            px[..3].copy_from_slice(&[color.r, color.g, color.b]);
        }
    }
}

/// Flatten frame `index` with its neighbours faded in beneath it.
///
/// Neighbours outside the sequence are skipped (no wrap-around). Farther frames are painted
/// first so the nearest ones sit on top; the current frame is drawn last at full strength.
#[tracing::instrument(skip(sequence, opts))]
pub fn render_onion_skin(
    sequence: &AnimationSequence,
    index: usize,
    opts: &OnionSkinOpts,
) -> FlipbookResult<PixelBuffer> {
    opts.validate()?;
    let Some(current) = sequence.frames.get(index) else {
        return Err(FlipbookError::validation(format!(
            "frame index {index} out of range (frames: {})",
            sequence.frame_count()
        )));
    };

    let canvas = sequence.canvas;
    let mut compositor = LayerCompositor::new(CompositeOpts::default());
    let mut out = PixelBuffer::new(canvas.width, canvas.height);

    // Only frames that exist can be ghosted.
    let before = index.min(opts.before as usize);
    let after = (sequence.frame_count() - 1 - index).min(opts.after as usize);
    let mut neighbours: Vec<(u32, usize, Option<Rgb8>)> = Vec::with_capacity(before + after);
    for d in 1..=before {
        neighbours.push((d as u32, index - d, opts.tint_before));
    }
    for d in 1..=after {
        neighbours.push((d as u32, index + d, opts.tint_after));
    }
    neighbours.sort_by(|a, b| b.0.cmp(&a.0));

    for (distance, i, tint_color) in neighbours {
        let alpha = opts.opacity_at(distance);
        if alpha <= 0.0 {
            continue;
        }
        let mut ghost = compositor.composite(&sequence.frames[i].layers, canvas)?;
        if let Some(c) = tint_color {
            tint(&mut ghost, c);
        }
        blend_buffer(&mut out, &ghost, BlendMode::Normal, alpha);
    }

    let frame = compositor.composite(&current.layers, canvas)?;
    blend_buffer(&mut out, &frame, BlendMode::Normal, 1.0);
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/render/onion.rs"]
mod tests;
