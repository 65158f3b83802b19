use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use crate::export::gif::GifSink;
use crate::export::sink::{ExportConfig, FrameSink};
use crate::foundation::core::{Canvas, Rgba8};
use crate::foundation::error::{FlipbookError, FlipbookResult};
use crate::raster::pixel_buffer::PixelBuffer;
use crate::render::compositor::{CompositeOpts, LayerCompositor};
use crate::scene::model::{AnimationSequence, Frame};

/// Settings for [`export_sequence`].
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ExportOpts {
    /// Encoder quality in `1..=100`.
    pub quality: u8,
    /// Number of plays; `0` loops forever.
    pub loop_count: u16,
    /// Output size relative to the canvas, in `(0, 4]`.
    pub scale: f64,
    /// Matte behind every frame; `None` keeps transparency.
    pub background: Option<Rgba8>,
}

impl Default for ExportOpts {
    fn default() -> Self {
        Self {
            quality: 80,
            loop_count: 0,
            scale: 1.0,
            background: None,
        }
    }
}

impl ExportOpts {
    /// Reject quality outside `1..=100` and scale outside `(0, 4]`.
    pub fn validate(&self) -> FlipbookResult<()> {
        if !(1..=100).contains(&self.quality) {
            return Err(FlipbookError::validation("export quality must be in 1..=100"));
        }
        if !self.scale.is_finite() || self.scale <= 0.0 || self.scale > 4.0 {
            return Err(FlipbookError::validation("export scale must be in (0, 4]"));
        }
        Ok(())
    }

    /// Output dimensions for `canvas`, never below 1x1.
    pub fn output_size(&self, canvas: Canvas) -> (u32, u32) {
        let dim = |v: u32| ((f64::from(v) * self.scale).round() as u32).max(1);
        (dim(canvas.width), dim(canvas.height))
    }
}

/// What an export produced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExportStats {
    /// Frames handed to the sink.
    pub frames: usize,
    /// Sum of all frame delays.
    pub total_delay_ms: u64,
}

/// Hold time of a frame in milliseconds, rounded to the nearest millisecond.
pub fn frame_delay_ms(frame: &Frame, sequence: &AnimationSequence) -> u32 {
    let ms = sequence.fps.ticks_to_ms(u64::from(frame.duration_ticks)).round();
    ms.min(f64::from(u32::MAX)) as u32
}

/// Flatten every frame once, in playback order, and stream them into `sink`.
///
/// The document is only read; an encoder failure leaves it untouched.
#[tracing::instrument(skip(sequence, sink, opts), fields(frames = sequence.frame_count()))]
pub fn export_sequence(
    sequence: &AnimationSequence,
    sink: &mut dyn FrameSink,
    opts: &ExportOpts,
) -> FlipbookResult<ExportStats> {
    sequence.validate()?;
    opts.validate()?;

    let (width, height) = opts.output_size(sequence.canvas);
    sink.begin(ExportConfig {
        width,
        height,
        fps: sequence.fps,
        quality: opts.quality,
        loop_count: opts.loop_count,
    })?;

    let mut compositor = LayerCompositor::new(CompositeOpts {
        background: opts.background,
        ..CompositeOpts::default()
    });
    let mut stats = ExportStats::default();
    for (i, frame) in sequence.frames.iter().enumerate() {
        let mut img = compositor.composite(&frame.layers, sequence.canvas)?;
        if (width, height) != (img.width(), img.height()) {
            img = img.resized(width, height)?;
        }
        let delay = frame_delay_ms(frame, sequence);
        sink.push_frame(i, &img, delay)?;
        stats.frames += 1;
        stats.total_delay_ms += u64::from(delay);
    }
    sink.end()?;

    tracing::debug!(frames = stats.frames, total_ms = stats.total_delay_ms, "export finished");
    Ok(stats)
}

/// Encode the whole sequence as an animated GIF in memory.
pub fn encode_gif(sequence: &AnimationSequence, opts: &ExportOpts) -> FlipbookResult<Vec<u8>> {
    let mut bytes = Vec::new();
    {
        let mut sink = GifSink::new(&mut bytes);
        export_sequence(sequence, &mut sink, opts)?;
    }
    Ok(bytes)
}

/// Encode the whole sequence as an animated GIF file at `path`.
pub fn save_gif(
    sequence: &AnimationSequence,
    opts: &ExportOpts,
    path: impl AsRef<Path>,
) -> FlipbookResult<ExportStats> {
    use anyhow::Context as _;

    let path = path.as_ref();
    let f = File::create(path).with_context(|| format!("create gif '{}'", path.display()))?;
    let mut sink = GifSink::new(BufWriter::new(f));
    export_sequence(sequence, &mut sink, opts)
}

/// Flattened preview of `frame` scaled to fit inside `max_side` x `max_side`.
///
/// Frames already small enough are returned at canvas size.
pub fn thumbnail(frame: &Frame, canvas: Canvas, max_side: u32) -> FlipbookResult<PixelBuffer> {
    if max_side == 0 {
        return Err(FlipbookError::validation("thumbnail max_side must be > 0"));
    }
    LayerCompositor::default()
        .composite(&frame.layers, canvas)?
        .fit_within(max_side)
}

#[cfg(test)]
#[path = "../../tests/unit/export/pipeline.rs"]
mod tests;
