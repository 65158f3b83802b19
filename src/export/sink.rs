use crate::foundation::core::Fps;
use crate::foundation::error::FlipbookResult;
use crate::raster::pixel_buffer::PixelBuffer;

/// Configuration handed to a [`FrameSink`] before the first frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExportConfig {
    /// Output width in pixels (after scaling).
    pub width: u32,
    /// Output height in pixels (after scaling).
    pub height: u32,
    /// Playback rate of the exported sequence.
    pub fps: Fps,
    /// Encoder quality in `1..=100`; higher is slower and more faithful.
    pub quality: u8,
    /// Number of times to play; `0` loops forever.
    pub loop_count: u16,
}

/// Consumer of flattened frames in playback order.
///
/// `push_frame` is called once per animation frame with strictly increasing `index`, each frame
/// sized exactly `width x height` from the config.
pub trait FrameSink: Send {
    /// Called once before any frame is pushed.
    fn begin(&mut self, cfg: ExportConfig) -> FlipbookResult<()>;
    /// One frame, to be shown for `delay_ms` milliseconds.
    fn push_frame(&mut self, index: usize, frame: &PixelBuffer, delay_ms: u32) -> FlipbookResult<()>;
    /// Called once after the last frame.
    fn end(&mut self) -> FlipbookResult<()>;
}

/// Sink that keeps every frame, for tests and previews.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<ExportConfig>,
    frames: Vec<(usize, PixelBuffer, u32)>,
    finished: bool,
}

impl InMemorySink {
    /// Empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<ExportConfig> {
        self.cfg
    }

    /// `(index, frame, delay_ms)` in push order.
    pub fn frames(&self) -> &[(usize, PixelBuffer, u32)] {
        &self.frames
    }

    /// Whether `end` has been called.
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: ExportConfig) -> FlipbookResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.finished = false;
        Ok(())
    }

    fn push_frame(&mut self, index: usize, frame: &PixelBuffer, delay_ms: u32) -> FlipbookResult<()> {
        self.frames.push((index, frame.clone(), delay_ms));
        Ok(())
    }

    fn end(&mut self) -> FlipbookResult<()> {
        self.finished = true;
        Ok(())
    }
}
