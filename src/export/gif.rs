use std::io::Write;

use crate::export::sink::{ExportConfig, FrameSink};
use crate::foundation::error::{FlipbookError, FlipbookResult};
use crate::raster::pixel_buffer::PixelBuffer;

/// Map `1..=100` quality onto the encoder's NeuQuant speed (`30` fastest, `1` best).
fn gif_speed(quality: u8) -> i32 {
    let q = i32::from(quality.clamp(1, 100));
    30 - (q - 1) * 29 / 99
}

/// GIF delays are stored in hundredths of a second.
fn delay_centis(delay_ms: u32) -> u16 {
    let cs = (u64::from(delay_ms) + 5) / 10;
    u16::try_from(cs).unwrap_or(u16::MAX)
}

fn dim_u16(v: u32, what: &str) -> FlipbookResult<u16> {
    u16::try_from(v).map_err(|_| FlipbookError::encode(format!("gif {what} {v} exceeds 65535")))
}

/// Animated GIF sink over any writer.
///
/// [`FrameSink::end`] writes the trailer and flushes the writer; failures there are reported
/// like any other encoder error. The finished writer can be taken back with
/// [`GifSink::into_inner`].
pub struct GifSink<W: Write + Send> {
    writer: Option<W>,
    encoder: Option<gif::Encoder<W>>,
    cfg: Option<ExportConfig>,
}

impl<W: Write + Send> GifSink<W> {
    /// Sink that encodes into `writer` once [`FrameSink::begin`] is called.
    pub fn new(writer: W) -> Self {
        Self {
            writer: Some(writer),
            encoder: None,
            cfg: None,
        }
    }

    /// The writer, after a successful [`FrameSink::end`] (or before `begin`).
    pub fn into_inner(self) -> Option<W> {
        self.writer
    }
}

impl<W: Write + Send> FrameSink for GifSink<W> {
    fn begin(&mut self, cfg: ExportConfig) -> FlipbookResult<()> {
        if self.cfg.is_some() {
            return Err(FlipbookError::encode("gif sink can only be used once"));
        }
        let writer = self
            .writer
            .take()
            .ok_or_else(|| FlipbookError::encode("gif sink has no writer"))?;
        let width = dim_u16(cfg.width, "width")?;
        let height = dim_u16(cfg.height, "height")?;
        let mut encoder = gif::Encoder::new(writer, width, height, &[])
            .map_err(|e| FlipbookError::encode(format!("gif header: {e}")))?;
        let repeat = match cfg.loop_count {
            0 => gif::Repeat::Infinite,
            n => gif::Repeat::Finite(n),
        };
        encoder
            .set_repeat(repeat)
            .map_err(|e| FlipbookError::encode(format!("gif set repeat: {e}")))?;
        self.encoder = Some(encoder);
        self.cfg = Some(cfg);
        Ok(())
    }

    fn push_frame(&mut self, index: usize, frame: &PixelBuffer, delay_ms: u32) -> FlipbookResult<()> {
        let (Some(encoder), Some(cfg)) = (self.encoder.as_mut(), self.cfg) else {
            return Err(FlipbookError::encode("gif sink: push_frame before begin"));
        };
        if frame.width() != cfg.width || frame.height() != cfg.height {
            return Err(FlipbookError::encode(format!(
                "gif frame {index} is {}x{}, expected {}x{}",
                frame.width(),
                frame.height(),
                cfg.width,
                cfg.height
            )));
        }
        let mut pixels = frame.as_bytes().to_vec();
        let mut gif_frame = gif::Frame::from_rgba_speed(
            dim_u16(cfg.width, "width")?,
            dim_u16(cfg.height, "height")?,
            &mut pixels,
            gif_speed(cfg.quality),
        );
        gif_frame.delay = delay_centis(delay_ms);
        encoder
            .write_frame(&gif_frame)
            .map_err(|e| FlipbookError::encode(format!("gif frame {index}: {e}")))
    }

    fn end(&mut self) -> FlipbookResult<()> {
        let encoder = self
            .encoder
            .take()
            .ok_or_else(|| FlipbookError::encode("gif sink: end before begin"))?;
        let mut writer = encoder
            .into_inner()
            .map_err(|e| FlipbookError::encode(format!("gif trailer: {e}")))?;
        writer
            .flush()
            .map_err(|e| FlipbookError::encode(format!("gif flush: {e}")))?;
        self.writer = Some(writer);
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/gif.rs"]
mod tests;
