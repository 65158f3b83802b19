use super::*;
use crate::foundation::core::{Fps, Rgba8};

/// Accepts `budget` bytes, then fails every write like a full disk.
struct ShortWriter {
    written: Vec<u8>,
    budget: usize,
}

impl Write for ShortWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let room = self.budget - self.written.len();
        if room == 0 {
            return Err(std::io::Error::other("disk full"));
        }
        let n = room.min(buf.len());
        self.written.extend_from_slice(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Takes every byte but cannot flush.
struct NoFlush(Vec<u8>);

impl Write for NoFlush {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Err(std::io::Error::other("broken pipe"))
    }
}

fn config() -> ExportConfig {
    ExportConfig {
        width: 4,
        height: 4,
        fps: Fps::default(),
        quality: 80,
        loop_count: 0,
    }
}

fn encode_into<W: Write + Send>(sink: &mut GifSink<W>) -> FlipbookResult<()> {
    let frame = PixelBuffer::filled(4, 4, Rgba8::new(0, 0, 255, 255));
    sink.begin(config())?;
    sink.push_frame(0, &frame, 83)?;
    sink.end()
}

#[test]
fn finished_stream_ends_with_trailer() {
    let mut sink = GifSink::new(Vec::new());
    encode_into(&mut sink).unwrap();
    let bytes = sink.into_inner().unwrap();
    assert!(bytes.starts_with(b"GIF89a"));
    assert_eq!(bytes.last(), Some(&0x3B));
}

#[test]
fn failed_trailer_write_is_reported() {
    let mut full = GifSink::new(Vec::new());
    encode_into(&mut full).unwrap();
    let len = full.into_inner().unwrap().len();

    // Room for everything except the final trailer byte.
    let mut sink = GifSink::new(ShortWriter {
        written: Vec::new(),
        budget: len - 1,
    });
    let err = encode_into(&mut sink).unwrap_err();
    assert!(matches!(err, FlipbookError::Encode(_)));
    assert!(err.to_string().contains("trailer"));
}

#[test]
fn failed_flush_is_reported() {
    let mut sink = GifSink::new(NoFlush(Vec::new()));
    let err = encode_into(&mut sink).unwrap_err();
    assert!(err.to_string().contains("broken pipe"));
}

#[test]
fn wrong_frame_size_and_misuse_are_rejected() {
    let mut sink = GifSink::new(Vec::new());
    let frame = PixelBuffer::new(4, 4);
    assert!(sink.push_frame(0, &frame, 10).is_err());
    assert!(sink.end().is_err());

    sink.begin(config()).unwrap();
    assert!(sink.push_frame(0, &PixelBuffer::new(2, 2), 10).is_err());
    assert!(sink.begin(config()).is_err());
}

#[test]
fn quality_and_delay_conversions() {
    assert_eq!(gif_speed(1), 30);
    assert_eq!(gif_speed(100), 1);
    assert_eq!(delay_centis(83), 8);
    assert_eq!(delay_centis(250), 25);
    assert_eq!(delay_centis(u32::MAX), u16::MAX);
}
