//! Flipbook is the computational core of a frame-by-frame raster animation studio.
//!
//! The document model is plain data ([`AnimationSequence`] → [`Frame`] → [`Layer`]) and every
//! algorithm takes the state it works on as a parameter:
//!
//! - [`PixelBuffer`] and scanline [`flood_fill`]
//! - [`build_outline`] for variable-width pressure strokes
//! - [`LayerCompositor`] with per-layer opacity and [`BlendMode`]
//! - [`FrameSequencer`] and [`PlaybackClock`] for looping playback
//! - [`Studio`] for command-driven editing with undo
//! - [`export_sequence`] streaming flattened frames into a [`FrameSink`] such as [`GifSink`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

pub(crate) mod export;
pub(crate) mod raster;
pub(crate) mod render;
pub(crate) mod scene;
pub(crate) mod stroke;
pub(crate) mod studio;
pub(crate) mod timeline;

pub use crate::foundation::core::{
    BezPath, Canvas, Fps, FrameId, LayerId, MAX_FPS, MIN_FPS, Point, Rect, Rgb8, Rgba8, Vec2,
};
pub use crate::foundation::error::{FlipbookError, FlipbookResult};

pub use crate::export::gif::GifSink;
pub use crate::export::pipeline::{
    ExportOpts, ExportStats, encode_gif, export_sequence, frame_delay_ms, save_gif, thumbnail,
};
pub use crate::export::sink::{ExportConfig, FrameSink, InMemorySink};
pub use crate::raster::flood_fill::{
    CancelToken, FillMask, FillOutcome, FillSpan, fill_region, flood_fill, flood_fill_cancellable,
};
pub use crate::raster::pixel_buffer::{ImageFormat, PixelBuffer};
pub use crate::render::compositor::{CompositeOpts, LayerCompositor, blend_pixel, composite_layers};
pub use crate::render::onion::{OnionSkinOpts, render_onion_skin};
pub use crate::render::rasterize::{LayerRasterizer, rasterize_layer, stroke_fill_path};
pub use crate::scene::model::{
    AnimationSequence, BlendMode, Frame, Layer, MAX_LAYERS_PER_FRAME, Shape, ShapeGeometry,
    ShapeOutline, Stroke, ToolKind,
};
pub use crate::stroke::outline::{
    DEFAULT_PRESSURE, LineCap, OutlineOpts, StrokeOutline, build_outline,
};
pub use crate::studio::commands::Command;
pub use crate::studio::hit::{HitTarget, hit_test_layer};
pub use crate::studio::history::History;
pub use crate::studio::recorder::{DeviceKind, InputSampleSource, PointerSample, StrokeRecorder};
pub use crate::studio::session::{Studio, StudioOpts};
pub use crate::timeline::clock::PlaybackClock;
pub use crate::timeline::sequencer::FrameSequencer;
