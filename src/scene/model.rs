use std::collections::BTreeSet;

use crate::foundation::core::{BezPath, Canvas, Fps, FrameId, LayerId, Point, Rect, Rgba8, Vec2};
use crate::foundation::error::{FlipbookError, FlipbookResult};
use crate::raster::pixel_buffer::PixelBuffer;
use crate::stroke::outline::DEFAULT_PRESSURE;

/// Upper bound on layers per frame.
pub const MAX_LAYERS_PER_FRAME: usize = 10;

/// Drawing tool that produced a [`Stroke`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    /// Paints the stroke color.
    #[default]
    Brush,
    /// Removes coverage from everything beneath it on the same layer.
    Eraser,
}

/// A freehand stroke as captured from the pointer.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Stroke {
    /// Brush or eraser.
    pub tool: ToolKind,
    /// Centerline samples in canvas space.
    pub points: Vec<Point>,
    /// Per-sample pressure in `[0, 1]`, parallel to `points` when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressures: Option<Vec<f32>>,
    /// Straight-alpha color; ignored by the eraser except for its alpha.
    pub color: Rgba8,
    /// Nominal brush diameter in pixels.
    pub base_size: f64,
}

impl Stroke {
    /// Brush stroke without pressure data.
    pub fn brush(points: Vec<Point>, color: Rgba8, base_size: f64) -> Self {
        Self {
            tool: ToolKind::Brush,
            points,
            pressures: None,
            color,
            base_size,
        }
    }

    /// Eraser stroke without pressure data.
    pub fn eraser(points: Vec<Point>, base_size: f64) -> Self {
        Self {
            tool: ToolKind::Eraser,
            points,
            pressures: None,
            color: Rgba8::BLACK,
            base_size,
        }
    }

    /// Attach per-sample pressures.
    pub fn with_pressures(mut self, pressures: Vec<f32>) -> Self {
        self.pressures = Some(pressures);
        self
    }

    /// Pressure for sample `i`, [`DEFAULT_PRESSURE`] when none was recorded.
    pub fn pressure_at(&self, i: usize) -> f32 {
        self.pressures
            .as_ref()
            .and_then(|p| p.get(i).copied())
            .unwrap_or(DEFAULT_PRESSURE)
    }

    /// Pressure slice suitable for [`crate::build_outline`] (empty when absent).
    pub fn pressure_slice(&self) -> &[f32] {
        self.pressures.as_deref().unwrap_or(&[])
    }

    /// Check points, pressures and size; failures are [`FlipbookError::InvariantViolation`].
    pub fn validate(&self) -> FlipbookResult<()> {
        if self.points.is_empty() {
            return Err(FlipbookError::invariant("stroke must have at least one point"));
        }
        if self.points.iter().any(|p| !p.is_finite()) {
            return Err(FlipbookError::invariant("stroke points must be finite"));
        }
        if let Some(p) = &self.pressures {
            if p.len() != self.points.len() {
                return Err(FlipbookError::invariant(format!(
                    "stroke has {} pressures for {} points",
                    p.len(),
                    self.points.len()
                )));
            }
            if p.iter().any(|v| !(0.0..=1.0).contains(v)) {
                return Err(FlipbookError::invariant("stroke pressures must be in [0, 1]"));
            }
        }
        if !self.base_size.is_finite() || self.base_size <= 0.0 {
            return Err(FlipbookError::invariant(
                "stroke base_size must be finite and > 0",
            ));
        }
        Ok(())
    }
}

/// Geometry of a vector [`Shape`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeGeometry {
    /// Axis-aligned rectangle.
    Rect {
        /// Corners in canvas space.
        rect: Rect,
    },
    /// Axis-aligned ellipse.
    Ellipse {
        /// Center point.
        center: Point,
        /// Horizontal and vertical radii.
        radii: Vec2,
    },
    /// Straight segment; only its outline is painted.
    Line {
        /// Start point.
        from: Point,
        /// End point.
        to: Point,
    },
    /// Arbitrary path.
    Path {
        /// SVG path `d` attribute string.
        svg_path_d: String,
    },
}

/// Outline paint for a [`Shape`].
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ShapeOutline {
    /// Outline color.
    pub color: Rgba8,
    /// Outline width in pixels.
    pub width: f64,
}

/// A vector primitive painted with its own fill and/or outline.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Shape {
    /// What to paint.
    pub geometry: ShapeGeometry,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Interior color; `None` leaves it empty.
    pub fill: Option<Rgba8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Outline paint; `None` draws no outline.
    pub outline: Option<ShapeOutline>,
}

impl Shape {
    /// Centerline path of the geometry.
    pub fn to_path(&self) -> FlipbookResult<BezPath> {
        use kurbo::Shape as _;

        match &self.geometry {
            ShapeGeometry::Rect { rect } => Ok(rect.to_path(0.1)),
            ShapeGeometry::Ellipse { center, radii } => {
                Ok(kurbo::Ellipse::new(*center, *radii, 0.0).to_path(0.1))
            }
            ShapeGeometry::Line { from, to } => Ok(kurbo::Line::new(*from, *to).to_path(0.1)),
            ShapeGeometry::Path { svg_path_d } => BezPath::from_svg(svg_path_d.trim())
                .map_err(|e| FlipbookError::validation(format!("invalid svg_path_d: {e}"))),
        }
    }

    /// Check that the geometry is finite and the paint is usable.
    pub fn validate(&self) -> FlipbookResult<()> {
        if self.fill.is_none() && self.outline.is_none() {
            return Err(FlipbookError::invariant(
                "shape must have a fill or an outline",
            ));
        }
        if let Some(o) = &self.outline
            && (!o.width.is_finite() || o.width <= 0.0)
        {
            return Err(FlipbookError::invariant(
                "shape outline width must be finite and > 0",
            ));
        }
        match &self.geometry {
            ShapeGeometry::Rect { rect } => {
                if !(rect.x0.is_finite() && rect.y0.is_finite())
                    || !(rect.x1.is_finite() && rect.y1.is_finite())
                {
                    return Err(FlipbookError::invariant("shape rect must be finite"));
                }
            }
            ShapeGeometry::Ellipse { center, radii } => {
                if !center.is_finite() || !radii.is_finite() || radii.x < 0.0 || radii.y < 0.0 {
                    return Err(FlipbookError::invariant(
                        "shape ellipse must be finite with non-negative radii",
                    ));
                }
            }
            ShapeGeometry::Line { from, to } => {
                if !from.is_finite() || !to.is_finite() {
                    return Err(FlipbookError::invariant("shape line must be finite"));
                }
            }
            ShapeGeometry::Path { svg_path_d } => {
                if svg_path_d.trim().is_empty() {
                    return Err(FlipbookError::invariant(
                        "shape svg_path_d must be non-empty",
                    ));
                }
                if self.to_path()?.elements().is_empty() {
                    return Err(FlipbookError::invariant("shape svg_path_d has no segments"));
                }
            }
        }
        Ok(())
    }
}

/// Blend mode used when compositing a layer onto the layers beneath it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    /// Straight alpha "source over".
    #[default]
    Normal,
    /// `dst * src`; darkens.
    Multiply,
    /// `1 - (1 - dst) * (1 - src)`; lightens.
    Screen,
    /// Multiply in the shadows, screen in the highlights of the destination.
    Overlay,
    /// Per-channel minimum.
    Darken,
    /// Per-channel maximum.
    Lighten,
}

impl BlendMode {
    /// Every mode, in declaration order.
    pub const ALL: [BlendMode; 6] = [
        BlendMode::Normal,
        BlendMode::Multiply,
        BlendMode::Screen,
        BlendMode::Overlay,
        BlendMode::Darken,
        BlendMode::Lighten,
    ];
}

/// One drawable layer: an optional baked raster with vector overlays painted on top.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Layer {
    /// Stable id, unique within the frame.
    pub id: LayerId,
    /// Display name.
    pub name: String,
    #[serde(default = "default_visible")]
    /// Hidden layers are skipped by the compositor.
    pub visible: bool,
    /// Layer opacity in `[0, 1]`.
    #[serde(default = "default_opacity")]
    pub opacity: f32,
    #[serde(default)]
    /// How the layer combines with the layers beneath it.
    pub blend_mode: BlendMode,
    /// Baked pixels; absent until the layer is first rasterized (e.g. by the fill tool).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raster: Option<PixelBuffer>,
    /// Freehand strokes not yet baked into `raster`, in paint order.
    #[serde(default)]
    pub strokes: Vec<Stroke>,
    /// Vector shapes not yet baked into `raster`, painted after the strokes.
    #[serde(default)]
    pub shapes: Vec<Shape>,
}

fn default_visible() -> bool {
    true
}

fn default_opacity() -> f32 {
    1.0
}

impl Layer {
    /// Visible, fully opaque, empty layer.
    pub fn new(id: LayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            visible: true,
            opacity: 1.0,
            blend_mode: BlendMode::Normal,
            raster: None,
            strokes: Vec::new(),
            shapes: Vec::new(),
        }
    }

    /// `true` when the layer has nothing to paint.
    pub fn is_blank(&self) -> bool {
        self.raster.is_none() && self.strokes.is_empty() && self.shapes.is_empty()
    }

    /// Check opacity and every stroke and shape.
    pub fn validate(&self) -> FlipbookResult<()> {
        if !self.opacity.is_finite() || !(0.0..=1.0).contains(&self.opacity) {
            return Err(FlipbookError::validation(format!(
                "layer '{}' opacity must be in [0, 1]",
                self.name
            )));
        }
        for (i, s) in self.strokes.iter().enumerate() {
            s.validate().map_err(|e| {
                FlipbookError::validation(format!("layer '{}' stroke {i}: {e}", self.name))
            })?;
        }
        for (i, s) in self.shapes.iter().enumerate() {
            s.validate().map_err(|e| {
                FlipbookError::validation(format!("layer '{}' shape {i}: {e}", self.name))
            })?;
        }
        Ok(())
    }
}

/// A single animation frame: a bottom-to-top layer stack held for `duration_ticks`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Frame {
    /// Stable id, unique within the sequence.
    pub id: FrameId,
    /// Layer stack, bottom first.
    pub layers: Vec<Layer>,
    #[serde(default = "default_duration_ticks")]
    /// Hold time in ticks, at least 1.
    pub duration_ticks: u32,
}

fn default_duration_ticks() -> u32 {
    1
}

impl Frame {
    /// Frame with one empty layer held for one tick.
    pub fn new(id: FrameId, first_layer: LayerId) -> Self {
        Self {
            id,
            layers: vec![Layer::new(first_layer, "Layer 1")],
            duration_ticks: 1,
        }
    }

    /// Layer with `id`, if present.
    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id)
    }

    /// Stack position of the layer with `id`.
    pub fn layer_index(&self, id: LayerId) -> Option<usize> {
        self.layers.iter().position(|l| l.id == id)
    }

    /// Check layer count, id uniqueness, duration and every layer.
    pub fn validate(&self) -> FlipbookResult<()> {
        if self.layers.is_empty() {
            return Err(FlipbookError::validation(format!(
                "frame {} must have at least one layer",
                self.id.0
            )));
        }
        if self.layers.len() > MAX_LAYERS_PER_FRAME {
            return Err(FlipbookError::validation(format!(
                "frame {} has {} layers (max {MAX_LAYERS_PER_FRAME})",
                self.id.0,
                self.layers.len()
            )));
        }
        if self.duration_ticks == 0 {
            return Err(FlipbookError::validation(format!(
                "frame {} duration_ticks must be >= 1",
                self.id.0
            )));
        }
        let mut seen = BTreeSet::new();
        for layer in &self.layers {
            if !seen.insert(layer.id) {
                return Err(FlipbookError::validation(format!(
                    "frame {} has duplicate layer id {}",
                    self.id.0, layer.id.0
                )));
            }
            layer.validate()?;
        }
        Ok(())
    }
}

/// The whole animation document: canvas, rate, and the ordered frames.
///
/// This is a pure data model with no live handles, so it serializes directly to JSON (see
/// [`AnimationSequence::to_json`]).
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AnimationSequence {
    /// Size shared by every frame.
    pub canvas: Canvas,
    /// Playback rate.
    pub fps: Fps,
    /// Frames in playback order.
    pub frames: Vec<Frame>,
    /// Global playback position in ticks; resolved against cumulative frame durations.
    #[serde(default)]
    pub playhead_tick: u64,
}

impl AnimationSequence {
    /// One frame with one empty layer.
    pub fn new(canvas: Canvas, fps: Fps) -> Self {
        Self {
            canvas,
            fps,
            frames: vec![Frame::new(FrameId(1), LayerId(1))],
            playhead_tick: 0,
        }
    }

    /// Number of frames.
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Sum of all frame durations.
    pub fn total_duration_ticks(&self) -> u64 {
        self.frames.iter().map(|f| u64::from(f.duration_ticks)).sum()
    }

    /// Playback length of one loop in seconds.
    pub fn total_duration_secs(&self) -> f64 {
        self.fps.ticks_to_secs(self.total_duration_ticks())
    }

    /// Per-frame durations, in order.
    pub fn frame_durations(&self) -> Vec<u32> {
        self.frames.iter().map(|f| f.duration_ticks).collect()
    }

    /// Playback position of the frame with `id`.
    pub fn frame_index(&self, id: FrameId) -> Option<usize> {
        self.frames.iter().position(|f| f.id == id)
    }

    /// Fresh frame id, one past the largest in use.
    pub fn next_frame_id(&self) -> FrameId {
        FrameId(self.frames.iter().map(|f| f.id.0).max().unwrap_or(0) + 1)
    }

    /// Fresh layer id, unique across every frame.
    pub fn next_layer_id(&self) -> LayerId {
        let max = self
            .frames
            .iter()
            .flat_map(|f| f.layers.iter().map(|l| l.id.0))
            .max()
            .unwrap_or(0);
        LayerId(max + 1)
    }

    /// Check every structural invariant of the document.
    pub fn validate(&self) -> FlipbookResult<()> {
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(FlipbookError::validation("canvas width/height must be > 0"));
        }
        if self.frames.is_empty() {
            return Err(FlipbookError::validation(
                "animation must have at least one frame",
            ));
        }
        let mut seen = BTreeSet::new();
        for frame in &self.frames {
            if !seen.insert(frame.id) {
                return Err(FlipbookError::validation(format!(
                    "duplicate frame id {}",
                    frame.id.0
                )));
            }
            frame.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/model.rs"]
mod tests;
