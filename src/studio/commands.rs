use crate::foundation::core::{Fps, LayerId, Rgb8};
use crate::scene::model::{BlendMode, Shape, Stroke};

/// An undoable edit to the open document.
///
/// Frames are addressed by index in playback order, layers by id within that frame.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    /// Insert a blank frame after `after`, or append when `None`.
    AddFrame {
        /// Frame index to insert after.
        after: Option<usize>,
    },
    /// Deep-copy a frame (fresh ids) and insert the copy right after it.
    DuplicateFrame {
        /// Frame to copy.
        index: usize,
    },
    /// Remove a frame; the last remaining frame cannot be deleted.
    DeleteFrame {
        /// Frame to remove.
        index: usize,
    },
    /// Change how long a frame is held.
    SetFrameDuration {
        /// Frame to change.
        index: usize,
        /// New hold time, at least 1.
        ticks: u32,
    },
    /// Push a new empty layer on top of the stack.
    AddLayer {
        /// Target frame.
        frame: usize,
        /// Display name; numbered automatically when `None`.
        name: Option<String>,
    },
    /// Remove a layer; the last layer of a frame cannot be deleted.
    DeleteLayer {
        /// Target frame.
        frame: usize,
        /// Layer to remove.
        layer: LayerId,
    },
    /// Move a layer to stack position `to` (0 is the bottom).
    MoveLayer {
        /// Target frame.
        frame: usize,
        /// Layer to move.
        layer: LayerId,
        /// New stack position.
        to: usize,
    },
    /// Flatten a layer into the one directly beneath it.
    MergeLayerDown {
        /// Target frame.
        frame: usize,
        /// Upper layer of the pair.
        layer: LayerId,
    },
    /// Show or hide a layer.
    SetLayerVisible {
        /// Target frame.
        frame: usize,
        /// Layer to change.
        layer: LayerId,
        /// New visibility.
        visible: bool,
    },
    /// Change a layer's opacity.
    SetLayerOpacity {
        /// Target frame.
        frame: usize,
        /// Layer to change.
        layer: LayerId,
        /// New opacity in `[0, 1]`.
        opacity: f32,
    },
    /// Change a layer's blend mode.
    SetBlendMode {
        /// Target frame.
        frame: usize,
        /// Layer to change.
        layer: LayerId,
        /// New mode.
        mode: BlendMode,
    },
    /// Rename a layer.
    RenameLayer {
        /// Target frame.
        frame: usize,
        /// Layer to change.
        layer: LayerId,
        /// New display name.
        name: String,
    },
    /// Append a finished stroke to a layer.
    CommitStroke {
        /// Target frame.
        frame: usize,
        /// Target layer.
        layer: LayerId,
        /// The stroke, as recorded.
        stroke: Stroke,
    },
    /// Append a vector shape to a layer.
    AddShape {
        /// Target frame.
        frame: usize,
        /// Target layer.
        layer: LayerId,
        /// The shape.
        shape: Shape,
    },
    /// Flood fill from `(x, y)`, sampling the layer as drawn.
    Fill {
        /// Target frame.
        frame: usize,
        /// Target layer.
        layer: LayerId,
        /// Seed column.
        x: i64,
        /// Seed row.
        y: i64,
        /// Fill color; written fully opaque.
        color: Rgb8,
    },
    /// Drop the layer's raster and every vector item.
    ClearLayer {
        /// Target frame.
        frame: usize,
        /// Layer to clear.
        layer: LayerId,
    },
    /// Change the document's playback rate.
    SetFps {
        /// New rate.
        fps: Fps,
    },
}

impl Command {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Command::AddFrame { .. } => "add_frame",
            Command::DuplicateFrame { .. } => "duplicate_frame",
            Command::DeleteFrame { .. } => "delete_frame",
            Command::SetFrameDuration { .. } => "set_frame_duration",
            Command::AddLayer { .. } => "add_layer",
            Command::DeleteLayer { .. } => "delete_layer",
            Command::MoveLayer { .. } => "move_layer",
            Command::MergeLayerDown { .. } => "merge_layer_down",
            Command::SetLayerVisible { .. } => "set_layer_visible",
            Command::SetLayerOpacity { .. } => "set_layer_opacity",
            Command::SetBlendMode { .. } => "set_blend_mode",
            Command::RenameLayer { .. } => "rename_layer",
            Command::CommitStroke { .. } => "commit_stroke",
            Command::AddShape { .. } => "add_shape",
            Command::Fill { .. } => "fill",
            Command::ClearLayer { .. } => "clear_layer",
            Command::SetFps { .. } => "set_fps",
        }
    }
}
