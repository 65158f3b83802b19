use kurbo::Shape as _;

use crate::foundation::core::Point;
use crate::scene::model::{Layer, ToolKind};
use crate::render::rasterize::{expand_outline, stroke_fill_path};
use crate::stroke::outline::OutlineOpts;

/// Vector item found under a point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HitTarget {
    /// Index into `layer.strokes`.
    Stroke(usize),
    /// Index into `layer.shapes`.
    Shape(usize),
}

/// Topmost brush stroke or shape of `layer` whose painted area contains `point`.
///
/// Shapes paint over strokes, so they are tested first, newest to oldest. Eraser strokes and
/// items that fail validation never hit.
pub fn hit_test_layer(layer: &Layer, point: Point, opts: &OutlineOpts) -> Option<HitTarget> {
    for (i, shape) in layer.shapes.iter().enumerate().rev() {
        if shape.validate().is_err() {
            continue;
        }
        let Ok(path) = shape.to_path() else {
            continue;
        };
        if shape.fill.is_some() && path.contains(point) {
            return Some(HitTarget::Shape(i));
        }
        if let Some(outline) = shape.outline
            && expand_outline(&path, outline.width).contains(point)
        {
            return Some(HitTarget::Shape(i));
        }
    }

    for (i, stroke) in layer.strokes.iter().enumerate().rev() {
        if stroke.tool == ToolKind::Eraser || stroke.validate().is_err() {
            continue;
        }
        if let Ok(Some(path)) = stroke_fill_path(stroke, opts)
            && path.contains(point)
        {
            return Some(HitTarget::Stroke(i));
        }
    }
    None
}

#[cfg(test)]
#[path = "../../tests/unit/studio/hit.rs"]
mod tests;
