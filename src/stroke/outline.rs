use std::f64::consts::PI;

use kurbo::{Arc, BezPath, Point, Vec2};

use crate::foundation::error::{FlipbookError, FlipbookResult};

/// Pressure assumed for samples that did not report one.
pub const DEFAULT_PRESSURE: f32 = 0.5;

/// Flattening tolerance (pixels) used when turning cap arcs into curves.
const CAP_TOLERANCE: f64 = 0.1;

/// How the ends of a stroke outline are closed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineCap {
    /// Straight edge between the left and right end points.
    Butt,
    /// Semicircle of half the local width around the end point.
    #[default]
    Round,
}

/// Pressure-to-width mapping and cap style for [`build_outline`].
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct OutlineOpts {
    /// Width multiplier at pressure 0.
    pub min_width_ratio: f64,
    /// Width multiplier at pressure 1.
    pub max_width_ratio: f64,
    /// End treatment.
    pub line_cap: LineCap,
}

impl Default for OutlineOpts {
    fn default() -> Self {
        Self {
            min_width_ratio: 0.3,
            max_width_ratio: 1.5,
            line_cap: LineCap::Round,
        }
    }
}

impl OutlineOpts {
    /// Reject negative or non-finite ratios and `max < min`.
    pub fn validate(&self) -> FlipbookResult<()> {
        if !self.min_width_ratio.is_finite() || self.min_width_ratio < 0.0 {
            return Err(FlipbookError::validation(
                "min_width_ratio must be finite and >= 0",
            ));
        }
        if !self.max_width_ratio.is_finite() || self.max_width_ratio < self.min_width_ratio {
            return Err(FlipbookError::validation(
                "max_width_ratio must be finite and >= min_width_ratio",
            ));
        }
        Ok(())
    }

    /// Full stroke width for one sample.
    pub fn width_at(&self, base_size: f64, pressure: f32) -> f64 {
        let p = f64::from(pressure.clamp(0.0, 1.0));
        base_size * (self.min_width_ratio + (self.max_width_ratio - self.min_width_ratio) * p)
    }
}

/// Left and right boundary polylines of a variable-width stroke.
///
/// `left[i]` and `right[i]` sit on either side of centerline vertex `i`, half the local width
/// away. An empty outline means nothing should be drawn.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StrokeOutline {
    /// Boundary points on the left of the direction of travel.
    pub left: Vec<Point>,
    /// Boundary points on the right of the direction of travel.
    pub right: Vec<Point>,
    /// End treatment used by [`StrokeOutline::to_path`].
    pub line_cap: LineCap,
}

impl StrokeOutline {
    /// True when there is nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }

    /// Semicircle closing the far end, from the last left point to the last right point.
    pub fn end_cap(&self) -> Option<Arc> {
        let (l, r) = (*self.left.last()?, *self.right.last()?);
        self.cap_arc(l, r)
    }

    /// Semicircle closing the near end, from the first right point to the first left point.
    pub fn start_cap(&self) -> Option<Arc> {
        let (l, r) = (*self.left.first()?, *self.right.first()?);
        self.cap_arc(r, l)
    }

    fn cap_arc(&self, from: Point, to: Point) -> Option<Arc> {
        if self.line_cap != LineCap::Round {
            return None;
        }
        let center = from.midpoint(to);
        let radius = from.distance(to) / 2.0;
        let v = from - center;
        Some(Arc::new(
            center,
            Vec2::new(radius, radius),
            v.y.atan2(v.x),
            PI,
            0.0,
        ))
    }

    /// The closed fill shape: left forward, end cap, right reversed, start cap.
    pub fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        let (Some(&first), Some(&last_right)) = (self.left.first(), self.right.last()) else {
            return path;
        };

        path.move_to(first);
        for &p in &self.left[1..] {
            path.line_to(p);
        }
        match self.end_cap() {
            Some(arc) => path.extend(arc.append_iter(CAP_TOLERANCE)),
            None => path.line_to(last_right),
        }
        for &p in self.right.iter().rev() {
            path.line_to(p);
        }
        if let Some(arc) = self.start_cap() {
            path.extend(arc.append_iter(CAP_TOLERANCE));
        }
        path.close_path();
        path
    }
}

/// Convert a centerline with per-vertex pressure into left/right boundary polylines.
///
/// Missing pressure entries default to [`DEFAULT_PRESSURE`]. Fewer than two points yield an
/// empty outline.
pub fn build_outline(
    points: &[Point],
    pressures: &[f32],
    base_size: f64,
    opts: &OutlineOpts,
) -> FlipbookResult<StrokeOutline> {
    if !base_size.is_finite() || base_size <= 0.0 {
        return Err(FlipbookError::validation(
            "stroke base size must be finite and > 0",
        ));
    }
    opts.validate()?;

    let n = points.len();
    let mut out = StrokeOutline {
        left: Vec::new(),
        right: Vec::new(),
        line_cap: opts.line_cap,
    };
    if n < 2 {
        return Ok(out);
    }

    out.left.reserve(n);
    out.right.reserve(n);
    for (i, &p) in points.iter().enumerate() {
        let pressure = pressures.get(i).copied().unwrap_or(DEFAULT_PRESSURE);
        let half = opts.width_at(base_size, pressure) / 2.0;

        let tangent = match i {
            0 => points[1] - points[0],
            _ if i == n - 1 => points[n - 1] - points[n - 2],
            _ => points[i + 1] - points[i - 1],
        };
        let len = tangent.hypot();
        let perp = if len > 0.0 && len.is_finite() {
            Vec2::new(-tangent.y / len, tangent.x / len) * half
        } else {
            Vec2::new(0.0, half)
        };

        out.left.push(p - perp);
        out.right.push(p + perp);
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/stroke/outline.rs"]
mod tests;
