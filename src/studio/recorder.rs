use crate::foundation::core::{Point, Rgba8};
use crate::scene::model::{Stroke, ToolKind};
use crate::stroke::outline::DEFAULT_PRESSURE;

/// Kind of device that produced a [`PointerSample`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    #[default]
    /// Mouse or trackpad; no pressure.
    Mouse,
    /// Stylus with a pressure sensor.
    Pen,
    /// Finger on a touch screen.
    Touch,
}

/// One pointer event in canvas coordinates.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PointerSample {
    /// Canvas x.
    pub x: f64,
    /// Canvas y.
    pub y: f64,
    /// `None` when the device has no pressure sensor.
    #[serde(default)]
    pub pressure: Option<f32>,
    #[serde(default)]
    /// Device that produced the event.
    pub device: DeviceKind,
}

impl PointerSample {
    /// Mouse sample without pressure.
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            pressure: None,
            device: DeviceKind::Mouse,
        }
    }

    /// Pen sample with a pressure reading.
    pub fn pen(x: f64, y: f64, pressure: f32) -> Self {
        Self {
            x,
            y,
            pressure: Some(pressure),
            device: DeviceKind::Pen,
        }
    }
}

/// Anything that yields pointer samples for one stroke (pointer down to pointer up).
pub trait InputSampleSource {
    /// Next sample of the current stroke; `None` on pointer up.
    fn next_sample(&mut self) -> Option<PointerSample>;
}

impl<I: Iterator<Item = PointerSample>> InputSampleSource for I {
    fn next_sample(&mut self) -> Option<PointerSample> {
        self.next()
    }
}

/// Accumulates pointer samples into a [`Stroke`].
#[derive(Clone, Debug)]
pub struct StrokeRecorder {
    tool: ToolKind,
    color: Rgba8,
    base_size: f64,
    points: Vec<Point>,
    pressures: Vec<f32>,
    saw_pressure: bool,
}

impl StrokeRecorder {
    /// Pointer down: start a stroke with the given tool settings.
    pub fn begin(tool: ToolKind, color: Rgba8, base_size: f64) -> Self {
        Self {
            tool,
            color,
            base_size,
            points: Vec::new(),
            pressures: Vec::new(),
            saw_pressure: false,
        }
    }

    /// Pointer move. Non-finite samples and exact repeats of the previous point are dropped.
    pub fn push(&mut self, sample: PointerSample) {
        if !sample.x.is_finite() || !sample.y.is_finite() {
            tracing::debug!(?sample, "dropping non-finite pointer sample");
            return;
        }
        let p = Point::new(sample.x, sample.y);
        if self.points.last() == Some(&p) {
            return;
        }
        let pressure = match sample.pressure {
            Some(v) if v.is_finite() => {
                self.saw_pressure = true;
                v.clamp(0.0, 1.0)
            }
            _ => DEFAULT_PRESSURE,
        };
        self.points.push(p);
        self.pressures.push(pressure);
    }

    /// Samples kept so far.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True before the first accepted sample.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Pointer up. `None` when nothing was recorded.
    ///
    /// Pressures are kept only if at least one sample reported a real value.
    pub fn finish(self) -> Option<Stroke> {
        if self.points.is_empty() {
            return None;
        }
        Some(Stroke {
            tool: self.tool,
            points: self.points,
            pressures: self.saw_pressure.then_some(self.pressures),
            color: self.color,
            base_size: self.base_size,
        })
    }

    /// Drain `source` and finish the stroke.
    pub fn record_from(mut self, source: &mut impl InputSampleSource) -> Option<Stroke> {
        while let Some(sample) = source.next_sample() {
            self.push(sample);
        }
        self.finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/studio/recorder.rs"]
mod tests;
