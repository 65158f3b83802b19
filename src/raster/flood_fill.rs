use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::foundation::core::{Rgb8, Rgba8};
use crate::foundation::error::{FlipbookError, FlipbookResult};
use crate::raster::pixel_buffer::PixelBuffer;

/// Cooperative cancellation flag checked by [`flood_fill_cancellable`] between spans.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Fresh, not yet cancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask every fill holding a clone of this token to stop.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether [`CancelToken::cancel`] has been called.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// One horizontal run `[x0, x1]` (inclusive) of filled pixels on row `y`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FillSpan {
    /// Row.
    pub y: u32,
    /// First column.
    pub x0: u32,
    /// Last column, inclusive.
    pub x1: u32,
}

impl FillSpan {
    /// Pixels in the span.
    pub fn pixel_count(self) -> u64 {
        u64::from(self.x1 - self.x0) + 1
    }
}

/// The region a fill covered: the visited bitmap plus the spans it was built from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FillMask {
    width: u32,
    height: u32,
    visited: Vec<bool>,
    spans: Vec<FillSpan>,
}

impl FillMask {
    fn empty(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            visited: Vec::new(),
            spans: Vec::new(),
        }
    }

    /// Width of the buffer the mask was computed on.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height of the buffer the mask was computed on.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Covered spans in discovery order.
    pub fn spans(&self) -> &[FillSpan] {
        &self.spans
    }

    /// True when nothing was covered.
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Total covered pixels.
    pub fn pixel_count(&self) -> u64 {
        self.spans.iter().map(|s| s.pixel_count()).sum()
    }

    /// Whether `(x, y)` lies in the region; `false` outside the buffer.
    pub fn contains(&self, x: i64, y: i64) -> bool {
        if self.visited.is_empty()
            || x < 0
            || y < 0
            || x >= i64::from(self.width)
            || y >= i64::from(self.height)
        {
            return false;
        }
        self.visited[(y as usize) * (self.width as usize) + (x as usize)]
    }

    /// Paint every covered pixel of `dst` with `color` (alpha forced to 255).
    ///
    /// `dst` must have the dimensions the mask was computed on.
    pub fn apply(&self, dst: &mut PixelBuffer, color: Rgb8) -> FlipbookResult<()> {
        if dst.width() != self.width || dst.height() != self.height {
            return Err(FlipbookError::invariant(format!(
                "fill mask {}x{} applied to {}x{} buffer",
                self.width,
                self.height,
                dst.width(),
                dst.height()
            )));
        }
        let px = Rgba8::from(color).to_array();
        let stride = self.width as usize;
        let bytes = dst.as_bytes_mut();
        for span in &self.spans {
            let row = (span.y as usize) * stride;
            let start = (row + span.x0 as usize) * 4;
            let end = (row + span.x1 as usize + 1) * 4;
            for d in bytes[start..end].chunks_exact_mut(4) {
                d.copy_from_slice(&px);
            }
        }
        Ok(())
    }
}

/// Result of a fill.
#[derive(Clone, Debug)]
pub struct FillOutcome {
    /// Number of pixels recolored.
    pub filled_pixels: u64,
    /// Number of horizontal spans the region decomposed into.
    pub spans: u64,
    /// Region covered by the fill (empty for no-op and cancelled fills).
    pub mask: FillMask,
    /// `true` when the fill stopped on a [`CancelToken`]; the buffer is then untouched.
    pub cancelled: bool,
}

impl FillOutcome {
    fn noop(width: u32, height: u32) -> Self {
        Self {
            filled_pixels: 0,
            spans: 0,
            mask: FillMask::empty(width, height),
            cancelled: false,
        }
    }

    fn cancelled(width: u32, height: u32) -> Self {
        Self {
            cancelled: true,
            ..Self::noop(width, height)
        }
    }

    /// True when no pixel changed.
    pub fn is_noop(&self) -> bool {
        self.filled_pixels == 0
    }
}

/// Replace the 4-connected region of pixels exactly equal to the seed pixel with `fill`
/// (alpha forced to 255).
///
/// Scanline fill: each popped seed is grown left and right into a maximal span, and the rows
/// above and below push a single seed per contiguous run of unvisited matching pixels. The
/// work stack therefore holds spans, not pixels.
///
/// A seed outside the buffer fails with `OutOfBounds`; a seed that already has the opaque fill
/// color is a no-op.
#[tracing::instrument(skip(buffer), fields(width = buffer.width(), height = buffer.height()))]
pub fn flood_fill(
    buffer: &mut PixelBuffer,
    seed_x: i64,
    seed_y: i64,
    fill: Rgb8,
) -> FlipbookResult<FillOutcome> {
    fill_impl(buffer, seed_x, seed_y, fill, None)
}

/// [`flood_fill`] with a cancellation check at every span boundary.
///
/// The region is fully computed before any pixel is written, so a cancelled call leaves the
/// buffer unmodified; non-cancelled output is identical to [`flood_fill`].
pub fn flood_fill_cancellable(
    buffer: &mut PixelBuffer,
    seed_x: i64,
    seed_y: i64,
    fill: Rgb8,
    cancel: &CancelToken,
) -> FlipbookResult<FillOutcome> {
    fill_impl(buffer, seed_x, seed_y, fill, Some(cancel))
}

/// Compute the region [`flood_fill`] would cover without modifying `buffer`.
pub fn fill_region(buffer: &PixelBuffer, seed_x: i64, seed_y: i64) -> FlipbookResult<FillMask> {
    let target = buffer.get(seed_x, seed_y)?;
    Ok(scan_region(buffer, seed_x as u32, seed_y as u32, target, None)
        .unwrap_or_else(|| FillMask::empty(buffer.width(), buffer.height())))
}

fn fill_impl(
    buffer: &mut PixelBuffer,
    seed_x: i64,
    seed_y: i64,
    fill: Rgb8,
    cancel: Option<&CancelToken>,
) -> FlipbookResult<FillOutcome> {
    let target = buffer.get(seed_x, seed_y)?;
    let (width, height) = (buffer.width(), buffer.height());

    if target == Rgba8::from(fill) {
        return Ok(FillOutcome::noop(width, height));
    }

    let Some(mask) = scan_region(buffer, seed_x as u32, seed_y as u32, target, cancel) else {
        tracing::debug!("flood fill cancelled");
        return Ok(FillOutcome::cancelled(width, height));
    };
    mask.apply(buffer, fill)?;

    let filled_pixels = mask.pixel_count();
    let spans = mask.spans.len() as u64;
    tracing::debug!(filled_pixels, spans, "flood fill complete");
    Ok(FillOutcome {
        filled_pixels,
        spans,
        mask,
        cancelled: false,
    })
}

/// Span walk from an in-bounds seed. Returns `None` only when cancelled.
fn scan_region(
    buffer: &PixelBuffer,
    seed_x: u32,
    seed_y: u32,
    target: Rgba8,
    cancel: Option<&CancelToken>,
) -> Option<FillMask> {
    let (width, height) = (buffer.width(), buffer.height());
    let stride = width as usize;
    let target = target.to_array();
    let bytes = buffer.as_bytes();
    let matches = |x: u32, y: u32| -> bool {
        let i = ((y as usize) * stride + (x as usize)) * 4;
        bytes[i..i + 4] == target
    };

    let mut visited = vec![false; stride * (height as usize)];
    let mut spans = Vec::new();
    let mut stack = vec![(seed_x, seed_y)];

    while let Some((x, y)) = stack.pop() {
        if cancel.is_some_and(CancelToken::is_cancelled) {
            return None;
        }
        let row = (y as usize) * stride;
        if visited[row + x as usize] || !matches(x, y) {
            continue;
        }

        let mut x0 = x;
        while x0 > 0 && !visited[row + x0 as usize - 1] && matches(x0 - 1, y) {
            x0 -= 1;
        }
        let mut x1 = x;
        while x1 + 1 < width && !visited[row + x1 as usize + 1] && matches(x1 + 1, y) {
            x1 += 1;
        }
        visited[row + x0 as usize..=row + x1 as usize].fill(true);
        spans.push(FillSpan { y, x0, x1 });

        let mut push_runs = |ny: u32| {
            let nrow = (ny as usize) * stride;
            let mut in_run = false;
            for nx in x0..=x1 {
                let open = !visited[nrow + nx as usize] && matches(nx, ny);
                if open && !in_run {
                    stack.push((nx, ny));
                }
                in_run = open;
            }
        };
        if y > 0 {
            push_runs(y - 1);
        }
        if y + 1 < height {
            push_runs(y + 1);
        }
    }

    Some(FillMask {
        width,
        height,
        visited,
        spans,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/raster/flood_fill.rs"]
mod tests;
