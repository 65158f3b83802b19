use crate::foundation::error::{FlipbookError, FlipbookResult};
use crate::scene::model::AnimationSequence;

/// Maps a looping tick counter onto frame indices with per-frame hold durations.
///
/// `prefix[i]` is the tick at which frame `i` starts; `prefix[n]` is the total duration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameSequencer {
    durations: Vec<u32>,
    prefix: Vec<u64>,
    active: usize,
    tick_in_frame: u32,
}

fn prefix_sums(durations: &[u32]) -> FlipbookResult<Vec<u64>> {
    if durations.is_empty() {
        return Err(FlipbookError::validation(
            "sequencer needs at least one frame",
        ));
    }
    let mut prefix = Vec::with_capacity(durations.len() + 1);
    let mut acc = 0u64;
    prefix.push(0);
    for (i, &d) in durations.iter().enumerate() {
        if d == 0 {
            return Err(FlipbookError::validation(format!(
                "frame {i} duration must be >= 1 tick"
            )));
        }
        acc += u64::from(d);
        prefix.push(acc);
    }
    Ok(prefix)
}

impl FrameSequencer {
    /// Sequencer positioned at frame 0, tick 0.
    pub fn new(durations: &[u32]) -> FlipbookResult<Self> {
        Ok(Self {
            prefix: prefix_sums(durations)?,
            durations: durations.to_vec(),
            active: 0,
            tick_in_frame: 0,
        })
    }

    /// Sequencer over `sequence`'s frames, positioned at its stored playhead.
    pub fn for_sequence(sequence: &AnimationSequence) -> FlipbookResult<Self> {
        let mut s = Self::new(&sequence.frame_durations())?;
        s.seek_tick(sequence.playhead_tick);
        Ok(s)
    }

    /// Replace the frame durations after an edit, keeping the position as close as possible.
    pub fn set_durations(&mut self, durations: &[u32]) -> FlipbookResult<()> {
        self.prefix = prefix_sums(durations)?;
        self.durations = durations.to_vec();
        self.active = self.active.min(self.durations.len() - 1);
        self.tick_in_frame = self.tick_in_frame.min(self.durations[self.active] - 1);
        Ok(())
    }

    /// Number of frames.
    pub fn frame_count(&self) -> usize {
        self.durations.len()
    }

    /// Per-frame durations in ticks.
    pub fn durations(&self) -> &[u32] {
        &self.durations
    }

    /// Frame currently showing.
    pub fn active_index(&self) -> usize {
        self.active
    }

    /// Ticks already spent on the active frame.
    pub fn tick_within_frame(&self) -> u32 {
        self.tick_in_frame
    }

    /// Length of one loop in ticks.
    pub fn total_duration_ticks(&self) -> u64 {
        self.prefix[self.durations.len()]
    }

    /// Ticks elapsed before frame `index`; `index == frame_count()` gives the total.
    pub fn frame_start_tick(&self, index: usize) -> Option<u64> {
        self.prefix.get(index).copied()
    }

    /// Current global position in `[0, total_duration_ticks)`.
    pub fn playhead_tick(&self) -> u64 {
        self.prefix[self.active] + u64::from(self.tick_in_frame)
    }

    /// Advance one tick, wrapping to frame 0 after the last frame. Returns the active index.
    pub fn tick(&mut self) -> usize {
        self.tick_in_frame += 1;
        if self.tick_in_frame >= self.durations[self.active] {
            self.active = (self.active + 1) % self.durations.len();
            self.tick_in_frame = 0;
        }
        self.active
    }

    /// Advance `ticks` ticks at once.
    pub fn advance(&mut self, ticks: u64) -> usize {
        if ticks == 0 {
            return self.active;
        }
        let total = self.total_duration_ticks();
        let target = (self.playhead_tick() + ticks % total) % total;
        self.seek_tick(target)
    }

    /// `(frame index, tick within frame)` for a global tick; wraps modulo the total duration.
    pub fn frame_at_tick(&self, tick: u64) -> (usize, u32) {
        let t = tick % self.total_duration_ticks();
        // First frame whose end lies past `t`.
        let index = self.prefix[1..].partition_point(|&end| end <= t);
        (index, (t - self.prefix[index]) as u32)
    }

    /// Jump to a global tick. Returns the active index.
    pub fn seek_tick(&mut self, tick: u64) -> usize {
        let (index, within) = self.frame_at_tick(tick);
        self.active = index;
        self.tick_in_frame = within;
        index
    }

    /// Scrub to the start of frame `index`.
    pub fn select_frame(&mut self, index: usize) -> FlipbookResult<()> {
        if index >= self.durations.len() {
            return Err(FlipbookError::validation(format!(
                "frame index {index} out of range (frames: {})",
                self.durations.len()
            )));
        }
        self.active = index;
        self.tick_in_frame = 0;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/sequencer.rs"]
mod tests;
