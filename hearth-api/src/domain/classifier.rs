//! Day-timeline classification for fixed-time schedule blocks.
//!
//! Given the blocks of a template ordered by (start, sort_order) and the
//! current minute of day, assign each block a [`Phase`] in a single linear
//! pass. At most one block is `Now` and at most one is `Next`; everything
//! else partitions into `Past` and `Later`.

use serde::Serialize;
use strum::Display;

use super::timeclock::MinuteOfDay;

/// A block's relationship to the current time. `Review` is the forced
/// phase for historical dates, where time-based classification is
/// meaningless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Past,
    Now,
    Next,
    Later,
    Review,
}

/// Anything occupying a `[start, end)` wall-clock window.
pub trait TimeWindow {
    fn window_start(&self) -> MinuteOfDay;
    fn window_end(&self) -> MinuteOfDay;
}

/// Phase annotation for one window, paired with the minutes left in the
/// active one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseTag {
    pub phase: Phase,
    pub remaining_minutes: Option<u16>,
}

impl PhaseTag {
    fn of(phase: Phase) -> Self {
        Self {
            phase,
            remaining_minutes: None,
        }
    }
}

/// Classify `windows` against `now`. Input must already be ordered by
/// start time (sort_order tiebreak applied by the caller's query); the
/// walk trusts that ordering.
///
/// A window that has ended is `Past`. The first window containing `now`
/// is `Now` with its remaining minutes. The first window that has not yet
/// started after that (or, when `now` falls in a gap with nothing active,
/// the first window still ahead of `now`) is `Next`, and the rest are
/// `Later`. Windows ahead of `now` are never `Past`.
pub fn classify<W: TimeWindow>(windows: &[W], now: MinuteOfDay) -> Vec<PhaseTag> {
    let mut found_current = false;
    let mut found_next = false;

    windows
        .iter()
        .map(|w| {
            if now >= w.window_end() {
                PhaseTag::of(Phase::Past)
            } else if !found_current && !found_next && now >= w.window_start() {
                found_current = true;
                PhaseTag {
                    phase: Phase::Now,
                    remaining_minutes: Some((w.window_end().get() - now.get()) as u16),
                }
            } else if !found_next {
                found_next = true;
                PhaseTag::of(Phase::Next)
            } else {
                PhaseTag::of(Phase::Later)
            }
        })
        .collect()
}

/// Historical-date variant: every window is `Review`.
pub fn classify_review<W: TimeWindow>(windows: &[W]) -> Vec<PhaseTag> {
    windows.iter().map(|_| PhaseTag::of(Phase::Review)).collect()
}

/// Future-date variant: nothing has started, everything is `Later`.
pub fn classify_upcoming<W: TimeWindow>(windows: &[W]) -> Vec<PhaseTag> {
    windows.iter().map(|_| PhaseTag::of(Phase::Later)).collect()
}
