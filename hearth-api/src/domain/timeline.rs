//! Sequential task layout for the legacy sectioned day view.
//!
//! Tasks are laid end to end from the section's start time; each occupies
//! `[cursor, cursor + duration)` and advances the cursor. Completed tasks
//! are always `Done` regardless of their window. Of the rest, the first
//! task whose window end is still ahead of `now` is `Now` with the exact
//! milliseconds left in its window; pending tasks whose windows have fully
//! elapsed default to `Done` (elapsed time, not actual completion: the
//! section view has no notion of overdue), and everything past the `Now`
//! task is `Later`.

use serde::Serialize;
use strum::Display;

use super::{models::Task, timeclock::MinuteOfDay};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SlotPhase {
    Done,
    Now,
    Later,
}

/// One task's computed position in the section timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineSlot {
    /// Minutes since midnight; may run past the end of the day when the
    /// section is overfull, so this is not a [`MinuteOfDay`].
    pub scheduled_start: i32,
    pub scheduled_end: i32,
    pub phase: SlotPhase,
    pub remaining_ms: Option<i64>,
}

pub fn lay_out(tasks: &[Task], section_start: MinuteOfDay, now: MinuteOfDay) -> Vec<TimelineSlot> {
    let now = now.get() as i32;
    let mut cursor = section_start.get() as i32;
    let mut found_current = false;

    tasks
        .iter()
        .map(|task| {
            let scheduled_start = cursor;
            let scheduled_end = cursor + task.duration_minutes.max(0);
            cursor = scheduled_end;

            let phase = if task.is_complete() {
                SlotPhase::Done
            } else if !found_current && now < scheduled_end {
                found_current = true;
                SlotPhase::Now
            } else if !found_current {
                SlotPhase::Done
            } else {
                SlotPhase::Later
            };

            let remaining_ms = (phase == SlotPhase::Now)
                .then(|| ((scheduled_end - now).max(0) as i64) * 60 * 1000);

            TimelineSlot {
                scheduled_start,
                scheduled_end,
                phase,
                remaining_ms,
            }
        })
        .collect()
}
