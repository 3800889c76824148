mod day_view;
mod task_actions;

pub use day_view::{BlockView, DayView, DayViewService, SectionTimeline};
pub use task_actions::TaskActions;
