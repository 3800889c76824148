mod ids;
mod ledger;
mod member;
mod schedule;
mod task;

pub use ids::*;
pub use ledger::*;
pub use member::*;
pub use schedule::*;
pub use task::*;
