pub mod change_feed;
pub mod classifier;
pub mod day_type;
pub mod error;
pub mod models;
pub mod ports;
pub mod services;
pub mod timeclock;
pub mod timeline;

pub use error::DomainError;
