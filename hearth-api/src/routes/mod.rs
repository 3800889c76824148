pub(crate) mod day;
pub(crate) mod error;
pub(crate) mod events;
pub(crate) mod members;
pub(crate) mod schedules;
pub(crate) mod stars;
pub(crate) mod tasks;

pub(crate) use error::ApiError;

use time::{macros::format_description, Date};

/// Parse a `YYYY-MM-DD` query/body date.
pub(crate) fn parse_date(raw: &str) -> Result<Date, ApiError> {
    Date::parse(raw, &format_description!("[year]-[month]-[day]"))
        .map_err(|_| ApiError::bad_request(format!("invalid date '{raw}', expected YYYY-MM-DD")))
}
