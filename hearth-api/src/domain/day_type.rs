use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use time::{Date, Weekday};

/// The weekday key used to match a calendar date against the recurring
/// schedule templates that declare it in their day-type set.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum DayType {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl DayType {
    pub fn of(date: Date) -> Self {
        date.weekday().into()
    }
}

impl From<Weekday> for DayType {
    fn from(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Sunday => DayType::Sunday,
            Weekday::Monday => DayType::Monday,
            Weekday::Tuesday => DayType::Tuesday,
            Weekday::Wednesday => DayType::Wednesday,
            Weekday::Thursday => DayType::Thursday,
            Weekday::Friday => DayType::Friday,
            Weekday::Saturday => DayType::Saturday,
        }
    }
}
