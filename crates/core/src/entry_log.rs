//! Visitor register rules.

use ams_shared::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why someone entered the building.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryType {
    /// Guest of a resident.
    Visitor,
    /// Parcel or food delivery.
    Delivery,
    /// Private tutor.
    Teacher,
    /// Repair or maintenance work.
    Maintenance,
    /// Anything else.
    Other,
}

impl EntryType {
    /// Every entry type, for dropdowns.
    pub const ALL: [Self; 5] = [
        Self::Visitor,
        Self::Delivery,
        Self::Teacher,
        Self::Maintenance,
        Self::Other,
    ];
}

/// Rejected entry log input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EntryLogError {
    /// Entry recorded ahead of the clock.
    #[error("Entry time cannot be in the future")]
    EntryInFuture,

    /// Exit at or before entry.
    #[error("Exit time must be after entry time")]
    ExitNotAfterEntry,

    /// Zero persons.
    #[error("Number of persons must be at least 1")]
    NoPersons,

    /// The flat is in a different building than the log.
    #[error("Selected flat does not belong to the selected building")]
    FlatNotInBuilding,
}

impl From<EntryLogError> for AppError {
    fn from(err: EntryLogError) -> Self {
        Self::Validation(err.to_string())
    }
}

/// Checks the times and head count of a new log entry against `now`.
///
/// # Errors
///
/// Returns the first rule the entry breaks.
pub fn validate_entry(
    entry_time: DateTime<Utc>,
    exit_time: Option<DateTime<Utc>>,
    number_of_persons: i32,
    now: DateTime<Utc>,
) -> Result<(), EntryLogError> {
    if number_of_persons < 1 {
        return Err(EntryLogError::NoPersons);
    }
    if entry_time > now {
        return Err(EntryLogError::EntryInFuture);
    }
    if exit_time.is_some_and(|exit| exit <= entry_time) {
        return Err(EntryLogError::ExitNotAfterEntry);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rstest::rstest;

    #[rstest]
    #[case(-60, None, 1, Ok(()))]
    #[case(-60, Some(30), 2, Ok(()))]
    #[case(0, None, 1, Ok(()))]
    #[case(5, None, 1, Err(EntryLogError::EntryInFuture))]
    #[case(-60, Some(0), 1, Err(EntryLogError::ExitNotAfterEntry))]
    #[case(-60, Some(-10), 1, Err(EntryLogError::ExitNotAfterEntry))]
    #[case(-60, None, 0, Err(EntryLogError::NoPersons))]
    fn test_validate_entry(
        #[case] entry_offset_min: i64,
        #[case] exit_after_entry_min: Option<i64>,
        #[case] persons: i32,
        #[case] expected: Result<(), EntryLogError>,
    ) {
        let now = Utc::now();
        let entry = now + Duration::minutes(entry_offset_min);
        let exit = exit_after_entry_min.map(|m| entry + Duration::minutes(m));
        assert_eq!(validate_entry(entry, exit, persons, now), expected);
    }

    #[test]
    fn test_errors_are_validation_failures() {
        let err: AppError = EntryLogError::FlatNotInBuilding.into();
        assert_eq!(err.status_code(), 400);
    }
}
