//! Boundary validation for user-entered routines.

use crate::error::ValidationError;

use super::routine::{Frequency, RoutineFields, RoutineTime};

/// Raw form input, exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutineDraft {
    pub time: String,
    pub content: String,
    pub frequency: String,
}

impl RoutineDraft {
    pub fn new(time: impl Into<String>, content: impl Into<String>, frequency: impl Into<String>) -> Self {
        Self {
            time: time.into(),
            content: content.into(),
            frequency: frequency.into(),
        }
    }
}

/// Check a draft in order: required fields, time format, frequency.
/// The first failing rule wins. Input is not trimmed or re-cased.
pub fn validate(draft: &RoutineDraft) -> Result<RoutineFields, ValidationError> {
    if draft.time.is_empty() {
        return Err(ValidationError::MissingField("time"));
    }
    if draft.content.is_empty() {
        return Err(ValidationError::MissingField("content"));
    }
    let time: RoutineTime = draft.time.parse()?;
    let frequency: Frequency = draft.frequency.parse()?;

    Ok(RoutineFields {
        time,
        content: draft.content.clone(),
        frequency,
    })
}
