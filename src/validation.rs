use thiserror::Error;

use crate::dates::{parse_date, to_storage};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateError {
    #[error("Please enter a valid date")]
    Invalid,
}

/// Checks a draft date. An empty draft is valid and means "clear".
pub fn validate(draft: &str) -> Result<(), DateError> {
    normalize(draft).map(|_| ())
}

/// Validates and converts a draft into its stored form, `None` meaning clear.
pub fn normalize(draft: &str) -> Result<Option<String>, DateError> {
    if draft.trim().is_empty() {
        return Ok(None);
    }
    parse_date(draft)
        .map(|date| Some(to_storage(date)))
        .ok_or(DateError::Invalid)
}
