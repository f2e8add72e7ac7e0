//! Field checks run before every save and every export.
//!
//! Only the first failing rule is reported; the order is fixed.

use thiserror::Error;

use crate::core::record::RecordFields;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("start year missing")]
    StartYearMissing,
    #[error("missing recommendation")]
    RecommendationMissing,
    #[error("missing how you know them")]
    HowKnownMissing,
}

/// Check `fields` without modifying anything. `end_year` and `target` may be empty.
pub fn validate(fields: &RecordFields) -> Result<(), ValidationError> {
    if fields.start_year.is_none() {
        return Err(ValidationError::StartYearMissing);
    }
    if fields.recommendation.trim().is_empty() {
        return Err(ValidationError::RecommendationMissing);
    }
    if fields.how_known.trim().is_empty() {
        return Err(ValidationError::HowKnownMissing);
    }
    Ok(())
}
