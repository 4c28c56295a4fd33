//! Common validation utilities.

use validator::ValidationError;

/// Smallest party size a registration may carry.
pub const MIN_ATTENDEES: i32 = 1;

/// Largest party size a registration may carry.
pub const MAX_ATTENDEES: i32 = 10;

/// Validates that an attendee count is within 1..=10.
pub fn validate_attendees_count(count: i32) -> Result<(), ValidationError> {
    if (MIN_ATTENDEES..=MAX_ATTENDEES).contains(&count) {
        Ok(())
    } else {
        let mut err = ValidationError::new("attendees_count_range");
        err.message = Some(
            format!(
                "Attendees count must be between {} and {}",
                MIN_ATTENDEES, MAX_ATTENDEES
            )
            .into(),
        );
        Err(err)
    }
}

/// Validates that an ID is a positive database identifier.
pub fn validate_positive_id(id: i64) -> Result<(), ValidationError> {
    if id > 0 {
        Ok(())
    } else {
        let mut err = ValidationError::new("id_positive");
        err.message = Some("ID must be a positive number".into());
        Err(err)
    }
}

/// Normalizes an email address for use as an identity key.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
