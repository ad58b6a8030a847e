//! Input shape checks shared by the auth flows.

use validator::{Validate, ValidationError};

use crate::error::AuthError;

/// E.164: a `+`, a non-zero leading digit, 2 to 15 digits in total.
pub fn validate_e164(value: &str) -> Result<(), ValidationError> {
    let digits = value
        .strip_prefix('+')
        .ok_or_else(|| ValidationError::new("e164"))?;

    let well_formed = (2..=15).contains(&digits.len())
        && digits.bytes().all(|b| b.is_ascii_digit())
        && !digits.starts_with('0');

    if well_formed {
        Ok(())
    } else {
        Err(ValidationError::new("e164"))
    }
}

/// Run `validator` checks, naming every offending field.
pub fn check<T: Validate>(input: &T) -> Result<(), AuthError> {
    input.validate().map_err(|errors| {
        let mut fields: Vec<String> = errors
            .field_errors()
            .keys()
            .map(|field| field.to_string())
            .collect();
        fields.sort();
        AuthError::Validation(format!("invalid fields: {}", fields.join(", ")))
    })
}
