//! Account field rules: phone numbers, emails, names, gender.

use validator::ValidateEmail;

use crate::error::CoreError;

/// Phone numbers are the login identifier and carry exactly this many digits.
pub const PHONE_NUMBER_LENGTH: usize = 11;

/// Maximum length of a first or last name.
pub const MAX_NAME_LENGTH: usize = 50;

/// Profile image used until the user sets one.
pub const DEFAULT_PROFILE_IMAGE: &str = "accounts/profile/default/default_profile_picture.jpg";

define_text_enum! {
    Gender, "gender" {
        Female => "female",
        Male => "male",
    }
}

/// Validate an 11-digit phone number.
pub fn validate_phone_number(phone: &str) -> Result<(), CoreError> {
    if phone.len() != PHONE_NUMBER_LENGTH || !phone.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CoreError::Validation(format!(
            "Phone number must be {PHONE_NUMBER_LENGTH} digits"
        )));
    }
    Ok(())
}

/// Normalize an email address by lowercasing its domain part.
pub fn normalize_email(email: &str) -> String {
    let email = email.trim();
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{local}@{}", domain.to_lowercase()),
        None => email.to_string(),
    }
}

/// Validate email syntax.
pub fn validate_email(email: &str) -> Result<(), CoreError> {
    if email.validate_email() {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "'{email}' is not a valid email address"
        )))
    }
}

/// Validate a first or last name.
pub fn validate_name(field: &str, value: &str) -> Result<(), CoreError> {
    let len = value.trim().chars().count();
    if len == 0 || len > MAX_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "{field} must be between 1 and {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(())
}
