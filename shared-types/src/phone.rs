use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PhoneError {
    #[error("phone number is empty")]
    Empty,
    #[error("phone number {0:?} does not have enough digits")]
    TooShort(String),
}

/// Formats a phone number for display: drops a leading `+1` and keeps digits only.
pub fn format_phone_display(phone: &str) -> String {
    let trimmed = phone.trim();
    let without_country = trimmed.strip_prefix("+1").unwrap_or(trimmed);
    without_country.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Normalizes a phone number to E.164, assuming North America for bare numbers.
pub fn normalize_e164(phone: &str) -> Result<String, PhoneError> {
    let trimmed = phone.trim();
    if trimmed.is_empty() {
        return Err(PhoneError::Empty);
    }

    let digits: String = trimmed.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() < 10 {
        return Err(PhoneError::TooShort(trimmed.to_string()));
    }

    if trimmed.starts_with('+') {
        return Ok(format!("+{digits}"));
    }

    if digits.len() == 10 {
        Ok(format!("+1{digits}"))
    } else {
        Ok(format!("+{digits}"))
    }
}
