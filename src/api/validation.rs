//! Input validation for API requests.
//!
//! Validators return `Err(message)` with the Hebrew text shown to the user.
//! For collecting multiple validation errors and returning them as an ApiError,
//! use the `ValidationErrorBuilder` from the `error` module.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Loose email check: something@something.tld, no whitespace
    static ref EMAIL_REGEX: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();

    /// Israeli phone numbers once dashes and spaces are stripped (landline or mobile)
    static ref PHONE_REGEX: Regex = Regex::new(r"^0[2-9]\d{7,8}$").unwrap();

    static ref LETTER_REGEX: Regex = Regex::new(r"[a-zA-Z]").unwrap();
    static ref DIGIT_REGEX: Regex = Regex::new(r"[0-9]").unwrap();
}

/// Lowercase and trim an email address
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Strip the separators people type into phone numbers
pub fn normalize_phone(phone: &str) -> String {
    phone.chars().filter(|c| *c != '-' && !c.is_whitespace()).collect()
}

pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("נא להזין כתובת אימייל".to_string());
    }

    if email.len() > 120 {
        return Err("כתובת האימייל ארוכה מדי".to_string());
    }

    if !EMAIL_REGEX.is_match(email) {
        return Err("כתובת האימייל אינה תקינה".to_string());
    }

    Ok(())
}

/// At least 8 characters containing both letters and digits
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.chars().count() < 8 {
        return Err("הסיסמה חייבת להכיל לפחות 8 תווים".to_string());
    }

    if !LETTER_REGEX.is_match(password) || !DIGIT_REGEX.is_match(password) {
        return Err("הסיסמה חייבת להכיל גם אותיות וגם מספרים".to_string());
    }

    Ok(())
}

/// Validate an optional phone number; empty means not provided
pub fn validate_phone(phone: &str) -> Result<(), String> {
    if phone.trim().is_empty() {
        return Ok(());
    }

    if !PHONE_REGEX.is_match(&normalize_phone(phone)) {
        return Err("מספר הטלפון אינו תקין".to_string());
    }

    Ok(())
}

/// Validate a person's first or last name
pub fn validate_person_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("כל השדות הנדרשים חייבים להיות מלאים".to_string());
    }

    if name.chars().count() > 100 {
        return Err("השם ארוך מדי (עד 100 תווים)".to_string());
    }

    Ok(())
}

/// Validate a display name or title (vendors, events, checklist items)
pub fn validate_title(value: &str, max_len: usize) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err("שדה חובה".to_string());
    }

    if value.chars().count() > max_len {
        return Err(format!("הערך ארוך מדי (עד {} תווים)", max_len));
    }

    Ok(())
}

/// Prices and capacities must not be negative
pub fn validate_non_negative(value: Option<i64>) -> Result<(), String> {
    match value {
        Some(v) if v < 0 => Err("הערך חייב להיות מספר חיובי".to_string()),
        _ => Ok(()),
    }
}

/// Optional calendar date in YYYY-MM-DD form
pub fn validate_date(date: &Option<String>) -> Result<(), String> {
    if let Some(d) = date {
        if d.is_empty() {
            return Ok(());
        }

        if chrono::NaiveDate::parse_from_str(d, "%Y-%m-%d").is_err() {
            return Err("תאריך לא תקין (YYYY-MM-DD)".to_string());
        }
    }

    Ok(())
}

pub fn validate_party_size(size: i64) -> Result<(), String> {
    if !(1..=50).contains(&size) {
        return Err("מספר המוזמנים ברשומה חייב להיות בין 1 ל-50".to_string());
    }

    Ok(())
}
