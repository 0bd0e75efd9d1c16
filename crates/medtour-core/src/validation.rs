//! Form-level field checks shared by all records.

use std::sync::LazyLock;

use crate::error::{CoreError, Result};

/// Loose email shape: something@something.tld
static EMAIL_REGEX: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid email regex")
});

/// Time slot: HH:mm-HH:mm
static SLOT_REGEX: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"^([01][0-9]|2[0-3]):[0-5][0-9]-([01][0-9]|2[0-3]):[0-5][0-9]$")
        .expect("Invalid slot regex")
});

pub fn is_email(value: &str) -> bool {
    EMAIL_REGEX.is_match(value)
}

/// Returns `true` for a well-formed `HH:mm-HH:mm` slot whose start precedes its end.
pub fn is_time_slot(value: &str) -> bool {
    if !SLOT_REGEX.is_match(value) {
        return false;
    }
    // Zero-padded times compare lexically
    match value.split_once('-') {
        Some((start, end)) => start < end,
        None => false,
    }
}

/// Collects every failed check so one response can report them all.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<String>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn min_len(&mut self, field: &str, value: &str, min: usize) -> &mut Self {
        let len = value.trim().chars().count();
        if len == 0 {
            self.errors.push(format!("{field} is required"));
        } else if len < min {
            self.errors
                .push(format!("{field} must be at least {min} characters"));
        }
        self
    }

    pub fn required(&mut self, field: &str, value: &str) -> &mut Self {
        self.min_len(field, value, 1)
    }

    pub fn email(&mut self, field: &str, value: &str) -> &mut Self {
        if !is_email(value.trim()) {
            self.errors
                .push(format!("{field} must be a valid email address"));
        }
        self
    }

    pub fn range(&mut self, field: &str, value: f64, min: f64, max: f64) -> &mut Self {
        if !value.is_finite() || value < min || value > max {
            self.errors
                .push(format!("{field} must be between {min} and {max}"));
        }
        self
    }

    pub fn positive(&mut self, field: &str, value: f64) -> &mut Self {
        if !value.is_finite() || value <= 0.0 {
            self.errors.push(format!("{field} must be greater than 0"));
        }
        self
    }

    pub fn non_negative(&mut self, field: &str, value: f64) -> &mut Self {
        if !value.is_finite() || value < 0.0 {
            self.errors.push(format!("{field} must not be negative"));
        }
        self
    }

    pub fn non_empty_list(&mut self, field: &str, values: &[String]) -> &mut Self {
        if values.iter().all(|v| v.trim().is_empty()) {
            self.errors.push(format!("{field} must have at least one entry"));
        }
        self
    }

    pub fn check(&mut self, ok: bool, message: impl Into<String>) -> &mut Self {
        if !ok {
            self.errors.push(message.into());
        }
        self
    }

    pub fn finish(&mut self) -> Result<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(CoreError::Validation(std::mem::take(&mut self.errors)))
        }
    }
}
