//! Validation utilities and regex patterns

use chrono::format::{Item, StrftimeItems};
use once_cell::sync::Lazy;
use regex::Regex;
use validator::ValidationError;

/// Regex pattern for validating hex color codes (e.g., #FFFFFF, #FF0000)
pub static HEX_COLOR_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("Invalid hex color regex pattern"));

const LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];

/// Validate a log filter: a bare level or comma separated `target=level` directives
pub fn validate_log_level(filter: &str) -> Result<(), ValidationError> {
    if filter.trim().is_empty() {
        return Err(ValidationError::new("empty_log_level"));
    }

    let valid = filter.split(',').map(str::trim).all(|directive| {
        let level = match directive.split_once('=') {
            Some((target, level)) if !target.is_empty() => level,
            Some(_) => return false,
            None => directive,
        };
        LEVELS.contains(&level.to_ascii_lowercase().as_str())
    });

    if valid {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_log_level"))
    }
}

/// Validate a chrono strftime pattern used for chart labels
pub fn validate_date_format(format: &str) -> Result<(), ValidationError> {
    if format.is_empty() {
        return Err(ValidationError::new("empty_date_format"));
    }
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(ValidationError::new("invalid_date_format"));
    }
    Ok(())
}

/// Validate file path (basic check for valid path characters)
pub fn validate_file_path(path: &str) -> Result<(), ValidationError> {
    if path.is_empty() {
        return Err(ValidationError::new("empty_file_path"));
    }

    // Colon stays allowed for Windows drive letters (C:\)
    let invalid_chars = ['<', '>', '"', '|', '?', '*'];
    if path.chars().any(|c| invalid_chars.contains(&c)) {
        return Err(ValidationError::new("invalid_file_path_characters"));
    }

    Ok(())
}
