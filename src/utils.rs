use crate::config::{EXCLUDED_PREVIEW, MAX_NUMBER_LIMIT, MIN_NUMBER_LIMIT};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

// Leading integer of a list entry, same as parseInt: "7x" reads as 7, "x7" is not a number
static LEADING_INT_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[+-]?\d+").unwrap());

/// Input parsing error types for the settings form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigInputError {
    EmptyInput(String),
    NotANumber(String),
    TooSmall(String, i32),
    TooLarge(String, i32),
}

impl std::fmt::Display for ConfigInputError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigInputError::EmptyInput(field) => write!(f, "{} cannot be empty", field),
            ConfigInputError::NotANumber(field) => write!(f, "{} must be a whole number", field),
            ConfigInputError::TooSmall(field, min) => {
                write!(f, "{} must be at least {}", field, min)
            }
            ConfigInputError::TooLarge(field, max) => {
                write!(f, "{} cannot exceed {}", field, max)
            }
        }
    }
}

impl std::error::Error for ConfigInputError {}

/// Parse the comma-separated "exclude numbers" field.
///
/// Each entry is trimmed and read by its leading integer. Entries that don't
/// start with a number are dropped, as are duplicates. Never fails: a field
/// of garbage simply excludes nothing.
///
/// # Examples
/// ```ignore
/// assert_eq!(parse_excluded_numbers("3, 7,12"), BTreeSet::from([3, 7, 12]));
/// assert_eq!(parse_excluded_numbers("5x, abc, 5"), BTreeSet::from([5]));
/// ```
pub fn parse_excluded_numbers(input: &str) -> BTreeSet<i32> {
    input
        .split(',')
        .filter_map(|entry| LEADING_INT_REGEX.find(entry.trim()))
        .filter_map(|m| m.as_str().parse::<i32>().ok())
        .collect()
}

/// Render exclusions back into the text field form.
pub fn format_excluded_list(excluded: &BTreeSet<i32>) -> String {
    excluded
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Short summary for the excluded box: the first few numbers and a "+N more" tail.
pub fn format_excluded_preview(excluded: &BTreeSet<i32>) -> String {
    let shown = excluded
        .iter()
        .take(EXCLUDED_PREVIEW)
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    if excluded.len() > EXCLUDED_PREVIEW {
        format!("{} +{} more", shown, excluded.len() - EXCLUDED_PREVIEW)
    } else {
        shown
    }
}

/// Generic numeric input validation
pub fn validate_numeric_input(
    input: &str,
    min: Option<i32>,
    max: Option<i32>,
    field_name: &str,
) -> Result<i32, ConfigInputError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ConfigInputError::EmptyInput(field_name.to_string()));
    }

    let val = trimmed
        .parse::<i32>()
        .map_err(|_| ConfigInputError::NotANumber(field_name.to_string()))?;
    if let Some(min_val) = min {
        if val < min_val {
            return Err(ConfigInputError::TooSmall(field_name.to_string(), min_val));
        }
    }
    if let Some(max_val) = max {
        if val > max_val {
            return Err(ConfigInputError::TooLarge(field_name.to_string(), max_val));
        }
    }
    Ok(val)
}

/// Validate one end of the number range
pub fn validate_range_bound(input: &str, field_name: &str) -> Result<i32, String> {
    validate_numeric_input(input, Some(MIN_NUMBER_LIMIT), Some(MAX_NUMBER_LIMIT), field_name)
        .map_err(|e| e.to_string())
}

/// Format a volume in `[0, 1]` as a whole percentage.
pub fn format_volume_percent(volume: f64) -> String {
    format!("{}%", (volume * 100.0).round() as i32)
}
