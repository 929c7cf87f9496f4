//! Field validators.
//!
//! Every validator is a plain predicate returning `Err` on the first
//! problem it finds. They are attached to fields through
//! [`Constraint`](super::declaration::Constraint) lists and run in order
//! by [`FieldDecl::clean`](super::declaration::FieldDecl::clean).

use std::sync::OnceLock;

use regex::Regex;

use crate::constants::{MSG_BLANK, MSG_INVALID_COLOR, MSG_INVALID_SLUG, MSG_NOT_ZERO};

use super::error::ValidationError;

static HEX_COLOR: OnceLock<Regex> = OnceLock::new();
static SLUG: OnceLock<Regex> = OnceLock::new();

fn hex_color_pattern() -> &'static Regex {
    HEX_COLOR.get_or_init(|| {
        Regex::new(r"^#([A-Fa-f0-9]{6}|[A-Fa-f0-9]{3})$").expect("hex color pattern compiles")
    })
}

fn slug_pattern() -> &'static Regex {
    SLUG.get_or_init(|| Regex::new(r"^[-a-zA-Z0-9_]+$").expect("slug pattern compiles"))
}

pub fn validate_not_zero(field: &'static str, value: i64) -> Result<(), ValidationError> {
    if value == 0 {
        return Err(ValidationError::new(field, MSG_NOT_ZERO));
    }
    Ok(())
}

/// Accepts `#RGB` and `#RRGGBB`, case-insensitive. Unlike Python's
/// `re.match` with `$`, a trailing newline (`"#fff\n"`) is rejected.
pub fn validate_hex_color(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if !hex_color_pattern().is_match(value) {
        return Err(ValidationError::new(field, MSG_INVALID_COLOR));
    }
    Ok(())
}

pub fn validate_min_value(
    field: &'static str,
    value: i64,
    min: i64,
    message: &str,
) -> Result<(), ValidationError> {
    if value < min {
        return Err(ValidationError::new(field, message));
    }
    Ok(())
}

pub fn validate_max_value(
    field: &'static str,
    value: i64,
    max: i64,
    message: &str,
) -> Result<(), ValidationError> {
    if value > max {
        return Err(ValidationError::new(field, message));
    }
    Ok(())
}

/// Length is counted in characters, not bytes.
pub fn validate_max_length(
    field: &'static str,
    value: &str,
    max: usize,
) -> Result<(), ValidationError> {
    let length = value.chars().count();
    if length > max {
        return Err(ValidationError::new(
            field,
            format!("Ensure this value has at most {max} characters (it has {length})."),
        ));
    }
    Ok(())
}

/// Only the empty string is blank. Whitespace is left to the caller.
pub fn validate_not_blank(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::new(field, MSG_BLANK));
    }
    Ok(())
}

pub fn validate_slug(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if !slug_pattern().is_match(value) {
        return Err(ValidationError::new(field, MSG_INVALID_SLUG));
    }
    Ok(())
}
