//! Registration input bounds.

use loreweave_core::error::DomainError;

/// Longest character name, in characters.
pub const MAX_NAME_CHARS: usize = 50;
/// Longest character description, in characters.
pub const MAX_DESCRIPTION_CHARS: usize = 500;
/// Longest archetype, in characters.
pub const MAX_ARCHETYPE_CHARS: usize = 40;

/// Trims `value` and checks it is 1 to `max` characters long.
///
/// # Errors
///
/// Returns `DomainError::Validation` naming `field` otherwise.
pub fn bounded<'a>(field: &str, value: &'a str, max: usize) -> Result<&'a str, DomainError> {
    let trimmed = value.trim();
    let len = trimmed.chars().count();
    if len == 0 || len > max {
        return Err(DomainError::Validation(format!(
            "{field} must be between 1 and {max} characters"
        )));
    }
    Ok(trimmed)
}

/// Trims an optional value; blank becomes `None`.
#[must_use]
pub fn optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}
