//! Contribution input bounds.

/// Longest accepted action, in characters.
pub const MAX_ACTION_CHARS: usize = 300;

/// Reason given when a user without a character contributes.
pub const NO_CHARACTER: &str = "register a character first";

/// Trims `action` and checks it is 1 to `max_chars` characters long.
///
/// # Errors
///
/// Returns the rejection reason when the trimmed action is empty or too long.
pub fn normalize_action(action: &str, max_chars: usize) -> Result<&str, String> {
    let trimmed = action.trim();
    let len = trimmed.chars().count();
    if len == 0 || len > max_chars {
        return Err(format!(
            "action must be between 1 and {max_chars} characters (got {len})"
        ));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_is_trimmed() {
        assert_eq!(normalize_action("  waits  ", 300).unwrap(), "waits");
    }

    #[test]
    fn test_blank_action_is_rejected() {
        assert!(normalize_action(" \n\t ", 300).is_err());
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        let accented = "é".repeat(300);
        assert!(normalize_action(&accented, 300).is_ok());
        let too_long = "é".repeat(301);
        let err = normalize_action(&too_long, 300).unwrap_err();
        assert!(err.contains("got 301"));
    }
}
