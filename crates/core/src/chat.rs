//! Chat channel limits and validation.

use crate::error::CoreError;

/// Hard ceiling on messages per session. Sends at the cap are rejected,
/// never truncated — the log is not a sliding window.
pub const MAX_MESSAGES_PER_SESSION: i64 = 50;

/// Maximum message content length, in characters.
pub const MAX_MESSAGE_LENGTH: usize = 500;

/// Maximum author display name length.
pub const MAX_AUTHOR_NAME_LENGTH: usize = 40;

/// Validate message content: non-empty after trimming, within the length
/// cap.
pub fn validate_message_content(content: &str) -> Result<(), CoreError> {
    if content.trim().is_empty() {
        return Err(CoreError::Validation(
            "Message must not be empty".to_string(),
        ));
    }
    if content.chars().count() > MAX_MESSAGE_LENGTH {
        return Err(CoreError::Validation(format!(
            "Message must not exceed {MAX_MESSAGE_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Validate a chat author display name.
pub fn validate_author_name(name: &str) -> Result<(), CoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(
            "Author name must not be empty".to_string(),
        ));
    }
    if trimmed.chars().count() > MAX_AUTHOR_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "Author name must not exceed {MAX_AUTHOR_NAME_LENGTH} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_normal_content() {
        assert!(validate_message_content("gl hf").is_ok());
        assert!(validate_message_content(&"a".repeat(MAX_MESSAGE_LENGTH)).is_ok());
    }

    #[test]
    fn rejects_empty_and_oversized_content() {
        assert!(validate_message_content("").is_err());
        assert!(validate_message_content("   ").is_err());
        assert!(validate_message_content(&"a".repeat(MAX_MESSAGE_LENGTH + 1)).is_err());
    }

    #[test]
    fn length_cap_counts_characters_not_bytes() {
        // 500 multi-byte characters are within the cap.
        assert!(validate_message_content(&"é".repeat(MAX_MESSAGE_LENGTH)).is_ok());
    }

    #[test]
    fn author_name_bounds() {
        assert!(validate_author_name("cptn").is_ok());
        assert!(validate_author_name("").is_err());
        assert!(validate_author_name(&"a".repeat(MAX_AUTHOR_NAME_LENGTH + 1)).is_err());
    }
}
