/// Input validation for procedure requests
use thiserror::Error;

const MAX_IDENTIFIER_LEN: usize = 64;
const MAX_GAME_STATE_LEN: usize = 32;

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    #[error("{field} too long (max {max} characters, got {actual})")]
    TooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },

    #[error("{field} contains control characters")]
    ControlChars { field: &'static str },
}

fn validate_text(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::Empty { field });
    }

    let actual = value.chars().count();
    if actual > max {
        return Err(ValidationError::TooLong { field, max, actual });
    }

    if value.chars().any(char::is_control) {
        return Err(ValidationError::ControlChars { field });
    }

    Ok(())
}

/// Mode names key cache entries, so they must be non-empty printable text.
pub fn validate_mode_name(name: &str) -> Result<(), ValidationError> {
    validate_text("mode_name", name, MAX_IDENTIFIER_LEN)
}

pub fn validate_player_id(player_id: &str) -> Result<(), ValidationError> {
    validate_text("player_id", player_id, MAX_IDENTIFIER_LEN)
}

pub fn validate_area_code(area_code: &str) -> Result<(), ValidationError> {
    validate_text("area_code", area_code, MAX_IDENTIFIER_LEN)
}

pub fn validate_game_state(game_state: &str) -> Result<(), ValidationError> {
    validate_text("game_state", game_state, MAX_GAME_STATE_LEN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_mode_names() {
        assert!(validate_mode_name("Arena").is_ok());
        assert!(validate_mode_name("Capture the Flag").is_ok());
        assert!(validate_mode_name("battle-royale_2").is_ok());
        assert!(validate_mode_name(&"m".repeat(64)).is_ok());
    }

    #[test]
    fn test_empty_mode_name() {
        assert_eq!(
            validate_mode_name(""),
            Err(ValidationError::Empty { field: "mode_name" })
        );
    }

    #[test]
    fn test_mode_name_too_long() {
        assert_eq!(
            validate_mode_name(&"m".repeat(65)),
            Err(ValidationError::TooLong {
                field: "mode_name",
                max: 64,
                actual: 65
            })
        );
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        assert!(validate_player_id(&"é".repeat(64)).is_ok());
    }

    #[test]
    fn test_control_characters_rejected() {
        assert_eq!(
            validate_player_id("p1\n"),
            Err(ValidationError::ControlChars { field: "player_id" })
        );
        assert_eq!(
            validate_area_code("A\u{0}"),
            Err(ValidationError::ControlChars { field: "area_code" })
        );
    }

    #[test]
    fn test_game_state_limits() {
        assert!(validate_game_state("paused").is_ok());
        assert_eq!(
            validate_game_state(""),
            Err(ValidationError::Empty { field: "game_state" })
        );
        assert_eq!(
            validate_game_state(&"x".repeat(33)),
            Err(ValidationError::TooLong {
                field: "game_state",
                max: 32,
                actual: 33
            })
        );
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ValidationError::Empty { field: "player_id" }.to_string(),
            "player_id cannot be empty"
        );
    }
}
