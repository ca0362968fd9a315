//! Request and response messages of the `multiplayer.MultiplayerService`
//! remote procedures.
//!
//! Field names follow the snake_case wire names used by existing clients
//! and by cache entries written by earlier deployments. Missing fields
//! decode to their zero value.

use serde::{Deserialize, Deserializer, Serialize};

/// Description returned for every mode by `GetModeDetails`.
pub const MODE_DESCRIPTION: &str = "Detailed description of the mode";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModeUsage {
    pub mode_name: String,
    pub active_users: i64,
    pub area_code: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModeDetails {
    pub mode_name: String,
    pub description: String,
    pub active_users: i64,
    pub area_code: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameModeStats {
    pub total_modes: i64,
    pub total_active_users: i64,
}

// ----------------------------------------------------------------------------
// Requests
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ModeUsageRequest {}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct JoinModeRequest {
    pub mode_name: String,
    pub player_id: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct LeaveModeRequest {
    pub mode_name: String,
    pub player_id: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ModeDetailsRequest {
    pub mode_name: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ActiveUsersByAreaCodeRequest {
    pub area_code: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct GameModeStatsRequest {}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct GetPlayersRequest {
    pub mode_name: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct UpdateGameStateRequest {
    pub mode_name: String,
    pub game_state: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TotalActiveUsersRequest {}

// ----------------------------------------------------------------------------
// Responses
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModeUsageResponse {
    #[serde(deserialize_with = "nullable_list")]
    pub modes: Vec<ModeUsage>,
}

/// Confirmation returned by the mutating procedures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfirmationResponse {
    pub message: String,
}

impl ConfirmationResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActiveUsersByAreaCodeResponse {
    pub total_active_users: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GetPlayersResponse {
    #[serde(deserialize_with = "nullable_list")]
    pub players: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TotalActiveUsersResponse {
    pub total_active_users: i64,
}

/// Decode a JSON `null` list as empty. Older writers emit `null` for an
/// empty result set.
pub(crate) fn nullable_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
