//! Cache key families and their typed payloads.
//!
//! Every cache entry belongs to exactly one [`CacheKey`] family, and each
//! family has one payload schema. The rendered key strings and JSON
//! payloads are shared with other deployments reading the same cache, so
//! both must stay byte-compatible.

use std::fmt;

use multiplayer_db::Mode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::messages::{GameModeStats, ModeDetails, ModeUsage, nullable_list};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// `mode_usage`
    ModeUsage,
    /// `total_active_users`
    TotalActiveUsers,
    /// `mode_details:<mode_name>`
    ModeDetails(String),
    /// `active_users_area_code_<area_code>`
    ActiveUsersByArea(String),
    /// `game_mode_stats`
    GameModeStats,
    /// `players_list_<mode_name>`
    Players(String),
    /// `mode_<mode_name>`, the full record patched by game-state updates
    ModeSnapshot(String),
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::ModeUsage => f.write_str("mode_usage"),
            CacheKey::TotalActiveUsers => f.write_str("total_active_users"),
            CacheKey::ModeDetails(mode) => write!(f, "mode_details:{mode}"),
            CacheKey::ActiveUsersByArea(area) => write!(f, "active_users_area_code_{area}"),
            CacheKey::GameModeStats => f.write_str("game_mode_stats"),
            CacheKey::Players(mode) => write!(f, "players_list_{mode}"),
            CacheKey::ModeSnapshot(mode) => write!(f, "mode_{mode}"),
        }
    }
}

impl CacheKey {
    /// Parse a raw cached string with the schema of this key's family.
    pub fn decode(&self, raw: &str) -> serde_json::Result<CachedValue> {
        Ok(match self {
            CacheKey::ModeUsage => CachedValue::ModeUsage(decode_list(raw)?),
            CacheKey::TotalActiveUsers | CacheKey::ActiveUsersByArea(_) => {
                CachedValue::ActiveUsers(serde_json::from_str(raw)?)
            }
            CacheKey::ModeDetails(_) => CachedValue::ModeDetails(serde_json::from_str(raw)?),
            CacheKey::GameModeStats => CachedValue::GameModeStats(serde_json::from_str(raw)?),
            CacheKey::Players(_) => CachedValue::Players(decode_list(raw)?),
            CacheKey::ModeSnapshot(_) => CachedValue::ModeSnapshot(serde_json::from_str(raw)?),
        })
    }
}

fn decode_list<T: DeserializeOwned>(raw: &str) -> serde_json::Result<Vec<T>> {
    Ok(serde_json::from_str::<Option<Vec<T>>>(raw)?.unwrap_or_default())
}

/// A decoded cache payload, one variant per payload schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CachedValue {
    ModeUsage(Vec<ModeUsage>),
    /// Shared by the total and per-area counters.
    ActiveUsers(i64),
    ModeDetails(ModeDetails),
    GameModeStats(GameModeStats),
    Players(Vec<String>),
    ModeSnapshot(ModeSnapshot),
}

impl CachedValue {
    pub fn encode(&self) -> serde_json::Result<String> {
        match self {
            CachedValue::ModeUsage(modes) => serde_json::to_string(modes),
            CachedValue::ActiveUsers(total) => serde_json::to_string(total),
            CachedValue::ModeDetails(details) => serde_json::to_string(details),
            CachedValue::GameModeStats(stats) => serde_json::to_string(stats),
            CachedValue::Players(players) => serde_json::to_string(players),
            CachedValue::ModeSnapshot(snapshot) => serde_json::to_string(snapshot),
        }
    }
}

/// A payload type that can travel through the cache.
pub trait CachePayload: Clone + Sized {
    fn into_cached(self) -> CachedValue;

    /// `None` when `value` carries a different schema.
    fn from_cached(value: CachedValue) -> Option<Self>;
}

macro_rules! cache_payload {
    ($ty:ty => $variant:ident) => {
        impl CachePayload for $ty {
            fn into_cached(self) -> CachedValue {
                CachedValue::$variant(self)
            }

            fn from_cached(value: CachedValue) -> Option<Self> {
                match value {
                    CachedValue::$variant(inner) => Some(inner),
                    _ => None,
                }
            }
        }
    };
}

cache_payload!(Vec<ModeUsage> => ModeUsage);
cache_payload!(i64 => ActiveUsers);
cache_payload!(ModeDetails => ModeDetails);
cache_payload!(GameModeStats => GameModeStats);
cache_payload!(Vec<String> => Players);
cache_payload!(ModeSnapshot => ModeSnapshot);

/// Full mode record as cached under `mode_<name>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct ModeSnapshot {
    pub mode_name: String,
    pub active_users: i64,
    pub area_code: String,
    #[serde(deserialize_with = "nullable_list")]
    pub players: Vec<String>,
    pub game_state: String,
    /// Unix seconds, carried on the wire as an RFC 3339 timestamp.
    #[serde(with = "rfc3339_seconds")]
    pub last_updated: i64,
}

/// Other writers of `mode_<name>` store `LastUpdated` as an RFC 3339 string
/// with an arbitrary offset and fractional seconds.
mod rfc3339_seconds {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de, ser};

    pub fn serialize<S: Serializer>(secs: &i64, serializer: S) -> Result<S::Ok, S::Error> {
        let Some(timestamp) = DateTime::<Utc>::from_timestamp(*secs, 0) else {
            return Err(ser::Error::custom(format!("timestamp out of range: {secs}")));
        };
        serializer.serialize_str(&timestamp.to_rfc3339_opts(SecondsFormat::Secs, true))
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Seconds(i64),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        match Raw::deserialize(deserializer)? {
            Raw::Text(text) => DateTime::parse_from_rfc3339(&text)
                .map(|timestamp| timestamp.timestamp())
                .map_err(de::Error::custom),
            Raw::Seconds(secs) => Ok(secs),
        }
    }
}

impl From<Mode> for ModeSnapshot {
    fn from(mode: Mode) -> Self {
        Self {
            mode_name: mode.mode_name,
            active_users: mode.active_users,
            area_code: mode.area_code,
            players: mode.players,
            game_state: mode.game_state,
            last_updated: mode.last_updated,
        }
    }
}
