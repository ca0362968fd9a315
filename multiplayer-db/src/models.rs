/// A tracked game mode as held by the persistent store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mode {
  /// Unique lookup key, immutable once created
  pub mode_name: String,
  /// Live player counter, never below zero
  pub active_users: i64,
  /// Grouping attribute for area aggregates
  pub area_code: String,
  /// Player ids in join order
  pub players: Vec<String>,
  /// Free-form state string (e.g. "active", "paused")
  pub game_state: String,
  /// Unix timestamp of the last mutation
  pub last_updated: i64,
}

/// Fields needed to seed a new mode record.
#[derive(Debug, Clone)]
pub struct NewMode {
  pub mode_name: String,
  pub area_code: String,
  pub active_users: i64,
  pub players: Vec<String>,
  pub game_state: String,
}

impl NewMode {
  /// An empty mode in the given area.
  pub fn new(mode_name: impl Into<String>, area_code: impl Into<String>) -> Self {
    Self {
      mode_name: mode_name.into(),
      area_code: area_code.into(),
      active_users: 0,
      players: Vec::new(),
      game_state: String::new(),
    }
  }

  pub fn with_active_users(mut self, active_users: i64) -> Self {
    self.active_users = active_users;
    self
  }

  pub fn with_players(mut self, players: Vec<String>) -> Self {
    self.players = players;
    self
  }

  pub fn with_game_state(mut self, game_state: impl Into<String>) -> Self {
    self.game_state = game_state.into();
    self
  }
}
