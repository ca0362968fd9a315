mod cache;
mod error;
mod models;

pub use cache::{Cache, MemoryCache};
pub use error::{CacheError, DbError, Result};
pub use models::{Mode, NewMode};

use std::path::Path;

use async_trait::async_trait;
use tokio_rusqlite::Connection;
use tokio_rusqlite::rusqlite::{self, OptionalExtension, params};
use tracing::{debug, info};

/// Authoritative store of mode records.
///
/// Every mutation is applied as one atomic update against the matching
/// record: readers never observe a counter change without the matching
/// roster change. Implementations are shared across concurrent requests.
#[async_trait]
pub trait ModeStore: Send + Sync {
  /// Every mode, ordered by name.
  async fn list_modes(&self) -> Result<Vec<Mode>>;

  async fn find_mode(&self, mode_name: &str) -> Result<Option<Mode>>;

  /// Only the roster of a mode, in join order.
  async fn find_players(&self, mode_name: &str) -> Result<Option<Vec<String>>>;

  async fn count_modes(&self) -> Result<u64>;

  /// Sum of `active_users`, optionally restricted to one area code.
  /// Zero when nothing matches.
  async fn sum_active_users(&self, area_code: Option<&str>) -> Result<i64>;

  /// Increment the counter, append the player and stamp `last_updated`.
  async fn join_mode(&self, mode_name: &str, player_id: &str, now: i64) -> Result<()>;

  /// Decrement the counter (never below zero), remove every occurrence of
  /// the player and stamp `last_updated`.
  async fn leave_mode(&self, mode_name: &str, player_id: &str, now: i64) -> Result<()>;

  async fn set_game_state(&self, mode_name: &str, game_state: &str, now: i64) -> Result<()>;

  /// Seed a new mode. Modes are created outside the request path.
  async fn insert_mode(&self, mode: NewMode, now: i64) -> Result<Mode>;
}

/// SQLite-backed mode store.
///
/// All statements run on the connection's dedicated thread, so the
/// multi-statement transactions below never interleave.
#[derive(Clone)]
pub struct Database {
  conn: Connection,
}

impl Database {
  /// Open or create a database at the given path.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = Connection::open(path).await.map_err(DbError::Sqlite)?;
    let db = Self { conn };
    db.initialize().await?;
    Ok(db)
  }

  /// Create an in-memory database (useful for testing).
  pub async fn open_in_memory() -> Result<Self> {
    let conn = Connection::open_in_memory()
      .await
      .map_err(DbError::Sqlite)?;
    let db = Self { conn };
    db.initialize().await?;
    Ok(db)
  }

  async fn initialize(&self) -> Result<()> {
    self
      .conn
      .call(|conn| -> rusqlite::Result<()> {
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;

        conn.execute_batch(
          r#"
          CREATE TABLE IF NOT EXISTS modes (
              mode_name TEXT PRIMARY KEY,
              active_users INTEGER NOT NULL DEFAULT 0,
              area_code TEXT NOT NULL,
              game_state TEXT NOT NULL DEFAULT '',
              last_updated INTEGER NOT NULL
          );

          -- Roster entries; seq preserves join order
          CREATE TABLE IF NOT EXISTS mode_players (
              seq INTEGER PRIMARY KEY AUTOINCREMENT,
              mode_name TEXT NOT NULL REFERENCES modes(mode_name) ON DELETE CASCADE,
              player_id TEXT NOT NULL
          );

          CREATE INDEX IF NOT EXISTS idx_modes_area ON modes(area_code);
          CREATE INDEX IF NOT EXISTS idx_mode_players_mode ON mode_players(mode_name, seq);
          "#,
        )?;
        Ok(())
      })
      .await?;

    info!("database initialized");
    Ok(())
  }
}

fn load_players(conn: &rusqlite::Connection, mode_name: &str) -> rusqlite::Result<Vec<String>> {
  let mut stmt = conn
    .prepare_cached("SELECT player_id FROM mode_players WHERE mode_name = ?1 ORDER BY seq")?;

  stmt
    .query_map(params![mode_name], |row| row.get(0))?
    .collect()
}

fn mode_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Mode> {
  Ok(Mode {
    mode_name: row.get(0)?,
    active_users: row.get(1)?,
    area_code: row.get(2)?,
    players: Vec::new(),
    game_state: row.get(3)?,
    last_updated: row.get(4)?,
  })
}

const SELECT_MODE: &str =
  "SELECT mode_name, active_users, area_code, game_state, last_updated FROM modes";

#[async_trait]
impl ModeStore for Database {
  async fn list_modes(&self) -> Result<Vec<Mode>> {
    let modes = self
      .conn
      .call(|conn| -> rusqlite::Result<Vec<Mode>> {
        let mut stmt = conn.prepare_cached(&format!("{SELECT_MODE} ORDER BY mode_name"))?;
        let mut modes = stmt
          .query_map([], mode_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        for mode in &mut modes {
          mode.players = load_players(conn, &mode.mode_name)?;
        }
        Ok(modes)
      })
      .await?;

    Ok(modes)
  }

  async fn find_mode(&self, mode_name: &str) -> Result<Option<Mode>> {
    let mode_name = mode_name.to_string();
    let mode = self
      .conn
      .call(move |conn| -> rusqlite::Result<Option<Mode>> {
        let mode = conn
          .prepare_cached(&format!("{SELECT_MODE} WHERE mode_name = ?1"))?
          .query_row(params![&mode_name], mode_from_row)
          .optional()?;

        match mode {
          Some(mut mode) => {
            mode.players = load_players(conn, &mode_name)?;
            Ok(Some(mode))
          }
          None => Ok(None),
        }
      })
      .await?;

    Ok(mode)
  }

  async fn find_players(&self, mode_name: &str) -> Result<Option<Vec<String>>> {
    let mode_name = mode_name.to_string();
    let players = self
      .conn
      .call(move |conn| -> rusqlite::Result<Option<Vec<String>>> {
        let exists: bool = conn
          .prepare_cached("SELECT EXISTS(SELECT 1 FROM modes WHERE mode_name = ?1)")?
          .query_row(params![&mode_name], |row| row.get(0))?;

        if !exists {
          return Ok(None);
        }
        load_players(conn, &mode_name).map(Some)
      })
      .await?;

    Ok(players)
  }

  async fn count_modes(&self) -> Result<u64> {
    let count = self
      .conn
      .call(|conn| -> rusqlite::Result<u64> {
        conn
          .prepare_cached("SELECT COUNT(*) FROM modes")?
          .query_row([], |row| row.get(0))
      })
      .await?;

    Ok(count)
  }

  async fn sum_active_users(&self, area_code: Option<&str>) -> Result<i64> {
    let area_code = area_code.map(str::to_string);
    let total = self
      .conn
      .call(move |conn| -> rusqlite::Result<i64> {
        conn
          .prepare_cached(
            "SELECT COALESCE(SUM(active_users), 0) FROM modes WHERE ?1 IS NULL OR area_code = ?1",
          )?
          .query_row(params![area_code], |row| row.get(0))
      })
      .await?;

    Ok(total)
  }

  async fn join_mode(&self, mode_name: &str, player_id: &str, now: i64) -> Result<()> {
    let mode_name = mode_name.to_string();
    let player_id = player_id.to_string();
    let player_log = player_id.clone();

    self
      .conn
      .call(move |conn| -> rusqlite::Result<Result<()>> {
        let tx = conn.transaction()?;

        let updated = tx
          .prepare_cached(
            "UPDATE modes SET active_users = active_users + 1, last_updated = ?2 WHERE mode_name = ?1",
          )?
          .execute(params![&mode_name, now])?;

        if updated == 0 {
          return Ok(Err(DbError::ModeNotFound));
        }

        tx.prepare_cached("INSERT INTO mode_players (mode_name, player_id) VALUES (?1, ?2)")?
          .execute(params![&mode_name, &player_id])?;

        tx.commit()?;
        Ok(Ok(()))
      })
      .await??;

    debug!(player_id = %player_log, "player joined mode");
    Ok(())
  }

  async fn leave_mode(&self, mode_name: &str, player_id: &str, now: i64) -> Result<()> {
    let mode_name = mode_name.to_string();
    let player_id = player_id.to_string();
    let player_log = player_id.clone();

    let removed = self
      .conn
      .call(move |conn| -> rusqlite::Result<Result<usize>> {
        let tx = conn.transaction()?;

        let updated = tx
          .prepare_cached(
            "UPDATE modes SET active_users = MAX(active_users - 1, 0), last_updated = ?2 WHERE mode_name = ?1",
          )?
          .execute(params![&mode_name, now])?;

        if updated == 0 {
          return Ok(Err(DbError::ModeNotFound));
        }

        let removed = tx
          .prepare_cached("DELETE FROM mode_players WHERE mode_name = ?1 AND player_id = ?2")?
          .execute(params![&mode_name, &player_id])?;

        tx.commit()?;
        Ok(Ok(removed))
      })
      .await??;

    debug!(player_id = %player_log, removed, "player left mode");
    Ok(())
  }

  async fn set_game_state(&self, mode_name: &str, game_state: &str, now: i64) -> Result<()> {
    let mode_name = mode_name.to_string();
    let game_state = game_state.to_string();

    self
      .conn
      .call(move |conn| -> rusqlite::Result<Result<()>> {
        let updated = conn
          .prepare_cached(
            "UPDATE modes SET game_state = ?2, last_updated = ?3 WHERE mode_name = ?1",
          )?
          .execute(params![&mode_name, &game_state, now])?;

        if updated == 0 {
          return Ok(Err(DbError::ModeNotFound));
        }
        Ok(Ok(()))
      })
      .await??;

    debug!("game state updated");
    Ok(())
  }

  async fn insert_mode(&self, mode: NewMode, now: i64) -> Result<Mode> {
    let mode = self
      .conn
      .call(move |conn| -> rusqlite::Result<Result<Mode>> {
        let tx = conn.transaction()?;

        let exists: bool = tx
          .prepare_cached("SELECT EXISTS(SELECT 1 FROM modes WHERE mode_name = ?1)")?
          .query_row(params![&mode.mode_name], |row| row.get(0))?;

        if exists {
          return Ok(Err(DbError::ModeAlreadyExists));
        }

        tx.prepare_cached(
          "INSERT INTO modes (mode_name, active_users, area_code, game_state, last_updated) VALUES (?1, ?2, ?3, ?4, ?5)",
        )?
        .execute(params![
          &mode.mode_name,
          mode.active_users,
          &mode.area_code,
          &mode.game_state,
          now
        ])?;

        {
          let mut insert_player =
            tx.prepare_cached("INSERT INTO mode_players (mode_name, player_id) VALUES (?1, ?2)")?;
          for player in &mode.players {
            insert_player.execute(params![&mode.mode_name, player])?;
          }
        }

        tx.commit()?;
        Ok(Ok(Mode {
          mode_name: mode.mode_name,
          active_users: mode.active_users,
          area_code: mode.area_code,
          players: mode.players,
          game_state: mode.game_state,
          last_updated: now,
        }))
      })
      .await??;

    debug!(%mode.mode_name, %mode.area_code, "created mode");
    Ok(mode)
  }
}
