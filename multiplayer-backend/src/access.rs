//! Cache-aside reads and write-invalidate mutations over the mode store.
//!
//! Reads consult the cache first and fall back to the store on a miss,
//! repopulating the entry. Writes go to the store first and then delete or
//! refresh the affected entries. The store is authoritative: a store
//! failure aborts the operation, a cache failure is logged and ignored.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use multiplayer_db::{Cache, DbError, ModeStore};
use thiserror::Error;
use tracing::{debug, warn};

use crate::cache_entry::{CacheKey, CachePayload, CachedValue, ModeSnapshot};
use crate::helpers::now;
use crate::messages::{GameModeStats, MODE_DESCRIPTION, ModeDetails, ModeUsage};

/// Default lifetime of every cache entry.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(10 * 60);

#[derive(Debug, Error)]
pub enum AccessError {
    #[error("mode {0} not found")]
    NotFound(String),

    #[error(transparent)]
    Store(DbError),
}

impl AccessError {
    fn from_store(err: DbError, mode_name: &str) -> Self {
        match err {
            DbError::ModeNotFound => AccessError::NotFound(mode_name.to_string()),
            other => AccessError::Store(other),
        }
    }
}

impl From<DbError> for AccessError {
    fn from(err: DbError) -> Self {
        AccessError::Store(err)
    }
}

pub type Result<T> = std::result::Result<T, AccessError>;

/// Entry point for every mode use case.
///
/// Cheap to clone; all clones share the same store and cache handles,
/// which must tolerate concurrent use from every in-flight request.
#[derive(Clone)]
pub struct ModeAccess {
    store: Arc<dyn ModeStore>,
    cache: Arc<dyn Cache>,
    ttl: Duration,
}

impl ModeAccess {
    pub fn new(store: Arc<dyn ModeStore>, cache: Arc<dyn Cache>, ttl: Duration) -> Self {
        Self { store, cache, ttl }
    }

    // ========================================================================
    // Reads
    // ========================================================================

    pub async fn get_all_mode_usage(&self) -> Result<Vec<ModeUsage>> {
        self.read_through(CacheKey::ModeUsage, async {
            let modes = self.store.list_modes().await?;
            Ok(modes
                .into_iter()
                .map(|mode| ModeUsage {
                    mode_name: mode.mode_name,
                    active_users: mode.active_users,
                    area_code: mode.area_code,
                })
                .collect())
        })
        .await
    }

    pub async fn get_mode_details(&self, mode_name: &str) -> Result<ModeDetails> {
        self.read_through(CacheKey::ModeDetails(mode_name.to_string()), async {
            let mode = self
                .store
                .find_mode(mode_name)
                .await?
                .ok_or_else(|| AccessError::NotFound(mode_name.to_string()))?;

            Ok(ModeDetails {
                mode_name: mode.mode_name,
                description: MODE_DESCRIPTION.to_string(),
                active_users: mode.active_users,
                area_code: mode.area_code,
            })
        })
        .await
    }

    pub async fn get_players(&self, mode_name: &str) -> Result<Vec<String>> {
        self.read_through(CacheKey::Players(mode_name.to_string()), async {
            self.store
                .find_players(mode_name)
                .await?
                .ok_or_else(|| AccessError::NotFound(mode_name.to_string()))
        })
        .await
    }

    pub async fn get_active_users_by_area(&self, area_code: &str) -> Result<i64> {
        self.read_through(CacheKey::ActiveUsersByArea(area_code.to_string()), async {
            Ok(self.store.sum_active_users(Some(area_code)).await?)
        })
        .await
    }

    /// Count and sum are two separate store passes; they are not
    /// guaranteed to observe the same snapshot.
    pub async fn get_game_mode_stats(&self) -> Result<GameModeStats> {
        self.read_through(CacheKey::GameModeStats, async {
            let total_modes = self.store.count_modes().await?;
            let total_active_users = self.store.sum_active_users(None).await?;
            Ok(GameModeStats {
                total_modes: i64::try_from(total_modes).unwrap_or(i64::MAX),
                total_active_users,
            })
        })
        .await
    }

    pub async fn get_total_active_users(&self) -> Result<i64> {
        self.read_through(CacheKey::TotalActiveUsers, async {
            Ok(self.store.sum_active_users(None).await?)
        })
        .await
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    pub async fn join_mode(&self, mode_name: &str, player_id: &str) -> Result<()> {
        self.store
            .join_mode(mode_name, player_id, now())
            .await
            .map_err(|err| AccessError::from_store(err, mode_name))?;

        self.invalidate_mode(mode_name).await;
        Ok(())
    }

    pub async fn leave_mode(&self, mode_name: &str, player_id: &str) -> Result<()> {
        self.store
            .leave_mode(mode_name, player_id, now())
            .await
            .map_err(|err| AccessError::from_store(err, mode_name))?;

        self.invalidate_mode(mode_name).await;
        Ok(())
    }

    /// Patch the cached snapshot, update the store, then overwrite the
    /// snapshot with a fresh read so a racing patch cannot survive.
    pub async fn update_game_state(&self, mode_name: &str, game_state: &str) -> Result<()> {
        let key = CacheKey::ModeSnapshot(mode_name.to_string());

        if let Some(CachedValue::ModeSnapshot(mut snapshot)) = self.lookup(&key).await {
            snapshot.game_state = game_state.to_string();
            self.write(&key, CachedValue::ModeSnapshot(snapshot)).await;
        }

        self.store
            .set_game_state(mode_name, game_state, now())
            .await
            .map_err(|err| AccessError::from_store(err, mode_name))?;

        let mode = self
            .store
            .find_mode(mode_name)
            .await?
            .ok_or_else(|| AccessError::NotFound(mode_name.to_string()))?;

        self.write(&key, CachedValue::ModeSnapshot(ModeSnapshot::from(mode)))
            .await;
        Ok(())
    }

    // ========================================================================
    // Cache plumbing
    // ========================================================================

    /// Serve `key` from the cache, or run `load` against the store and
    /// cache its result. `load` is never polled on a hit.
    async fn read_through<T, F>(&self, key: CacheKey, load: F) -> Result<T>
    where
        T: CachePayload,
        F: Future<Output = Result<T>>,
    {
        if let Some(value) = self.lookup(&key).await.and_then(T::from_cached) {
            return Ok(value);
        }

        let value = load.await?;
        self.write(&key, value.clone().into_cached()).await;
        Ok(value)
    }

    /// A cache fault or an undecodable entry is reported as a miss.
    async fn lookup(&self, key: &CacheKey) -> Option<CachedValue> {
        let raw_key = key.to_string();
        let raw = match self.cache.get(&raw_key).await {
            Ok(raw) => raw?,
            Err(err) => {
                warn!(key = %raw_key, error = %err, "cache read failed");
                return None;
            }
        };

        match key.decode(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(key = %raw_key, error = %err, "discarding undecodable cache entry");
                None
            }
        }
    }

    async fn write(&self, key: &CacheKey, value: CachedValue) {
        let raw_key = key.to_string();
        let raw = match value.encode() {
            Ok(raw) => raw,
            Err(err) => {
                warn!(key = %raw_key, error = %err, "failed to encode cache entry");
                return;
            }
        };

        if let Err(err) = self.cache.set(&raw_key, raw, self.ttl).await {
            warn!(key = %raw_key, error = %err, "cache write failed");
        }
    }

    /// Entries a roster change makes stale. Player lists, usage and the
    /// totals stay until their TTL runs out.
    async fn invalidate_mode(&self, mode_name: &str) {
        for key in [
            CacheKey::ModeDetails(mode_name.to_string()),
            CacheKey::GameModeStats,
        ] {
            let raw_key = key.to_string();
            match self.cache.delete(&raw_key).await {
                Ok(()) => debug!(key = %raw_key, "invalidated cache entry"),
                Err(err) => warn!(key = %raw_key, error = %err, "cache invalidation failed"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use multiplayer_db::{CacheError, Database, MemoryCache, Mode, NewMode};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts every store query passing through it.
    struct CountingStore {
        inner: Database,
        queries: AtomicUsize,
    }

    impl CountingStore {
        fn queries(&self) -> usize {
            self.queries.load(Ordering::SeqCst)
        }

        fn hit(&self) {
            self.queries.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl ModeStore for CountingStore {
        async fn list_modes(&self) -> multiplayer_db::Result<Vec<Mode>> {
            self.hit();
            self.inner.list_modes().await
        }

        async fn find_mode(&self, mode_name: &str) -> multiplayer_db::Result<Option<Mode>> {
            self.hit();
            self.inner.find_mode(mode_name).await
        }

        async fn find_players(
            &self,
            mode_name: &str,
        ) -> multiplayer_db::Result<Option<Vec<String>>> {
            self.hit();
            self.inner.find_players(mode_name).await
        }

        async fn count_modes(&self) -> multiplayer_db::Result<u64> {
            self.hit();
            self.inner.count_modes().await
        }

        async fn sum_active_users(&self, area_code: Option<&str>) -> multiplayer_db::Result<i64> {
            self.hit();
            self.inner.sum_active_users(area_code).await
        }

        async fn join_mode(
            &self,
            mode_name: &str,
            player_id: &str,
            now: i64,
        ) -> multiplayer_db::Result<()> {
            self.inner.join_mode(mode_name, player_id, now).await
        }

        async fn leave_mode(
            &self,
            mode_name: &str,
            player_id: &str,
            now: i64,
        ) -> multiplayer_db::Result<()> {
            self.inner.leave_mode(mode_name, player_id, now).await
        }

        async fn set_game_state(
            &self,
            mode_name: &str,
            game_state: &str,
            now: i64,
        ) -> multiplayer_db::Result<()> {
            self.inner.set_game_state(mode_name, game_state, now).await
        }

        async fn insert_mode(&self, mode: NewMode, now: i64) -> multiplayer_db::Result<Mode> {
            self.inner.insert_mode(mode, now).await
        }
    }

    /// A store whose every query fails as if the database were locked.
    struct FailingStore;

    fn locked() -> DbError {
        use tokio_rusqlite::rusqlite::{Error, ffi};
        DbError::Sqlite(Error::SqliteFailure(
            ffi::Error::new(ffi::SQLITE_BUSY),
            Some("database is locked".to_string()),
        ))
    }

    #[async_trait]
    impl ModeStore for FailingStore {
        async fn list_modes(&self) -> multiplayer_db::Result<Vec<Mode>> {
            Err(locked())
        }

        async fn find_mode(&self, _mode_name: &str) -> multiplayer_db::Result<Option<Mode>> {
            Err(locked())
        }

        async fn find_players(
            &self,
            _mode_name: &str,
        ) -> multiplayer_db::Result<Option<Vec<String>>> {
            Err(locked())
        }

        async fn count_modes(&self) -> multiplayer_db::Result<u64> {
            Err(locked())
        }

        async fn sum_active_users(&self, _area_code: Option<&str>) -> multiplayer_db::Result<i64> {
            Err(locked())
        }

        async fn join_mode(&self, _: &str, _: &str, _: i64) -> multiplayer_db::Result<()> {
            Err(locked())
        }

        async fn leave_mode(&self, _: &str, _: &str, _: i64) -> multiplayer_db::Result<()> {
            Err(locked())
        }

        async fn set_game_state(&self, _: &str, _: &str, _: i64) -> multiplayer_db::Result<()> {
            Err(locked())
        }

        async fn insert_mode(&self, _mode: NewMode, _now: i64) -> multiplayer_db::Result<Mode> {
            Err(locked())
        }
    }

    /// A cache whose every operation fails.
    struct BrokenCache;

    #[async_trait]
    impl Cache for BrokenCache {
        async fn get(&self, key: &str) -> std::result::Result<Option<String>, CacheError> {
            Err(CacheError::Operation {
                key: key.to_string(),
                reason: "connection refused".to_string(),
            })
        }

        async fn set(
            &self,
            _key: &str,
            _value: String,
            _ttl: Duration,
        ) -> std::result::Result<(), CacheError> {
            Err(CacheError::Unavailable("connection refused".to_string()))
        }

        async fn delete(&self, _key: &str) -> std::result::Result<(), CacheError> {
            Err(CacheError::Unavailable("connection refused".to_string()))
        }
    }

    struct Fixture {
        access: ModeAccess,
        store: Arc<CountingStore>,
        cache: Arc<MemoryCache>,
    }

    async fn fixture(modes: Vec<NewMode>) -> Fixture {
        let db = Database::open_in_memory().await.unwrap();
        for mode in modes {
            db.insert_mode(mode, 0).await.unwrap();
        }
        let store = Arc::new(CountingStore {
            inner: db,
            queries: AtomicUsize::new(0),
        });
        let cache = Arc::new(MemoryCache::new());
        let access = ModeAccess::new(store.clone(), cache.clone(), DEFAULT_CACHE_TTL);
        Fixture { access, store, cache }
    }

    fn arena_modes() -> Vec<NewMode> {
        vec![
            NewMode::new("Arena", "A").with_active_users(5),
            NewMode::new("Battle", "A").with_active_users(3),
            NewMode::new("Coop", "B"),
        ]
    }

    #[tokio::test]
    async fn test_reads_are_served_from_cache_after_first_call() {
        let f = fixture(arena_modes()).await;

        let usage = f.access.get_all_mode_usage().await.unwrap();
        let details = f.access.get_mode_details("Arena").await.unwrap();
        let players = f.access.get_players("Arena").await.unwrap();
        let area = f.access.get_active_users_by_area("A").await.unwrap();
        let stats = f.access.get_game_mode_stats().await.unwrap();
        let total = f.access.get_total_active_users().await.unwrap();
        let cold_queries = f.store.queries();
        // stats takes two passes
        assert_eq!(cold_queries, 7);

        assert_eq!(f.access.get_all_mode_usage().await.unwrap(), usage);
        assert_eq!(f.access.get_mode_details("Arena").await.unwrap(), details);
        assert_eq!(f.access.get_players("Arena").await.unwrap(), players);
        assert_eq!(f.access.get_active_users_by_area("A").await.unwrap(), area);
        assert_eq!(f.access.get_game_mode_stats().await.unwrap(), stats);
        assert_eq!(f.access.get_total_active_users().await.unwrap(), total);
        assert_eq!(f.store.queries(), cold_queries);
    }

    #[tokio::test]
    async fn test_cached_payload_matches_wire_format() {
        let f = fixture(vec![NewMode::new("Arena", "A").with_active_users(2)]).await;
        f.access.get_all_mode_usage().await.unwrap();

        let raw = f.cache.get("mode_usage").await.unwrap().unwrap();
        assert_eq!(raw, r#"[{"mode_name":"Arena","active_users":2,"area_code":"A"}]"#);
    }

    #[tokio::test]
    async fn test_empty_results_are_cached() {
        let f = fixture(vec![NewMode::new("Empty", "A")]).await;

        assert!(f.access.get_players("Empty").await.unwrap().is_empty());
        assert!(f.access.get_players("Empty").await.unwrap().is_empty());
        assert_eq!(f.store.queries(), 1);
        assert_eq!(
            f.cache.get("players_list_Empty").await.unwrap().as_deref(),
            Some("[]")
        );

        let f = fixture(vec![]).await;
        assert!(f.access.get_all_mode_usage().await.unwrap().is_empty());
        assert!(f.access.get_all_mode_usage().await.unwrap().is_empty());
        assert_eq!(f.store.queries(), 1);
    }

    #[tokio::test]
    async fn test_area_aggregation() {
        let f = fixture(vec![
            NewMode::new("One", "A").with_active_users(5),
            NewMode::new("Two", "A").with_active_users(3),
            NewMode::new("Three", "B").with_active_users(2),
        ])
        .await;

        assert_eq!(f.access.get_active_users_by_area("A").await.unwrap(), 8);
        assert_eq!(f.access.get_active_users_by_area("C").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_game_mode_stats() {
        let f = fixture(arena_modes()).await;

        let stats = f.access.get_game_mode_stats().await.unwrap();
        assert_eq!(
            stats,
            GameModeStats {
                total_modes: 3,
                total_active_users: 8
            }
        );
    }

    #[tokio::test]
    async fn test_single_mode_lookups_not_found() {
        let f = fixture(vec![]).await;

        assert!(matches!(
            f.access.get_mode_details("Nonexistent").await,
            Err(AccessError::NotFound(name)) if name == "Nonexistent"
        ));
        assert!(matches!(
            f.access.get_players("Nonexistent").await,
            Err(AccessError::NotFound(_))
        ));
        // Failures are not cached
        assert!(f.cache.is_empty());
    }

    #[tokio::test]
    async fn test_join_leave_scenario() {
        let f = fixture(vec![NewMode::new("Arena", "A")]).await;

        f.access.join_mode("Arena", "p1").await.unwrap();
        f.access.join_mode("Arena", "p2").await.unwrap();
        assert_eq!(
            f.access.get_players("Arena").await.unwrap(),
            vec!["p1", "p2"]
        );
        assert_eq!(f.access.get_mode_details("Arena").await.unwrap().active_users, 2);

        f.access.leave_mode("Arena", "p1").await.unwrap();
        assert_eq!(f.access.get_mode_details("Arena").await.unwrap().active_users, 1);

        let mode = f.store.inner.find_mode("Arena").await.unwrap().unwrap();
        assert_eq!(mode.players, vec!["p2"]);
    }

    #[tokio::test]
    async fn test_join_invalidates_details_and_stats() {
        let f = fixture(arena_modes()).await;

        let before = f.access.get_mode_details("Arena").await.unwrap();
        let stats_before = f.access.get_game_mode_stats().await.unwrap();
        f.access.join_mode("Arena", "p1").await.unwrap();

        assert!(f.cache.get("mode_details:Arena").await.unwrap().is_none());
        assert!(f.cache.get("game_mode_stats").await.unwrap().is_none());

        let after = f.access.get_mode_details("Arena").await.unwrap();
        assert_eq!(after.active_users, before.active_users + 1);
        let stats_after = f.access.get_game_mode_stats().await.unwrap();
        assert_eq!(
            stats_after.total_active_users,
            stats_before.total_active_users + 1
        );
    }

    #[tokio::test]
    async fn test_join_keeps_players_and_usage_entries() {
        let f = fixture(vec![NewMode::new("Arena", "A")]).await;
        f.access.get_players("Arena").await.unwrap();
        f.access.get_all_mode_usage().await.unwrap();

        f.access.join_mode("Arena", "p1").await.unwrap();

        // Accepted staleness until TTL
        assert!(f.access.get_players("Arena").await.unwrap().is_empty());
        assert_eq!(f.access.get_all_mode_usage().await.unwrap()[0].active_users, 0);
    }

    #[tokio::test]
    async fn test_mutations_on_missing_mode() {
        let f = fixture(vec![]).await;

        assert!(matches!(
            f.access.join_mode("Ghost", "p1").await,
            Err(AccessError::NotFound(_))
        ));
        assert!(matches!(
            f.access.leave_mode("Ghost", "p1").await,
            Err(AccessError::NotFound(_))
        ));
        assert!(matches!(
            f.access.update_game_state("Ghost", "paused").await,
            Err(AccessError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_store_failure_aborts_mutation_before_cache() {
        let f = fixture(arena_modes()).await;
        f.access.get_game_mode_stats().await.unwrap();

        let result = f.access.join_mode("Ghost", "p1").await;
        assert!(result.is_err());
        // Nothing was invalidated
        assert!(f.cache.get("game_mode_stats").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_concurrent_joins_and_leaves() {
        let f = fixture(vec![NewMode::new("Arena", "A")]).await;

        let mut handles = Vec::new();
        for i in 0..40 {
            let access = f.access.clone();
            handles.push(tokio::spawn(async move {
                access.join_mode("Arena", &format!("p{i}")).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }
        assert_eq!(f.access.get_mode_details("Arena").await.unwrap().active_users, 40);

        let mut handles = Vec::new();
        for i in 0..25 {
            let access = f.access.clone();
            handles.push(tokio::spawn(async move {
                access.leave_mode("Arena", &format!("p{i}")).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }
        assert_eq!(f.access.get_mode_details("Arena").await.unwrap().active_users, 15);
        assert_eq!(f.store.inner.find_players("Arena").await.unwrap().unwrap().len(), 15);
    }

    #[tokio::test]
    async fn test_update_game_state_refreshes_snapshot() {
        let f = fixture(vec![NewMode::new("Arena", "A").with_game_state("active")]).await;

        f.access.update_game_state("Arena", "paused").await.unwrap();

        let raw = f.cache.get("mode_Arena").await.unwrap().unwrap();
        let decoded = CacheKey::ModeSnapshot("Arena".into()).decode(&raw).unwrap();
        let CachedValue::ModeSnapshot(snapshot) = decoded else {
            panic!("expected a snapshot payload");
        };
        assert_eq!(snapshot.game_state, "paused");
        assert_eq!(snapshot.mode_name, "Arena");
        assert_eq!(
            f.store.inner.find_mode("Arena").await.unwrap().unwrap().game_state,
            "paused"
        );
    }

    #[tokio::test]
    async fn test_update_game_state_overwrites_stale_snapshot() {
        let f = fixture(vec![NewMode::new("Arena", "A").with_active_users(4)]).await;
        let stale = ModeSnapshot {
            mode_name: "Arena".into(),
            active_users: 99,
            area_code: "A".into(),
            ..Default::default()
        };
        f.cache
            .set(
                "mode_Arena",
                CachedValue::ModeSnapshot(stale).encode().unwrap(),
                DEFAULT_CACHE_TTL,
            )
            .await
            .unwrap();

        f.access.update_game_state("Arena", "active").await.unwrap();

        let raw = f.cache.get("mode_Arena").await.unwrap().unwrap();
        assert_eq!(
            CacheKey::ModeSnapshot("Arena".into()).decode(&raw).unwrap(),
            CachedValue::ModeSnapshot(ModeSnapshot {
                mode_name: "Arena".into(),
                active_users: 4,
                area_code: "A".into(),
                players: vec![],
                game_state: "active".into(),
                last_updated: f.store.inner.find_mode("Arena").await.unwrap().unwrap().last_updated,
            })
        );
    }

    #[tokio::test]
    async fn test_undecodable_entry_is_a_miss_and_gets_replaced() {
        let f = fixture(arena_modes()).await;
        f.cache
            .set("game_mode_stats", "{not json".to_string(), DEFAULT_CACHE_TTL)
            .await
            .unwrap();

        let stats = f.access.get_game_mode_stats().await.unwrap();
        assert_eq!(stats.total_modes, 3);
        assert_eq!(
            f.cache.get("game_mode_stats").await.unwrap().as_deref(),
            Some(r#"{"total_modes":3,"total_active_users":8}"#)
        );
    }

    #[tokio::test]
    async fn test_cache_faults_never_fail_operations() {
        let db = Database::open_in_memory().await.unwrap();
        db.insert_mode(NewMode::new("Arena", "A").with_active_users(1), 0)
            .await
            .unwrap();
        let access = ModeAccess::new(Arc::new(db), Arc::new(BrokenCache), DEFAULT_CACHE_TTL);

        assert_eq!(access.get_total_active_users().await.unwrap(), 1);
        assert_eq!(access.get_mode_details("Arena").await.unwrap().active_users, 1);
        access.join_mode("Arena", "p1").await.unwrap();
        access.leave_mode("Arena", "p1").await.unwrap();
        access.update_game_state("Arena", "paused").await.unwrap();
        assert_eq!(access.get_players("Arena").await.unwrap(), Vec::<String>::new());
    }

    #[tokio::test]
    async fn test_store_failure_on_read_leaves_cache_empty() {
        let cache = Arc::new(MemoryCache::new());
        let access = ModeAccess::new(Arc::new(FailingStore), cache.clone(), DEFAULT_CACHE_TTL);

        assert!(matches!(
            access.get_all_mode_usage().await,
            Err(AccessError::Store(_))
        ));
        assert!(matches!(
            access.get_mode_details("Arena").await,
            Err(AccessError::Store(_))
        ));
        assert!(matches!(
            access.get_players("Arena").await,
            Err(AccessError::Store(_))
        ));
        assert!(matches!(
            access.get_active_users_by_area("A").await,
            Err(AccessError::Store(_))
        ));
        assert!(matches!(
            access.get_game_mode_stats().await,
            Err(AccessError::Store(_))
        ));
        assert!(matches!(
            access.get_total_active_users().await,
            Err(AccessError::Store(_))
        ));
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_store_failure_on_mutation_keeps_cached_entries() {
        let cache = Arc::new(MemoryCache::new());
        cache
            .set("game_mode_stats", r#"{"total_modes":1}"#.to_string(), DEFAULT_CACHE_TTL)
            .await
            .unwrap();
        cache
            .set("mode_details:Arena", r#"{"mode_name":"Arena"}"#.to_string(), DEFAULT_CACHE_TTL)
            .await
            .unwrap();
        let access = ModeAccess::new(Arc::new(FailingStore), cache.clone(), DEFAULT_CACHE_TTL);

        let err = access.join_mode("Arena", "p1").await.unwrap_err();
        assert!(matches!(err, AccessError::Store(_)));
        assert!(err.to_string().contains("database is locked"));
        assert!(access.leave_mode("Arena", "p1").await.is_err());
        assert!(access.update_game_state("Arena", "paused").await.is_err());

        assert_eq!(cache.len(), 2);
        assert!(cache.get("mode_Arena").await.unwrap().is_none());
    }
}
