//! SQLite-backed queue store.
//!
//! One database file holds the queue for all repositories. Mutations are
//! serialized behind a single connection lock (exclusive-write,
//! concurrent-read via WAL), so overlapping invocations of the tool never
//! produce duplicate rows or expose half-written entries.

use crate::error::{PlanqError, Result};
use crate::store::backoff::BackoffPolicy;
use crate::store::records::{ErrorRecord, ProcessingRecord, QueueEntry};
use crate::store::{from_millis, to_millis};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, TransactionBehavior, params};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// Persistent work queue backed by a single SQLite file.
pub struct QueueStore {
    path: PathBuf,
    conn: Mutex<Connection>,
    backoff: BackoffPolicy,
}

impl QueueStore {
    /// Open or create the store at the given path.
    pub fn open(path: &Path, backoff: BackoffPolicy) -> Result<Self> {
        Self::open_with_timeout(path, backoff, 5000)
    }

    /// Open with an explicit SQLite busy timeout (milliseconds).
    pub fn open_with_timeout(path: &Path, backoff: BackoffPolicy, busy_timeout_ms: u64) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path).map_err(|e| PlanqError::StoreOpen {
            path: path.display().to_string(),
            source: e,
        })?;

        // WAL allows readers to proceed while a write is in flight; the
        // busy timeout covers contention from overlapping invocations.
        conn.pragma_update(None, "journal_mode", "WAL")
            .and_then(|_| conn.pragma_update(None, "busy_timeout", busy_timeout_ms as i64))
            .map_err(|e| PlanqError::StoreOpen {
                path: path.display().to_string(),
                source: e,
            })?;

        Self::init_schema(&conn).map_err(|e| PlanqError::StoreOpen {
            path: path.display().to_string(),
            source: e,
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            conn: Mutex::new(conn),
            backoff,
        })
    }

    /// Initialize the SQLite schema.
    fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS queue (
                repo TEXT NOT NULL,
                issue_number INTEGER NOT NULL,
                next_retry_at INTEGER NOT NULL,
                retry_count INTEGER NOT NULL DEFAULT 0,
                last_error TEXT,
                created_at INTEGER NOT NULL,
                PRIMARY KEY (repo, issue_number)
            );

            CREATE INDEX IF NOT EXISTS idx_queue_next_retry ON queue(next_retry_at);

            CREATE TABLE IF NOT EXISTS history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                repo TEXT NOT NULL,
                issue_number INTEGER NOT NULL,
                recorded_at INTEGER NOT NULL,
                success INTEGER NOT NULL,
                rate_limit_seconds INTEGER
            );

            CREATE INDEX IF NOT EXISTS idx_history_recorded ON history(recorded_at);

            CREATE TABLE IF NOT EXISTS errors (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                kind TEXT NOT NULL,
                message TEXT NOT NULL,
                repo TEXT,
                issue_number INTEGER,
                recorded_at INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_errors_recorded ON errors(recorded_at);
            "#,
        )
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        // A poisoned lock only means another thread panicked mid-operation;
        // the connection itself is still usable.
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn key(repo: &str, issue_number: u64) -> String {
        format!("{}#{}", repo, issue_number)
    }

    /// Get the database file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Insert a new entry, or update `next_retry_at` on an existing one.
    ///
    /// Returns true iff the entry was newly inserted. This is the sole
    /// upsert path; a duplicate key is never an error.
    pub fn add_or_update(
        &self,
        repo: &str,
        issue_number: u64,
        next_retry_at: Option<DateTime<Utc>>,
    ) -> Result<bool> {
        let now = Utc::now();
        let next = next_retry_at.unwrap_or(now);
        let mut conn = self.conn();

        // An immediate transaction takes SQLite's write lock up front.
        // Concurrency comes from independent invocations of the tool, so
        // the in-process lock alone cannot serialize them; a second
        // process racing on the same absent key waits here and then takes
        // the update path instead of tripping the unique constraint.
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|e| PlanqError::store("add_or_update", Self::key(repo, issue_number), e))?;

        let updated = tx
            .execute(
                "UPDATE queue SET next_retry_at = ?3 WHERE repo = ?1 AND issue_number = ?2",
                params![repo, issue_number as i64, to_millis(next)],
            )
            .map_err(|e| PlanqError::store("add_or_update", Self::key(repo, issue_number), e))?;

        if updated == 0 {
            tx.execute(
                r#"
                INSERT INTO queue (repo, issue_number, next_retry_at, retry_count, last_error, created_at)
                VALUES (?1, ?2, ?3, 0, NULL, ?4)
                "#,
                params![repo, issue_number as i64, to_millis(next), to_millis(now)],
            )
            .map_err(|e| PlanqError::store("add_or_update", Self::key(repo, issue_number), e))?;
        }

        tx.commit()
            .map_err(|e| PlanqError::store("add_or_update", Self::key(repo, issue_number), e))?;

        Ok(updated == 0)
    }

    /// List entries whose `next_retry_at` has passed, oldest first.
    ///
    /// Ordering is stable (next_retry_at, then issue number) so repeated
    /// calls without intervening writes yield the same sequence.
    pub fn list_ready(&self, now: DateTime<Utc>) -> Result<Vec<QueueEntry>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(
                r#"
                SELECT repo, issue_number, next_retry_at, retry_count, last_error, created_at
                FROM queue
                WHERE next_retry_at <= ?1
                ORDER BY next_retry_at ASC, issue_number ASC
                "#,
            )
            .map_err(|e| PlanqError::store("list_ready", "queue", e))?;

        let rows = stmt
            .query_map([to_millis(now)], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, u32>(3)?,
                    row.get::<_, Option<String>>(4)?,
                    row.get::<_, i64>(5)?,
                ))
            })
            .map_err(|e| PlanqError::store("list_ready", "queue", e))?;

        let mut entries = Vec::new();
        for row in rows {
            let (repo, issue_number, next_retry_ms, retry_count, last_error, created_ms) =
                row.map_err(|e| PlanqError::store("list_ready", "queue", e))?;
            entries.push(QueueEntry {
                repo,
                issue_number: issue_number as u64,
                next_retry_at: from_millis(next_retry_ms)?,
                retry_count,
                last_error,
                created_at: from_millis(created_ms)?,
            });
        }

        Ok(entries)
    }

    /// Delete an entry. Absent entries are a silent no-op.
    pub fn remove(&self, repo: &str, issue_number: u64) -> Result<()> {
        self.conn()
            .execute(
                "DELETE FROM queue WHERE repo = ?1 AND issue_number = ?2",
                params![repo, issue_number as i64],
            )
            .map_err(|e| PlanqError::store("remove", Self::key(repo, issue_number), e))?;
        Ok(())
    }

    /// Append a processing attempt stamped with the current time.
    pub fn record_attempt(
        &self,
        repo: &str,
        issue_number: u64,
        success: bool,
        rate_limit_seconds: Option<u64>,
    ) -> Result<()> {
        self.record_attempt_at(repo, issue_number, success, rate_limit_seconds, Utc::now())
    }

    /// Append a processing attempt with an explicit timestamp. Test seam
    /// for exercising the recharge window.
    pub(crate) fn record_attempt_at(
        &self,
        repo: &str,
        issue_number: u64,
        success: bool,
        rate_limit_seconds: Option<u64>,
        at: DateTime<Utc>,
    ) -> Result<()> {
        self.conn()
            .execute(
                r#"
                INSERT INTO history (repo, issue_number, recorded_at, success, rate_limit_seconds)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
                params![
                    repo,
                    issue_number as i64,
                    to_millis(at),
                    success,
                    rate_limit_seconds.map(|s| s as i64),
                ],
            )
            .map_err(|e| PlanqError::store("record_attempt", Self::key(repo, issue_number), e))?;
        Ok(())
    }

    /// Append an error record for diagnostics.
    pub fn record_error(
        &self,
        kind: &str,
        message: &str,
        repo: Option<&str>,
        issue_number: Option<u64>,
    ) -> Result<()> {
        self.conn()
            .execute(
                r#"
                INSERT INTO errors (kind, message, repo, issue_number, recorded_at)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
                params![
                    kind,
                    message,
                    repo,
                    issue_number.map(|n| n as i64),
                    to_millis(Utc::now()),
                ],
            )
            .map_err(|e| PlanqError::store("record_error", kind.to_string(), e))?;
        Ok(())
    }

    /// Attempts with timestamps in `[now - window, now]`, both bounds
    /// inclusive, oldest first.
    pub fn recent_attempts(&self, window_minutes: i64, now: DateTime<Utc>) -> Result<Vec<ProcessingRecord>> {
        let cutoff = now - chrono::Duration::minutes(window_minutes);
        let conn = self.conn();
        let mut stmt = conn
            .prepare(
                r#"
                SELECT repo, issue_number, recorded_at, success, rate_limit_seconds
                FROM history
                WHERE recorded_at >= ?1 AND recorded_at <= ?2
                ORDER BY recorded_at ASC, id ASC
                "#,
            )
            .map_err(|e| PlanqError::store("recent_attempts", "history", e))?;

        let rows = stmt
            .query_map([to_millis(cutoff), to_millis(now)], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, bool>(3)?,
                    row.get::<_, Option<i64>>(4)?,
                ))
            })
            .map_err(|e| PlanqError::store("recent_attempts", "history", e))?;

        let mut records = Vec::new();
        for row in rows {
            let (repo, issue_number, recorded_ms, success, rate_limit_seconds) =
                row.map_err(|e| PlanqError::store("recent_attempts", "history", e))?;
            records.push(ProcessingRecord {
                repo,
                issue_number: issue_number as u64,
                recorded_at: from_millis(recorded_ms)?,
                success,
                rate_limit_seconds: rate_limit_seconds.map(|s| s as u64),
            });
        }

        Ok(records)
    }

    /// Most recent error records, newest first.
    pub fn recent_errors(&self, limit: u32) -> Result<Vec<ErrorRecord>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(
                r#"
                SELECT kind, message, repo, issue_number, recorded_at
                FROM errors
                ORDER BY recorded_at DESC, id DESC
                LIMIT ?1
                "#,
            )
            .map_err(|e| PlanqError::store("recent_errors", "errors", e))?;

        let rows = stmt
            .query_map([limit], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, Option<i64>>(3)?,
                    row.get::<_, i64>(4)?,
                ))
            })
            .map_err(|e| PlanqError::store("recent_errors", "errors", e))?;

        let mut records = Vec::new();
        for row in rows {
            let (kind, message, repo, issue_number, recorded_ms) =
                row.map_err(|e| PlanqError::store("recent_errors", "errors", e))?;
            records.push(ErrorRecord {
                kind,
                message,
                repo,
                issue_number: issue_number.map(|n| n as u64),
                recorded_at: from_millis(recorded_ms)?,
            });
        }

        Ok(records)
    }

    /// Record a failed attempt on an entry: bump `retry_count`, store the
    /// error message, and push `next_retry_at` forward under the backoff
    /// policy. A missing entry is logged and skipped.
    pub fn increment_retry(&self, repo: &str, issue_number: u64, error_message: &str) -> Result<()> {
        let now = Utc::now();
        let mut conn = self.conn();

        // Read-modify-write; the immediate transaction keeps the count
        // linearized across overlapping invocations.
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|e| PlanqError::store("increment_retry", Self::key(repo, issue_number), e))?;

        let current: Option<u32> = tx
            .query_row(
                "SELECT retry_count FROM queue WHERE repo = ?1 AND issue_number = ?2",
                params![repo, issue_number as i64],
                |row| row.get(0),
            )
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(PlanqError::store(
                    "increment_retry",
                    Self::key(repo, issue_number),
                    other,
                )),
            })?;

        let Some(retry_count) = current else {
            log::warn!(
                "increment_retry on missing entry {}",
                Self::key(repo, issue_number)
            );
            // Dropping the transaction rolls back; nothing was written
            return Ok(());
        };

        let new_count = retry_count + 1;
        let next_retry_at = self.backoff.next_retry_at(now, new_count);

        tx.execute(
            r#"
            UPDATE queue
            SET retry_count = ?3, last_error = ?4, next_retry_at = ?5
            WHERE repo = ?1 AND issue_number = ?2
            "#,
            params![
                repo,
                issue_number as i64,
                new_count,
                error_message,
                to_millis(next_retry_at),
            ],
        )
        .map_err(|e| PlanqError::store("increment_retry", Self::key(repo, issue_number), e))?;

        tx.commit()
            .map_err(|e| PlanqError::store("increment_retry", Self::key(repo, issue_number), e))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempfile::TempDir;

    fn create_temp_store() -> (QueueStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = QueueStore::open(&temp_dir.path().join("planq.db"), BackoffPolicy::default()).unwrap();
        (store, temp_dir)
    }

    #[test]
    fn test_open_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested/dir/planq.db");
        let _store = QueueStore::open(&path, BackoffPolicy::default()).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_add_then_update() {
        let (store, _temp) = create_temp_store();
        let next_retry = Utc::now() + Duration::minutes(32);

        let added = store.add_or_update("owner/repo", 123, Some(next_retry)).unwrap();
        assert!(added);

        // Adding again updates rather than duplicating
        let added = store.add_or_update("owner/repo", 123, Some(next_retry)).unwrap();
        assert!(!added);

        let all = store.list_ready(Utc::now() + Duration::hours(2)).unwrap();
        assert_eq!(all.len(), 1);
    }

    #[test]
    fn test_add_or_update_moves_retry_time() {
        let (store, _temp) = create_temp_store();
        let now = Utc::now();

        store.add_or_update("owner/repo", 1, Some(now + Duration::hours(1))).unwrap();
        assert!(store.list_ready(now).unwrap().is_empty());

        store.add_or_update("owner/repo", 1, Some(now - Duration::minutes(1))).unwrap();
        assert_eq!(store.list_ready(now).unwrap().len(), 1);
    }

    #[test]
    fn test_list_ready_filters_and_orders() {
        let (store, _temp) = create_temp_store();
        let now = Utc::now();

        store.add_or_update("owner/repo", 1, Some(now - Duration::minutes(1))).unwrap();
        store.add_or_update("owner/repo", 2, Some(now + Duration::hours(1))).unwrap();
        store.add_or_update("owner/repo", 3, Some(now - Duration::minutes(5))).unwrap();

        let ready = store.list_ready(now).unwrap();
        assert_eq!(ready.len(), 2);
        // Oldest next_retry_at first
        assert_eq!(ready[0].issue_number, 3);
        assert_eq!(ready[1].issue_number, 1);
    }

    #[test]
    fn test_list_ready_includes_exact_boundary() {
        let (store, _temp) = create_temp_store();
        let now = Utc::now();

        store.add_or_update("owner/repo", 1, Some(now)).unwrap();
        assert_eq!(store.list_ready(now).unwrap().len(), 1);
    }

    #[test]
    fn test_remove() {
        let (store, _temp) = create_temp_store();
        store.add_or_update("owner/repo", 123, None).unwrap();
        store.remove("owner/repo", 123).unwrap();

        let ready = store.list_ready(Utc::now()).unwrap();
        assert!(ready.is_empty());
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let (store, _temp) = create_temp_store();
        store.remove("owner/repo", 999).unwrap();
    }

    #[test]
    fn test_record_attempt() {
        let (store, _temp) = create_temp_store();

        store.record_attempt("owner/repo", 123, true, None).unwrap();
        store.record_attempt("owner/repo", 124, false, Some(2571)).unwrap();

        let history = store.recent_attempts(30, Utc::now()).unwrap();
        assert_eq!(history.len(), 2);

        let failed = &history[1];
        assert_eq!(failed.issue_number, 124);
        assert!(!failed.success);
        assert_eq!(failed.rate_limit_seconds, Some(2571));
    }

    #[test]
    fn test_recent_attempts_window_boundary() {
        let (store, _temp) = create_temp_store();
        let now = Utc::now();

        // Exactly 30 minutes old: included
        store
            .record_attempt_at("owner/repo", 1, true, None, now - Duration::minutes(30))
            .unwrap();
        // One second past the window: excluded
        store
            .record_attempt_at("owner/repo", 2, true, None, now - Duration::minutes(30) - Duration::seconds(1))
            .unwrap();

        let history = store.recent_attempts(30, now).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].issue_number, 1);
    }

    #[test]
    fn test_recent_attempts_excludes_future() {
        let (store, _temp) = create_temp_store();
        let now = Utc::now();

        store
            .record_attempt_at("owner/repo", 1, true, None, now + Duration::minutes(5))
            .unwrap();

        assert!(store.recent_attempts(30, now).unwrap().is_empty());
    }

    #[test]
    fn test_record_error_and_recent_errors() {
        let (store, _temp) = create_temp_store();

        store
            .record_error("api_error", "Something went wrong", Some("owner/repo"), Some(123))
            .unwrap();

        let errors = store.recent_errors(10).unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, "api_error");
        assert_eq!(errors[0].repo.as_deref(), Some("owner/repo"));
        assert_eq!(errors[0].issue_number, Some(123));
    }

    #[test]
    fn test_recent_errors_newest_first_and_limited() {
        let (store, _temp) = create_temp_store();

        for i in 0..5 {
            store
                .record_error("api_error", &format!("error {}", i), None, None)
                .unwrap();
        }

        let errors = store.recent_errors(3).unwrap();
        assert_eq!(errors.len(), 3);
        assert_eq!(errors[0].message, "error 4");
        assert_eq!(errors[2].message, "error 2");
    }

    #[test]
    fn test_increment_retry() {
        let (store, _temp) = create_temp_store();
        let now = Utc::now();

        store.add_or_update("owner/repo", 123, None).unwrap();
        store.increment_retry("owner/repo", 123, "API error").unwrap();

        // Entry moved past now by the backoff policy; look far enough ahead
        let entries = store.list_ready(now + Duration::hours(5)).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].retry_count, 1);
        assert_eq!(entries[0].last_error.as_deref(), Some("API error"));
        assert!(entries[0].next_retry_at > now);
    }

    #[test]
    fn test_increment_retry_backoff_grows() {
        let (store, _temp) = create_temp_store();
        let now = Utc::now();

        store.add_or_update("owner/repo", 123, None).unwrap();
        store.increment_retry("owner/repo", 123, "first").unwrap();
        store.increment_retry("owner/repo", 123, "second").unwrap();

        let entries = store.list_ready(now + Duration::hours(5)).unwrap();
        assert_eq!(entries[0].retry_count, 2);
        // Second failure under the default policy waits 64 minutes
        assert!(entries[0].next_retry_at >= now + Duration::minutes(63));
    }

    #[test]
    fn test_increment_retry_missing_entry_is_noop() {
        let (store, _temp) = create_temp_store();
        store.increment_retry("owner/repo", 999, "whatever").unwrap();
    }

    #[test]
    fn test_persistence_across_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("planq.db");

        {
            let store = QueueStore::open(&path, BackoffPolicy::default()).unwrap();
            store.add_or_update("owner/repo", 7, None).unwrap();
            store.record_attempt("owner/repo", 7, false, Some(1800)).unwrap();
        }

        {
            let store = QueueStore::open(&path, BackoffPolicy::default()).unwrap();
            assert_eq!(store.list_ready(Utc::now()).unwrap().len(), 1);
            assert_eq!(store.recent_attempts(30, Utc::now()).unwrap().len(), 1);
        }
    }

    #[test]
    fn test_concurrent_upserts_single_row() {
        use std::sync::Arc;

        let temp_dir = TempDir::new().unwrap();
        let store = Arc::new(
            QueueStore::open(&temp_dir.path().join("planq.db"), BackoffPolicy::default()).unwrap(),
        );

        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = Arc::clone(&store);
            handles.push(std::thread::spawn(move || {
                store.add_or_update("owner/repo", 42, None).unwrap();
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let all = store.list_ready(Utc::now() + Duration::hours(1)).unwrap();
        assert_eq!(all.len(), 1);
    }

    #[test]
    fn test_upsert_race_across_store_handles() {
        use std::sync::{Arc, Barrier};

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("planq.db");

        // Two handles on one file simulate two independent invocations;
        // neither in-process lock can serialize the other.
        let a = Arc::new(QueueStore::open(&path, BackoffPolicy::default()).unwrap());
        let b = Arc::new(QueueStore::open(&path, BackoffPolicy::default()).unwrap());

        for round in 0..200u64 {
            let barrier = Arc::new(Barrier::new(2));
            let handles: Vec<_> = [Arc::clone(&a), Arc::clone(&b)]
                .into_iter()
                .map(|store| {
                    let barrier = Arc::clone(&barrier);
                    std::thread::spawn(move || {
                        barrier.wait();
                        store.add_or_update("owner/repo", round, None)
                    })
                })
                .collect();

            // Neither racer may error on the duplicate key, and exactly
            // one of them takes the insert path
            let inserted: Vec<bool> = handles.into_iter().map(|h| h.join().unwrap().unwrap()).collect();
            assert_eq!(inserted.iter().filter(|i| **i).count(), 1, "round {}", round);
        }
    }

    #[test]
    fn test_increment_retry_race_across_store_handles() {
        use std::sync::{Arc, Barrier};

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("planq.db");

        let a = Arc::new(QueueStore::open(&path, BackoffPolicy::default()).unwrap());
        let b = Arc::new(QueueStore::open(&path, BackoffPolicy::default()).unwrap());
        a.add_or_update("owner/repo", 1, None).unwrap();

        let rounds: u32 = 20;
        let barrier = Arc::new(Barrier::new(2));
        let handles: Vec<_> = [Arc::clone(&a), Arc::clone(&b)]
            .into_iter()
            .map(|store| {
                let barrier = Arc::clone(&barrier);
                std::thread::spawn(move || {
                    for _ in 0..rounds {
                        barrier.wait();
                        store.increment_retry("owner/repo", 1, "API error").unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        // Overlapping read-modify-writes must not lose increments
        let entries = a.list_ready(Utc::now() + Duration::days(365)).unwrap();
        assert_eq!(entries[0].retry_count, 2 * rounds);
    }
}
