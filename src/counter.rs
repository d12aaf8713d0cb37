//! Daily visitor-token counter with durable storage.
//!
//! The counter is the only durable state this crate owns: a JSON
//! `{date, count}` record under a fixed storage key. Reads degrade to a
//! zeroed record on any failure so token issuance never hard-fails on a
//! corrupt file; writes must succeed before a token is handed out.

use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use chrono::{DateTime, Local};
use tracing::warn;

use crate::models::entity::Entity;
use crate::models::token::{DailyCounter, VisitorToken};
use crate::{AppError, Result};

/// Storage key the daily counter record persists under.
pub const DAILY_COUNTER_KEY: &str = "dailyCounter";

/// Durable key/value seam for the counter record.
///
/// Read-then-write with no transactional guarantee: two concurrent
/// processes can issue the same token. A server-issued sequence or a
/// compare-and-swap storage primitive would slot in behind this trait;
/// single-process front-desk usage is assumed until then.
pub trait CounterStore: Send + Sync {
    /// Read the stored record, or `None` when absent/unreadable.
    fn load(&self, key: &str) -> Option<DailyCounter>;

    /// Persist the record under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Storage`] when the record cannot be written.
    fn save(&self, key: &str, record: &DailyCounter) -> Result<()>;
}

/// JSON-file-backed store: one `<key>.json` document per key.
#[derive(Debug, Clone)]
pub struct FileCounterStore {
    dir: PathBuf,
}

impl FileCounterStore {
    /// Store rooted at `dir`; the directory is created on first save.
    #[must_use]
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl CounterStore for FileCounterStore {
    fn load(&self, key: &str) -> Option<DailyCounter> {
        let path = self.path_for(key);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return None,
            Err(err) => {
                warn!(path = %path.display(), %err, "counter record unreadable; treating as absent");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(record) => Some(record),
            Err(err) => {
                warn!(path = %path.display(), %err, "counter record malformed; treating as absent");
                None
            }
        }
    }

    fn save(&self, key: &str, record: &DailyCounter) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .map_err(|err| AppError::Storage(format!("cannot create counter dir: {err}")))?;
        let raw = serde_json::to_string(record)
            .map_err(|err| AppError::Storage(format!("cannot serialize counter: {err}")))?;
        fs::write(self.path_for(key), raw)
            .map_err(|err| AppError::Storage(format!("cannot write counter: {err}")))
    }
}

/// In-memory store for tests and ephemeral kiosks.
#[derive(Debug, Default)]
pub struct MemoryCounterStore {
    record: Mutex<Option<(String, DailyCounter)>>,
}

impl CounterStore for MemoryCounterStore {
    fn load(&self, key: &str) -> Option<DailyCounter> {
        let guard = match self.record.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard
            .as_ref()
            .filter(|(stored_key, _)| stored_key == key)
            .map(|(_, record)| record.clone())
    }

    fn save(&self, key: &str, record: &DailyCounter) -> Result<()> {
        let mut guard = match self.record.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = Some((key.to_owned(), record.clone()));
        Ok(())
    }
}

/// Issues per-calendar-day sequential visitor tokens.
pub struct DailyCounterTokenizer<S: CounterStore> {
    store: S,
    storage_key: String,
}

impl<S: CounterStore> DailyCounterTokenizer<S> {
    /// Tokenizer over `store` using the fixed default storage key.
    #[must_use]
    pub fn new(store: S) -> Self {
        Self::with_key(store, DAILY_COUNTER_KEY)
    }

    /// Tokenizer with an explicit storage key.
    #[must_use]
    pub fn with_key(store: S, storage_key: &str) -> Self {
        Self {
            store,
            storage_key: storage_key.to_owned(),
        }
    }

    /// Next sequence value for `today`, persisting before returning.
    ///
    /// Resets to 1 when the stored date differs from `today` (including
    /// the absent/unreadable case), otherwise increments.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Storage`] when the updated record cannot be
    /// persisted; no token value is issued in that case.
    pub fn next_token(&self, today: &str) -> Result<u32> {
        let stored = self.store.load(&self.storage_key).unwrap_or_default();

        let record = if stored.date == today {
            DailyCounter {
                date: stored.date,
                count: stored.count.saturating_add(1),
            }
        } else {
            DailyCounter {
                date: today.to_owned(),
                count: 1,
            }
        };

        self.store.save(&self.storage_key, &record)?;
        Ok(record.count)
    }

    /// Issue a printable token for `customer` at an explicit instant.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Storage`] when the counter cannot be persisted.
    pub fn issue_at(&self, customer: &Entity, now: DateTime<Local>) -> Result<VisitorToken> {
        let date = now.format("%Y-%m-%d").to_string();
        let number = self.next_token(&date)?;
        Ok(VisitorToken {
            number,
            date,
            time: now.format("%H:%M:%S").to_string(),
            customer_name: customer.display_name.clone(),
        })
    }

    /// Issue a printable token for `customer` at the current local time.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Storage`] when the counter cannot be persisted.
    pub fn issue(&self, customer: &Entity) -> Result<VisitorToken> {
        self.issue_at(customer, Local::now())
    }
}
