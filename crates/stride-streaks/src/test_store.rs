//! Test doubles for the `UserStore` seam.

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::anyhow;
use uuid::Uuid;

use crate::error::StreakError;
use crate::store::{StreakRecord, UserStore};

/// In-memory store with the same version-checked write semantics as the
/// SQLite-backed one.
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<Uuid, StreakRecord>>,
}

impl MemoryStore {
    pub fn with_user(user_id: Uuid) -> Self {
        let store = Self::default();
        store.put_fresh(user_id);
        store
    }

    /// Insert a user with zeroed participation fields, as record creation does.
    pub fn put_fresh(&self, user_id: Uuid) {
        self.put(StreakRecord {
            user_id,
            last_post_date: None,
            current_streak: 0,
            longest_streak: 0,
            participation_points: 0,
            version: 0,
        });
    }

    pub fn put(&self, record: StreakRecord) {
        self.records.lock().unwrap().insert(record.user_id, record);
    }

    pub fn get(&self, user_id: Uuid) -> StreakRecord {
        self.records.lock().unwrap()[&user_id].clone()
    }

    /// What a concurrent writer does to a row between someone's load and save.
    pub fn bump_version(&self, user_id: Uuid) {
        self.records
            .lock()
            .unwrap()
            .get_mut(&user_id)
            .unwrap()
            .version += 1;
    }
}

impl UserStore for MemoryStore {
    fn load_streak(&self, user_id: Uuid) -> Result<StreakRecord, StreakError> {
        self.records
            .lock()
            .unwrap()
            .get(&user_id)
            .cloned()
            .ok_or(StreakError::NotFound(user_id))
    }

    fn save_streak(&self, record: &StreakRecord) -> Result<bool, StreakError> {
        let mut records = self.records.lock().unwrap();
        let Some(existing) = records.get_mut(&record.user_id) else {
            return Err(StreakError::NotFound(record.user_id));
        };
        if existing.version != record.version {
            return Ok(false);
        }
        *existing = StreakRecord {
            version: record.version + 1,
            ..record.clone()
        };
        Ok(true)
    }

    fn active_streaks(&self) -> Result<Vec<StreakRecord>, StreakError> {
        let records = self.records.lock().unwrap();
        Ok(records
            .values()
            .filter(|r| r.current_streak > 0)
            .cloned()
            .collect())
    }
}

/// Loses the first `contend` saves to a simulated concurrent writer.
pub struct ContendedStore {
    pub inner: MemoryStore,
    remaining: Mutex<u32>,
}

impl ContendedStore {
    pub fn new(inner: MemoryStore, contend: u32) -> Self {
        Self {
            inner,
            remaining: Mutex::new(contend),
        }
    }
}

impl UserStore for ContendedStore {
    fn load_streak(&self, user_id: Uuid) -> Result<StreakRecord, StreakError> {
        self.inner.load_streak(user_id)
    }

    fn save_streak(&self, record: &StreakRecord) -> Result<bool, StreakError> {
        {
            let mut remaining = self.remaining.lock().unwrap();
            if *remaining > 0 {
                *remaining -= 1;
                self.inner.bump_version(record.user_id);
            }
        }
        self.inner.save_streak(record)
    }

    fn active_streaks(&self) -> Result<Vec<StreakRecord>, StreakError> {
        self.inner.active_streaks()
    }
}

/// Fails every save for one user, to exercise partial-failure paths.
pub struct FailingStore {
    pub inner: MemoryStore,
    fail_user: Uuid,
}

impl FailingStore {
    pub fn new(inner: MemoryStore, fail_user: Uuid) -> Self {
        Self { inner, fail_user }
    }
}

impl UserStore for FailingStore {
    fn load_streak(&self, user_id: Uuid) -> Result<StreakRecord, StreakError> {
        self.inner.load_streak(user_id)
    }

    fn save_streak(&self, record: &StreakRecord) -> Result<bool, StreakError> {
        if record.user_id == self.fail_user {
            return Err(StreakError::Storage(anyhow!("save rejected for test")));
        }
        self.inner.save_streak(record)
    }

    fn active_streaks(&self) -> Result<Vec<StreakRecord>, StreakError> {
        self.inner.active_streaks()
    }
}
