//! Persistent roster store.
//!
//! Each of the four collections lives under its own durable key as JSON text, so a
//! corrupt or oversized collection cannot stop the others from loading or saving.
//! The store is generic over a [`KeyValueStore`] backend: [`DatabaseStore`] keeps
//! entries in `SQLite` through `SeaORM`, [`MemoryStore`] keeps them in process.

use crate::{
    entities::{KvEntry, kv_entry},
    errors::{Error, Result},
    models::{CollectionKind, RosterData},
};
use chrono::Utc;
use sea_orm::{DatabaseConnection, Set, prelude::*};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::{
    collections::BTreeMap,
    sync::{Mutex, PoisonError},
};
use tracing::{debug, info, instrument, warn};

/// A durable per-device string map.
#[allow(async_fn_in_trait)]
pub trait KeyValueStore {
    /// Reads the text stored under `key`, or `None` if the key was never written.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<()>;
}

impl<T: KeyValueStore> KeyValueStore for &T {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value).await
    }
}

/// `SQLite`-backed key-value store, one `kv_entries` row per key.
#[derive(Debug, Clone)]
pub struct DatabaseStore {
    db: DatabaseConnection,
}

impl DatabaseStore {
    /// Wraps an open connection. The table must already exist
    /// (see [`crate::config::database::create_tables`]).
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl KeyValueStore for DatabaseStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let entry = KvEntry::find_by_id(key.to_string()).one(&self.db).await?;
        Ok(entry.map(|e| e.value))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let now = Utc::now().naive_utc();

        let existing = KvEntry::find_by_id(key.to_string()).one(&self.db).await?;

        if let Some(entry) = existing {
            let mut active_model: kv_entry::ActiveModel = entry.into();
            active_model.value = Set(value.to_string());
            active_model.updated_at = Set(now);
            active_model.update(&self.db).await?;
        } else {
            let new_entry = kv_entry::ActiveModel {
                key: Set(key.to_string()),
                value: Set(value.to_string()),
                updated_at: Set(now),
            };
            new_entry.insert(&self.db).await?;
        }

        Ok(())
    }
}

/// In-process key-value store for ephemeral sessions and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with raw entries.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: Mutex::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    /// Raw text currently stored under `key`.
    #[must_use]
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }
}

impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.raw(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Whether an empty collection may be written over stored data.
///
/// `SkipEmpty` keeps a not-yet-populated in-memory collection from wiping what is on
/// disk, at the cost that deleting the last record of a collection is never
/// persisted: the record comes back on the next load. `PersistEmpty` writes empty
/// collections like any other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyWritePolicy {
    /// Never write an empty collection
    #[default]
    SkipEmpty,
    /// Write empty collections too
    PersistEmpty,
}

/// What [`RosterStore::save`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The collection was written
    Written,
    /// The collection was empty and the policy skipped the write
    SkippedEmpty,
}

/// Reads and writes roster collections through a key-value backend.
#[derive(Debug)]
pub struct RosterStore<S> {
    backend: S,
    policy: EmptyWritePolicy,
}

impl<S: KeyValueStore> RosterStore<S> {
    /// Creates a store with the default [`EmptyWritePolicy::SkipEmpty`] guard.
    pub fn new(backend: S) -> Self {
        Self {
            backend,
            policy: EmptyWritePolicy::default(),
        }
    }

    /// Replaces the empty-write policy.
    #[must_use]
    pub fn with_policy(mut self, policy: EmptyWritePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The active empty-write policy.
    pub const fn policy(&self) -> EmptyWritePolicy {
        self.policy
    }

    /// The underlying backend.
    pub const fn backend(&self) -> &S {
        &self.backend
    }

    /// Loads all four collections.
    ///
    /// Never fails: a missing key yields an empty collection, and a key that cannot
    /// be read or parsed is logged and also yields an empty collection without
    /// affecting the other three.
    #[instrument(skip(self))]
    pub async fn load(&self) -> RosterData {
        let data = RosterData {
            members: self.load_or_empty(CollectionKind::Members).await,
            notices: self.load_or_empty(CollectionKind::Notices).await,
            finances: self.load_or_empty(CollectionKind::Finances).await,
            meetings: self.load_or_empty(CollectionKind::Meetings).await,
        };
        debug!(
            members = data.members.len(),
            notices = data.notices.len(),
            finances = data.finances.len(),
            meetings = data.meetings.len(),
            "Loaded roster from store"
        );
        data
    }

    async fn load_or_empty<T: DeserializeOwned>(&self, kind: CollectionKind) -> Vec<T> {
        self.load_collection(kind).await.unwrap_or_else(|e| {
            warn!(collection = %kind, "Discarding unreadable collection: {e}");
            Vec::new()
        })
    }

    /// Loads a single collection, reporting read and parse failures as
    /// [`Error::StoreRead`].
    pub async fn load_collection<T: DeserializeOwned>(
        &self,
        kind: CollectionKind,
    ) -> Result<Vec<T>> {
        let key = kind.storage_key();
        let stored = self
            .backend
            .get(key)
            .await
            .map_err(|e| Error::StoreRead {
                key: key.to_string(),
                message: e.to_string(),
            })?;

        let Some(text) = stored else {
            debug!(key, "No stored value, using empty collection");
            return Ok(Vec::new());
        };

        serde_json::from_str(&text).map_err(|e| Error::StoreRead {
            key: key.to_string(),
            message: e.to_string(),
        })
    }

    /// Writes one collection under its key, subject to the empty-write policy.
    #[instrument(skip(self, items), fields(len = items.len()))]
    pub async fn save<T: Serialize>(
        &self,
        kind: CollectionKind,
        items: &[T],
    ) -> Result<SaveOutcome> {
        if items.is_empty() && self.policy == EmptyWritePolicy::SkipEmpty {
            debug!("Skipping write of empty collection");
            return Ok(SaveOutcome::SkippedEmpty);
        }

        let text = serde_json::to_string(items)?;
        self.backend.set(kind.storage_key(), &text).await?;
        debug!("Saved collection");
        Ok(SaveOutcome::Written)
    }

    /// Writes the collection named by `kind` out of `data`.
    pub async fn save_from(&self, kind: CollectionKind, data: &RosterData) -> Result<SaveOutcome> {
        match kind {
            CollectionKind::Members => self.save(kind, &data.members).await,
            CollectionKind::Notices => self.save(kind, &data.notices).await,
            CollectionKind::Finances => self.save(kind, &data.finances).await,
            CollectionKind::Meetings => self.save(kind, &data.meetings).await,
        }
    }

    /// Writes all four collections.
    pub async fn save_all(&self, data: &RosterData) -> Result<()> {
        for kind in CollectionKind::ALL {
            self.save_from(kind, data).await?;
        }
        Ok(())
    }

    /// Writes seed collections for keys that have never been written.
    ///
    /// Keys that already hold a value, even a corrupt one, are left alone.
    /// Returns the collections that were seeded.
    pub async fn seed_missing(&self, seed: &RosterData) -> Result<Vec<CollectionKind>> {
        let mut seeded = Vec::new();

        for kind in CollectionKind::ALL {
            if seed.len_of(kind) == 0 {
                continue;
            }
            if self.backend.get(kind.storage_key()).await?.is_some() {
                continue;
            }
            if self.save_from(kind, seed).await? == SaveOutcome::Written {
                info!(collection = %kind, count = seed.len_of(kind), "Seeded collection");
                seeded.push(kind);
            }
        }

        Ok(seeded)
    }
}
