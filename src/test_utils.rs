//! Shared test utilities for Clubhouse.
//!
//! Helpers for setting up an in-memory database and building roster records
//! with sensible defaults.

use crate::{
    core::store::{DatabaseStore, KeyValueStore, MemoryStore},
    errors::Result,
    models::{
        AttendanceStatus, EntryKind, FinancialRecord, Meeting, Member, MemberRole, Notice,
        RosterData,
    },
};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;
use std::{
    collections::BTreeMap,
    sync::atomic::{AtomicUsize, Ordering},
};

/// Creates an in-memory `SQLite` database with all tables initialized.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// A [`DatabaseStore`] over a fresh in-memory database.
pub async fn setup_database_store() -> Result<DatabaseStore> {
    Ok(DatabaseStore::new(setup_test_db().await?))
}

/// Shorthand for a calendar date in tests.
///
/// # Panics
/// Panics on an impossible date.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// A regular member with a fixed phone number.
#[must_use]
pub fn sample_member(name: &str) -> Member {
    Member {
        id: crate::models::new_id(),
        name: name.to_string(),
        role: MemberRole::Member,
        phone_number: "010-0000-0000".to_string(),
    }
}

/// A small club roster with a record of every kind, fixed ids.
#[must_use]
pub fn sample_roster() -> RosterData {
    let member = |id: &str, name: &str, role| Member {
        id: id.to_string(),
        name: name.to_string(),
        role,
        phone_number: format!("010-{id}{id}{id}{id}-5678"),
    };

    RosterData {
        members: vec![
            member("1", "Kim", MemberRole::Chair),
            member("2", "Lee", MemberRole::Secretary),
            member("3", "Park", MemberRole::Member),
            member("4", "Choi", MemberRole::Member),
        ],
        notices: vec![
            Notice {
                id: "1".to_string(),
                title: "March round".to_string(),
                body: "This month's round is at OO CC. Please come along!".to_string(),
                date: date(2024, 3, 1),
                important: true,
            },
            Notice {
                id: "2".to_string(),
                title: "Annual dues".to_string(),
                body: "Please pay the 2024 dues before the deadline.".to_string(),
                date: date(2024, 2, 15),
                important: false,
            },
        ],
        finances: vec![
            FinancialRecord {
                id: "1".to_string(),
                date: date(2024, 3, 1),
                description: "March dues".to_string(),
                amount: 400_000,
                kind: EntryKind::Income,
            },
            FinancialRecord {
                id: "2".to_string(),
                date: date(2024, 3, 2),
                description: "Halfway-house snacks".to_string(),
                amount: 150_000,
                kind: EntryKind::Expense,
            },
        ],
        meetings: vec![Meeting {
            id: "m1".to_string(),
            date: date(2024, 3, 15),
            location: "Happy Golf CC".to_string(),
            attendance: BTreeMap::from([
                ("1".to_string(), AttendanceStatus::Attending),
                ("2".to_string(), AttendanceStatus::Attending),
                ("3".to_string(), AttendanceStatus::Pending),
                ("4".to_string(), AttendanceStatus::Absent),
            ]),
        }],
    }
}

/// Key-value backend that counts reads, for asserting a store was never consulted.
#[derive(Debug, Default)]
pub struct CountingStore {
    inner: MemoryStore,
    reads: AtomicUsize,
}

impl CountingStore {
    /// Wraps an existing memory store.
    #[must_use]
    pub fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            reads: AtomicUsize::new(0),
        }
    }

    /// Number of `get` calls so far.
    #[must_use]
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// The wrapped store.
    #[must_use]
    pub const fn inner(&self) -> &MemoryStore {
        &self.inner
    }
}

impl KeyValueStore for CountingStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.inner.set(key, value).await
    }
}
