//! Key-value entry entity - One row per persisted roster collection.
//!
//! The key is the collection's storage key (e.g. `"club_members"`) and the value is
//! the collection's JSON text, so each collection can be read or replaced without
//! touching the others.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Key-value entry database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "kv_entries")]
pub struct Model {
    /// Storage key
    #[sea_orm(primary_key, auto_increment = false)]
    pub key: String,
    /// Stored text
    #[sea_orm(column_type = "Text")]
    pub value: String,
    /// When this entry was last written
    pub updated_at: DateTime,
}

/// `KvEntry` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
