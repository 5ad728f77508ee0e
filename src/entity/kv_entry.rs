//! Key-value entry model for Sea-ORM database interaction.
//!
//! Each row holds one storage key of the beacon, such as the visitor identity
//! or the last-activity stamp.

use sea_orm::entity::prelude::*;

/// Sea-ORM entity model representing one stored key.
///
/// # Database Schema
///
/// | Column     | Type               | Description                         |
/// |------------|--------------------|-------------------------------------|
/// | key        | TEXT (Primary Key) | Storage key                         |
/// | value      | TEXT               | Stored value                        |
/// | updated_at | TIMESTAMPTZ        | When the value was last written     |
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "beacon_kv")]
pub struct Model {
    /// The storage key, for example `my_site_user_id`.
    #[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
    pub key: String,

    /// The stored value. Timestamps are kept as decimal epoch milliseconds.
    #[sea_orm(column_type = "Text")]
    pub value: String,

    /// Last write time, kept for housekeeping queries outside this crate.
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
