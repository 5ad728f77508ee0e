use async_trait::async_trait;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, IntoActiveModel, Set, TransactionTrait,
};
use time::OffsetDateTime;

use crate::entity::kv_entry::{ActiveModel as KvActiveModel, Entity as KvEntity};
use crate::store::{self, KeyValueStore};

/// A durable [`KeyValueStore`] backed by a Sea-ORM database connection.
///
/// `SeaOrmStore` keeps each beacon key as one row of the `beacon_kv` table. SQLite is the
/// default backend (a local file plays the role of browser local storage); PostgreSQL is
/// available behind the `postgres` feature.
///
/// # Usage
///
/// ```no_run
/// use sea_orm::Database;
/// use visit_beacon::{KeyValueStore, SeaOrmStore};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let conn = Database::connect("sqlite://beacon.db?mode=rwc").await?;
/// let store = SeaOrmStore::new(conn);
///
/// store.set("my_site_user_id", "user-1700000000000-3f2a").await?;
/// # Ok(())
/// # }
/// ```
///
/// The table must exist before use. With the `migration` feature enabled, run
/// [`Migrator`](crate::migration::Migrator) once at startup.
///
/// # Error Handling
///
/// Every Sea-ORM error is mapped to [`store::Error::Backend`] carrying the database message.
#[derive(Debug, Clone)]
pub struct SeaOrmStore {
    conn: DatabaseConnection,
}

impl SeaOrmStore {
    /// Creates a store over an existing connection.
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Returns the underlying connection, for running migrations or housekeeping.
    pub fn connection(&self) -> &DatabaseConnection {
        &self.conn
    }
}

#[async_trait]
impl KeyValueStore for SeaOrmStore {
    async fn get(&self, key: &str) -> store::Result<Option<String>> {
        let entry = KvEntity::find_by_id(key.to_string())
            .one(&self.conn)
            .await
            .map_err(|e| store::Error::Backend(e.to_string()))?;

        Ok(entry.map(|model| model.value))
    }

    /// Writes `value` under `key`, updating the row when it exists and inserting it otherwise.
    async fn set(&self, key: &str, value: &str) -> store::Result<()> {
        let txn = self
            .conn
            .begin()
            .await
            .map_err(|e| store::Error::Backend(e.to_string()))?;

        let updated_at = convert_time_to_datetime(OffsetDateTime::now_utc());

        match KvEntity::find_by_id(key.to_string())
            .one(&txn)
            .await
            .map_err(|e| store::Error::Backend(e.to_string()))?
        {
            Some(existing) => {
                let mut active_model = existing.into_active_model();
                active_model.value = Set(value.to_string());
                active_model.updated_at = Set(updated_at);
                active_model
                    .update(&txn)
                    .await
                    .map_err(|e| store::Error::Backend(e.to_string()))?;
            }
            None => {
                let entry = KvActiveModel {
                    key: Set(key.to_string()),
                    value: Set(value.to_string()),
                    updated_at: Set(updated_at),
                };

                entry
                    .insert(&txn)
                    .await
                    .map_err(|e| store::Error::Backend(e.to_string()))?;
            }
        }

        txn.commit()
            .await
            .map_err(|e| store::Error::Backend(e.to_string()))?;

        Ok(())
    }
}

// time::OffsetDateTime -> sea_orm::prelude::DateTimeWithTimeZone (chrono)
fn convert_time_to_datetime(time: OffsetDateTime) -> DateTimeWithTimeZone {
    use chrono::{DateTime, Utc};

    match DateTime::from_timestamp(time.unix_timestamp(), time.nanosecond()) {
        Some(datetime) => datetime.into(),
        None => Utc::now().into(),
    }
}
