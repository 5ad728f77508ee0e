//! Schema migrations for [`SeaOrmStore`](crate::SeaOrmStore).
//!
//! ```no_run
//! use sea_orm::Database;
//! use visit_beacon::migration::{Migrator, MigratorTrait};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let conn = Database::connect("sqlite://beacon.db?mode=rwc").await?;
//! Migrator::up(&conn, None).await?;
//! # Ok(())
//! # }
//! ```

pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_kv_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    // Own migration table so a host database with its own migrations is left alone
    fn migration_table_name() -> sea_orm::DynIden {
        Alias::new("visit_beacon_migrations").into_iden()
    }

    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20240101_000001_create_kv_table::Migration)]
    }
}
