//! Database entity models for visit-beacon.
//!
//! The only entity is [`kv_entry`], the table backing
//! [`SeaOrmStore`](crate::SeaOrmStore).

pub mod kv_entry;
