//! # hbd Store
//! SQLite implementation of [`hbd_core::RecordStore`].

pub mod sqlite;

pub use sqlite::SqliteStore;
