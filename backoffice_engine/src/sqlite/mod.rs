//! SQLite backend for the back-office engine.
mod sqlite_impl;

pub mod db;
pub use sqlite_impl::SqliteDatabase;
