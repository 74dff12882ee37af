//! Database module: models and schema for persistent storage.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows and the joined quote view
//! - `schema.rs`: SQL DDL for initializing the database (SQLite-first)
//! - `sqlite.rs`: `QuoteStorage`, the get-or-create and lookup queries

pub mod models;
pub mod schema;
pub mod sqlite;

pub use models::{Author, Category, NewQuote, Quote, QuoteView};
pub use sqlite::QuoteStorage;
