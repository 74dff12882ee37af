//! SQL DDL for initializing the quote storage.
//! SQLite-first design; can be adapted for other RDBMS.

/// SQLite schema with:
/// - `authors.name` and `categories.name` UNIQUE, so get-or-create can rely on
///   `ON CONFLICT DO NOTHING`
/// - `authors.birthdate` nullable, stored as `YYYY-MM-DD` text
/// - `quotes` referencing both with `ON DELETE CASCADE`
/// - `UNIQUE(quote, author_id, category_id)` deduplicating identical quotes
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS authors (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    birthdate TEXT NULL
);

CREATE TABLE IF NOT EXISTS categories (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS quotes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    quote TEXT NOT NULL,
    author_id INTEGER NOT NULL REFERENCES authors(id) ON DELETE CASCADE,
    category_id INTEGER NOT NULL REFERENCES categories(id) ON DELETE CASCADE,
    UNIQUE (quote, author_id, category_id)
);

CREATE INDEX IF NOT EXISTS idx_quotes_author_id ON quotes(author_id);
CREATE INDEX IF NOT EXISTS idx_quotes_category_id ON quotes(category_id);
"#;
