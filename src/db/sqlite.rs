use crate::db::models::{Author, Category, Quote, QuoteRow, QuoteView};
use crate::db::schema::SQLITE_INIT;
use crate::error::QuoterError;
use chrono::NaiveDate;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use tracing::debug;

pub type SqlitePool = Pool<Sqlite>;

const QUOTE_VIEW_SELECT: &str = r#"
    SELECT q.id, q.quote,
           a.id AS author_id, a.name AS author_name, a.birthdate AS author_birthdate,
           c.id AS category_id, c.name AS category_name
    FROM quotes q
    JOIN authors a ON a.id = q.author_id
    JOIN categories c ON c.id = q.category_id
"#;

#[derive(Clone)]
pub struct QuoteStorage {
    pool: SqlitePool,
}

impl QuoteStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open the database behind `database_url` and apply the schema.
    pub async fn connect(database_url: &str) -> Result<Self, QuoterError> {
        let connect_opts = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let mut pool_opts = SqlitePoolOptions::new();
        // every in-memory connection is a separate database
        if database_url.contains(":memory:") {
            pool_opts = pool_opts
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }
        let pool = pool_opts.connect_with(connect_opts).await?;

        let storage = Self::new(pool);
        storage.init_schema().await?;
        Ok(storage)
    }

    /// Initialize the schema by executing the bundled DDL.
    pub async fn init_schema(&self) -> Result<(), QuoterError> {
        // execute multiple statements safely (SQLite supports multi-commands but sqlx::query doesn't)
        for stmt in SQLITE_INIT.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            sqlx::query(s).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Returns the author with this name, creating it when missing.
    /// The flag is `true` when a row was inserted.
    pub async fn get_or_create_author(
        &self,
        name: &str,
        birthdate: Option<NaiveDate>,
    ) -> Result<(Author, bool), QuoterError> {
        let mut conn = self.pool.acquire().await?;
        author_get_or_create(&mut conn, name, birthdate).await
    }

    pub async fn get_or_create_category(&self, name: &str) -> Result<(Category, bool), QuoterError> {
        let mut conn = self.pool.acquire().await?;
        category_get_or_create(&mut conn, name).await
    }

    pub async fn get_or_create_quote(
        &self,
        text: &str,
        author_id: i64,
        category_id: i64,
    ) -> Result<(Quote, bool), QuoterError> {
        let mut conn = self.pool.acquire().await?;
        quote_get_or_create(&mut conn, text, author_id, category_id).await
    }

    /// Get-or-create author, category and quote in one transaction.
    /// The flag reports whether the quote row itself was inserted.
    pub async fn save_quote(
        &self,
        author: &str,
        birthdate: Option<NaiveDate>,
        category: &str,
        text: &str,
    ) -> Result<(QuoteView, bool), QuoterError> {
        let mut tx = self.pool.begin().await?;

        let (author, author_created) = author_get_or_create(&mut tx, author, birthdate).await?;
        let (category, category_created) = category_get_or_create(&mut tx, category).await?;
        let (quote, quote_created) =
            quote_get_or_create(&mut tx, text, author.id, category.id).await?;

        tx.commit().await?;

        debug!(
            quote_id = quote.id,
            author_created, category_created, quote_created, "quote saved"
        );
        Ok((
            QuoteView {
                quote,
                author,
                category,
            },
            quote_created,
        ))
    }

    /// Uniformly random stored quote, `None` when there are none.
    pub async fn random_quote(&self) -> Result<Option<QuoteView>, QuoterError> {
        let sql = format!("{QUOTE_VIEW_SELECT} ORDER BY RANDOM() LIMIT 1");
        let row: Option<QuoteRow> = sqlx::query_as(&sql).fetch_optional(&self.pool).await?;
        Ok(row.map(Into::into))
    }

    pub async fn get_quote(&self, id: i64) -> Result<Option<QuoteView>, QuoterError> {
        let sql = format!("{QUOTE_VIEW_SELECT} WHERE q.id = ?");
        let row: Option<QuoteRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    pub async fn list_quotes(&self) -> Result<Vec<QuoteView>, QuoterError> {
        let sql = format!("{QUOTE_VIEW_SELECT} ORDER BY q.id");
        let rows: Vec<QuoteRow> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn count_quotes(&self) -> Result<i64, QuoterError> {
        let rec: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM quotes")
            .fetch_one(&self.pool)
            .await?;
        Ok(rec.0)
    }

    /// Deletes the author and, through the foreign key, all of its quotes.
    pub async fn delete_author(&self, id: i64) -> Result<bool, QuoterError> {
        let res = sqlx::query("DELETE FROM authors WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    /// Deletes the category and, through the foreign key, all of its quotes.
    pub async fn delete_category(&self, id: i64) -> Result<bool, QuoterError> {
        let res = sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}

async fn author_get_or_create(
    conn: &mut SqliteConnection,
    name: &str,
    birthdate: Option<NaiveDate>,
) -> Result<(Author, bool), QuoterError> {
    let created = sqlx::query(
        "INSERT INTO authors (name, birthdate) VALUES (?, ?) ON CONFLICT(name) DO NOTHING",
    )
    .bind(name)
    .bind(birthdate)
    .execute(&mut *conn)
    .await?
    .rows_affected()
        == 1;

    if !created && birthdate.is_some() {
        sqlx::query("UPDATE authors SET birthdate = ? WHERE name = ? AND birthdate IS NULL")
            .bind(birthdate)
            .bind(name)
            .execute(&mut *conn)
            .await?;
    }

    let author: Author = sqlx::query_as("SELECT id, name, birthdate FROM authors WHERE name = ?")
        .bind(name)
        .fetch_one(&mut *conn)
        .await?;
    Ok((author, created))
}

async fn category_get_or_create(
    conn: &mut SqliteConnection,
    name: &str,
) -> Result<(Category, bool), QuoterError> {
    let created = sqlx::query("INSERT INTO categories (name) VALUES (?) ON CONFLICT(name) DO NOTHING")
        .bind(name)
        .execute(&mut *conn)
        .await?
        .rows_affected()
        == 1;

    let category: Category = sqlx::query_as("SELECT id, name FROM categories WHERE name = ?")
        .bind(name)
        .fetch_one(&mut *conn)
        .await?;
    Ok((category, created))
}

async fn quote_get_or_create(
    conn: &mut SqliteConnection,
    text: &str,
    author_id: i64,
    category_id: i64,
) -> Result<(Quote, bool), QuoterError> {
    let created = sqlx::query(
        r#"INSERT INTO quotes (quote, author_id, category_id) VALUES (?, ?, ?)
           ON CONFLICT(quote, author_id, category_id) DO NOTHING"#,
    )
    .bind(text)
    .bind(author_id)
    .bind(category_id)
    .execute(&mut *conn)
    .await?
    .rows_affected()
        == 1;

    let quote: Quote = sqlx::query_as(
        r#"SELECT id, quote, author_id, category_id FROM quotes
           WHERE quote = ? AND author_id = ? AND category_id = ?"#,
    )
    .bind(text)
    .bind(author_id)
    .bind(category_id)
    .fetch_one(&mut *conn)
    .await?;
    Ok((quote, created))
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory_storage() -> QuoteStorage {
        QuoteStorage::connect("sqlite::memory:").await.unwrap()
    }

    #[tokio::test]
    async fn empty_storage_has_no_random_quote() {
        let storage = memory_storage().await;
        assert_eq!(storage.random_quote().await.unwrap(), None);
        assert_eq!(storage.count_quotes().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn save_quote_is_idempotent() {
        let storage = memory_storage().await;

        let (first, created) = storage
            .save_quote("Dieter Rams", None, "Design", "Less, but better.")
            .await
            .unwrap();
        assert!(created);

        let (second, created) = storage
            .save_quote("Dieter Rams", None, "Design", "Less, but better.")
            .await
            .unwrap();
        assert!(!created);
        assert_eq!(first, second);
        assert_eq!(storage.count_quotes().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn same_text_under_another_author_is_a_new_quote() {
        let storage = memory_storage().await;
        storage
            .save_quote("A", None, "Design", "Same words.")
            .await
            .unwrap();
        let (view, created) = storage
            .save_quote("B", None, "Design", "Same words.")
            .await
            .unwrap();
        assert!(created);
        assert_eq!(view.author.name, "B");
        assert_eq!(storage.count_quotes().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn get_or_create_author_fills_missing_birthdate() {
        let storage = memory_storage().await;
        let (author, created) = storage.get_or_create_author("Ada", None).await.unwrap();
        assert!(created);
        assert_eq!(author.birthdate, None);

        let born = NaiveDate::from_ymd_opt(1815, 12, 10).unwrap();
        let (again, created) = storage
            .get_or_create_author("Ada", Some(born))
            .await
            .unwrap();
        assert!(!created);
        assert_eq!(again.id, author.id);
        assert_eq!(again.birthdate, Some(born));

        let other = NaiveDate::from_ymd_opt(1900, 1, 1).unwrap();
        let (kept, _) = storage
            .get_or_create_author("Ada", Some(other))
            .await
            .unwrap();
        assert_eq!(kept.birthdate, Some(born));
    }

    #[tokio::test]
    async fn random_quote_returns_the_joined_row() {
        let storage = memory_storage().await;
        let (saved, _) = storage
            .save_quote("Ada", None, "Computing", "The engine weaves algebra.")
            .await
            .unwrap();

        let picked = storage.random_quote().await.unwrap().unwrap();
        assert_eq!(picked, saved);
        assert_eq!(picked.author.to_string(), "Ada");
        assert_eq!(picked.category.to_string(), "Computing");
        assert_eq!(picked.quote.to_string(), "The engine weaves algebra.");

        let by_id = storage.get_quote(saved.quote.id).await.unwrap();
        assert_eq!(by_id, Some(saved));
        assert_eq!(storage.get_quote(9999).await.unwrap(), None);
    }

    #[tokio::test]
    async fn deleting_author_cascades_to_quotes() {
        let storage = memory_storage().await;
        let (kept, _) = storage.save_quote("A", None, "X", "one").await.unwrap();
        let (gone, _) = storage.save_quote("B", None, "X", "two").await.unwrap();

        assert!(storage.delete_author(gone.author.id).await.unwrap());
        assert!(!storage.delete_author(gone.author.id).await.unwrap());

        let left = storage.list_quotes().await.unwrap();
        assert_eq!(left, vec![kept]);
    }

    #[tokio::test]
    async fn deleting_category_cascades_to_quotes() {
        let storage = memory_storage().await;
        let (view, _) = storage.save_quote("A", None, "X", "one").await.unwrap();
        storage.save_quote("A", None, "X", "two").await.unwrap();

        assert!(storage.delete_category(view.category.id).await.unwrap());
        assert_eq!(storage.count_quotes().await.unwrap(), 0);
    }
}
