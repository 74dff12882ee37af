use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct Author {
    pub id: i64,
    pub name: String,
    pub birthdate: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct Quote {
    pub id: i64,
    pub quote: String,
    pub author_id: i64,
    pub category_id: i64,
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl fmt::Display for Quote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.quote)
    }
}

/// A quote joined with the author and category it references.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuoteView {
    pub quote: Quote,
    pub author: Author,
    pub category: Category,
}

/// Input for creating a quote by hand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewQuote {
    pub quote: String,
    pub author: String,
    #[serde(default)]
    pub birthdate: Option<NaiveDate>,
    pub category: String,
}

/// Flat row produced by the quote/author/category join.
#[derive(Debug, FromRow)]
pub(crate) struct QuoteRow {
    pub id: i64,
    pub quote: String,
    pub author_id: i64,
    pub author_name: String,
    pub author_birthdate: Option<NaiveDate>,
    pub category_id: i64,
    pub category_name: String,
}

impl From<QuoteRow> for QuoteView {
    fn from(r: QuoteRow) -> Self {
        Self {
            quote: Quote {
                id: r.id,
                quote: r.quote,
                author_id: r.author_id,
                category_id: r.category_id,
            },
            author: Author {
                id: r.author_id,
                name: r.author_name,
                birthdate: r.author_birthdate,
            },
            category: Category {
                id: r.category_id,
                name: r.category_name,
            },
        }
    }
}
