use axum::{
    Router,
    routing::{delete, get},
};
use std::sync::Arc;

use crate::handlers::{page, quote};
use crate::service::QuoteService;

#[derive(Clone)]
pub struct QuoterState {
    pub service: Arc<QuoteService>,
    pub admin_key: Arc<str>,
}

impl QuoterState {
    pub fn new(service: QuoteService, admin_key: impl Into<Arc<str>>) -> Self {
        Self {
            service: Arc::new(service),
            admin_key: admin_key.into(),
        }
    }
}

pub fn quoter_router(state: QuoterState) -> Router {
    Router::new()
        .route("/", get(page::random_quote_page))
        .route("/api/quote", get(quote::random_quote_json))
        .route(
            "/api/quotes",
            get(quote::list_quotes).post(quote::create_quote),
        )
        .route("/api/authors/{id}", delete(quote::delete_author))
        .route("/api/categories/{id}", delete(quote::delete_category))
        .with_state(state)
}
