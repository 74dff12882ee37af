use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::db::{NewQuote, QuoteView};
use crate::middleware::RequireAdminKey;
use crate::{QuoterError, router::QuoterState};

/// GET /api/quote -> one random quote as JSON.
pub async fn random_quote_json(
    State(state): State<QuoterState>,
) -> Result<Json<QuoteView>, QuoterError> {
    Ok(Json(state.service.random_quote().await?))
}

/// GET /api/quotes -> every stored quote.
pub async fn list_quotes(
    State(state): State<QuoterState>,
) -> Result<Json<Vec<QuoteView>>, QuoterError> {
    Ok(Json(state.service.list_quotes().await?))
}

/// POST /api/quotes -> 201 when created, 200 when it already existed.
pub async fn create_quote(
    _auth: RequireAdminKey,
    State(state): State<QuoterState>,
    Json(new): Json<NewQuote>,
) -> Result<(StatusCode, Json<QuoteView>), QuoterError> {
    let (view, created) = state.service.create_quote(new).await?;
    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(view)))
}

/// DELETE /api/authors/{id} -> removes the author and its quotes.
pub async fn delete_author(
    _auth: RequireAdminKey,
    State(state): State<QuoterState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, QuoterError> {
    state.service.delete_author(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/categories/{id} -> removes the category and its quotes.
pub async fn delete_category(
    _auth: RequireAdminKey,
    State(state): State<QuoterState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, QuoterError> {
    state.service.delete_category(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
