use axum::{
    extract::{Path, State},
    routing::{delete, get},
    Json, Router,
};
use tracing::instrument;

use super::{
    dto::{CreateTransactionRequest, DeleteManyRequest},
    repo_types::Transaction,
    services,
};
use crate::{
    auth::AuthUser,
    error::{ApiError, JsonBody, Message},
    state::AppState,
};

// `/delete-multiple` is a static segment, so the router prefers it over `/:id`.
pub fn transaction_routes() -> Router<AppState> {
    Router::new()
        .route("/transactions", get(list_transactions).post(add_transaction))
        .route("/transactions/delete-multiple", delete(delete_multiple_transactions))
        .route("/transactions/:id", delete(delete_transaction))
}

#[instrument(skip(state, body))]
pub async fn add_transaction(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    JsonBody(body): JsonBody<CreateTransactionRequest>,
) -> Result<Json<Transaction>, ApiError> {
    let tx = services::create(state.transactions.as_ref(), user_id, body).await?;
    Ok(Json(tx))
}

#[instrument(skip(state))]
pub async fn list_transactions(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<Transaction>>, ApiError> {
    let items = services::list(state.transactions.as_ref(), user_id).await?;
    Ok(Json(items))
}

#[instrument(skip(state))]
pub async fn delete_transaction(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Message>, ApiError> {
    services::delete_one(state.transactions.as_ref(), user_id, &id).await?;
    Ok(Json(Message::new("Transaction removed")))
}

#[instrument(skip(state, body))]
pub async fn delete_multiple_transactions(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    JsonBody(body): JsonBody<DeleteManyRequest>,
) -> Result<Json<Message>, ApiError> {
    services::delete_many(state.transactions.as_ref(), user_id, &body.transaction_ids).await?;
    Ok(Json(Message::new("Transactions removed")))
}
