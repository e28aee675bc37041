pub mod dto;
pub mod handlers;
pub mod repo;
pub mod repo_types;
pub mod services;

use crate::state::AppState;
use axum::Router;

pub use dto::{CreateTransactionRequest, DeleteManyRequest};
pub use repo_types::{Transaction, TransactionKind};

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::transaction_routes())
}
