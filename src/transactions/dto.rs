use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::repo_types::TransactionKind;

/// Body of `POST /api/transactions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTransactionRequest {
    pub name: String,
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
}

/// Body of `DELETE /api/transactions/delete-multiple`.
///
/// Ids are kept as strings so a malformed one is treated like an unknown one
/// instead of failing the whole request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteManyRequest {
    #[serde(rename = "transactionIds")]
    pub transaction_ids: Vec<String>,
}
