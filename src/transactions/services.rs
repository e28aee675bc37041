use rust_decimal::{Decimal, RoundingStrategy};
use tracing::{info, warn};
use uuid::Uuid;

use super::{
    dto::CreateTransactionRequest,
    repo::TransactionRepo,
    repo_types::{NewTransaction, Transaction, AMOUNT_DECIMALS, MAX_AMOUNT},
};
use crate::error::ApiError;

#[derive(Debug, thiserror::Error)]
pub enum TransactionError {
    #[error("{0}")]
    Invalid(String),

    #[error("Transaction not found")]
    NotFound,

    /// Delete-one on someone else's record.
    #[error("Not authorized")]
    NotOwner,

    /// Delete-many where at least one fetched record belongs to someone else.
    #[error("Not authorized to delete some transactions")]
    SomeNotOwned,

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl From<TransactionError> for ApiError {
    fn from(e: TransactionError) -> Self {
        let msg = e.to_string();
        match e {
            TransactionError::Invalid(_) => ApiError::Validation(msg),
            TransactionError::NotFound => ApiError::NotFound(msg),
            TransactionError::NotOwner | TransactionError::SomeNotOwned => {
                ApiError::Unauthorized(msg)
            }
            TransactionError::Store(inner) => ApiError::Server(inner),
        }
    }
}

pub fn validate(owner: Uuid, req: CreateTransactionRequest) -> Result<NewTransaction, TransactionError> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(TransactionError::Invalid("Name is required".into()));
    }
    let amount = req
        .amount
        .round_dp_with_strategy(AMOUNT_DECIMALS, RoundingStrategy::MidpointAwayFromZero);
    if amount <= Decimal::ZERO {
        return Err(TransactionError::Invalid(
            "Amount must be a positive number".into(),
        ));
    }
    if amount > MAX_AMOUNT {
        return Err(TransactionError::Invalid(format!(
            "Amount must not exceed {MAX_AMOUNT}"
        )));
    }
    Ok(NewTransaction {
        user_id: owner,
        name: name.to_string(),
        amount,
        kind: req.kind,
    })
}

pub async fn create(
    repo: &dyn TransactionRepo,
    owner: Uuid,
    req: CreateTransactionRequest,
) -> Result<Transaction, TransactionError> {
    let new = validate(owner, req)?;
    let stored = repo.insert(new).await?;
    info!(transaction_id = %stored.id, user_id = %owner, "transaction created");
    Ok(stored)
}

pub async fn list(repo: &dyn TransactionRepo, owner: Uuid) -> Result<Vec<Transaction>, TransactionError> {
    Ok(repo.list_by_user(owner).await?)
}

/// Deletes one record after checking it exists and belongs to `owner`.
///
/// An id that is not a UUID cannot name a record, so it is reported as not
/// found.
pub async fn delete_one(
    repo: &dyn TransactionRepo,
    owner: Uuid,
    id: &str,
) -> Result<(), TransactionError> {
    let id = Uuid::parse_str(id).map_err(|_| TransactionError::NotFound)?;
    let tx = repo.find_by_id(id).await?.ok_or(TransactionError::NotFound)?;

    if tx.user_id != owner {
        warn!(transaction_id = %id, user_id = %owner, "delete of foreign transaction refused");
        return Err(TransactionError::NotOwner);
    }

    repo.delete_by_id(id).await?;
    info!(transaction_id = %id, user_id = %owner, "transaction deleted");
    Ok(())
}

/// All-or-nothing bulk delete: if any existing record among `ids` belongs to
/// someone else nothing is removed. Ids that match no record are ignored.
pub async fn delete_many(
    repo: &dyn TransactionRepo,
    owner: Uuid,
    ids: &[String],
) -> Result<u64, TransactionError> {
    let ids: Vec<Uuid> = ids.iter().filter_map(|s| Uuid::parse_str(s).ok()).collect();
    if ids.is_empty() {
        return Ok(0);
    }

    let found = repo.find_by_ids(&ids).await?;
    let foreign = found.iter().filter(|t| t.user_id != owner).count();
    if foreign > 0 {
        warn!(user_id = %owner, foreign, "bulk delete touching foreign transactions refused");
        return Err(TransactionError::SomeNotOwned);
    }

    let removed = repo.delete_by_ids(&ids).await?;
    info!(user_id = %owner, requested = ids.len(), removed, "transactions deleted");
    Ok(removed)
}
