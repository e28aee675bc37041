use std::{fmt, str::FromStr};

use rust_decimal::{dec, Decimal};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Largest amount a single transaction may carry.
///
/// Together with [`AMOUNT_DECIMALS`] this keeps every amount within 14
/// significant digits, so it survives the JSON number round trip unchanged
/// and the dashboard totals stay far from `Decimal` overflow.
pub const MAX_AMOUNT: Decimal = dec!(1000000000000);

/// Amounts are stored in cents.
pub const AMOUNT_DECIMALS: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(format!("type must be income or expense, got {other:?}")),
        }
    }
}

/// A single income or expense entry, owned by exactly one user.
///
/// Field names on the wire follow the dashboard client: `_id`, `userId`,
/// `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Already validated fields for an insert. The owner comes from the caller's
/// token, never from the request body.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub user_id: Uuid,
    pub name: String,
    pub amount: Decimal,
    pub kind: TransactionKind,
}

#[derive(Debug, FromRow)]
pub struct TransactionRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub amount: Decimal,
    pub kind: String,
    pub created_at: OffsetDateTime,
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = anyhow::Error;

    fn try_from(r: TransactionRow) -> Result<Self, Self::Error> {
        let kind = r
            .kind
            .parse::<TransactionKind>()
            .map_err(|e| anyhow::anyhow!("transaction {}: {}", r.id, e))?;
        Ok(Self {
            id: r.id,
            user_id: r.user_id,
            name: r.name,
            amount: r.amount,
            kind,
            created_at: r.created_at,
        })
    }
}
