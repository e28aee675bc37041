use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::repo_types::{NewTransaction, Transaction, TransactionRow};

/// The transaction collection. Each call is atomic on its own; nothing spans
/// two calls.
#[async_trait]
pub trait TransactionRepo: Send + Sync {
    async fn insert(&self, tx: NewTransaction) -> anyhow::Result<Transaction>;
    /// All records owned by `user_id`, oldest first.
    async fn list_by_user(&self, user_id: Uuid) -> anyhow::Result<Vec<Transaction>>;
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Transaction>>;
    /// Records whose id is in `ids`. Unknown ids are skipped.
    async fn find_by_ids(&self, ids: &[Uuid]) -> anyhow::Result<Vec<Transaction>>;
    /// Returns how many records were removed.
    async fn delete_by_id(&self, id: Uuid) -> anyhow::Result<u64>;
    async fn delete_by_ids(&self, ids: &[Uuid]) -> anyhow::Result<u64>;
}

#[derive(Clone)]
pub struct PgTransactionRepo {
    db: PgPool,
}

impl PgTransactionRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn into_transactions(rows: Vec<TransactionRow>) -> anyhow::Result<Vec<Transaction>> {
    rows.into_iter().map(Transaction::try_from).collect()
}

#[async_trait]
impl TransactionRepo for PgTransactionRepo {
    async fn insert(&self, tx: NewTransaction) -> anyhow::Result<Transaction> {
        let row = sqlx::query_as::<_, TransactionRow>(
            r#"
            INSERT INTO transactions (user_id, name, amount, kind)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, name, amount, kind, created_at
            "#,
        )
        .bind(tx.user_id)
        .bind(&tx.name)
        .bind(tx.amount)
        .bind(tx.kind.as_str())
        .fetch_one(&self.db)
        .await
        .context("insert transaction")?;
        row.try_into()
    }

    async fn list_by_user(&self, user_id: Uuid) -> anyhow::Result<Vec<Transaction>> {
        let rows = sqlx::query_as::<_, TransactionRow>(
            r#"
            SELECT id, user_id, name, amount, kind, created_at
              FROM transactions
             WHERE user_id = $1
             ORDER BY created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await
        .context("list transactions by user")?;
        into_transactions(rows)
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Transaction>> {
        let row = sqlx::query_as::<_, TransactionRow>(
            r#"
            SELECT id, user_id, name, amount, kind, created_at
              FROM transactions
             WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("find transaction by id")?;
        row.map(Transaction::try_from).transpose()
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> anyhow::Result<Vec<Transaction>> {
        let rows = sqlx::query_as::<_, TransactionRow>(
            r#"
            SELECT id, user_id, name, amount, kind, created_at
              FROM transactions
             WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(&self.db)
        .await
        .context("find transactions by ids")?;
        into_transactions(rows)
    }

    async fn delete_by_id(&self, id: Uuid) -> anyhow::Result<u64> {
        let res = sqlx::query("DELETE FROM transactions WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .context("delete transaction")?;
        Ok(res.rows_affected())
    }

    async fn delete_by_ids(&self, ids: &[Uuid]) -> anyhow::Result<u64> {
        let res = sqlx::query("DELETE FROM transactions WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.db)
            .await
            .context("delete transactions")?;
        Ok(res.rows_affected())
    }
}

/// Transactions kept in process memory, in insertion order.
#[derive(Default)]
pub struct MemoryTransactionRepo {
    rows: RwLock<Vec<Transaction>>,
}

impl MemoryTransactionRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TransactionRepo for MemoryTransactionRepo {
    async fn insert(&self, tx: NewTransaction) -> anyhow::Result<Transaction> {
        let stored = Transaction {
            id: Uuid::new_v4(),
            user_id: tx.user_id,
            name: tx.name,
            amount: tx.amount,
            kind: tx.kind,
            created_at: OffsetDateTime::now_utc(),
        };
        self.rows.write().await.push(stored.clone());
        Ok(stored)
    }

    async fn list_by_user(&self, user_id: Uuid) -> anyhow::Result<Vec<Transaction>> {
        let rows = self.rows.read().await;
        Ok(rows.iter().filter(|t| t.user_id == user_id).cloned().collect())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Transaction>> {
        let rows = self.rows.read().await;
        Ok(rows.iter().find(|t| t.id == id).cloned())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> anyhow::Result<Vec<Transaction>> {
        let rows = self.rows.read().await;
        Ok(rows.iter().filter(|t| ids.contains(&t.id)).cloned().collect())
    }

    async fn delete_by_id(&self, id: Uuid) -> anyhow::Result<u64> {
        self.delete_by_ids(&[id]).await
    }

    async fn delete_by_ids(&self, ids: &[Uuid]) -> anyhow::Result<u64> {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|t| !ids.contains(&t.id));
        Ok((before - rows.len()) as u64)
    }
}
