//! State behind the dashboard screen: the fetched list, the add form, the
//! bulk-delete selection and one error slot.
use std::{fmt::Write as _, str::FromStr};

use rust_decimal::Decimal;
use tracing::warn;
use uuid::Uuid;

use super::{
    api::{ClientError, TransactionsApi},
    summary::Summary,
};
use crate::transactions::{
    repo_types::MAX_AMOUNT, CreateTransactionRequest, Transaction, TransactionKind,
};

pub const CURRENCY: &str = "₹";

pub const FETCH_FAILED: &str = "Failed to fetch transactions. Please try again later.";
pub const ADD_FAILED: &str = "Failed to add transaction. Please try again.";
pub const DELETE_FAILED: &str = "Failed to delete transaction. Please try again.";
pub const DELETE_MANY_FAILED: &str = "Failed to delete transactions. Please try again.";
pub const AMOUNT_NOT_POSITIVE: &str = "Amount must be a positive number.";
pub const NAME_REQUIRED: &str = "Transaction name is required.";
pub const AMOUNT_TOO_LARGE: &str = "Amount is too large.";
pub const NOTHING_SELECTED: &str = "No transactions selected.";
pub const TOTALS_OVERFLOWED: &str = "Totals are too large to show exactly.";

/// Pending add-transaction form fields. The amount is kept as typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionForm {
    pub name: String,
    pub amount: String,
    pub kind: TransactionKind,
}

impl Default for TransactionForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            amount: String::new(),
            kind: TransactionKind::Income,
        }
    }
}

impl TransactionForm {
    /// Local checks run before anything is sent.
    pub fn to_request(&self) -> Result<CreateTransactionRequest, ClientError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ClientError::Validation(NAME_REQUIRED.into()));
        }
        let amount = Decimal::from_str(self.amount.trim())
            .ok()
            .filter(|a| *a > Decimal::ZERO)
            .ok_or_else(|| ClientError::Validation(AMOUNT_NOT_POSITIVE.into()))?;
        if amount > MAX_AMOUNT {
            return Err(ClientError::Validation(AMOUNT_TOO_LARGE.into()));
        }
        Ok(CreateTransactionRequest {
            name: name.to_string(),
            amount,
            kind: self.kind,
        })
    }
}

pub struct Dashboard<A> {
    api: A,
    transactions: Vec<Transaction>,
    form: TransactionForm,
    selected: Vec<Uuid>,
    error: Option<String>,
    loading: bool,
}

impl<A: TransactionsApi> Dashboard<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            transactions: Vec::new(),
            form: TransactionForm::default(),
            selected: Vec::new(),
            error: None,
            loading: true,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn form(&self) -> &TransactionForm {
        &self.form
    }

    pub fn selected(&self) -> &[Uuid] {
        &self.selected
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn summary(&self) -> Summary {
        Summary::of(&self.transactions)
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.form.name = name.into();
    }

    pub fn set_amount(&mut self, amount: impl Into<String>) {
        self.form.amount = amount.into();
    }

    pub fn set_kind(&mut self, kind: TransactionKind) {
        self.form.kind = kind;
    }

    fn fail(&mut self, msg: &str, err: ClientError) -> ClientError {
        warn!(error = %err, "{msg}");
        self.error = Some(msg.to_string());
        err
    }

    pub async fn load(&mut self) -> Result<(), ClientError> {
        let res = self.api.fetch_transactions().await;
        self.loading = false;
        match res {
            Ok(list) => {
                self.transactions = list;
                Ok(())
            }
            Err(e) => Err(self.fail(FETCH_FAILED, e)),
        }
    }

    /// Submits the form. A bad amount or empty name is reported without
    /// calling the API.
    pub async fn add(&mut self) -> Result<&Transaction, ClientError> {
        let req = match self.form.to_request() {
            Ok(req) => req,
            Err(e) => {
                self.error = Some(e.to_string());
                return Err(e);
            }
        };

        match self.api.add_transaction(&req).await {
            Ok(tx) => {
                self.form.name.clear();
                self.form.amount.clear();
                self.error = None;
                self.transactions.push(tx);
                Ok(&self.transactions[self.transactions.len() - 1])
            }
            Err(e) => Err(self.fail(ADD_FAILED, e)),
        }
    }

    pub async fn delete(&mut self, id: Uuid) -> Result<(), ClientError> {
        match self.api.delete_transaction(id).await {
            Ok(()) => {
                self.transactions.retain(|t| t.id != id);
                self.selected.retain(|s| *s != id);
                Ok(())
            }
            Err(e) => Err(self.fail(DELETE_FAILED, e)),
        }
    }

    pub fn toggle_selected(&mut self, id: Uuid) {
        if let Some(pos) = self.selected.iter().position(|s| *s == id) {
            self.selected.remove(pos);
        } else {
            self.selected.push(id);
        }
    }

    /// Adds `id` to the selection; selecting twice keeps it selected.
    pub fn select(&mut self, id: Uuid) {
        if !self.selected.contains(&id) {
            self.selected.push(id);
        }
    }

    pub async fn delete_selected(&mut self) -> Result<(), ClientError> {
        if self.selected.is_empty() {
            self.error = Some(NOTHING_SELECTED.into());
            return Err(ClientError::Validation(NOTHING_SELECTED.into()));
        }

        match self.api.delete_transactions(&self.selected).await {
            Ok(()) => {
                let selected = std::mem::take(&mut self.selected);
                self.transactions.retain(|t| !selected.contains(&t.id));
                Ok(())
            }
            Err(e) => Err(self.fail(DELETE_MANY_FAILED, e)),
        }
    }

    /// Plain-text rendering of the whole screen.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let s = self.summary();

        let _ = writeln!(out, "Dashboard");
        if let Some(err) = &self.error {
            let _ = writeln!(out, "! {err}");
        }
        if s.overflowed {
            let _ = writeln!(out, "! {TOTALS_OVERFLOWED}");
        }
        let _ = writeln!(out, "Total Income:   {CURRENCY}{:.2}", s.income);
        let _ = writeln!(out, "Total Expenses: {CURRENCY}{:.2}", s.expense);
        let _ = writeln!(out, "Balance:        {CURRENCY}{:.2}", s.balance);
        let _ = writeln!(out);
        let _ = writeln!(out, "Transactions");

        if self.loading {
            let _ = writeln!(out, "Loading transactions...");
        } else if self.transactions.is_empty() {
            let _ = writeln!(out, "No transactions added yet.");
        } else {
            for t in &self.transactions {
                let mark = if self.selected.contains(&t.id) { "x" } else { " " };
                let sign = match t.kind {
                    TransactionKind::Income => '+',
                    TransactionKind::Expense => '-',
                };
                let _ = writeln!(
                    out,
                    "[{mark}] {:<24} {sign}{CURRENCY}{:.2}  {}",
                    t.name, t.amount, t.id
                );
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    };

    use async_trait::async_trait;
    use reqwest::StatusCode;
    use rust_decimal::dec;
    use time::OffsetDateTime;

    use super::*;

    /// Stands in for the server; counts every call it receives.
    #[derive(Default)]
    struct FakeApi {
        rows: Mutex<Vec<Transaction>>,
        calls: AtomicUsize,
        fail: bool,
    }

    impl FakeApi {
        fn with(rows: Vec<Transaction>) -> Self {
            Self {
                rows: Mutex::new(rows),
                ..Self::default()
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn check(&self) -> Result<(), ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ClientError::Status {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    msg: "Server Error".into(),
                });
            }
            Ok(())
        }
    }

    #[async_trait]
    impl TransactionsApi for FakeApi {
        async fn fetch_transactions(&self) -> Result<Vec<Transaction>, ClientError> {
            self.check()?;
            Ok(self.rows.lock().unwrap().clone())
        }

        async fn add_transaction(&self, req: &CreateTransactionRequest) -> Result<Transaction, ClientError> {
            self.check()?;
            let tx = Transaction {
                id: Uuid::new_v4(),
                user_id: Uuid::nil(),
                name: req.name.clone(),
                amount: req.amount,
                kind: req.kind,
                created_at: OffsetDateTime::now_utc(),
            };
            self.rows.lock().unwrap().push(tx.clone());
            Ok(tx)
        }

        async fn delete_transaction(&self, id: Uuid) -> Result<(), ClientError> {
            self.check()?;
            self.rows.lock().unwrap().retain(|t| t.id != id);
            Ok(())
        }

        async fn delete_transactions(&self, ids: &[Uuid]) -> Result<(), ClientError> {
            self.check()?;
            self.rows.lock().unwrap().retain(|t| !ids.contains(&t.id));
            Ok(())
        }
    }

    fn tx(name: &str, amount: Decimal, kind: TransactionKind) -> Transaction {
        Transaction {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            name: name.into(),
            amount,
            kind,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[tokio::test]
    async fn negative_amount_is_rejected_before_any_call() {
        let mut dash = Dashboard::new(FakeApi::default());
        dash.set_name("Refund");
        dash.set_amount("-5");

        let err = dash.add().await.unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
        assert_eq!(dash.error(), Some(AMOUNT_NOT_POSITIVE));
        assert_eq!(dash.api().calls(), 0);
        assert!(dash.transactions().is_empty());
    }

    #[tokio::test]
    async fn zero_garbage_and_blank_name_are_rejected_locally() {
        let mut dash = Dashboard::new(FakeApi::default());
        dash.set_name("Refund");
        for amount in ["0", "abc", ""] {
            dash.set_amount(amount);
            assert!(dash.add().await.is_err());
        }
        dash.set_name("  ");
        dash.set_amount("5");
        assert!(dash.add().await.is_err());
        assert_eq!(dash.error(), Some(NAME_REQUIRED));
        assert_eq!(dash.api().calls(), 0);
    }

    #[tokio::test]
    async fn amount_above_cap_is_rejected_locally() {
        let mut dash = Dashboard::new(FakeApi::default());
        dash.set_name("Big");
        dash.set_amount("50000000000000000000000000000");
        assert!(dash.add().await.is_err());
        assert_eq!(dash.error(), Some(AMOUNT_TOO_LARGE));
        assert_eq!(dash.api().calls(), 0);
    }

    #[tokio::test]
    async fn huge_stored_amounts_render_with_warning() {
        let huge = dec!(50000000000000000000000000000);
        let mut dash = Dashboard::new(FakeApi::with(vec![
            tx("Big", huge, TransactionKind::Income),
            tx("Big", huge, TransactionKind::Income),
        ]));
        dash.load().await.unwrap();
        let screen = dash.render();
        assert!(screen.contains(TOTALS_OVERFLOWED));
        assert_eq!(dash.transactions().len(), 2);
    }

    #[tokio::test]
    async fn selecting_twice_keeps_one_entry() {
        let a = tx("Lunch", dec!(12), TransactionKind::Expense);
        let mut dash = Dashboard::new(FakeApi::with(vec![a.clone()]));
        dash.load().await.unwrap();
        dash.select(a.id);
        dash.select(a.id);
        assert_eq!(dash.selected(), &[a.id]);

        dash.delete_selected().await.unwrap();
        assert!(dash.transactions().is_empty());
    }

    #[tokio::test]
    async fn add_appends_server_record_and_resets_form() {
        let mut dash = Dashboard::new(FakeApi::default());
        dash.load().await.unwrap();
        dash.set_name("Salary");
        dash.set_amount("5000");
        dash.set_kind(TransactionKind::Income);

        let added = dash.add().await.unwrap().clone();
        assert_eq!(added.amount, dec!(5000));
        assert_eq!(dash.transactions(), &[added]);
        assert_eq!(dash.form().name, "");
        assert_eq!(dash.form().amount, "");
        assert_eq!(dash.form().kind, TransactionKind::Income);
        assert_eq!(dash.error(), None);
        assert_eq!(dash.summary().income, dec!(5000));
    }

    #[tokio::test]
    async fn load_failure_sets_error_and_stops_loading() {
        let mut dash = Dashboard::new(FakeApi::failing());
        assert!(dash.is_loading());
        assert!(dash.load().await.is_err());
        assert!(!dash.is_loading());
        assert_eq!(dash.error(), Some(FETCH_FAILED));
    }

    #[tokio::test]
    async fn delete_removes_only_after_server_confirms() {
        let rent = tx("Rent", dec!(900), TransactionKind::Expense);
        let mut dash = Dashboard::new(FakeApi::with(vec![rent.clone()]));
        dash.load().await.unwrap();
        dash.delete(rent.id).await.unwrap();
        assert!(dash.transactions().is_empty());

        let mut failing = Dashboard::new(FakeApi::failing());
        failing.transactions.push(rent.clone());
        assert!(failing.delete(rent.id).await.is_err());
        assert_eq!(failing.transactions(), &[rent]);
        assert_eq!(failing.error(), Some(DELETE_FAILED));
    }

    #[tokio::test]
    async fn bulk_delete_uses_selection() {
        let a = tx("Lunch", dec!(12), TransactionKind::Expense);
        let b = tx("Bonus", dec!(250), TransactionKind::Income);
        let c = tx("Salary", dec!(5000), TransactionKind::Income);
        let mut dash = Dashboard::new(FakeApi::with(vec![a.clone(), b.clone(), c.clone()]));
        dash.load().await.unwrap();

        assert!(dash.delete_selected().await.is_err());
        assert_eq!(dash.error(), Some(NOTHING_SELECTED));
        assert_eq!(dash.api().calls(), 1);

        dash.toggle_selected(a.id);
        dash.toggle_selected(b.id);
        dash.toggle_selected(c.id);
        dash.toggle_selected(c.id);
        assert_eq!(dash.selected(), &[a.id, b.id]);

        dash.delete_selected().await.unwrap();
        assert_eq!(dash.transactions(), &[c]);
        assert!(dash.selected().is_empty());
    }

    #[tokio::test]
    async fn render_shows_totals_and_rows() {
        let salary = tx("Salary", dec!(5000), TransactionKind::Income);
        let rent = tx("Rent", dec!(900.5), TransactionKind::Expense);
        let mut dash = Dashboard::new(FakeApi::with(vec![salary.clone(), rent]));
        assert!(dash.render().contains("Loading transactions..."));

        dash.load().await.unwrap();
        dash.toggle_selected(salary.id);
        let screen = dash.render();
        assert!(screen.contains("Total Income:   ₹5000.00"));
        assert!(screen.contains("Total Expenses: ₹900.50"));
        assert!(screen.contains("Balance:        ₹4099.50"));
        assert!(screen.contains("[x] Salary"));
        assert!(screen.contains("+₹5000.00"));
        assert!(screen.contains("-₹900.50"));
    }

    #[tokio::test]
    async fn render_empty_list() {
        let mut dash = Dashboard::new(FakeApi::default());
        dash.load().await.unwrap();
        assert!(dash.render().contains("No transactions added yet."));
    }
}
