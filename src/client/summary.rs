use rust_decimal::Decimal;

use crate::transactions::{Transaction, TransactionKind};

/// Totals shown on the dashboard cards. Always recomputed from the current
/// list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Summary {
    pub income: Decimal,
    pub expense: Decimal,
    pub balance: Decimal,
    /// Some total left the `Decimal` range and was clamped to it.
    pub overflowed: bool,
}

/// Sums `amounts`, clamping at the `Decimal` bounds. The flag is set when
/// clamping happened.
fn saturating_total(amounts: impl Iterator<Item = Decimal>) -> (Decimal, bool) {
    amounts.fold((Decimal::ZERO, false), |(acc, overflowed), amount| {
        match acc.checked_add(amount) {
            Some(sum) => (sum, overflowed),
            None => (acc.saturating_add(amount), true),
        }
    })
}

impl Summary {
    pub fn of(transactions: &[Transaction]) -> Self {
        let total = |kind: TransactionKind| {
            saturating_total(
                transactions
                    .iter()
                    .filter(|t| t.kind == kind)
                    .map(|t| t.amount),
            )
        };
        let (income, income_overflowed) = total(TransactionKind::Income);
        let (expense, expense_overflowed) = total(TransactionKind::Expense);
        let (balance, balance_overflowed) = match income.checked_sub(expense) {
            Some(b) => (b, false),
            None => (income.saturating_sub(expense), true),
        };
        Self {
            income,
            expense,
            balance,
            overflowed: income_overflowed || expense_overflowed || balance_overflowed,
        }
    }
}
