//! Dashboard client for the fintrack API.
pub mod api;
pub mod dashboard;
pub mod summary;
pub mod token;

pub use api::{ClientError, HttpApi, TransactionsApi};
pub use dashboard::{Dashboard, TransactionForm};
pub use summary::Summary;
pub use token::TokenFile;
