use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;
use uuid::Uuid;

use crate::auth::{
    dto::{AuthResponse, LoginRequest, RegisterRequest},
    AUTH_TOKEN_HEADER,
};
use crate::error::Message;
use crate::transactions::{CreateTransactionRequest, DeleteManyRequest, Transaction};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Rejected locally; nothing was sent.
    #[error("{0}")]
    Validation(String),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("server returned {status}: {msg}")]
    Status { status: StatusCode, msg: String },
}

/// The four transaction calls the dashboard makes.
#[async_trait]
pub trait TransactionsApi: Send + Sync {
    async fn fetch_transactions(&self) -> Result<Vec<Transaction>, ClientError>;
    async fn add_transaction(&self, req: &CreateTransactionRequest) -> Result<Transaction, ClientError>;
    async fn delete_transaction(&self, id: Uuid) -> Result<(), ClientError>;
    async fn delete_transactions(&self, ids: &[Uuid]) -> Result<(), ClientError>;
}

/// HTTP client for the fintrack API.
#[derive(Clone)]
pub struct HttpApi {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    fn authed(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => req.header(AUTH_TOKEN_HEADER, token),
            None => req,
        }
    }

    pub async fn register(&self, req: &RegisterRequest) -> Result<AuthResponse, ClientError> {
        let res = self.http.post(self.url("/auth/register")).json(req).send().await?;
        decode(res).await
    }

    pub async fn login(&self, req: &LoginRequest) -> Result<AuthResponse, ClientError> {
        let res = self.http.post(self.url("/auth/login")).json(req).send().await?;
        decode(res).await
    }
}

async fn decode<T: DeserializeOwned>(res: reqwest::Response) -> Result<T, ClientError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res.json::<T>().await?);
    }
    let text = res.text().await.unwrap_or_default();
    let msg = serde_json::from_str::<Message>(&text)
        .map(|m| m.msg)
        .unwrap_or(text);
    debug!(%status, %msg, "api call failed");
    Err(ClientError::Status { status, msg })
}

#[async_trait]
impl TransactionsApi for HttpApi {
    async fn fetch_transactions(&self) -> Result<Vec<Transaction>, ClientError> {
        let res = self.authed(self.http.get(self.url("/transactions"))).send().await?;
        decode(res).await
    }

    async fn add_transaction(&self, req: &CreateTransactionRequest) -> Result<Transaction, ClientError> {
        let res = self
            .authed(self.http.post(self.url("/transactions")))
            .json(req)
            .send()
            .await?;
        decode(res).await
    }

    async fn delete_transaction(&self, id: Uuid) -> Result<(), ClientError> {
        let res = self
            .authed(self.http.delete(self.url(&format!("/transactions/{id}"))))
            .send()
            .await?;
        decode::<Message>(res).await.map(|_| ())
    }

    async fn delete_transactions(&self, ids: &[Uuid]) -> Result<(), ClientError> {
        let body = DeleteManyRequest {
            transaction_ids: ids.iter().map(Uuid::to_string).collect(),
        };
        let res = self
            .authed(self.http.delete(self.url("/transactions/delete-multiple")))
            .json(&body)
            .send()
            .await?;
        decode::<Message>(res).await.map(|_| ())
    }
}
