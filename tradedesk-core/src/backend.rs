//! Authenticated asset and transaction queries
//!
//! An HTTP 401 means the bearer token is no longer accepted; it surfaces as
//! [`TerminalError::SessionExpired`] so the caller can redirect to the login path.

use crate::{config::TerminalConfig, error::TerminalError};
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Balance of one currency on the account
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AssetBalance {
    pub currency: String,
    pub available: Decimal,
    pub frozen: Decimal,
}

impl AssetBalance {
    pub fn total(&self) -> Decimal {
        self.available + self.frozen
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
    Trade,
    Fee,
    Settlement,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Transaction {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub currency: String,
    pub amount: Decimal,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct BackendClient {
    client: reqwest::Client,
    base_url: Url,
    token: Option<String>,
    login_path: String,
    timeout: Duration,
}

impl BackendClient {
    pub fn new(config: &TerminalConfig) -> Result<Self, TerminalError> {
        Ok(Self {
            client: reqwest::Client::new(),
            base_url: Url::parse(&config.backend_base_url)?,
            token: config.api_token.clone(),
            login_path: config.login_path.clone(),
            timeout: config.request_timeout,
        })
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    pub async fn assets(&self) -> Result<Vec<AssetBalance>, TerminalError> {
        self.get_json("/api/assets").await
    }

    pub async fn transactions(&self) -> Result<Vec<Transaction>, TerminalError> {
        self.get_json("/api/transactions").await
    }

    /// Available balance of `currency`, zero when the account holds none
    pub async fn available(&self, currency: &str) -> Result<Decimal, TerminalError> {
        Ok(self
            .assets()
            .await?
            .into_iter()
            .find(|asset| asset.currency.eq_ignore_ascii_case(currency))
            .map(|asset| asset.available)
            .unwrap_or_default())
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, TerminalError> {
        // Without a token every request would be a 401
        let Some(token) = self.token.as_deref() else {
            return Err(self.session_expired());
        };

        let url = self.base_url.join(path)?;
        debug!(%url, "backend request");

        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .timeout(self.timeout)
            .send()
            .await?;

        self.check_status(path, response.status())?;
        Ok(response.json().await?)
    }

    fn check_status(&self, path: &str, status: StatusCode) -> Result<(), TerminalError> {
        if status == StatusCode::UNAUTHORIZED {
            warn!(path, "backend session expired");
            return Err(self.session_expired());
        }
        if !status.is_success() {
            return Err(TerminalError::UpstreamUnavailable(format!(
                "backend {path} returned HTTP {status}"
            )));
        }
        Ok(())
    }

    fn session_expired(&self) -> TerminalError {
        TerminalError::SessionExpired {
            login_path: self.login_path.clone(),
        }
    }
}
