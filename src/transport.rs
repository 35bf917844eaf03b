use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::instrument;

use crate::error::{Error, Result};
use crate::msg::BroadcastMode;
use crate::types::StdTx;

/// Outcome of broadcasting a signed transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostTxResponse {
    /// Hex transaction hash.
    pub txhash: String,
    /// Non-zero on execution failure.
    pub code: u32,
    /// Raw chain log, possibly containing an encrypted error fragment
    /// (see [`crate::decrypt::decrypt_raw_log_error`]).
    pub raw_log: String,
    /// Hex-encoded `data` field, present on success.
    #[serde(default)]
    pub data: Option<String>,
}

/// Thin JSON-over-HTTP shim to the chain's REST endpoints.
///
/// Not part of the hard encryption core, but the encryptor ([`crate::encrypt`])
/// and decryptor ([`crate::decrypt`]) consume it, and the core's caches
/// ([`crate::crypto::ConsensusIoPubKeyCache`], [`crate::code_hash::CodeHashCache`])
/// are generic over it so tests can substitute a mock.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue a GET request and parse the response body as JSON.
    async fn get(&self, path: &str) -> Result<Value>;

    /// Issue a POST request with a JSON body and parse the response as
    /// JSON.
    async fn post(&self, path: &str, body: &Value) -> Result<Value>;

    /// Sign-and-broadcast a transaction is out of scope here (the signer
    /// is injected at a higher layer); this only posts an already-signed
    /// `StdTx` to the broadcast endpoint.
    async fn post_tx(&self, tx: &StdTx, mode: BroadcastMode) -> Result<PostTxResponse>;
}

/// Production [`Transport`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: String,
}

impl ReqwestTransport {
    /// Build a transport rooted at `base_url` (e.g. `https://lcd.example.com`).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn into_json(response: reqwest::Response) -> Result<Value> {
        let status = response.status();
        let body: Value = response.json().await?;

        if status.is_success() {
            return Ok(body);
        }

        let message = body
            .get("error")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| body.to_string());

        Err(Error::ServerError {
            status: status.as_u16(),
            body: message,
        })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    #[instrument(skip(self), err)]
    async fn get(&self, path: &str) -> Result<Value> {
        let response = self.client.get(self.url(path)).send().await?;
        Self::into_json(response).await
    }

    #[instrument(skip(self, body), err)]
    async fn post(&self, path: &str, body: &Value) -> Result<Value> {
        let response = self.client.post(self.url(path)).json(body).send().await?;
        Self::into_json(response).await
    }

    #[instrument(skip(self, tx), err)]
    async fn post_tx(&self, tx: &StdTx, mode: BroadcastMode) -> Result<PostTxResponse> {
        let body = serde_json::json!({
            "tx": tx,
            "mode": mode,
        });
        let response = self.client.post(self.url("/txs")).json(&body).send().await?;
        let value = Self::into_json(response).await?;
        serde_json::from_value(value).map_err(Error::from)
    }
}
