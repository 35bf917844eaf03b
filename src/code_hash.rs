use std::collections::HashMap;

use tokio::sync::RwLock;
use tracing::instrument;

use crate::error::{Error, Result};
use crate::transport::Transport;

/// A lowercase, 64-character hex sha256 digest of a contract's uploaded
/// WASM bytecode.
pub type CodeHash = String;

fn is_hex64(s: &str) -> bool {
    s.len() == 64 && s.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Maps `codeId -> hash` and `contractAddr -> hash`. Insert-only: code
/// hashes are immutable on chain, so entries are never evicted or
/// invalidated.
///
/// The two namespaces are kept in separate maps so a numeric code id can
/// never collide with a contract address that happens to parse as the
/// same map key.
#[derive(Debug, Default)]
pub struct CodeHashCache {
    by_code_id: RwLock<HashMap<u64, CodeHash>>,
    by_contract: RwLock<HashMap<String, CodeHash>>,
}

impl CodeHashCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached hash for `code_id`, or fetch it from
    /// `/wasm/code/{id}/hash` and insert it.
    #[instrument(skip(self, transport), err)]
    pub async fn get_by_code_id(&self, transport: &dyn Transport, code_id: u64) -> Result<CodeHash> {
        if let Some(hash) = self.by_code_id.read().await.get(&code_id) {
            return Ok(hash.clone());
        }

        let hash = fetch_hash(transport, &format!("/wasm/code/{code_id}/hash")).await?;
        self.by_code_id.write().await.insert(code_id, hash.clone());
        Ok(hash)
    }

    /// Return the cached hash for `contract_addr`, or fetch it from
    /// `/wasm/contract/{addr}/code-hash` and insert it.
    #[instrument(skip(self, transport), err)]
    pub async fn get_by_contract(
        &self,
        transport: &dyn Transport,
        contract_addr: &str,
    ) -> Result<CodeHash> {
        if let Some(hash) = self.by_contract.read().await.get(contract_addr) {
            return Ok(hash.clone());
        }

        let hash = fetch_hash(
            transport,
            &format!("/wasm/contract/{contract_addr}/code-hash"),
        )
        .await
        .map_err(|err| match &err {
            Error::SchemaError(msg) if msg.starts_with("not found: contract") => {
                Error::ContractNotFound(contract_addr.to_string())
            }
            _ => err,
        })?;
        self.by_contract
            .write()
            .await
            .insert(contract_addr.to_string(), hash.clone());
        Ok(hash)
    }
}

async fn fetch_hash(transport: &dyn Transport, path: &str) -> Result<CodeHash> {
    let body = transport.get(path).await?;

    let result = body.get("result").ok_or_else(|| {
        Error::SchemaError(format!("missing `result` field in response from {path}"))
    })?;

    if result.is_null() {
        return Err(Error::ContractNotFound(path.to_string()));
    }

    let hash = result
        .as_str()
        .ok_or_else(|| Error::SchemaError(format!("`result` was not a string in response from {path}")))?
        .to_lowercase();

    if !is_hex64(&hash) {
        return Err(Error::SchemaError(format!(
            "code hash `{hash}` from {path} is not 64 lowercase hex characters"
        )));
    }

    Ok(hash)
}
