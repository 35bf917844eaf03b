use tokio::sync::OnceCell;
use tracing::instrument;

use crate::error::{Error, Result};
use crate::transport::Transport;

const CONSENSUS_IO_PUBKEY_PATH: &str = "/reg/consensus-io-exch-pubkey";

/// Fetches and caches the chain's 32-byte X25519 I/O-exchange public key.
///
/// Write-once, read-many: the first caller to observe an empty cache
/// issues the request, and every concurrent caller before it completes
/// awaits that same in-flight request rather than issuing their own
/// (`tokio::sync::OnceCell` gives us this single-flight behavior for
/// free).
#[derive(Debug, Default)]
pub struct ConsensusIoPubKeyCache {
    cell: OnceCell<[u8; 32]>,
}

impl ConsensusIoPubKeyCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached pubkey, or fetch, validate, cache, and return it.
    #[instrument(skip(self, transport), err)]
    pub async fn get(&self, transport: &dyn Transport) -> Result<[u8; 32]> {
        self.cell
            .get_or_try_init(|| async { fetch(transport).await })
            .await
            .copied()
    }
}

async fn fetch(transport: &dyn Transport) -> Result<[u8; 32]> {
    let body = transport.get(CONSENSUS_IO_PUBKEY_PATH).await?;

    let encoded = body
        .get("result")
        .and_then(|r| r.get("ioExchPubkey"))
        .and_then(|v| v.as_str())
        .ok_or_else(|| {
            Error::SchemaError("missing result.ioExchPubkey in consensus-io-exch-pubkey response".into())
        })?;

    let decoded = base64::Engine::decode(&base64::engine::general_purpose::STANDARD, encoded)?;
    if decoded.len() != 32 {
        return Err(Error::InvalidLength {
            what: "ioExchPubkey",
            expected: 32,
            got: decoded.len(),
        });
    }

    let mut pubkey = [0u8; 32];
    pubkey.copy_from_slice(&decoded);
    Ok(pubkey)
}
