//! Outbound contract-message encryption (component F): resolve a code
//! hash, seal the payload against the chain's I/O public key, and produce
//! the base64 envelope that goes into `init_msg`/`msg`.

use tracing::instrument;

use crate::code_hash::CodeHashCache;
use crate::crypto::envelope;
use crate::crypto::ConsensusIoPubKeyCache;
use crate::error::Result;
use crate::msg::OutboundContractMessage;
use crate::seed::UserKeypair;
use crate::transport::Transport;

/// Everything the caller needs to later decrypt the response to the
/// message this produced.
#[derive(Debug, Clone)]
pub struct EncryptedMessage {
    /// base64-encoded sealed envelope, ready to drop into `init_msg`/`msg`.
    pub encrypted: String,
    /// The nonce used to seal this envelope. Required to decrypt the
    /// corresponding response.
    pub nonce: [u8; 32],
}

/// Seal `payload` for instantiation/execution of the contract whose code
/// hash is resolved via `code_hash` (by contract address) or supplied
/// directly by the caller for store/instantiate flows where no contract
/// address exists yet.
#[instrument(skip(keypair, io_pubkey_cache, code_hash_cache, transport, message), err)]
pub async fn encrypt_for_contract(
    keypair: &UserKeypair,
    io_pubkey_cache: &ConsensusIoPubKeyCache,
    code_hash_cache: &CodeHashCache,
    transport: &dyn Transport,
    contract_addr: &str,
    message: serde_json::Value,
) -> Result<EncryptedMessage> {
    let code_hash = code_hash_cache.get_by_contract(transport, contract_addr).await?;
    encrypt_with_code_hash(keypair, io_pubkey_cache, transport, code_hash, message).await
}

/// Seal `message` for instantiation of a freshly uploaded code id, given
/// its already-known code hash (e.g. returned from a prior store-code
/// broadcast).
#[instrument(skip(keypair, io_pubkey_cache, transport, message), err)]
pub async fn encrypt_with_code_hash(
    keypair: &UserKeypair,
    io_pubkey_cache: &ConsensusIoPubKeyCache,
    transport: &dyn Transport,
    code_hash: impl Into<String>,
    message: serde_json::Value,
) -> Result<EncryptedMessage> {
    let io_pubkey = io_pubkey_cache.get(transport).await?;
    let plaintext = OutboundContractMessage::new(code_hash, message).plaintext_bytes();

    let (envelope, nonce) = envelope::seal(keypair, &io_pubkey, &plaintext)?;
    let encrypted = base64::Engine::encode(&base64::engine::general_purpose::STANDARD, envelope);

    Ok(EncryptedMessage { encrypted, nonce })
}
