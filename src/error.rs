use thiserror::Error;

/// Errors surfaced by this crate.
///
/// Crypto and schema errors are fatal to the operation they occur in and
/// surface to the caller unmodified. Per-attribute log-decryption failures
/// are handled by the caller (the attribute is passed through unchanged,
/// see [`crate::decrypt`]) and never reach this enum.
#[derive(Debug, Error)]
pub enum Error {
    /// Network unreachable, or a non-2xx response with a body we couldn't
    /// make sense of.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A non-2xx response with a parseable `{error: string}` body.
    #[error("server error ({status}): {body}")]
    ServerError {
        /// HTTP status code returned by the chain REST endpoint.
        status: u16,
        /// Raw server message. May itself be an encrypted error that a
        /// caller-level wrapper subsequently decrypts.
        body: String,
    },

    /// Response JSON failed an expected structural check (missing
    /// `result`, wrong `type`, etc).
    #[error("schema error: {0}")]
    SchemaError(String),

    /// AES-SIV authentication failed, HKDF produced the wrong length
    /// output, or an envelope was shorter than 64 bytes.
    #[error("crypto error: {0}")]
    CryptoError(String),

    /// A `/wasm/contract/{addr}` (or code-id) lookup returned null, or an
    /// error prefixed `not found: contract`.
    #[error("contract not found: {0}")]
    ContractNotFound(String),

    /// Attempted to decrypt an embedded cipher inside an error string and
    /// failed. The original error is preserved alongside the decrypt
    /// failure.
    #[error("failed to decrypt embedded error ({decrypt_error}); original error: {original}")]
    DecryptErrorWrappedError {
        /// The error produced while attempting to decrypt the embedded
        /// ciphertext.
        decrypt_error: String,
        /// The original, still-encrypted error string.
        original: String,
    },

    /// JSON (de)serialization failure outside of the schema checks above.
    #[error("{0}")]
    Json(#[from] serde_json::Error),

    /// base64 decode failure.
    #[error("{0}")]
    Base64(#[from] base64::DecodeError),

    /// hex decode failure.
    #[error("{0}")]
    Hex(#[from] hex::FromHexError),

    /// bech32 encode/decode failure.
    #[error("{0}")]
    Bech32(#[from] bech32::Error),

    /// A seed, key, or envelope had the wrong length for its role.
    #[error("invalid length for {what}: expected {expected}, got {got}")]
    InvalidLength {
        /// What was being validated (e.g. "seed", "envelope").
        what: &'static str,
        /// Expected length in bytes.
        expected: usize,
        /// Actual length in bytes.
        got: usize,
    },
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;
