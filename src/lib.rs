//! Transparent, client-side encryption for a CosmWasm chain whose
//! contract I/O is end-to-end encrypted with a chain enclave: seal
//! outbound execute/instantiate/query payloads under a per-transaction
//! key derived from an X25519 ECDH exchange and HKDF-SHA256, and decrypt
//! whatever comes back — tx `data`, wasm-event log attributes,
//! smart-query results, and cipher fragments embedded in error strings.
//!
//! Signing-key management, amino sign-bytes construction, and mnemonic/HD
//! derivation are out of scope: callers inject a [`signer::Signer`] and
//! build `StdTx`/`StdSignDoc` themselves.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod code_hash;
pub mod config;
pub mod crypto;
pub mod decrypt;
pub mod encrypt;
pub mod error;
pub mod libs;
pub mod msg;
pub mod seed;
pub mod signer;
pub mod trace;
pub mod transport;
pub mod types;

pub use client::Client;
pub use error::{Error, Result};
pub use seed::{generate_seed, Seed, UserKeypair};

/// Safe default imports for common use of this crate.
pub mod prelude {
    pub use crate::client::Client;
    pub use crate::config::ConnectionConf;
    pub use crate::error::{Error, Result};
    pub use crate::msg::BroadcastMode;
    pub use crate::seed::{generate_seed, Seed, UserKeypair};
    pub use crate::transport::{ReqwestTransport, Transport};
}
