//! X25519 + HKDF-SHA256 + AES-SIV transaction encryption pipeline.

pub mod consensus_io;
pub mod envelope;
pub mod kdf;

pub use consensus_io::ConsensusIoPubKeyCache;
pub use kdf::{tx_key, HKDF_SALT};
