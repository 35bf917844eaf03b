use rand::rngs::OsRng;
use rand::RngCore;
use x25519_dalek::{PublicKey, StaticSecret};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{Error, Result};

/// An opaque 32-byte seed. Constructed once per client, either from caller
/// input or from the OS CSPRNG, and never mutated afterwards.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Seed([u8; 32]);

impl Seed {
    /// Build a seed from exactly 32 bytes.
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Build a seed from a byte slice, rejecting anything other than 32
    /// bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != 32 {
            return Err(Error::InvalidLength {
                what: "seed",
                expected: 32,
                got: bytes.len(),
            });
        }
        let mut buf = [0u8; 32];
        buf.copy_from_slice(bytes);
        Ok(Self(buf))
    }

    pub(crate) fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

/// 32 bytes from a cryptographically secure random source.
pub fn generate_seed() -> Seed {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    Seed(bytes)
}

/// The user's long-term X25519 keypair, derived deterministically from a
/// [`Seed`]. Immutable for the client's lifetime.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct UserKeypair {
    private: StaticSecretBytes,
    /// The 32-byte public key. Safe to share; appears verbatim in every
    /// outbound envelope (see [`crate::crypto::envelope`]).
    #[zeroize(skip)]
    pub public: [u8; 32],
}

// x25519_dalek::StaticSecret doesn't implement Zeroize directly in a way
// that derive(Zeroize) can see through, so we keep the raw bytes instead
// and reconstruct the StaticSecret on demand.
type StaticSecretBytes = [u8; 32];

impl UserKeypair {
    /// Compute the X25519 keypair for a seed: the private scalar is
    /// clamped per RFC 7748 by `StaticSecret::from`, and the public key is
    /// the base-point multiplication of that scalar.
    pub fn from_seed(seed: &Seed) -> Self {
        let secret = StaticSecret::from(*seed.as_bytes());
        let public = PublicKey::from(&secret);
        Self {
            private: secret.to_bytes(),
            public: public.to_bytes(),
        }
    }

    pub(crate) fn secret(&self) -> StaticSecret {
        StaticSecret::from(self.private)
    }

    /// Derive the per-transaction AES-SIV key this keypair would use to
    /// seal or open an envelope under `io_pubkey` and `nonce`.
    /// Exposed so callers and tests can reconstruct ciphertexts (e.g. a
    /// bare wasm-log attribute) without reaching into the private scalar
    /// directly.
    pub fn derive_tx_key(&self, io_pubkey: &[u8; 32], nonce: &[u8; 32]) -> Result<[u8; 32]> {
        crate::crypto::kdf::tx_key(&self.secret(), io_pubkey, nonce)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keypair_from_seed_is_deterministic() {
        let seed = Seed::new([7u8; 32]);
        let a = UserKeypair::from_seed(&seed);
        let b = UserKeypair::from_seed(&seed);
        assert_eq!(a.public, b.public);
        assert_eq!(a.private, b.private);
    }

    #[test]
    fn seed_rejects_wrong_length() {
        assert!(Seed::from_slice(&[0u8; 31]).is_err());
        assert!(Seed::from_slice(&[0u8; 33]).is_err());
        assert!(Seed::from_slice(&[0u8; 32]).is_ok());
    }

    #[test]
    fn generate_seed_is_random() {
        let a = generate_seed();
        let b = generate_seed();
        assert_ne!(a.as_bytes(), b.as_bytes());
    }
}
