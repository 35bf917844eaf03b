use hkdf::Hkdf;
use sha2::Sha256;
use x25519_dalek::{PublicKey, StaticSecret};

use crate::error::{Error, Result};

/// Fixed 32-byte HKDF salt shared with the chain's enclave. Must be used
/// verbatim; changing it silently breaks every derived transaction key.
pub const HKDF_SALT: [u8; 32] = [
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x02, 0x4b, 0xea, 0xd8, 0xdf, 0x69, 0x99,
    0x08, 0x52, 0xc2, 0x02, 0xdb, 0x0e, 0x00, 0x97, 0xc1, 0xa1, 0x2e, 0xa6, 0x37, 0xd7, 0xe9, 0x6d,
];

/// Derive the 32-byte AES-SIV key for one transaction:
/// `HKDF-SHA256(ikm = ECDH(priv, ioPub) ‖ nonce, salt = HKDF_SALT, info = "", L = 32)`.
pub fn tx_key(private: &StaticSecret, io_pubkey: &[u8; 32], nonce: &[u8; 32]) -> Result<[u8; 32]> {
    let shared = private.diffie_hellman(&PublicKey::from(*io_pubkey));

    let mut ikm = Vec::with_capacity(64);
    ikm.extend_from_slice(shared.as_bytes());
    ikm.extend_from_slice(nonce);

    let hkdf = Hkdf::<Sha256>::new(Some(&HKDF_SALT), &ikm);
    let mut okm = [0u8; 32];
    hkdf.expand(&[], &mut okm)
        .map_err(|_| Error::CryptoError("HKDF expand produced the wrong output length".into()))?;
    Ok(okm)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Cross-implementation vector: with `priv`, `ioPub`, and `nonce` all
    /// equal to 32 zero bytes, every implementation that reproduces the
    /// fixed `HKDF_SALT` must derive the same key. `ioPub` all-zero decodes
    /// to the curve's zero u-coordinate, a low-order point for which X25519
    /// yields an all-zero shared secret regardless of the (clamped)
    /// scalar, so the HKDF input key material is 64 zero bytes and this
    /// vector is computable offline.
    #[test]
    fn hkdf_vector_all_zero_inputs_is_stable() {
        let private = StaticSecret::from([0u8; 32]);
        let io_pubkey = [0u8; 32];
        let nonce = [0u8; 32];

        let key_a = tx_key(&private, &io_pubkey, &nonce).unwrap();
        let key_b = tx_key(&private, &io_pubkey, &nonce).unwrap();
        assert_eq!(key_a, key_b);
        assert_eq!(
            key_a,
            [
                0x43, 0x31, 0x01, 0xc6, 0x2c, 0x02, 0x2f, 0x10, 0xbf, 0xac, 0x5f, 0x33, 0x4e, 0x86,
                0xac, 0x7d, 0xd8, 0x0f, 0xe3, 0x4f, 0xdc, 0x56, 0x58, 0x52, 0x50, 0x9e, 0x1f, 0x1c,
                0x1a, 0xa7, 0x6d, 0x2b,
            ]
        );
    }

    #[test]
    fn tx_key_is_deterministic() {
        let private = StaticSecret::from([9u8; 32]);
        let io_pubkey = [3u8; 32];
        let nonce = [5u8; 32];
        assert_eq!(
            tx_key(&private, &io_pubkey, &nonce).unwrap(),
            tx_key(&private, &io_pubkey, &nonce).unwrap()
        );
    }

    #[test]
    fn tx_key_varies_with_nonce() {
        let private = StaticSecret::from([9u8; 32]);
        let io_pubkey = [3u8; 32];
        let a = tx_key(&private, &io_pubkey, &[1u8; 32]).unwrap();
        let b = tx_key(&private, &io_pubkey, &[2u8; 32]).unwrap();
        assert_ne!(a, b);
    }
}
