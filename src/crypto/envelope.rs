use rand::rngs::OsRng;
use rand::RngCore;

use crate::crypto::kdf::tx_key;
use crate::error::{Error, Result};
use crate::seed::UserKeypair;

/// `nonce(32) ‖ userPub(32) ‖ sivCiphertext(n)`.
const NONCE_LEN: usize = 32;
const PUBKEY_LEN: usize = 32;
const ENVELOPE_HEADER_LEN: usize = NONCE_LEN + PUBKEY_LEN;

/// Seals a plaintext payload (`codeHashHex ‖ canonicalJson`) into an
/// envelope addressed to `io_pubkey`, under a freshly sampled nonce.
///
/// Returns `(envelope_bytes, nonce)`; the nonce must be retained by the
/// caller to decrypt the chain's response to this message.
pub fn seal(
    keypair: &UserKeypair,
    io_pubkey: &[u8; 32],
    plaintext: &[u8],
) -> Result<(Vec<u8>, [u8; 32])> {
    let mut nonce = [0u8; 32];
    OsRng.fill_bytes(&mut nonce);

    let key = tx_key(&keypair.secret(), io_pubkey, &nonce)?;
    let ciphertext = siv_seal(&key, plaintext)?;

    let mut envelope = Vec::with_capacity(ENVELOPE_HEADER_LEN + ciphertext.len());
    envelope.extend_from_slice(&nonce);
    envelope.extend_from_slice(&keypair.public);
    envelope.extend_from_slice(&ciphertext);

    Ok((envelope, nonce))
}

/// Opens a SIV ciphertext (the bytes following the 64-byte envelope
/// header) given the nonce used to seal it. An empty ciphertext decrypts
/// to an empty plaintext.
pub fn open(keypair: &UserKeypair, io_pubkey: &[u8; 32], ciphertext: &[u8], nonce: &[u8; 32]) -> Result<Vec<u8>> {
    if ciphertext.is_empty() {
        return Ok(Vec::new());
    }
    let key = tx_key(&keypair.secret(), io_pubkey, nonce)?;
    siv_open(&key, ciphertext)
}

/// Slices the sender public key (offset 32..64) out of a full envelope.
/// Callers compare this against their own public key to decide whether an
/// inbound envelope belongs to them.
pub fn envelope_sender_pubkey(envelope: &[u8]) -> Result<[u8; 32]> {
    if envelope.len() < ENVELOPE_HEADER_LEN {
        return Err(Error::InvalidLength {
            what: "envelope",
            expected: ENVELOPE_HEADER_LEN,
            got: envelope.len(),
        });
    }
    let mut pubkey = [0u8; 32];
    pubkey.copy_from_slice(&envelope[NONCE_LEN..ENVELOPE_HEADER_LEN]);
    Ok(pubkey)
}

/// Slices the nonce (offset 0..32) out of a full envelope.
pub fn envelope_nonce(envelope: &[u8]) -> Result<[u8; 32]> {
    if envelope.len() < ENVELOPE_HEADER_LEN {
        return Err(Error::InvalidLength {
            what: "envelope",
            expected: ENVELOPE_HEADER_LEN,
            got: envelope.len(),
        });
    }
    let mut nonce = [0u8; 32];
    nonce.copy_from_slice(&envelope[..NONCE_LEN]);
    Ok(nonce)
}

/// The ciphertext portion of a full envelope (offset 64..).
pub fn envelope_ciphertext(envelope: &[u8]) -> Result<&[u8]> {
    if envelope.len() < ENVELOPE_HEADER_LEN {
        return Err(Error::InvalidLength {
            what: "envelope",
            expected: ENVELOPE_HEADER_LEN,
            got: envelope.len(),
        });
    }
    Ok(&envelope[ENVELOPE_HEADER_LEN..])
}

/// AES-128-SIV seal with a single, empty associated-data element. This
/// matches the miscreant library's behavior used by the reference
/// implementation and must be reproduced bit-identically for
/// cross-implementation compatibility: the AD list is `[ b"" ]`, not `[]`.
fn siv_seal(key: &[u8; 32], plaintext: &[u8]) -> Result<Vec<u8>> {
    use aes_siv::aead::generic_array::GenericArray;
    use aes_siv::siv::Aes128Siv;
    let mut cipher = Aes128Siv::new(GenericArray::from_slice(key));
    cipher
        .encrypt(&[&[]], plaintext)
        .map_err(|e| Error::CryptoError(format!("AES-SIV seal failed: {e}")))
}

fn siv_open(key: &[u8; 32], ciphertext: &[u8]) -> Result<Vec<u8>> {
    use aes_siv::aead::generic_array::GenericArray;
    use aes_siv::siv::Aes128Siv;
    let mut cipher = Aes128Siv::new(GenericArray::from_slice(key));
    cipher
        .decrypt(&[&[]], ciphertext)
        .map_err(|_| Error::CryptoError("AES-SIV authentication failed".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::{Seed, UserKeypair};

    fn keypair(byte: u8) -> UserKeypair {
        UserKeypair::from_seed(&Seed::new([byte; 32]))
    }

    #[test]
    fn seal_open_round_trip() {
        let user = keypair(1);
        let io_pub = keypair(2).public;

        let (envelope, nonce) = seal(&user, &io_pub, b"hello world").unwrap();
        assert_eq!(envelope.len(), ENVELOPE_HEADER_LEN + 11 + 16);

        let ciphertext = envelope_ciphertext(&envelope).unwrap();
        let plaintext = open(&user, &io_pub, ciphertext, &nonce).unwrap();
        assert_eq!(plaintext, b"hello world");
    }

    #[test]
    fn envelope_layout_pubkey_matches_sender() {
        let user = keypair(3);
        let io_pub = keypair(4).public;
        let (envelope, nonce) = seal(&user, &io_pub, b"{}").unwrap();

        assert_eq!(envelope_sender_pubkey(&envelope).unwrap(), user.public);
        assert_eq!(envelope_nonce(&envelope).unwrap(), nonce);
    }

    #[test]
    fn nonces_do_not_collide_across_many_calls() {
        let user = keypair(5);
        let io_pub = keypair(6).public;

        let mut seen = std::collections::HashSet::new();
        for _ in 0..1000 {
            let (envelope, _) = seal(&user, &io_pub, b"x").unwrap();
            let nonce = envelope_nonce(&envelope).unwrap();
            assert!(seen.insert(nonce), "nonce collision across 1000 calls");
        }
    }

    #[test]
    fn empty_ciphertext_opens_to_empty_plaintext() {
        let user = keypair(7);
        let io_pub = keypair(8).public;
        let nonce = [0u8; 32];
        assert_eq!(open(&user, &io_pub, &[], &nonce).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn tampered_ciphertext_fails_to_open() {
        let user = keypair(9);
        let io_pub = keypair(10).public;
        let (mut envelope, nonce) = seal(&user, &io_pub, b"sensitive").unwrap();
        let last = envelope.len() - 1;
        envelope[last] ^= 0xff;

        let ciphertext = envelope_ciphertext(&envelope).unwrap();
        assert!(open(&user, &io_pub, ciphertext, &nonce).is_err());
    }

    proptest::proptest! {
        /// Round-trip and envelope-layout properties, generalized over
        /// arbitrary seeds, io pubkeys, and plaintexts instead of a
        /// handful of fixed vectors.
        #[test]
        fn seal_open_round_trips_for_arbitrary_inputs(
            user_seed: [u8; 32],
            io_seed: [u8; 32],
            plaintext in proptest::collection::vec(proptest::prelude::any::<u8>(), 0..256),
        ) {
            let user = UserKeypair::from_seed(&Seed::new(user_seed));
            let io_pub = UserKeypair::from_seed(&Seed::new(io_seed)).public;

            let (envelope, nonce) = seal(&user, &io_pub, &plaintext).unwrap();
            proptest::prop_assert_eq!(envelope_sender_pubkey(&envelope).unwrap(), user.public);
            proptest::prop_assert_eq!(envelope_nonce(&envelope).unwrap(), nonce);

            let ciphertext = envelope_ciphertext(&envelope).unwrap();
            let recovered = open(&user, &io_pub, ciphertext, &nonce).unwrap();
            proptest::prop_assert_eq!(recovered, plaintext);
        }
    }
}
