//! Inbound-response decryption (component G): restores plaintext inside
//! `data`, wasm-event log attributes, smart-query results, and cipher
//! fragments embedded in error strings, and replays the historical
//! decrypt path for past transactions this keypair originated.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::crypto::envelope;
use crate::error::{Error, Result};
use crate::msg::Msg;
use crate::seed::UserKeypair;
use crate::types::{Log, TxResult};

static EXEC_ERROR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"contract failed: encrypted: (.+?): failed to execute message; message index: 0")
        .expect("static regex is valid")
});

static SMART_QUERY_ERROR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"contract failed: encrypted: (.+?) \(HTTP 500\)").expect("static regex is valid"));

fn b64_decode(s: &str) -> Result<Vec<u8>> {
    base64::Engine::decode(&base64::engine::general_purpose::STANDARD, s).map_err(Error::from)
}

fn b64_encode(bytes: impl AsRef<[u8]>) -> String {
    base64::Engine::encode(&base64::engine::general_purpose::STANDARD, bytes)
}

/// A past or just-broadcast tx with its encrypted fields restored to
/// plaintext where this keypair was able to decrypt them.
#[derive(Debug, Clone)]
pub struct DecryptedTxView {
    pub height: String,
    pub txhash: String,
    pub code: u32,
    pub data: Option<Vec<u8>>,
    pub raw_log: String,
    pub logs: Vec<Log>,
    /// The caller's original execute/instantiate payload, recovered only
    /// on the historical path when the tx's envelope was addressed from
    /// this keypair.
    pub plaintext_msg: Option<serde_json::Value>,
}

/// `data` arrives as a hex ciphertext; the chain double-encodes its
/// plaintext as the UTF-8 text of a base64 string, so decryption recovers
/// an ASCII string that must itself be base64-decoded.
pub fn decrypt_data_field(
    keypair: &UserKeypair,
    io_pubkey: &[u8; 32],
    data_hex: &str,
    nonce: &[u8; 32],
) -> Result<Vec<u8>> {
    let ciphertext = hex::decode(data_hex)?;
    let plaintext = envelope::open(keypair, io_pubkey, &ciphertext, nonce)?;
    let inner_b64 = String::from_utf8(plaintext).map_err(|e| Error::CryptoError(e.to_string()))?;
    b64_decode(&inner_b64)
}

/// Best-effort decrypt of one attribute field (key or value): base64
/// decode, then AES-SIV open under `nonce`. Any failure along the way
/// means "leave unchanged" to the caller, never a hard error.
fn try_decrypt_attr_field(keypair: &UserKeypair, io_pubkey: &[u8; 32], field: &str, nonce: &[u8; 32]) -> Option<String> {
    let ciphertext = b64_decode(field).ok()?;
    let plaintext = envelope::open(keypair, io_pubkey, &ciphertext, nonce).ok()?;
    String::from_utf8(plaintext).ok()
}

/// Walk every `wasm`-typed event in `logs` and replace each attribute's
/// `key`/`value` with its decrypted plaintext where decryption succeeds.
/// A corrupt or foreign attribute is left exactly as received.
pub fn decrypt_logs(keypair: &UserKeypair, io_pubkey: &[u8; 32], logs: &mut [Log], nonce: &[u8; 32]) {
    for log in logs.iter_mut() {
        for event in log.events.iter_mut() {
            if event.type_ != "wasm" {
                continue;
            }
            for attr in event.attributes.iter_mut() {
                if let Some(plain) = try_decrypt_attr_field(keypair, io_pubkey, &attr.key, nonce) {
                    attr.key = plain;
                }
                if let Some(plain) = try_decrypt_attr_field(keypair, io_pubkey, &attr.value, nonce) {
                    attr.value = plain;
                }
            }
        }
    }
}

/// If `raw_log` matches the exec-failure cipher pattern, decrypt the
/// captured fragment and splice the plaintext back in; otherwise return
/// it unchanged. A match that fails to decrypt is a hard error (spec
/// §4.G failure model), preserving the still-encrypted original.
pub fn decrypt_raw_log_error(keypair: &UserKeypair, io_pubkey: &[u8; 32], raw_log: &str, nonce: &[u8; 32]) -> Result<String> {
    splice_encrypted_capture(keypair, io_pubkey, raw_log, nonce, &EXEC_ERROR_RE)
}

/// Same splice as [`decrypt_raw_log_error`] but against the smart-query
/// `(HTTP 500)` error shape.
pub fn decrypt_smart_query_error(keypair: &UserKeypair, io_pubkey: &[u8; 32], message: &str, nonce: &[u8; 32]) -> Result<String> {
    splice_encrypted_capture(keypair, io_pubkey, message, nonce, &SMART_QUERY_ERROR_RE)
}

fn splice_encrypted_capture(
    keypair: &UserKeypair,
    io_pubkey: &[u8; 32],
    message: &str,
    nonce: &[u8; 32],
    pattern: &Regex,
) -> Result<String> {
    let Some(captures) = pattern.captures(message) else {
        return Ok(message.to_string());
    };
    let fragment_match = captures.get(1).expect("pattern has exactly one capture group");
    let fragment = fragment_match.as_str();

    let plaintext = (|| -> Result<String> {
        let ciphertext = b64_decode(fragment)?;
        let plaintext = envelope::open(keypair, io_pubkey, &ciphertext, nonce)?;
        String::from_utf8(plaintext).map_err(|e| Error::CryptoError(e.to_string()))
    })()
    .map_err(|decrypt_error| Error::DecryptErrorWrappedError {
        decrypt_error: decrypt_error.to_string(),
        original: message.to_string(),
    })?;

    // Splice the decrypted fragment in where the captured ciphertext was,
    // leaving everything else in the message exactly as received.
    let mut rebuilt = String::with_capacity(message.len());
    rebuilt.push_str(&message[..fragment_match.start()]);
    rebuilt.push_str(&plaintext);
    rebuilt.push_str(&message[fragment_match.end()..]);
    Ok(rebuilt)
}

/// Decrypt the post-broadcast response fields we already know the nonce
/// for: `data` (hard-fail if present and undecryptable), `logs`
/// (best-effort per attribute), and `raw_log` (hard-fail only if it
/// matched the cipher pattern and failed to decrypt).
pub fn decrypt_post_send_response(
    keypair: &UserKeypair,
    io_pubkey: &[u8; 32],
    data_hex: Option<&str>,
    logs: &mut Vec<Log>,
    raw_log: &str,
    nonce: &[u8; 32],
) -> Result<(Option<Vec<u8>>, String)> {
    let data = data_hex.map(|hex| decrypt_data_field(keypair, io_pubkey, hex, nonce)).transpose()?;
    decrypt_logs(keypair, io_pubkey, logs, nonce);
    let raw_log = decrypt_raw_log_error(keypair, io_pubkey, raw_log, nonce)?;
    Ok((data, raw_log))
}

/// Replay the historical decrypt path for a past tx: if its single
/// message is a `wasm/MsgExecuteContract`/`wasm/MsgInstantiateContract`
/// whose envelope is addressed from `keypair`, recover the nonce from the
/// envelope prefix, restore the original JSON payload, and decrypt
/// `data`/`logs`/`raw_log` the same way as the post-send path. A tx
/// addressed from a different keypair (or with any other message shape)
/// is returned with its encrypted fields untouched.
pub fn decrypt_historical_tx(keypair: &UserKeypair, io_pubkey: &[u8; 32], tx: &TxResult) -> Result<DecryptedTxView> {
    let mut view = DecryptedTxView {
        height: tx.height.clone(),
        txhash: tx.txhash.clone(),
        code: tx.code,
        data: None,
        raw_log: tx.raw_log.clone(),
        logs: tx.logs.clone(),
        plaintext_msg: None,
    };

    let envelope_b64 = match tx.tx.msg.as_slice() {
        [Msg::ExecuteContract(m)] => &m.msg,
        [Msg::InstantiateContract(m)] => &m.init_msg,
        _ => return Ok(view),
    };

    let env = b64_decode(envelope_b64)?;
    let sender = envelope::envelope_sender_pubkey(&env)?;
    if sender != keypair.public {
        return Ok(view);
    }

    let nonce = envelope::envelope_nonce(&env)?;
    let ciphertext = envelope::envelope_ciphertext(&env)?;
    let plaintext = envelope::open(keypair, io_pubkey, ciphertext, &nonce)?;

    if plaintext.len() < 64 {
        return Err(Error::InvalidLength {
            what: "decrypted historical contract message",
            expected: 64,
            got: plaintext.len(),
        });
    }
    let payload_json = &plaintext[64..];
    view.plaintext_msg = Some(serde_json::from_slice(payload_json)?);

    let (data, raw_log) =
        decrypt_post_send_response(keypair, io_pubkey, tx.data.as_deref(), &mut view.logs, &tx.raw_log, &nonce)?;
    view.data = data;
    view.raw_log = raw_log;

    Ok(view)
}

/// `fromUtf8 ∘ fromBase64 ∘ fromUtf8 ∘ decrypt ∘ fromBase64` of
/// `result.smart`: the chain wraps a smart-query's plaintext response in
/// an extra base64+UTF-8 round trip on top of the envelope encoding every
/// other ciphertext uses.
pub fn decrypt_smart_query_result(keypair: &UserKeypair, io_pubkey: &[u8; 32], result_smart_b64: &str, nonce: &[u8; 32]) -> Result<String> {
    let ciphertext = b64_decode(result_smart_b64)?;
    let plaintext = envelope::open(keypair, io_pubkey, &ciphertext, nonce)?;
    let once = String::from_utf8(plaintext).map_err(|e| Error::CryptoError(e.to_string()))?;
    let twice = b64_decode(&once)?;
    String::from_utf8(twice).map_err(|e| Error::CryptoError(e.to_string()))
}

/// hex-of-utf8-of-base64 used for the smart-query request path: base64
/// the envelope, UTF-8 encode that ASCII string, then hex it.
pub fn envelope_to_smart_query_path_segment(envelope: &[u8]) -> String {
    hex::encode(b64_encode(envelope))
}
