use bech32::{FromBase32, ToBase32};
use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

/// Bitcoin-style address derivation: `RIPEMD160(SHA256(pubkey))`,
/// bech32-encoded with the chain's account prefix. Used to turn a
/// secp256k1 signing pubkey into the `secret1...`-style account address
/// that appears in outbound messages (`sender`, `contract`).
pub fn pubkey_to_address(pubkey: &[u8], prefix: &str) -> Result<String> {
    let sha = Sha256::digest(pubkey);
    let ripe = Ripemd160::digest(sha);
    bech32::encode(prefix, ripe.to_base32(), bech32::Variant::Bech32).map_err(Error::from)
}

/// Decode a bech32 address into its raw account-id bytes.
pub fn decode_address(addr: &str) -> Result<Vec<u8>> {
    let (_hrp, data, _variant) = bech32::decode(addr)?;
    Vec::<u8>::from_base32(&data).map_err(|_| Error::SchemaError(format!("invalid bech32 data in `{addr}`")))
}
