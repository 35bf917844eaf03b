use serde::{Deserialize, Serialize};

use crate::msg::{Coin, Msg};

/// The Cosmos-SDK amino-encoded transaction envelope. Amino sign-bytes
/// construction itself is out of scope here — we only need the shape to
/// hand a signed tx to the transport adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StdTx {
    pub msg: Vec<Msg>,
    pub fee: StdFee,
    pub signatures: Vec<StdSignature>,
    #[serde(default)]
    pub memo: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StdFee {
    pub amount: Vec<Coin>,
    pub gas: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StdSignature {
    pub pub_key: StdPubKey,
    pub signature: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StdPubKey {
    #[serde(rename = "type")]
    pub type_: String,
    pub value: String,
}

/// The document an [`crate::signer::OfflineSigner`] signs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StdSignDoc {
    pub chain_id: String,
    pub account_number: String,
    pub sequence: String,
    pub fee: StdFee,
    pub msgs: Vec<Msg>,
    #[serde(default)]
    pub memo: String,
}

/// A single log entry returned from a tx-search/tx result, as consumed
/// by `DecryptedTxView`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Log {
    pub msg_index: u64,
    pub events: Vec<Event>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "type")]
    pub type_: String,
    pub attributes: Vec<EventAttribute>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventAttribute {
    pub key: String,
    pub value: String,
}

/// One inbound tx-search result, before or after decryption.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TxResult {
    pub height: String,
    pub txhash: String,
    pub code: u32,
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub raw_log: String,
    #[serde(default)]
    pub logs: Vec<Log>,
    pub tx: TxValue,
}

/// The `tx.value` wrapper around the message list of a historical tx.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TxValue {
    pub msg: Vec<Msg>,
}
