use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Transaction broadcast mode. Default is `block`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BroadcastMode {
    /// Wait for the transaction to be included in a block.
    Block,
    /// Wait only for CheckTx.
    Sync,
    /// Fire-and-forget.
    Async,
}

impl Default for BroadcastMode {
    fn default() -> Self {
        Self::Block
    }
}

/// A coin amount, e.g. `{ "denom": "ucosm", "amount": "2000" }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coin {
    pub denom: String,
    pub amount: String,
}

/// `amount` + `gas` for one operation kind, as in the default gas/fee
/// table.
#[derive(Debug, Clone, Copy)]
pub struct GasFee {
    pub amount: u64,
    pub gas: u64,
}

/// The default gas/fee table, denominated in `ucosm`.
#[derive(Debug, Clone, Copy)]
pub struct DefaultFees {
    pub upload: GasFee,
    pub init: GasFee,
    pub exec: GasFee,
    pub send: GasFee,
}

impl Default for DefaultFees {
    fn default() -> Self {
        Self {
            upload: GasFee { amount: 25_000, gas: 1_000_000 },
            init: GasFee { amount: 12_500, gas: 500_000 },
            exec: GasFee { amount: 5_000, gas: 200_000 },
            send: GasFee { amount: 2_000, gas: 80_000 },
        }
    }
}

/// A user-supplied fee override; any field left `None` falls back to the
/// [`DefaultFees`] entry for that operation. Overrides merge field-wise
/// atop the defaults rather than replacing the whole table.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeeOverride {
    pub amount: Option<u64>,
    pub gas: Option<u64>,
}

impl GasFee {
    /// Merge a user override field-wise atop this default.
    pub fn merge(&self, over: FeeOverride) -> GasFee {
        GasFee {
            amount: over.amount.unwrap_or(self.amount),
            gas: over.gas.unwrap_or(self.gas),
        }
    }
}

/// A resolved plaintext contract message, ready to be sealed: the code
/// hash of the target contract prepended to the payload JSON.
#[derive(Debug, Clone)]
pub struct OutboundContractMessage {
    /// The target contract's 64-hex-character code hash.
    pub code_hash: String,
    /// The caller-supplied execute/instantiate/query payload.
    pub payload: Value,
}

impl OutboundContractMessage {
    pub fn new(code_hash: impl Into<String>, payload: Value) -> Self {
        Self {
            code_hash: code_hash.into(),
            payload,
        }
    }

    /// `utf8(codeHash ‖ canonical_json(payload))` — the exact bytes that
    /// get AES-SIV sealed.
    pub fn plaintext_bytes(&self) -> Vec<u8> {
        let mut bytes = self.code_hash.clone().into_bytes();
        bytes.extend_from_slice(self.payload.to_string().as_bytes());
        bytes
    }
}

/// Transaction messages as the chain's Amino JSON wire format sees them:
/// a `{"type": ..., "value": ...}` envelope discriminated by `type`. The
/// chain itself has many more message kinds than this client constructs;
/// anything we don't model explicitly round-trips through [`Msg::Other`]
/// as the raw `type`/`value` pair, since serde's adjacently-tagged-enum
/// derive can't express a catch-all variant that also carries the tag.
#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// `cosmos-sdk/MsgSend`
    Send(MsgSend),
    /// `wasm/MsgStoreCode`
    StoreCode(MsgStoreCode),
    /// `wasm/MsgInstantiateContract`
    InstantiateContract(MsgInstantiateContract),
    /// `wasm/MsgExecuteContract`
    ExecuteContract(MsgExecuteContract),
    /// Any message type this client doesn't model explicitly.
    Other { type_: String, value: Value },
}

impl Serialize for Msg {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Envelope<'a, T> {
            #[serde(rename = "type")]
            type_: &'a str,
            value: T,
        }

        match self {
            Msg::Send(v) => Envelope { type_: "cosmos-sdk/MsgSend", value: v }.serialize(serializer),
            Msg::StoreCode(v) => Envelope { type_: "wasm/MsgStoreCode", value: v }.serialize(serializer),
            Msg::InstantiateContract(v) => {
                Envelope { type_: "wasm/MsgInstantiateContract", value: v }.serialize(serializer)
            }
            Msg::ExecuteContract(v) => {
                Envelope { type_: "wasm/MsgExecuteContract", value: v }.serialize(serializer)
            }
            Msg::Other { type_, value } => {
                Envelope { type_: type_.as_str(), value: value.clone() }.serialize(serializer)
            }
        }
    }
}

impl<'de> Deserialize<'de> for Msg {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Envelope {
            #[serde(rename = "type")]
            type_: String,
            value: Value,
        }

        let envelope = Envelope::deserialize(deserializer)?;
        Ok(match envelope.type_.as_str() {
            "cosmos-sdk/MsgSend" => Msg::Send(
                serde_json::from_value(envelope.value).map_err(serde::de::Error::custom)?,
            ),
            "wasm/MsgStoreCode" => Msg::StoreCode(
                serde_json::from_value(envelope.value).map_err(serde::de::Error::custom)?,
            ),
            "wasm/MsgInstantiateContract" => Msg::InstantiateContract(
                serde_json::from_value(envelope.value).map_err(serde::de::Error::custom)?,
            ),
            "wasm/MsgExecuteContract" => Msg::ExecuteContract(
                serde_json::from_value(envelope.value).map_err(serde::de::Error::custom)?,
            ),
            other => Msg::Other { type_: other.to_string(), value: envelope.value },
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MsgSend {
    pub from_address: String,
    pub to_address: String,
    pub amount: Vec<Coin>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MsgStoreCode {
    pub sender: String,
    /// base64-encoded WASM bytecode.
    pub wasm_byte_code: String,
    pub source: String,
    pub builder: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MsgInstantiateContract {
    pub sender: String,
    pub code_id: String,
    /// base64-encoded sealed envelope.
    pub init_msg: String,
    pub label: String,
    #[serde(default)]
    pub init_funds: Vec<Coin>,
    /// Always the empty string when originating from the user.
    #[serde(default)]
    pub callback_code_hash: String,
    /// Always null when originating from the user.
    #[serde(default)]
    pub callback_sig: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MsgExecuteContract {
    pub sender: String,
    pub contract: String,
    /// base64-encoded sealed envelope.
    pub msg: String,
    #[serde(default)]
    pub sent_funds: Vec<Coin>,
    #[serde(default)]
    pub callback_code_hash: String,
    #[serde(default)]
    pub callback_sig: Option<String>,
}
