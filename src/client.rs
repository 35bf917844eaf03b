//! Top-level facade: a `Client` owns the user's keypair, the consensus I/O
//! and code-hash caches, and a transport, and exposes the operations a
//! caller actually wants (encrypt+broadcast, query, historical decrypt)
//! instead of making them wire the components (A-H) together by hand.

use serde_json::Value;
use tracing::instrument;

use crate::code_hash::{CodeHash, CodeHashCache};
use crate::config::ConnectionConf;
use crate::crypto::ConsensusIoPubKeyCache;
use crate::decrypt::{self, DecryptedTxView};
use crate::encrypt::{self, EncryptedMessage};
use crate::error::{Error, Result};
use crate::libs::address::pubkey_to_address;
use crate::msg::BroadcastMode;
use crate::seed::{Seed, UserKeypair};
use crate::transport::{PostTxResponse, ReqwestTransport, Transport};
use crate::types::TxResult;

/// The post-send path result of [`Client::decrypt_tx_response`]: the same
/// broadcast outcome with `data`/`raw_log` restored to plaintext where
/// decryption succeeded.
#[derive(Debug, Clone)]
pub struct DecryptedPostSendResponse {
    pub txhash: String,
    pub code: u32,
    pub data: Option<Vec<u8>>,
    pub raw_log: String,
}

/// A client bound to one keypair and one chain connection.
///
/// A `Client` is meant to be driven from one logical task at a time; the
/// two caches it owns are safe to share across tasks (`OnceCell` /
/// `RwLock`) but nothing else is synchronized beyond that.
pub struct Client {
    keypair: UserKeypair,
    conf: ConnectionConf,
    transport: Box<dyn Transport>,
    io_pubkey_cache: ConsensusIoPubKeyCache,
    code_hash_cache: CodeHashCache,
}

impl Client {
    /// Build a client from a seed and connection configuration, using the
    /// production `reqwest`-backed transport.
    pub fn new(seed: Seed, conf: ConnectionConf) -> Self {
        let transport = Box::new(ReqwestTransport::new(conf.lcd_url().to_string()));
        Self::with_transport(seed, conf, transport)
    }

    /// Build a client against an injected transport (tests, or a
    /// non-`reqwest` backend).
    pub fn with_transport(seed: Seed, conf: ConnectionConf, transport: Box<dyn Transport>) -> Self {
        Self {
            keypair: UserKeypair::from_seed(&seed),
            conf,
            transport,
            io_pubkey_cache: ConsensusIoPubKeyCache::new(),
            code_hash_cache: CodeHashCache::new(),
        }
    }

    /// This client's bech32 account address under the configured prefix.
    pub fn address(&self) -> Result<String> {
        pubkey_to_address(&self.keypair.public, self.conf.prefix())
    }

    /// The 32-byte X25519 public key this client encrypts and decrypts
    /// under.
    pub fn public_key(&self) -> [u8; 32] {
        self.keypair.public
    }

    /// Facade over the code-hash cache (component E), by numeric code id.
    pub async fn get_code_hash_by_code_id(&self, code_id: u64) -> Result<CodeHash> {
        self.code_hash_cache.get_by_code_id(self.transport.as_ref(), code_id).await
    }

    /// Facade over the code-hash cache (component E), by contract address.
    pub async fn get_code_hash_by_contract(&self, contract_addr: &str) -> Result<CodeHash> {
        self.code_hash_cache.get_by_contract(self.transport.as_ref(), contract_addr).await
    }

    /// Seal `message` for execution against `contract_addr`, resolving its
    /// code hash via the cache (component F).
    pub async fn encrypt_execute_msg(&self, contract_addr: &str, message: Value) -> Result<EncryptedMessage> {
        encrypt::encrypt_for_contract(
            &self.keypair,
            &self.io_pubkey_cache,
            &self.code_hash_cache,
            self.transport.as_ref(),
            contract_addr,
            message,
        )
        .await
    }

    /// Seal `message` for instantiation under `code_hash` (resolved by the
    /// caller for a freshly uploaded code id).
    pub async fn encrypt_instantiate_msg(&self, code_hash: impl Into<String>, message: Value) -> Result<EncryptedMessage> {
        encrypt::encrypt_with_code_hash(&self.keypair, &self.io_pubkey_cache, self.transport.as_ref(), code_hash, message).await
    }

    /// Broadcast an already-built, already-signed transaction.
    pub async fn broadcast_tx(&self, tx: &crate::types::StdTx) -> Result<PostTxResponse> {
        self.transport.post_tx(tx, self.conf.broadcast_mode()).await
    }

    /// Decrypt the response to a just-broadcast transaction, given the
    /// nonce returned from the encrypt step that produced it.
    #[instrument(skip(self, response), err)]
    pub async fn decrypt_tx_response(&self, response: &PostTxResponse, nonce: &[u8; 32]) -> Result<DecryptedPostSendResponse> {
        let io_pubkey = self.io_pubkey_cache.get(self.transport.as_ref()).await?;
        let mut logs = Vec::new();
        let (data, raw_log) = decrypt::decrypt_post_send_response(
            &self.keypair,
            &io_pubkey,
            response.data.as_deref(),
            &mut logs,
            &response.raw_log,
            nonce,
        )?;
        Ok(DecryptedPostSendResponse {
            txhash: response.txhash.clone(),
            code: response.code,
            data,
            raw_log,
        })
    }

    /// Fetch and decrypt a past transaction by hash, replaying the
    /// historical decrypt path. Returns the tx untouched (but still
    /// fetched) if it wasn't addressed from this keypair.
    #[instrument(skip(self), err)]
    pub async fn get_tx(&self, txhash: &str) -> Result<DecryptedTxView> {
        let io_pubkey = self.io_pubkey_cache.get(self.transport.as_ref()).await?;
        let body = self.transport.get(&format!("/txs/{txhash}")).await?;
        let tx: TxResult = serde_json::from_value(body).map_err(Error::from)?;
        decrypt::decrypt_historical_tx(&self.keypair, &io_pubkey, &tx)
    }

    /// Perform a full smart-query round trip: seal `query`, GET the
    /// hex-of-base64 query path, and decrypt the result (or the embedded
    /// 500 error).
    #[instrument(skip(self, query), err)]
    pub async fn query_contract_smart(&self, contract_addr: &str, query: Value) -> Result<Value> {
        let code_hash = self.code_hash_cache.get_by_contract(self.transport.as_ref(), contract_addr).await?;
        let io_pubkey = self.io_pubkey_cache.get(self.transport.as_ref()).await?;

        let plaintext = crate::msg::OutboundContractMessage::new(code_hash, query).plaintext_bytes();
        let (envelope, nonce) = crate::crypto::envelope::seal(&self.keypair, &io_pubkey, &plaintext)?;
        let path_segment = decrypt::envelope_to_smart_query_path_segment(&envelope);

        let path = format!("/wasm/contract/{contract_addr}/query/{path_segment}");
        let result = match self.transport.get(&path).await {
            Ok(body) => body,
            Err(Error::ServerError { status, body }) if status == 500 => {
                let decrypted = decrypt::decrypt_smart_query_error(&self.keypair, &io_pubkey, &body, &nonce)?;
                return Err(Error::ServerError { status, body: decrypted });
            }
            Err(err) => return Err(err),
        };

        let smart_b64 = result
            .get("result")
            .and_then(|r| r.get("smart"))
            .and_then(|v| v.as_str())
            .ok_or_else(|| Error::SchemaError("missing result.smart in smart-query response".into()))?;

        let plaintext = decrypt::decrypt_smart_query_result(&self.keypair, &io_pubkey, smart_b64, &nonce)?;
        serde_json::from_str(&plaintext).map_err(Error::from)
    }

    /// Opaque passthrough for the chain's master certificate endpoint. No
    /// schema validation is performed: callers that need structure should
    /// parse the returned value themselves (spec's Open Questions treat
    /// this as an opaque passthrough).
    pub async fn get_master_certs(&self) -> Result<Value> {
        self.transport.get("/register/master-cert").await
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use mockall::mock;
    use serde_json::json;

    use super::*;
    use crate::crypto::envelope;

    mock! {
        pub ChainTransport {
            fn _get(&self, path: &str) -> Result<Value>;
            fn _post(&self, path: &str, body: &Value) -> Result<Value>;
            fn _post_tx(&self, tx: &crate::types::StdTx, mode: BroadcastMode) -> Result<PostTxResponse>;
        }
    }

    #[async_trait]
    impl Transport for MockChainTransport {
        async fn get(&self, path: &str) -> Result<Value> {
            self._get(path)
        }
        async fn post(&self, path: &str, body: &Value) -> Result<Value> {
            self._post(path, body)
        }
        async fn post_tx(&self, tx: &crate::types::StdTx, mode: BroadcastMode) -> Result<PostTxResponse> {
            self._post_tx(tx, mode)
        }
    }

    fn b64_encode(bytes: impl AsRef<[u8]>) -> String {
        base64::Engine::encode(&base64::engine::general_purpose::STANDARD, bytes)
    }

    fn b64_decode(s: &str) -> Vec<u8> {
        base64::Engine::decode(&base64::engine::general_purpose::STANDARD, s).unwrap()
    }

    fn aes_siv_seal(key: &[u8; 32], plaintext: &[u8]) -> Vec<u8> {
        use aes_siv::aead::generic_array::GenericArray;
        use aes_siv::siv::Aes128Siv;
        let mut cipher = Aes128Siv::new(GenericArray::from_slice(key));
        cipher.encrypt(&[&[]], plaintext).unwrap()
    }

    /// Builds the `result.smart` payload a real chain would return for
    /// `answer`, given the envelope the client just sealed in its request
    /// path segment: recover the nonce it used, derive the same tx key,
    /// and reapply the chain's double-base64 wrapping for smart-query
    /// results.
    fn fake_smart_query_result(keypair: &UserKeypair, io_pub: &[u8; 32], path_segment: &str, answer: &str) -> String {
        let envelope_ascii_b64 = String::from_utf8(hex::decode(path_segment).unwrap()).unwrap();
        let env = b64_decode(&envelope_ascii_b64);
        let nonce = envelope::envelope_nonce(&env).unwrap();

        let key = keypair.derive_tx_key(io_pub, &nonce).unwrap();
        let once_b64 = b64_encode(answer.as_bytes());
        let ciphertext = aes_siv_seal(&key, once_b64.as_bytes());
        b64_encode(ciphertext)
    }

    #[tracing_test::traced_test]
    #[tokio::test]
    async fn query_contract_smart_round_trips_through_a_mocked_transport() {
        let io_pub = UserKeypair::from_seed(&Seed::new([4u8; 32])).public;
        let code_hash = "e".repeat(64);
        let contract_addr = "secret1querytarget";
        let expected_answer = json!({"balance": {"amount": "42"}});

        // The mocked "chain" needs the client's own keypair to recover the
        // nonce from the query it issued and seal a matching response.
        let keypair_for_result = UserKeypair::from_seed(&Seed::new([3u8; 32]));
        let expected_answer_str = expected_answer.to_string();

        let mut transport = MockChainTransport::new();
        transport.expect__get().returning(move |path| {
            if path == "/reg/consensus-io-exch-pubkey" {
                return Ok(json!({ "result": { "ioExchPubkey": b64_encode(io_pub) } }));
            }
            if path == format!("/wasm/contract/{contract_addr}/code-hash") {
                return Ok(json!({ "result": code_hash }));
            }
            let prefix = format!("/wasm/contract/{contract_addr}/query/");
            if let Some(segment) = path.strip_prefix(prefix.as_str()) {
                let smart = fake_smart_query_result(&keypair_for_result, &io_pub, segment, &expected_answer_str);
                return Ok(json!({ "result": { "smart": smart } }));
            }
            panic!("unexpected GET path: {path}");
        });

        let client = Client::with_transport(
            Seed::new([3u8; 32]),
            ConnectionConf::new("https://lcd.example.com", "secret-4", "secret").unwrap(),
            Box::new(transport),
        );

        let answer = client.query_contract_smart(contract_addr, json!({"balance": {}})).await.unwrap();
        assert_eq!(answer, expected_answer);
    }

    #[tracing_test::traced_test]
    #[tokio::test]
    async fn get_tx_decrypts_a_historical_transaction_via_mocked_transport() {
        let keypair = UserKeypair::from_seed(&Seed::new([5u8; 32]));
        let io_pub = UserKeypair::from_seed(&Seed::new([6u8; 32])).public;

        let mut plaintext = "a".repeat(64).into_bytes();
        plaintext.extend_from_slice(br#"{"increment":{}}"#);
        let (envelope, _nonce) = envelope::seal(&keypair, &io_pub, &plaintext).unwrap();

        let mut transport = MockChainTransport::new();
        transport.expect__get().returning(move |path| {
            if path == "/reg/consensus-io-exch-pubkey" {
                return Ok(json!({ "result": { "ioExchPubkey": b64_encode(io_pub) } }));
            }
            if path == "/txs/ABCDEF" {
                return Ok(json!({
                    "height": "10",
                    "txhash": "ABCDEF",
                    "code": 0,
                    "raw_log": "",
                    "logs": [],
                    "tx": {
                        "msg": [{
                            "type": "wasm/MsgExecuteContract",
                            "value": {
                                "sender": "secret1me",
                                "contract": "secret1contract",
                                "msg": b64_encode(&envelope),
                                "sent_funds": [],
                                "callback_code_hash": "",
                                "callback_sig": null,
                            }
                        }]
                    }
                }));
            }
            panic!("unexpected GET path: {path}");
        });

        let client = Client::with_transport(
            Seed::new([5u8; 32]),
            ConnectionConf::new("https://lcd.example.com", "secret-4", "secret").unwrap(),
            Box::new(transport),
        );

        let view = client.get_tx("ABCDEF").await.unwrap();
        assert_eq!(view.plaintext_msg.unwrap(), json!({"increment": {}}));
    }
}
