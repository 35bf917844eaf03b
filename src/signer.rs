use serde::{Deserialize, Serialize};

use crate::types::{StdSignDoc, StdSignature};

/// Either a raw signing callback or a full offline signer. The core never
/// manages signing keys itself — one of these is always injected by the
/// caller.
pub enum Signer {
    /// A bare `fn(bytes) -> Signature` callback over the sign-bytes the
    /// caller has already constructed.
    Callback(Box<dyn Fn(&[u8]) -> StdSignature + Send + Sync>),
    /// A full offline signer that receives the unsigned sign doc and
    /// returns both the (possibly chain-id-amended) doc it signed and the
    /// signature.
    Offline(Box<dyn OfflineSigner>),
}

impl std::fmt::Debug for Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Signer::Callback(_) => f.debug_tuple("Signer::Callback").finish(),
            Signer::Offline(_) => f.debug_tuple("Signer::Offline").finish(),
        }
    }
}

/// A signer that owns its keys entirely out-of-process: it is handed a
/// sign doc and returns the signed doc plus its signature.
pub trait OfflineSigner: Send + Sync {
    /// Sign `doc`, returning the doc actually signed (an offline signer
    /// may canonicalize it first) and the resulting signature.
    fn sign(&self, doc: &StdSignDoc) -> OfflineSignResponse;
}

/// The result of [`OfflineSigner::sign`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfflineSignResponse {
    pub signed: StdSignDoc,
    pub signature: StdSignature,
}
