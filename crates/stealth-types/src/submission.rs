//! Inbound scoring request.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::secret::SecretString;

/// The JSON body of a scoring request.
///
/// The three crypto fields are base64 text. `aes_key` and `iv` are wrapped in
/// [`SecretString`] so a stray `{:?}` cannot leak them. `ciphertext` is not
/// secret: it is bound into the receipt and may be shown to anyone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreRequest {
    /// Base64 AES-GCM ciphertext (tag appended).
    pub ciphertext: String,

    /// Base64 256-bit key.
    pub aes_key: SecretString,

    /// Base64 96-bit nonce.
    pub iv: SecretString,

    /// Model the client would like. Selects fallback-only mode when it names
    /// the fallback provider's model; never echoed back otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Skip the primary provider.
    #[serde(default, alias = "use_gemini_fallback", alias = "useFallback")]
    pub use_fallback: bool,

    /// Opaque client metadata. Accepted and ignored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}
