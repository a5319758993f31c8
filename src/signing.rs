//! HMAC signing for tamper detection
//!
//! The signers in this module detect values that were edited outside of the
//! program. They are not meant to be cryptographically secure: the keys are
//! compiled into the crate, so anyone with the source can forge a signature.

use crate::error::{ConfVaultError, Result};
use crate::utils::datetime::{format_seconds, now_seconds};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use sha1::{Digest, Sha1};

type HmacSha1 = Hmac<Sha1>;

/// Salt used when none is given
pub const DEFAULT_SALT: &str = "confvault.signing";

/// Separator between the value, the timestamp and the signature
pub const SEPARATOR: &str = "::";

/// Fixed key for structured-backend entry signatures
const ENTRY_DOMAIN_KEY: &[u8] = b"confvault.structured-entry.v1";

fn hmac_sha1(key: &[u8], parts: &[&[u8]]) -> Result<String> {
    let mut mac = HmacSha1::new_from_slice(key)
        .map_err(|e| ConfVaultError::signature(format!("Invalid HMAC key: {e}")))?;
    for part in parts {
        mac.update(part);
    }
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// Signature for one stored entry, computed over its name, text and type tag
pub fn entry_signature(name: &str, value: &str, type_tag: &str) -> Result<String> {
    hmac_sha1(
        ENTRY_DOMAIN_KEY,
        &[name.as_bytes(), value.as_bytes(), type_tag.as_bytes()],
    )
}

/// Appends an HMAC-SHA1 signature to a value: `value::signature`
#[derive(Debug, Clone)]
pub struct Signer {
    key: Vec<u8>,
    salt: String,
}

impl Signer {
    /// Create a signer with an empty key and the default salt
    pub fn new() -> Self {
        Self::with_key("", None)
    }

    /// Create a signer with an explicit key and optional salt
    pub fn with_key<K: AsRef<[u8]>>(key: K, salt: Option<&str>) -> Self {
        Self {
            key: key.as_ref().to_vec(),
            salt: salt.unwrap_or(DEFAULT_SALT).to_string(),
        }
    }

    /// Produce `value + SEPARATOR + signature`
    pub fn sign(&self, value: &str) -> Result<String> {
        let signature = self.signature(value)?;
        Ok(format!("{value}{SEPARATOR}{signature}"))
    }

    /// Recover the value from a signed text, failing if the signature is wrong
    pub fn unsign(&self, signed: &str) -> Result<String> {
        let (value, signature) = signed
            .rsplit_once(SEPARATOR)
            .ok_or_else(|| ConfVaultError::signature("No signature separator found"))?;

        if !self.validate(value, signature) {
            return Err(ConfVaultError::signature(
                "Could not validate signature of field",
            ));
        }
        Ok(value.to_string())
    }

    /// Check a signature against a freshly computed one
    pub fn validate(&self, value: &str, signature: &str) -> bool {
        match self.signature(value) {
            Ok(expected) => {
                tracing::debug!("Comparing signatures: {} =? {}", signature, expected);
                expected == signature
            }
            Err(_) => false,
        }
    }

    fn signature(&self, value: &str) -> Result<String> {
        let mut hasher = Sha1::new();
        hasher.update(self.salt.as_bytes());
        hasher.update(&self.key);
        let derived = hasher.finalize();
        hmac_sha1(&derived, &[value.as_bytes()])
    }
}

impl Default for Signer {
    fn default() -> Self {
        Self::new()
    }
}

/// Signer that embeds a timestamp: `value::b64(timestamp)::signature`
#[derive(Debug, Clone, Default)]
pub struct TimestampSigner {
    signer: Signer,
}

impl TimestampSigner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key<K: AsRef<[u8]>>(key: K, salt: Option<&str>) -> Self {
        Self {
            signer: Signer::with_key(key, salt),
        }
    }

    /// Sign a value stamped with the current time
    pub fn sign(&self, value: &str) -> Result<String> {
        self.sign_at(value, now_seconds())
    }

    /// Sign a value stamped with an explicit epoch timestamp
    pub fn sign_at(&self, value: &str, timestamp: f64) -> Result<String> {
        let stamped = format!("{value}{SEPARATOR}{}", Self::encode_timestamp(timestamp));
        self.signer.sign(&stamped)
    }

    /// Recover `(value, timestamp)` from a signed token
    pub fn unsign(&self, token: &str) -> Result<(String, f64)> {
        let stamped = self.signer.unsign(token)?;
        let (value, encoded) = stamped
            .rsplit_once(SEPARATOR)
            .ok_or_else(|| ConfVaultError::signature("No timestamp found in signed value"))?;
        Ok((value.to_string(), Self::decode_timestamp(encoded)?))
    }

    pub fn encode_timestamp(timestamp: f64) -> String {
        STANDARD.encode(format_seconds(timestamp))
    }

    pub fn decode_timestamp(encoded: &str) -> Result<f64> {
        let raw = STANDARD
            .decode(encoded)
            .map_err(|e| ConfVaultError::signature(format!("Invalid timestamp encoding: {e}")))?;
        String::from_utf8_lossy(&raw)
            .parse::<f64>()
            .map_err(|e| ConfVaultError::signature(format!("Invalid timestamp: {e}")))
    }
}
