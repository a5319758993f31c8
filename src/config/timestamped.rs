//! Timestamped configuration
//!
//! A [`ValueCodec`] decides how the facade turns a value into what the
//! backend stores and back. The plain codec stores values untouched; the
//! timestamp codecs append the modification time, either as plain
//! `value::seconds` text or as a signed [`TimestampSigner`] token.

use super::facade::Config;
use crate::backend::{Backend, MemoryBackend};
use crate::error::Result;
use crate::signing::{TimestampSigner, SEPARATOR};
use crate::utils::datetime::format_seconds;
use crate::value::Value;
use std::ops::{Deref, DerefMut};

/// Encoding between facade values and stored values
pub trait ValueCodec {
    fn encode(&self, value: Value, timestamp: f64) -> Result<Value>;

    fn decode(&self, stored: Value) -> Result<Value>;

    /// Timestamp embedded in a stored value, if any
    fn timestamp(&self, stored: &Value) -> Result<Option<f64>>;
}

/// Stores values as they are
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainCodec;

impl ValueCodec for PlainCodec {
    fn encode(&self, value: Value, _timestamp: f64) -> Result<Value> {
        Ok(value)
    }

    fn decode(&self, stored: Value) -> Result<Value> {
        Ok(stored)
    }

    fn timestamp(&self, _stored: &Value) -> Result<Option<f64>> {
        Ok(None)
    }
}

/// Stores `value + separator + epoch seconds`
#[derive(Debug, Clone)]
pub struct TimestampCodec {
    separator: String,
}

impl TimestampCodec {
    pub fn new() -> Self {
        Self::with_separator(SEPARATOR)
    }

    pub fn with_separator<S: Into<String>>(separator: S) -> Self {
        Self {
            separator: separator.into(),
        }
    }

    /// Split stored text into the value and its timestamp, if one is present
    pub fn split(&self, stored: &str) -> (String, Option<f64>) {
        match stored.rsplit_once(self.separator.as_str()) {
            Some((value, ts)) => match ts.parse::<f64>() {
                Ok(ts) => (value.to_string(), Some(ts)),
                Err(_) => (stored.to_string(), None),
            },
            None => (stored.to_string(), None),
        }
    }

    pub fn join(&self, value: &Value, timestamp: f64) -> String {
        format!("{}{}{}", value, self.separator, format_seconds(timestamp))
    }
}

impl Default for TimestampCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl ValueCodec for TimestampCodec {
    fn encode(&self, value: Value, timestamp: f64) -> Result<Value> {
        Ok(Value::Str(self.join(&value, timestamp)))
    }

    fn decode(&self, stored: Value) -> Result<Value> {
        Ok(Value::Str(self.split(&stored.to_text()).0))
    }

    fn timestamp(&self, stored: &Value) -> Result<Option<f64>> {
        Ok(self.split(&stored.to_text()).1)
    }
}

/// Stores a signed `value::b64(seconds)::signature` token
#[derive(Debug, Clone, Default)]
pub struct SignedTimestampCodec {
    signer: TimestampSigner,
}

impl SignedTimestampCodec {
    pub fn new(signer: TimestampSigner) -> Self {
        Self { signer }
    }
}

impl ValueCodec for SignedTimestampCodec {
    fn encode(&self, value: Value, timestamp: f64) -> Result<Value> {
        Ok(Value::Str(self.signer.sign_at(&value.to_text(), timestamp)?))
    }

    fn decode(&self, stored: Value) -> Result<Value> {
        let (value, _) = self.signer.unsign(&stored.to_text())?;
        Ok(Value::Str(value))
    }

    fn timestamp(&self, stored: &Value) -> Result<Option<f64>> {
        let (_, timestamp) = self.signer.unsign(&stored.to_text())?;
        Ok(Some(timestamp))
    }
}

/// A [`Config`] that records when each value was set
///
/// `get` returns only the value part as text; `last_modified` returns the
/// recorded time. All other facade operations are reached through `Deref`.
pub struct TimestampedConfig<B: Backend = MemoryBackend> {
    inner: Config<B>,
}

impl TimestampedConfig<MemoryBackend> {
    pub fn memory() -> Self {
        Self::new(MemoryBackend::new())
    }
}

impl<B: Backend> TimestampedConfig<B> {
    /// Plain `value::seconds` encoding
    pub fn new(backend: B) -> Self {
        Self::wrap(Config::new(backend), TimestampCodec::new())
    }

    /// HMAC-signed timestamp tokens
    pub fn signed(backend: B) -> Self {
        Self::wrap(Config::new(backend), SignedTimestampCodec::default())
    }

    /// Re-bind an existing facade to a timestamp codec
    pub fn wrap<C: ValueCodec + 'static>(config: Config<B>, codec: C) -> Self {
        Self {
            inner: config.with_codec(codec),
        }
    }

    /// Set a value recorded as modified at `timestamp`
    pub fn set_at<V: Into<Value>>(&mut self, key: &str, value: V, timestamp: f64) -> Result<()> {
        self.inner.store(key, value.into(), timestamp)
    }

    pub fn into_inner(self) -> Config<B> {
        self.inner
    }
}

impl<B: Backend> Deref for TimestampedConfig<B> {
    type Target = Config<B>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl<B: Backend> DerefMut for TimestampedConfig<B> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_value() {
        let codec = TimestampCodec::new();
        assert_eq!(
            codec.join(&Value::from("myvalue"), 1_400_000_000.0),
            "myvalue::1400000000"
        );
        assert_eq!(codec.join(&Value::from("myvalue"), 0.0), "myvalue::0");
    }

    #[test]
    fn test_split_value() {
        let codec = TimestampCodec::new();
        assert_eq!(
            codec.split("myvalue::1400000001"),
            ("myvalue".to_string(), Some(1_400_000_001.0))
        );
        assert_eq!(codec.split("myvalue"), ("myvalue".to_string(), None));
        assert_eq!(
            codec.split("url::not-a-time"),
            ("url::not-a-time".to_string(), None)
        );
    }

    #[test]
    fn test_join_then_split() {
        let codec = TimestampCodec::with_separator("@@");
        let stored = codec.join(&Value::from("myvalue2"), 1_500_000_000.0);
        assert_eq!(
            codec.split(&stored),
            ("myvalue2".to_string(), Some(1_500_000_000.0))
        );
    }

    #[test]
    fn test_signed_codec_rejects_edits() {
        let codec = SignedTimestampCodec::default();
        let stored = codec.encode(Value::from("v"), 1_000.0).unwrap();
        assert_eq!(codec.timestamp(&stored).unwrap(), Some(1_000.0));

        let edited = Value::Str(stored.to_text().replacen('v', "w", 1));
        assert!(codec.decode(edited).is_err());
    }
}
