//! Timestamped facade tests

use confvault::backend::{Backend, OrderedFileBackend};
use confvault::config::{OptionSpec, SignedTimestampCodec, TimestampedConfig};
use confvault::signing::TimestampSigner;
use confvault::{ConfVaultError, Value};
use tempfile::TempDir;

#[cfg(test)]
mod timestamped_config_tests {
    use super::*;

    #[test]
    fn test_set_at_then_read_back() {
        let mut cfg = TimestampedConfig::memory();
        cfg.set_at("mykey", "myvalue", 1_400_000_000.0).unwrap();

        assert_eq!(cfg.get("mykey").unwrap(), Value::from("myvalue"));
        assert_eq!(cfg.last_modified("mykey").unwrap(), Some(1_400_000_000.0));
        assert_eq!(
            cfg.backend().get("mykey").unwrap(),
            Value::from("myvalue::1400000000")
        );
    }

    #[test]
    fn test_set_uses_time_of_set() {
        let mut cfg = TimestampedConfig::memory();
        let before = confvault::utils::datetime::now_seconds();
        cfg.set("k", 12).unwrap();
        let after = confvault::utils::datetime::now_seconds();

        let stamped = cfg.last_modified("k").unwrap().unwrap();
        assert!(stamped >= before && stamped <= after);
        assert_eq!(cfg.get("k").unwrap(), Value::from("12"));
        assert_eq!(cfg.last_modified("k").unwrap(), Some(stamped));
    }

    #[test]
    fn test_value_without_timestamp() {
        let mut cfg = TimestampedConfig::memory();
        cfg.backend_mut()
            .set("legacy", Value::from("plain"))
            .unwrap();
        assert_eq!(cfg.get("legacy").unwrap(), Value::from("plain"));
        assert_eq!(cfg.last_modified("legacy").unwrap(), None);
    }

    #[test]
    fn test_values_containing_separator() {
        let mut cfg = TimestampedConfig::memory();
        cfg.set_at("url", "redis://host::6379", 5.0).unwrap();
        assert_eq!(cfg.get("url").unwrap(), Value::from("redis://host::6379"));
        assert_eq!(cfg.last_modified("url").unwrap(), Some(5.0));
    }

    #[test]
    fn test_persisted_timestamps() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("stamps.json");

        let mut cfg = TimestampedConfig::new(OrderedFileBackend::open(&path).unwrap());
        cfg.set_at("a", "1", 100.0).unwrap();
        cfg.close().unwrap();

        let cfg = TimestampedConfig::new(OrderedFileBackend::open(&path).unwrap());
        assert_eq!(cfg.try_get("a").unwrap(), Some(Value::from("1")));
        assert_eq!(cfg.last_modified("a").unwrap(), Some(100.0));
    }

    #[test]
    fn test_prompted_values_are_stamped() {
        let mut cfg = TimestampedConfig::memory();
        cfg.enable_batch();
        cfg.add_option(OptionSpec::new("mode").default("safe")).unwrap();

        assert_eq!(cfg.get("mode").unwrap(), Value::from("safe"));
        assert!(cfg.last_modified("mode").unwrap().is_some());
    }
}

#[cfg(test)]
mod signed_timestamp_tests {
    use super::*;

    #[test]
    fn test_signed_round_trip() {
        let mut cfg = TimestampedConfig::signed(confvault::backend::MemoryBackend::new());
        cfg.set_at("k", "v", 42.0).unwrap();
        assert_eq!(cfg.get("k").unwrap(), Value::from("v"));
        assert_eq!(cfg.last_modified("k").unwrap(), Some(42.0));
    }

    #[test]
    fn test_tampered_token_is_signature_error() {
        let mut cfg = TimestampedConfig::signed(confvault::backend::MemoryBackend::new());
        cfg.set_at("k", "v", 42.0).unwrap();

        let token = cfg.backend().get("k").unwrap().to_text();
        let tampered = format!("w{}", &token[1..]);
        cfg.backend_mut().set("k", Value::from(tampered)).unwrap();

        assert!(matches!(cfg.get("k"), Err(ConfVaultError::SignatureError(_))));
        assert!(matches!(
            cfg.last_modified("k"),
            Err(ConfVaultError::SignatureError(_))
        ));
    }

    #[test]
    fn test_custom_signer_key() {
        let signer = TimestampSigner::with_key("app-key", None);
        let cfg = confvault::Config::memory().with_batch(true);
        let mut cfg = TimestampedConfig::wrap(cfg, SignedTimestampCodec::new(signer.clone()));
        cfg.set_at("k", "v", 7.0).unwrap();

        let token = cfg.backend().get("k").unwrap().to_text();
        assert_eq!(signer.unsign(&token).unwrap(), ("v".to_string(), 7.0));
        assert!(TimestampSigner::new().unsign(&token).is_err());
    }
}
