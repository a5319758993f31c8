//! Signer and TimestampSigner tests
//!
//! The central property: changing any single character of a signed token
//! makes `unsign` fail with `SignatureError`.

use confvault::signing::{Signer, TimestampSigner};
use confvault::ConfVaultError;
use proptest::prelude::*;

/// Replace the character at `index` with a different one
fn tamper(token: &str, index: usize, replacement: char) -> String {
    token
        .chars()
        .enumerate()
        .map(|(i, c)| {
            if i != index {
                c
            } else if c == replacement {
                if c == 'x' {
                    'y'
                } else {
                    'x'
                }
            } else {
                replacement
            }
        })
        .collect()
}

#[cfg(test)]
mod timestamp_signer_tests {
    use super::*;

    #[test]
    fn test_sign_then_unsign() {
        let signer = TimestampSigner::new();
        let token = signer.sign("hello").unwrap();
        let (value, ts) = signer.unsign(&token).unwrap();
        assert_eq!(value, "hello");
        assert!(ts > 0.0);
    }

    #[test]
    fn test_one_corrupted_byte_fails() {
        let signer = TimestampSigner::new();
        let token = signer.sign("hello").unwrap();

        let corrupted = tamper(&token, 0, 'j');
        assert!(matches!(
            signer.unsign(&corrupted),
            Err(ConfVaultError::SignatureError(_))
        ));
    }

    #[test]
    fn test_explicit_timestamp_survives() {
        let signer = TimestampSigner::new();
        let token = signer.sign_at("value", 1_234_567_890.5).unwrap();
        assert_eq!(
            signer.unsign(&token).unwrap(),
            ("value".to_string(), 1_234_567_890.5)
        );
    }

    #[test]
    fn test_values_containing_separator() {
        let signer = TimestampSigner::new();
        let token = signer.sign_at("redis://host::6379", 10.0).unwrap();
        assert_eq!(signer.unsign(&token).unwrap().0, "redis://host::6379");
    }

    #[test]
    fn test_different_keys_do_not_verify() {
        let token = TimestampSigner::with_key("one", None).sign("v").unwrap();
        assert!(TimestampSigner::with_key("two", None).unsign(&token).is_err());
        assert!(TimestampSigner::with_key("one", Some("other-salt"))
            .unsign(&token)
            .is_err());
        assert!(TimestampSigner::with_key("one", None).unsign(&token).is_ok());
    }

    #[test]
    fn test_timestamp_encoding() {
        let encoded = TimestampSigner::encode_timestamp(1_400_000_000.0);
        assert_eq!(
            TimestampSigner::decode_timestamp(&encoded).unwrap(),
            1_400_000_000.0
        );
        assert!(TimestampSigner::decode_timestamp("%%%").is_err());
    }
}

#[cfg(test)]
mod signer_tests {
    use super::*;

    #[test]
    fn test_sign_layout() {
        let signer = Signer::new();
        let signed = signer.sign("value").unwrap();
        let (value, signature) = signed.rsplit_once("::").unwrap();
        assert_eq!(value, "value");
        assert!(signer.validate(value, signature));
        assert!(!signer.validate("other", signature));
    }

    #[test]
    fn test_missing_separator() {
        assert!(matches!(
            Signer::new().unsign("no separator here"),
            Err(ConfVaultError::SignatureError(_))
        ));
    }

    #[test]
    fn test_empty_value() {
        let signer = Signer::new();
        let signed = signer.sign("").unwrap();
        assert_eq!(signer.unsign(&signed).unwrap(), "");
    }
}

proptest! {
    #[test]
    fn prop_signer_detects_single_char_edit(
        value in "[a-zA-Z0-9 ./:_-]{0,40}",
        index in any::<prop::sample::Index>(),
        replacement in proptest::char::range('!', '~'),
    ) {
        let signer = Signer::with_key("secret", None);
        let signed = signer.sign(&value).unwrap();
        let position = index.index(signed.chars().count());
        let tampered = tamper(&signed, position, replacement);

        prop_assert_ne!(&tampered, &signed);
        prop_assert!(matches!(
            signer.unsign(&tampered),
            Err(ConfVaultError::SignatureError(_))
        ));
    }

    #[test]
    fn prop_timestamp_signer_detects_single_char_edit(
        value in "[a-zA-Z0-9 ./_-]{1,40}",
        timestamp in 0u32..2_000_000_000u32,
        index in any::<prop::sample::Index>(),
        replacement in proptest::char::range('!', '~'),
    ) {
        let signer = TimestampSigner::new();
        let token = signer.sign_at(&value, f64::from(timestamp)).unwrap();
        let position = index.index(token.chars().count());
        let tampered = tamper(&token, position, replacement);

        prop_assert!(matches!(
            signer.unsign(&tampered),
            Err(ConfVaultError::SignatureError(_))
        ));
    }

    #[test]
    fn prop_timestamp_signer_round_trip(
        value in ".{0,40}",
        timestamp in 0u32..2_000_000_000u32,
    ) {
        let signer = TimestampSigner::with_key("k", None);
        let token = signer.sign_at(&value, f64::from(timestamp)).unwrap();
        let (recovered, ts) = signer.unsign(&token).unwrap();
        prop_assert_eq!(recovered, value);
        prop_assert_eq!(ts, f64::from(timestamp));
    }
}
