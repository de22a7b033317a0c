//! PIN hashing.
//!
//! A PIN is 4-6 digits, so the keyspace is at most a million values and no
//! hash makes it resistant to an offline attacker holding the device. The
//! salt keeps equal PINs from producing equal records and the derivation keeps
//! the digits out of plain sight in storage.

use rand::RngCore;
use subtle::ConstantTimeEq;

use crate::constants::{KDF_CONTEXT_PIN, PIN_MAX_LEN, PIN_MIN_LEN, PIN_SALT_SIZE};
use crate::error::ValidationError;

const SEPARATOR: char = '$';

pub fn validate_pin(pin: &str) -> Result<(), ValidationError> {
    if !pin.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::PinNotNumeric);
    }
    if pin.len() < PIN_MIN_LEN {
        return Err(ValidationError::PinTooShort);
    }
    if pin.len() > PIN_MAX_LEN {
        return Err(ValidationError::PinTooLong);
    }
    Ok(())
}

fn derive(salt: &[u8], pin: &str) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new_derive_key(KDF_CONTEXT_PIN);
    hasher.update(salt);
    hasher.update(pin.as_bytes());
    *hasher.finalize().as_bytes()
}

/// Salted hash encoded as `hex(salt)$hex(digest)`.
pub fn hash_pin(pin: &str) -> String {
    let mut salt = [0u8; PIN_SALT_SIZE];
    rand::rngs::OsRng.fill_bytes(&mut salt);
    format!(
        "{}{}{}",
        hex::encode(salt),
        SEPARATOR,
        hex::encode(derive(&salt, pin))
    )
}

/// Check `pin` against a value produced by [`hash_pin`]. Malformed stored
/// values never verify.
pub fn verify_pin(pin: &str, stored: &str) -> bool {
    let Some((salt_hex, digest_hex)) = stored.split_once(SEPARATOR) else {
        return false;
    };
    let (Ok(salt), Ok(expected)) = (hex::decode(salt_hex), hex::decode(digest_hex)) else {
        return false;
    };
    if salt.len() != PIN_SALT_SIZE || expected.len() != 32 {
        return false;
    }

    derive(&salt, pin)[..].ct_eq(&expected[..]).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_roundtrip() {
        for pin in ["0000", "1234", "98765", "000000", "424242"] {
            let stored = hash_pin(pin);
            assert!(verify_pin(pin, &stored), "{pin} should verify");
        }
    }

    #[test]
    fn test_wrong_pin_rejected() {
        let stored = hash_pin("1234");
        assert!(!verify_pin("1235", &stored));
        assert!(!verify_pin("12345", &stored));
        assert!(!verify_pin("", &stored));
    }

    #[test]
    fn test_hash_is_salted() {
        let a = hash_pin("1234");
        let b = hash_pin("1234");
        assert_ne!(a, b);
        let (salt_hex, digest_hex) = a.split_once('$').unwrap();
        assert_eq!(salt_hex.len(), PIN_SALT_SIZE * 2);
        assert_eq!(digest_hex.len(), 64);
    }

    #[test]
    fn test_malformed_stored_value() {
        assert!(!verify_pin("1234", ""));
        assert!(!verify_pin("1234", "nohash"));
        assert!(!verify_pin("1234", "zz$zz"));
        assert!(!verify_pin("1234", "abcd$abcd"));
    }

    #[test]
    fn test_validate_pin() {
        assert_eq!(validate_pin("123"), Err(ValidationError::PinTooShort));
        assert_eq!(validate_pin("1234567"), Err(ValidationError::PinTooLong));
        assert_eq!(validate_pin("12a4"), Err(ValidationError::PinNotNumeric));
        assert!(validate_pin("1234").is_ok());
        assert!(validate_pin("123456").is_ok());
    }
}
