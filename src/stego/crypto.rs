// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Passphrase handling.
//!
//! The session key is an Argon2id digest of the passphrase with a fixed salt,
//! truncated to a `u64`. It is deterministic so the decoder can rebuild the
//! placement walk from the passphrase alone. The key only seeds the keyed
//! pixel hash; it does not encrypt anything.

use argon2::Argon2;
use zeroize::Zeroizing;

use crate::stego::error::StegoError;
use crate::stego::MIN_PASSPHRASE_CHARS;

/// Fixed salt for session key derivation.
const SESSION_KEY_SALT: &[u8; 16] = b"stegosaur-walk1\0";

/// Integer key shared by the keyed hash and the placement walk.
pub type SessionKey = u64;

/// Reject passphrases shorter than [`MIN_PASSPHRASE_CHARS`] characters.
pub fn validate_passphrase(passphrase: &str) -> Result<(), StegoError> {
    if passphrase.chars().count() < MIN_PASSPHRASE_CHARS {
        return Err(StegoError::PassphraseTooShort);
    }
    Ok(())
}

/// Derive the session key from a validated passphrase.
pub fn derive_session_key(passphrase: &str) -> Result<SessionKey, StegoError> {
    validate_passphrase(passphrase)?;
    let mut output = Zeroizing::new([0u8; 8]);
    Argon2::default()
        .hash_password_into(passphrase.as_bytes(), SESSION_KEY_SALT, &mut *output)
        .expect("Argon2 session key derivation should not fail");
    Ok(u64::from_be_bytes(*output))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_passphrase_rejected() {
        assert!(matches!(validate_passphrase("1234567"), Err(StegoError::PassphraseTooShort)));
        assert!(matches!(derive_session_key(""), Err(StegoError::PassphraseTooShort)));
        assert!(validate_passphrase("12345678").is_ok());
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        // 7 characters, 14 bytes
        assert!(validate_passphrase("ééééééé").is_err());
        assert!(validate_passphrase("éééééééé").is_ok());
    }

    #[test]
    fn key_deterministic() {
        let a = derive_session_key("correct horse").unwrap();
        let b = derive_session_key("correct horse").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn key_differs_by_passphrase() {
        let a = derive_session_key("passphrase-1").unwrap();
        let b = derive_session_key("passphrase-2").unwrap();
        assert_ne!(a, b);
    }
}
