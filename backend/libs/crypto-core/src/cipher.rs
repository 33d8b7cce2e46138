//! AES-256-CFB message encryption.
//!
//! Wire format is two hex strings: the ciphertext (same length as the
//! plaintext) and the 16-byte IV. There is no authentication tag, so a wrong
//! key or IV decrypts to garbage instead of failing.

use crate::key::MessageKey;
use crate::CryptoError;
use aes::Aes256;
use cfb_mode::cipher::{AsyncStreamCipher, KeyIvInit};
use rand::{rngs::OsRng, RngCore};

type Aes256CfbEnc = cfb_mode::Encryptor<Aes256>;
type Aes256CfbDec = cfb_mode::Decryptor<Aes256>;

/// IV length in bytes (one AES block).
pub const IV_LEN: usize = 16;

/// Hex-encoded ciphertext together with the IV it was produced under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedMessage {
    pub ciphertext_hex: String,
    pub iv_hex: String,
}

pub fn generate_iv() -> [u8; IV_LEN] {
    let mut iv = [0u8; IV_LEN];
    OsRng.fill_bytes(&mut iv);
    iv
}

/// Encrypt `plaintext` under `key` with a fresh random IV.
pub fn encrypt(plaintext: &str, key: &MessageKey) -> EncryptedMessage {
    encrypt_with_iv(plaintext, key, &generate_iv())
}

pub(crate) fn encrypt_with_iv(
    plaintext: &str,
    key: &MessageKey,
    iv: &[u8; IV_LEN],
) -> EncryptedMessage {
    let mut buf = plaintext.as_bytes().to_vec();
    Aes256CfbEnc::new(&(*key.as_bytes()).into(), &(*iv).into()).encrypt(&mut buf);
    EncryptedMessage {
        ciphertext_hex: hex::encode(buf),
        iv_hex: hex::encode(iv),
    }
}

/// Decrypt a hex ciphertext with its hex IV.
///
/// Malformed hex and IVs that are not exactly [`IV_LEN`] bytes are errors.
/// The recovered bytes are read as UTF-8 lossily.
pub fn decrypt(ciphertext_hex: &str, iv_hex: &str, key: &MessageKey) -> Result<String, CryptoError> {
    let mut buf = hex::decode(ciphertext_hex)?;
    let iv_bytes = hex::decode(iv_hex)?;
    let iv: [u8; IV_LEN] = iv_bytes
        .as_slice()
        .try_into()
        .map_err(|_| CryptoError::InvalidIvLength {
            expected: IV_LEN,
            actual: iv_bytes.len(),
        })?;

    Aes256CfbDec::new(&(*key.as_bytes()).into(), &iv.into()).decrypt(&mut buf);
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::derive_key;

    fn key() -> MessageKey {
        derive_key("u1", "s3cr3t").unwrap()
    }

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let key = key();
        let encrypted = encrypt("hello", &key);
        assert_eq!(encrypted.ciphertext_hex.len(), 10);
        assert_eq!(encrypted.iv_hex.len(), IV_LEN * 2);

        let decrypted = decrypt(&encrypted.ciphertext_hex, &encrypted.iv_hex, &key).unwrap();
        assert_eq!(decrypted, "hello");
    }

    #[test]
    fn test_roundtrip_multibyte_and_empty() {
        let key = key();
        for plaintext in ["", "a", "héllo wörld ✓", &"x".repeat(1000)] {
            let encrypted = encrypt(plaintext, &key);
            assert_eq!(encrypted.ciphertext_hex.len(), plaintext.len() * 2);
            assert_eq!(
                decrypt(&encrypted.ciphertext_hex, &encrypted.iv_hex, &key).unwrap(),
                plaintext
            );
        }
    }

    #[test]
    fn test_fresh_iv_per_call() {
        let key = key();
        let a = encrypt("same message", &key);
        let b = encrypt("same message", &key);
        assert_ne!(a.iv_hex, b.iv_hex);
        assert_ne!(a.ciphertext_hex, b.ciphertext_hex);
    }

    #[test]
    fn test_fixed_iv_is_deterministic() {
        let key = key();
        let iv = [7u8; IV_LEN];
        assert_eq!(
            encrypt_with_iv("hello", &key, &iv),
            encrypt_with_iv("hello", &key, &iv)
        );
    }

    #[test]
    fn test_tampered_iv_yields_different_plaintext() {
        let key = key();
        let encrypted = encrypt("attack at dawn", &key);
        let mut iv = hex::decode(&encrypted.iv_hex).unwrap();
        iv[0] ^= 0x01;

        let decrypted = decrypt(&encrypted.ciphertext_hex, &hex::encode(iv), &key).unwrap();
        assert_ne!(decrypted, "attack at dawn");
    }

    #[test]
    fn test_wrong_key_is_not_an_error() {
        let encrypted = encrypt("attack at dawn", &key());
        let other = derive_key("u2", "s3cr3t").unwrap();
        let decrypted = decrypt(&encrypted.ciphertext_hex, &encrypted.iv_hex, &other).unwrap();
        assert_ne!(decrypted, "attack at dawn");
    }

    #[test]
    fn test_malformed_hex_is_decode_error() {
        let key = key();
        let encrypted = encrypt("hello", &key);

        assert!(matches!(
            decrypt("abc", &encrypted.iv_hex, &key),
            Err(CryptoError::Decode(_))
        ));
        assert!(matches!(
            decrypt("zz", &encrypted.iv_hex, &key),
            Err(CryptoError::Decode(_))
        ));
        assert!(matches!(
            decrypt(&encrypted.ciphertext_hex, "not-hex", &key),
            Err(CryptoError::Decode(_))
        ));
    }

    #[test]
    fn test_short_iv_rejected() {
        let key = key();
        let encrypted = encrypt("hello", &key);
        let err = decrypt(&encrypted.ciphertext_hex, "00ff", &key).unwrap_err();
        assert_eq!(
            err,
            CryptoError::InvalidIvLength {
                expected: 16,
                actual: 2
            }
        );
    }
}
