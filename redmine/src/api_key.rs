use std::fmt;

use aes_gcm::{
    aead::{Aead, OsRng, Payload},
    AeadCore, Aes256Gcm, Key, KeyInit, Nonce,
};
use base64::prelude::*;
use thiserror::Error;

const KEY_LEN: usize = 32;
const NONCE_LEN: usize = 12;

#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("API key secret is not configured")]
    MissingKey,
    #[error("API key secret must be a base64 encoded 32-byte key")]
    InvalidKey,
    #[error("Malformed encrypted API key: {0}")]
    MalformedCiphertext(String),
    #[error("Failed to encrypt API key")]
    EncryptionFailed,
    #[error("Failed to decrypt API key (wrong secret or username)")]
    DecryptionFailed,
}

/// Encrypts Redmine API keys at rest.
///
/// AES-256-GCM with a fresh nonce per call. The username the key belongs to is bound as
/// associated data, so a key encrypted for one user never decrypts for another.
/// Encrypted values have the form `base64(ciphertext):base64(nonce)`.
#[derive(Clone)]
pub struct ApiKeyCipher {
    cipher: Aes256Gcm,
}

impl fmt::Debug for ApiKeyCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKeyCipher").finish_non_exhaustive()
    }
}

impl ApiKeyCipher {
    pub fn new(key: [u8; KEY_LEN]) -> Self {
        let key = Key::<Aes256Gcm>::from_slice(&key);
        Self {
            cipher: Aes256Gcm::new(key),
        }
    }

    /// Builds a cipher from a base64 encoded secret, as stored in configuration.
    pub fn from_base64(secret: &str) -> Result<Self, CryptoError> {
        let secret = secret.trim();
        if secret.is_empty() {
            return Err(CryptoError::MissingKey);
        }

        let bytes = BASE64_STANDARD
            .decode(secret)
            .map_err(|_| CryptoError::InvalidKey)?;
        let key: [u8; KEY_LEN] = bytes.try_into().map_err(|_| CryptoError::InvalidKey)?;

        Ok(Self::new(key))
    }

    pub fn encrypt(&self, plaintext: &str, username: &str) -> Result<String, CryptoError> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng); // 96-bits; unique per message
        let ciphertext = self
            .cipher
            .encrypt(
                &nonce,
                Payload {
                    msg: plaintext.as_bytes(),
                    aad: username.as_bytes(),
                },
            )
            .map_err(|_| CryptoError::EncryptionFailed)?;

        let cipher_b64 = BASE64_STANDARD.encode(ciphertext);
        let nonce_b64 = BASE64_STANDARD.encode(nonce);
        Ok(format!("{cipher_b64}:{nonce_b64}"))
    }

    pub fn decrypt(&self, encrypted: &str, username: &str) -> Result<String, CryptoError> {
        let (cipher_b64, nonce_b64) = encrypted
            .trim()
            .split_once(':')
            .ok_or_else(|| CryptoError::MalformedCiphertext("missing nonce separator".into()))?;

        let cipher_bytes = BASE64_STANDARD
            .decode(cipher_b64)
            .map_err(|e| CryptoError::MalformedCiphertext(e.to_string()))?;
        let nonce_bytes = BASE64_STANDARD
            .decode(nonce_b64)
            .map_err(|e| CryptoError::MalformedCiphertext(e.to_string()))?;
        if nonce_bytes.len() != NONCE_LEN {
            return Err(CryptoError::MalformedCiphertext(format!(
                "expected a {NONCE_LEN}-byte nonce, got {}",
                nonce_bytes.len()
            )));
        }

        let nonce = Nonce::from_slice(&nonce_bytes);
        let decrypted = self
            .cipher
            .decrypt(
                nonce,
                Payload {
                    msg: &cipher_bytes,
                    aad: username.as_bytes(),
                },
            )
            .map_err(|_| CryptoError::DecryptionFailed)?;

        String::from_utf8(decrypted).map_err(|e| CryptoError::MalformedCiphertext(e.to_string()))
    }
}
