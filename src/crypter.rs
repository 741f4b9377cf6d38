//! Reversible text encryption.
//!
//! The cipher key and IV are derived once from a passphrase and an IV seed,
//! then reused for every message. Blobs are base64 of AES-128-CBC output over
//! the UTF-16LE plaintext; they carry no salt and no authentication tag.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use aes::Aes128;
use aes::cipher::KeyInit;
use aes::cipher::generic_array::GenericArray;
use tracing::{Span, debug, error};
use zeroize::{Zeroize, Zeroizing};

use crate::crypto::{self, CRYPTER_ITERATIONS, CryptoError, IV_LEN, KEY_LEN, cipher, encoding};
use crate::error::{Error, Result};

/// Converts plain text into cipher text and back.
pub trait Crypter {
    /// Encrypts `plain_text` into a base64 blob. Empty text is returned as is.
    fn encrypt(&self, plain_text: &str) -> Result<String>;

    /// Decrypts a base64 blob. Empty text is returned as is.
    fn decrypt(&self, cipher_text: &str) -> Result<String>;

    /// Runs [`Crypter::encrypt`] on the blocking thread pool.
    fn encrypt_async(&self, plain_text: &str) -> impl Future<Output = Result<String>> + Send;

    /// Runs [`Crypter::decrypt`] on the blocking thread pool.
    fn decrypt_async(&self, cipher_text: &str) -> impl Future<Output = Result<String>> + Send;
}

struct KeyMaterial {
    cipher: Aes128,
    iv: [u8; IV_LEN],
}

impl Drop for KeyMaterial {
    fn drop(&mut self) {
        // the AES key schedule zeroizes itself
        self.iv.zeroize();
    }
}

/// AES-128-CBC crypter keyed by PBKDF2-HMAC-SHA1 (1000 rounds).
///
/// Clones share the same key material, which is wiped when the last clone
/// and the last in-flight async call are gone.
#[derive(Clone)]
pub struct AesCrypter {
    material: Arc<KeyMaterial>,
    span: Span,
}

impl fmt::Debug for AesCrypter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AesCrypter").finish_non_exhaustive()
    }
}

fn crypt_error(span: &Span, message: &'static str, source: CryptoError) -> Error {
    span.in_scope(|| error!(error = %source, "{message}"));
    Error::Crypt { message, source }
}

impl AesCrypter {
    /// Creates a crypter from a passphrase and an IV seed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Argument`] if `key` or `iv_seed` is empty.
    pub fn new(key: &str, iv_seed: &[u8]) -> Result<Self> {
        Self::with_span(key, iv_seed, tracing::debug_span!("aes_crypter"))
    }

    /// Like [`AesCrypter::new`], logging inside the given span.
    pub fn with_span(key: &str, iv_seed: &[u8], span: Span) -> Result<Self> {
        if key.is_empty() {
            return Err(Error::Argument("key"));
        }

        if iv_seed.is_empty() {
            return Err(Error::Argument("iv_seed"));
        }

        let mut derived = Zeroizing::new([0u8; KEY_LEN + IV_LEN]);
        crypto::derive_bytes(key, iv_seed, CRYPTER_ITERATIONS, derived.as_mut_slice())
            .map_err(|e| crypt_error(&span, "couldn't derive the cipher key", e))?;

        let cipher = Aes128::new(GenericArray::from_slice(&derived[..KEY_LEN]));
        let mut iv = [0u8; IV_LEN];
        iv.copy_from_slice(&derived[KEY_LEN..]);

        span.in_scope(|| debug!(iv_seed_len = iv_seed.len(), "derived cipher key and IV"));

        Ok(Self {
            material: Arc::new(KeyMaterial { cipher, iv }),
            span,
        })
    }

    /// Releases this handle to the key material.
    ///
    /// Equivalent to dropping the crypter; spelled out for call sites that
    /// want the release point visible.
    pub fn close(self) {
        drop(self);
    }

    fn try_decrypt(&self, cipher_text: &str) -> std::result::Result<String, CryptoError> {
        // '+' turns into ' ' when a blob goes through URL decoding
        let cipher_bytes = encoding::decode_base64(&cipher_text.replace(' ', "+"))?;
        let clear = cipher::decrypt(&self.material.cipher, &self.material.iv, &cipher_bytes)?;
        encoding::from_utf16le(&clear)
    }
}

fn offload<F>(
    crypter: AesCrypter,
    message: &'static str,
    work: F,
) -> impl Future<Output = Result<String>> + Send
where
    F: FnOnce(&AesCrypter) -> Result<String> + Send + 'static,
{
    async move {
        let span = crypter.span.clone();
        tokio::task::spawn_blocking(move || work(&crypter))
            .await
            .map_err(|e| crypt_error(&span, message, e.into()))?
    }
}

impl Crypter for AesCrypter {
    fn encrypt(&self, plain_text: &str) -> Result<String> {
        if plain_text.is_empty() {
            return Ok(plain_text.to_owned());
        }

        let clear = Zeroizing::new(encoding::to_utf16le(plain_text));
        let cipher_bytes = cipher::encrypt(&self.material.cipher, &self.material.iv, &clear);

        Ok(encoding::encode_base64(&cipher_bytes))
    }

    fn decrypt(&self, cipher_text: &str) -> Result<String> {
        if cipher_text.is_empty() {
            return Ok(cipher_text.to_owned());
        }

        self.try_decrypt(cipher_text)
            .map_err(|e| crypt_error(&self.span, "couldn't decrypt the text", e))
    }

    fn encrypt_async(&self, plain_text: &str) -> impl Future<Output = Result<String>> + Send {
        let plain_text = Zeroizing::new(plain_text.to_owned());
        offload(self.clone(), "couldn't encrypt the text", move |c| c.encrypt(&plain_text))
    }

    fn decrypt_async(&self, cipher_text: &str) -> impl Future<Output = Result<String>> + Send {
        let cipher_text = cipher_text.to_owned();
        offload(self.clone(), "couldn't decrypt the text", move |c| c.decrypt(&cipher_text))
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    const KEY: &str = "someKey";
    const IV_SEED: [u8; 8] = [1, 3, 5, 9, 1, 4, 5, 6];

    const VECTORS: [(&str, &str); 5] = [
        ("1", "7UIs0wu1iIcSN/CWdesFqg=="),
        ("some text", "qzV6b5LNgxmfu+GxxPkp9u0zLvhYqNBzsTmz/FMZfPM="),
        ("monday forecast", "dBWQgeNTz8PoPFkUd6QMoXNk1N+MWn/ZEh2VCc0+eBE="),
        (
            "a wonderful pony went to the candy valley",
            "dBvNuLulYeYIMI/k86pPhW1/uQNt0HFqZGE1RjdixIstxfdR/HdFxYG7TiUP80R5k0bCEr4mNF0G4F16lsjQaLGwNul8P2O9CSFucVxlclHoAANPItlAump6TfRQu5ww",
        ),
        (
            "A happy little tree",
            "GeUvzJXcLMR0uwieqQuJmEX48LcC+5anQNxRrQgPG5n3rDjhw/8sPkiTV3KacUwV",
        ),
    ];

    const TEXTS: [&str; 5] = [
        "some text",
        "monday forecast",
        "1",
        "a wonderful pony went to the candy valley",
        "zażółć gęślą jaźń 😀",
    ];

    fn sut() -> AesCrypter {
        AesCrypter::new(KEY, &IV_SEED).unwrap()
    }

    #[test]
    fn ctor_fails_when_arguments_empty() {
        let empty: &[u8] = &[];
        for (key, iv_seed) in [("", &IV_SEED[..]), (KEY, empty), ("", empty)] {
            match AesCrypter::new(key, iv_seed) {
                Err(Error::Argument(_)) => {}
                other => panic!("expected Argument error, got: {other:?}"),
            }
        }
    }

    #[test]
    fn ctor_names_the_empty_argument() {
        assert!(matches!(
            AesCrypter::new("", &IV_SEED),
            Err(Error::Argument("key"))
        ));
        assert!(matches!(
            AesCrypter::new(KEY, &[]),
            Err(Error::Argument("iv_seed"))
        ));
    }

    #[test]
    fn encrypt_and_decrypt_roundtrip() {
        let sut = sut();
        for text in TEXTS {
            let encrypted = sut.encrypt(text).unwrap();
            assert!(!encrypted.is_empty());
            assert_ne!(encrypted, text);
            assert_eq!(sut.decrypt(&encrypted).unwrap(), text);
        }
    }

    #[test]
    fn encrypt_reproduces_stored_blobs() {
        let sut = sut();
        for (plain, blob) in VECTORS {
            assert_eq!(sut.encrypt(plain).unwrap(), blob);
        }
    }

    #[test]
    fn decrypt_reads_stored_blobs() {
        let sut = sut();
        for (plain, blob) in VECTORS {
            assert_eq!(sut.decrypt(blob).unwrap(), plain);
        }
    }

    #[test]
    fn decrypt_restores_plus_signs_turned_into_spaces() {
        let mangled = "qzV6b5LNgxmfu GxxPkp9u0zLvhYqNBzsTmz/FMZfPM=";
        assert_eq!(sut().decrypt(mangled).unwrap(), "some text");
    }

    #[test]
    fn decrypt_ignores_line_breaks_in_blob() {
        assert_eq!(sut().decrypt("7UIs0wu1iIcSN/CWdesFqg==\n").unwrap(), "1");
        assert_eq!(
            sut().decrypt("qzV6b5LNgxmfu+GxxPkp9u0z\r\nLvhYqNBzsTmz/FMZfPM=").unwrap(),
            "some text"
        );
    }

    #[test]
    fn empty_text_passes_through() {
        let sut = sut();
        assert_eq!(sut.encrypt("").unwrap(), "");
        assert_eq!(sut.decrypt("").unwrap(), "");
    }

    #[test]
    fn decrypt_invalid_cipher_text_fails() {
        match sut().decrypt("invalid cipher text") {
            Err(Error::Crypt { source, .. }) => assert!(matches!(source, CryptoError::Base64)),
            other => panic!("expected Crypt error, got: {other:?}"),
        }
    }

    #[test]
    fn decrypt_truncated_blob_fails() {
        // valid base64, but not a whole number of blocks
        match sut().decrypt("AAECAwQFBgcICQ==") {
            Err(Error::Crypt { source, .. }) => {
                assert!(matches!(source, CryptoError::BlockLength(10)))
            }
            other => panic!("expected Crypt error, got: {other:?}"),
        }
    }

    #[test]
    fn decrypt_with_other_key_never_yields_plaintext() {
        let blob = sut().encrypt("some text").unwrap();
        let other = AesCrypter::new("otherKey", &IV_SEED).unwrap();

        assert!(!other.decrypt(&blob).is_ok_and(|t| t == "some text"));
    }

    #[test]
    fn error_does_not_leak_input() {
        let err = sut().decrypt("secretpayload!!!").unwrap_err();

        let mut chain = vec![err.to_string()];
        let mut source = err.source();
        while let Some(cause) = source {
            chain.push(cause.to_string());
            source = cause.source();
        }

        assert_eq!(chain[0], "couldn't decrypt the text");
        assert!(chain.iter().all(|m| !m.contains("secretpayload")));
    }

    #[test]
    fn clones_share_key_material_after_close() {
        let original = sut();
        let clone = original.clone();
        let blob = original.encrypt("some text").unwrap();

        original.close();

        assert_eq!(clone.decrypt(&blob).unwrap(), "some text");
    }

    #[test]
    fn concurrent_use_of_one_instance() {
        let sut = sut();

        std::thread::scope(|s| {
            for text in TEXTS {
                let sut = &sut;
                s.spawn(move || {
                    for _ in 0..20 {
                        let blob = sut.encrypt(text).unwrap();
                        assert_eq!(sut.decrypt(&blob).unwrap(), text);
                    }
                });
            }
        });
    }

    #[tokio::test]
    async fn async_matches_sync() {
        let sut = sut();
        for text in TEXTS {
            let encrypted = sut.encrypt_async(text).await.unwrap();
            assert_eq!(encrypted, sut.encrypt(text).unwrap());
            assert_eq!(sut.decrypt_async(&encrypted).await.unwrap(), text);
        }
    }

    #[tokio::test]
    async fn async_empty_text_passes_through() {
        let sut = sut();
        assert_eq!(sut.encrypt_async("").await.unwrap(), "");
        assert_eq!(sut.decrypt_async("").await.unwrap(), "");
    }

    #[tokio::test]
    async fn async_decrypt_invalid_cipher_text_fails() {
        assert!(matches!(
            sut().decrypt_async("invalid cipher text").await,
            Err(Error::Crypt { .. })
        ));
    }

    #[tokio::test]
    async fn async_calls_run_side_by_side() {
        let sut = sut();
        let (a, b) = tokio::join!(sut.encrypt_async("1"), sut.encrypt_async("some text"));

        assert_eq!(a.unwrap(), VECTORS[0].1);
        assert_eq!(b.unwrap(), VECTORS[1].1);
    }
}
