//! One-way password hashing with a fresh salt per hash.

use std::future::Future;

use tracing::{Span, error};
use zeroize::Zeroizing;

use crate::crypto::{self, CryptoError, HASH_ITERATIONS, HASH_LEN, HashBlob, encoding};
use crate::error::{Error, Result};

/// Converts a password into a hash (one way only) and checks passwords against it.
pub trait Hasher {
    /// Hashes `password_text` with a new random salt. The empty password is valid.
    fn hash_password(&self, password_text: &str) -> Result<String>;

    /// Returns `true` if `password_text` produces the hash stored in `password_hash`.
    ///
    /// A mismatch is `Ok(false)`; a malformed `password_hash` is an error.
    fn compare_password_to_hash(&self, password_text: &str, password_hash: &str) -> Result<bool>;

    /// Runs [`Hasher::hash_password`] on the blocking thread pool.
    fn hash_password_async(
        &self,
        password_text: &str,
    ) -> impl Future<Output = Result<String>> + Send;

    /// Runs [`Hasher::compare_password_to_hash`] on the blocking thread pool.
    fn compare_password_to_hash_async(
        &self,
        password_text: &str,
        password_hash: &str,
    ) -> impl Future<Output = Result<bool>> + Send;
}

/// PBKDF2-HMAC-SHA1 hasher, 100000 rounds, 20-byte salt, 20-byte hash.
#[derive(Debug, Clone)]
pub struct Pbkdf2Hasher {
    span: Span,
}

impl Default for Pbkdf2Hasher {
    fn default() -> Self {
        Self::new()
    }
}

fn hash_error(span: &Span, message: &'static str, source: CryptoError) -> Error {
    span.in_scope(|| error!(error = %source, "{message}"));
    Error::Hash { message, source }
}

fn derive_hash(
    password_text: &str,
    salt: &[u8],
) -> std::result::Result<[u8; HASH_LEN], CryptoError> {
    let mut hash = [0u8; HASH_LEN];
    crypto::derive_bytes(password_text, salt, HASH_ITERATIONS, &mut hash)?;
    Ok(hash)
}

impl Pbkdf2Hasher {
    /// Creates a hasher that logs inside a `pbkdf2_hasher` debug span.
    pub fn new() -> Self {
        Self::with_span(tracing::debug_span!("pbkdf2_hasher"))
    }

    /// Creates a hasher that logs inside the given span.
    pub fn with_span(span: Span) -> Self {
        Self { span }
    }

    fn try_hash(password_text: &str) -> std::result::Result<String, CryptoError> {
        let salt = crypto::generate_salt()?;
        let hash = derive_hash(password_text, &salt)?;

        Ok(encoding::encode_base64(&HashBlob::new(salt, hash).to_bytes()))
    }

    fn try_compare(
        password_text: &str,
        password_hash: &str,
    ) -> std::result::Result<bool, CryptoError> {
        let bytes = encoding::decode_base64(password_hash)?;
        let blob = HashBlob::from_bytes(&bytes)?;
        let candidate = Zeroizing::new(derive_hash(password_text, blob.salt())?);

        Ok(blob.matches(&candidate))
    }
}

impl Hasher for Pbkdf2Hasher {
    fn hash_password(&self, password_text: &str) -> Result<String> {
        Self::try_hash(password_text)
            .map_err(|e| hash_error(&self.span, "failed to create password hash from text", e))
    }

    fn compare_password_to_hash(&self, password_text: &str, password_hash: &str) -> Result<bool> {
        Self::try_compare(password_text, password_hash).map_err(|e| {
            hash_error(&self.span, "failed to compare password text to password hash", e)
        })
    }

    fn hash_password_async(
        &self,
        password_text: &str,
    ) -> impl Future<Output = Result<String>> + Send {
        let hasher = self.clone();
        let password_text = Zeroizing::new(password_text.to_owned());

        async move {
            let span = hasher.span.clone();
            tokio::task::spawn_blocking(move || hasher.hash_password(&password_text))
                .await
                .map_err(|e| {
                    hash_error(&span, "failed to create password hash from text", e.into())
                })?
        }
    }

    fn compare_password_to_hash_async(
        &self,
        password_text: &str,
        password_hash: &str,
    ) -> impl Future<Output = Result<bool>> + Send {
        let hasher = self.clone();
        let password_text = Zeroizing::new(password_text.to_owned());
        let password_hash = password_hash.to_owned();

        async move {
            let span = hasher.span.clone();
            tokio::task::spawn_blocking(move || {
                hasher.compare_password_to_hash(&password_text, &password_hash)
            })
            .await
            .map_err(|e| {
                hash_error(&span, "failed to compare password text to password hash", e.into())
            })?
        }
    }
}
