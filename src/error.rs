use thiserror::Error;

use crate::crypto::CryptoError;

/// Errors surfaced by the crypter and the hasher.
///
/// Messages are fixed strings; the underlying failure is kept as the
/// error source and never carries plaintext, ciphertext or key bytes.
#[derive(Debug, Error)]
pub enum Error {
    /// A required input was empty.
    #[error("invalid argument: {0} must not be empty")]
    Argument(&'static str),

    #[error("{message}")]
    Crypt {
        message: &'static str,
        #[source]
        source: CryptoError,
    },

    #[error("{message}")]
    Hash {
        message: &'static str,
        #[source]
        source: CryptoError,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
