//! Cryptographic primitives shared by the crypter and the hasher.
//!
//! Provides key derivation, AES-CBC block processing, blob encoding,
//! and the salted hash blob layout.

pub mod blob;
pub mod cipher;
pub mod encoding;
pub mod kdf;
pub mod rng;

pub use blob::HashBlob;
pub use kdf::derive_bytes;
pub use rng::generate_salt;

use thiserror::Error;

/// Length of the AES-128 key (16 bytes).
pub const KEY_LEN: usize = 16;
/// Length of the CBC initialization vector (16 bytes).
pub const IV_LEN: usize = 16;
/// AES block size (16 bytes).
pub const BLOCK_LEN: usize = 16;
/// PBKDF2 rounds used to derive the crypter key and IV.
pub const CRYPTER_ITERATIONS: u32 = 1000;

/// Length of the random salt stored in a hash blob (20 bytes).
pub const SALT_LEN: usize = 20;
/// Length of the derived password hash (20 bytes, one SHA-1 block).
pub const HASH_LEN: usize = 20;
/// PBKDF2 rounds used for password hashes.
pub const HASH_ITERATIONS: u32 = 100_000;

/// Low level failure behind a crypt or hash error.
///
/// Messages describe what went wrong, never the bytes involved.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("input is not valid base64")]
    Base64,

    #[error("ciphertext length {0} is not a positive multiple of the block size")]
    BlockLength(usize),

    #[error("invalid block padding")]
    Padding,

    #[error("decrypted data has odd length {0} and cannot be UTF-16")]
    Utf16Length(usize),

    #[error("decrypted data is not valid UTF-16")]
    Utf16(#[from] std::string::FromUtf16Error),

    #[error("PBKDF2 iterations must be >= 1")]
    Iterations,

    #[error("key derivation failed")]
    Kdf,

    #[error("OS random generator unavailable")]
    Random,

    #[error("hash blob must be {expected} bytes, got {actual}")]
    BlobLength { expected: usize, actual: usize },

    #[error("worker task failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}
