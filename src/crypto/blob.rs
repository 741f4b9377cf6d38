//! Salted password hash blob.
//!
//! Layout:
//! ```text
//! SALT (20) | DERIVED KEY (20)
//! ```

use subtle::ConstantTimeEq;

use super::{CryptoError, HASH_LEN, SALT_LEN};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashBlob {
    salt: [u8; SALT_LEN],
    hash: [u8; HASH_LEN],
}

impl HashBlob {
    pub const LEN: usize = SALT_LEN + HASH_LEN;

    pub fn new(salt: [u8; SALT_LEN], hash: [u8; HASH_LEN]) -> Self {
        Self { salt, hash }
    }

    pub fn salt(&self) -> &[u8; SALT_LEN] {
        &self.salt
    }

    pub fn to_bytes(&self) -> [u8; Self::LEN] {
        let mut buf = [0u8; Self::LEN];
        buf[..SALT_LEN].copy_from_slice(&self.salt);
        buf[SALT_LEN..].copy_from_slice(&self.hash);
        buf
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, CryptoError> {
        if data.len() != Self::LEN {
            return Err(CryptoError::BlobLength {
                expected: Self::LEN,
                actual: data.len(),
            });
        }

        let mut salt = [0u8; SALT_LEN];
        let mut hash = [0u8; HASH_LEN];
        salt.copy_from_slice(&data[..SALT_LEN]);
        hash.copy_from_slice(&data[SALT_LEN..]);

        Ok(Self { salt, hash })
    }

    /// Compares every byte of `candidate` with the stored hash in constant time.
    pub fn matches(&self, candidate: &[u8; HASH_LEN]) -> bool {
        self.hash[..].ct_eq(&candidate[..]).into()
    }
}
