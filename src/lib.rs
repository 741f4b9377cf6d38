//! Reversible text encryption and salted password hashing.
//!
//! Both components produce plain base64 strings suitable for a text column
//! or a config value.
//!
//! ```rust
//! use pwcrypt::{AesCrypter, Crypter, Hasher, Pbkdf2Hasher};
//!
//! let crypter = AesCrypter::new("someKey", &[1, 3, 5, 9, 1, 4, 5, 6])?;
//! let blob = crypter.encrypt("A happy little tree")?;
//! assert_eq!(crypter.decrypt(&blob)?, "A happy little tree");
//!
//! let hasher = Pbkdf2Hasher::new();
//! let hash = hasher.hash_password("Sup3rSaF3Passw0rd")?;
//! assert!(hasher.compare_password_to_hash("Sup3rSaF3Passw0rd", &hash)?);
//! # Ok::<(), pwcrypt::Error>(())
//! ```

pub mod crypto;
mod crypter;
mod error;
mod hasher;

pub use crate::crypter::{AesCrypter, Crypter};
pub use crate::error::{Error, Result};
pub use crate::hasher::{Hasher, Pbkdf2Hasher};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn components_compose_independently() {
        let hasher = Pbkdf2Hasher::new();
        let crypter = AesCrypter::new("app-secret", b"per-app seed").unwrap();

        let stored_hash = hasher.hash_password("login password").unwrap();
        let stored_token = crypter.encrypt("api token").unwrap();

        assert!(
            hasher
                .compare_password_to_hash("login password", &stored_hash)
                .unwrap()
        );
        assert_eq!(crypter.decrypt(&stored_token).unwrap(), "api token");

        // blobs are not interchangeable
        assert!(crypter.decrypt(&stored_hash).is_err());
        assert!(hasher.compare_password_to_hash("x", &stored_token).is_err());
    }

    #[test]
    fn generic_callers_work_through_the_traits() {
        fn roundtrip(crypter: &impl Crypter, text: &str) -> String {
            let blob = crypter.encrypt(text).unwrap();
            crypter.decrypt(&blob).unwrap()
        }

        let crypter = AesCrypter::new("someKey", &[1, 3, 5, 9, 1, 4, 5, 6]).unwrap();
        assert_eq!(roundtrip(&crypter, "some text"), "some text");
    }
}
