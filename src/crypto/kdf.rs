use hmac::Hmac;
use pbkdf2::pbkdf2;
use sha1::Sha1;

use super::CryptoError;

/// Fill `out` with PBKDF2-HMAC-SHA1 output for `password` and `salt`.
///
/// The password is taken as UTF-8. Output longer than one digest is the
/// continuous PBKDF2 stream, so two consecutive 16-byte reads equal the
/// first 32 bytes of a single derivation.
pub fn derive_bytes(
    password: &str,
    salt: &[u8],
    iterations: u32,
    out: &mut [u8],
) -> Result<(), CryptoError> {
    if iterations == 0 {
        return Err(CryptoError::Iterations);
    }

    pbkdf2::<Hmac<Sha1>>(password.as_bytes(), salt, iterations, out)
        .map_err(|_| CryptoError::Kdf)
}
