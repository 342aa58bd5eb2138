use data_encoding::BASE32_NOPAD;
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use std::fmt;

use crate::error::TotpError;

// 160 bits, the size RFC 4226 recommends for the shared secret
pub const SECRET_LEN: usize = 20;

/// Shared secret in its base32 transport form.
///
/// The encoded text is kept as given and only decoded when a code is
/// computed, so a malformed secret surfaces as `TotpError::InvalidSecret`
/// at that point. Use [`Secret::from_base32`] to validate up front.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(encoded: impl Into<String>) -> Self {
        Secret(encoded.into())
    }

    pub fn from_base32(encoded: &str) -> Result<Self, TotpError> {
        let secret = Secret::new(encoded);
        secret.decode()?;
        Ok(secret)
    }

    pub fn from_bytes(raw: &[u8]) -> Self {
        Secret(BASE32_NOPAD.encode(raw))
    }

    pub fn as_base32(&self) -> &str {
        &self.0
    }

    // Lowercase input and trailing padding are accepted
    pub fn decode(&self) -> Result<Vec<u8>, TotpError> {
        let normalized = self.0.trim().trim_end_matches('=').to_uppercase();
        if normalized.is_empty() {
            return Err(TotpError::InvalidSecret(String::from("the key is empty")));
        }

        BASE32_NOPAD.decode(normalized.as_bytes()).map_err(|err| {
            TotpError::InvalidSecret(format!("the key is not a valid base32 encoding: {}", err))
        })
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(<redacted>)")
    }
}

// Generate a 20 byte random base32 secret from the OS random source
pub fn generate_secret() -> Secret {
    generate_secret_with(&mut OsRng)
}

pub fn generate_secret_with<R>(rng: &mut R) -> Secret
where
    R: RngCore + CryptoRng,
{
    let mut dest = [0u8; SECRET_LEN];
    rng.fill_bytes(&mut dest);
    Secret::from_bytes(&dest)
}
