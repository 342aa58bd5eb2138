use hmac::digest::KeyInit;
use hmac::{Hmac, Mac};
use sha1::Sha1;
use sha2::{Sha256, Sha512};

use crate::error::TotpError;

// HOTP https://datatracker.ietf.org/doc/html/rfc4226

pub const MIN_DIGITS: u32 = 6;
pub const MAX_DIGITS: u32 = 8;

type HmacSha1 = Hmac<Sha1>;
type HmacSha256 = Hmac<Sha256>;
type HmacSha512 = Hmac<Sha512>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Algorithm {
    #[default]
    Sha1,
    Sha256,
    Sha512,
}

impl Algorithm {
    fn sign(&self, key: &[u8], message: &[u8]) -> Result<Vec<u8>, TotpError> {
        match self {
            Algorithm::Sha1 => make_hmac::<HmacSha1>(key, message),
            Algorithm::Sha256 => make_hmac::<HmacSha256>(key, message),
            Algorithm::Sha512 => make_hmac::<HmacSha512>(key, message),
        }
    }
}

pub fn check_digits(digits: u32) -> Result<(), TotpError> {
    if (MIN_DIGITS..=MAX_DIGITS).contains(&digits) {
        Ok(())
    } else {
        Err(TotpError::InvalidParameter(format!(
            "digits must be between {} and {}, got {}",
            MIN_DIGITS, MAX_DIGITS, digits
        )))
    }
}

/// HOTP value for `counter`, zero-padded to `digits` characters.
pub fn get_hotp(
    key: &[u8],
    counter: u64,
    digits: u32,
    algorithm: Algorithm,
) -> Result<String, TotpError> {
    check_digits(digits)?;

    let hmac = algorithm.sign(key, &counter.to_be_bytes())?;
    let code = truncate(&hmac, digits);

    Ok(format!("{:0>width$}", code, width = digits as usize))
}

// HMAC over the 8 byte big-endian counter
fn make_hmac<M>(key: &[u8], message: &[u8]) -> Result<Vec<u8>, TotpError>
where
    M: Mac + KeyInit,
{
    let mut mac = <M as KeyInit>::new_from_slice(key)
        .map_err(|e| TotpError::InvalidSecret(format!("failed to initialize HMAC: {}", e)))?;
    mac.update(message);

    Ok(mac.finalize().into_bytes().to_vec())
}

// reduce to 4 byte string
// then s to num mod 10^Digit
fn truncate(hmac: &[u8], digits: u32) -> u32 {
    dynamic_truncation(hmac) % u32::pow(10, digits)
}

// DT(String) // String = String[0]...String[n-1]
// Let OffsetBits be the low-order 4 bits of String[n-1]
// Offset = StToNum(OffsetBits) // 0 <= OffSet <= 15
// Let P = String[OffSet]...String[OffSet+3]
// Return the Last 31 bits of P
fn dynamic_truncation(hmac: &[u8]) -> u32 {
    let offset = (hmac[hmac.len() - 1] & 0xf) as usize;
    (hmac[offset] as u32 & 0x7f) << 24
        | (hmac[offset + 1] as u32) << 16
        | (hmac[offset + 2] as u32) << 8
        | (hmac[offset + 3] as u32)
}
