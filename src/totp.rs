use std::fmt;
use std::time::SystemTime;
use subtle::ConstantTimeEq;
use tracing::debug;

use crate::error::TotpError;
use crate::hotp::{check_digits, get_hotp, Algorithm};
use crate::secret::Secret;

// TOTP https://datatracker.ietf.org/doc/html/rfc6238

// uses HOTP with a time-based moving factor based on system time

pub const TIME_STEP: u64 = 30;
pub const DIGITS: u32 = 6;
// Largest number of steps accepted on either side of the current one
pub const MAX_WINDOW: u64 = 10;

pub trait GetTime {
    fn get_now(&self) -> SystemTime;
}

pub struct Clock {}

impl Clock {
    pub fn new() -> Self {
        Clock {}
    }
}

impl Default for Clock {
    fn default() -> Self {
        Clock::new()
    }
}

impl GetTime for Clock {
    fn get_now(&self) -> SystemTime {
        SystemTime::now()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TotpParams {
    /// Seconds per counter value
    pub step: u64,
    pub digits: u32,
    pub algorithm: Algorithm,
}

impl Default for TotpParams {
    fn default() -> Self {
        TotpParams {
            step: TIME_STEP,
            digits: DIGITS,
            algorithm: Algorithm::Sha1,
        }
    }
}

impl TotpParams {
    pub fn validate(&self) -> Result<(), TotpError> {
        if self.step == 0 {
            return Err(TotpError::InvalidParameter(String::from(
                "time step must be positive",
            )));
        }
        check_digits(self.digits)
    }

    pub fn moving_factor(&self, time: u64) -> u64 {
        time / self.step
    }
}

/// A one-time password, always exactly `digits` characters wide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Code(String);

impl Code {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Code for the time step containing `time` (seconds since the Unix epoch).
pub fn compute_code(secret: &Secret, time: u64, params: &TotpParams) -> Result<Code, TotpError> {
    params.validate()?;
    let key = secret.decode()?;

    code_for_counter(&key, params.moving_factor(time), params)
}

pub fn now_code(
    secret: &Secret,
    params: &TotpParams,
    clock: &impl GetTime,
) -> Result<Code, TotpError> {
    let time = unix_time(clock)?;
    debug!(moving_factor = time / params.step.max(1), "computing current code");

    compute_code(secret, time, params)
}

/// Checks `candidate` against every step within `window` of the one
/// containing `time`.
pub fn verify_code(
    secret: &Secret,
    candidate: &str,
    time: u64,
    params: &TotpParams,
    window: u64,
) -> Result<bool, TotpError> {
    params.validate()?;
    if window > MAX_WINDOW {
        return Err(TotpError::InvalidParameter(format!(
            "window must be at most {}, got {}",
            MAX_WINDOW, window
        )));
    }
    let key = secret.decode()?;

    if candidate.len() != params.digits as usize {
        return Ok(false);
    }

    let moving_factor = params.moving_factor(time);
    let first = moving_factor.saturating_sub(window);
    let last = moving_factor.saturating_add(window);

    for mf in first..=last {
        let expected = code_for_counter(&key, mf, params)?;
        if bool::from(expected.as_str().as_bytes().ct_eq(candidate.as_bytes())) {
            debug!(moving_factor = mf, "code matched");
            return Ok(true);
        }
    }

    Ok(false)
}

fn code_for_counter(key: &[u8], counter: u64, params: &TotpParams) -> Result<Code, TotpError> {
    get_hotp(key, counter, params.digits, params.algorithm).map(Code)
}

fn unix_time(clock: &impl GetTime) -> Result<u64, TotpError> {
    clock
        .get_now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .map_err(|_| TotpError::InvalidParameter(String::from("clock is before the Unix epoch")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::constants::*;
    use crate::tests::mocks::MockClock;

    fn rfc_params(algorithm: Algorithm) -> TotpParams {
        TotpParams {
            step: TIME_STEP,
            digits: 8,
            algorithm,
        }
    }

    #[test]
    fn matches_rfc_6238_vectors() {
        for (time, sha1, sha256, sha512) in RFC_6238_VECTORS {
            let cases = [
                (Secret::from_bytes(RFC_SHA1_SEED.as_bytes()), Algorithm::Sha1, sha1),
                (Secret::from_bytes(RFC_SHA256_SEED.as_bytes()), Algorithm::Sha256, sha256),
                (Secret::from_bytes(RFC_SHA512_SEED.as_bytes()), Algorithm::Sha512, sha512),
            ];

            for (secret, algorithm, expected) in cases {
                let code = compute_code(&secret, time, &rfc_params(algorithm)).unwrap();
                assert_eq!(code.as_str(), expected, "{:?} at {}", algorithm, time);
            }
        }
    }

    #[test]
    fn reproduces_the_first_sha1_vector_from_base32() {
        let secret = Secret::new(RFC_SHA1_BASE32);
        let code = compute_code(&secret, 59, &rfc_params(Algorithm::Sha1)).unwrap();

        assert_eq!(code.to_string(), "94287082");
    }

    #[test]
    fn is_deterministic() {
        let secret = Secret::new(TOTP_KEY);
        let params = TotpParams::default();

        let first = compute_code(&secret, 1_111_111_109, &params).unwrap();
        let second = compute_code(&secret, 1_111_111_109, &params).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn codes_change_only_at_step_boundaries() {
        let secret = Secret::from_bytes(RFC_SHA1_SEED.as_bytes());
        let params = TotpParams::default();
        let start = 1_111_111_110; // first second of its step

        let at_start = compute_code(&secret, start, &params).unwrap();
        let at_end = compute_code(&secret, start + TIME_STEP - 1, &params).unwrap();
        let next = compute_code(&secret, start + TIME_STEP, &params).unwrap();

        assert_eq!(at_start, at_end);
        assert_ne!(at_start, next);
    }

    #[test]
    fn codes_have_the_requested_width() {
        let secret = Secret::new(TOTP_KEY);
        for digits in 6..=8 {
            let params = TotpParams {
                digits,
                ..TotpParams::default()
            };
            for time in (0..3000).step_by(30) {
                let code = compute_code(&secret, time, &params).unwrap();
                assert_eq!(code.as_str().len(), digits as usize);
                assert!(code.as_str().chars().all(|c| c.is_ascii_digit()));
            }
        }
    }

    #[test]
    fn rejects_invalid_parameters() {
        let secret = Secret::new(TOTP_KEY);
        let zero_step = TotpParams {
            step: 0,
            ..TotpParams::default()
        };
        let too_many_digits = TotpParams {
            digits: 9,
            ..TotpParams::default()
        };

        assert!(matches!(
            compute_code(&secret, 59, &zero_step),
            Err(TotpError::InvalidParameter(_))
        ));
        assert!(matches!(
            compute_code(&secret, 59, &too_many_digits),
            Err(TotpError::InvalidParameter(_))
        ));
    }

    #[test]
    fn rejects_undecodable_secrets() {
        let secret = Secret::new("not base32!");

        assert!(matches!(
            compute_code(&secret, 59, &TotpParams::default()),
            Err(TotpError::InvalidSecret(_))
        ));
    }

    #[test]
    fn now_code_reads_the_injected_clock() {
        let secret = Secret::from_bytes(RFC_SHA1_SEED.as_bytes());
        let clock = MockClock::at(59);

        let code = now_code(&secret, &rfc_params(Algorithm::Sha1), &clock).unwrap();

        assert_eq!(code.as_str(), "94287082");
    }

    #[test]
    fn now_code_follows_the_clock_across_a_boundary() {
        let secret = Secret::new(TOTP_KEY);
        let params = TotpParams::default();

        let before = now_code(&secret, &params, &MockClock::at(89)).unwrap();
        let after = now_code(&secret, &params, &MockClock::at(90)).unwrap();

        assert_eq!(before, compute_code(&secret, 60, &params).unwrap());
        assert_eq!(after, compute_code(&secret, 90, &params).unwrap());
    }

    #[test]
    fn verify_accepts_codes_within_the_window() {
        let secret = Secret::new(TOTP_KEY);
        let params = TotpParams::default();
        let now = 10_000 * TIME_STEP;

        let previous = compute_code(&secret, now - TIME_STEP, &params).unwrap();
        let current = compute_code(&secret, now, &params).unwrap();
        let next = compute_code(&secret, now + TIME_STEP, &params).unwrap();

        assert!(verify_code(&secret, current.as_str(), now, &params, 0).unwrap());
        assert!(verify_code(&secret, previous.as_str(), now, &params, 1).unwrap());
        assert!(verify_code(&secret, next.as_str(), now, &params, 1).unwrap());
    }

    #[test]
    fn verify_rejects_codes_outside_the_window() {
        let secret = Secret::new(TOTP_KEY);
        let params = TotpParams::default();
        let now = 10_000 * TIME_STEP;

        let stale = compute_code(&secret, now - 2 * TIME_STEP, &params).unwrap();
        let current = compute_code(&secret, now, &params).unwrap();

        assert!(!verify_code(&secret, stale.as_str(), now, &params, 1).unwrap());
        assert!(!verify_code(&secret, &current.as_str()[1..], now, &params, 1).unwrap());
        assert!(!verify_code(&secret, "abcdef", now, &params, 1).unwrap());
    }

    #[test]
    fn verify_rejects_oversized_windows() {
        let secret = Secret::new(TOTP_KEY);
        let params = TotpParams::default();

        assert!(matches!(
            verify_code(&secret, "000000", 1_000_000, &params, u64::MAX),
            Err(TotpError::InvalidParameter(_))
        ));
        assert!(matches!(
            verify_code(&secret, "000000", 1_000_000, &params, MAX_WINDOW + 1),
            Err(TotpError::InvalidParameter(_))
        ));
        assert!(verify_code(&secret, "000000", 1_000_000, &params, MAX_WINDOW).is_ok());
    }

    #[test]
    fn now_code_rejects_clocks_before_the_epoch() {
        let secret = Secret::new(TOTP_KEY);

        assert!(matches!(
            now_code(&secret, &TotpParams::default(), &MockClock::before_epoch()),
            Err(TotpError::InvalidParameter(_))
        ));
    }

    #[test]
    fn verify_window_saturates_at_the_epoch() {
        let secret = Secret::new(TOTP_KEY);
        let params = TotpParams::default();
        let first = compute_code(&secret, 0, &params).unwrap();

        assert!(verify_code(&secret, first.as_str(), 10, &params, 3).unwrap());
    }
}
