//! One-time passcode issuance.

use std::time::{SystemTime, UNIX_EPOCH};

use hmac::{Hmac, Mac};
use rand::RngCore;
use rand::rngs::OsRng;
use sha1::Sha1;

const SECRET_LENGTH: usize = 20;

#[derive(thiserror::Error, Debug)]
pub enum PasscodeError {
    #[error("invalid base32 encoding")]
    Base32,
    #[error("system time error")]
    Clock(#[from] std::time::SystemTimeError),
    #[error("HMAC error")]
    Hmac,
}

/// Issues numeric one-time passcodes from a time-stepped HMAC-SHA1
/// derivation.
///
/// Every issuance draws a fresh secret, so a code can never be re-derived
/// later: the caller persists the code itself and validation is done by
/// stored-value equality. This weakens the underlying algorithm on purpose
/// and is documented behavior, not an accident.
#[derive(Clone, Debug)]
pub struct PasscodeIssuer {
    digits: u32,
    step: u64,
}

impl PasscodeIssuer {
    /// Create a new [`PasscodeIssuer`].
    pub fn new(digits: u32, step: u64) -> Self {
        Self { digits, step }
    }

    /// Generate a passcode valid for the current time step, from a
    /// throwaway random secret.
    pub fn issue(&self) -> Result<String, PasscodeError> {
        let mut bytes = [0u8; SECRET_LENGTH];
        OsRng.fill_bytes(&mut bytes);
        let secret =
            base32::encode(base32::Alphabet::Rfc4648 { padding: false }, &bytes);

        let counter = SystemTime::now()
            .duration_since(UNIX_EPOCH)?
            .as_secs()
            / self.step;

        derive(&secret, counter, self.digits)
    }
}

impl Default for PasscodeIssuer {
    fn default() -> Self {
        // 6 digits over a 5-minute window.
        Self::new(6, 300)
    }
}

/// Derive the code for a base32 secret at a given counter value.
fn derive(secret: &str, counter: u64, digits: u32) -> Result<String, PasscodeError> {
    let key = base32::decode(base32::Alphabet::Rfc4648 { padding: false }, secret)
        .ok_or(PasscodeError::Base32)?;

    let counter_bytes = counter.to_be_bytes();
    let mut mac =
        Hmac::<Sha1>::new_from_slice(&key).map_err(|_| PasscodeError::Hmac)?;
    mac.update(&counter_bytes);
    let result = mac.finalize().into_bytes();

    let offset = (result[19] & 0x0f) as usize;
    let binary_code = ((result[offset] as u32 & 0x7f) << 24)
        | ((result[offset + 1] as u32) << 16)
        | ((result[offset + 2] as u32) << 8)
        | (result[offset + 3] as u32);

    let mut code = (binary_code % 10u32.pow(digits)).to_string();

    // Ensure the code has the correct number of digits.
    while code.len() < digits as usize {
        code.insert(0, '0');
    }

    Ok(code)
}
