//! Delegating password encoder
//!
//! Every stored hash is tagged with the id of the algorithm that produced
//! it (`{pbkdf2}`, `{bcrypt}`, `{scrypt}`), so verification can dispatch to
//! the matching algorithm without knowing how old the hash is. New hashes
//! always use the default algorithm (PBKDF2-HMAC-SHA256 keyed with an
//! externally supplied secret); bcrypt and scrypt remain available to
//! verify legacy hashes.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use bcrypt::Version;
use rand::RngCore;
use scrypt::Params;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

/// Minimum length of the PBKDF2 secret. Deployment invariant, checked at
/// startup.
pub const MIN_SECRET_LEN: usize = 30;

const PBKDF2_SALT_LEN: usize = 16;
const PBKDF2_ITERATIONS: u32 = 310_000;
const PBKDF2_KEY_LEN: usize = 32;

const BCRYPT_COST: u32 = 12;

const SCRYPT_LOG_N: u8 = 14; // N = 16384
const SCRYPT_R: u32 = 8;
const SCRYPT_P: u32 = 1;
const SCRYPT_KEY_LEN: usize = 32;
const SCRYPT_SALT_LEN: usize = 64;

#[derive(Debug, Error)]
pub enum PasswordEncoderError {
    #[error("pbkdf2 secret must be at least {MIN_SECRET_LEN} characters")]
    WeakSecret,

    #[error("failed to encode password: {0}")]
    Encode(String),
}

/// One of the interchangeable hash algorithms, carrying its parameters.
#[derive(Clone)]
pub enum HashAlgorithm {
    Pbkdf2 { secret: String },
    Bcrypt,
    Scrypt,
}

impl HashAlgorithm {
    /// Identifier embedded in stored hashes.
    pub fn id(&self) -> &'static str {
        match self {
            HashAlgorithm::Pbkdf2 { .. } => "pbkdf2",
            HashAlgorithm::Bcrypt => "bcrypt",
            HashAlgorithm::Scrypt => "scrypt",
        }
    }

    /// Produce an untagged hash with a fresh random salt.
    fn encode(&self, raw: &str) -> Result<String, PasswordEncoderError> {
        match self {
            HashAlgorithm::Pbkdf2 { secret } => {
                let mut salt = [0u8; PBKDF2_SALT_LEN];
                rand::thread_rng().fill_bytes(&mut salt);
                let dk = pbkdf2_derive(raw, &salt, secret);

                let mut out = Vec::with_capacity(PBKDF2_SALT_LEN + PBKDF2_KEY_LEN);
                out.extend_from_slice(&salt);
                out.extend_from_slice(&dk);
                Ok(hex::encode(out))
            }
            HashAlgorithm::Bcrypt => bcrypt::hash_with_result(raw, BCRYPT_COST)
                .map(|parts| parts.format_for_version(Version::TwoY))
                .map_err(|e| PasswordEncoderError::Encode(e.to_string())),
            HashAlgorithm::Scrypt => {
                let mut salt = [0u8; SCRYPT_SALT_LEN];
                rand::thread_rng().fill_bytes(&mut salt);
                let dk = scrypt_derive(raw, &salt, SCRYPT_LOG_N, SCRYPT_R, SCRYPT_P, SCRYPT_KEY_LEN)
                    .map_err(PasswordEncoderError::Encode)?;

                let params = ((SCRYPT_LOG_N as u32) << 16) | (SCRYPT_R << 8) | SCRYPT_P;
                Ok(format!(
                    "${:x}${}${}",
                    params,
                    STANDARD.encode(salt),
                    STANDARD.encode(dk)
                ))
            }
        }
    }

    /// Re-derive from `raw` and compare against the untagged `encoded`
    /// hash in constant time. Malformed input never matches.
    fn matches(&self, raw: &str, encoded: &str) -> bool {
        match self {
            HashAlgorithm::Pbkdf2 { secret } => {
                let Ok(decoded) = hex::decode(encoded) else {
                    return false;
                };
                if decoded.len() != PBKDF2_SALT_LEN + PBKDF2_KEY_LEN {
                    return false;
                }
                let (salt, stored_dk) = decoded.split_at(PBKDF2_SALT_LEN);
                let dk = pbkdf2_derive(raw, salt, secret);
                bool::from(dk.as_slice().ct_eq(stored_dk))
            }
            HashAlgorithm::Bcrypt => bcrypt::verify(raw, encoded).unwrap_or(false),
            HashAlgorithm::Scrypt => {
                let mut parts = encoded.split('$');
                // Leading '$' yields an empty first part.
                if parts.next() != Some("") {
                    return false;
                }
                let (Some(params_hex), Some(salt_b64), Some(dk_b64), None) =
                    (parts.next(), parts.next(), parts.next(), parts.next())
                else {
                    return false;
                };
                let Ok(params) = u32::from_str_radix(params_hex, 16) else {
                    return false;
                };
                let log_n = (params >> 16) as u8;
                let r = (params >> 8) & 0xff;
                let p = params & 0xff;
                let (Ok(salt), Ok(stored_dk)) =
                    (STANDARD.decode(salt_b64), STANDARD.decode(dk_b64))
                else {
                    return false;
                };
                let Ok(dk) = scrypt_derive(raw, &salt, log_n, r, p, stored_dk.len()) else {
                    return false;
                };
                bool::from(dk.as_slice().ct_eq(&stored_dk))
            }
        }
    }
}

fn pbkdf2_derive(raw: &str, salt: &[u8], secret: &str) -> [u8; PBKDF2_KEY_LEN] {
    // KDF salt input is salt || secret; only the salt is stored.
    let mut salt_with_secret = Vec::with_capacity(salt.len() + secret.len());
    salt_with_secret.extend_from_slice(salt);
    salt_with_secret.extend_from_slice(secret.as_bytes());

    let mut dk = [0u8; PBKDF2_KEY_LEN];
    pbkdf2::pbkdf2_hmac::<Sha256>(raw.as_bytes(), &salt_with_secret, PBKDF2_ITERATIONS, &mut dk);
    dk
}

fn scrypt_derive(
    raw: &str,
    salt: &[u8],
    log_n: u8,
    r: u32,
    p: u32,
    len: usize,
) -> Result<Vec<u8>, String> {
    let params = Params::new(log_n, r, p, len).map_err(|e| e.to_string())?;
    let mut dk = vec![0u8; len];
    scrypt::scrypt(raw.as_bytes(), salt, &params, &mut dk).map_err(|e| e.to_string())?;
    Ok(dk)
}

/// Splits `{id}rest` into `(id, rest)`.
fn split_tagged(stored: &str) -> Option<(&str, &str)> {
    let rest = stored.strip_prefix('{')?;
    let end = rest.find('}')?;
    Some((&rest[..end], &rest[end + 1..]))
}

/// Encodes with the default algorithm, verifies against any of them.
#[derive(Clone)]
pub struct DelegatingPasswordEncoder {
    algorithms: Vec<HashAlgorithm>,
}

impl DelegatingPasswordEncoder {
    /// Build the encoder set. The PBKDF2 secret comes from configuration
    /// and must satisfy the minimum-length deployment invariant.
    pub fn new(pbkdf2_secret: &str) -> Result<Self, PasswordEncoderError> {
        if pbkdf2_secret.len() < MIN_SECRET_LEN {
            return Err(PasswordEncoderError::WeakSecret);
        }
        Ok(Self {
            // First entry is the default used for all new hashes.
            algorithms: vec![
                HashAlgorithm::Pbkdf2 {
                    secret: pbkdf2_secret.to_string(),
                },
                HashAlgorithm::Bcrypt,
                HashAlgorithm::Scrypt,
            ],
        })
    }

    /// Hash `raw` with the default algorithm, tagging the output with the
    /// algorithm id so `matches` can dispatch later.
    pub fn encode(&self, raw: &str) -> Result<String, PasswordEncoderError> {
        let default = &self.algorithms[0];
        Ok(format!("{{{}}}{}", default.id(), default.encode(raw)?))
    }

    /// Verify `raw` against a previously stored tagged hash. Unknown tags
    /// and malformed hashes never match.
    pub fn matches(&self, raw: &str, stored: &str) -> bool {
        let Some((id, encoded)) = split_tagged(stored) else {
            return false;
        };
        match self.algorithms.iter().find(|a| a.id() == id) {
            Some(algorithm) => algorithm.matches(raw, encoded),
            None => false,
        }
    }
}
