//! Salted PBKDF2-SHA256 password hashes
//!
//! Hashes are stored as `pbkdf2:sha256:<iterations>$<salt>$<hex digest>`,
//! the layout Werkzeug writes, so hashes produced by it verify here too.

use pbkdf2::pbkdf2_hmac;
use rand::{Rng, distributions::Alphanumeric};
use sha2::Sha256;
use subtle::ConstantTimeEq;

pub const PBKDF2_ITERATIONS: u32 = 600_000;
const METHOD_PREFIX: &str = "pbkdf2:sha256:";
const SALT_LENGTH: usize = 16;
const DIGEST_LENGTH: usize = 32;

fn digest_hex(password: &str, salt: &str, iterations: u32) -> String {
    let mut digest = [0u8; DIGEST_LENGTH];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt.as_bytes(), iterations, &mut digest);
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

fn generate_salt() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SALT_LENGTH)
        .map(char::from)
        .collect()
}

/// Hash a password with a fresh random salt
pub fn hash_password(password: &str) -> String {
    hash_with_iterations(password, PBKDF2_ITERATIONS)
}

pub(crate) fn hash_with_iterations(password: &str, iterations: u32) -> String {
    let salt = generate_salt();
    let digest = digest_hex(password, &salt, iterations);
    format!("{METHOD_PREFIX}{iterations}${salt}${digest}")
}

/// Check a password against a stored hash. Unknown formats never verify.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Some((method, rest)) = stored.split_once('$') else {
        return false;
    };
    let Some((salt, expected)) = rest.split_once('$') else {
        return false;
    };
    let Some(iterations) = method
        .strip_prefix(METHOD_PREFIX)
        .and_then(|i| i.parse::<u32>().ok())
        .filter(|i| *i > 0)
    else {
        return false;
    };

    let actual = digest_hex(password, salt, iterations);
    actual.as_bytes().ct_eq(expected.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FAST: u32 = 1_000;

    #[test]
    fn hash_verifies_with_same_password() {
        let stored = hash_with_iterations("gizli-sifre", FAST);
        assert!(verify_password("gizli-sifre", &stored));
        assert!(!verify_password("yanlis-sifre", &stored));
    }

    #[test]
    fn salts_differ_between_hashes() {
        let a = hash_with_iterations("aynı", FAST);
        let b = hash_with_iterations("aynı", FAST);
        assert_ne!(a, b);
        assert!(a.starts_with("pbkdf2:sha256:1000$"));
    }

    #[test]
    fn verifies_werkzeug_style_hash() {
        let digest = digest_hex("password", "saltsaltsaltsalt", FAST);
        let stored = format!("pbkdf2:sha256:{FAST}$saltsaltsaltsalt${digest}");
        assert!(verify_password("password", &stored));
    }

    #[test]
    fn malformed_hashes_never_verify() {
        assert!(!verify_password("x", ""));
        assert!(!verify_password("x", "plain-text"));
        assert!(!verify_password("x", "scrypt:32768:8:1$salt$abcd"));
        assert!(!verify_password("x", "pbkdf2:sha256:0$salt$abcd"));
    }
}
