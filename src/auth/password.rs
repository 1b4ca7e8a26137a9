//! Password hashing (Argon2id) and the account credential policy.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use thiserror::Error;

/// Minimum password length accepted at registration.
pub const MIN_PASSWORD_LENGTH: usize = 6;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("password hashing failed: {0}")]
    Hash(String),

    #[error("stored password hash is malformed: {0}")]
    MalformedHash(String),
}

/// Hash a plaintext password into an Argon2id PHC string.
///
/// CPU-bound; async callers run it on a blocking thread.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::Hash(e.to_string()))
}

/// Verify a plaintext password against a stored PHC hash.
///
/// Returns `Ok(false)` on mismatch and an error only when the stored hash
/// cannot be parsed.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed = argon2::PasswordHash::new(hash).map_err(|e| PasswordError::MalformedHash(e.to_string()))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::MalformedHash(e.to_string())),
    }
}

/// Credential policy: at least [`MIN_PASSWORD_LENGTH`] characters and one digit.
/// No other character classes are required.
pub fn check_password_policy(password: &str) -> Result<(), String> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(format!("Password must be at least {} characters", MIN_PASSWORD_LENGTH));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err("Password must contain at least one digit".to_string());
    }
    Ok(())
}

/// Basic `local@domain.tld` shape check.
pub fn validate_email_format(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email cannot be empty".to_string());
    }
    if email.chars().any(char::is_whitespace) {
        return Err("Invalid email format".to_string());
    }

    let Some((local, domain)) = email.split_once('@') else {
        return Err("Invalid email format".to_string());
    };
    if local.is_empty() || domain.contains('@') {
        return Err("Invalid email format".to_string());
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) if !host.is_empty() && !tld.is_empty() => Ok(()),
        _ => Err("Invalid email format".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correct_password_matches() {
        let hash = hash_password("Passw0rd").unwrap();
        assert!(verify_password("Passw0rd", &hash).unwrap());
    }

    #[test]
    fn wrong_password_does_not_match() {
        let hash = hash_password("Passw0rd").unwrap();
        assert!(!verify_password("Passw0rd!", &hash).unwrap());
    }

    #[test]
    fn hashes_are_salted() {
        assert_ne!(hash_password("Passw0rd").unwrap(), hash_password("Passw0rd").unwrap());
    }

    #[test]
    fn malformed_hash_returns_error() {
        assert!(verify_password("pw", "not-a-hash").is_err());
    }

    #[test]
    fn policy_requires_length_and_digit() {
        assert!(check_password_policy("abc12").is_err());
        assert!(check_password_policy("abcdef").is_err());
        assert!(check_password_policy("abcde1").is_ok());
        assert!(check_password_policy("123456").is_ok());
    }

    #[test]
    fn email_shapes() {
        assert!(validate_email_format("a@x.com").is_ok());
        assert!(validate_email_format("").is_err());
        assert!(validate_email_format("no-at-sign.com").is_err());
        assert!(validate_email_format("@x.com").is_err());
        assert!(validate_email_format("a@nodot").is_err());
        assert!(validate_email_format("a@b@c.com").is_err());
        assert!(validate_email_format("a b@x.com").is_err());
    }
}
