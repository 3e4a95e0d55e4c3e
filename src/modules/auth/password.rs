use pbkdf2::pbkdf2;
use rand::Rng;
use std::io;
use std::num::NonZeroU32;

use crate::HmacSha256;

/// Minimum accepted password length
pub const MIN_PASSWORD_LEN: usize = 4;

/// Password validation errors
#[derive(Debug, PartialEq, Eq)]
pub enum PasswordError {
    TooShort,
}

impl std::fmt::Display for PasswordError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PasswordError::TooShort => {
                write!(f, "Password must be at least {} characters", MIN_PASSWORD_LEN)
            }
        }
    }
}

/// Function to validate password strength
pub fn validate_password(password: &str) -> Result<(), PasswordError> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(PasswordError::TooShort);
    }
    Ok(())
}

/// Function to generate a random salt for PBKDF2
pub fn generate_salt() -> Vec<u8> {
    let mut rng = rand::thread_rng();
    (0..16).map(|_| rng.gen()).collect()
}

/// Derive a 32-byte PBKDF2 hash of the password, hex-encoded for storage
pub fn hash_password(password: &str, salt: &[u8]) -> String {
    let mut key = vec![0u8; 32];
    let iterations = NonZeroU32::new(100_000).unwrap();

    pbkdf2::<HmacSha256>(
        password.as_bytes(),
        salt,
        iterations.get().into(),
        &mut key,
    );

    hex::encode(key)
}

/// Check a submitted password against a stored salt and hash
pub fn verify_password(password: &str, salt_hex: &str, hash_hex: &str) -> bool {
    match hex::decode(salt_hex) {
        Ok(salt) => hash_password(password, &salt) == hash_hex,
        Err(_) => false,
    }
}

/// Helper function to read a password without echoing it
pub fn read_password() -> io::Result<String> {
    rpassword::read_password()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_validation() {
        assert!(validate_password("1234").is_ok());
        assert!(validate_password("longer password").is_ok());
        assert_eq!(validate_password("abc"), Err(PasswordError::TooShort));
        assert_eq!(validate_password(""), Err(PasswordError::TooShort));
    }

    #[test]
    fn test_hash_is_deterministic_per_salt() {
        let salt = generate_salt();
        let hash1 = hash_password("pass1", &salt);
        let hash2 = hash_password("pass1", &salt);
        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);

        let other_salt = generate_salt();
        assert_ne!(hash_password("pass1", &other_salt), hash1);
        assert_ne!(hash_password("pass2", &salt), hash1);
    }

    #[test]
    fn test_verify_round_trip() {
        let salt = generate_salt();
        let salt_hex = hex::encode(&salt);
        let hash = hash_password("s3cret", &salt);

        assert!(verify_password("s3cret", &salt_hex, &hash));
        assert!(!verify_password("S3cret", &salt_hex, &hash));
        assert!(!verify_password("s3cret", "zz-not-hex", &hash));
    }

    #[test]
    fn test_salt_generation() {
        let salt1 = generate_salt();
        let salt2 = generate_salt();
        assert_eq!(salt1.len(), 16);
        assert_ne!(salt1, salt2);
    }
}
