/// Password hashing module using Argon2id
///
/// This module provides secure password hashing using the Argon2id
/// algorithm, which is the recommended algorithm for password hashing
/// (winner of the Password Hashing Competition).
///
/// # Security
///
/// - **Algorithm**: Argon2id (hybrid of Argon2i and Argon2d)
/// - **Memory**: 64 MB (65536 KB)
/// - **Iterations**: 3 passes
/// - **Parallelism**: 4 lanes
/// - **Output**: 32-byte hash
///
/// # Example
///
/// ```
/// use taskforge_shared::auth::password::{hash_password, verify_password};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let password = "super_secret_password_123";
/// let digest = hash_password(password)?;
///
/// assert!(verify_password(password, &digest)?);
/// assert!(!verify_password("wrong_password", &digest)?);
/// # Ok(())
/// # }
/// ```

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, ParamsBuilder, Version,
};

/// Error type for password hashing operations
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    /// Failed to hash password
    #[error("Failed to hash password: {0}")]
    HashError(String),

    /// Failed to verify password
    #[error("Failed to verify password: {0}")]
    VerifyError(String),

    /// Invalid password hash format
    #[error("Invalid password hash format: {0}")]
    InvalidHash(String),
}

/// Hashes a password using Argon2id with secure parameters
///
/// # Security Parameters
///
/// - Memory: 64 MB (65536 KB)
/// - Iterations: 3 passes
/// - Parallelism: 4 lanes
/// - Salt: 16 bytes random, generated with a cryptographically secure RNG
///
/// # Returns
///
/// PHC string format digest (includes algorithm, parameters, salt, and
/// hash), e.g. `$argon2id$v=19$m=65536,t=3,p=4$...`
///
/// # Errors
///
/// Returns `PasswordError::HashError` if hashing fails
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    let params = ParamsBuilder::new()
        .m_cost(65536)
        .t_cost(3)
        .p_cost(4)
        .output_len(32)
        .build()
        .map_err(|e| PasswordError::HashError(format!("Invalid parameters: {}", e)))?;

    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, params);

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::HashError(format!("Hash generation failed: {}", e)))?;

    Ok(password_hash.to_string())
}

/// Verifies a password against a stored digest
///
/// Verification is constant-time to prevent timing attacks.
///
/// # Returns
///
/// `Ok(true)` if password matches, `Ok(false)` if it doesn't
///
/// # Errors
///
/// Returns `PasswordError` if the stored digest cannot be parsed
pub fn verify_password(password: &str, digest: &str) -> Result<bool, PasswordError> {
    let parsed_hash = PasswordHash::new(digest)
        .map_err(|e| PasswordError::InvalidHash(format!("Failed to parse hash: {}", e)))?;

    // Parameters are embedded in the digest
    let argon2 = Argon2::default();

    match argon2.verify_password(password.as_bytes(), &parsed_hash) {
        Ok(_) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::VerifyError(format!(
            "Verification failed: {}",
            e
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_password() {
        let digest = hash_password("test_password_123").expect("Hash should succeed");

        assert!(digest.starts_with("$argon2id$"));
        assert!(digest.contains("v=19"));
        assert!(digest.contains("m=65536"));
        assert!(digest.contains("t=3"));
        assert!(digest.contains("p=4"));
    }

    #[test]
    fn test_hash_password_produces_different_salts() {
        let password = "same_password";

        let digest1 = hash_password(password).expect("Hash 1 should succeed");
        let digest2 = hash_password(password).expect("Hash 2 should succeed");

        // Different salts = different digests
        assert_ne!(digest1, digest2);
    }

    #[test]
    fn test_verify_password_correct() {
        let password = "correct_password";
        let digest = hash_password(password).expect("Hash should succeed");

        assert!(verify_password(password, &digest).expect("Verify should succeed"));
    }

    #[test]
    fn test_verify_password_incorrect() {
        let digest = hash_password("correct_password").expect("Hash should succeed");

        let result = verify_password("wrong_password", &digest).expect("Verify should succeed");
        assert!(!result, "Wrong password should not verify");
    }

    #[test]
    fn test_verify_password_invalid_hash() {
        let result = verify_password("password", "invalid_hash");
        assert!(result.is_err(), "Invalid digest should return error");
    }

    #[test]
    fn test_hash_verify_roundtrip() {
        let passwords = vec![
            "simple",
            "with spaces",
            "with-special-chars!@#$%",
            "unicode-密码-パスワード",
        ];

        for password in passwords {
            let digest = hash_password(password).expect("Hash should succeed");
            let verified = verify_password(password, &digest).expect("Verify should succeed");
            assert!(verified, "Password '{}' should verify", password);
        }
    }
}
