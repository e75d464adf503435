/// Authentication and authorization utilities
///
/// This module provides secure authentication primitives for Taskforge:
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: JWT token generation and validation
/// - [`middleware`]: Bearer-token principal extraction for Axum
/// - [`ownership`]: Profile-ownership guard
///
/// # Security Features
///
/// - **Password Hashing**: Argon2id with 64 MB memory, 3 iterations
/// - **JWT Tokens**: HS256 signing with 24 hour expiration
/// - **Constant-time Comparison**: Password verification uses constant-time
///   operations
///
/// # Example
///
/// ```no_run
/// use taskforge_shared::auth::password::{hash_password, verify_password};
/// use taskforge_shared::auth::jwt::{create_token, Claims};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// // Password authentication
/// let digest = hash_password("user_password")?;
/// assert!(verify_password("user_password", &digest)?);
///
/// // JWT token generation
/// let claims = Claims::new(1, "user@example.com".to_string());
/// let token = create_token(&claims, "secret-key")?;
/// # Ok(())
/// # }
/// ```

pub mod jwt;
pub mod middleware;
pub mod ownership;
pub mod password;
