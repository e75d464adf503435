/// Profile-ownership authorization
///
/// A user may mutate or remove only their own profile record: the acting
/// principal's email must match the target user's email exactly. There is no
/// role-based override. The guard is an explicit function called at the top
/// of the update/delete handlers, after the target has been loaded — so a
/// non-existent target yields not-found before any ownership decision.
///
/// # Example
///
/// ```no_run
/// use taskforge_shared::auth::middleware::AuthContext;
/// use taskforge_shared::auth::ownership::ensure_profile_owner;
/// use taskforge_shared::models::user::User;
///
/// fn guard(auth: &AuthContext, target: &User) -> Result<(), String> {
///     ensure_profile_owner(auth, target).map_err(|e| e.to_string())
/// }
/// ```

use super::middleware::AuthContext;
use crate::models::user::User;

/// Error type for ownership checks
#[derive(Debug, thiserror::Error)]
pub enum OwnershipError {
    /// The principal does not own the target profile
    #[error("You can only modify your own profile")]
    NotOwner,
}

/// Checks that the principal owns the target user profile
///
/// # Errors
///
/// Returns `OwnershipError::NotOwner` when the principal's email differs
/// from the target user's email.
pub fn ensure_profile_owner(auth: &AuthContext, target: &User) -> Result<(), OwnershipError> {
    if auth.email == target.email {
        Ok(())
    } else {
        Err(OwnershipError::NotOwner)
    }
}
