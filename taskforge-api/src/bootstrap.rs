/// Startup data seeding
///
/// Creates the default administrator account so a freshly-migrated instance
/// has a login to start from. Seeding is idempotent: if the configured
/// admin email already exists, nothing is written.

use crate::config::Config;
use sqlx::PgPool;
use taskforge_shared::{
    auth::password,
    models::user::{CreateUser, User},
};
use tracing::{debug, info};

/// Seeds the default administrator account
///
/// # Errors
///
/// Returns an error if password hashing or the database write fails.
pub async fn seed_admin(pool: &PgPool, config: &Config) -> anyhow::Result<()> {
    let email = &config.seed.admin_email;

    if User::find_by_email(pool, email).await?.is_some() {
        debug!(email = %email, "Admin account already exists, skipping seed");
        return Ok(());
    }

    let password_digest = password::hash_password(&config.seed.admin_password)?;

    User::create(
        pool,
        CreateUser {
            email: email.clone(),
            password_digest,
            first_name: Some("admin".to_string()),
            last_name: None,
        },
    )
    .await?;

    info!(email = %email, "Seeded default admin account");
    Ok(())
}
