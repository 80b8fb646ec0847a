//! Account flows outside the session issuer: password change, account
//! removal and admin-created owners.

use orynal_core::auth::password::{
    PasswordError, hash_password_blocking, verify_password_blocking,
};
use orynal_core::auth::session::{MIN_PASSWORD_LEN, validate_registration};
use orynal_core::models::auth::{Identity, NewIdentity, Registration, Role};
use orynal_core::store::IdentityStore;
use sqlx::PgPool;
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::models::{ChangePasswordRequest, CreateOwnerRequest};

/// Look up an identity or 404.
pub async fn find_identity(identities: &dyn IdentityStore, user_id: i64) -> AppResult<Identity> {
    identities
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {user_id} not found")))
}

/// Look up an identity that must hold `role`. Other roles read as missing.
pub async fn find_with_role(
    identities: &dyn IdentityStore,
    user_id: i64,
    role: Role,
) -> AppResult<Identity> {
    match identities.find_by_id(user_id).await? {
        Some(identity) if identity.role == role => Ok(identity),
        _ => Err(AppError::NotFound(format!("{role} {user_id} not found"))),
    }
}

/// Check a password change request and return the new digest.
pub async fn new_password_digest(
    identities: &dyn IdentityStore,
    user_id: i64,
    request: ChangePasswordRequest,
) -> AppResult<String> {
    if request.old_password == request.new_password {
        return Err(AppError::Validation(
            "new password must differ from the old one".into(),
        ));
    }
    if request.new_password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    let identity = find_identity(identities, user_id).await?;
    match verify_password_blocking(request.old_password, identity.password_hash).await {
        Ok(()) => {}
        Err(PasswordError::Mismatch) => {
            return Err(AppError::Validation("old password is incorrect".into()));
        }
        Err(e) => return Err(e.into()),
    }

    Ok(hash_password_blocking(request.new_password).await?)
}

/// Change a password after verifying the old one.
pub async fn change_password(
    pool: &PgPool,
    identities: &dyn IdentityStore,
    user_id: i64,
    request: ChangePasswordRequest,
) -> AppResult<()> {
    let digest = new_password_digest(identities, user_id, request).await?;
    if !orynal_core::users::update_password(pool, user_id, &digest).await? {
        return Err(AppError::NotFound(format!("user {user_id} not found")));
    }
    info!(user_id, "password changed");
    Ok(())
}

/// Create a restaurant owner account on behalf of an admin.
pub async fn create_owner(
    identities: &dyn IdentityStore,
    request: CreateOwnerRequest,
) -> AppResult<i64> {
    let registration = Registration {
        name: request.name,
        surname: request.surname,
        email: request.email,
        phone: request.phone,
        password: request.password,
    };
    validate_registration(&registration)?;

    let password_hash = hash_password_blocking(registration.password).await?;
    let owner = identities
        .save(NewIdentity {
            name: registration.name,
            surname: registration.surname,
            email: registration.email,
            phone: registration.phone,
            password_hash,
            role: Role::Owner,
        })
        .await?;
    info!(user_id = owner.id, "owner account created");
    Ok(owner.id)
}

/// Refuse to delete admin accounts through self-service.
pub fn ensure_deletable(identity: &Identity) -> AppResult<()> {
    if identity.role == Role::Admin {
        return Err(AppError::Forbidden("admin accounts cannot be deleted".into()));
    }
    Ok(())
}
