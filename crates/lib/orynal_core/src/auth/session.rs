//! Session issuer: login, registration and token refresh.

use chrono::Utc;
use serde::Deserialize;
use tracing::{debug, info};

use super::AuthError;
use super::jwt::{self, ACCESS_TOKEN_TTL, REFRESH_TOKEN_TTL, TokenError};
use super::password::{self, PasswordError};
use crate::models::auth::{
    AccessClaims, Identity, NewIdentity, RefreshClaims, Registration, Role, SessionRecord,
    TokenPair,
};
use crate::store::{IdentityStore, SessionStore};

/// Minimum accepted password length on registration.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Issues token pairs and keeps the latest pair per identity.
pub struct SessionIssuer<'a> {
    identities: &'a dyn IdentityStore,
    sessions: &'a dyn SessionStore,
    secret: &'a [u8],
}

impl<'a> SessionIssuer<'a> {
    pub fn new(
        identities: &'a dyn IdentityStore,
        sessions: &'a dyn SessionStore,
        secret: &'a [u8],
    ) -> Self {
        Self {
            identities,
            sessions,
            secret,
        }
    }

    /// Authenticate with email + password and issue a fresh pair.
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenPair, AuthError> {
        let Some(identity) = self.identities.find_by_email(email).await? else {
            debug!(email, "login for unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        match password::verify_password_blocking(password.to_string(), identity.password_hash.clone())
            .await
        {
            Ok(()) => {}
            Err(PasswordError::Mismatch) => {
                debug!(user_id = identity.id, "login with wrong password");
                return Err(AuthError::InvalidCredentials);
            }
            Err(e) => return Err(e.into()),
        }

        let pair = self.issue(&identity).await?;
        info!(user_id = identity.id, role = %identity.role, "user logged in");
        Ok(pair)
    }

    /// Create a [`Role::User`] identity. Does not log the user in.
    pub async fn register(&self, registration: Registration) -> Result<i64, AuthError> {
        validate_registration(&registration)?;

        let password_hash = password::hash_password_blocking(registration.password).await?;
        let identity = self
            .identities
            .save(NewIdentity {
                name: registration.name,
                surname: registration.surname,
                email: registration.email,
                phone: registration.phone,
                password_hash,
                role: Role::User,
            })
            .await?;

        info!(user_id = identity.id, "user registered");
        Ok(identity.id)
    }

    /// Exchange a refresh token for a new pair carrying the identity's
    /// current role.
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let claims: RefreshClaims = jwt::verify(refresh_token, self.secret)?;
        let Some(identity) = self.identities.find_by_id(claims.user_id).await? else {
            debug!(user_id = claims.user_id, "refresh for deleted identity");
            return Err(AuthError::InvalidCredentials);
        };
        self.issue(&identity).await
    }

    /// The `user_id` claim of an access or refresh token.
    pub fn jwt_user_id(&self, token: &str) -> Result<i64, TokenError> {
        jwt_user_id(token, self.secret)
    }

    /// The `role` claim of an access token.
    pub fn jwt_user_role(&self, token: &str) -> Result<Role, TokenError> {
        jwt_user_role(token, self.secret)
    }

    async fn issue(&self, identity: &Identity) -> Result<TokenPair, AuthError> {
        let access_token = jwt::sign(
            &AccessClaims {
                email: identity.email.clone(),
                user_id: identity.id,
                role: identity.role,
            },
            self.secret,
            ACCESS_TOKEN_TTL,
        )?;
        let refresh_token = jwt::sign(
            &RefreshClaims {
                email: identity.email.clone(),
                user_id: identity.id,
            },
            self.secret,
            REFRESH_TOKEN_TTL,
        )?;

        let now = Utc::now();
        self.sessions
            .upsert(SessionRecord {
                user_id: identity.id,
                role: identity.role,
                email: identity.email.clone(),
                access_token: access_token.clone(),
                refresh_token: refresh_token.clone(),
                created_at: now,
                updated_at: now,
            })
            .await?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }
}

#[derive(Deserialize)]
struct SubjectClaim {
    user_id: i64,
}

#[derive(Deserialize)]
struct RoleClaim {
    role: Role,
}

/// The `user_id` claim of an access or refresh token.
pub fn jwt_user_id(token: &str, secret: &[u8]) -> Result<i64, TokenError> {
    jwt::verify::<SubjectClaim>(token, secret).map(|c| c.user_id)
}

/// The `role` claim of an access token.
pub fn jwt_user_role(token: &str, secret: &[u8]) -> Result<Role, TokenError> {
    jwt::verify::<RoleClaim>(token, secret).map(|c| c.role)
}

/// Field checks shared by sign-up and admin-created accounts.
pub fn validate_registration(registration: &Registration) -> Result<(), AuthError> {
    if registration.name.trim().is_empty() {
        return Err(AuthError::Validation("name is required".into()));
    }
    if !registration.email.contains('@') {
        return Err(AuthError::Validation("email is invalid".into()));
    }
    if registration.phone.trim().is_empty() {
        return Err(AuthError::Validation("phone is required".into()));
    }
    if registration.password.len() < MIN_PASSWORD_LEN {
        return Err(AuthError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}
