//! JWT signing and verification (HS256 only).
//!
//! Claim types stay free of `exp`: [`sign`] stamps the expiry from a TTL and
//! [`verify`] strips it again, so access and refresh claims are plain
//! structs in [`crate::models::auth`].

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, decode_header, encode,
};
use rand::distr::Alphanumeric;
use rand::{Rng, rng};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Access token lifetime.
pub const ACCESS_TOKEN_TTL: Duration = Duration::hours(1);

/// Refresh token lifetime.
pub const REFRESH_TOKEN_TTL: Duration = Duration::hours(24);

const ALGORITHM: Algorithm = Algorithm::HS256;

/// Token codec errors. Expiry is always reported apart from other failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("token signing failed: {0}")]
    Signing(String),

    #[error("token expired")]
    Expired,

    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("unexpected signing method: {0}")]
    WrongAlgorithm(String),

    #[error("malformed token: {0}")]
    Malformed(String),
}

impl TokenError {
    pub fn is_expired(&self) -> bool {
        matches!(self, TokenError::Expired)
    }
}

#[derive(Serialize)]
struct Stamped<'a, C> {
    #[serde(flatten)]
    claims: &'a C,
    exp: i64,
}

#[derive(Deserialize)]
struct Decoded<C> {
    #[serde(flatten)]
    claims: C,
    #[allow(dead_code)]
    exp: i64,
}

/// Sign `claims` with an expiry `ttl` from now.
pub fn sign<C: Serialize>(claims: &C, secret: &[u8], ttl: Duration) -> Result<String, TokenError> {
    sign_at(claims, secret, ttl, Utc::now())
}

/// Sign `claims` as if issued at `issued_at`.
pub fn sign_at<C: Serialize>(
    claims: &C,
    secret: &[u8],
    ttl: Duration,
    issued_at: DateTime<Utc>,
) -> Result<String, TokenError> {
    if secret.is_empty() {
        return Err(TokenError::Signing("empty signing secret".into()));
    }
    let stamped = Stamped {
        claims,
        exp: (issued_at + ttl).timestamp(),
    };
    encode(
        &Header::new(ALGORITHM),
        &stamped,
        &EncodingKey::from_secret(secret),
    )
    .map_err(|e| TokenError::Signing(format!("jwt encode: {e}")))
}

/// Verify a token and return its claims.
///
/// The header algorithm is checked against HS256 before the signature is
/// looked at, so a token signed with any other method is refused even if the
/// key would happen to validate it.
pub fn verify<C: DeserializeOwned>(token: &str, secret: &[u8]) -> Result<C, TokenError> {
    if secret.is_empty() {
        return Err(TokenError::Signing("empty signing secret".into()));
    }

    let header = decode_header(token).map_err(|e| TokenError::Malformed(e.to_string()))?;
    if header.alg != ALGORITHM {
        return Err(TokenError::WrongAlgorithm(format!("{:?}", header.alg)));
    }

    let mut validation = Validation::new(ALGORITHM);
    validation.leeway = 0;

    decode::<Decoded<C>>(token, &DecodingKey::from_secret(secret), &validation)
        .map(|data| data.claims.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            ErrorKind::InvalidAlgorithm => TokenError::WrongAlgorithm(e.to_string()),
            _ => TokenError::Malformed(e.to_string()),
        })
}

/// Pick the signing secret: the configured one when it is not blank.
///
/// Falls back to a random per-process secret, which invalidates every
/// issued token on restart.
pub fn resolve_jwt_secret(configured: Option<String>) -> String {
    if let Some(secret) = configured
        && !secret.trim().is_empty()
    {
        return secret;
    }
    warn!("JWT_SECRET is not set; using an ephemeral signing secret");
    rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::{AccessClaims, RefreshClaims, Role};

    const SECRET: &[u8] = b"test-secret";

    fn access() -> AccessClaims {
        AccessClaims {
            email: "guest@example.com".into(),
            user_id: 7,
            role: Role::Owner,
        }
    }

    #[test]
    fn sign_then_verify_returns_claims() {
        let token = sign(&access(), SECRET, ACCESS_TOKEN_TTL).unwrap();
        let claims: AccessClaims = verify(&token, SECRET).unwrap();
        assert_eq!(claims, access());
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        let issued = Utc::now() - Duration::hours(2);
        let token = sign_at(&access(), SECRET, ACCESS_TOKEN_TTL, issued).unwrap();
        let err = verify::<AccessClaims>(&token, SECRET).unwrap_err();
        assert_eq!(err, TokenError::Expired);
        assert!(err.is_expired());
    }

    #[test]
    fn refresh_token_outlives_access_token() {
        let issued = Utc::now() - Duration::hours(2);
        let claims = RefreshClaims {
            email: "guest@example.com".into(),
            user_id: 7,
        };
        let token = sign_at(&claims, SECRET, REFRESH_TOKEN_TTL, issued).unwrap();
        assert_eq!(verify::<RefreshClaims>(&token, SECRET).unwrap(), claims);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = sign(&access(), SECRET, ACCESS_TOKEN_TTL).unwrap();
        let err = verify::<AccessClaims>(&token, b"another-secret").unwrap_err();
        assert_eq!(err, TokenError::InvalidSignature);
        assert!(!err.is_expired());
    }

    #[test]
    fn other_algorithms_are_rejected() {
        let stamped = Stamped {
            claims: &access(),
            exp: (Utc::now() + ACCESS_TOKEN_TTL).timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS512),
            &stamped,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();
        assert!(matches!(
            verify::<AccessClaims>(&token, SECRET),
            Err(TokenError::WrongAlgorithm(_))
        ));
    }

    #[test]
    fn empty_secret_cannot_sign() {
        assert!(matches!(
            sign(&access(), b"", ACCESS_TOKEN_TTL),
            Err(TokenError::Signing(_))
        ));
    }

    #[test]
    fn garbage_is_malformed() {
        assert!(matches!(
            verify::<AccessClaims>("not.a.jwt", SECRET),
            Err(TokenError::Malformed(_))
        ));
    }

    #[test]
    fn refresh_token_lacks_access_claims() {
        let claims = RefreshClaims {
            email: "guest@example.com".into(),
            user_id: 7,
        };
        let token = sign(&claims, SECRET, REFRESH_TOKEN_TTL).unwrap();
        assert!(matches!(
            verify::<AccessClaims>(&token, SECRET),
            Err(TokenError::Malformed(_))
        ));
    }

    #[test]
    fn configured_secret_wins() {
        assert_eq!(resolve_jwt_secret(Some("s3cret".into())), "s3cret");
    }

    #[test]
    fn blank_secret_falls_back_to_a_random_one() {
        let a = resolve_jwt_secret(Some("   ".into()));
        let b = resolve_jwt_secret(None);
        assert_eq!(a.len(), 64);
        assert_eq!(b.len(), 64);
        assert_ne!(a, b);
    }
}
