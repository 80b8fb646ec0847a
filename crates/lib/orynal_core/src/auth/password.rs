//! Password hashing via bcrypt.

use thiserror::Error;

/// bcrypt cost factor.
const BCRYPT_COST: u32 = 10;

/// Credential hasher errors.
#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("password hashing failed: {0}")]
    Hashing(String),

    #[error("password does not match")]
    Mismatch,

    #[error("stored password digest is malformed: {0}")]
    MalformedDigest(String),
}

/// Hash a password with bcrypt (cost 10, random salt).
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    bcrypt::hash(password, BCRYPT_COST).map_err(|e| PasswordError::Hashing(e.to_string()))
}

/// Verify a password against a bcrypt digest.
pub fn verify_password(password: &str, digest: &str) -> Result<(), PasswordError> {
    match bcrypt::verify(password, digest) {
        Ok(true) => Ok(()),
        Ok(false) => Err(PasswordError::Mismatch),
        Err(e) => Err(PasswordError::MalformedDigest(e.to_string())),
    }
}

/// [`hash_password`] on the blocking pool; bcrypt is CPU-bound.
pub async fn hash_password_blocking(password: String) -> Result<String, PasswordError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| PasswordError::Hashing(format!("hash task: {e}")))?
}

/// [`verify_password`] on the blocking pool.
pub async fn verify_password_blocking(password: String, digest: String) -> Result<(), PasswordError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &digest))
        .await
        .map_err(|e| PasswordError::Hashing(format!("verify task: {e}")))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let digest = hash_password("hunter22").unwrap();
        assert_ne!(digest, "hunter22");
        assert!(verify_password("hunter22", &digest).is_ok());
    }

    #[test]
    fn wrong_password_is_a_mismatch() {
        let digest = hash_password("hunter22").unwrap();
        assert!(matches!(
            verify_password("hunter23", &digest),
            Err(PasswordError::Mismatch)
        ));
    }

    #[test]
    fn salts_differ_between_hashes() {
        let a = hash_password("same").unwrap();
        let b = hash_password("same").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn garbage_digest_is_malformed() {
        assert!(matches!(
            verify_password("anything", "not-a-bcrypt-digest"),
            Err(PasswordError::MalformedDigest(_))
        ));
    }

    #[tokio::test]
    async fn blocking_helpers_round_trip() {
        let digest = hash_password_blocking("s3cret!".into()).await.unwrap();
        verify_password_blocking("s3cret!".into(), digest.clone())
            .await
            .unwrap();
        assert!(
            verify_password_blocking("nope".into(), digest)
                .await
                .is_err()
        );
    }
}
