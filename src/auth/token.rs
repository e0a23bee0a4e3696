//! Bearer tokens of the form `<user id>.<expiry unix seconds>.<hex HMAC-SHA256>`.

use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::AuthError;
use crate::models::UserId;

type HmacSha256 = Hmac<Sha256>;

/// Seven days.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(7 * 24 * 3600);

/// A freshly issued token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// What a valid token asserts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Claims {
    pub user_id: UserId,
    pub expires_at: DateTime<Utc>,
}

/// Issues and verifies tokens with a fixed lifetime.
#[derive(Clone)]
pub struct TokenSigner {
    key: HmacSha256,
    ttl_secs: i64,
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner")
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}

impl TokenSigner {
    pub fn new(secret: &[u8], ttl: Duration) -> Result<Self, AuthError> {
        if secret.is_empty() {
            return Err(AuthError::InvalidKey("secret must not be empty".to_string()));
        }
        let key = HmacSha256::new_from_slice(secret)
            .map_err(|e| AuthError::InvalidKey(e.to_string()))?;
        let ttl_secs = i64::try_from(ttl.as_secs())
            .map_err(|_| AuthError::InvalidKey("token lifetime too long".to_string()))?;
        Ok(Self { key, ttl_secs })
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs.unsigned_abs())
    }

    pub fn issue(&self, user_id: UserId) -> IssuedToken {
        self.issue_at(user_id, Utc::now())
    }

    pub fn issue_at(&self, user_id: UserId, now: DateTime<Utc>) -> IssuedToken {
        let expires = now.timestamp().saturating_add(self.ttl_secs);
        let payload = format!("{}.{}", user_id, expires);
        let signature = self.sign(&payload);
        IssuedToken {
            token: format!("{}.{}", payload, signature),
            expires_at: timestamp(expires),
        }
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        self.verify_at(token, Utc::now())
    }

    /// Check signature and expiry. Forged, malformed and expired tokens
    /// are all rejected.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, AuthError> {
        let (payload, signature) = token.rsplit_once('.').ok_or(AuthError::InvalidToken)?;
        let (user_id, expires) = payload.split_once('.').ok_or(AuthError::InvalidToken)?;

        let signature = hex::decode(signature).map_err(|_| AuthError::InvalidToken)?;
        let mut mac = self.key.clone();
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| AuthError::InvalidToken)?;

        let user_id: UserId = user_id.parse().map_err(|_| AuthError::InvalidToken)?;
        let expires: i64 = expires.parse().map_err(|_| AuthError::InvalidToken)?;
        if now.timestamp() >= expires {
            return Err(AuthError::Expired);
        }

        Ok(Claims {
            user_id,
            expires_at: timestamp(expires),
        })
    }

    fn sign(&self, payload: &str) -> String {
        let mut mac = self.key.clone();
        mac.update(payload.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }
}

fn timestamp(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer() -> TokenSigner {
        TokenSigner::new(b"test-secret", DEFAULT_TOKEN_TTL).unwrap()
    }

    #[test]
    fn test_issue_and_verify() {
        let signer = signer();
        let now = Utc::now();
        let issued = signer.issue_at(UserId::new(7), now);

        let claims = signer.verify_at(&issued.token, now).unwrap();
        assert_eq!(claims.user_id, UserId::new(7));
        assert_eq!(claims.expires_at, issued.expires_at);
        assert_eq!(
            issued.expires_at.timestamp() - now.timestamp(),
            7 * 24 * 3600
        );
    }

    #[test]
    fn test_expired_token() {
        let signer = signer();
        let now = Utc::now();
        let issued = signer.issue_at(UserId::new(7), now);

        let later = now + chrono::Duration::days(8);
        assert!(matches!(
            signer.verify_at(&issued.token, later),
            Err(AuthError::Expired)
        ));
    }

    #[test]
    fn test_tampered_user_id_rejected() {
        let signer = signer();
        let issued = signer.issue(UserId::new(7));
        let forged = issued.token.replacen("7.", "8.", 1);
        assert!(matches!(signer.verify(&forged), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_other_secret_rejected() {
        let issued = signer().issue(UserId::new(7));
        let other = TokenSigner::new(b"another-secret", DEFAULT_TOKEN_TTL).unwrap();
        assert!(matches!(other.verify(&issued.token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_garbage_rejected() {
        let signer = signer();
        for token in ["", "abc", "1.2", "1.2.zz", "x.y.00"] {
            assert!(signer.verify(token).is_err(), "accepted {:?}", token);
        }
    }

    #[test]
    fn test_empty_secret_rejected() {
        assert!(TokenSigner::new(b"", DEFAULT_TOKEN_TTL).is_err());
    }
}
