//! Bearer token verification.
//!
//! Credential checks live outside the post service: the transport layer asks an
//! [`IdentityVerifier`] for the caller's [`ActorId`] and hands only that id on.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::{Duration, OffsetDateTime};

use crate::domain::types::ActorId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("missing bearer token")]
    Missing,
    #[error("invalid bearer token")]
    Invalid,
    #[error("expired bearer token")]
    Expired,
    #[error("token could not be issued: {0}")]
    Issue(String),
}

pub trait IdentityVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<ActorId, AuthError>;
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: i64,
    exp: i64,
}

/// HS256 tokens whose subject is the numeric actor id.
pub struct JwtIdentity {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtIdentity {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn issue(&self, actor: ActorId, ttl: Duration) -> Result<String, AuthError> {
        let now = OffsetDateTime::now_utc();
        self.issue_at(actor, now, now + ttl)
    }

    fn issue_at(
        &self,
        actor: ActorId,
        issued_at: OffsetDateTime,
        expires_at: OffsetDateTime,
    ) -> Result<String, AuthError> {
        let claims = Claims {
            sub: actor.to_string(),
            iat: issued_at.unix_timestamp(),
            exp: expires_at.unix_timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|err| AuthError::Issue(err.to_string()))
    }
}

impl IdentityVerifier for JwtIdentity {
    fn verify(&self, token: &str) -> Result<ActorId, AuthError> {
        if token.trim().is_empty() {
            return Err(AuthError::Missing);
        }

        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(
            |err| match err.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::Invalid,
            },
        )?;

        data.claims
            .sub
            .parse::<ActorId>()
            .map_err(|_| AuthError::Invalid)
    }
}

/// Strip the `Bearer ` scheme from an `Authorization` header value.
pub fn extract_bearer(header: &str) -> Option<&str> {
    let token = header.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key";

    #[test]
    fn issued_token_verifies_to_the_same_actor() {
        let identity = JwtIdentity::new(SECRET);
        let token = identity.issue(ActorId(12), Duration::minutes(30)).unwrap();
        assert_eq!(identity.verify(&token).unwrap(), ActorId(12));
    }

    #[test]
    fn garbage_token_is_invalid() {
        let identity = JwtIdentity::new(SECRET);
        assert!(matches!(
            identity.verify("invalid_token"),
            Err(AuthError::Invalid)
        ));
        assert!(matches!(identity.verify("  "), Err(AuthError::Missing)));
    }

    #[test]
    fn token_signed_with_another_secret_is_invalid() {
        let issuer = JwtIdentity::new("other-secret");
        let token = issuer.issue(ActorId(1), Duration::minutes(5)).unwrap();
        let identity = JwtIdentity::new(SECRET);
        assert!(matches!(identity.verify(&token), Err(AuthError::Invalid)));
    }

    #[test]
    fn expired_token_is_rejected() {
        let identity = JwtIdentity::new(SECRET);
        let now = OffsetDateTime::now_utc();
        let token = identity
            .issue_at(ActorId(1), now - Duration::hours(1), now - Duration::minutes(5))
            .unwrap();
        assert!(matches!(identity.verify(&token), Err(AuthError::Expired)));
    }

    #[test]
    fn non_numeric_subject_is_invalid() {
        let identity = JwtIdentity::new(SECRET);
        let claims = Claims {
            sub: "someone@example.com".to_string(),
            iat: OffsetDateTime::now_utc().unix_timestamp(),
            exp: (OffsetDateTime::now_utc() + Duration::minutes(5)).unix_timestamp(),
        };
        let token = encode(&Header::default(), &claims, &identity.encoding_key).unwrap();
        assert!(matches!(identity.verify(&token), Err(AuthError::Invalid)));
    }

    #[test]
    fn bearer_extraction() {
        assert_eq!(extract_bearer("Bearer abc.def"), Some("abc.def"));
        assert_eq!(extract_bearer("Bearer   "), None);
        assert_eq!(extract_bearer("Basic abc"), None);
    }
}
