//! Bearer token signing and verification.
//!
//! Tokens are HS256 JWTs with a fixed issuer. Signature and expiry are
//! verified on every use; there is no refresh mechanism.

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::auth::roles::RoleSet;

/// Issuer claim stamped into every token and required on verification.
pub const ISSUER: &str = "task-platform";

/// Decoded token payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user id.
    pub sub: String,
    pub email: String,
    #[serde(default)]
    pub roles: RoleSet,
    /// Expiry as seconds since the epoch.
    pub exp: i64,
    pub iss: String,
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("token invalid: {0}")]
    Invalid(#[source] jsonwebtoken::errors::Error),
}

/// Issues tokens. Held only by the user service's login path.
#[derive(Clone)]
pub struct TokenSigner {
    encoding: EncodingKey,
    ttl_secs: i64,
}

impl TokenSigner {
    pub fn new(secret: &str, ttl_secs: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            ttl_secs,
        }
    }

    /// Sign a token for `sub`. The expiry is now + the configured ttl.
    pub fn sign(
        &self,
        sub: String,
        email: String,
        roles: RoleSet,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = Claims {
            sub,
            email,
            roles,
            exp: Utc::now().timestamp() + self.ttl_secs,
            iss: ISSUER.to_string(),
        };
        encode(&Header::default(), &claims, &self.encoding)
    }
}

/// Verifies tokens. Shared by the gateway and both services.
#[derive(Clone)]
pub struct TokenVerifier {
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Zero leeway: a token is expired the second its exp passes.
        validation.leeway = 0;
        validation.set_issuer(&[ISSUER]);
        Self {
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|err| match err.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(err),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::roles::Role;

    fn signer(ttl_secs: i64) -> TokenSigner {
        TokenSigner::new("test-secret", ttl_secs)
    }

    fn verifier() -> TokenVerifier {
        TokenVerifier::new("test-secret")
    }

    #[test]
    fn sign_then_verify_round_trips_claims() {
        let token = signer(60)
            .sign(
                "user-1".into(),
                "a@example.com".into(),
                RoleSet::from_iter([Role::Engineer]),
            )
            .expect("sign");

        let claims = verifier().verify(&token).expect("verify");
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.email, "a@example.com");
        assert!(claims.roles.contains(Role::Engineer));
        assert_eq!(claims.iss, ISSUER);
    }

    #[test]
    fn expired_token_is_rejected_as_expired() {
        let token = signer(-60)
            .sign("user-1".into(), "a@example.com".into(), RoleSet::default())
            .expect("sign");

        assert!(matches!(verifier().verify(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn corrupted_signature_is_rejected_as_invalid() {
        let token = signer(60)
            .sign("user-1".into(), "a@example.com".into(), RoleSet::default())
            .expect("sign");

        // Flip the first signature character; any change there alters the
        // decoded signature bytes.
        let dot = token.rfind('.').expect("jwt has a signature segment");
        let first_sig = token.as_bytes()[dot + 1];
        let mut corrupted = token.clone();
        corrupted.replace_range(
            dot + 1..dot + 2,
            if first_sig == b'A' { "B" } else { "A" },
        );

        assert!(matches!(
            verifier().verify(&corrupted),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = signer(60)
            .sign("user-1".into(), "a@example.com".into(), RoleSet::default())
            .expect("sign");

        let other = TokenVerifier::new("another-secret");
        assert!(matches!(other.verify(&token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn wrong_issuer_is_rejected() {
        let claims = Claims {
            sub: "user-1".into(),
            email: "a@example.com".into(),
            roles: RoleSet::default(),
            exp: Utc::now().timestamp() + 60,
            iss: "someone-else".into(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .expect("encode");

        assert!(matches!(
            verifier().verify(&token),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!(
            verifier().verify("not-a-token"),
            Err(TokenError::Invalid(_))
        ));
    }
}
