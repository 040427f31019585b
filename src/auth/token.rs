use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;
use crate::error::{Error, Result};

/// Claims carried by an identity token. The payload is trusted as-is once
/// the signature checks out; handlers authorize by comparing `sub` against
/// stored owner and member references.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

/// Signs and verifies identity tokens (HS256). Holds the configured
/// rotation list: the first secret signs new tokens, every secret verifies,
/// so tokens issued under a retired secret stay valid.
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: Vec<DecodingKey>,
    ttl: Duration,
}

impl TokenSigner {
    pub fn new(config: &AuthConfig) -> Result<Self> {
        let signing = config
            .secrets
            .first()
            .ok_or_else(|| Error::Config("no token signing secret configured".to_string()))?;

        Ok(Self {
            encoding: EncodingKey::from_secret(signing.as_bytes()),
            decoding: config
                .secrets
                .iter()
                .map(|s| DecodingKey::from_secret(s.as_bytes()))
                .collect(),
            ttl: Duration::hours(config.token_ttl_hours),
        })
    }

    /// Issues a token for the given user identity.
    pub fn sign(&self, user_id: &str, email: &str) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| Error::Config(format!("failed to sign token: {e}")))
    }

    /// Verifies a presented token against every configured secret and
    /// returns its claims.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        let validation = Validation::new(Algorithm::HS256);

        let mut expired = false;
        for key in &self.decoding {
            match jsonwebtoken::decode::<Claims>(token, key, &validation) {
                Ok(data) => return Ok(data.claims),
                Err(e) if matches!(e.kind(), ErrorKind::ExpiredSignature) => expired = true,
                Err(_) => {}
            }
        }

        if expired {
            Err(Error::TokenExpired)
        } else {
            Err(Error::InvalidTokenFormat)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(secrets: &[&str], ttl_hours: i64) -> AuthConfig {
        AuthConfig {
            secrets: secrets.iter().map(|s| s.to_string()).collect(),
            token_ttl_hours: ttl_hours,
        }
    }

    #[test]
    fn test_sign_and_verify_roundtrip() {
        let signer = TokenSigner::new(&config(&["top-secret"], 3)).unwrap();

        let token = signer.sign("user-1", "a@example.com").unwrap();
        let claims = signer.verify(&token).unwrap();

        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.email, "a@example.com");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_tampered_token_rejected() {
        let signer = TokenSigner::new(&config(&["top-secret"], 3)).unwrap();
        let token = signer.sign("user-1", "a@example.com").unwrap();

        let mut tampered = token.clone();
        tampered.pop();
        assert!(signer.verify(&tampered).is_err());
        assert!(signer.verify("not.a.token").is_err());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let signer = TokenSigner::new(&config(&["first"], 3)).unwrap();
        let other = TokenSigner::new(&config(&["second"], 3)).unwrap();

        let token = signer.sign("user-1", "a@example.com").unwrap();
        assert!(matches!(
            other.verify(&token),
            Err(Error::InvalidTokenFormat)
        ));
    }

    #[test]
    fn test_retired_secret_still_verifies() {
        let old = TokenSigner::new(&config(&["old-secret"], 3)).unwrap();
        let token = old.sign("user-1", "a@example.com").unwrap();

        let rotated = TokenSigner::new(&config(&["new-secret", "old-secret"], 3)).unwrap();
        let claims = rotated.verify(&token).unwrap();
        assert_eq!(claims.sub, "user-1");

        let retired = TokenSigner::new(&config(&["new-secret"], 3)).unwrap();
        assert!(retired.verify(&token).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let signer = TokenSigner::new(&config(&["top-secret"], -4)).unwrap();
        let token = signer.sign("user-1", "a@example.com").unwrap();

        assert!(matches!(signer.verify(&token), Err(Error::TokenExpired)));
    }

    #[test]
    fn test_empty_secret_list_is_config_error() {
        assert!(TokenSigner::new(&config(&[], 3)).is_err());
    }
}
