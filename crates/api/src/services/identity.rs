//! Identity token verification for admin requests.
//!
//! `FirebaseTokenVerifier` checks Firebase ID tokens against Google's
//! published signing keys, cached for an hour. `StaticKeyVerifier` checks
//! tokens signed by one configured RSA key.

use async_trait::async_trait;
use chrono::Utc;
use domain::services::{TokenVerificationError, TokenVerifier, VerifiedIdentity};
use jsonwebtoken::{decode, decode_header, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::RwLock;

/// Cache TTL in seconds (1 hour)
const CACHE_TTL_SECS: i64 = 3600;

/// Claims carried by an identity token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityClaims {
    pub iss: String,
    pub sub: String,
    pub aud: String,
    pub exp: i64,
    pub iat: i64,
    pub email: Option<String>,
    #[serde(default)]
    pub email_verified: bool,
}

impl From<IdentityClaims> for VerifiedIdentity {
    fn from(claims: IdentityClaims) -> Self {
        Self {
            subject: claims.sub,
            email: claims.email,
            email_verified: claims.email_verified,
        }
    }
}

fn map_jwt_error(error: jsonwebtoken::errors::Error) -> TokenVerificationError {
    match error.kind() {
        ErrorKind::ExpiredSignature => TokenVerificationError::Expired,
        ErrorKind::InvalidToken | ErrorKind::Base64(_) | ErrorKind::Json(_) | ErrorKind::Utf8(_) => {
            TokenVerificationError::InvalidFormat
        }
        _ => TokenVerificationError::Invalid(error.to_string()),
    }
}

#[derive(Debug, Clone, Deserialize)]
struct Jwks {
    keys: Vec<Jwk>,
}

#[derive(Debug, Clone, Deserialize)]
struct Jwk {
    kid: String,
    /// RSA modulus (base64url encoded)
    n: String,
    /// RSA exponent (base64url encoded)
    e: String,
}

struct CachedJwks {
    keys: Jwks,
    fetched_at: i64,
}

/// Verifies Firebase ID tokens for one project.
pub struct FirebaseTokenVerifier {
    http_client: reqwest::Client,
    jwks_url: String,
    project_id: String,
    leeway_secs: u64,
    cache: RwLock<Option<CachedJwks>>,
}

impl FirebaseTokenVerifier {
    pub fn new(project_id: String, jwks_url: String, leeway_secs: u64) -> Result<Self, reqwest::Error> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            http_client,
            jwks_url,
            project_id,
            leeway_secs,
            cache: RwLock::new(None),
        })
    }

    fn issuer(&self) -> String {
        format!("https://securetoken.google.com/{}", self.project_id)
    }

    /// Gets a JWK by kid, refetching when the cache is stale or misses.
    async fn get_jwk(&self, kid: &str) -> Result<Jwk, TokenVerificationError> {
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if Utc::now().timestamp() - cached.fetched_at < CACHE_TTL_SECS {
                    if let Some(jwk) = cached.keys.keys.iter().find(|k| k.kid == kid) {
                        return Ok(jwk.clone());
                    }
                }
            }
        }

        let jwks = self.fetch_jwks().await?;
        let jwk = jwks
            .keys
            .iter()
            .find(|k| k.kid == kid)
            .cloned()
            .ok_or_else(|| TokenVerificationError::Invalid(format!("unknown key id {}", kid)))?;

        *self.cache.write().await = Some(CachedJwks {
            keys: jwks,
            fetched_at: Utc::now().timestamp(),
        });

        Ok(jwk)
    }

    async fn fetch_jwks(&self) -> Result<Jwks, TokenVerificationError> {
        let response = self
            .http_client
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| TokenVerificationError::KeyFetch(e.to_string()))?;

        if !response.status().is_success() {
            return Err(TokenVerificationError::KeyFetch(format!(
                "HTTP {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| TokenVerificationError::KeyFetch(e.to_string()))
    }
}

#[async_trait]
impl TokenVerifier for FirebaseTokenVerifier {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, TokenVerificationError> {
        let header = decode_header(token).map_err(|_| TokenVerificationError::InvalidFormat)?;
        let kid = header.kid.ok_or(TokenVerificationError::InvalidFormat)?;

        let jwk = self.get_jwk(&kid).await?;
        let key = DecodingKey::from_rsa_components(&jwk.n, &jwk.e)
            .map_err(|e| TokenVerificationError::Invalid(format!("Invalid key: {}", e)))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.leeway = self.leeway_secs;
        validation.set_issuer(&[self.issuer()]);
        validation.set_audience(&[&self.project_id]);

        let data = decode::<IdentityClaims>(token, &key, &validation).map_err(map_jwt_error)?;
        Ok(data.claims.into())
    }
}

/// Verifies RS256 tokens signed by a single configured key.
pub struct StaticKeyVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl StaticKeyVerifier {
    /// `audience` and `issuer` are only checked when non-empty.
    pub fn from_pem(
        public_key_pem: &str,
        audience: &str,
        issuer: &str,
        leeway_secs: u64,
    ) -> Result<Self, jsonwebtoken::errors::Error> {
        let key = DecodingKey::from_rsa_pem(public_key_pem.as_bytes())?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.leeway = leeway_secs;
        if audience.is_empty() {
            validation.validate_aud = false;
        } else {
            validation.set_audience(&[audience]);
        }
        if !issuer.is_empty() {
            validation.set_issuer(&[issuer]);
        }

        Ok(Self { key, validation })
    }
}

#[async_trait]
impl TokenVerifier for StaticKeyVerifier {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, TokenVerificationError> {
        let data = decode::<IdentityClaims>(token, &self.key, &self.validation).map_err(map_jwt_error)?;
        Ok(data.claims.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_into_identity() {
        let claims = IdentityClaims {
            iss: "https://securetoken.google.com/desa".to_string(),
            sub: "uid-1".to_string(),
            aud: "desa".to_string(),
            exp: 0,
            iat: 0,
            email: Some("kades@desa.id".to_string()),
            email_verified: true,
        };
        let identity: VerifiedIdentity = claims.into();
        assert_eq!(identity.subject, "uid-1");
        assert_eq!(identity.email.as_deref(), Some("kades@desa.id"));
    }

    #[test]
    fn test_firebase_issuer() {
        let verifier =
            FirebaseTokenVerifier::new("desa-sukamaju".to_string(), "http://127.0.0.1:1/keys".to_string(), 60)
                .unwrap();
        assert_eq!(verifier.issuer(), "https://securetoken.google.com/desa-sukamaju");
    }

    #[tokio::test]
    async fn test_firebase_rejects_malformed_token_without_fetching() {
        let verifier =
            FirebaseTokenVerifier::new("desa".to_string(), "http://127.0.0.1:1/keys".to_string(), 60).unwrap();
        let err = verifier.verify("not-a-jwt").await.unwrap_err();
        assert!(matches!(err, TokenVerificationError::InvalidFormat));
    }

    #[test]
    fn test_static_verifier_rejects_bad_pem() {
        assert!(StaticKeyVerifier::from_pem("not a key", "", "", 0).is_err());
    }
}
