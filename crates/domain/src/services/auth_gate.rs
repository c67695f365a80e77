//! Admin authentication gate.
//!
//! Verifies a bearer credential with the configured identity provider and
//! checks the verified email against a static allow-list.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;

/// Identity extracted from a verified credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    pub subject: String,
    pub email: Option<String>,
    pub email_verified: bool,
}

/// Errors raised while verifying an identity token.
#[derive(Debug, thiserror::Error)]
pub enum TokenVerificationError {
    #[error("Invalid token format")]
    InvalidFormat,

    #[error("Token expired")]
    Expired,

    #[error("Token validation failed: {0}")]
    Invalid(String),

    #[error("Failed to fetch signing keys: {0}")]
    KeyFetch(String),
}

/// Verifies identity-provider tokens against a trust root.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, TokenVerificationError>;
}

/// Gate failures, mapped to 401 and 403 by the HTTP layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Admin privileges required")]
    Forbidden,
}

/// Case-insensitive set of admin email addresses.
#[derive(Debug, Clone, Default)]
pub struct AdminAllowList {
    emails: HashSet<String>,
}

impl AdminAllowList {
    /// Parses a comma-separated list such as the `ADMIN_EMAILS` variable.
    pub fn from_csv(value: &str) -> Self {
        let emails = value
            .split(',')
            .map(|e| e.trim().to_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        Self { emails }
    }

    pub fn contains(&self, email: &str) -> bool {
        self.emails.contains(&email.trim().to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.emails.len()
    }

    pub fn is_empty(&self) -> bool {
        self.emails.is_empty()
    }
}

/// Proof that the gate admitted a caller. Only [`AuthGate`] creates one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminIdentity {
    subject: String,
    email: String,
}

impl AdminIdentity {
    pub(crate) fn new(subject: String, email: String) -> Self {
        Self { subject, email }
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}

/// Verifies admin credentials.
#[derive(Clone)]
pub struct AuthGate {
    verifier: Arc<dyn TokenVerifier>,
    allow_list: AdminAllowList,
}

impl AuthGate {
    pub fn new(verifier: Arc<dyn TokenVerifier>, allow_list: AdminAllowList) -> Self {
        if allow_list.is_empty() {
            tracing::warn!("Admin allow-list is empty; every admin request will be forbidden");
        }
        Self { verifier, allow_list }
    }

    /// Admits the holder of `credential` if it verifies and its email is
    /// both verified by the provider and allow-listed.
    pub async fn verify_admin(&self, credential: Option<&str>) -> Result<AdminIdentity, AuthError> {
        let token = credential
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::Unauthorized)?;

        let identity = self.verifier.verify(token).await.map_err(|e| {
            tracing::debug!(error = %e, "Admin token rejected");
            AuthError::Unauthorized
        })?;

        if !identity.email_verified {
            tracing::warn!(
                subject = %identity.subject,
                email = ?identity.email,
                "Identity email is not verified"
            );
            return Err(AuthError::Forbidden);
        }

        let email = match identity.email {
            Some(email) if self.allow_list.contains(&email) => email,
            other => {
                tracing::warn!(
                    subject = %identity.subject,
                    email = ?other,
                    "Verified identity is not an admin"
                );
                return Err(AuthError::Forbidden);
            }
        };

        Ok(AdminIdentity::new(identity.subject, email))
    }
}
