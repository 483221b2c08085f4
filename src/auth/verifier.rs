//! Credential verification seam.
//!
//! The gateway never issues or decodes tokens itself; an external verifier
//! service answers pass/fail plus the granted scope set. The verifier is a
//! narrow injected trait so the dispatcher stays testable with fakes.

use crate::auth::scope::ScopeSet;
use crate::types::{AuthConfig, Error, Result, UserId};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use std::time::Duration;

#[cfg(test)]
use mockall::automock;

/// Verified credential claims: who the caller is and what they may do.
#[derive(Debug, Clone)]
pub struct Claims {
    /// Subject identity from the credential.
    pub subject: UserId,
    /// Email, when the verifier provides one.
    pub email: Option<String>,
    /// Granted scopes, exact-match only.
    pub scopes: ScopeSet,
    /// Credential expiry. A passed expiry is never treated as valid.
    pub expires_at: DateTime<Utc>,
}

impl Claims {
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

/// External token-verification service.
///
/// Treated as a pass/fail plus scope-set oracle; any verifier-side failure
/// or ambiguity is an authentication failure for the caller (fail-closed).
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    /// Verify a bearer token, returning subject, scopes, and expiry.
    async fn verify(&self, token: &str) -> Result<Claims>;
}

/// Verify a token and enforce the expiry invariant on top of whatever the
/// verifier answered.
pub async fn authenticate(verifier: &dyn CredentialVerifier, token: &str) -> Result<Claims> {
    let claims = verifier.verify(token).await?;
    if claims.is_expired() {
        return Err(Error::unauthenticated("credential expired"));
    }
    Ok(claims)
}

/// Wire shape of the verification endpoint's answer.
#[derive(Debug, Deserialize)]
struct VerifierResponse {
    sub: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    permissions: Vec<String>,
    /// Expiry as unix seconds.
    exp: i64,
}

/// HTTP credential verifier posting the bearer token to a configured
/// verification endpoint.
#[derive(Debug, Clone)]
pub struct HttpVerifier {
    endpoint: String,
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpVerifier {
    pub fn new(config: &AuthConfig, client: reqwest::Client) -> Self {
        Self {
            endpoint: config.verifier_url.clone(),
            client,
            timeout: config.verify_timeout,
        }
    }
}

#[async_trait]
impl CredentialVerifier for HttpVerifier {
    async fn verify(&self, token: &str) -> Result<Claims> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(token)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| Error::unauthenticated(format!("credential verification failed: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::unauthenticated(format!(
                "credential rejected by verifier ({})",
                response.status()
            )));
        }

        let body: VerifierResponse = response
            .json()
            .await
            .map_err(|e| Error::unauthenticated(format!("malformed verifier response: {e}")))?;

        let subject = UserId::from_string(body.sub).map_err(Error::unauthenticated)?;
        let expires_at = Utc
            .timestamp_opt(body.exp, 0)
            .single()
            .ok_or_else(|| Error::unauthenticated("invalid expiry in verifier response"))?;

        let (scopes, rejected) = ScopeSet::from_strings(&body.permissions);
        if !rejected.is_empty() {
            tracing::warn!(
                subject = %subject,
                "Dropping malformed scopes from grant: {:?}",
                rejected
            );
        }

        Ok(Claims {
            subject,
            email: body.email,
            scopes,
            expires_at,
        })
    }
}
