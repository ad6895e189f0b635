//! Caller identity verification.
//!
//! [`IdentityVerifier`] is the seam to whatever issues session tokens.
//! [`JwtVerifier`] checks HS256 tokens signed with a shared secret, as
//! issued by hosted auth providers for the `authenticated` audience.

use async_trait::async_trait;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use stealth_types::config::AuthConfig;
use stealth_types::{AuthError, Identity, SecretString};
use tracing::debug;

/// Turns a bearer token into an [`Identity`].
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Identity, AuthError>;
}

#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    user_metadata: Option<UserMetadata>,
}

#[derive(Debug, Default, Deserialize)]
struct UserMetadata {
    #[serde(default)]
    full_name: Option<String>,
    #[serde(default)]
    avatar_url: Option<String>,
}

/// HS256 JWT verification against a shared secret.
pub struct JwtVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(secret: &SecretString, audience: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[audience]);
        Self {
            key: DecodingKey::from_secret(secret.expose().as_bytes()),
            validation,
        }
    }

    /// Build from config. `None` when no signing secret is available.
    pub fn from_config(auth: &AuthConfig) -> Option<Self> {
        let secret = auth.resolve_secret()?;
        Some(Self::new(&secret, &auth.audience))
    }
}

#[async_trait]
impl IdentityVerifier for JwtVerifier {
    async fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.key, &self.validation).map_err(
            |e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => {
                    debug!(error = %e, "token rejected");
                    AuthError::Invalid
                }
            },
        )?;

        let claims = data.claims;
        if claims.sub.is_empty() {
            return Err(AuthError::Invalid);
        }
        let meta = claims.user_metadata.unwrap_or_default();
        Ok(Identity {
            id: claims.sub,
            email: claims.email,
            full_name: meta.full_name,
            avatar_url: meta.avatar_url,
        })
    }
}

impl std::fmt::Debug for JwtVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtVerifier")
            .field("audience", &self.validation.aud)
            .field("key", &"***")
            .finish()
    }
}
