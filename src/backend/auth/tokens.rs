/**
 * Capability Tokens
 *
 * This module mints and verifies the short-lived HS256 tokens that let a
 * client hand off from the web tier to the collaboration service. A token
 * scopes its bearer to one workspace/note pair and one acting user.
 *
 * Verification is local and stateless: there is no revocation list and no
 * database lookup. Expiry is a plain wall-clock comparison with no leeway.
 */

use std::fmt;
use std::sync::Arc;

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::backend::auth::secret::resolve_secret;
use crate::backend::error::BackendError;
use crate::shared::config::{AppConfig, Environment};

/// TTL for one-shot calls (save, status)
pub const ONE_SHOT_TOKEN_TTL_SECS: u64 = 2 * 60;

/// TTL for opening an interactive editing session
pub const EDIT_SESSION_TOKEN_TTL_SECS: u64 = 10 * 60;

/// What a token grants: one user acting on one note
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteGrant {
    pub workspace_id: i64,
    pub note_public_id: String,
    pub note_id: i64,
    pub user_id: String,
}

/// Claims carried by a capability token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollabClaims {
    pub workspace_id: i64,
    pub note_public_id: String,
    pub note_id: i64,
    pub user_id: String,
    /// Issued at (Unix seconds)
    pub iat: i64,
    /// Expires at (Unix seconds), always `iat + ttl`
    pub exp: i64,
}

impl CollabClaims {
    /// The grant these claims were minted from
    pub fn grant(&self) -> NoteGrant {
        NoteGrant {
            workspace_id: self.workspace_id,
            note_public_id: self.note_public_id.clone(),
            note_id: self.note_id,
            user_id: self.user_id.clone(),
        }
    }
}

/// A freshly minted bearer token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MintedToken {
    pub token: String,
    pub expires_at: i64,
}

struct SigningKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

/// Mints and verifies capability tokens
///
/// The service is TTL-agnostic; callers pick one of the TTL constants.
/// When the secret cannot be resolved the service still constructs, but every
/// operation fails with `ConfigurationError`.
#[derive(Clone)]
pub struct TokenService {
    keys: Result<Arc<SigningKeys>, String>,
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("configured", &self.keys.is_ok())
            .finish()
    }
}

impl TokenService {
    /// Create a token service from an optional secret
    pub fn new(secret: Option<&str>, environment: Environment) -> Self {
        let keys = resolve_secret(secret, environment)
            .map(|secret| {
                Arc::new(SigningKeys {
                    encoding: EncodingKey::from_secret(secret.as_bytes()),
                    decoding: DecodingKey::from_secret(secret.as_bytes()),
                })
            })
            .map_err(|e| e.to_string());
        Self { keys }
    }

    /// Create a token service from the application configuration
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.token_secret.as_deref(), config.environment)
    }

    /// Fail fast if no signing secret is available
    pub fn ensure_configured(&self) -> Result<(), BackendError> {
        self.keys().map(|_| ())
    }

    fn keys(&self) -> Result<&SigningKeys, BackendError> {
        self.keys
            .as_deref()
            .map_err(|message| BackendError::configuration(message.clone()))
    }

    /// Mint a token for `grant` valid for `ttl_secs` from now
    pub fn mint(&self, grant: &NoteGrant, ttl_secs: u64) -> Result<MintedToken, BackendError> {
        self.mint_at(grant, ttl_secs, now_unix())
    }

    /// Mint a token as if the current time were `now`
    pub fn mint_at(&self, grant: &NoteGrant, ttl_secs: u64, now: i64) -> Result<MintedToken, BackendError> {
        let keys = self.keys()?;
        let ttl = i64::try_from(ttl_secs)
            .map_err(|_| BackendError::configuration(format!("token TTL out of range: {}", ttl_secs)))?;
        let claims = CollabClaims {
            workspace_id: grant.workspace_id,
            note_public_id: grant.note_public_id.clone(),
            note_id: grant.note_id,
            user_id: grant.user_id.clone(),
            iat: now,
            exp: now.saturating_add(ttl),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding).map_err(|e| {
            tracing::error!("[Token] Failed to sign token: {:?}", e);
            BackendError::configuration(format!("failed to sign token: {}", e))
        })?;

        tracing::debug!(
            "[Token] Minted token for note {} (workspace {}), expires at {}",
            claims.note_id,
            claims.workspace_id,
            claims.exp
        );

        Ok(MintedToken {
            token,
            expires_at: claims.exp,
        })
    }

    /// Verify a token against the current time
    pub fn verify(&self, token: &str) -> Result<CollabClaims, BackendError> {
        self.verify_at(token, now_unix())
    }

    /// Verify a token as if the current time were `now`
    ///
    /// Bad signatures, malformed claims and `now > exp` all fail with the same
    /// `InvalidToken` error.
    pub fn verify_at(&self, token: &str, now: i64) -> Result<CollabClaims, BackendError> {
        let keys = self.keys()?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "iat"]);

        let claims = decode::<CollabClaims>(token, &keys.decoding, &validation)
            .map_err(|e| {
                tracing::debug!("[Token] Rejected token: {:?}", e);
                BackendError::InvalidToken
            })?
            .claims;

        if claims.exp < claims.iat {
            tracing::debug!("[Token] Rejected token: exp {} before iat {}", claims.exp, claims.iat);
            return Err(BackendError::InvalidToken);
        }
        if now > claims.exp {
            tracing::debug!("[Token] Rejected token: expired at {}, now {}", claims.exp, now);
            return Err(BackendError::InvalidToken);
        }

        Ok(claims)
    }
}

/// Current Unix time in seconds
pub fn now_unix() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Extract the token from an `Authorization: Bearer <token>` value
pub fn bearer_token(header_value: &str) -> Option<&str> {
    header_value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
