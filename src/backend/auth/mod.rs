//! Authentication Module
//!
//! Capability tokens for the hand-off from the web tier to the collaboration
//! service.
//!
//! # Module Structure
//!
//! ```text
//! auth/
//! ├── mod.rs     - Module exports and documentation
//! ├── secret.rs  - Signing secret resolution
//! └── tokens.rs  - Token minting and verification
//! ```
//!
//! # Token Flow
//!
//! 1. **Mint**: the web tier authenticates the user, resolves the note, and
//!    mints a token scoped to that note (2 minutes for one-shot calls,
//!    10 minutes for an editing session).
//! 2. **Transport**: the token travels as `Authorization: Bearer <token>`
//!    (or `?token=` on WebSocket upgrades).
//! 3. **Verify**: the collaboration service checks signature and expiry
//!    locally before letting the session proceed.

/// Signing secret resolution
pub mod secret;

/// Capability token minting and verification
pub mod tokens;

pub use tokens::{
    bearer_token, now_unix, CollabClaims, MintedToken, NoteGrant, TokenService,
    EDIT_SESSION_TOKEN_TTL_SECS, ONE_SHOT_TOKEN_TTL_SECS,
};
