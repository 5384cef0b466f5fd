//! # Gamegate (Access-Code Gate)
//!
//! `gamegate` is a small HTTP service that guards a single static payload (a
//! game file) behind one shared access code.
//!
//! ## Flow
//!
//! 1. The browser posts `{"accessCode": "..."}` to `/api/verify-access`.
//! 2. On a match against the configured secret, the service answers with a
//!    `game_access` cookie (`HttpOnly`, `SameSite=Strict`, 24h `Max-Age`).
//! 3. The browser requests `/api/game`; the cookie is checked and the payload
//!    is returned with `nosniff`, `DENY` framing and a private cache directive.
//!
//! ## Statelessness
//!
//! The server keeps no session table. The credential is a fixed sentinel, so a
//! restart never invalidates an issued cookie and a single session cannot be
//! revoked before it expires on the client.

pub mod cli;
pub mod gate;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};
