//! Session credential, its delivery policy, and the carrier that moves it
//! between the gate and the browser.

use axum::http::{
    header::{InvalidHeaderValue, COOKIE, SET_COOKIE},
    HeaderMap, HeaderName, HeaderValue,
};
use secrecy::{ExposeSecret, SecretString};
use std::fmt::Debug;
use subtle::ConstantTimeEq;

pub const CREDENTIAL_NAME: &str = "game_access";
pub const SESSION_TTL_SECONDS: u64 = 24 * 60 * 60;

/// Opaque proof that the access code was presented.
///
/// There are no user identities, so every issued credential carries the same
/// sentinel value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionCredential {
    value: &'static str,
}

impl SessionCredential {
    pub const GRANTED: Self = Self { value: "granted" };

    #[must_use]
    pub fn value(&self) -> &'static str {
        self.value
    }
}

/// Delivery flags for an issued credential.
///
/// `HttpOnly` and `SameSite=Strict` are not configurable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CredentialPolicy {
    pub secure: bool,
    pub max_age_seconds: u64,
    pub path: &'static str,
}

impl CredentialPolicy {
    #[must_use]
    pub fn new(secure: bool) -> Self {
        Self {
            secure,
            max_age_seconds: SESSION_TTL_SECONDS,
            path: "/",
        }
    }
}

/// Transport for the session credential.
pub trait CredentialCarrier: Debug + Send + Sync {
    /// Build the response header that hands the credential to the client.
    ///
    /// # Errors
    /// Returns an error if the credential cannot be encoded as a header value.
    fn issue(
        &self,
        credential: &SessionCredential,
        policy: &CredentialPolicy,
    ) -> Result<(HeaderName, HeaderValue), InvalidHeaderValue>;

    /// Read the presented credential value back from request headers.
    fn read(&self, headers: &HeaderMap) -> Option<String>;
}

/// Carries the credential in a cookie.
#[derive(Clone, Debug)]
pub struct CookieCarrier {
    name: &'static str,
}

impl CookieCarrier {
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self { name }
    }
}

impl Default for CookieCarrier {
    fn default() -> Self {
        Self::new(CREDENTIAL_NAME)
    }
}

impl CredentialCarrier for CookieCarrier {
    fn issue(
        &self,
        credential: &SessionCredential,
        policy: &CredentialPolicy,
    ) -> Result<(HeaderName, HeaderValue), InvalidHeaderValue> {
        let mut cookie = format!(
            "{}={}; Path={}; HttpOnly; SameSite=Strict; Max-Age={}",
            self.name,
            credential.value(),
            policy.path,
            policy.max_age_seconds
        );
        if policy.secure {
            cookie.push_str("; Secure");
        }
        Ok((SET_COOKIE, HeaderValue::from_str(&cookie)?))
    }

    fn read(&self, headers: &HeaderMap) -> Option<String> {
        // First matching cookie wins across all `Cookie` headers.
        headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|header| header.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(key, _)| key.trim() == self.name)
            .map(|(_, value)| value.trim().to_string())
    }
}

/// Shared credential check used for every guarded resource.
#[must_use]
pub fn credential_is_valid(presented: Option<&str>, expected: &SessionCredential) -> bool {
    presented.is_some_and(|value| value == expected.value())
}

/// Compare a submitted access code against the configured secret.
///
/// Runs in constant time for inputs of equal length.
#[must_use]
pub fn access_code_matches(submitted: &str, secret: &SecretString) -> bool {
    submitted
        .as_bytes()
        .ct_eq(secret.expose_secret().as_bytes())
        .into()
}
