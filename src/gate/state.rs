//! Gate configuration and shared request state.

use secrecy::{ExposeSecret, SecretString};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::credential::{CookieCarrier, CredentialCarrier, CredentialPolicy};
use super::payload::PayloadStore;

pub const DEFAULT_PAYLOAD_PATH: &str = "game.obfuscated.html";

#[derive(Clone, Debug)]
pub struct GateConfig {
    access_code: Option<SecretString>,
    secure_cookies: bool,
    payload_path: PathBuf,
    favicon_links: bool,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            access_code: None,
            secure_cookies: false,
            payload_path: PathBuf::from(DEFAULT_PAYLOAD_PATH),
            favicon_links: false,
        }
    }
}

impl GateConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the shared access code. Empty values leave the gate unconfigured.
    #[must_use]
    pub fn with_access_code(mut self, access_code: Option<SecretString>) -> Self {
        self.access_code = access_code.filter(|code| !code.expose_secret().is_empty());
        self
    }

    #[must_use]
    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.secure_cookies = secure;
        self
    }

    #[must_use]
    pub fn with_payload_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.payload_path = path.into();
        self
    }

    #[must_use]
    pub fn with_favicon_links(mut self, enabled: bool) -> Self {
        self.favicon_links = enabled;
        self
    }

    #[must_use]
    pub fn access_code(&self) -> Option<&SecretString> {
        self.access_code.as_ref()
    }

    #[must_use]
    pub fn secure_cookies(&self) -> bool {
        self.secure_cookies
    }

    #[must_use]
    pub fn payload_path(&self) -> &Path {
        &self.payload_path
    }

    #[must_use]
    pub fn favicon_links(&self) -> bool {
        self.favicon_links
    }

    #[must_use]
    pub fn credential_policy(&self) -> CredentialPolicy {
        CredentialPolicy::new(self.secure_cookies)
    }
}

/// Immutable state shared by every handler through an `Extension`.
#[derive(Debug)]
pub struct GateState {
    config: GateConfig,
    carrier: Arc<dyn CredentialCarrier>,
    payload: PayloadStore,
}

impl GateState {
    #[must_use]
    pub fn new(config: GateConfig) -> Self {
        let payload = PayloadStore::new(config.payload_path())
            .with_favicon_links(config.favicon_links());
        Self {
            config,
            carrier: Arc::new(CookieCarrier::default()),
            payload,
        }
    }

    #[must_use]
    pub fn with_carrier(mut self, carrier: Arc<dyn CredentialCarrier>) -> Self {
        self.carrier = carrier;
        self
    }

    #[must_use]
    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    #[must_use]
    pub fn carrier(&self) -> &dyn CredentialCarrier {
        self.carrier.as_ref()
    }

    #[must_use]
    pub fn payload(&self) -> &PayloadStore {
        &self.payload
    }
}
