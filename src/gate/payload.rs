//! Backing store for the protected payload.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

const FAVICON_LINKS: &str = r#"
  <link rel="icon" type="image/x-icon" href="/favicon.ico" />
  <link rel="shortcut icon" href="/favicon.ico" />
  <link rel="apple-touch-icon" href="/favicon.ico" />"#;

#[derive(Debug, Error)]
pub enum PayloadError {
    /// The file is absent or cannot be served as is.
    #[error("payload {} is unavailable: {source}", .path.display())]
    Unavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Any other I/O failure while reading.
    #[error("failed to read payload {}: {source}", .path.display())]
    Fault {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl PayloadError {
    /// Classify a read failure by its [`io::ErrorKind`].
    #[must_use]
    pub fn from_io(path: PathBuf, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound
            | io::ErrorKind::PermissionDenied
            | io::ErrorKind::IsADirectory
            | io::ErrorKind::NotADirectory
            | io::ErrorKind::InvalidData => Self::Unavailable { path, source },
            _ => Self::Fault { path, source },
        }
    }
}

/// A single payload file, read whole on every request.
#[derive(Clone, Debug)]
pub struct PayloadStore {
    path: PathBuf,
    favicon_links: bool,
}

impl PayloadStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            favicon_links: false,
        }
    }

    #[must_use]
    pub fn with_favicon_links(mut self, enabled: bool) -> Self {
        self.favicon_links = enabled;
        self
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the payload.
    ///
    /// # Errors
    /// Returns [`PayloadError::Unavailable`] if the file is missing or
    /// unreadable, [`PayloadError::Fault`] for any other I/O failure.
    pub async fn load(&self) -> Result<Vec<u8>, PayloadError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|source| PayloadError::from_io(self.path.clone(), source))?;

        debug!("Loaded payload: {} bytes", bytes.len());

        if self.favicon_links {
            Ok(inject_favicon_links(bytes))
        } else {
            Ok(bytes)
        }
    }
}

/// Insert favicon links before `</head>` unless the document already
/// references `favicon.ico`. Non UTF-8 payloads are returned untouched.
#[must_use]
pub fn inject_favicon_links(bytes: Vec<u8>) -> Vec<u8> {
    let html = match String::from_utf8(bytes) {
        Ok(html) => html,
        Err(err) => return err.into_bytes(),
    };

    if html.contains("favicon.ico") || !html.contains("</head>") {
        return html.into_bytes();
    }

    html.replacen("</head>", &format!("{FAVICON_LINKS}\n</head>"), 1)
        .into_bytes()
}
