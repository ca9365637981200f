//! Client configuration.
//!
//! Every filesystem location and network endpoint the client touches comes
//! from here. Defaults are relative to the working directory.

use std::{path::PathBuf, time::Duration};

use microblog_proto::limits::{DEFAULT_PAGE_CAP, MAX_ATTACHMENT_BYTES};

use crate::error::ClientError;

/// Default feed store address.
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8080";

/// Default identity file.
pub const DEFAULT_IDENTITY_PATH: &str = "private/identity.mb";

/// Default directory for saved attachments.
pub const DEFAULT_ATTACHMENT_DIR: &str = "private";

/// Default bound on each store request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Feed store base URL
    pub server_url: String,
    /// Local identity file
    pub identity_path: PathBuf,
    /// Directory of trusted public identity files, if any
    pub keyring_dir: Option<PathBuf>,
    /// Where inbound attachments are saved
    pub attachment_dir: PathBuf,
    /// Maximum messages per page request (never 0)
    pub page_cap: usize,
    /// Timeout for each store request
    pub request_timeout: Duration,
    /// Largest attachment accepted for publishing
    pub max_attachment_bytes: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            identity_path: PathBuf::from(DEFAULT_IDENTITY_PATH),
            keyring_dir: None,
            attachment_dir: PathBuf::from(DEFAULT_ATTACHMENT_DIR),
            page_cap: DEFAULT_PAGE_CAP,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_attachment_bytes: MAX_ATTACHMENT_BYTES,
        }
    }
}

impl ClientConfig {
    /// Reject settings the client cannot work with.
    pub fn validate(&self) -> Result<(), ClientError> {
        if self.page_cap == 0 {
            return Err(ClientError::Config("page cap must be at least 1".to_string()));
        }
        if self.request_timeout.is_zero() {
            return Err(ClientError::Config("request timeout must be non-zero".to_string()));
        }
        if !(self.server_url.starts_with("http://") || self.server_url.starts_with("https://")) {
            return Err(ClientError::Config(format!(
                "server URL must start with http:// or https://, got {}",
                self.server_url
            )));
        }
        if self.max_attachment_bytes > MAX_ATTACHMENT_BYTES {
            return Err(ClientError::Config(format!(
                "attachment cap {} exceeds protocol maximum {MAX_ATTACHMENT_BYTES}",
                self.max_attachment_bytes
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = ClientConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.page_cap, 20);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn zero_page_cap_rejected() {
        let config = ClientConfig { page_cap: 0, ..ClientConfig::default() };
        assert!(matches!(config.validate(), Err(ClientError::Config(_))));
    }

    #[test]
    fn bad_url_rejected() {
        let config = ClientConfig { server_url: "localhost:8080".into(), ..ClientConfig::default() };
        assert!(matches!(config.validate(), Err(ClientError::Config(_))));
    }
}
