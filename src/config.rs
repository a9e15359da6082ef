//! Configuration resolved from the environment.

use std::env;
use std::path::{Path, PathBuf};

use crate::auth::Authenticator;
use crate::error::Result;

/// Service account key location override.
pub const SERVICE_PATH_ENV: &str = "DATASHEETS_SERVICE_PATH";
/// Stored user credentials location override.
pub const CREDENTIALS_PATH_ENV: &str = "DATASHEETS_CREDENTIALS_PATH";

const DEFAULT_SERVICE_PATH: &str = "~/.datasheets/service_key.json";
const DEFAULT_CREDENTIALS_PATH: &str = "~/.datasheets/client_credentials.json";

/// Base URL for Google Drive API v3.
pub const DRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v3";
/// Base URL for Google Sheets API v4.
pub const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4";

/// Which identity requests are made as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// A service account key file.
    Service,
    /// Stored credentials of a user who already granted consent.
    User,
}

/// Where credentials live and which API endpoints to talk to.
#[derive(Debug, Clone)]
pub struct Config {
    pub auth_mode: AuthMode,
    pub service_key_path: PathBuf,
    pub credentials_path: PathBuf,
    pub drive_api_base: String,
    pub sheets_api_base: String,
}

impl Config {
    /// Resolve credential paths from `DATASHEETS_SERVICE_PATH` and
    /// `DATASHEETS_CREDENTIALS_PATH`, falling back to `~/.datasheets/`.
    pub fn from_env(auth_mode: AuthMode) -> Self {
        let path_from_env = |var: &str, default: &str| {
            expand_home(&env::var(var).unwrap_or_else(|_| default.to_string()))
        };

        Self {
            auth_mode,
            service_key_path: path_from_env(SERVICE_PATH_ENV, DEFAULT_SERVICE_PATH),
            credentials_path: path_from_env(CREDENTIALS_PATH_ENV, DEFAULT_CREDENTIALS_PATH),
            drive_api_base: DRIVE_API_BASE.to_string(),
            sheets_api_base: SHEETS_API_BASE.to_string(),
        }
    }

    /// Point both APIs at other base URLs, e.g. a local mock server.
    pub fn with_api_bases(mut self, drive: impl Into<String>, sheets: impl Into<String>) -> Self {
        self.drive_api_base = drive.into();
        self.sheets_api_base = sheets.into();
        self
    }

    /// The credential file used by the selected auth mode.
    pub fn credentials_file(&self) -> &Path {
        match self.auth_mode {
            AuthMode::Service => &self.service_key_path,
            AuthMode::User => &self.credentials_path,
        }
    }

    /// Load credentials for the selected auth mode.
    pub fn authenticator(&self) -> Result<Authenticator> {
        match self.auth_mode {
            AuthMode::Service => Authenticator::from_service_account_file(&self.service_key_path),
            AuthMode::User => Authenticator::from_authorized_user_file(&self.credentials_path),
        }
    }
}

/// Expand a leading `~` to `$HOME`.
fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), env::var_os("HOME")) {
        (Some(rest), Some(home)) => PathBuf::from(home).join(rest),
        _ => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_home() {
        let home = env::var_os("HOME").map(PathBuf::from);
        let expanded = expand_home("~/.datasheets/x.json");
        match home {
            Some(home) => assert_eq!(expanded, home.join(".datasheets/x.json")),
            None => assert_eq!(expanded, PathBuf::from("~/.datasheets/x.json")),
        }
        assert_eq!(expand_home("/tmp/key.json"), PathBuf::from("/tmp/key.json"));
    }

    #[test]
    fn test_credentials_file_follows_mode() {
        let config = Config::from_env(AuthMode::User);
        assert_eq!(config.credentials_file(), config.credentials_path.as_path());
        assert_eq!(config.drive_api_base, DRIVE_API_BASE);
    }
}
