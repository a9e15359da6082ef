//! Access-token acquisition for Google APIs.
//!
//! Two credential sources are supported: a service account key (JWT bearer
//! grant) and stored authorized-user credentials (refresh-token grant).
//! Tokens are cached in memory and refreshed shortly before they expire.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{Result, SheetsError};
use crate::models::{AuthorizedUserCredentials, ServiceAccountCredentials, TokenResponse};

/// Google OAuth2 token endpoint.
const TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Google Drive API scope; it also grants access to Sheets.
const DRIVE_SCOPE: &str = "https://www.googleapis.com/auth/drive";

/// Tokens are refreshed this long before their reported expiry.
const EXPIRY_BUFFER: Duration = Duration::from_secs(60);

/// JWT claims for service account authentication.
#[derive(Debug, Serialize)]
struct Claims {
    iss: String,   // Issuer (service account email)
    scope: String, // OAuth scope
    aud: String,   // Audience (token endpoint)
    exp: u64,      // Expiration time
    iat: u64,      // Issued at
}

/// Cached access token with expiration.
#[derive(Clone)]
struct CachedToken {
    access_token: String,
    expires_at: SystemTime,
}

enum Credentials {
    ServiceAccount(ServiceAccountCredentials),
    AuthorizedUser(AuthorizedUserCredentials),
    Static(String),
}

/// Authenticator for Google APIs.
#[derive(Clone)]
pub struct Authenticator {
    credentials: Arc<Credentials>,
    client: Client,
    cached_token: Arc<RwLock<Option<CachedToken>>>,
}

impl Authenticator {
    /// Create a new authenticator from a service account JSON key file.
    pub fn from_service_account_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let credentials: ServiceAccountCredentials = serde_json::from_str(&content)?;
        Ok(Self::service_account(credentials))
    }

    /// Create a new authenticator from a stored authorized-user JSON file
    /// (`client_id`, `client_secret`, `refresh_token`).
    pub fn from_authorized_user_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let credentials: AuthorizedUserCredentials = serde_json::from_str(&content)?;
        Ok(Self::authorized_user(credentials))
    }

    pub fn service_account(credentials: ServiceAccountCredentials) -> Self {
        Self::with_credentials(Credentials::ServiceAccount(credentials))
    }

    pub fn authorized_user(credentials: AuthorizedUserCredentials) -> Self {
        Self::with_credentials(Credentials::AuthorizedUser(credentials))
    }

    /// Use a bearer token obtained elsewhere. It is never refreshed.
    pub fn from_access_token(token: impl Into<String>) -> Self {
        Self::with_credentials(Credentials::Static(token.into()))
    }

    fn with_credentials(credentials: Credentials) -> Self {
        Self {
            credentials: Arc::new(credentials),
            client: Client::new(),
            cached_token: Arc::new(RwLock::new(None)),
        }
    }

    /// The account email, when the credentials carry one.
    pub fn email(&self) -> Option<&str> {
        match self.credentials.as_ref() {
            Credentials::ServiceAccount(creds) => Some(&creds.client_email),
            _ => None,
        }
    }

    /// Get a valid access token, refreshing if necessary.
    pub async fn get_access_token(&self) -> Result<String> {
        if let Credentials::Static(token) = self.credentials.as_ref() {
            return Ok(token.clone());
        }

        // Check if we have a valid cached token
        {
            let cached = self.cached_token.read().await;
            if let Some(token) = cached.as_ref() {
                if token.expires_at > SystemTime::now() + EXPIRY_BUFFER {
                    return Ok(token.access_token.clone());
                }
            }
        }

        let mut cached = self.cached_token.write().await;
        // Another task may have refreshed while we waited for the lock
        if let Some(token) = cached.as_ref() {
            if token.expires_at > SystemTime::now() + EXPIRY_BUFFER {
                return Ok(token.access_token.clone());
            }
        }

        let new_token = self.refresh_token().await?;
        *cached = Some(new_token.clone());

        Ok(new_token.access_token)
    }

    async fn refresh_token(&self) -> Result<CachedToken> {
        let (token_uri, response) = match self.credentials.as_ref() {
            Credentials::ServiceAccount(creds) => {
                let token_uri = creds.token_uri.as_deref().unwrap_or(TOKEN_URI);
                let jwt = self.service_account_assertion(creds, token_uri)?;
                let params = [
                    ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                    ("assertion", jwt.as_str()),
                ];
                let response = self.client.post(token_uri).form(&params).send().await?;
                (token_uri, response)
            }
            Credentials::AuthorizedUser(creds) => {
                let token_uri = creds.token_uri.as_deref().unwrap_or(TOKEN_URI);
                let params = [
                    ("grant_type", "refresh_token"),
                    ("client_id", creds.client_id.as_str()),
                    ("client_secret", creds.client_secret.as_str()),
                    ("refresh_token", creds.refresh_token.as_str()),
                ];
                let response = self.client.post(token_uri).form(&params).send().await?;
                (token_uri, response)
            }
            Credentials::Static(_) => {
                return Err(SheetsError::AuthenticationError(
                    "static access tokens cannot be refreshed".to_string(),
                ))
            }
        };

        debug!(token_uri, "refreshing access token");

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SheetsError::TokenRefreshError(format!(
                "Status {}: {}",
                status, body
            )));
        }

        let token_response: TokenResponse = response.json().await?;

        let expires_at = SystemTime::now() + Duration::from_secs(token_response.expires_in);

        Ok(CachedToken {
            access_token: token_response.access_token,
            expires_at,
        })
    }

    /// Build the signed JWT used to request a service account token.
    fn service_account_assertion(
        &self,
        credentials: &ServiceAccountCredentials,
        token_uri: &str,
    ) -> Result<String> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| SheetsError::AuthenticationError(e.to_string()))?
            .as_secs();

        let claims = Claims {
            iss: credentials.client_email.clone(),
            scope: DRIVE_SCOPE.to_string(),
            aud: token_uri.to_string(),
            iat: now,
            exp: now + 3600, // 1 hour
        };

        let header = Header::new(Algorithm::RS256);
        let key = EncodingKey::from_rsa_pem(credentials.private_key.as_bytes())?;
        Ok(encode(&header, &claims, &key)?)
    }
}
