//! Error types for the datasheets crate.

use thiserror::Error;

/// Errors that can occur when working with Google Drive and Google Sheets.
#[derive(Error, Debug)]
pub enum SheetsError {
    #[error("Invalid cell label: {0:?}")]
    InvalidLabelError(String),

    #[error("Invalid cell index: row {row}, column {column}")]
    InvalidIndexError { row: i64, column: i64 },

    #[error("Inconsistent table shape: {0}")]
    ShapeError(String),

    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    #[error("Failed to read credentials file: {0}")]
    CredentialsFileError(#[from] std::io::Error),

    #[error("Failed to parse credentials JSON: {0}")]
    CredentialsParseError(#[from] serde_json::Error),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("JWT encoding error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("Token refresh failed: {0}")]
    TokenRefreshError(String),

    #[error("Invalid URL or ID: {0}")]
    InvalidUrlOrId(String),

    #[error("Workbook not found. Verify that it is shared with {0}")]
    WorkbookNotFound(String),

    #[error("Folder not found. Verify that it is shared with {0}")]
    FolderNotFound(String),

    #[error(
        "Multiple workbooks found. Please choose the correct file_id below \
         and provide it instead of a filename:{0}"
    )]
    MultipleWorkbooksFound(String),

    #[error("Permission for email '{email}' not found for workbook '{workbook}'")]
    PermissionNotFound { email: String, workbook: String },

    #[error("Tab not found: {0}")]
    TabNotFound(String),

    #[error("Failed to fetch tab data: {0}")]
    FetchDataError(String),
}

/// Result type alias for SheetsError.
pub type Result<T> = std::result::Result<T, SheetsError>;
