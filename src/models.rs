//! Data models for Google Drive, Google Sheets and OAuth responses.

use serde::{Deserialize, Serialize};

use crate::cell_value::CellValue;
use crate::requests::SheetProperties;

/// Metadata for a workbook or folder in Google Drive.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub modified_time: Option<String>,
    #[serde(default)]
    pub web_view_link: Option<String>,
}

impl FileMetadata {
    /// Modified time in `YYYY-MM-DD HH:MM:SS.fff` form, as shown to users.
    pub fn modified_display(&self) -> String {
        self.modified_time
            .as_deref()
            .map(|t| t.replace('T', " ").replace('Z', ""))
            .unwrap_or_else(|| "-".to_string())
    }
}

impl std::fmt::Display for FileMetadata {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let link = self.web_view_link.as_deref().unwrap_or("-");
        write!(
            f,
            "{}\t{}\t{}\t{}",
            self.id,
            self.modified_display(),
            self.name,
            link
        )
    }
}

/// Response from the files.list API endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileListResponse {
    #[serde(default)]
    pub files: Vec<FileMetadata>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// User information from the about API.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub email_address: Option<String>,
    pub display_name: Option<String>,
}

/// About response from the Drive API.
#[derive(Debug, Deserialize)]
pub struct About {
    pub user: User,
}

/// A single permission entry on a Drive file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    pub id: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub email_address: Option<String>,
}

/// Response from the permissions.list API endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionListResponse {
    #[serde(default)]
    pub permissions: Vec<Permission>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Who a workbook is shared with and at which level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PermissionInfo {
    pub role: String,
    pub email: String,
}

impl std::fmt::Display for PermissionInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}\t{}", self.role, self.email)
    }
}

/// Google API error response.
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorDetail {
    pub code: u16,
    pub message: String,
}

/// Service account credentials from JSON file.
#[derive(Debug, Deserialize)]
pub struct ServiceAccountCredentials {
    pub client_email: String,
    pub private_key: String,
    pub token_uri: Option<String>,
}

/// Stored user credentials obtained from a previous OAuth consent.
#[derive(Debug, Deserialize)]
pub struct AuthorizedUserCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    #[serde(default)]
    pub token_uri: Option<String>,
}

/// OAuth2 token response.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// Subset of a `spreadsheets.get` response.
#[derive(Debug, Default, Deserialize)]
pub struct Spreadsheet {
    #[serde(default)]
    pub sheets: Vec<Sheet>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Sheet {
    #[serde(default)]
    pub properties: Option<SheetProperties>,
    #[serde(default)]
    pub data: Vec<GridData>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridData {
    #[serde(default)]
    pub row_data: Vec<RowData>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RowData {
    #[serde(default)]
    pub values: Vec<CellData>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellData {
    #[serde(default)]
    pub effective_value: Option<ExtendedValue>,
    #[serde(default)]
    pub effective_format: Option<EffectiveFormat>,
}

impl CellData {
    pub fn number_format_type(&self) -> Option<&NumberFormatType> {
        self.effective_format
            .as_ref()?
            .number_format
            .as_ref()
            .map(|f| &f.kind)
    }
}

/// The computed value of a cell.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendedValue {
    #[serde(default)]
    pub number_value: Option<f64>,
    #[serde(default)]
    pub string_value: Option<String>,
    #[serde(default)]
    pub bool_value: Option<bool>,
    #[serde(default)]
    pub error_value: Option<ErrorValue>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct ErrorValue {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectiveFormat {
    #[serde(default)]
    pub number_format: Option<NumberFormat>,
}

#[derive(Debug, Deserialize)]
pub struct NumberFormat {
    #[serde(rename = "type")]
    pub kind: NumberFormatType,
}

/// Number format categories reported by Sheets.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NumberFormatType {
    NumberFormatTypeUnspecified,
    Text,
    Number,
    Percent,
    Currency,
    Date,
    Time,
    DateTime,
    Scientific,
    #[serde(other)]
    Unknown,
}

/// A block of values as returned by, or sent to, the values endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub major_dimension: Option<String>,
    #[serde(default)]
    pub values: Vec<Vec<CellValue>>,
}

/// Response from `spreadsheets.batchUpdate`.
#[derive(Debug, Default, Deserialize)]
pub struct BatchUpdateResponse {
    #[serde(default)]
    pub replies: Vec<Reply>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    #[serde(default)]
    pub add_sheet: Option<AddSheetReply>,
}

#[derive(Debug, Deserialize)]
pub struct AddSheetReply {
    pub properties: SheetProperties,
}
