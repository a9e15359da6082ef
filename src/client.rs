//! Authenticated client for Google Drive and Google Sheets.

use std::sync::Arc;

use reqwest::{Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::auth::Authenticator;
use crate::config::{Config, DRIVE_API_BASE, SHEETS_API_BASE};
use crate::error::{Result, SheetsError};
use crate::models::{About, ApiErrorResponse, FileListResponse, FileMetadata};
use crate::workbook::Workbook;

const SPREADSHEET_MIME_TYPE: &str = "application/vnd.google-apps.spreadsheet";
const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// Fields requested for every listed workbook or folder.
const ITEM_FIELDS: &str = "id, name, mimeType, modifiedTime, webViewLink";

/// Kind of Drive item to search for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Spreadsheet,
    Folder,
}

impl ItemKind {
    fn mime_type(self) -> &'static str {
        match self {
            ItemKind::Spreadsheet => SPREADSHEET_MIME_TYPE,
            ItemKind::Folder => FOLDER_MIME_TYPE,
        }
    }
}

/// How a workbook is identified: by its title or by its file ID.
///
/// The file ID is preferred as titles are not unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkbookRef {
    Name(String),
    Id(String),
}

impl WorkbookRef {
    pub fn name(name: impl Into<String>) -> Self {
        WorkbookRef::Name(name.into())
    }

    pub fn id(id: impl Into<String>) -> Self {
        WorkbookRef::Id(id.into())
    }
}

/// Escape a value for use inside a quoted Drive query string.
pub fn escape_query(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Build a Drive `files.list` query.
pub fn build_query(
    kind: ItemKind,
    folder_id: Option<&str>,
    name: Option<&str>,
    owner: Option<&str>,
) -> String {
    let mut query = format!("mimeType='{}' and trashed = false", kind.mime_type());
    if let Some(folder_id) = folder_id {
        query.push_str(&format!(" and '{}' in parents", escape_query(folder_id)));
    }
    if let Some(name) = name {
        query.push_str(&format!(" and name = '{}'", escape_query(name)));
    }
    if let Some(owner) = owner {
        query.push_str(&format!(" and '{}' in owners", escape_query(owner)));
    }
    query
}

/// Client for interacting with Google Drive and Google Sheets.
#[derive(Clone)]
pub struct Client {
    auth: Authenticator,
    http: reqwest::Client,
    drive_api: Url,
    sheets_api: Url,
    email: Arc<OnceCell<String>>,
}

impl Client {
    /// Create a client talking to the public Google endpoints.
    pub fn new(auth: Authenticator) -> Result<Self> {
        Self::with_api_bases(auth, DRIVE_API_BASE, SHEETS_API_BASE)
    }

    /// Create a client from configuration, loading its credentials.
    pub fn from_config(config: &Config) -> Result<Self> {
        let auth = config.authenticator()?;
        Self::with_api_bases(auth, &config.drive_api_base, &config.sheets_api_base)
    }

    /// Create a client with custom API base URLs.
    pub fn with_api_bases(auth: Authenticator, drive_api: &str, sheets_api: &str) -> Result<Self> {
        let parse = |base: &str| {
            Url::parse(base).map_err(|e| SheetsError::InvalidUrlOrId(format!("{}: {}", base, e)))
        };

        Ok(Self {
            auth,
            http: reqwest::Client::new(),
            drive_api: parse(drive_api)?,
            sheets_api: parse(sheets_api)?,
            email: Arc::new(OnceCell::new()),
        })
    }

    /// Email address of the authenticated account.
    pub async fn email(&self) -> Result<String> {
        if let Some(email) = self.auth.email() {
            return Ok(email.to_string());
        }

        self.email
            .get_or_try_init(|| async move {
                let url = self.drive_url(&["about"])?;
                let request = self
                    .request(Method::GET, url)
                    .await?
                    .query(&[("fields", "user(emailAddress)")]);
                let about: About = self.send_json(request).await?;
                about.user.email_address.ok_or_else(|| {
                    SheetsError::AuthenticationError("account has no email address".to_string())
                })
            })
            .await
            .cloned()
    }

    pub(crate) fn drive_url(&self, segments: &[&str]) -> Result<Url> {
        join_segments(&self.drive_api, segments)
    }

    pub(crate) fn sheets_url(&self, segments: &[&str]) -> Result<Url> {
        join_segments(&self.sheets_api, segments)
    }

    /// Start an authenticated request.
    pub(crate) async fn request(&self, method: Method, url: Url) -> Result<RequestBuilder> {
        let token = self.auth.get_access_token().await?;
        debug!(%method, %url, "sending request");
        Ok(self.http.request(method, url).bearer_auth(token))
    }

    /// Send a request, turning non-success statuses into [`SheetsError::ApiError`].
    pub(crate) async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            if let Ok(api_error) = serde_json::from_str::<ApiErrorResponse>(&error_body) {
                return Err(SheetsError::ApiError {
                    status: api_error.error.code,
                    message: api_error.error.message,
                });
            }
            return Err(SheetsError::ApiError {
                status: status.as_u16(),
                message: error_body,
            });
        }

        Ok(response)
    }

    pub(crate) async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = self.send(request).await?;
        Ok(response.json().await?)
    }

    /// List Drive files matching a query, following every result page.
    pub async fn query_files(&self, query: &str) -> Result<Vec<FileMetadata>> {
        let mut all_files = Vec::new();
        let mut page_token: Option<String> = None;
        let fields = format!("nextPageToken, files({})", ITEM_FIELDS);

        loop {
            let url = self.drive_url(&["files"])?;
            let mut request = self.request(Method::GET, url).await?.query(&[
                ("q", query),
                ("fields", fields.as_str()),
                ("orderBy", "viewedByMeTime desc"),
                ("pageSize", "1000"),
                ("supportsAllDrives", "true"),
                ("includeItemsFromAllDrives", "true"),
            ]);

            if let Some(ref token) = page_token {
                request = request.query(&[("pageToken", token)]);
            }

            let list_response: FileListResponse = self.send_json(request).await?;
            all_files.extend(list_response.files);

            match list_response.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(all_files)
    }

    /// Return the file ID of the only item of `kind` titled `name`.
    pub async fn fetch_file_id(&self, name: &str, kind: ItemKind) -> Result<String> {
        let query = build_query(kind, None, Some(name), None);
        let mut matches = self.query_files(&query).await?;

        match (matches.len(), kind) {
            (1, _) => Ok(matches.remove(0).id),
            (0, ItemKind::Spreadsheet) => Err(SheetsError::WorkbookNotFound(
                self.email_or_placeholder().await,
            )),
            (0, ItemKind::Folder) => Err(SheetsError::FolderNotFound(
                self.email_or_placeholder().await,
            )),
            _ => {
                let listing: String = matches
                    .iter()
                    .enumerate()
                    .map(|(i, f)| {
                        format!(
                            "\n\n{}\nfilename: {}\nfile_id: {}\nmodifiedTime: {}\nwebViewLink: {}",
                            i,
                            f.name,
                            f.id,
                            f.modified_display(),
                            f.web_view_link.as_deref().unwrap_or("-")
                        )
                    })
                    .collect();
                Err(SheetsError::MultipleWorkbooksFound(listing))
            }
        }
    }

    async fn email_or_placeholder(&self) -> String {
        self.email()
            .await
            .unwrap_or_else(|_| "this account".to_string())
    }

    async fn fetch_items(
        &self,
        kind: ItemKind,
        folder: Option<&str>,
        only_mine: bool,
    ) -> Result<Vec<FileMetadata>> {
        let folder_id = match folder {
            Some(name) => Some(self.fetch_file_id(name, ItemKind::Folder).await?),
            None => None,
        };
        let owner = if only_mine {
            Some(self.email().await?)
        } else {
            None
        };

        let query = build_query(kind, folder_id.as_deref(), None, owner.as_deref());
        self.query_files(&query).await
    }

    /// All workbooks visible to this account, optionally limited to a folder
    /// (by folder name).
    pub async fn fetch_workbooks_info(&self, folder: Option<&str>) -> Result<Vec<FileMetadata>> {
        self.fetch_items(ItemKind::Spreadsheet, folder, false).await
    }

    /// All folders visible to this account, or only those it owns.
    pub async fn fetch_folders(&self, only_mine: bool) -> Result<Vec<FileMetadata>> {
        self.fetch_items(ItemKind::Folder, None, only_mine).await
    }

    /// Open an existing workbook.
    pub async fn fetch_workbook(&self, workbook: &WorkbookRef) -> Result<Workbook> {
        match workbook {
            WorkbookRef::Name(name) => {
                let file_id = self.fetch_file_id(name, ItemKind::Spreadsheet).await?;
                Ok(Workbook::new(self.clone(), name.clone(), file_id))
            }
            WorkbookRef::Id(file_id) => {
                let metadata = self.get_file(file_id).await?;
                Ok(Workbook::new(self.clone(), metadata.name, metadata.id))
            }
        }
    }

    /// Get file metadata by ID.
    pub async fn get_file(&self, file_id: &str) -> Result<FileMetadata> {
        let url = self.drive_url(&["files", file_id])?;
        let request = self
            .request(Method::GET, url)
            .await?
            .query(&[("fields", ITEM_FIELDS), ("supportsAllDrives", "true")]);

        match self.send_json(request).await {
            Err(SheetsError::ApiError { status: 404, .. }) => Err(SheetsError::WorkbookNotFound(
                self.email_or_placeholder().await,
            )),
            other => other,
        }
    }

    /// Create a blank workbook, optionally also filed under the named
    /// folders.
    pub async fn create_workbook(&self, filename: &str, folders: &[&str]) -> Result<Workbook> {
        let root = self.get_root_id().await?;
        let mut parents = vec![root];
        for folder in folders {
            parents.push(self.fetch_file_id(folder, ItemKind::Folder).await?);
        }

        let body = serde_json::json!({
            "mimeType": SPREADSHEET_MIME_TYPE,
            "name": filename,
            "parents": parents,
        });

        let url = self.drive_url(&["files"])?;
        let request = self
            .request(Method::POST, url)
            .await?
            .query(&[("fields", ITEM_FIELDS), ("supportsAllDrives", "true")])
            .json(&body);
        let metadata: FileMetadata = self.send_json(request).await?;

        info!(file_id = %metadata.id, filename, "created workbook");
        Ok(Workbook::new(self.clone(), metadata.name, metadata.id))
    }

    async fn get_root_id(&self) -> Result<String> {
        let url = self.drive_url(&["files", "root"])?;
        let request = self
            .request(Method::GET, url)
            .await?
            .query(&[("fields", "id")]);
        let root: serde_json::Value = self.send_json(request).await?;
        root["id"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| SheetsError::ApiError {
                status: 500,
                message: "No id for root folder in response".to_string(),
            })
    }

    /// Delete a workbook from Google Drive.
    pub async fn delete_workbook(&self, workbook: &WorkbookRef) -> Result<()> {
        let file_id = match workbook {
            WorkbookRef::Name(name) => self.fetch_file_id(name, ItemKind::Spreadsheet).await?,
            WorkbookRef::Id(id) => id.clone(),
        };

        let url = self.drive_url(&["files", &file_id])?;
        let request = self
            .request(Method::DELETE, url)
            .await?
            .query(&[("supportsAllDrives", "true")]);
        self.send(request).await?;

        info!(%file_id, "deleted workbook");
        Ok(())
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("email", &self.auth.email().or(self.email.get().map(String::as_str)))
            .finish_non_exhaustive()
    }
}

/// Append path segments to a base URL, percent-encoding each one.
fn join_segments(base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| SheetsError::InvalidUrlOrId(base.to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_query() {
        assert_eq!(escape_query("it's"), "it\\'s");
        assert_eq!(escape_query("a\\b"), "a\\\\b");
    }

    #[test]
    fn test_build_query() {
        let query = build_query(ItemKind::Spreadsheet, Some("f1"), Some("Q1 'plan'"), None);
        assert_eq!(
            query,
            "mimeType='application/vnd.google-apps.spreadsheet' and trashed = false \
             and 'f1' in parents and name = 'Q1 \\'plan\\''"
        );

        let query = build_query(ItemKind::Folder, None, None, Some("me@example.com"));
        assert!(query.ends_with("and 'me@example.com' in owners"));
    }

    #[test]
    fn test_join_segments_encodes() {
        let base = Url::parse("https://sheets.googleapis.com/v4").unwrap();
        let url = join_segments(&base, &["spreadsheets", "abc", "values", "'My Tab'"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://sheets.googleapis.com/v4/spreadsheets/abc/values/'My%20Tab'"
        );
    }
}
