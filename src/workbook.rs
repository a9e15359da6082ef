//! A Google Sheets workbook: its tabs, batch updates and sharing.

use std::fmt;

use reqwest::Method;
use serde::Serialize;
use tracing::info;

use crate::client::Client;
use crate::error::{Result, SheetsError};
use crate::models::{
    BatchUpdateResponse, Permission, PermissionInfo, PermissionListResponse, Spreadsheet,
};
use crate::requests::BatchUpdate;
use crate::tab::{a1_range, Tab};
use crate::url_parser;

/// Default grid size of a new tab.
pub const DEFAULT_TAB_ROWS: u32 = 1000;
pub const DEFAULT_TAB_COLUMNS: u32 = 26;

/// Access level granted when sharing a workbook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Owner,
    Writer,
    Reader,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let role = match self {
            Role::Owner => "owner",
            Role::Writer => "writer",
            Role::Reader => "reader",
        };
        f.write_str(role)
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "owner" => Ok(Role::Owner),
            "writer" => Ok(Role::Writer),
            "reader" => Ok(Role::Reader),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NewPermission<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    role: Role,
    email_address: &'a str,
}

/// Handle to a workbook identified by its Drive file ID.
#[derive(Clone)]
pub struct Workbook {
    client: Client,
    filename: String,
    file_id: String,
}

impl Workbook {
    pub fn new(client: Client, filename: String, file_id: String) -> Self {
        Self {
            client,
            filename,
            file_id,
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn file_id(&self) -> &str {
        &self.file_id
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn url(&self) -> String {
        url_parser::workbook_url(&self.file_id)
    }

    /// Send a batch of requests in a single call. Empty batches are not sent.
    pub async fn batch_update(&self, batch: &BatchUpdate) -> Result<BatchUpdateResponse> {
        if batch.is_empty() {
            return Ok(BatchUpdateResponse::default());
        }

        let url = self
            .client
            .sheets_url(&["spreadsheets", &format!("{}:batchUpdate", self.file_id)])?;
        let request = self.client.request(Method::POST, url).await?.json(batch);
        self.client.send_json(request).await
    }

    /// Add a tab with the given grid size.
    pub async fn create_tab(&self, tabname: &str, nrows: u32, ncols: u32) -> Result<Tab> {
        let mut batch = BatchUpdate::new();
        batch.add_tab(tabname, nrows, ncols);
        let response = self.batch_update(&batch).await?;

        let properties = response
            .replies
            .into_iter()
            .find_map(|reply| reply.add_sheet)
            .map(|reply| reply.properties)
            .ok_or_else(|| SheetsError::ApiError {
                status: 500,
                message: "addSheet reply missing from batchUpdate response".to_string(),
            })?;

        info!(workbook = %self.file_id, tabname, "created tab");
        Tab::new(self.clone(), tabname.to_string(), properties)
    }

    /// Delete a tab by name.
    pub async fn delete_tab(&self, tabname: &str) -> Result<()> {
        let tab = self.fetch_tab(tabname).await?;
        let mut batch = BatchUpdate::new();
        batch.delete_tab(tab.sheet_id());
        self.batch_update(&batch).await?;

        info!(workbook = %self.file_id, tabname, "deleted tab");
        Ok(())
    }

    /// Open an existing tab by name.
    pub async fn fetch_tab(&self, tabname: &str) -> Result<Tab> {
        let url = self.client.sheets_url(&["spreadsheets", &self.file_id])?;
        let range = a1_range(tabname, Some("A1"));
        let request = self.client.request(Method::GET, url).await?.query(&[
            ("ranges", range.as_str()),
            ("fields", "sheets/properties"),
        ]);

        let spreadsheet: Spreadsheet = match self.client.send_json(request).await {
            Err(SheetsError::ApiError { status: 400, message })
                if message.contains("Unable to parse range") =>
            {
                return Err(SheetsError::TabNotFound(tabname.to_string()))
            }
            other => other?,
        };

        let properties = spreadsheet
            .sheets
            .into_iter()
            .find_map(|sheet| sheet.properties)
            .ok_or_else(|| SheetsError::TabNotFound(tabname.to_string()))?;
        Tab::new(self.clone(), tabname.to_string(), properties)
    }

    /// Names of all tabs, in display order.
    pub async fn fetch_tab_names(&self) -> Result<Vec<String>> {
        let url = self.client.sheets_url(&["spreadsheets", &self.file_id])?;
        let request = self
            .client
            .request(Method::GET, url)
            .await?
            .query(&[("fields", "sheets/properties(title,index)")]);
        let spreadsheet: Spreadsheet = self.client.send_json(request).await?;

        let mut properties: Vec<_> = spreadsheet
            .sheets
            .into_iter()
            .filter_map(|sheet| sheet.properties)
            .collect();
        properties.sort_by_key(|p| p.index.unwrap_or(u32::MAX));
        Ok(properties.into_iter().filter_map(|p| p.title).collect())
    }

    /// Share the workbook with a user.
    ///
    /// Granting [`Role::Owner`] transfers ownership. `message` is only sent
    /// when `notify` is set.
    pub async fn share(
        &self,
        email: &str,
        role: Role,
        notify: bool,
        message: Option<&str>,
    ) -> Result<()> {
        let url = self
            .client
            .drive_url(&["files", &self.file_id, "permissions"])?;
        let mut request = self
            .client
            .request(Method::POST, url)
            .await?
            .query(&[
                ("sendNotificationEmail", notify.to_string()),
                ("supportsAllDrives", "true".to_string()),
            ])
            .json(&NewPermission {
                kind: "user",
                role,
                email_address: email,
            });

        if role == Role::Owner {
            request = request.query(&[("transferOwnership", "true")]);
        }
        if let Some(message) = message.filter(|_| notify) {
            request = request.query(&[("emailMessage", message)]);
        }

        self.client.send(request).await?;
        info!(workbook = %self.file_id, email, %role, "shared workbook");
        Ok(())
    }

    /// Remove a user's access to the workbook.
    pub async fn unshare(&self, email: &str) -> Result<()> {
        let permission_id = self
            .list_permissions()
            .await?
            .into_iter()
            .find(|p| {
                p.email_address
                    .as_deref()
                    .is_some_and(|e| e.eq_ignore_ascii_case(email))
            })
            .map(|p| p.id)
            .ok_or_else(|| SheetsError::PermissionNotFound {
                email: email.to_string(),
                workbook: self.filename.clone(),
            })?;

        let url = self
            .client
            .drive_url(&["files", &self.file_id, "permissions", &permission_id])?;
        let request = self
            .client
            .request(Method::DELETE, url)
            .await?
            .query(&[("supportsAllDrives", "true")]);
        self.client.send(request).await?;

        info!(workbook = %self.file_id, email, "unshared workbook");
        Ok(())
    }

    /// Who the workbook is shared with, and at what level.
    ///
    /// Permissions without an email address (domain or anyone-with-link
    /// grants) are reported by their type.
    pub async fn fetch_permissions(&self) -> Result<Vec<PermissionInfo>> {
        Ok(self
            .list_permissions()
            .await?
            .into_iter()
            .map(|p| PermissionInfo {
                role: p.role.unwrap_or_default(),
                email: p.email_address.unwrap_or_else(|| {
                    format!("User Type: '{}'", p.kind.as_deref().unwrap_or("unknown"))
                }),
            })
            .collect())
    }

    async fn list_permissions(&self) -> Result<Vec<Permission>> {
        let mut all_permissions = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let url = self
                .client
                .drive_url(&["files", &self.file_id, "permissions"])?;
            let mut request = self.client.request(Method::GET, url).await?.query(&[
                (
                    "fields",
                    "nextPageToken, permissions(id, role, type, emailAddress)",
                ),
                ("supportsAllDrives", "true"),
            ]);

            if let Some(ref token) = page_token {
                request = request.query(&[("pageToken", token)]);
            }

            let list_response: PermissionListResponse = self.client.send_json(request).await?;
            all_permissions.extend(list_response.permissions);

            match list_response.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(all_permissions)
    }
}

impl fmt::Debug for Workbook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Workbook")
            .field("filename", &self.filename)
            .field("file_id", &self.file_id)
            .finish()
    }
}

impl fmt::Display for Workbook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Workbook filename={:?} file_id={:?}>", self.filename, self.file_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serialization() {
        let body = NewPermission {
            kind: "user",
            role: Role::Writer,
            email_address: "a@example.com",
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"type": "user", "role": "writer", "emailAddress": "a@example.com"})
        );
    }

    #[test]
    fn test_role_from_str() {
        assert_eq!("Reader".parse::<Role>().unwrap(), Role::Reader);
        assert!("commenter".parse::<Role>().is_err());
    }
}
