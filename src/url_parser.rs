//! URL parser for extracting workbook and folder IDs from Google URLs.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::{Result, SheetsError};

/// Regex patterns for Google Sheets and Drive URLs.
static SPREADSHEET_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://docs\.google\.com/spreadsheets/(?:u/\d+/)?d/([a-zA-Z0-9_-]+)")
        .expect("Invalid spreadsheet URL regex")
});

static FOLDER_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://drive\.google\.com/drive/(?:u/\d+/)?folders/([a-zA-Z0-9_-]+)")
        .expect("Invalid folder URL regex")
});

static FILE_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://drive\.google\.com/file/d/([a-zA-Z0-9_-]+)")
        .expect("Invalid file URL regex")
});

static OPEN_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://drive\.google\.com/open\?id=([a-zA-Z0-9_-]+)")
        .expect("Invalid open URL regex")
});

/// The `gid` fragment or query parameter naming a tab.
static GID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[#&?]gid=(\d+)").expect("Invalid gid regex"));

/// Valid Google Drive ID pattern (alphanumeric, underscore, hyphen).
static ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_-]+$").expect("Invalid ID regex"));

/// Extract a workbook or folder ID from a URL, or validate a raw ID.
///
/// Supports the following URL formats:
/// - `https://docs.google.com/spreadsheets/d/<ID>/edit#gid=0`
/// - `https://drive.google.com/drive/folders/<ID>`
/// - `https://drive.google.com/drive/u/0/folders/<ID>`
/// - `https://drive.google.com/file/d/<ID>/view`
/// - `https://drive.google.com/open?id=<ID>`
/// - Raw ID string
///
/// # Examples
///
/// ```
/// use datasheets::url_parser::extract_id;
///
/// let id = extract_id("https://docs.google.com/spreadsheets/d/1abc123/edit").unwrap();
/// assert_eq!(id, "1abc123");
///
/// let id = extract_id("1abc123").unwrap();
/// assert_eq!(id, "1abc123");
/// ```
pub fn extract_id(url_or_id: &str) -> Result<String> {
    let trimmed = url_or_id.trim();

    for regex in [
        &*SPREADSHEET_URL_REGEX,
        &*FOLDER_URL_REGEX,
        &*FILE_URL_REGEX,
        &*OPEN_URL_REGEX,
    ] {
        if let Some(id) = regex.captures(trimmed).and_then(|c| c.get(1)) {
            return Ok(id.as_str().to_string());
        }
    }

    // Check if it's a raw ID
    if ID_REGEX.is_match(trimmed) {
        return Ok(trimmed.to_string());
    }

    Err(SheetsError::InvalidUrlOrId(url_or_id.to_string()))
}

/// Extract the tab id (`gid`) from a spreadsheet URL, if present.
pub fn extract_tab_id(url: &str) -> Option<i32> {
    GID_REGEX
        .captures(url)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// URL of a workbook.
pub fn workbook_url(file_id: &str) -> String {
    format!("https://docs.google.com/spreadsheets/d/{}", file_id)
}

/// URL of a tab within a workbook.
pub fn tab_url(file_id: &str, sheet_id: i32) -> String {
    format!("{}#gid={}", workbook_url(file_id), sheet_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_spreadsheet_url() {
        let url = "https://docs.google.com/spreadsheets/d/1abc123XYZ/edit#gid=0";
        assert_eq!(extract_id(url).unwrap(), "1abc123XYZ");
    }

    #[test]
    fn test_extract_folder_url() {
        let url = "https://drive.google.com/drive/u/2/folders/1abc123XYZ";
        assert_eq!(extract_id(url).unwrap(), "1abc123XYZ");
    }

    #[test]
    fn test_tab_url_round_trip() {
        let url = tab_url("1abc", 42);
        assert_eq!(url, "https://docs.google.com/spreadsheets/d/1abc#gid=42");
        assert_eq!(extract_id(&url).unwrap(), "1abc");
        assert_eq!(extract_tab_id(&url), Some(42));
        assert_eq!(extract_tab_id(&workbook_url("1abc")), None);
    }

    #[test]
    fn test_invalid_url() {
        assert!(extract_id("https://example.com/folder/123").is_err());
        assert!(extract_id("").is_err());
        assert!(extract_id("   ").is_err());
    }
}
