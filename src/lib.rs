//! datasheets - Read, write and format Google Sheets from Rust.
//!
//! This library provides:
//! - Cell label conversion between A1 notation and numeric indexes
//! - Builders for `spreadsheets.batchUpdate` formatting requests
//! - Flattening of tabular data (with multi-level headers and row indexes)
//!   into value ranges
//! - A Drive/Sheets client for finding, creating, sharing and editing
//!   workbooks and their tabs
//!
//! # Example
//!
//! ```no_run
//! use datasheets::{AuthMode, CellValue, Client, Config, Table, ValueRangeOptions, WorkbookRef};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = Client::from_config(&Config::from_env(AuthMode::Service))?;
//!     let workbook = client.fetch_workbook(&WorkbookRef::name("Budget")).await?;
//!     let mut tab = workbook.fetch_tab("2024").await?;
//!
//!     let table = Table::with_header(
//!         vec!["item".into(), "cost".into()],
//!         vec![vec![CellValue::from("rent"), CellValue::from(1200)]],
//!     );
//!     tab.insert_data(&table, &ValueRangeOptions::default(), true).await?;
//!
//!     for record in tab.fetch_data(true).await?.records() {
//!         println!("{:?}", record);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod cell_ref;
pub mod cell_value;
pub mod client;
pub mod config;
pub mod convenience;
pub mod error;
pub mod models;
pub mod requests;
pub mod tab;
pub mod url_parser;
pub mod values;
pub mod workbook;

// Re-exports for convenience
pub use auth::Authenticator;
pub use cell_ref::{index_to_label, label_to_index, IndexBase};
pub use cell_value::CellValue;
pub use client::{Client, WorkbookRef};
pub use config::{AuthMode, Config};
pub use error::{Result, SheetsError};
pub use models::{FileMetadata, PermissionInfo};
pub use requests::{BatchUpdate, CellFormatOptions, SheetId};
pub use tab::Tab;
pub use url_parser::extract_id;
pub use values::{HeaderFill, RowIndex, TabData, Table, ValueRangeOptions};
pub use workbook::{Role, Workbook};
