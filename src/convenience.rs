//! One-call helpers for the most common setup tasks.

use tracing::info;

use crate::client::{Client, WorkbookRef};
use crate::error::Result;
use crate::tab::Tab;
use crate::workbook::{Role, DEFAULT_TAB_COLUMNS, DEFAULT_TAB_ROWS};

/// Open an existing workbook and add a tab to it.
pub async fn create_tab_in_existing_workbook(
    client: &Client,
    workbook: &WorkbookRef,
    tabname: &str,
) -> Result<Tab> {
    let workbook = client.fetch_workbook(workbook).await?;
    workbook
        .create_tab(tabname, DEFAULT_TAB_ROWS, DEFAULT_TAB_COLUMNS)
        .await
}

/// Create a workbook holding a single tab named `tabname`, then share it.
///
/// The default tab a new workbook starts with is removed. Each entry of
/// `shares` grants an email address a role; notification emails carry
/// `message` when `notify` is set.
pub async fn create_tab_in_new_workbook(
    client: &Client,
    filename: &str,
    tabname: &str,
    shares: &[(&str, Role)],
    notify: bool,
    message: Option<&str>,
) -> Result<Tab> {
    let workbook = client.create_workbook(filename, &[]).await?;
    let default_tabs = workbook.fetch_tab_names().await?;

    let tab = workbook
        .create_tab(tabname, DEFAULT_TAB_ROWS, DEFAULT_TAB_COLUMNS)
        .await?;
    for name in default_tabs.iter().filter(|name| name.as_str() != tabname) {
        workbook.delete_tab(name).await?;
    }

    for (email, role) in shares {
        workbook.share(email, *role, notify, message).await?;
    }

    info!(file_id = workbook.file_id(), tabname, "created workbook with tab");
    Ok(tab)
}
