//! A single tab within a workbook: reading, writing and formatting its data.

use std::fmt;

use reqwest::Method;
use tracing::{debug, info};

use crate::cell_ref::parse_range;
use crate::error::{Result, SheetsError};
use crate::models::{Spreadsheet, ValueRange};
use crate::requests::{
    BatchUpdate, Borders, CellFormatOptions, Dimension, GridBounds, GridRange, HorizontalAlign,
    MergeType, SheetId, SheetProperties, VerticalAlign,
};
use crate::url_parser;
use crate::values::{build_value_range, decode_grid_data, Table, TabData, ValueRangeOptions};
use crate::workbook::Workbook;

/// Fields needed to decode cell values and their number formats.
const GRID_DATA_FIELDS: &str =
    "sheets/data/rowData/values(effectiveValue,effectiveFormat/numberFormat/type)";

/// Interpret input as if typed by a user, so dates and formulas are parsed.
const VALUE_INPUT_OPTION: &str = "USER_ENTERED";

/// Quote a tab name for A1 notation, optionally followed by a cell range.
///
/// ```
/// use datasheets::tab::a1_range;
///
/// assert_eq!(a1_range("Sales", Some("A1:C3")), "'Sales'!A1:C3");
/// assert_eq!(a1_range("Bob's", None), "'Bob''s'");
/// ```
pub fn a1_range(tabname: &str, range: Option<&str>) -> String {
    let quoted = format!("'{}'", tabname.replace('\'', "''"));
    match range {
        Some(range) => format!("{}!{}", quoted, range),
        None => quoted,
    }
}

/// Handle to one tab of a [`Workbook`].
#[derive(Clone)]
pub struct Tab {
    workbook: Workbook,
    tabname: String,
    sheet_id: SheetId,
    properties: SheetProperties,
}

impl Tab {
    /// Build a handle from properties returned by the service, which always
    /// carry the tab's `sheetId`.
    pub(crate) fn new(
        workbook: Workbook,
        tabname: String,
        properties: SheetProperties,
    ) -> Result<Self> {
        let sheet_id = properties.sheet_id.ok_or_else(|| SheetsError::ApiError {
            status: 500,
            message: format!("sheetId missing from properties of tab '{}'", tabname),
        })?;
        Ok(Self {
            workbook,
            tabname,
            sheet_id,
            properties,
        })
    }

    pub fn tabname(&self) -> &str {
        &self.tabname
    }

    pub fn workbook(&self) -> &Workbook {
        &self.workbook
    }

    pub fn properties(&self) -> &SheetProperties {
        &self.properties
    }

    pub fn sheet_id(&self) -> SheetId {
        self.sheet_id
    }

    /// Row count of the grid, empty rows included.
    pub fn nrows(&self) -> u32 {
        self.properties
            .grid_properties
            .as_ref()
            .and_then(|g| g.row_count)
            .unwrap_or(0)
    }

    /// Column count of the grid, empty columns included.
    pub fn ncols(&self) -> u32 {
        self.properties
            .grid_properties
            .as_ref()
            .and_then(|g| g.column_count)
            .unwrap_or(0)
    }

    pub fn url(&self) -> String {
        url_parser::tab_url(self.workbook.file_id(), self.sheet_id())
    }

    /// Re-read the tab's properties, e.g. after its grid changed size.
    pub async fn refresh_properties(&mut self) -> Result<()> {
        let fresh = self.workbook.fetch_tab(&self.tabname).await?;
        self.sheet_id = fresh.sheet_id;
        self.properties = fresh.properties;
        Ok(())
    }

    fn grid_range(&self, range: Option<&str>) -> Result<GridRange> {
        match range {
            Some(label) => Ok(parse_range(label)?.to_grid_range(self.sheet_id())),
            None => Ok(GridRange::whole_tab(self.sheet_id())),
        }
    }

    async fn apply(&mut self, batch: &BatchUpdate, refresh: bool) -> Result<()> {
        debug!(tab = %self.tabname, requests = batch.len(), "applying batch update");
        self.workbook.batch_update(batch).await?;
        if refresh {
            self.refresh_properties().await?;
        }
        Ok(())
    }

    /// Append empty rows at the bottom of the tab.
    pub async fn add_rows(&mut self, count: u32) -> Result<()> {
        let mut batch = BatchUpdate::new();
        batch.add_dimension(self.sheet_id(), Dimension::Rows, count);
        self.apply(&batch, true).await
    }

    /// Append empty columns at the right of the tab.
    pub async fn add_columns(&mut self, count: u32) -> Result<()> {
        let mut batch = BatchUpdate::new();
        batch.add_dimension(self.sheet_id(), Dimension::Columns, count);
        self.apply(&batch, true).await
    }

    /// Delete rows or columns `[start, end)` (zero-based).
    pub async fn delete_dimension(
        &mut self,
        dimension: Dimension,
        start: u32,
        end: u32,
    ) -> Result<()> {
        let mut batch = BatchUpdate::new();
        batch.delete_dimension(self.sheet_id(), dimension, start, end);
        self.apply(&batch, true).await
    }

    /// Set the grid size. Shrinking drops whatever lies outside the new
    /// bounds.
    pub async fn alter_dimensions(
        &mut self,
        nrows: Option<u32>,
        ncols: Option<u32>,
    ) -> Result<()> {
        let mut batch = BatchUpdate::new();
        batch.alter_dimensions(self.sheet_id(), nrows, ncols);
        if batch.is_empty() {
            return Ok(());
        }
        self.apply(&batch, true).await
    }

    /// Align cells in `range` (an A1 range such as `"A1:C10"`), or the whole
    /// tab when `range` is `None`.
    pub async fn align_cells(
        &mut self,
        range: Option<&str>,
        horizontal: HorizontalAlign,
        vertical: VerticalAlign,
    ) -> Result<()> {
        let mut batch = BatchUpdate::new();
        batch.align_cells(self.grid_range(range)?, horizontal, vertical);
        self.apply(&batch, false).await
    }

    pub async fn format_font(&mut self, range: Option<&str>, family: &str, size: u32) -> Result<()> {
        let mut batch = BatchUpdate::new();
        batch.format_font(self.grid_range(range)?, family, size);
        self.apply(&batch, false).await
    }

    /// Apply arbitrary formatting to `range`. Does nothing when `options`
    /// sets no field.
    pub async fn format_cells(
        &mut self,
        range: Option<&str>,
        options: &CellFormatOptions,
    ) -> Result<()> {
        let mut batch = BatchUpdate::new();
        batch.update_cell_format(self.grid_range(range)?, options);
        if batch.is_empty() {
            return Ok(());
        }
        self.apply(&batch, false).await
    }

    /// Style and freeze the top `n_header_rows` rows.
    pub async fn format_headers(&mut self, n_header_rows: u32) -> Result<()> {
        if n_header_rows == 0 {
            return Ok(());
        }
        let mut batch = BatchUpdate::new();
        batch
            .update_cell_format(
                GridRange::rows(self.sheet_id(), 0, n_header_rows),
                &CellFormatOptions::header_style(),
            )
            .freeze_rows(self.sheet_id(), n_header_rows);
        self.apply(&batch, false).await
    }

    /// Fit every column's width to its contents.
    pub async fn autosize_columns(&mut self) -> Result<()> {
        let mut batch = BatchUpdate::new();
        batch.auto_resize_columns(self.sheet_id(), 0, self.ncols());
        self.apply(&batch, false).await
    }

    /// Set the pixel size of rows or columns `[start, end)` (zero-based).
    pub async fn resize_dimension(
        &mut self,
        dimension: Dimension,
        start: u32,
        end: u32,
        pixel_size: u32,
    ) -> Result<()> {
        let mut batch = BatchUpdate::new();
        batch.resize_dimension(self.sheet_id(), dimension, start, end, pixel_size);
        self.apply(&batch, false).await
    }

    pub async fn merge_cells(&mut self, range: &str, merge_type: MergeType) -> Result<()> {
        let mut batch = BatchUpdate::new();
        batch.merge_cells(self.grid_range(Some(range))?, merge_type);
        self.apply(&batch, false).await
    }

    pub async fn set_borders(&mut self, range: Option<&str>, borders: Borders) -> Result<()> {
        let mut batch = BatchUpdate::new();
        batch.update_borders(self.grid_range(range)?, borders);
        self.apply(&batch, false).await
    }

    /// Apply the default tab styling: header style and freeze, body
    /// alignment and font, column auto-resize, then shrink the grid to the
    /// populated area. Everything is sent as one batch.
    pub async fn autoformat(&mut self, n_header_rows: u32) -> Result<()> {
        self.refresh_properties().await?;
        let values = self.fetch_values("UNFORMATTED_VALUE").await?;

        let bounds = GridBounds {
            rows: self.nrows(),
            columns: self.ncols(),
        };
        let mut batch = BatchUpdate::new();
        batch.autoformat(self.sheet_id(), bounds, n_header_rows, &values.values);
        self.apply(&batch, true).await
    }

    async fn fetch_values(&self, render_option: &str) -> Result<ValueRange> {
        let client = self.workbook.client();
        let range = a1_range(&self.tabname, None);
        let url = client.sheets_url(&["spreadsheets", self.workbook.file_id(), "values", &range])?;
        let request = client.request(Method::GET, url).await?.query(&[
            ("valueRenderOption", render_option),
            ("majorDimension", "ROWS"),
        ]);
        client.send_json(request).await
    }

    /// Erase all values in the tab, keeping its formatting and size.
    pub async fn clear_data(&self) -> Result<()> {
        let client = self.workbook.client();
        let range = a1_range(&self.tabname, None);
        let url = client.sheets_url(&[
            "spreadsheets",
            self.workbook.file_id(),
            "values",
            &format!("{}:clear", range),
        ])?;
        let request = client
            .request(Method::POST, url)
            .await?
            .json(&serde_json::json!({}));
        client.send(request).await?;

        debug!(tab = %self.tabname, "cleared tab");
        Ok(())
    }

    /// Read the tab's populated area.
    ///
    /// With `headers` the first row supplies column names. Dates, times and
    /// date-times come back as formatted strings.
    pub async fn fetch_data(&self, headers: bool) -> Result<TabData> {
        let client = self.workbook.client();
        let url = client.sheets_url(&["spreadsheets", self.workbook.file_id()])?;
        let range = a1_range(&self.tabname, None);
        let request = client.request(Method::GET, url).await?.query(&[
            ("ranges", range.as_str()),
            ("includeGridData", "true"),
            ("fields", GRID_DATA_FIELDS),
        ]);
        let spreadsheet: Spreadsheet = client.send_json(request).await?;

        let rows = match spreadsheet.sheets.first().and_then(|s| s.data.first()) {
            Some(grid) => decode_grid_data(grid)?,
            None => Vec::new(),
        };
        Ok(TabData::from_rows(rows, headers))
    }

    /// Replace the tab's contents with `table`, headers first.
    ///
    /// The grid grows when the data does not fit; it never shrinks unless
    /// `autoformat` trims it to the populated area.
    pub async fn insert_data(
        &mut self,
        table: &Table,
        options: &ValueRangeOptions,
        autoformat: bool,
    ) -> Result<()> {
        let values = build_value_range(table, options)?;
        let header_rows = values.header_row_count() as u32;
        let needed_rows = header_rows + values.rows.len() as u32;
        let needed_cols = values.width() as u32;

        self.clear_data().await?;

        let grow_rows = (needed_rows > self.nrows()).then_some(needed_rows);
        let grow_cols = (needed_cols > self.ncols()).then_some(needed_cols);
        self.alter_dimensions(grow_rows, grow_cols).await?;

        let range = a1_range(&self.tabname, Some("A1"));
        let body = values.into_value_range(range.clone(), true);
        let client = self.workbook.client();
        let url = client.sheets_url(&["spreadsheets", self.workbook.file_id(), "values", &range])?;
        let request = client
            .request(Method::PUT, url)
            .await?
            .query(&[("valueInputOption", VALUE_INPUT_OPTION)])
            .json(&body);
        client.send(request).await?;

        info!(tab = %self.tabname, rows = needed_rows, columns = needed_cols, "inserted data");

        if autoformat {
            self.autoformat(header_rows).await?;
        }
        Ok(())
    }

    /// Add `table`'s rows after the last populated row. Headers are not
    /// written; the service grows the grid as needed.
    pub async fn append_data(
        &mut self,
        table: &Table,
        options: &ValueRangeOptions,
        autoformat: bool,
    ) -> Result<()> {
        let values = build_value_range(table, options)?;
        let header_rows = values.header_row_count() as u32;
        let appended = values.rows.len();

        let range = a1_range(&self.tabname, None);
        let body = values.into_value_range(range.clone(), false);
        let client = self.workbook.client();
        let url = client.sheets_url(&[
            "spreadsheets",
            self.workbook.file_id(),
            "values",
            &format!("{}:append", range),
        ])?;
        let request = client
            .request(Method::POST, url)
            .await?
            .query(&[("valueInputOption", VALUE_INPUT_OPTION)])
            .json(&body);
        client.send(request).await?;

        info!(tab = %self.tabname, rows = appended, "appended data");

        if autoformat {
            self.autoformat(header_rows).await?;
        } else {
            self.refresh_properties().await?;
        }
        Ok(())
    }
}

impl fmt::Debug for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tab")
            .field("tabname", &self.tabname)
            .field("sheet_id", &self.sheet_id)
            .field("workbook", &self.workbook)
            .field("properties", &self.properties)
            .finish()
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<Tab tabname={:?} filename={:?} file_id={:?}>",
            self.tabname,
            self.workbook.filename(),
            self.workbook.file_id()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_a1_range_quotes_name() {
        assert_eq!(a1_range("my tab", None), "'my tab'");
        assert_eq!(a1_range("it's", Some("A1")), "'it''s'!A1");
    }

    fn workbook() -> Workbook {
        let client = crate::client::Client::with_api_bases(
            crate::auth::Authenticator::from_access_token("token"),
            "https://www.googleapis.com/drive/v3",
            "https://sheets.googleapis.com/v4",
        )
        .unwrap();
        Workbook::new(client, "Budget".to_string(), "wb1".to_string())
    }

    #[test]
    fn test_new_requires_sheet_id() {
        let result = Tab::new(workbook(), "Data".to_string(), SheetProperties::default());
        assert!(matches!(result, Err(SheetsError::ApiError { status: 500, .. })));

        let properties = SheetProperties {
            sheet_id: Some(12),
            ..Default::default()
        };
        let tab = Tab::new(workbook(), "Data".to_string(), properties).unwrap();
        assert_eq!(tab.sheet_id(), 12);
        assert_eq!(tab.url(), "https://docs.google.com/spreadsheets/d/wb1#gid=12");
    }
}
