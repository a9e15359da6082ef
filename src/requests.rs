//! Sheets v4 `batchUpdate` requests.
//!
//! [`BatchUpdate`] collects [`Request`]s in the order they are added and
//! serializes to the `{"requests": [...]}` body of a single
//! `spreadsheets.batchUpdate` call. The remote service applies requests in
//! sequence, so the builder never reorders them.

use serde::{Deserialize, Serialize};

use crate::cell_value::CellValue;

/// Numeric identifier of a tab within a workbook.
pub type SheetId = i32;

/// Background colour applied to header rows by [`BatchUpdate::autoformat`].
pub const HEADER_BACKGROUND: Color = Color::gray(0.26274511);
/// Text colour applied to header rows by [`BatchUpdate::autoformat`].
pub const HEADER_TEXT: Color = Color::gray(0.95294118);
pub const DEFAULT_FONT_FAMILY: &str = "Proxima Nova";
pub const DEFAULT_FONT_SIZE: u32 = 10;

/// A rectangular region of a tab. Indexes are zero-based and end-exclusive;
/// a missing bound means the range is unbounded on that side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridRange {
    pub sheet_id: SheetId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_row_index: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_row_index: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_column_index: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_column_index: Option<u32>,
}

impl GridRange {
    /// Every cell of the tab.
    pub fn whole_tab(sheet_id: SheetId) -> Self {
        Self {
            sheet_id,
            ..Default::default()
        }
    }

    /// Rows `[start, end)` across all columns.
    pub fn rows(sheet_id: SheetId, start: u32, end: u32) -> Self {
        Self {
            sheet_id,
            start_row_index: Some(start),
            end_row_index: Some(end),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Dimension {
    Rows,
    Columns,
}

/// A span of rows or columns. Indexes are zero-based and end-exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionRange {
    pub sheet_id: SheetId,
    pub dimension: Dimension,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_index: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_index: Option<u32>,
}

/// RGB colour with components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
}

impl Color {
    pub const fn rgb(red: f64, green: f64, blue: f64) -> Self {
        Self { red, green, blue }
    }

    pub const fn gray(level: f64) -> Self {
        Self::rgb(level, level, level)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HorizontalAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerticalAlign {
    Top,
    Middle,
    Bottom,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextFormat {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreground_color: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellFormat {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub horizontal_alignment: Option<HorizontalAlign>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertical_alignment: Option<VerticalAlign>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_format: Option<TextFormat>,
}

/// The `cell` template of a `repeatCell` request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellFormatData {
    pub user_entered_format: CellFormat,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frozen_row_count: Option<u32>,
}

/// Properties of a tab, used both in requests and in `spreadsheets.get`
/// responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet_id: Option<SheetId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_properties: Option<GridProperties>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepeatCellRequest {
    pub range: GridRange,
    pub cell: CellFormatData,
    pub fields: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateSheetPropertiesRequest {
    pub properties: SheetProperties,
    pub fields: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionProperties {
    pub pixel_size: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateDimensionPropertiesRequest {
    pub range: DimensionRange,
    pub properties: DimensionProperties,
    pub fields: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppendDimensionRequest {
    pub sheet_id: SheetId,
    pub dimension: Dimension,
    pub length: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteDimensionRequest {
    pub range: DimensionRange,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoResizeDimensionsRequest {
    pub dimensions: DimensionRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BorderStyle {
    Dotted,
    Dashed,
    Solid,
    SolidMedium,
    SolidThick,
    Double,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Border {
    pub style: BorderStyle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
}

impl Border {
    pub fn solid() -> Self {
        Self {
            style: BorderStyle::Solid,
            color: None,
        }
    }
}

/// Which edges of a range to restyle. Edges left as `None` are untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Borders {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<Border>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bottom: Option<Border>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<Border>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<Border>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inner_horizontal: Option<Border>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inner_vertical: Option<Border>,
}

impl Borders {
    /// The same border on every outer and inner edge.
    pub fn all(border: Border) -> Self {
        Self {
            top: Some(border),
            bottom: Some(border),
            left: Some(border),
            right: Some(border),
            inner_horizontal: Some(border),
            inner_vertical: Some(border),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateBordersRequest {
    pub range: GridRange,
    #[serde(flatten)]
    pub borders: Borders,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MergeType {
    MergeAll,
    MergeColumns,
    MergeRows,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeCellsRequest {
    pub range: GridRange,
    pub merge_type: MergeType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddSheetRequest {
    pub properties: SheetProperties,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteSheetRequest {
    pub sheet_id: SheetId,
}

/// One entry of a `batchUpdate` body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Request {
    RepeatCell(RepeatCellRequest),
    UpdateSheetProperties(UpdateSheetPropertiesRequest),
    UpdateDimensionProperties(UpdateDimensionPropertiesRequest),
    AppendDimension(AppendDimensionRequest),
    DeleteDimension(DeleteDimensionRequest),
    AutoResizeDimensions(AutoResizeDimensionsRequest),
    UpdateBorders(UpdateBordersRequest),
    MergeCells(MergeCellsRequest),
    AddSheet(AddSheetRequest),
    DeleteSheet(DeleteSheetRequest),
}

/// Formatting to apply to a range. Only the fields that are set end up in the
/// request's field mask, so unset properties keep their current values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellFormatOptions {
    pub background_color: Option<Color>,
    pub text_color: Option<Color>,
    pub font_family: Option<String>,
    pub font_size: Option<u32>,
    pub bold: Option<bool>,
    pub horizontal_alignment: Option<HorizontalAlign>,
    pub vertical_alignment: Option<VerticalAlign>,
}

impl CellFormatOptions {
    /// Build the cell format together with its `fields` mask, or `None` when
    /// nothing is set.
    pub fn to_format_and_mask(&self) -> Option<(CellFormat, String)> {
        let mut top = Vec::new();
        let mut text = Vec::new();

        if self.background_color.is_some() {
            top.push("backgroundColor".to_string());
        }
        if self.text_color.is_some() {
            text.push("foregroundColor");
        }
        if self.font_family.is_some() {
            text.push("fontFamily");
        }
        if self.font_size.is_some() {
            text.push("fontSize");
        }
        if self.bold.is_some() {
            text.push("bold");
        }
        if !text.is_empty() {
            top.push(format!("textFormat({})", text.join(",")));
        }
        if self.horizontal_alignment.is_some() {
            top.push("horizontalAlignment".to_string());
        }
        if self.vertical_alignment.is_some() {
            top.push("verticalAlignment".to_string());
        }

        if top.is_empty() {
            return None;
        }

        let text_format = (!text.is_empty()).then(|| TextFormat {
            foreground_color: self.text_color,
            font_family: self.font_family.clone(),
            font_size: self.font_size,
            bold: self.bold,
        });
        let format = CellFormat {
            background_color: self.background_color,
            horizontal_alignment: self.horizontal_alignment,
            vertical_alignment: self.vertical_alignment,
            text_format,
        };

        Some((format, format!("userEnteredFormat({})", top.join(","))))
    }

    /// The dark gray / off-white style used for header rows.
    pub fn header_style() -> Self {
        Self {
            background_color: Some(HEADER_BACKGROUND),
            text_color: Some(HEADER_TEXT),
            font_family: Some(DEFAULT_FONT_FAMILY.to_string()),
            font_size: Some(DEFAULT_FONT_SIZE),
            bold: Some(false),
            horizontal_alignment: Some(HorizontalAlign::Left),
            vertical_alignment: Some(VerticalAlign::Middle),
        }
    }

    /// Left/middle alignment in the default font, used for body rows.
    pub fn body_style() -> Self {
        Self {
            font_family: Some(DEFAULT_FONT_FAMILY.to_string()),
            font_size: Some(DEFAULT_FONT_SIZE),
            horizontal_alignment: Some(HorizontalAlign::Left),
            vertical_alignment: Some(VerticalAlign::Middle),
            ..Default::default()
        }
    }
}

/// Current grid size of a tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridBounds {
    pub rows: u32,
    pub columns: u32,
}

/// Zero-based `(last_row, last_column)` holding a non-empty value, or `None`
/// when every cell is empty.
pub fn populated_extent(rows: &[Vec<CellValue>]) -> Option<(u32, u32)> {
    let mut extent: Option<(usize, usize)> = None;
    for (r, row) in rows.iter().enumerate() {
        if let Some(c) = row.iter().rposition(|v| !v.is_empty()) {
            extent = Some(match extent {
                Some((_, max_c)) => (r, max_c.max(c)),
                None => (r, c),
            });
        }
    }
    extent.map(|(r, c)| (to_u32(r), to_u32(c)))
}

fn to_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

/// Ordered list of requests for one `spreadsheets.batchUpdate` call.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchUpdate {
    requests: Vec<Request>,
}

impl BatchUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, request: Request) -> &mut Self {
        self.requests.push(request);
        self
    }

    pub fn extend(&mut self, other: BatchUpdate) -> &mut Self {
        self.requests.extend(other.requests);
        self
    }

    pub fn requests(&self) -> &[Request] {
        &self.requests
    }

    pub fn into_requests(self) -> Vec<Request> {
        self.requests
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// Set the pixel size of rows or columns `[start, end)`.
    pub fn resize_dimension(
        &mut self,
        tab: SheetId,
        dimension: Dimension,
        start: u32,
        end: u32,
        pixel_size: u32,
    ) -> &mut Self {
        self.push(Request::UpdateDimensionProperties(
            UpdateDimensionPropertiesRequest {
                range: DimensionRange {
                    sheet_id: tab,
                    dimension,
                    start_index: Some(start),
                    end_index: Some(end),
                },
                properties: DimensionProperties { pixel_size },
                fields: "pixelSize".to_string(),
            },
        ))
    }

    /// Apply the supplied formatting to every cell in `range`.
    ///
    /// Emits nothing when `options` sets no field.
    pub fn update_cell_format(&mut self, range: GridRange, options: &CellFormatOptions) -> &mut Self {
        match options.to_format_and_mask() {
            Some((format, fields)) => self.push(Request::RepeatCell(RepeatCellRequest {
                range,
                cell: CellFormatData {
                    user_entered_format: format,
                },
                fields,
            })),
            None => self,
        }
    }

    pub fn align_cells(
        &mut self,
        range: GridRange,
        horizontal: HorizontalAlign,
        vertical: VerticalAlign,
    ) -> &mut Self {
        let options = CellFormatOptions {
            horizontal_alignment: Some(horizontal),
            vertical_alignment: Some(vertical),
            ..Default::default()
        };
        self.update_cell_format(range, &options)
    }

    pub fn format_font(&mut self, range: GridRange, family: &str, size: u32) -> &mut Self {
        let options = CellFormatOptions {
            font_family: Some(family.to_string()),
            font_size: Some(size),
            ..Default::default()
        };
        self.update_cell_format(range, &options)
    }

    /// Keep the first `count` rows visible while scrolling.
    pub fn freeze_rows(&mut self, tab: SheetId, count: u32) -> &mut Self {
        self.push(Request::UpdateSheetProperties(UpdateSheetPropertiesRequest {
            properties: SheetProperties {
                sheet_id: Some(tab),
                grid_properties: Some(GridProperties {
                    frozen_row_count: Some(count),
                    ..Default::default()
                }),
                ..Default::default()
            },
            fields: "gridProperties.frozenRowCount".to_string(),
        }))
    }

    /// Append `count` rows or columns after the current bounds.
    pub fn add_dimension(&mut self, tab: SheetId, dimension: Dimension, count: u32) -> &mut Self {
        self.push(Request::AppendDimension(AppendDimensionRequest {
            sheet_id: tab,
            dimension,
            length: count,
        }))
    }

    /// Remove rows or columns `[start, end)`.
    pub fn delete_dimension(
        &mut self,
        tab: SheetId,
        dimension: Dimension,
        start: u32,
        end: u32,
    ) -> &mut Self {
        self.push(Request::DeleteDimension(DeleteDimensionRequest {
            range: DimensionRange {
                sheet_id: tab,
                dimension,
                start_index: Some(start),
                end_index: Some(end),
            },
        }))
    }

    /// Set the tab's row and/or column count.
    ///
    /// Shrinking is destructive: data beyond the new bounds is dropped by the
    /// service when the request executes. Emits nothing when both counts are
    /// `None`.
    pub fn alter_dimensions(
        &mut self,
        tab: SheetId,
        rows: Option<u32>,
        columns: Option<u32>,
    ) -> &mut Self {
        let mut fields = Vec::new();
        if rows.is_some() {
            fields.push("gridProperties.rowCount");
        }
        if columns.is_some() {
            fields.push("gridProperties.columnCount");
        }
        if fields.is_empty() {
            return self;
        }

        self.push(Request::UpdateSheetProperties(UpdateSheetPropertiesRequest {
            properties: SheetProperties {
                sheet_id: Some(tab),
                grid_properties: Some(GridProperties {
                    row_count: rows,
                    column_count: columns,
                    frozen_row_count: None,
                }),
                ..Default::default()
            },
            fields: fields.join(","),
        }))
    }

    /// Fit the widths of columns `[start, end)` to their contents.
    pub fn auto_resize_columns(&mut self, tab: SheetId, start: u32, end: u32) -> &mut Self {
        self.push(Request::AutoResizeDimensions(AutoResizeDimensionsRequest {
            dimensions: DimensionRange {
                sheet_id: tab,
                dimension: Dimension::Columns,
                start_index: Some(start),
                end_index: Some(end),
            },
        }))
    }

    pub fn update_borders(&mut self, range: GridRange, borders: Borders) -> &mut Self {
        self.push(Request::UpdateBorders(UpdateBordersRequest { range, borders }))
    }

    pub fn merge_cells(&mut self, range: GridRange, merge_type: MergeType) -> &mut Self {
        self.push(Request::MergeCells(MergeCellsRequest { range, merge_type }))
    }

    pub fn add_tab(&mut self, title: &str, rows: u32, columns: u32) -> &mut Self {
        self.push(Request::AddSheet(AddSheetRequest {
            properties: SheetProperties {
                title: Some(title.to_string()),
                grid_properties: Some(GridProperties {
                    row_count: Some(rows),
                    column_count: Some(columns),
                    frozen_row_count: None,
                }),
                ..Default::default()
            },
        }))
    }

    pub fn delete_tab(&mut self, tab: SheetId) -> &mut Self {
        self.push(Request::DeleteSheet(DeleteSheetRequest { sheet_id: tab }))
    }

    /// Default styling for a tab holding `populated` data under
    /// `header_rows` rows of headers.
    ///
    /// Emits, in order: header style and freeze, body alignment and font,
    /// column auto-resize, then a trim of the grid to the populated extent.
    /// The trim is skipped when `populated` has no non-empty cell.
    pub fn autoformat(
        &mut self,
        tab: SheetId,
        bounds: GridBounds,
        header_rows: u32,
        populated: &[Vec<CellValue>],
    ) -> &mut Self {
        let header_rows = header_rows.min(bounds.rows);

        if header_rows > 0 {
            self.update_cell_format(
                GridRange::rows(tab, 0, header_rows),
                &CellFormatOptions::header_style(),
            );
            self.freeze_rows(tab, header_rows);
        }

        if bounds.rows > header_rows {
            self.update_cell_format(
                GridRange::rows(tab, header_rows, bounds.rows),
                &CellFormatOptions::body_style(),
            );
        }

        self.auto_resize_columns(tab, 0, bounds.columns);

        if let Some((last_row, last_column)) = populated_extent(populated) {
            self.alter_dimensions(tab, Some(last_row + 1), Some(last_column + 1));
        }

        self
    }
}
