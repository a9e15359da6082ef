//! Shaping tabular data to and from the Sheets values endpoints.

use indexmap::IndexMap;

use crate::cell_ref::{index_to_label, IndexBase};
use crate::cell_value::CellValue;
use crate::error::{Result, SheetsError};
use crate::models::{GridData, ValueRange};

/// Row labels of a [`Table`], possibly with several levels.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowIndex {
    /// One name per level; unnamed levels render as `index0`, `index1`, ….
    pub names: Vec<Option<String>>,
    /// One entry per data row, each holding one value per level.
    pub values: Vec<Vec<CellValue>>,
}

impl RowIndex {
    /// A single unnamed level.
    pub fn new<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<CellValue>,
    {
        Self {
            names: vec![None],
            values: values.into_iter().map(|v| vec![v.into()]).collect(),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.names = vec![Some(name.into())];
        self
    }

    pub fn levels(&self) -> usize {
        self.names.len()
    }

    fn header_names(&self) -> Vec<String> {
        if self.names.first().is_some_and(Option::is_some) {
            self.names
                .iter()
                .enumerate()
                .map(|(i, n)| n.clone().unwrap_or_else(|| format!("index{}", i)))
                .collect()
        } else {
            (0..self.names.len()).map(|i| format!("index{}", i)).collect()
        }
    }
}

/// Data to upload to a tab.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    /// Column header levels, top level first. Empty when the data has no
    /// header.
    pub columns: Vec<Vec<String>>,
    pub index: Option<RowIndex>,
    pub rows: Vec<Vec<CellValue>>,
}

impl Table {
    /// Headerless rows. Rows may differ in length.
    pub fn from_rows(rows: Vec<Vec<CellValue>>) -> Self {
        Self {
            rows,
            ..Default::default()
        }
    }

    /// A single header row over `rows`.
    pub fn with_header(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self {
            columns: vec![columns],
            rows,
            index: None,
        }
    }

    /// Records keyed by column name. The first record's keys fix the column
    /// order; keys missing from later records become `Null`.
    pub fn from_records(records: &[IndexMap<String, CellValue>]) -> Self {
        let Some(first) = records.first() else {
            return Self::default();
        };
        let columns: Vec<String> = first.keys().cloned().collect();
        let rows = records
            .iter()
            .map(|record| {
                columns
                    .iter()
                    .map(|key| record.get(key).cloned().unwrap_or_default())
                    .collect()
            })
            .collect();

        Self::with_header(columns, rows)
    }

    pub fn with_index(mut self, index: RowIndex) -> Self {
        self.index = Some(index);
        self
    }

    fn check_shape(&self, include_index: bool) -> Result<()> {
        if let Some(width) = self.columns.first().map(Vec::len) {
            if let Some(level) = self.columns.iter().position(|l| l.len() != width) {
                return Err(SheetsError::ShapeError(format!(
                    "column header level {} has {} labels, expected {}",
                    level,
                    self.columns[level].len(),
                    width
                )));
            }
            if let Some(row) = self.rows.iter().position(|r| r.len() != width) {
                return Err(SheetsError::ShapeError(format!(
                    "row {} has {} values, expected {}",
                    row,
                    self.rows[row].len(),
                    width
                )));
            }
        }

        if let (true, Some(index)) = (include_index, &self.index) {
            if index.values.len() != self.rows.len() {
                return Err(SheetsError::ShapeError(format!(
                    "index has {} entries for {} rows",
                    index.values.len(),
                    self.rows.len()
                )));
            }
            let levels = index.levels();
            if let Some(row) = index.values.iter().position(|v| v.len() != levels) {
                return Err(SheetsError::ShapeError(format!(
                    "index entry {} has {} levels, expected {}",
                    row,
                    index.values[row].len(),
                    levels
                )));
            }
        }

        Ok(())
    }
}

/// How a header label renders when it repeats the label beside or above it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderFill {
    Repeat,
    Blank,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueRangeOptions {
    /// Prepend the row index as leading columns.
    pub include_index: bool,
    /// Index-name cells on header rows below the top one.
    pub index_header: HeaderFill,
    /// Column labels on non-bottom levels that continue the span to their
    /// left.
    pub column_header: HeaderFill,
}

impl Default for ValueRangeOptions {
    fn default() -> Self {
        Self {
            include_index: true,
            index_header: HeaderFill::Blank,
            column_header: HeaderFill::Repeat,
        }
    }
}

impl ValueRangeOptions {
    pub fn include_index(include_index: bool) -> Self {
        Self {
            include_index,
            ..Default::default()
        }
    }
}

/// Flattened header rows and data rows ready for upload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableValues {
    pub headers: Vec<Vec<CellValue>>,
    pub rows: Vec<Vec<CellValue>>,
}

impl TableValues {
    pub fn header_row_count(&self) -> usize {
        self.headers.len()
    }

    /// Widest row, headers included.
    pub fn width(&self) -> usize {
        self.headers
            .iter()
            .chain(self.rows.iter())
            .map(Vec::len)
            .max()
            .unwrap_or(0)
    }

    /// Build the `ValueRange` body. Inserts send headers; appends do not.
    pub fn into_value_range(self, range: impl Into<String>, with_headers: bool) -> ValueRange {
        let values = if with_headers {
            self.headers.into_iter().chain(self.rows).collect()
        } else {
            self.rows
        };

        ValueRange {
            range: Some(range.into()),
            major_dimension: Some("ROWS".to_string()),
            values,
        }
    }
}

/// Flatten a table into header rows and data rows.
pub fn build_value_range(table: &Table, options: &ValueRangeOptions) -> Result<TableValues> {
    let index = table.index.as_ref().filter(|_| options.include_index);
    table.check_shape(index.is_some())?;

    let headers = build_headers(table, index, options);
    let rows = table
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let mut out = index.map(|idx| idx.values[i].clone()).unwrap_or_default();
            out.extend(row.iter().cloned());
            out
        })
        .collect();

    Ok(TableValues { headers, rows })
}

fn build_headers(
    table: &Table,
    index: Option<&RowIndex>,
    options: &ValueRangeOptions,
) -> Vec<Vec<CellValue>> {
    if table.columns.is_empty() {
        return Vec::new();
    }
    let index_names = index.map(RowIndex::header_names).unwrap_or_default();

    let levels = table.columns.len();
    (0..levels)
        .map(|level| {
            let mut row: Vec<CellValue> = index_names
                .iter()
                .map(|name| match (level, options.index_header) {
                    (0, _) | (_, HeaderFill::Repeat) => CellValue::from(name.as_str()),
                    (_, HeaderFill::Blank) => CellValue::Null,
                })
                .collect();

            let labels = &table.columns[level];
            let is_bottom = level + 1 == levels;
            row.extend(labels.iter().enumerate().map(|(col, label)| {
                let continues_span = col > 0
                    && (0..=level).all(|l| table.columns[l][col] == table.columns[l][col - 1]);
                if !is_bottom && continues_span && options.column_header == HeaderFill::Blank {
                    CellValue::Null
                } else {
                    CellValue::from(label.as_str())
                }
            }));
            row
        })
        .collect()
}

/// Data read from a tab.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TabData {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl TabData {
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty() && self.rows.is_empty()
    }

    /// One ordered map per row, keyed by header.
    pub fn records(&self) -> Vec<IndexMap<String, CellValue>> {
        self.rows
            .iter()
            .map(|row| {
                self.headers
                    .iter()
                    .cloned()
                    .zip(row.iter().cloned())
                    .collect()
            })
            .collect()
    }

    /// Shape decoded rows into rectangular data.
    ///
    /// Rows after the last non-empty one are dropped, as are trailing empty
    /// cells. With `headers` the first row names the columns and sets the
    /// width; otherwise the widest row sets it and columns are numbered.
    pub fn from_rows(mut rows: Vec<Vec<CellValue>>, headers: bool) -> Self {
        let Some(last) = find_max_nonempty_row(&rows) else {
            return Self::default();
        };
        rows.truncate(last + 1);
        rows.iter_mut().for_each(remove_trailing_empties);

        let (names, width) = if headers {
            let names: Vec<String> = rows.remove(0).iter().map(CellValue::to_label).collect();
            let width = names.len();
            (names, width)
        } else {
            let width = rows.iter().map(Vec::len).max().unwrap_or(0);
            ((0..width).map(|i| i.to_string()).collect(), width)
        };

        let rows = rows.into_iter().map(|row| resize_row(row, width)).collect();
        Self {
            headers: names,
            rows,
        }
    }
}

/// Index of the last row holding any non-empty value. Empty rows between
/// populated ones are kept.
pub fn find_max_nonempty_row(rows: &[Vec<CellValue>]) -> Option<usize> {
    rows.iter()
        .rposition(|row| row.iter().any(|v| !v.is_empty()))
}

pub fn remove_trailing_empties(row: &mut Vec<CellValue>) {
    while row.last().is_some_and(CellValue::is_empty) {
        row.pop();
    }
}

/// Pad with `Null` or truncate to exactly `len` values.
pub fn resize_row(mut row: Vec<CellValue>, len: usize) -> Vec<CellValue> {
    row.resize(len, CellValue::Null);
    row
}

/// Decode grid data into rows of values.
///
/// Fails on the first cell holding a formula error, naming it by label.
pub fn decode_grid_data(grid: &GridData) -> Result<Vec<Vec<CellValue>>> {
    grid.row_data
        .iter()
        .enumerate()
        .map(|(r, row)| {
            row.values
                .iter()
                .enumerate()
                .map(|(c, cell)| {
                    let Some(value) = &cell.effective_value else {
                        return Ok(CellValue::Null);
                    };
                    if let Some(error) = &value.error_value {
                        let label = index_to_label(r as i64, c as i64, IndexBase::Zero)?;
                        return Err(SheetsError::FetchDataError(format!(
                            "Error of type \"{}\" within cell {} prevents fetching data. Message: \"{}\"",
                            error.kind.as_deref().unwrap_or("unknown type"),
                            label,
                            error.message.as_deref().unwrap_or("unknown error message"),
                        )));
                    }
                    Ok(CellValue::from_effective(value, cell.number_format_type()))
                })
                .collect::<Result<Vec<_>>>()
        })
        .collect()
}
