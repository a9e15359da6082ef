//! Conversion between A1-style cell labels and numeric cell indexes.
//!
//! Columns use base-26 numbering without a zero digit (A=1 … Z=26, AA=27 …)
//! and rows are decimal. Every conversion takes an explicit [`IndexBase`] so
//! the numbering convention of the numeric side is always visible at the call
//! site.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::{Result, SheetsError};
use crate::requests::{GridRange, SheetId};

const LETTERS_IN_ALPHABET: i64 = 26;

/// Full cell label: column letters followed by row digits.
static CELL_LABEL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z]+)([0-9]+)$").expect("Invalid cell label regex"));

/// One side of a range label, where either component may be absent.
static RANGE_PART_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z]*)([0-9]*)$").expect("Invalid range part regex"));

/// Numbering convention of the numeric side of a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexBase {
    /// Array-style indexes: "A1" is `(0, 0)`.
    Zero,
    /// Spreadsheet-native indexes: "A1" is `(1, 1)`.
    One,
}

impl IndexBase {
    fn offset(self) -> i64 {
        match self {
            IndexBase::Zero => 1,
            IndexBase::One => 0,
        }
    }
}

/// Convert a cell label such as `"B7"` into `(row, column)`.
///
/// # Examples
///
/// ```
/// use datasheets::cell_ref::{label_to_index, IndexBase};
///
/// assert_eq!(label_to_index("A1", IndexBase::Zero).unwrap(), (0, 0));
/// assert_eq!(label_to_index("BH10", IndexBase::One).unwrap(), (10, 60));
/// ```
pub fn label_to_index(label: &str, base: IndexBase) -> Result<(i64, i64)> {
    let captures = CELL_LABEL_REGEX
        .captures(label)
        .ok_or_else(|| SheetsError::InvalidLabelError(label.to_string()))?;

    let column = letters_to_column(&captures[1])
        .ok_or_else(|| SheetsError::InvalidLabelError(label.to_string()))?;
    let row = parse_row(&captures[2])
        .ok_or_else(|| SheetsError::InvalidLabelError(label.to_string()))?;

    let offset = base.offset();
    Ok((row - offset, column - offset))
}

/// Convert `(row, column)` into a cell label such as `"B7"`.
///
/// # Examples
///
/// ```
/// use datasheets::cell_ref::{index_to_label, IndexBase};
///
/// assert_eq!(index_to_label(0, 27, IndexBase::Zero).unwrap(), "AB1");
/// assert_eq!(index_to_label(10, 60, IndexBase::One).unwrap(), "BH10");
/// ```
pub fn index_to_label(row: i64, column: i64, base: IndexBase) -> Result<String> {
    let offset = base.offset();
    let invalid = || SheetsError::InvalidIndexError { row, column };

    let one_based_row = row.checked_add(offset).ok_or_else(invalid)?;
    let one_based_column = column.checked_add(offset).ok_or_else(invalid)?;
    if one_based_row < 1 || one_based_column < 1 {
        return Err(invalid());
    }

    let letters = column_to_letters(one_based_column).ok_or_else(invalid)?;
    Ok(format!("{}{}", letters, one_based_row))
}

/// Encode a one-based column number as letters (1 -> "A", 27 -> "AA").
///
/// Returns `None` for numbers below 1.
pub fn column_to_letters(column: i64) -> Option<String> {
    if column < 1 {
        return None;
    }

    let mut letters = Vec::new();
    let mut quotient = column;
    while quotient > 0 {
        let mut remainder = quotient % LETTERS_IN_ALPHABET;
        quotient /= LETTERS_IN_ALPHABET;
        if remainder == 0 {
            remainder = LETTERS_IN_ALPHABET;
            quotient -= 1;
        }
        letters.push(b'A' + (remainder - 1) as u8);
    }
    letters.reverse();

    String::from_utf8(letters).ok()
}

/// Decode column letters into a one-based column number ("A" -> 1, "aa" -> 27).
///
/// Returns `None` for empty input, non-letters, or overflow.
pub fn letters_to_column(letters: &str) -> Option<i64> {
    if letters.is_empty() {
        return None;
    }

    letters.chars().try_fold(0i64, |acc, c| {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        let digit = (c.to_ascii_uppercase() as u8 - b'A') as i64 + 1;
        acc.checked_mul(LETTERS_IN_ALPHABET)?.checked_add(digit)
    })
}

fn parse_row(digits: &str) -> Option<i64> {
    digits.parse::<i64>().ok().filter(|row| *row >= 1)
}

/// One-based, inclusive bounds parsed from a range label.
///
/// `None` means the range is unbounded on that side, e.g. `"A:A"` has no row
/// bounds and `"2:5"` has no column bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RangeBounds {
    pub start_row: Option<i64>,
    pub start_column: Option<i64>,
    pub end_row: Option<i64>,
    pub end_column: Option<i64>,
}

impl RangeBounds {
    /// Convert into a zero-based, end-exclusive grid range on the given tab.
    ///
    /// Bounds produced by [`parse_range`] always fit a grid index; larger
    /// hand-built bounds saturate.
    pub fn to_grid_range(&self, sheet_id: SheetId) -> GridRange {
        let to_u32 = |v: i64| u32::try_from(v).unwrap_or(u32::MAX);
        GridRange {
            sheet_id,
            start_row_index: self.start_row.map(|r| to_u32(r - 1)),
            end_row_index: self.end_row.map(to_u32),
            start_column_index: self.start_column.map(|c| to_u32(c - 1)),
            end_column_index: self.end_column.map(to_u32),
        }
    }
}

/// Parse a range label such as `"A1:C10"`, `"A:A"`, `"2:5"` or `"B3"`.
pub fn parse_range(label: &str) -> Result<RangeBounds> {
    let invalid = || SheetsError::InvalidLabelError(label.to_string());

    let (start, end) = match label.split_once(':') {
        Some((start, end)) => (start, end),
        None => {
            // A lone label must name a single cell
            let (row, column) = label_to_index(label, IndexBase::One)?;
            return Ok(RangeBounds {
                start_row: Some(row),
                start_column: Some(column),
                end_row: Some(row),
                end_column: Some(column),
            });
        }
    };

    let (start_column, start_row) = parse_range_part(start).ok_or_else(invalid)?;
    let (end_column, end_row) = parse_range_part(end).ok_or_else(invalid)?;

    // Both sides must agree on whether rows and columns are constrained at all
    if (start_column.is_none() && end_column.is_some()) || (start_row.is_none() && end_row.is_some())
    {
        return Err(invalid());
    }
    if (start_column.is_none() && start_row.is_none()) || (end_column.is_none() && end_row.is_none())
    {
        return Err(invalid());
    }

    // Grid indexes are 32-bit on the wire
    let fits_grid = |v: Option<i64>| v.map_or(true, |v| v <= i64::from(u32::MAX));
    if ![start_row, start_column, end_row, end_column]
        .into_iter()
        .all(fits_grid)
    {
        return Err(invalid());
    }

    let bounds = RangeBounds {
        start_row,
        start_column,
        end_row,
        end_column,
    };
    let reversed = |start: Option<i64>, end: Option<i64>| matches!((start, end), (Some(s), Some(e)) if s > e);
    if reversed(bounds.start_row, bounds.end_row) || reversed(bounds.start_column, bounds.end_column) {
        return Err(invalid());
    }

    Ok(bounds)
}

fn parse_range_part(part: &str) -> Option<(Option<i64>, Option<i64>)> {
    let captures = RANGE_PART_REGEX.captures(part)?;
    let letters = &captures[1];
    let digits = &captures[2];

    let column = if letters.is_empty() {
        None
    } else {
        Some(letters_to_column(letters)?)
    };
    let row = if digits.is_empty() {
        None
    } else {
        Some(parse_row(digits)?)
    };

    Some((column, row))
}
