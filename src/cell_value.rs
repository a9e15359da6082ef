//! Scalar cell values exchanged with the Sheets values endpoints.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::models::{ExtendedValue, NumberFormatType};

/// Rendering used for dates sent to or read from a tab.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// Rendering used for times of day.
pub const TIME_FORMAT: &str = "%H:%M:%S";
/// Rendering used for date-times.
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const SECONDS_PER_DAY: f64 = 86_400.0;

/// A single cell value.
///
/// Serializes as a bare JSON scalar, which is what the Sheets `ValueRange`
/// schema expects in its `values` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum CellValue {
    Bool(bool),
    Number(f64),
    String(String),
    #[default]
    Null,
}

impl CellValue {
    /// True for cells that hold nothing: `Null` or the empty string.
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::String(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Decode a grid-data cell using its effective number format.
    ///
    /// Dates and times are stored as serial numbers counting days since
    /// 1899-12-30; those are rendered with [`DATE_FORMAT`], [`TIME_FORMAT`]
    /// and [`DATE_TIME_FORMAT`].
    pub fn from_effective(value: &ExtendedValue, format: Option<&NumberFormatType>) -> Self {
        if let Some(b) = value.bool_value {
            return CellValue::Bool(b);
        }
        if let Some(s) = &value.string_value {
            return CellValue::String(s.clone());
        }
        let Some(serial) = value.number_value else {
            return CellValue::Null;
        };

        let rendered = match format {
            Some(NumberFormatType::Date) => serial_to_datetime(serial)
                .map(|dt| dt.format(DATE_FORMAT).to_string()),
            Some(NumberFormatType::Time) => serial_to_datetime(serial)
                .map(|dt| dt.format(TIME_FORMAT).to_string()),
            Some(NumberFormatType::DateTime) => serial_to_datetime(serial)
                .map(|dt| dt.format(DATE_TIME_FORMAT).to_string()),
            _ => None,
        };

        match rendered {
            Some(s) => CellValue::String(s),
            None => CellValue::from(serial),
        }
    }

    /// Header-style rendering: strings as-is, numbers without a trailing
    /// `.0` when integral, `Null` as the empty string.
    pub fn to_label(&self) -> String {
        match self {
            CellValue::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                format!("{}", *n as i64)
            }
            CellValue::Number(n) => n.to_string(),
            CellValue::String(s) => s.clone(),
            CellValue::Null => String::new(),
        }
    }
}

fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let seconds = (serial * SECONDS_PER_DAY).round();
    if !seconds.is_finite() || seconds.abs() >= (i64::MAX / 1000) as f64 {
        return None;
    }
    epoch.checked_add_signed(Duration::try_seconds(seconds as i64)?)
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_label())
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        if n.is_nan() {
            CellValue::Null
        } else {
            CellValue::Number(n)
        }
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<i32> for CellValue {
    fn from(n: i32) -> Self {
        CellValue::Number(n.into())
    }
}

impl From<u32> for CellValue {
    fn from(n: u32) -> Self {
        CellValue::Number(n.into())
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(s)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(date: NaiveDate) -> Self {
        CellValue::String(date.format(DATE_FORMAT).to_string())
    }
}

impl From<NaiveTime> for CellValue {
    fn from(time: NaiveTime) -> Self {
        CellValue::String(time.format(TIME_FORMAT).to_string())
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(datetime: NaiveDateTime) -> Self {
        CellValue::String(datetime.format(DATE_TIME_FORMAT).to_string())
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(CellValue::Null)
    }
}
