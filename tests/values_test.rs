//! Tests for flattening tables into value ranges and reading tab data back.

use datasheets::models::GridData;
use datasheets::values::{build_value_range, decode_grid_data};
use datasheets::{CellValue, HeaderFill, RowIndex, SheetsError, TabData, Table, ValueRangeOptions};
use indexmap::IndexMap;
use serde_json::json;

fn s(value: &str) -> CellValue {
    CellValue::from(value)
}

fn n(value: i64) -> CellValue {
    CellValue::from(value)
}

fn header(labels: &[&str]) -> Vec<String> {
    labels.iter().map(|l| l.to_string()).collect()
}

mod build_value_range {
    use super::*;

    fn three_by_two() -> Table {
        Table::with_header(
            header(&["a", "b"]),
            vec![
                vec![n(1), s("x")],
                vec![n(2), s("y")],
                vec![n(3), s("z")],
            ],
        )
        .with_index(RowIndex::new([10, 11, 12]))
    }

    #[test]
    fn index_becomes_leading_column() {
        let values = build_value_range(&three_by_two(), &ValueRangeOptions::default()).unwrap();

        assert_eq!(values.headers, vec![vec![s("index0"), s("a"), s("b")]]);
        assert_eq!(values.rows.len(), 3);
        assert!(values.rows.iter().all(|row| row.len() == 3));
        assert_eq!(values.rows[1], vec![n(11), n(2), s("y")]);
        assert_eq!(values.header_row_count(), 1);
        assert_eq!(values.width(), 3);
    }

    #[test]
    fn named_index() {
        let table = three_by_two().with_index(RowIndex::new(["r1", "r2", "r3"]).named("row"));
        let values = build_value_range(&table, &ValueRangeOptions::default()).unwrap();
        assert_eq!(values.headers[0][0], s("row"));
        assert_eq!(values.rows[2][0], s("r3"));
    }

    #[test]
    fn index_excluded() {
        let values =
            build_value_range(&three_by_two(), &ValueRangeOptions::include_index(false)).unwrap();
        assert_eq!(values.headers, vec![vec![s("a"), s("b")]]);
        assert_eq!(values.rows[0], vec![n(1), s("x")]);
    }

    #[test]
    fn headerless_rows() {
        let table = Table::from_rows(vec![vec![n(1)], vec![n(2), n(3)]]);
        let values = build_value_range(&table, &ValueRangeOptions::default()).unwrap();
        assert!(values.headers.is_empty());
        assert_eq!(values.width(), 2);
    }

    #[test]
    fn value_range_body() {
        let values = build_value_range(&three_by_two(), &ValueRangeOptions::default()).unwrap();
        let body = values.clone().into_value_range("'Data'!A1", true);
        assert_eq!(body.values.len(), 4);
        assert_eq!(
            serde_json::to_value(&body).unwrap()["majorDimension"],
            "ROWS"
        );

        let appended = values.into_value_range("'Data'", false);
        assert_eq!(appended.values.len(), 3);
        assert_eq!(appended.values[0][0], n(10));
    }
}

mod shape_errors {
    use super::*;

    #[test]
    fn row_width_mismatch() {
        let table = Table::with_header(header(&["a", "b"]), vec![vec![n(1)]]);
        assert!(matches!(
            build_value_range(&table, &ValueRangeOptions::default()),
            Err(SheetsError::ShapeError(_))
        ));
    }

    #[test]
    fn index_length_mismatch() {
        let table =
            Table::with_header(header(&["a"]), vec![vec![n(1)], vec![n(2)]]).with_index(RowIndex::new([1]));
        assert!(matches!(
            build_value_range(&table, &ValueRangeOptions::default()),
            Err(SheetsError::ShapeError(_))
        ));
        // Not checked when the index is left out
        assert!(build_value_range(&table, &ValueRangeOptions::include_index(false)).is_ok());
    }

    #[test]
    fn ragged_header_levels() {
        let table = Table {
            columns: vec![header(&["a", "a"]), header(&["x"])],
            index: None,
            rows: vec![],
        };
        assert!(matches!(
            build_value_range(&table, &ValueRangeOptions::default()),
            Err(SheetsError::ShapeError(_))
        ));
    }
}

mod multi_level_headers {
    use super::*;

    fn table() -> Table {
        Table {
            columns: vec![header(&["sales", "sales", "cost"]), header(&["q1", "q2", "q1"])],
            index: Some(RowIndex::new(["north"]).named("region")),
            rows: vec![vec![n(1), n(2), n(3)]],
        }
    }

    #[test]
    fn repeat_column_labels_blank_index() {
        let values = build_value_range(&table(), &ValueRangeOptions::default()).unwrap();
        assert_eq!(
            values.headers,
            vec![
                vec![s("region"), s("sales"), s("sales"), s("cost")],
                vec![CellValue::Null, s("q1"), s("q2"), s("q1")],
            ]
        );
        assert_eq!(values.rows, vec![vec![s("north"), n(1), n(2), n(3)]]);
    }

    #[test]
    fn blank_column_labels_repeat_index() {
        let options = ValueRangeOptions {
            include_index: true,
            index_header: HeaderFill::Repeat,
            column_header: HeaderFill::Blank,
        };
        let values = build_value_range(&table(), &options).unwrap();
        assert_eq!(
            values.headers,
            vec![
                vec![s("region"), s("sales"), CellValue::Null, s("cost")],
                vec![s("region"), s("q1"), s("q2"), s("q1")],
            ]
        );
    }
}

mod records {
    use super::*;

    #[test]
    fn missing_keys_become_null() {
        let mut first = IndexMap::new();
        first.insert("name".to_string(), s("ann"));
        first.insert("age".to_string(), n(31));
        let mut second = IndexMap::new();
        second.insert("age".to_string(), n(40));

        let table = Table::from_records(&[first, second]);
        assert_eq!(table.columns, vec![header(&["name", "age"])]);
        assert_eq!(table.rows[1], vec![CellValue::Null, n(40)]);
    }

    #[test]
    fn no_records() {
        assert_eq!(Table::from_records(&[]), Table::default());
    }
}

mod tab_data {
    use super::*;

    #[test]
    fn with_headers() {
        let rows = vec![
            vec![s("name"), s("score"), CellValue::Null],
            vec![s("ann"), n(3)],
            vec![s("bob")],
            vec![CellValue::Null, s("")],
        ];
        let data = TabData::from_rows(rows, true);

        assert_eq!(data.headers, vec!["name", "score"]);
        assert_eq!(
            data.rows,
            vec![vec![s("ann"), n(3)], vec![s("bob"), CellValue::Null]]
        );

        let records = data.records();
        assert_eq!(records[1]["name"], s("bob"));
        assert_eq!(records[1]["score"], CellValue::Null);
    }

    #[test]
    fn without_headers() {
        let rows = vec![vec![n(1)], vec![CellValue::Null], vec![n(2), n(3)]];
        let data = TabData::from_rows(rows, false);
        assert_eq!(data.headers, vec!["0", "1"]);
        assert_eq!(data.rows.len(), 3);
        assert_eq!(data.rows[1], vec![CellValue::Null, CellValue::Null]);
    }

    #[test]
    fn empty_tab() {
        assert!(TabData::from_rows(vec![vec![CellValue::Null]], true).is_empty());
        assert!(TabData::from_rows(vec![], false).is_empty());
    }
}

mod grid_data {
    use super::*;

    #[test]
    fn decodes_typed_values() {
        let grid: GridData = serde_json::from_value(json!({
            "rowData": [
                {"values": [
                    {"effectiveValue": {"stringValue": "when"}},
                    {"effectiveValue": {"stringValue": "ok"}}
                ]},
                {"values": [
                    {
                        "effectiveValue": {"numberValue": 42370.0},
                        "effectiveFormat": {"numberFormat": {"type": "DATE"}}
                    },
                    {"effectiveValue": {"boolValue": true}},
                    {}
                ]}
            ]
        }))
        .unwrap();

        let rows = decode_grid_data(&grid).unwrap();
        assert_eq!(rows[1], vec![s("2016-01-01"), CellValue::Bool(true), CellValue::Null]);
    }

    #[test]
    fn formula_error_names_cell() {
        let grid: GridData = serde_json::from_value(json!({
            "rowData": [
                {"values": [{"effectiveValue": {"numberValue": 1.0}}]},
                {"values": [
                    {},
                    {"effectiveValue": {"errorValue": {"type": "DIVIDE_BY_ZERO", "message": "Division by zero"}}}
                ]}
            ]
        }))
        .unwrap();

        match decode_grid_data(&grid) {
            Err(SheetsError::FetchDataError(message)) => {
                assert!(message.contains("DIVIDE_BY_ZERO"));
                assert!(message.contains("B2"));
            }
            other => panic!("expected FetchDataError, got {:?}", other),
        }
    }
}
