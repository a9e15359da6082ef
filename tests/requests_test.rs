//! Tests for batchUpdate request building.

use datasheets::requests::{
    BatchUpdate, Border, Borders, CellFormatOptions, Color, Dimension, GridBounds, GridRange,
    HorizontalAlign, MergeType, Request, VerticalAlign,
};
use datasheets::CellValue;
use serde_json::json;

fn to_json(batch: &BatchUpdate) -> serde_json::Value {
    serde_json::to_value(batch).unwrap()
}

mod wire_format {
    use super::*;

    #[test]
    fn body_is_requests_array() {
        let mut batch = BatchUpdate::new();
        batch.delete_tab(3);
        assert_eq!(
            to_json(&batch),
            json!({"requests": [{"deleteSheet": {"sheetId": 3}}]})
        );
    }

    #[test]
    fn resize_dimension() {
        let mut batch = BatchUpdate::new();
        batch.resize_dimension(1, Dimension::Columns, 0, 2, 150);
        assert_eq!(
            to_json(&batch)["requests"][0],
            json!({
                "updateDimensionProperties": {
                    "range": {"sheetId": 1, "dimension": "COLUMNS", "startIndex": 0, "endIndex": 2},
                    "properties": {"pixelSize": 150},
                    "fields": "pixelSize"
                }
            })
        );
    }

    #[test]
    fn align_cells_whole_tab() {
        let mut batch = BatchUpdate::new();
        batch.align_cells(GridRange::whole_tab(9), HorizontalAlign::Center, VerticalAlign::Top);
        assert_eq!(
            to_json(&batch)["requests"][0],
            json!({
                "repeatCell": {
                    "range": {"sheetId": 9},
                    "cell": {"userEnteredFormat": {
                        "horizontalAlignment": "CENTER",
                        "verticalAlignment": "TOP"
                    }},
                    "fields": "userEnteredFormat(horizontalAlignment,verticalAlignment)"
                }
            })
        );
    }

    #[test]
    fn format_font() {
        let mut batch = BatchUpdate::new();
        batch.format_font(GridRange::rows(0, 1, 4), "Arial", 12);
        assert_eq!(
            to_json(&batch)["requests"][0]["repeatCell"],
            json!({
                "range": {"sheetId": 0, "startRowIndex": 1, "endRowIndex": 4},
                "cell": {"userEnteredFormat": {"textFormat": {"fontFamily": "Arial", "fontSize": 12}}},
                "fields": "userEnteredFormat(textFormat(fontFamily,fontSize))"
            })
        );
    }

    #[test]
    fn background_and_bold() {
        let options = CellFormatOptions {
            background_color: Some(Color::rgb(1.0, 0.5, 0.0)),
            bold: Some(true),
            ..Default::default()
        };
        let mut batch = BatchUpdate::new();
        batch.update_cell_format(GridRange::whole_tab(0), &options);
        assert_eq!(
            to_json(&batch)["requests"][0]["repeatCell"]["cell"],
            json!({"userEnteredFormat": {
                "backgroundColor": {"red": 1.0, "green": 0.5, "blue": 0.0},
                "textFormat": {"bold": true}
            }})
        );
    }

    #[test]
    fn add_and_append_dimension() {
        let mut batch = BatchUpdate::new();
        batch
            .add_tab("Data", 100, 5)
            .add_dimension(4, Dimension::Rows, 10)
            .delete_dimension(4, Dimension::Rows, 0, 2);
        let json = to_json(&batch);
        assert_eq!(
            json["requests"][0],
            json!({"addSheet": {"properties": {
                "title": "Data",
                "gridProperties": {"rowCount": 100, "columnCount": 5}
            }}})
        );
        assert_eq!(
            json["requests"][1],
            json!({"appendDimension": {"sheetId": 4, "dimension": "ROWS", "length": 10}})
        );
        assert_eq!(
            json["requests"][2],
            json!({"deleteDimension": {"range": {
                "sheetId": 4, "dimension": "ROWS", "startIndex": 0, "endIndex": 2
            }}})
        );
    }

    #[test]
    fn borders_and_merge() {
        let mut batch = BatchUpdate::new();
        batch
            .update_borders(
                GridRange::rows(2, 0, 1),
                Borders {
                    bottom: Some(Border::solid()),
                    ..Default::default()
                },
            )
            .merge_cells(GridRange::rows(2, 0, 1), MergeType::MergeRows);
        let json = to_json(&batch);
        assert_eq!(
            json["requests"][0],
            json!({"updateBorders": {
                "range": {"sheetId": 2, "startRowIndex": 0, "endRowIndex": 1},
                "bottom": {"style": "SOLID"}
            }})
        );
        assert_eq!(json["requests"][1]["mergeCells"]["mergeType"], "MERGE_ROWS");
    }
}

mod alter_dimensions {
    use super::*;

    #[test]
    fn rows_only() {
        let mut batch = BatchUpdate::new();
        batch.alter_dimensions(5, Some(1), None);
        assert_eq!(batch.len(), 1);
        assert_eq!(
            to_json(&batch)["requests"][0],
            json!({"updateSheetProperties": {
                "properties": {"sheetId": 5, "gridProperties": {"rowCount": 1}},
                "fields": "gridProperties.rowCount"
            }})
        );
    }

    #[test]
    fn both_dimensions() {
        let mut batch = BatchUpdate::new();
        batch.alter_dimensions(5, Some(20), Some(3));
        assert_eq!(
            to_json(&batch)["requests"][0]["updateSheetProperties"]["fields"],
            "gridProperties.rowCount,gridProperties.columnCount"
        );
    }

    #[test]
    fn nothing_requested() {
        let mut batch = BatchUpdate::new();
        batch.alter_dimensions(5, None, None);
        assert!(batch.is_empty());
    }

    #[test]
    fn freeze_rows() {
        let mut batch = BatchUpdate::new();
        batch.freeze_rows(5, 2);
        assert_eq!(
            to_json(&batch)["requests"][0],
            json!({"updateSheetProperties": {
                "properties": {"sheetId": 5, "gridProperties": {"frozenRowCount": 2}},
                "fields": "gridProperties.frozenRowCount"
            }})
        );
    }
}

mod autoformat {
    use super::*;

    fn populated() -> Vec<Vec<CellValue>> {
        vec![
            vec![CellValue::from("name"), CellValue::from("score")],
            vec![CellValue::from("sub"), CellValue::from("")],
            vec![CellValue::from("ann"), CellValue::from(3)],
            vec![CellValue::Null, CellValue::Null],
        ]
    }

    #[test]
    fn request_order() {
        let mut batch = BatchUpdate::new();
        let bounds = GridBounds {
            rows: 1000,
            columns: 26,
        };
        batch.autoformat(7, bounds, 2, &populated());

        let requests = batch.requests();
        assert_eq!(requests.len(), 5);
        assert!(matches!(&requests[0], Request::RepeatCell(r) if r.range == GridRange::rows(7, 0, 2)));
        assert!(matches!(&requests[1], Request::UpdateSheetProperties(r) if r.fields == "gridProperties.frozenRowCount"));
        assert!(matches!(&requests[2], Request::RepeatCell(r) if r.range == GridRange::rows(7, 2, 1000)));
        assert!(matches!(&requests[3], Request::AutoResizeDimensions(r)
            if r.dimensions.start_index == Some(0) && r.dimensions.end_index == Some(26)));

        let json = to_json(&batch);
        assert_eq!(
            json["requests"][4]["updateSheetProperties"]["properties"]["gridProperties"],
            json!({"rowCount": 3, "columnCount": 2})
        );
    }

    #[test]
    fn header_uses_header_style() {
        let mut batch = BatchUpdate::new();
        batch.autoformat(0, GridBounds { rows: 3, columns: 2 }, 1, &populated());
        let json = to_json(&batch);
        let header = &json["requests"][0]["repeatCell"]["cell"]["userEnteredFormat"];
        assert_eq!(header["textFormat"]["fontFamily"], "Proxima Nova");
        assert_eq!(header["textFormat"]["bold"], false);
        assert_eq!(header["horizontalAlignment"], "LEFT");
        assert_eq!(header["verticalAlignment"], "MIDDLE");
    }

    #[test]
    fn no_headers() {
        let mut batch = BatchUpdate::new();
        batch.autoformat(0, GridBounds { rows: 10, columns: 2 }, 0, &populated());
        assert_eq!(batch.len(), 3);
        assert!(matches!(&batch.requests()[0], Request::RepeatCell(r) if r.range == GridRange::rows(0, 0, 10)));
    }

    #[test]
    fn empty_tab_skips_trim() {
        let mut batch = BatchUpdate::new();
        let empty = vec![vec![CellValue::Null, CellValue::from("")]];
        batch.autoformat(0, GridBounds { rows: 10, columns: 4 }, 1, &empty);
        assert!(!batch
            .requests()
            .iter()
            .any(|r| matches!(r, Request::UpdateSheetProperties(p) if p.fields.contains("rowCount"))));
        assert_eq!(batch.len(), 4);
    }
}
