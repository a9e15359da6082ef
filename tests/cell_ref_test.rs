//! Tests for cell label and range conversion.

use datasheets::cell_ref::{
    index_to_label, label_to_index, letters_to_column, parse_range, IndexBase, RangeBounds,
};
use datasheets::SheetsError;

mod label_to_index {
    use super::*;

    #[test]
    fn zero_based() {
        assert_eq!(label_to_index("A1", IndexBase::Zero).unwrap(), (0, 0));
        assert_eq!(label_to_index("Z1", IndexBase::Zero).unwrap(), (0, 25));
        assert_eq!(label_to_index("AA1", IndexBase::Zero).unwrap(), (0, 26));
        assert_eq!(label_to_index("AB1", IndexBase::Zero).unwrap(), (0, 27));
    }

    #[test]
    fn one_based() {
        assert_eq!(label_to_index("B2", IndexBase::One).unwrap(), (2, 2));
        assert_eq!(label_to_index("BH10", IndexBase::One).unwrap(), (10, 60));
        assert_eq!(label_to_index("AA100", IndexBase::One).unwrap(), (100, 27));
        assert_eq!(label_to_index("XFD1", IndexBase::One).unwrap(), (1, 16384));
    }

    #[test]
    fn lowercase_letters() {
        assert_eq!(
            label_to_index("bh10", IndexBase::One).unwrap(),
            label_to_index("BH10", IndexBase::One).unwrap()
        );
    }

    #[test]
    fn invalid_labels() {
        for label in ["", "1A", "A0", "A", "10", "A1B", "A-1", " A1", "Ä1", "A1:B2"] {
            assert!(
                matches!(
                    label_to_index(label, IndexBase::Zero),
                    Err(SheetsError::InvalidLabelError(_))
                ),
                "{:?} should be rejected",
                label
            );
        }
    }

    #[test]
    fn row_overflow() {
        assert!(label_to_index("A99999999999999999999", IndexBase::One).is_err());
    }
}

mod index_to_label {
    use super::*;

    #[test]
    fn known_values() {
        assert_eq!(index_to_label(0, 0, IndexBase::Zero).unwrap(), "A1");
        assert_eq!(index_to_label(0, 25, IndexBase::Zero).unwrap(), "Z1");
        assert_eq!(index_to_label(9, 26, IndexBase::Zero).unwrap(), "AA10");
        assert_eq!(index_to_label(10, 60, IndexBase::One).unwrap(), "BH10");
        assert_eq!(index_to_label(1, 702, IndexBase::One).unwrap(), "ZZ1");
        assert_eq!(index_to_label(1, 703, IndexBase::One).unwrap(), "AAA1");
    }

    #[test]
    fn out_of_range() {
        assert!(matches!(
            index_to_label(-1, 0, IndexBase::Zero),
            Err(SheetsError::InvalidIndexError { row: -1, column: 0 })
        ));
        assert!(matches!(
            index_to_label(0, 1, IndexBase::One),
            Err(SheetsError::InvalidIndexError { .. })
        ));
        assert!(index_to_label(1, 0, IndexBase::One).is_err());
        assert!(index_to_label(i64::MAX, 0, IndexBase::Zero).is_err());
    }

    #[test]
    fn round_trip() {
        for base in [IndexBase::Zero, IndexBase::One] {
            let first = match base {
                IndexBase::Zero => 0,
                IndexBase::One => 1,
            };
            for row in [first, first + 1, first + 99, first + 1_000_000] {
                for column in [first, first + 25, first + 26, first + 701, first + 702] {
                    let label = index_to_label(row, column, base).unwrap();
                    assert_eq!(label_to_index(&label, base).unwrap(), (row, column));
                }
            }
        }
    }
}

mod ranges {
    use super::*;

    #[test]
    fn letters() {
        assert_eq!(letters_to_column("A"), Some(1));
        assert_eq!(letters_to_column("zz"), Some(702));
        assert_eq!(letters_to_column(""), None);
        assert_eq!(letters_to_column("A1"), None);
    }

    #[test]
    fn cell_range() {
        let bounds = parse_range("B2:D10").unwrap();
        assert_eq!(
            bounds,
            RangeBounds {
                start_row: Some(2),
                start_column: Some(2),
                end_row: Some(10),
                end_column: Some(4),
            }
        );

        let grid = bounds.to_grid_range(7);
        assert_eq!(grid.sheet_id, 7);
        assert_eq!(grid.start_row_index, Some(1));
        assert_eq!(grid.end_row_index, Some(10));
        assert_eq!(grid.start_column_index, Some(1));
        assert_eq!(grid.end_column_index, Some(4));
    }

    #[test]
    fn single_cell() {
        let grid = parse_range("C3").unwrap().to_grid_range(0);
        assert_eq!(grid.start_row_index, Some(2));
        assert_eq!(grid.end_row_index, Some(3));
        assert_eq!(grid.start_column_index, Some(2));
        assert_eq!(grid.end_column_index, Some(3));
    }

    #[test]
    fn whole_columns_and_rows() {
        let columns = parse_range("A:C").unwrap().to_grid_range(0);
        assert_eq!(columns.start_row_index, None);
        assert_eq!(columns.end_row_index, None);
        assert_eq!(columns.start_column_index, Some(0));
        assert_eq!(columns.end_column_index, Some(3));

        let rows = parse_range("2:5").unwrap().to_grid_range(0);
        assert_eq!(rows.start_column_index, None);
        assert_eq!(rows.start_row_index, Some(1));
        assert_eq!(rows.end_row_index, Some(5));
    }

    #[test]
    fn open_ended_rows() {
        let bounds = parse_range("A2:C").unwrap();
        assert_eq!(bounds.start_row, Some(2));
        assert_eq!(bounds.end_row, None);
        assert_eq!(bounds.end_column, Some(3));
    }

    #[test]
    fn invalid_ranges() {
        for label in ["", ":", "A1:", "C1:A1", "A5:A2", "A:2", "1:B", "A1:B2:C3"] {
            assert!(parse_range(label).is_err(), "{:?} should be rejected", label);
        }
    }
}
