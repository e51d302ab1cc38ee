use crate::domain::model::Table;
use serde::Serialize;
use std::collections::BTreeMap;

pub const DEFAULT_PREVIEW_ROWS: usize = 5;

/// Headers, row count and the first rows of a table, for choosing columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TablePreview {
    pub columns: Vec<String>,
    pub total_rows: usize,
    pub rows: Vec<BTreeMap<String, String>>,
}

pub fn preview(table: &Table, limit: usize) -> TablePreview {
    let columns: Vec<String> = table.headers().iter().map(|h| h.to_string()).collect();
    let rows = (0..table.row_count().min(limit))
        .map(|row| {
            columns
                .iter()
                .enumerate()
                .map(|(index, header)| (header.clone(), table.cell(row, index).to_string()))
                .collect()
        })
        .collect();

    TablePreview {
        columns,
        total_rows: table.row_count(),
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::CellValue;

    #[test]
    fn test_preview_limits_rows_and_blanks_missing() {
        let rows = (0..8)
            .map(|i| vec![CellValue::from(format!("P{}", i)), CellValue::Empty])
            .collect();
        let table = Table::from_rows(vec!["Nome".to_string(), "Email".to_string()], rows);

        let preview = preview(&table, DEFAULT_PREVIEW_ROWS);
        assert_eq!(preview.columns, vec!["Nome", "Email"]);
        assert_eq!(preview.total_rows, 8);
        assert_eq!(preview.rows.len(), 5);
        assert_eq!(preview.rows[4]["Nome"], "P4");
        assert_eq!(preview.rows[0]["Email"], "");

        let json = serde_json::to_value(&preview).unwrap();
        assert_eq!(json["total_rows"], 8);
    }

    #[test]
    fn test_preview_keeps_every_repeated_column() {
        let table = Table::from_rows(
            vec!["Nome".to_string(), "Nome".to_string()],
            vec![vec!["Ana".into(), "Bruno".into()]],
        );
        let preview = preview(&table, DEFAULT_PREVIEW_ROWS);
        assert_eq!(preview.columns, vec!["Nome", "Nome.1"]);
        assert_eq!(preview.rows[0].len(), 2);
        assert_eq!(preview.rows[0]["Nome"], "Ana");
        assert_eq!(preview.rows[0]["Nome.1"], "Bruno");
    }
}
