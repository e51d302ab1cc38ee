use crate::domain::model::{CellValue, Table};
use crate::domain::ports::TableSource;
use crate::utils::error::{CertificateError, Result};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use std::io::Cursor;
use std::path::Path;

pub const SUPPORTED_EXTENSIONS: [&str; 9] = [
    "xlsx", "xlsm", "xlsb", "xlam", "xls", "xla", "ods", "csv", "tsv",
];

/// Reads the first row of a sheet as headers and the rest as data rows.
#[derive(Debug, Clone, Default)]
pub struct SpreadsheetSource {
    sheet: Option<String>,
    delimiter: Option<u8>,
}

impl SpreadsheetSource {
    pub fn new(sheet: Option<String>, delimiter: Option<u8>) -> Self {
        Self { sheet, delimiter }
    }

    fn read_workbook(&self, bytes: &[u8], file_name: &str) -> Result<Table> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
            .map_err(|e| CertificateError::unreadable(file_name, e))?;

        let range = match &self.sheet {
            Some(sheet) => workbook
                .worksheet_range(sheet)
                .map_err(|e| CertificateError::unreadable(file_name, e))?,
            None => workbook
                .worksheet_range_at(0)
                .ok_or_else(|| CertificateError::unreadable(file_name, "workbook has no sheets"))?
                .map_err(|e| CertificateError::unreadable(file_name, e))?,
        };

        let mut rows = range.rows();
        let Some(header_row) = rows.next() else {
            tracing::warn!("⚠️ Sheet in '{}' is empty", file_name);
            return Ok(Table::default());
        };

        let headers = header_row
            .iter()
            .enumerate()
            .map(|(index, cell)| header_name(index, &cell_value(cell)))
            .collect();
        let data = rows
            .map(|row| row.iter().map(cell_value).collect())
            .collect();

        Ok(Table::from_rows(headers, data))
    }

    fn read_delimited(&self, bytes: &[u8], file_name: &str, delimiter: u8) -> Result<Table> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .from_reader(bytes);

        let headers = reader
            .headers()
            .map_err(|e| CertificateError::unreadable(file_name, e))?
            .iter()
            .enumerate()
            .map(|(index, header)| header_name(index, &CellValue::from(header)))
            .collect();

        let mut data = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| CertificateError::unreadable(file_name, e))?;
            data.push(record.iter().map(CellValue::from).collect());
        }

        Ok(Table::from_rows(headers, data))
    }
}

impl TableSource for SpreadsheetSource {
    fn read(&self, bytes: &[u8], file_name: &str) -> Result<Table> {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        let table = match extension.as_deref() {
            Some("csv") => self.read_delimited(bytes, file_name, self.delimiter.unwrap_or(b','))?,
            Some("tsv") => self.read_delimited(bytes, file_name, self.delimiter.unwrap_or(b'\t'))?,
            Some("xlsx" | "xlsm" | "xlsb" | "xlam" | "xls" | "xla" | "ods") => {
                self.read_workbook(bytes, file_name)?
            }
            _ => {
                return Err(CertificateError::unreadable(
                    file_name,
                    format!(
                        "unsupported file type, expected one of: {}",
                        SUPPORTED_EXTENSIONS.join(", ")
                    ),
                ))
            }
        };

        tracing::debug!(
            "Read '{}': {} columns, {} rows",
            file_name,
            table.column_count(),
            table.row_count()
        );
        Ok(table)
    }
}

// blank headers get the same placeholder names pandas would give them
fn header_name(index: usize, cell: &CellValue) -> String {
    cell.as_text()
        .map(|text| text.trim().to_string())
        .unwrap_or_else(|| format!("Unnamed: {}", index))
}

fn cell_value(data: &Data) -> CellValue {
    match data {
        Data::Empty | Data::Error(_) => CellValue::Empty,
        Data::String(text) => CellValue::from(text.as_str()),
        Data::Float(value) => CellValue::Number(*value),
        Data::Int(value) => CellValue::Number(*value as f64),
        Data::Bool(value) => CellValue::Bool(*value),
        Data::DateTime(value) => match value.as_datetime() {
            Some(datetime) => CellValue::Text(datetime.format("%d/%m/%Y").to_string()),
            None => CellValue::Number(value.as_f64()),
        },
        Data::DateTimeIso(text) | Data::DurationIso(text) => CellValue::from(text.as_str()),
    }
}
