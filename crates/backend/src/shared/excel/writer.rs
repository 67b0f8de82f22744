use super::{
    locate_header, locate_or_create_header, workbook, ExcelError, HeaderLocation,
    DEFAULT_MAX_SEARCH_ROWS,
};
use std::path::Path;
use umya_spreadsheet::Worksheet;

/// Значение для записи в ячейку
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValue {
    Text(String),
    Number(f64),
}

impl From<&str> for ColumnValue {
    fn from(value: &str) -> Self {
        ColumnValue::Text(value.to_string())
    }
}

impl From<String> for ColumnValue {
    fn from(value: String) -> Self {
        ColumnValue::Text(value)
    }
}

impl From<u64> for ColumnValue {
    fn from(value: u64) -> Self {
        ColumnValue::Number(value as f64)
    }
}

/// Параметры записи пакета столбцов
#[derive(Debug, Clone)]
pub struct WriteOptions {
    pub max_search_rows: u32,
    /// Заголовок, по строке которого выравниваются новые столбцы
    pub reference_header: Option<String>,
    /// Явная строка заголовков (приоритетнее reference_header)
    pub header_row: Option<u32>,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            max_search_rows: DEFAULT_MAX_SEARCH_ROWS,
            reference_header: None,
            header_row: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WriteSummary {
    pub header_row: u32,
    pub columns: Vec<(String, HeaderLocation)>,
    pub rows_written: usize,
}

/// Общая строка заголовков для пакета: явная строка, затем строка
/// опорного заголовка, иначе первая строка.
pub fn resolve_header_row(sheet: &Worksheet, options: &WriteOptions) -> u32 {
    if let Some(row) = options.header_row {
        return row.max(1);
    }

    if let Some(reference) = options.reference_header.as_deref() {
        match locate_header(sheet, reference, options.max_search_rows) {
            Some(location) => return location.row,
            None => tracing::warn!(
                "Reference header '{}' not found in first {} rows, using row 1",
                reference,
                options.max_search_rows
            ),
        }
    }

    1
}

/// Записать несколько столбцов.
///
/// Для каждого заголовка столбец находится или создаётся, значения пишутся
/// подряд начиная со строки под общей строкой заголовков. Существующие
/// значения в этих ячейках перезаписываются, ячейки ниже не очищаются.
pub fn write_columns(
    sheet: &mut Worksheet,
    columns: &[(String, Vec<ColumnValue>)],
    options: &WriteOptions,
) -> Result<WriteSummary, ExcelError> {
    if columns.iter().any(|(header, _)| header.is_empty()) {
        return Err(ExcelError::EmptyHeader);
    }

    let header_row = resolve_header_row(sheet, options);
    let mut summary = WriteSummary {
        header_row,
        columns: Vec::with_capacity(columns.len()),
        rows_written: 0,
    };

    for (header, values) in columns {
        let location =
            locate_or_create_header(sheet, header, options.max_search_rows, header_row);
        if location.row != header_row {
            tracing::warn!(
                "Header '{}' found at row {}, data is aligned to header row {}",
                header,
                location.row,
                header_row
            );
        }

        for (offset, value) in values.iter().enumerate() {
            let row = header_row + 1 + offset as u32;
            let cell = sheet.get_cell_mut((location.column, row));
            match value {
                ColumnValue::Text(text) => {
                    cell.set_value_string(text.as_str());
                }
                ColumnValue::Number(number) => {
                    cell.set_value_number(*number);
                }
            }
        }

        summary.rows_written = summary.rows_written.max(values.len());
        summary.columns.push((header.clone(), location));
    }

    Ok(summary)
}

/// Открыть книгу, записать столбцы и сохранить в тот же файл
pub fn write_columns_to_file(
    path: &Path,
    sheet_name: &str,
    columns: &[(String, Vec<ColumnValue>)],
    options: &WriteOptions,
) -> Result<WriteSummary, ExcelError> {
    let mut book = workbook::open(path)?;
    let summary = {
        let sheet = workbook::sheet_mut(&mut book, sheet_name)?;
        write_columns(sheet, columns, options)?
    };
    workbook::save(&book, path)?;

    tracing::info!(
        "Wrote {} column(s), {} row(s) to '{}' sheet '{}'",
        summary.columns.len(),
        summary.rows_written,
        path.display(),
        sheet_name
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::excel::read_column_from_file;

    fn text(values: &[&str]) -> Vec<ColumnValue> {
        values.iter().map(|v| ColumnValue::from(*v)).collect()
    }

    fn sample_book(path: &Path) {
        let mut book = umya_spreadsheet::new_file();
        let sheet = book.get_sheet_by_name_mut("Sheet1").unwrap();
        sheet.get_cell_mut((1, 1)).set_value_string("Quarterly BOM");
        sheet.get_cell_mut((2, 2)).set_value_string("unrelated");
        sheet.get_cell_mut((1, 3)).set_value_string("Ref");
        sheet.get_cell_mut((2, 3)).set_value_string("PN");
        sheet.get_cell_mut((1, 4)).set_value_string("R1");
        sheet.get_cell_mut((2, 4)).set_value_string("ABC123");
        sheet.get_cell_mut((1, 5)).set_value_string("R2");
        sheet.get_cell_mut((2, 5)).set_value_string("XYZ-9");
        umya_spreadsheet::writer::xlsx::write(&book, path).unwrap();
    }

    fn snapshot(path: &Path) -> Vec<(u32, u32, String)> {
        let book = umya_spreadsheet::reader::xlsx::read(path).unwrap();
        let sheet = book.get_sheet_by_name("Sheet1").unwrap();
        let (max_col, max_row) = sheet.get_highest_column_and_row();
        let mut cells = Vec::new();
        for row in 1..=max_row {
            for col in 1..=max_col {
                cells.push((col, row, sheet.get_value((col, row))));
            }
        }
        cells
    }

    #[test]
    fn test_roundtrip_under_title_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bom.xlsx");
        sample_book(&path);

        let options = WriteOptions {
            reference_header: Some("PN".to_string()),
            ..Default::default()
        };
        let values = text(&["Active", "Obsolete", "NRND"]);
        let summary = write_columns_to_file(
            &path,
            "Sheet1",
            &[("PN_状态".to_string(), values.clone())],
            &options,
        )
        .unwrap();

        assert_eq!(summary.header_row, 3);
        assert_eq!(summary.columns[0].1, HeaderLocation { row: 3, column: 3 });

        let read = read_column_from_file(&path, "Sheet1", "PN_状态", 10).unwrap();
        assert_eq!(read.values, vec!["Active", "Obsolete", "NRND"]);
    }

    #[test]
    fn test_second_write_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bom.xlsx");
        sample_book(&path);

        let columns = vec![
            ("Status".to_string(), text(&["Active", "Obsolete"])),
            (
                "Qty".to_string(),
                vec![ColumnValue::from(10u64), ColumnValue::from(0u64)],
            ),
        ];
        let options = WriteOptions {
            reference_header: Some("PN".to_string()),
            ..Default::default()
        };

        write_columns_to_file(&path, "Sheet1", &columns, &options).unwrap();
        let first = snapshot(&path);
        write_columns_to_file(&path, "Sheet1", &columns, &options).unwrap();
        let second = snapshot(&path);

        assert_eq!(first, second);
    }

    #[test]
    fn test_explicit_row_beats_reference_and_default_is_row_one() {
        let mut book = umya_spreadsheet::new_file();
        let sheet = book.get_sheet_by_name_mut("Sheet1").unwrap();
        sheet.get_cell_mut((1, 2)).set_value_string("PN");

        let explicit = WriteOptions {
            header_row: Some(5),
            reference_header: Some("PN".to_string()),
            ..Default::default()
        };
        assert_eq!(resolve_header_row(sheet, &explicit), 5);

        let by_reference = WriteOptions {
            reference_header: Some("PN".to_string()),
            ..Default::default()
        };
        assert_eq!(resolve_header_row(sheet, &by_reference), 2);

        let missing_reference = WriteOptions {
            reference_header: Some("Nope".to_string()),
            ..Default::default()
        };
        assert_eq!(resolve_header_row(sheet, &missing_reference), 1);
        assert_eq!(resolve_header_row(sheet, &WriteOptions::default()), 1);
    }

    #[test]
    fn test_overwrites_without_clearing_below() {
        let mut book = umya_spreadsheet::new_file();
        let sheet = book.get_sheet_by_name_mut("Sheet1").unwrap();
        sheet.get_cell_mut((1, 1)).set_value_string("Status");
        for (i, v) in ["old1", "old2", "old3"].iter().enumerate() {
            sheet.get_cell_mut((1, 2 + i as u32)).set_value_string(*v);
        }

        let columns = vec![("Status".to_string(), text(&["new1"]))];
        write_columns(sheet, &columns, &WriteOptions::default()).unwrap();

        assert_eq!(sheet.get_value((1, 2)), "new1");
        assert_eq!(sheet.get_value((1, 3)), "old2");
        assert_eq!(sheet.get_value((1, 4)), "old3");
    }

    #[test]
    fn test_unknown_sheet_and_empty_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bom.xlsx");
        sample_book(&path);

        let err = write_columns_to_file(
            &path,
            "Missing",
            &[("S".to_string(), text(&["x"]))],
            &WriteOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ExcelError::SheetNotFound { .. }));

        let err = write_columns_to_file(
            &path,
            "Sheet1",
            &[(String::new(), text(&["x"]))],
            &WriteOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ExcelError::EmptyHeader));
    }
}
