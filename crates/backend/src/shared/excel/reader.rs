use super::{locate_header, workbook, ExcelError, HeaderLocation};
use std::path::Path;
use umya_spreadsheet::Worksheet;

/// Результат чтения столбца
#[derive(Debug, Clone)]
pub struct ColumnRead {
    /// Непустые значения под заголовком, сверху вниз
    pub values: Vec<String>,
    /// Где найден заголовок (нужно для выравнивания последующей записи)
    pub location: HeaderLocation,
}

/// Прочитать значения столбца под заголовком.
///
/// Отсутствие заголовка - ошибка. Пустые ячейки пропускаются.
/// Заголовок без данных - пустой результат с предупреждением.
pub fn read_column(
    sheet: &Worksheet,
    header: &str,
    max_search_rows: u32,
) -> Result<ColumnRead, ExcelError> {
    if header.is_empty() {
        return Err(ExcelError::EmptyHeader);
    }

    let location =
        locate_header(sheet, header, max_search_rows).ok_or_else(|| ExcelError::HeaderNotFound {
            header: header.to_string(),
            searched_rows: max_search_rows,
        })?;

    let last_row = sheet.get_highest_row();
    let mut values = Vec::new();
    for row in (location.row + 1)..=last_row {
        let raw = sheet.get_value((location.column, row));
        let value = raw.trim();
        if !value.is_empty() {
            values.push(value.to_string());
        }
    }

    if values.is_empty() {
        tracing::warn!(
            "Header '{}' found at row {} col {} but no data rows below it",
            header,
            location.row,
            location.column
        );
    } else {
        tracing::info!("Read {} values under header '{}'", values.len(), header);
    }

    Ok(ColumnRead { values, location })
}

/// Открыть книгу, выбрать лист и прочитать столбец
pub fn read_column_from_file(
    path: &Path,
    sheet_name: &str,
    header: &str,
    max_search_rows: u32,
) -> Result<ColumnRead, ExcelError> {
    let book = workbook::open(path)?;
    let sheet = workbook::sheet(&book, sheet_name)?;
    read_column(sheet, header, max_search_rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_below_header_skipping_blanks() {
        let mut book = umya_spreadsheet::new_file();
        let sheet = book.get_sheet_by_name_mut("Sheet1").unwrap();
        sheet.get_cell_mut((1, 1)).set_value_string("Report");
        sheet.get_cell_mut((2, 2)).set_value_string("PN");
        sheet.get_cell_mut((2, 3)).set_value_string("  ABC123 ");
        sheet.get_cell_mut((2, 4)).set_value_string("   ");
        sheet.get_cell_mut((2, 6)).set_value_number(4711);
        sheet.get_cell_mut((1, 9)).set_value_string("footer");

        let read = read_column(sheet, "PN", 10).unwrap();
        assert_eq!(read.values, vec!["ABC123".to_string(), "4711".to_string()]);
        assert_eq!(read.location, HeaderLocation { row: 2, column: 2 });
    }

    #[test]
    fn test_missing_header_is_an_error() {
        let mut book = umya_spreadsheet::new_file();
        let sheet = book.get_sheet_by_name_mut("Sheet1").unwrap();
        sheet.get_cell_mut((1, 1)).set_value_string("Other");

        let err = read_column(sheet, "PN", 10).unwrap_err();
        assert!(matches!(err, ExcelError::HeaderNotFound { .. }));
    }

    #[test]
    fn test_header_without_data_is_empty_not_error() {
        let mut book = umya_spreadsheet::new_file();
        let sheet = book.get_sheet_by_name_mut("Sheet1").unwrap();
        sheet.get_cell_mut((3, 1)).set_value_string("PN");

        let read = read_column(sheet, "PN", 10).unwrap();
        assert!(read.values.is_empty());
        assert_eq!(read.location, HeaderLocation { row: 1, column: 3 });
    }
}
