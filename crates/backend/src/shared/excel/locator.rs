use super::HeaderLocation;
use umya_spreadsheet::Worksheet;

/// Найти заголовок в первых `max_search_rows` строках листа.
///
/// Строки просматриваются сверху вниз, ячейки в строке слева направо;
/// побеждает первое точное совпадение. Повторы в окне поиска только
/// логируются.
pub fn locate_header(sheet: &Worksheet, header: &str, max_search_rows: u32) -> Option<HeaderLocation> {
    if header.is_empty() {
        return None;
    }

    let (max_column, max_row) = sheet.get_highest_column_and_row();
    let last_row = max_search_rows.min(max_row);

    let mut found: Option<HeaderLocation> = None;
    for row in 1..=last_row {
        for column in 1..=max_column {
            if sheet.get_value((column, row)) != header {
                continue;
            }
            match found {
                None => found = Some(HeaderLocation { row, column }),
                Some(first) => {
                    tracing::warn!(
                        "Duplicate header '{}' at row {} col {}, using first match at row {} col {}",
                        header,
                        row,
                        column,
                        first.row,
                        first.column
                    );
                }
            }
        }
    }

    found
}

/// Найти заголовок, а при отсутствии создать его в строке `header_row`
/// в первом столбце правее заполненной области.
pub fn locate_or_create_header(
    sheet: &mut Worksheet,
    header: &str,
    max_search_rows: u32,
    header_row: u32,
) -> HeaderLocation {
    if let Some(location) = locate_header(sheet, header, max_search_rows) {
        return location;
    }

    let column = sheet.get_highest_column() + 1;
    sheet
        .get_cell_mut((column, header_row))
        .set_value_string(header);

    tracing::info!(
        "Created header '{}' at row {} col {}",
        header,
        header_row,
        column
    );

    HeaderLocation {
        row: header_row,
        column,
    }
}
