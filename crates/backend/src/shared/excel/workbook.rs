use super::ExcelError;
use std::path::Path;
use umya_spreadsheet::{Spreadsheet, Worksheet};

/// Прочитать книгу целиком (не lazy: книга потом сохраняется)
pub fn open(path: &Path) -> Result<Spreadsheet, ExcelError> {
    umya_spreadsheet::reader::xlsx::read(path).map_err(|e| ExcelError::Open {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Перезаписать файл книги целиком
pub fn save(book: &Spreadsheet, path: &Path) -> Result<(), ExcelError> {
    umya_spreadsheet::writer::xlsx::write(book, path).map_err(|e| ExcelError::Save {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

pub fn sheet<'a>(book: &'a Spreadsheet, name: &str) -> Result<&'a Worksheet, ExcelError> {
    book.get_sheet_by_name(name)
        .ok_or_else(|| sheet_not_found(book, name))
}

pub fn sheet_mut<'a>(book: &'a mut Spreadsheet, name: &str) -> Result<&'a mut Worksheet, ExcelError> {
    if book.get_sheet_by_name(name).is_none() {
        return Err(sheet_not_found(book, name));
    }
    book.get_sheet_by_name_mut(name)
        .ok_or_else(|| ExcelError::SheetNotFound {
            sheet: name.to_string(),
            available: String::new(),
        })
}

pub fn sheet_names(book: &Spreadsheet) -> Vec<String> {
    book.get_sheet_collection()
        .iter()
        .map(|s| s.get_name().to_string())
        .collect()
}

fn sheet_not_found(book: &Spreadsheet, name: &str) -> ExcelError {
    ExcelError::SheetNotFound {
        sheet: name.to_string(),
        available: sheet_names(book).join(", "),
    }
}
