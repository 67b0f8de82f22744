//! Столбцовая модель поверх xlsx-книги.
//!
//! Столбцы находятся по тексту заголовка, а не по фиксированным координатам:
//! заголовок ищется в первых `max_search_rows` строках листа, данные идут
//! со строки, следующей за заголовком. Все координаты 1-based.

pub mod locator;
pub mod reader;
pub mod workbook;
pub mod writer;

pub use locator::{locate_header, locate_or_create_header};
pub use reader::{read_column, read_column_from_file, ColumnRead};
pub use writer::{write_columns, write_columns_to_file, ColumnValue, WriteOptions, WriteSummary};

use thiserror::Error;

/// Глубина поиска заголовка по умолчанию
pub const DEFAULT_MAX_SEARCH_ROWS: u32 = 10;

/// Позиция найденного заголовка
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderLocation {
    pub row: u32,
    pub column: u32,
}

#[derive(Debug, Error)]
pub enum ExcelError {
    #[error("无法打开文件 '{path}': {message}")]
    Open { path: String, message: String },

    #[error("工作表 '{sheet}' 不存在 (可用: {available})")]
    SheetNotFound { sheet: String, available: String },

    #[error("表头 '{header}' 未在前 {searched_rows} 行中找到")]
    HeaderNotFound { header: String, searched_rows: u32 },

    #[error("表头名称不能为空")]
    EmptyHeader,

    #[error("保存文件 '{path}' 失败: {message}")]
    Save { path: String, message: String },
}

impl ExcelError {
    /// Ошибка сохранения (в отличие от ошибок конфигурации: лист/заголовок)
    pub fn is_persistence(&self) -> bool {
        matches!(self, ExcelError::Save { .. })
    }
}
