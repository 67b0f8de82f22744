use crate::enums::{OutputField, OutputFieldSet};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Запрос на запуск пакетного запроса статусов
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveRequest {
    /// Имя загруженного файла (в каталоге uploads) или путь к файлу в CLI
    #[serde(default)]
    pub filename: String,

    /// Имя листа
    #[serde(default)]
    pub sheet_name: String,

    /// Заголовок столбца с номерами деталей
    #[serde(default)]
    pub column_name: String,

    /// Базовый заголовок столбцов результата; по умолчанию "{column_name}_状态"
    #[serde(default)]
    pub result_column_name: Option<String>,

    /// Какие поля выгружать; статус выгружается всегда
    #[serde(default = "OutputFieldSet::all")]
    pub selected_fields: OutputFieldSet,

    /// Пользовательские подписи столбцов
    #[serde(default)]
    pub custom_headers: HashMap<OutputField, String>,

    /// Фильтр по производителю DigiKey (manufacturerId)
    #[serde(default)]
    pub manufacturer_id: Option<String>,
}

impl ResolveRequest {
    pub fn new(
        filename: impl Into<String>,
        sheet_name: impl Into<String>,
        column_name: impl Into<String>,
    ) -> Self {
        Self {
            filename: filename.into(),
            sheet_name: sheet_name.into(),
            column_name: column_name.into(),
            result_column_name: None,
            selected_fields: OutputFieldSet::all(),
            custom_headers: HashMap::new(),
            manufacturer_id: None,
        }
    }

    /// Список незаполненных обязательных параметров
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.filename.trim().is_empty() {
            missing.push("filename");
        }
        if self.sheet_name.trim().is_empty() {
            missing.push("sheet_name");
        }
        if self.column_name.trim().is_empty() {
            missing.push("column_name");
        }
        missing
    }

    /// Базовый заголовок результата
    pub fn base_output_header(&self) -> String {
        match self.result_column_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("{}_{}", self.column_name, OutputField::Status.default_label()),
        }
    }

    /// Заголовок столбца поля.
    ///
    /// Статус пишется под базовым заголовком, остальные поля под
    /// "{base}_{подпись}", если не задана пользовательская подпись.
    pub fn output_header(&self, field: OutputField) -> String {
        let custom = self
            .custom_headers
            .get(&field)
            .map(|h| h.trim())
            .filter(|h| !h.is_empty());
        match (custom, field) {
            (Some(h), _) => h.to_string(),
            (None, OutputField::Status) => self.base_output_header(),
            (None, _) => format!("{}_{}", self.base_output_header(), field.default_label()),
        }
    }

    /// Заголовки выходных столбцов в каноническом порядке полей
    pub fn output_headers(&self) -> Vec<(OutputField, String)> {
        self.selected_fields
            .with(OutputField::Status)
            .fields()
            .into_iter()
            .map(|field| (field, self.output_header(field)))
            .collect()
    }
}
