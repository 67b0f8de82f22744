use serde::{Deserialize, Serialize};
use std::fmt;

/// Номер детали каталога (непустая строка без пробелов по краям)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartIdentifier(String);

impl PartIdentifier {
    /// Нормализует сырое значение ячейки или пользовательский ввод.
    ///
    /// Для ссылок (`http...`) берётся последний сегмент пути до `?`.
    /// Пустой результат -> `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        let candidate = if trimmed.starts_with("http") {
            let tail = trimmed.rsplit('/').next().unwrap_or_default();
            tail.split('?').next().unwrap_or_default().trim()
        } else {
            trimmed
        };

        if candidate.is_empty() {
            None
        } else {
            Some(Self(candidate.to_string()))
        }
    }

    /// Значение ячейки как есть, когда номер извлечь не удалось
    pub fn verbatim(raw: &str) -> Self {
        Self(raw.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for PartIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PartIdentifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
