use super::record::ResultMap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Текущее состояние сессии пакетного запроса
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveProgress {
    pub session_id: String,
    /// Файл, по которому идёт обработка
    pub file: String,
    pub status: ResolveStatus,
    pub is_processing: bool,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,

    pub progress_percent: f64,
    pub processed: usize,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,

    /// Текущая деталь
    pub current_item: String,
    pub message: String,

    /// Заполняется при ошибке или частичной неудаче
    pub error_kind: Option<ErrorKind>,

    pub results: ResultMap,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ResolveStatus {
    Running,
    Completed,
    /// Запись выполнена, но часть деталей не найдена
    CompletedWithErrors,
    Failed,
}

/// Вид ошибки, по которому клиент может ветвиться
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Неверный лист/заголовок/параметры, нет данных
    Config,
    /// Сеть или ответ API
    Transport,
    /// Не удалось получить токен доступа
    TokenRefresh,
    /// Ошибка сохранения таблицы или снимка
    Persistence,
    /// Часть деталей завершилась записью-заглушкой
    PartialFailure,
}

impl ResolveProgress {
    pub fn new(session_id: String, file: String) -> Self {
        let now = Utc::now();
        Self {
            session_id,
            file,
            status: ResolveStatus::Running,
            is_processing: true,
            started_at: now,
            completed_at: None,
            updated_at: now,
            progress_percent: 0.0,
            processed: 0,
            total: 0,
            succeeded: 0,
            failed: 0,
            current_item: String::new(),
            message: "正在读取产品数据...".to_string(),
            error_kind: None,
            results: ResultMap::new(),
        }
    }

    pub fn is_finished(&self) -> bool {
        !matches!(self.status, ResolveStatus::Running)
    }
}

impl ResolveStatus {
    pub fn display_name(&self) -> &'static str {
        match self {
            ResolveStatus::Running => "处理中",
            ResolveStatus::Completed => "已完成",
            ResolveStatus::CompletedWithErrors => "已完成(部分失败)",
            ResolveStatus::Failed => "失败",
        }
    }
}
