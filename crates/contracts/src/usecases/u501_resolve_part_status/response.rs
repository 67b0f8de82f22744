use serde::{Deserialize, Serialize};

/// Ответ на запрос запуска
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveResponse {
    pub session_id: Option<String>,
    pub status: ResolveStartStatus,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolveStartStatus {
    Started,
    /// Отклонено: неполные параметры или по этому файлу уже идёт обработка
    Rejected,
}

impl ResolveResponse {
    pub fn started(session_id: String) -> Self {
        Self {
            session_id: Some(session_id),
            status: ResolveStartStatus::Started,
            message: "处理任务已启动".to_string(),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            session_id: None,
            status: ResolveStartStatus::Rejected,
            message: message.into(),
        }
    }
}

/// Ответ на загрузку файла
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    /// "success" | "error"
    pub status: String,
    pub message: String,
    pub filename: Option<String>,
}

impl UploadResponse {
    pub fn success(filename: String) -> Self {
        Self {
            status: "success".to_string(),
            message: "文件上传成功".to_string(),
            filename: Some(filename),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            filename: None,
        }
    }
}
