use crate::shared::excel::ExcelError;
use contracts::usecases::u501_resolve_part_status::ErrorKind;
use thiserror::Error;

/// Ошибки, прерывающие весь прогон.
///
/// Неудача по отдельной детали сюда не попадает: она записывается
/// в ResultMap как запись-заглушка.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Лист, заголовок, параметры запуска, нет данных
    #[error("{0}")]
    Config(String),

    #[error("{0}")]
    Transport(String),

    /// Без повторов
    #[error("获取访问令牌失败: {0}")]
    TokenRefresh(String),

    /// Сохранение таблицы или снимка
    #[error("{0}")]
    Persistence(String),
}

impl ResolveError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ResolveError::Config(_) => ErrorKind::Config,
            ResolveError::Transport(_) => ErrorKind::Transport,
            ResolveError::TokenRefresh(_) => ErrorKind::TokenRefresh,
            ResolveError::Persistence(_) => ErrorKind::Persistence,
        }
    }
}

impl From<ExcelError> for ResolveError {
    fn from(err: ExcelError) -> Self {
        if err.is_persistence() {
            ResolveError::Persistence(err.to_string())
        } else {
            ResolveError::Config(err.to_string())
        }
    }
}
