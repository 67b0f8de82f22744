use crate::shared::format::format_percent;
use contracts::usecases::u501_resolve_part_status::{
    ErrorKind, PartIdentifier, ProductRecord, ResolveProgress, ResolveStatus, ResultMap,
};
use std::collections::HashMap;
use std::io::Write;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

/// Получатель событий прогона (сессия web или консоль CLI)
pub trait ProgressReporter: Send + Sync {
    fn on_start(&self, total: usize);

    /// Вызывается после обработки каждой детали; `index` начинается с 1
    fn on_item(&self, index: usize, total: usize, identifier: &PartIdentifier, record: &ProductRecord);

    fn on_message(&self, message: &str);
}

#[derive(Default)]
struct TrackerState {
    sessions: HashMap<String, ResolveProgress>,
    /// файл -> session_id активного прогона
    active_files: HashMap<String, String>,
}

/// Трекер прогресса пакетных запросов (in-memory)
#[derive(Clone, Default)]
pub struct ProgressTracker {
    state: Arc<RwLock<TrackerState>>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, TrackerState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, TrackerState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }

    fn update(&self, session_id: &str, f: impl FnOnce(&mut ResolveProgress)) {
        let mut state = self.write();
        if let Some(p) = state.sessions.get_mut(session_id) {
            f(p);
            p.updated_at = chrono::Utc::now();
        }
    }

    /// Создать сессию для файла.
    ///
    /// По одному файлу допускается не больше одного активного прогона.
    pub fn try_create_session(&self, file: &str) -> Result<RunHandle, String> {
        let mut state = self.write();

        if let Some(active) = state.active_files.get(file) {
            return Err(format!("文件 {} 正在处理中 (会话 {})", file, active));
        }

        let session_id = Uuid::new_v4().to_string();
        state.active_files.insert(file.to_string(), session_id.clone());
        state.sessions.insert(
            session_id.clone(),
            ResolveProgress::new(session_id.clone(), file.to_string()),
        );

        Ok(RunHandle {
            session_id,
            tracker: self.clone(),
        })
    }

    pub fn get_progress(&self, session_id: &str) -> Option<ResolveProgress> {
        self.read().sessions.get(session_id).cloned()
    }

    pub fn is_file_active(&self, file: &str) -> bool {
        self.read().active_files.contains_key(file)
    }

    pub fn set_total(&self, session_id: &str, total: usize) {
        self.update(session_id, |p| {
            p.total = total;
            p.message = format!("共 {} 个产品, 开始查询...", total);
        });
    }

    pub fn record_item(
        &self,
        session_id: &str,
        index: usize,
        total: usize,
        identifier: &PartIdentifier,
        record: &ProductRecord,
    ) {
        self.update(session_id, |p| {
            p.processed = index;
            p.total = total;
            p.progress_percent = percent(index, total);
            p.current_item = identifier.to_string();
            p.message = format!("正在处理: {}", identifier);
            if record.is_failure() {
                p.failed += 1;
            } else {
                p.succeeded += 1;
            }
            p.results.insert(identifier.clone(), record.clone());
        });
    }

    pub fn set_message(&self, session_id: &str, message: &str) {
        self.update(session_id, |p| p.message = message.to_string());
    }

    /// Завершить сессию и освободить файл
    pub fn complete_session(
        &self,
        session_id: &str,
        status: ResolveStatus,
        message: String,
        error_kind: Option<ErrorKind>,
        results: Option<ResultMap>,
    ) {
        let mut state = self.write();
        let Some(p) = state.sessions.get_mut(session_id) else {
            return;
        };

        let now = chrono::Utc::now();
        p.status = status;
        p.is_processing = false;
        p.message = message;
        p.error_kind = error_kind;
        p.completed_at = Some(now);
        p.updated_at = now;
        if status != ResolveStatus::Failed {
            p.progress_percent = 100.0;
        }
        if let Some(results) = results {
            p.results = results;
        }

        let file = p.file.clone();
        if state.active_files.get(&file).map(String::as_str) == Some(session_id) {
            state.active_files.remove(&file);
        }
    }

    pub fn cleanup_old_sessions(&self, max_age_hours: i64) {
        let mut state = self.write();
        let now = chrono::Utc::now();
        state.sessions.retain(|_, p| match p.completed_at {
            Some(completed_at) => (now - completed_at).num_hours() < max_age_hours,
            None => true,
        });
    }
}

fn percent(index: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        index as f64 / total as f64 * 100.0
    }
}

/// Дескриптор прогона: идентификатор сессии и доступ к её снимку
#[derive(Clone)]
pub struct RunHandle {
    session_id: String,
    tracker: ProgressTracker,
}

impl std::fmt::Debug for RunHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunHandle")
            .field("session_id", &self.session_id)
            .finish_non_exhaustive()
    }
}

impl RunHandle {
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn snapshot(&self) -> Option<ResolveProgress> {
        self.tracker.get_progress(&self.session_id)
    }

    pub fn complete(
        &self,
        status: ResolveStatus,
        message: String,
        error_kind: Option<ErrorKind>,
        results: Option<ResultMap>,
    ) {
        self.tracker
            .complete_session(&self.session_id, status, message, error_kind, results);
    }
}

impl ProgressReporter for RunHandle {
    fn on_start(&self, total: usize) {
        self.tracker.set_total(&self.session_id, total);
    }

    fn on_item(&self, index: usize, total: usize, identifier: &PartIdentifier, record: &ProductRecord) {
        self.tracker
            .record_item(&self.session_id, index, total, identifier, record);
    }

    fn on_message(&self, message: &str) {
        self.tracker.set_message(&self.session_id, message);
    }
}

/// Однострочный прогресс в терминале
pub struct ConsoleReporter;

impl ProgressReporter for ConsoleReporter {
    fn on_start(&self, total: usize) {
        println!("共找到 {} 个产品编号", total);
    }

    fn on_item(&self, index: usize, total: usize, identifier: &PartIdentifier, _record: &ProductRecord) {
        print!(
            "\r处理进度: {}/{} ({}) - 当前产品: {:<30}",
            index,
            total,
            format_percent(index, total),
            identifier.as_str()
        );
        if index == total {
            println!();
        }
        let _ = std::io::stdout().flush();
    }

    fn on_message(&self, message: &str) {
        println!("{}", message);
    }
}
