use super::digikey_api_client::{LookupOutcome, ProductCatalog};
use super::digikey_models::ProductDetailsResponse;
use super::error::ResolveError;
use super::progress_tracker::{ProgressReporter, ProgressTracker};
use super::snapshot::{snapshot_path_for, write_snapshot};
use crate::shared::excel::{
    read_column_from_file, write_columns_to_file, ColumnValue, WriteOptions,
    DEFAULT_MAX_SEARCH_ROWS,
};
use contracts::enums::OutputField;
use contracts::usecases::u501_resolve_part_status::{
    ErrorKind, PartIdentifier, ProductRecord, ResolveProgress, ResolveRequest, ResolveResponse,
    ResolveStatus, ResultMap,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Сколько часов хранить завершённые сессии
const SESSION_RETENTION_HOURS: i64 = 24;

/// Итог прогона, который дошёл до записи результата
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub status: ResolveStatus,
    pub message: String,
    pub data: ResultMap,
    pub succeeded: usize,
    pub failed: usize,
}

impl RunOutcome {
    pub fn error_kind(&self) -> Option<ErrorKind> {
        (self.failed > 0).then_some(ErrorKind::PartialFailure)
    }
}

/// Executor для UseCase пакетного запроса статусов деталей
pub struct ResolveExecutor {
    catalog: Arc<dyn ProductCatalog>,
    pub progress_tracker: Arc<ProgressTracker>,
    /// `storage.snapshot_path`; фактический файл зависит от книги
    snapshot_base: PathBuf,
    upload_dir: PathBuf,
}

impl ResolveExecutor {
    pub fn new(
        catalog: Arc<dyn ProductCatalog>,
        progress_tracker: Arc<ProgressTracker>,
        snapshot_base: PathBuf,
        upload_dir: PathBuf,
    ) -> Self {
        Self {
            catalog,
            progress_tracker,
            snapshot_base,
            upload_dir,
        }
    }

    /// Снимок прогона по книге `workbook` (у каждой книги свой файл)
    pub fn snapshot_path_for(&self, workbook: &Path) -> PathBuf {
        snapshot_path_for(&self.snapshot_base, workbook)
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    /// Запустить обработку загруженного файла (создаёт async task и возвращает session_id)
    pub async fn start_resolve(&self, request: ResolveRequest) -> ResolveResponse {
        self.progress_tracker
            .cleanup_old_sessions(SESSION_RETENTION_HOURS);

        let missing = request.missing_fields();
        if !missing.is_empty() {
            return ResolveResponse::rejected(format!("缺少必要参数: {}", missing.join(", ")));
        }

        let is_plain_name = Path::new(&request.filename)
            .file_name()
            .and_then(|n| n.to_str())
            == Some(request.filename.as_str());
        if !is_plain_name {
            return ResolveResponse::rejected(format!("无效的文件名: {}", request.filename));
        }

        let workbook_path = self.upload_dir.join(&request.filename);
        if !workbook_path.is_file() {
            return ResolveResponse::rejected(format!("文件不存在: {}", request.filename));
        }

        let handle = match self.progress_tracker.try_create_session(&request.filename) {
            Ok(handle) => handle,
            Err(message) => {
                tracing::warn!("Resolve start rejected: {}", message);
                return ResolveResponse::rejected(message);
            }
        };
        let session_id = handle.session_id().to_string();

        let executor = Arc::new(Self {
            catalog: self.catalog.clone(),
            progress_tracker: self.progress_tracker.clone(),
            snapshot_base: self.snapshot_base.clone(),
            upload_dir: self.upload_dir.clone(),
        });

        tokio::spawn(async move {
            match executor.run(&request, &workbook_path, &handle).await {
                Ok(outcome) => {
                    let kind = outcome.error_kind();
                    handle.complete(outcome.status, outcome.message, kind, Some(outcome.data));
                }
                Err(e) => {
                    tracing::error!("Resolve run for '{}' failed: {}", request.filename, e);
                    handle.complete(ResolveStatus::Failed, e.to_string(), Some(e.kind()), None);
                }
            }
        });

        ResolveResponse::started(session_id)
    }

    /// Получить прогресс сессии
    pub fn get_progress(&self, session_id: &str) -> Option<ResolveProgress> {
        self.progress_tracker.get_progress(session_id)
    }

    /// Полный прогон: чтение столбца, запросы по каждой детали, снимок, запись.
    ///
    /// Неудача по отдельной детали не прерывает прогон.
    pub async fn run(
        &self,
        request: &ResolveRequest,
        workbook_path: &Path,
        reporter: &dyn ProgressReporter,
    ) -> Result<RunOutcome, ResolveError> {
        let missing = request.missing_fields();
        if !missing.is_empty() {
            return Err(ResolveError::Config(format!(
                "缺少必要参数: {}",
                missing.join(", ")
            )));
        }

        tracing::info!(
            "Starting part status resolve: file={}, sheet={}, column={}",
            workbook_path.display(),
            request.sheet_name,
            request.column_name
        );

        let read = {
            let path = workbook_path.to_path_buf();
            let sheet = request.sheet_name.clone();
            let column = request.column_name.clone();
            blocking(move || read_column_from_file(&path, &sheet, &column, DEFAULT_MAX_SEARCH_ROWS))
                .await?
        };

        if read.values.is_empty() {
            return Err(ResolveError::Config(format!(
                "在列 '{}' 中未找到任何产品编号",
                request.column_name
            )));
        }

        let total = read.values.len();
        reporter.on_start(total);

        let manufacturer_id = request
            .manufacturer_id
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty());

        let mut records = Vec::with_capacity(total);
        let mut data = ResultMap::new();
        let mut succeeded = 0usize;
        let mut failed = 0usize;

        for (idx, raw) in read.values.iter().enumerate() {
            let (identifier, record) = match PartIdentifier::parse(raw) {
                Some(identifier) => {
                    let record = self.resolve_one(&identifier, manufacturer_id).await?;
                    (identifier, record)
                }
                None => (
                    PartIdentifier::verbatim(raw),
                    ProductRecord::failure("无法从URL提取产品编号"),
                ),
            };

            if record.is_failure() {
                failed += 1;
                tracing::warn!("Part '{}': {}", identifier, record.status);
            } else {
                succeeded += 1;
            }

            reporter.on_item(idx + 1, total, &identifier, &record);
            data.insert(identifier, record.clone());
            records.push(record);
        }

        tracing::info!(
            "Lookup finished: total={}, succeeded={}, failed={}",
            total,
            succeeded,
            failed
        );

        reporter.on_message("正在保存结果...");
        {
            let path = self.snapshot_path_for(workbook_path);
            let snapshot = data.clone();
            blocking(move || write_snapshot(&path, &snapshot)).await?;
        }

        let columns: Vec<(String, Vec<ColumnValue>)> = request
            .output_headers()
            .into_iter()
            .map(|(field, header)| {
                let values = records.iter().map(|r| field_value(field, r)).collect();
                (header, values)
            })
            .collect();
        let status_header = columns
            .first()
            .map(|(header, _)| header.clone())
            .unwrap_or_default();

        let options = WriteOptions {
            max_search_rows: DEFAULT_MAX_SEARCH_ROWS,
            reference_header: Some(request.column_name.clone()),
            header_row: Some(read.location.row),
        };
        let path = workbook_path.to_path_buf();
        let sheet = request.sheet_name.clone();
        // книга уже прочитана, поэтому любая ошибка здесь относится к сохранению
        let summary = blocking(move || {
            write_columns_to_file(&path, &sheet, &columns, &options)
                .map_err(|e| ResolveError::Persistence(e.to_string()))
        })
        .await?;
        for (header, location) in &summary.columns {
            tracing::debug!(
                "Column '{}' written at row {}, column {}",
                header,
                location.row,
                location.column
            );
        }

        let status = if failed > 0 {
            ResolveStatus::CompletedWithErrors
        } else {
            ResolveStatus::Completed
        };
        let message = format!(
            "处理完成! 结果已写入 '{}' 列 (成功 {}, 失败 {})",
            status_header, succeeded, failed
        );
        tracing::info!("{}", message);

        Ok(RunOutcome {
            status,
            message,
            data,
            succeeded,
            failed,
        })
    }

    async fn resolve_one(
        &self,
        identifier: &PartIdentifier,
        manufacturer_id: Option<&str>,
    ) -> Result<ProductRecord, ResolveError> {
        let outcome = self
            .catalog
            .get_product_details(identifier, manufacturer_id)
            .await?;

        let record = match outcome {
            LookupOutcome::Found(ProductDetailsResponse {
                product: Some(product),
            }) => match product.status() {
                Some(_) => product.to_record(),
                None => ProductRecord::failure("未找到状态信息"),
            },
            LookupOutcome::Found(_) => ProductRecord::failure("未找到产品信息"),
            LookupOutcome::Failed {
                attempts,
                last_error,
            } => {
                tracing::warn!(
                    "Part '{}' gave no result after {} attempt(s)",
                    identifier,
                    attempts
                );
                ProductRecord::failure(last_error)
            }
        };
        Ok(record)
    }
}

fn field_value(field: OutputField, record: &ProductRecord) -> ColumnValue {
    match field {
        OutputField::Status => record.status.as_str().into(),
        OutputField::Description => record.description.as_str().into(),
        OutputField::Manufacturer => record.manufacturer.as_str().into(),
        OutputField::ProductUrl => record.product_url.as_str().into(),
        OutputField::DatasheetUrl => record.datasheet_url.as_str().into(),
        OutputField::QuantityAvailable => record.quantity_available.into(),
    }
}

/// Файловые операции (книга, снимок) выполняются вне async-потоков
async fn blocking<T, E, F>(f: F) -> Result<T, ResolveError>
where
    F: FnOnce() -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Into<ResolveError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ResolveError::Persistence(format!("后台任务失败: {}", e)))?
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::u501_resolve_part_status::digikey_api_client::tests::{
        spawn_mock, test_client, Behavior,
    };
    use crate::usecases::u501_resolve_part_status::digikey_models::{Product, ProductStatus};
    use async_trait::async_trait;
    use contracts::enums::OutputFieldSet;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    enum Answer {
        Status(&'static str),
        NoProduct,
        NoStatus,
        Fail(&'static str),
        TokenError,
    }

    struct FakeCatalog {
        answers: HashMap<&'static str, Answer>,
        delay: Duration,
        calls: AtomicUsize,
        /// Вызывается перед каждым ответом
        on_call: Option<Box<dyn Fn(&str) + Send + Sync>>,
    }

    impl FakeCatalog {
        fn new(answers: Vec<(&'static str, Answer)>) -> Self {
            Self {
                answers: answers.into_iter().collect(),
                delay: Duration::ZERO,
                calls: AtomicUsize::new(0),
                on_call: None,
            }
        }
    }

    #[async_trait]
    impl ProductCatalog for FakeCatalog {
        async fn get_product_details(
            &self,
            identifier: &PartIdentifier,
            _manufacturer_id: Option<&str>,
        ) -> Result<LookupOutcome, ResolveError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(hook) = &self.on_call {
                hook(identifier.as_str());
            }
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            let product = |status: Option<&str>| Product {
                product_status: Some(ProductStatus {
                    id: None,
                    status: status.map(str::to_string),
                }),
                ..Default::default()
            };
            Ok(match self.answers.get(identifier.as_str()) {
                Some(Answer::Status(s)) => LookupOutcome::Found(ProductDetailsResponse {
                    product: Some(product(Some(*s))),
                }),
                Some(Answer::NoStatus) => LookupOutcome::Found(ProductDetailsResponse {
                    product: Some(product(None)),
                }),
                Some(Answer::NoProduct) | None => {
                    LookupOutcome::Found(ProductDetailsResponse { product: None })
                }
                Some(Answer::Fail(e)) => LookupOutcome::Failed {
                    attempts: 3,
                    last_error: e.to_string(),
                },
                Some(Answer::TokenError) => {
                    return Err(ResolveError::TokenRefresh("HTTP 401".to_string()))
                }
            })
        }
    }

    struct Silent;

    impl ProgressReporter for Silent {
        fn on_start(&self, _total: usize) {}
        fn on_item(&self, _: usize, _: usize, _: &PartIdentifier, _: &ProductRecord) {}
        fn on_message(&self, _message: &str) {}
    }

    /// Книга с заголовком в строке `header_row` и данными под ним
    fn make_book(path: &Path, header_row: u32, header: &str, values: &[&str]) {
        let mut book = umya_spreadsheet::new_file();
        let sheet = book.get_sheet_by_name_mut("Sheet1").unwrap();
        sheet.get_cell_mut((1, 1)).set_value_string("BOM export");
        sheet.get_cell_mut((1, header_row)).set_value_string("Ref");
        sheet.get_cell_mut((2, header_row)).set_value_string(header);
        for (i, v) in values.iter().enumerate() {
            let row = header_row + 1 + i as u32;
            sheet.get_cell_mut((1, row)).set_value_string(format!("R{}", i + 1));
            sheet.get_cell_mut((2, row)).set_value_string(*v);
        }
        umya_spreadsheet::writer::xlsx::write(&book, path).unwrap();
    }

    fn cell(path: &Path, col: u32, row: u32) -> String {
        let book = umya_spreadsheet::reader::xlsx::read(path).unwrap();
        book.get_sheet_by_name("Sheet1").unwrap().get_value((col, row))
    }

    fn executor(catalog: Arc<dyn ProductCatalog>, dir: &Path) -> ResolveExecutor {
        ResolveExecutor::new(
            catalog,
            Arc::new(ProgressTracker::new()),
            dir.join("product_details.json"),
            dir.to_path_buf(),
        )
    }

    #[tokio::test]
    async fn test_partial_failure_still_writes_all_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bom.xlsx");
        make_book(&path, 2, "PN", &["A1", "B2", "C3", "D4", "https://x/"]);

        let catalog = Arc::new(FakeCatalog::new(vec![
            ("A1", Answer::Status("Active")),
            ("B2", Answer::NoStatus),
            ("C3", Answer::NoProduct),
            ("D4", Answer::Fail("HTTP 503: busy")),
        ]));
        let exec = executor(catalog.clone(), dir.path());

        let mut request = ResolveRequest::new("bom.xlsx", "Sheet1", "PN");
        request.selected_fields =
            OutputFieldSet::status_only().with(OutputField::QuantityAvailable);

        let outcome = exec.run(&request, &path, &Silent).await.unwrap();

        assert_eq!(outcome.status, ResolveStatus::CompletedWithErrors);
        assert_eq!(outcome.error_kind(), Some(ErrorKind::PartialFailure));
        assert_eq!((outcome.succeeded, outcome.failed), (1, 4));
        assert_eq!(outcome.data.len(), 5);
        // ссылка без номера не уходит в API
        assert_eq!(catalog.calls.load(Ordering::SeqCst), 4);

        assert_eq!(cell(&path, 3, 2), "PN_状态");
        assert_eq!(cell(&path, 4, 2), "PN_状态_可用数量");
        assert_eq!(cell(&path, 3, 3), "Active");
        assert_eq!(cell(&path, 3, 4), "查询失败: 未找到状态信息");
        assert_eq!(cell(&path, 3, 5), "查询失败: 未找到产品信息");
        assert_eq!(cell(&path, 3, 6), "查询失败: HTTP 503: busy");
        assert_eq!(cell(&path, 3, 7), "查询失败: 无法从URL提取产品编号");

        assert!(exec.snapshot_path_for(&path).exists());
    }

    #[tokio::test]
    async fn test_end_to_end_against_mock_catalog() {
        let (base, state) = spawn_mock(vec![
            ("ABC123", Behavior::Status("Active")),
            ("XYZ-9", Behavior::Hang(Duration::from_secs(3))),
        ])
        .await;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("parts.xlsx");
        make_book(&path, 3, "PN", &["ABC123", "XYZ-9"]);

        let exec = executor(Arc::new(test_client(&base)), dir.path());
        let mut request = ResolveRequest::new("parts.xlsx", "Sheet1", "PN");
        request.selected_fields = OutputFieldSet::status_only();

        let outcome = exec.run(&request, &path, &Silent).await.unwrap();

        assert_eq!(outcome.status, ResolveStatus::CompletedWithErrors);
        // 1 для ABC123 + 3 попытки для XYZ-9
        assert_eq!(state.detail_hits.load(Ordering::SeqCst), 4);

        assert_eq!(cell(&path, 3, 3), "PN_状态");
        assert_eq!(cell(&path, 3, 4), "Active");
        assert!(cell(&path, 3, 5).starts_with("查询失败: "));
        assert_eq!(cell(&path, 2, 4), "ABC123");

        let snapshot: ResultMap =
            serde_json::from_str(&std::fs::read_to_string(exec.snapshot_path_for(&path)).unwrap()).unwrap();
        let keys: Vec<&str> = snapshot.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["ABC123", "XYZ-9"]);
        assert_eq!(
            snapshot
                .get(&PartIdentifier::parse("ABC123").unwrap())
                .unwrap()
                .status,
            "Active"
        );
        assert!(snapshot
            .get(&PartIdentifier::parse("XYZ-9").unwrap())
            .unwrap()
            .is_failure());
    }

    #[tokio::test]
    async fn test_empty_column_and_missing_header_are_config_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.xlsx");
        make_book(&path, 1, "PN", &[]);
        let exec = executor(Arc::new(FakeCatalog::new(vec![])), dir.path());

        let err = exec
            .run(&ResolveRequest::new("empty.xlsx", "Sheet1", "PN"), &path, &Silent)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);

        let err = exec
            .run(&ResolveRequest::new("empty.xlsx", "Sheet1", "MPN"), &path, &Silent)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
        assert!(err.to_string().contains("MPN"));

        let err = exec
            .run(&ResolveRequest::new("empty.xlsx", "Nope", "PN"), &path, &Silent)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[tokio::test]
    async fn test_token_failure_aborts_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bom.xlsx");
        make_book(&path, 1, "PN", &["A1", "B2"]);
        let catalog = Arc::new(FakeCatalog::new(vec![("A1", Answer::TokenError)]));
        let exec = executor(catalog.clone(), dir.path());

        let err = exec
            .run(&ResolveRequest::new("bom.xlsx", "Sheet1", "PN"), &path, &Silent)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::TokenRefresh);
        assert_eq!(catalog.calls.load(Ordering::SeqCst), 1);
        assert_eq!(cell(&path, 3, 1), "");
        assert!(!exec.snapshot_path_for(&path).exists());
    }

    #[tokio::test]
    async fn test_start_validates_and_tracks_session() {
        let dir = tempfile::tempdir().unwrap();
        make_book(&dir.path().join("bom.xlsx"), 1, "PN", &["A1"]);
        let mut catalog = FakeCatalog::new(vec![("A1", Answer::Status("Obsolete"))]);
        catalog.delay = Duration::from_millis(200);
        let exec = executor(Arc::new(catalog), dir.path());

        let response = exec.start_resolve(ResolveRequest::new("", "Sheet1", "PN")).await;
        assert!(response.session_id.is_none());
        assert!(response.message.contains("filename"));

        let response = exec
            .start_resolve(ResolveRequest::new("missing.xlsx", "Sheet1", "PN"))
            .await;
        assert!(response.session_id.is_none());

        let response = exec
            .start_resolve(ResolveRequest::new("../bom.xlsx", "Sheet1", "PN"))
            .await;
        assert!(response.session_id.is_none());

        let started = exec
            .start_resolve(ResolveRequest::new("bom.xlsx", "Sheet1", "PN"))
            .await;
        let session_id = started.session_id.clone().unwrap();

        let busy = exec
            .start_resolve(ResolveRequest::new("bom.xlsx", "Sheet1", "PN"))
            .await;
        assert!(busy.session_id.is_none());

        let mut progress = exec.get_progress(&session_id).unwrap();
        for _ in 0..200 {
            if progress.is_finished() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
            progress = exec.get_progress(&session_id).unwrap();
        }

        assert_eq!(progress.status, ResolveStatus::Completed);
        assert_eq!(progress.progress_percent, 100.0);
        assert_eq!(progress.succeeded, 1);
        assert!(progress.error_kind.is_none());
        assert!(!exec.progress_tracker.is_file_active("bom.xlsx"));
    }

    /// Подменить книгу каталогом: открыть/сохранить её уже нельзя
    fn lock_workbook(path: &Path) {
        if path.is_file() {
            std::fs::remove_file(path).unwrap();
            std::fs::create_dir(path).unwrap();
            std::fs::write(path.join("keep"), b"x").unwrap();
        }
    }

    async fn wait_finished(exec: &ResolveExecutor, session_id: &str) -> ResolveProgress {
        let mut progress = exec.get_progress(session_id).unwrap();
        for _ in 0..200 {
            if progress.is_finished() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
            progress = exec.get_progress(session_id).unwrap();
        }
        progress
    }

    #[tokio::test]
    async fn test_save_failure_after_lookups_is_persistence_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bom.xlsx");
        make_book(&path, 1, "PN", &["A1"]);

        let mut catalog = FakeCatalog::new(vec![("A1", Answer::Status("Active"))]);
        let locked = path.clone();
        catalog.on_call = Some(Box::new(move |_| lock_workbook(&locked)));
        let exec = executor(Arc::new(catalog), dir.path());

        let err = exec
            .run(&ResolveRequest::new("bom.xlsx", "Sheet1", "PN"), &path, &Silent)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Persistence);
        // снимок пишется до книги
        assert!(exec.snapshot_path_for(&path).exists());
    }

    #[tokio::test]
    async fn test_failed_save_marks_session_failed_and_frees_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bom.xlsx");
        make_book(&path, 1, "PN", &["A1"]);

        let mut catalog = FakeCatalog::new(vec![("A1", Answer::Status("Active"))]);
        let locked = path.clone();
        catalog.on_call = Some(Box::new(move |_| lock_workbook(&locked)));
        let exec = executor(Arc::new(catalog), dir.path());

        let started = exec
            .start_resolve(ResolveRequest::new("bom.xlsx", "Sheet1", "PN"))
            .await;
        let progress = wait_finished(&exec, &started.session_id.unwrap()).await;

        assert_eq!(progress.status, ResolveStatus::Failed);
        assert_eq!(progress.error_kind, Some(ErrorKind::Persistence));
        assert!(!progress.is_processing);
        assert!(!exec.progress_tracker.is_file_active("bom.xlsx"));
    }

    #[tokio::test]
    async fn test_concurrent_runs_keep_separate_snapshots() {
        let dir = tempfile::tempdir().unwrap();
        make_book(&dir.path().join("a.xlsx"), 1, "PN", &["A1", "A2"]);
        make_book(&dir.path().join("b.xlsx"), 1, "PN", &["B1", "B2", "B3"]);

        let mut catalog = FakeCatalog::new(vec![
            ("A1", Answer::Status("Active")),
            ("A2", Answer::Status("Active")),
            ("B1", Answer::Status("Obsolete")),
            ("B2", Answer::Status("Obsolete")),
            ("B3", Answer::Status("Obsolete")),
        ]);
        catalog.delay = Duration::from_millis(50);
        let exec = executor(Arc::new(catalog), dir.path());

        let a = exec
            .start_resolve(ResolveRequest::new("a.xlsx", "Sheet1", "PN"))
            .await;
        let b = exec
            .start_resolve(ResolveRequest::new("b.xlsx", "Sheet1", "PN"))
            .await;
        let a = wait_finished(&exec, &a.session_id.unwrap()).await;
        let b = wait_finished(&exec, &b.session_id.unwrap()).await;
        assert_eq!(a.status, ResolveStatus::Completed);
        assert_eq!(b.status, ResolveStatus::Completed);

        let keys = |file: &str| -> Vec<String> {
            let path = exec.snapshot_path_for(&dir.path().join(file));
            let map: ResultMap =
                serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
            map.keys().map(|k| k.to_string()).collect()
        };
        assert_eq!(keys("a.xlsx"), vec!["A1", "A2"]);
        assert_eq!(keys("b.xlsx"), vec!["B1", "B2", "B3"]);
        assert_eq!(cell(&dir.path().join("a.xlsx"), 3, 2), "Active");
        assert_eq!(cell(&dir.path().join("b.xlsx"), 3, 4), "Obsolete");
    }
}
