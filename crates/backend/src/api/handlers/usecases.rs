use axum::{
    extract::{Multipart, Path, Query},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use once_cell::sync::OnceCell;
use serde::Deserialize;
use std::sync::Arc;

use crate::shared::config::{self, Config};
use crate::usecases::u501_resolve_part_status::{DigiKeyApiClient, ProgressTracker, ResolveExecutor};
use contracts::usecases::u501_resolve_part_status::{
    ResolveProgress, ResolveRequest, ResolveResponse, ResolveStartStatus, UploadResponse,
};

// ============================================================================
// UseCase u501: Resolve part status
// ============================================================================

const ALLOWED_EXTENSIONS: [&str; 2] = ["xlsx", "xlsm"];
const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

static RESOLVE_EXECUTOR: OnceCell<Arc<ResolveExecutor>> = OnceCell::new();

/// Создать executor из конфигурации (вызывается один раз при старте сервера)
pub fn init_u501(config: &Config) -> anyhow::Result<()> {
    let client = DigiKeyApiClient::new(&config.digikey)?;
    let executor = ResolveExecutor::new(
        Arc::new(client),
        Arc::new(ProgressTracker::new()),
        config::get_snapshot_path(config),
        config::get_upload_dir(config),
    );
    RESOLVE_EXECUTOR
        .set(Arc::new(executor))
        .map_err(|_| anyhow::anyhow!("u501 executor already initialized"))
}

fn executor() -> Result<&'static Arc<ResolveExecutor>, StatusCode> {
    RESOLVE_EXECUTOR.get().ok_or_else(|| {
        tracing::error!("u501 executor is not initialized");
        StatusCode::SERVICE_UNAVAILABLE
    })
}

/// Безопасное имя файла: без каталогов, только ASCII буквы/цифры и `._-`.
/// Пробелы заменяются на `_`.
pub fn sanitize_filename(name: &str) -> Option<String> {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();
    let cleaned = cleaned.trim_matches(|c| c == '.' || c == '_');

    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

pub fn allowed_file(name: &str) -> bool {
    name.rsplit_once('.')
        .map(|(_, ext)| ALLOWED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

fn upload_error(message: impl Into<String>) -> (StatusCode, Json<UploadResponse>) {
    (StatusCode::BAD_REQUEST, Json(UploadResponse::error(message)))
}

/// POST /api/u501/upload
pub async fn u501_upload(
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), StatusCode> {
    let executor = executor()?;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return Ok(upload_error("没有文件")),
            Err(e) => {
                tracing::warn!("Failed to read multipart body: {}", e);
                return Ok(upload_error(format!("上传失败: {}", e)));
            }
        };
        if field.name() != Some("file") {
            continue;
        }

        let original = field.file_name().unwrap_or_default().to_string();
        if original.is_empty() {
            return Ok(upload_error("没有选择文件"));
        }
        let Some(filename) = sanitize_filename(&original).filter(|f| allowed_file(f)) else {
            return Ok(upload_error("不支持的文件类型"));
        };

        let bytes = match field.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => return Ok(upload_error(format!("上传失败: {}", e))),
        };

        let dir = executor.upload_dir();
        let path = dir.join(&filename);
        let saved = async {
            tokio::fs::create_dir_all(dir).await?;
            tokio::fs::write(&path, &bytes).await
        }
        .await;
        if let Err(e) = saved {
            tracing::error!("Failed to save upload {}: {}", path.display(), e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }

        tracing::info!("Uploaded '{}' ({} bytes)", filename, bytes.len());
        return Ok((StatusCode::OK, Json(UploadResponse::success(filename))));
    }
}

/// POST /api/u501/resolve/start
pub async fn u501_start_resolve(
    Json(request): Json<ResolveRequest>,
) -> Result<(StatusCode, Json<ResolveResponse>), StatusCode> {
    let response = executor()?.start_resolve(request).await;
    let status = match response.status {
        ResolveStartStatus::Started => StatusCode::OK,
        ResolveStartStatus::Rejected => StatusCode::BAD_REQUEST,
    };
    Ok((status, Json(response)))
}

/// GET /api/u501/resolve/:session_id/progress
pub async fn u501_get_progress(
    Path(session_id): Path<String>,
) -> Result<Json<ResolveProgress>, StatusCode> {
    match executor()?.get_progress(&session_id) {
        Some(progress) => Ok(Json(progress)),
        None => Err(StatusCode::NOT_FOUND),
    }
}

#[derive(Debug, Deserialize)]
pub struct DownloadQuery {
    pub filename: String,
}

fn attachment(content_type: &str, filename: &str, bytes: Vec<u8>) -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        bytes,
    )
}

/// Имя загруженного файла из запроса: только то, что могло пройти upload
fn requested_filename(query: &DownloadQuery) -> Result<String, StatusCode> {
    sanitize_filename(&query.filename)
        .filter(|f| *f == query.filename)
        .ok_or(StatusCode::BAD_REQUEST)
}

/// GET /api/u501/download/result?filename=
pub async fn u501_download_result(
    Query(query): Query<DownloadQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    let executor = executor()?;
    let filename = requested_filename(&query)?;

    let bytes = tokio::fs::read(executor.upload_dir().join(&filename))
        .await
        .map_err(|_| StatusCode::NOT_FOUND)?;
    Ok(attachment(XLSX_CONTENT_TYPE, &filename, bytes))
}

/// GET /api/u501/download/snapshot?filename=
pub async fn u501_download_snapshot(
    Query(query): Query<DownloadQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    let executor = executor()?;
    let filename = requested_filename(&query)?;

    let path = executor.snapshot_path_for(std::path::Path::new(&filename));
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|_| StatusCode::NOT_FOUND)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "product_details.json".to_string());
    Ok(attachment("application/json", &name, bytes))
}
