use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Каталог логов рядом с исполняемым файлом (или target/logs)
fn log_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("logs")))
        .unwrap_or_else(|| std::path::Path::new("target").join("logs"))
}

/// Имя файла лога за текущие сутки
pub fn log_file_name(date: chrono::NaiveDate) -> String {
    format!("digikey_{}.log", date.format("%Y%m%d"))
}

/// Инициализация системы трассировки (tracing)
///
/// Логи пишутся в:
/// - logs/digikey_YYYYMMDD.log (без цветов)
/// - stdout, если `console` (режим web-сервера)
///
/// В CLI консоль не используется, чтобы не ломать строку прогресса.
pub fn initialize(console: bool) -> anyhow::Result<()> {
    let log_dir = log_dir();
    std::fs::create_dir_all(&log_dir)
        .map_err(|e| anyhow::anyhow!("Cannot create log directory {}: {}", log_dir.display(), e))?;

    let log_file_path = log_dir.join(log_file_name(chrono::Local::now().date_naive()));
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file_path)
        .map_err(|e| anyhow::anyhow!("Cannot open log file {}: {}", log_file_path.display(), e))?;

    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into());

    let console_layer = console.then(tracing_subscriber::fmt::layer);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&log_level))
        .with(console_layer)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::sync::Arc::new(log_file))
                .with_ansi(false),
        )
        .init();

    if console {
        println!("✓ Log file: {}", log_file_path.display());
        println!("✓ Log level: {}", log_level);
    }

    Ok(())
}
