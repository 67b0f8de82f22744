//! Адрес backend для запросов из браузера

/// Базовый URL API.
///
/// Страница раздаётся самим backend (`dist/`), поэтому API живёт на том же
/// origin, какой бы `server.port` ни был задан в config.toml.
/// Для `trunk serve` адрес backend задаётся при сборке через `DIGIKEY_API_BASE`.
/// Пустая строка, если `window` недоступен (относительные URL).
pub fn api_base() -> String {
    if let Some(base) = option_env!("DIGIKEY_API_BASE") {
        return base.trim_end_matches('/').to_string();
    }
    web_sys::window()
        .and_then(|w| w.location().origin().ok())
        .unwrap_or_default()
}

/// Полный URL по пути вида "/api/..."
pub fn api_url(path: &str) -> String {
    format!("{}{}", api_base(), path)
}
