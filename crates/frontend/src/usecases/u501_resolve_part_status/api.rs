use contracts::usecases::common::UseCaseMetadata;
use contracts::usecases::u501_resolve_part_status::{
    ResolvePartStatus, ResolveProgress, ResolveRequest, ResolveResponse, UploadResponse,
};
use serde::de::DeserializeOwned;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{window, FormData, RequestInit, RequestMode, Response};

use crate::shared::api_utils;

/// URL маршрута u501, `path` начинается с "/"
fn api_url(path: &str) -> String {
    api_utils::api_url(&format!("{}{}", ResolvePartStatus::api_prefix(), path))
}

/// Выполнить запрос и разобрать JSON.
///
/// `accept_error_body`: 4xx с JSON-телом тоже разбирается (отказ с сообщением).
async fn fetch_json<T: DeserializeOwned>(
    req: web_sys::Request,
    accept_error_body: bool,
) -> Result<T, String> {
    let window = window().ok_or("No window object")?;

    let resp_val = wasm_bindgen_futures::JsFuture::from(window.fetch_with_request(&req))
        .await
        .map_err(|e| format!("Fetch failed: {:?}", e))?;

    let response: Response = resp_val.dyn_into().map_err(|_| "Not a Response")?;

    let client_error = (400..500).contains(&response.status());
    if !response.ok() && !(accept_error_body && client_error) {
        return Err(format!("HTTP error: {}", response.status()));
    }

    let json = wasm_bindgen_futures::JsFuture::from(
        response
            .json()
            .map_err(|e| format!("Failed to parse JSON: {:?}", e))?,
    )
    .await
    .map_err(|e| format!("Failed to get JSON: {:?}", e))?;

    serde_wasm_bindgen::from_value(json).map_err(|e| e.to_string())
}

pub async fn upload_file(file: web_sys::File) -> Result<UploadResponse, String> {
    let form = FormData::new().map_err(|e| format!("Failed to create FormData: {:?}", e))?;
    form.append_with_blob_and_filename("file", &file, &file.name())
        .map_err(|e| format!("Failed to append file: {:?}", e))?;

    let opts = RequestInit::new();
    opts.set_method("POST");
    opts.set_mode(RequestMode::Cors);
    opts.set_body(&form);

    let req = web_sys::Request::new_with_str_and_init(&api_url("/upload"), &opts)
        .map_err(|e| format!("Failed to create request: {:?}", e))?;

    fetch_json(req, true).await
}

pub async fn start_resolve(request: ResolveRequest) -> Result<ResolveResponse, String> {
    let body = serde_json::to_string(&request).map_err(|e| e.to_string())?;

    let opts = RequestInit::new();
    opts.set_method("POST");
    opts.set_mode(RequestMode::Cors);
    opts.set_body(&JsValue::from_str(&body));

    let req = web_sys::Request::new_with_str_and_init(&api_url("/resolve/start"), &opts)
        .map_err(|e| format!("Failed to create request: {:?}", e))?;

    req.headers()
        .set("Content-Type", "application/json")
        .map_err(|e| format!("Failed to set header: {:?}", e))?;

    fetch_json(req, true).await
}

pub async fn get_progress(session_id: &str) -> Result<ResolveProgress, String> {
    let url = api_url(&format!(
        "/resolve/{}/progress",
        urlencoding::encode(session_id)
    ));

    let opts = RequestInit::new();
    opts.set_method("GET");
    opts.set_mode(RequestMode::Cors);

    let req = web_sys::Request::new_with_str_and_init(&url, &opts)
        .map_err(|e| format!("Failed to create request: {:?}", e))?;

    fetch_json(req, false).await
}

pub fn result_download_url(filename: &str) -> String {
    api_url(&format!(
        "/download/result?filename={}",
        urlencoding::encode(filename)
    ))
}

pub fn snapshot_download_url(filename: &str) -> String {
    api_url(&format!(
        "/download/snapshot?filename={}",
        urlencoding::encode(filename)
    ))
}
