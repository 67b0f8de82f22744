use super::api;
use contracts::enums::{OutputField, OutputFieldSet};
use contracts::usecases::common::UseCaseMetadata;
use contracts::usecases::u501_resolve_part_status::{
    ResolvePartStatus, ResolveProgress, ResolveRequest, ResolveStartStatus, ResolveStatus,
};
use leptos::prelude::*;
use std::collections::HashMap;
use leptos::task::spawn_local;
use thaw::*;

fn storage() -> Option<web_sys::Storage> {
    web_sys::window().and_then(|w| w.local_storage().ok().flatten())
}

const SESSION_KEY: &str = "u501_session_id";
const PROGRESS_KEY: &str = "u501_progress";

fn save_session_id(id: &str) {
    if let Some(s) = storage() {
        let _ = s.set_item(SESSION_KEY, id);
    }
}

fn load_session_id() -> Option<String> {
    storage().and_then(|s| s.get_item(SESSION_KEY).ok().flatten())
}

fn save_progress(p: &ResolveProgress) {
    if let Ok(json) = serde_json::to_string(p) {
        if let Some(s) = storage() {
            let _ = s.set_item(PROGRESS_KEY, &json);
        }
    }
}

fn load_progress() -> Option<ResolveProgress> {
    storage()
        .and_then(|s| s.get_item(PROGRESS_KEY).ok().flatten())
        .and_then(|json| serde_json::from_str(&json).ok())
}

fn clear_session() {
    if let Some(s) = storage() {
        let _ = s.remove_item(SESSION_KEY);
    }
}

fn status_color(status: ResolveStatus) -> &'static str {
    match status {
        ResolveStatus::Running => "var(--colorBrandForeground1, #0f6cbd)",
        ResolveStatus::Completed => "var(--colorPaletteGreenForeground1, #107c10)",
        ResolveStatus::CompletedWithErrors => "var(--colorPaletteDarkOrangeForeground1, #bc4b09)",
        ResolveStatus::Failed => "var(--colorPaletteRedForeground1, #c50f1f)",
    }
}

#[component]
pub fn ResolveWidget() -> impl IntoView {
    let (filename, set_filename) = signal(None::<String>);
    let (sheet_name, set_sheet_name) = signal("Sheet1".to_string());
    let (column_name, set_column_name) = signal(String::new());
    let (result_column, set_result_column) = signal(String::new());
    let (manufacturer_id, set_manufacturer_id) = signal(String::new());
    let (fields, set_fields) = signal(OutputFieldSet::all());
    let (custom_headers, set_custom_headers) = signal(HashMap::<OutputField, String>::new());
    let (session_id, set_session_id) = signal(None::<String>);
    let (progress, set_progress) = signal(None::<ResolveProgress>);
    let (error_msg, set_error_msg) = signal(String::new());
    let (is_uploading, set_is_uploading) = signal(false);
    let (is_starting, set_is_starting) = signal(false);

    // Восстановить сессию из localStorage
    Effect::new(move || {
        if session_id.get_untracked().is_none() {
            if let Some(sid) = load_session_id() {
                set_session_id.set(Some(sid));
            }
            if let Some(snap) = load_progress() {
                set_filename.set(Some(snap.file.clone()));
                set_progress.set(Some(snap));
            }
        }
    });

    // Polling прогресса
    Effect::new(move || {
        if let Some(sid) = session_id.get() {
            spawn_local(async move {
                loop {
                    match api::get_progress(&sid).await {
                        Ok(prog) => {
                            save_progress(&prog);
                            let finished = prog.is_finished();
                            set_progress.set(Some(prog));
                            if finished {
                                clear_session();
                                set_session_id.set(None);
                                break;
                            }
                        }
                        Err(e) => {
                            if e.contains("404") {
                                clear_session();
                                set_session_id.set(None);
                                set_progress.set(None);
                            } else {
                                set_error_msg.set(format!("获取进度失败: {}", e));
                            }
                            break;
                        }
                    }
                    gloo_timers::future::TimeoutFuture::new(2000).await;
                }
            });
        }
    });

    let on_file_change = move |ev: leptos::ev::Event| {
        let input: web_sys::HtmlInputElement = event_target(&ev);
        let Some(file) = input.files().and_then(|files| files.get(0)) else {
            return;
        };

        set_is_uploading.set(true);
        set_error_msg.set(String::new());
        spawn_local(async move {
            match api::upload_file(file).await {
                Ok(resp) => match resp.filename {
                    Some(name) => set_filename.set(Some(name)),
                    None => set_error_msg.set(resp.message),
                },
                Err(e) => set_error_msg.set(format!("上传失败: {}", e)),
            }
            set_is_uploading.set(false);
        });
    };

    let on_start = move |_| {
        let Some(file) = filename.get() else {
            set_error_msg.set("请先上传文件".to_string());
            return;
        };

        let mut request = ResolveRequest::new(file, sheet_name.get(), column_name.get());
        let result = result_column.get();
        request.result_column_name = (!result.trim().is_empty()).then_some(result);
        let manufacturer = manufacturer_id.get();
        request.manufacturer_id = (!manufacturer.trim().is_empty()).then_some(manufacturer);
        request.selected_fields = fields.get();
        request.custom_headers = custom_headers.get();

        let missing = request.missing_fields();
        if !missing.is_empty() {
            set_error_msg.set(format!("缺少必要参数: {}", missing.join(", ")));
            return;
        }

        set_is_starting.set(true);
        set_error_msg.set(String::new());
        set_progress.set(None);

        spawn_local(async move {
            match api::start_resolve(request).await {
                Ok(response) => match (response.status, response.session_id) {
                    (ResolveStartStatus::Started, Some(sid)) => {
                        save_session_id(&sid);
                        set_session_id.set(Some(sid));
                    }
                    _ => set_error_msg.set(response.message),
                },
                Err(e) => set_error_msg.set(format!("启动失败: {}", e)),
            }
            set_is_starting.set(false);
        });
    };

    view! {
        <div class="page__header">
            <h1 class="page__title">{ResolvePartStatus::display_name()}</h1>
            <p>{ResolvePartStatus::description()}</p>
        </div>

        {move || {
            let err = error_msg.get();
            if !err.is_empty() {
                view! {
                    <div style="padding:12px 16px;border-left:3px solid #c50f1f;background:#fdf3f4;margin-bottom:16px;">
                        {err}
                    </div>
                }.into_any()
            } else {
                view! { <></> }.into_any()
            }
        }}

        <Card>
            <Flex vertical=true gap=FlexGap::Medium>
                // Загрузка файла
                <div class="doc-filter">
                    <label class="doc-filter__label">"Excel 文件 (.xlsx/.xlsm):"</label>
                    <input
                        type="file"
                        accept=".xlsx,.xlsm"
                        disabled=move || is_uploading.get() || session_id.get().is_some()
                        on:change=on_file_change
                    />
                    <span>
                        {move || if is_uploading.get() {
                            "上传中...".to_string()
                        } else {
                            filename.get().unwrap_or_default()
                        }}
                    </span>
                </div>

                <Flex gap=FlexGap::Large>
                    <div class="doc-filter">
                        <label class="doc-filter__label">"工作表:"</label>
                        <input
                            type="text"
                            class="doc-filter__input"
                            prop:value=move || sheet_name.get()
                            on:input=move |ev| set_sheet_name.set(event_target_value(&ev))
                        />
                    </div>
                    <div class="doc-filter">
                        <label class="doc-filter__label">"产品编号列:"</label>
                        <input
                            type="text"
                            class="doc-filter__input"
                            placeholder="PN"
                            prop:value=move || column_name.get()
                            on:input=move |ev| set_column_name.set(event_target_value(&ev))
                        />
                    </div>
                    <div class="doc-filter">
                        <label class="doc-filter__label">"结果列:"</label>
                        <input
                            type="text"
                            class="doc-filter__input"
                            placeholder=move || format!("{}_状态", column_name.get())
                            prop:value=move || result_column.get()
                            on:input=move |ev| set_result_column.set(event_target_value(&ev))
                        />
                    </div>
                    <div class="doc-filter">
                        <label class="doc-filter__label">"制造商 ID:"</label>
                        <input
                            type="text"
                            class="doc-filter__input"
                            prop:value=move || manufacturer_id.get()
                            on:input=move |ev| set_manufacturer_id.set(event_target_value(&ev))
                        />
                    </div>
                </Flex>

                // Выбор выгружаемых полей (статус всегда)
                <Flex gap=FlexGap::Medium>
                    {OutputField::all()
                        .into_iter()
                        .filter(|field| *field != OutputField::Status)
                        .map(|field| {
                            view! {
                                <label>
                                    <input
                                        type="checkbox"
                                        prop:checked=move || fields.get().contains(field)
                                        on:change=move |ev| {
                                            let checked = event_target_checked(&ev);
                                            set_fields.update(|set| {
                                                if checked {
                                                    set.insert(field);
                                                } else {
                                                    set.remove(field);
                                                }
                                            });
                                        }
                                    />
                                    {field.default_label()}
                                </label>
                            }
                        })
                        .collect_view()}
                </Flex>

                // Пользовательские заголовки; пусто = заголовок по умолчанию
                <Flex gap=FlexGap::Medium>
                    {OutputField::all()
                        .into_iter()
                        .map(|field| {
                            let default_header = move || {
                                let mut preview = ResolveRequest::new("", "", column_name.get());
                                let result = result_column.get();
                                preview.result_column_name =
                                    (!result.trim().is_empty()).then_some(result);
                                preview.output_header(field)
                            };
                            view! {
                                <div class="doc-filter">
                                    <label class="doc-filter__label">
                                        {format!("{} 表头:", field.default_label())}
                                    </label>
                                    <input
                                        type="text"
                                        class="doc-filter__input"
                                        placeholder=default_header
                                        disabled=move || !fields.get().contains(field) && field != OutputField::Status
                                        prop:value=move || {
                                            custom_headers.get().get(&field).cloned().unwrap_or_default()
                                        }
                                        on:input=move |ev| {
                                            let value = event_target_value(&ev);
                                            set_custom_headers.update(|headers| {
                                                if value.trim().is_empty() {
                                                    headers.remove(&field);
                                                } else {
                                                    headers.insert(field, value);
                                                }
                                            });
                                        }
                                    />
                                </div>
                            }
                        })
                        .collect_view()}
                </Flex>

                <div>
                    <Button
                        appearance=ButtonAppearance::Primary
                        on_click=on_start
                        disabled=move || {
                            filename.get().is_none()
                                || is_starting.get()
                                || session_id.get().is_some()
                        }
                    >
                        {move || if is_starting.get() {
                            "启动中..."
                        } else if session_id.get().is_some() {
                            "处理中"
                        } else {
                            "开始处理"
                        }}
                    </Button>
                </div>
            </Flex>
        </Card>

        {move || progress.get().map(|prog| {
            let percent = prog.progress_percent.clamp(0.0, 100.0);
            let finished = prog.is_finished();
            let download_result = api::result_download_url(&prog.file);
            let download_snapshot = api::snapshot_download_url(&prog.file);
            let rows = prog
                .results
                .iter()
                .map(|(id, record)| (id.to_string(), record.status.clone(), record.is_failure()))
                .collect::<Vec<_>>();

            view! {
                <div style="margin-top:16px;">
                    <Card>
                        <div style="display:flex;align-items:center;gap:10px;">
                            <span style={format!("min-width:120px;color:{};", status_color(prog.status))}>
                                {prog.status.display_name()}
                            </span>
                            <div style="height:16px;overflow:hidden;background:#e0e0e0;flex:1;">
                                <div style={format!("width:{:.1}%;height:100%;background:#0f6cbd;transition:width 0.2s;", percent)}></div>
                            </div>
                            <span style="min-width:85px;text-align:right;">
                                {format!("{} / {}", prog.processed, prog.total)}
                            </span>
                            <span style="min-width:140px;">
                                {format!("成功: {}  失败: {}", prog.succeeded, prog.failed)}
                            </span>
                        </div>
                        <div style="margin-top:8px;">{prog.message.clone()}</div>

                        {finished.then(|| view! {
                            <div style="margin-top:8px;display:flex;gap:16px;">
                                <a href=download_result>"下载结果文件"</a>
                                <a href=download_snapshot>"下载详细数据 (JSON)"</a>
                            </div>
                        })}

                        <table style="margin-top:12px;width:100%;border-collapse:collapse;">
                            <thead>
                                <tr>
                                    <th style="text-align:left;">"产品编号"</th>
                                    <th style="text-align:left;">"状态"</th>
                                </tr>
                            </thead>
                            <tbody>
                                {rows.into_iter().map(|(id, status, failed)| view! {
                                    <tr style={if failed { "color:#c50f1f;" } else { "" }}>
                                        <td>{id}</td>
                                        <td>{status}</td>
                                    </tr>
                                }).collect_view()}
                            </tbody>
                        </table>
                    </Card>
                </div>
            }
        })}
    }
}
