use crate::usecases::u501_resolve_part_status::ResolveWidget;
use leptos::prelude::*;

#[component]
pub fn App() -> impl IntoView {
    view! {
        <main style="max-width:960px;margin:24px auto;padding:0 16px;">
            <ResolveWidget />
        </main>
    }
}
