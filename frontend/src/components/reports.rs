//! 报表页：取数并导出 CSV / JSON

use crate::app_state::use_app;
use crate::web::download::download_text;
use giftdesk::api::reports::ReportKind;
use giftdesk::composables::export::{self, Column};
use giftdesk::composables::ExportFormat;
use giftdesk_shared::protocol::ListQuery;
use giftdesk_shared::{Date, ReportRow};
use leptos::prelude::*;
use leptos::task::spawn_local;

/// 列定义取自首行字段，`gift_name` -> `Gift Name`
fn columns_of(rows: &[ReportRow]) -> Vec<Column> {
    let Some(first) = rows.first() else {
        return Vec::new();
    };
    first
        .keys()
        .map(|key| {
            let title = key
                .split('_')
                .filter(|w| !w.is_empty())
                .map(|w| {
                    let mut chars = w.chars();
                    match chars.next() {
                        Some(c) => c.to_uppercase().chain(chars).collect::<String>(),
                        None => String::new(),
                    }
                })
                .collect::<Vec<_>>()
                .join(" ");
            Column::new(key.as_str(), title)
        })
        .collect()
}

#[component]
pub fn ReportPage(kind: ReportKind) -> impl IntoView {
    let app = use_app();
    let (rows, set_rows) = signal(Vec::<ReportRow>::new());
    let (total, set_total) = signal(0u64);
    let (busy, set_busy) = signal(false);

    spawn_local(async move {
        let result = app.services().api.reports.fetch(kind, ListQuery::default()).await;
        match result {
            Ok(listing) => {
                set_total.set(listing.total);
                set_rows.set(listing.data);
            }
            Err(e) => app.error(&e),
        }
    });

    let export = move |format: ExportFormat| {
        set_busy.set(true);
        spawn_local(async move {
            let result = app.services().api.reports.export(kind, ListQuery::default()).await;
            let outcome = result.and_then(|rows| {
                let columns = columns_of(&rows);
                let (name, mime, body) =
                    export::render(&rows, &columns, format, kind.slug(), &Date::now())?;
                download_text(&name, mime, &body)
            });
            if let Err(e) = outcome {
                app.error(&e);
            }
            set_busy.set(false);
        });
    };

    view! {
        <div class="card bg-base-100 shadow">
            <div class="card-body">
                <div class="flex justify-between items-center">
                    <h2 class="card-title">{kind.to_string()}</h2>
                    <div class="flex gap-2">
                        <button class="btn btn-sm" disabled=move || busy.get() on:click=move |_| export(ExportFormat::Csv)>"CSV"</button>
                        <button class="btn btn-sm" disabled=move || busy.get() on:click=move |_| export(ExportFormat::Json)>"JSON"</button>
                    </div>
                </div>
                <p class="text-sm text-base-content/60">{move || format!("{} rows", total.get())}</p>
                <div class="overflow-x-auto">
                    <table class="table table-zebra table-sm">
                        <thead>
                            <tr>
                                {move || columns_of(&rows.get()).into_iter().map(|c| view! { <th>{c.title}</th> }).collect_view()}
                            </tr>
                        </thead>
                        <tbody>
                            {move || {
                                let rows = rows.get();
                                let columns = columns_of(&rows);
                                rows.into_iter().map(|row| {
                                    let cells = columns.iter().map(|c| {
                                        let text = match row.get(&c.key) {
                                            None | Some(serde_json::Value::Null) => String::new(),
                                            Some(serde_json::Value::String(s)) => s.clone(),
                                            Some(other) => other.to_string(),
                                        };
                                        view! { <td>{text}</td> }
                                    }).collect_view();
                                    view! { <tr>{cells}</tr> }
                                }).collect_view()
                            }}
                        </tbody>
                    </table>
                </div>
            </div>
        </div>
    }
}
