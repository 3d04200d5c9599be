use crate::app_state::use_app;
use giftdesk::ui_state::NotificationKind;
use leptos::prelude::*;

fn alert_class(kind: NotificationKind) -> &'static str {
    match kind {
        NotificationKind::Success => "alert alert-success shadow-lg",
        NotificationKind::Error => "alert alert-error shadow-lg",
        NotificationKind::Warning => "alert alert-warning shadow-lg",
        NotificationKind::Info => "alert alert-info shadow-lg",
    }
}

/// 通知浮层
#[component]
pub fn ToastHost() -> impl IntoView {
    let app = use_app();

    view! {
        <div class="toast toast-top toast-end z-50">
            <For
                each=move || app.ui.get().notifications
                key=|n| n.id.clone()
                children=move |n| {
                    let id = n.id.clone();
                    view! {
                        <div class=alert_class(n.kind) role="alert">
                            <div>
                                {n.title.clone().map(|t| view! { <h3 class="font-bold">{t}</h3> })}
                                <span>{n.message.clone()}</span>
                            </div>
                            <button class="btn btn-ghost btn-xs" on:click=move |_| app.dismiss(&id)>
                                "✕"
                            </button>
                        </div>
                    }
                }
            />
        </div>
    }
}
