use crate::web::router::Link;
use giftdesk::route::AppRoute;
use leptos::prelude::*;

#[component]
pub fn NotFoundPage(path: String) -> impl IntoView {
    view! {
        <div class="flex items-center justify-center min-h-screen bg-base-200">
            <div class="text-center space-y-4">
                <h1 class="text-6xl font-bold text-error">"404"</h1>
                <p class="text-xl">"Page not found"</p>
                <p class="text-base-content/60 font-mono text-sm">{path}</p>
                <Link to=AppRoute::Dashboard class="btn btn-primary">"Back to dashboard"</Link>
            </div>
        </div>
    }
}
