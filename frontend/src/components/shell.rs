//! 页面框架：侧边导航、移动端标签栏、顶栏

use crate::app_state::use_app;
use crate::auth::{logout, use_auth};
use crate::web::router::{Link, use_router};
use giftdesk::guard::{
    NavItem, QUERY_ACCESS_DENIED, QUERY_MESSAGE, is_route_active, mobile_navigation_items,
    navigation_items,
};
use giftdesk::route::{AppRoute, Location};
use giftdesk::ui_state::Viewport;
use leptos::prelude::*;
use leptos::task::spawn_local;

fn nav_link(item: NavItem, current: Signal<Location>, base: &'static str) -> impl IntoView {
    let class = move || {
        if is_route_active(item.name, &current.get().route) {
            format!("{base} active")
        } else {
            base.to_string()
        }
    };
    let target = item.name.to_route().unwrap_or_default();
    view! {
        <li>
            <Link to=target class=Signal::derive(class)>
                {item.icon.map(|icon| view! { <span class="nav-icon" data-icon=icon></span> })}
                <span>{item.title}</span>
            </Link>
        </li>
    }
}

#[component]
pub fn PageShell(children: Children) -> impl IntoView {
    let auth = use_auth();
    let app = use_app();
    let router = use_router();
    let current = router.current();
    let is_pwa = app.is_pwa;

    let side_items = move || navigation_items(auth.state.get().role.as_deref(), is_pwa);
    let tab_items = move || mobile_navigation_items(auth.state.get().role.as_deref(), is_pwa);
    let hide_navigation = move || current.get().route.meta().hide_navigation;

    let access_denied = move || {
        let location = current.get();
        (location.query_value(QUERY_ACCESS_DENIED) == Some("true"))
            .then(|| location.query_value(QUERY_MESSAGE).unwrap_or_default().to_string())
    };

    let on_logout = move |_| {
        spawn_local(async move {
            let message = logout(&auth).await;
            app.success(&message);
        });
    };

    view! {
        <div class="min-h-screen bg-base-200 font-sans">
            <Show when=move || !hide_navigation()>
                <header class="navbar bg-base-100 shadow-sm">
                    <div class="flex-1 font-bold">{app.services().config.app_name.clone()}</div>
                    <Show when=move || app.ui.get().is_offline>
                        <span class="badge badge-warning mr-2">"Offline"</span>
                    </Show>
                    <div class="flex-none gap-2 flex items-center">
                        <div class="avatar placeholder">
                            <div class="bg-neutral text-neutral-content rounded-full w-8">
                                <span>{move || auth.state.get().initials}</span>
                            </div>
                        </div>
                        <span class="hidden md:inline">{move || auth.state.get().full_name}</span>
                        <button class="btn btn-ghost btn-sm" on:click=on_logout>"Logout"</button>
                    </div>
                </header>
            </Show>

            <div class="flex">
                <Show when=move || !hide_navigation() && app.ui.get().viewport != Viewport::Mobile>
                    <aside class="w-56 bg-base-100 min-h-screen">
                        <ul class="menu">
                            {move || side_items().into_iter().map(|item| nav_link(item, current, "")).collect_view()}
                        </ul>
                    </aside>
                </Show>
                <main class="flex-1 p-4 md:p-8 pb-20">
                    {move || access_denied().map(|msg| view! {
                        <div role="alert" class="alert alert-warning mb-4"><span>{msg}</span></div>
                    })}
                    {children()}
                </main>
            </div>

            <Show when=move || !hide_navigation() && app.ui.get().viewport == Viewport::Mobile>
                <nav class="btm-nav">
                    <ul class="flex w-full justify-around">
                        {move || tab_items().into_iter().map(|item| {
                            if item.is_scan_button {
                                view! {
                                    <li>
                                        <button class="btn btn-primary btn-circle" on:click=move |_| app.services().ui.open_scanner()>
                                            {item.title}
                                        </button>
                                    </li>
                                }.into_any()
                            } else {
                                nav_link(item, current, "").into_any()
                            }
                        }).collect_view()}
                    </ul>
                </nav>
            </Show>
        </div>
    }
}

/// 尚未实现具体界面的路由占位页
#[component]
pub fn PlaceholderPage(location: Location) -> impl IntoView {
    let meta = location.route.meta();
    let id = location.route.id().map(str::to_string);
    view! {
        <div class="card bg-base-100 shadow">
            <div class="card-body">
                <h2 class="card-title">{meta.title}</h2>
                {id.map(|id| view! { <p class="font-mono text-sm">{id}</p> })}
                {meta.parent_route.and_then(|p| p.to_route()).map(|parent: AppRoute| view! {
                    <Link to=parent.clone() class="link">{parent.meta().title}</Link>
                })}
            </div>
        </div>
    }
}
