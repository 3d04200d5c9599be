//! Gift Management 前端应用
//!
//! 采用 Context-Driven 的架构：
//! - `web`: 浏览器能力的原生封装 (fetch、LocalStorage、History、振动、音频、下载)
//! - `auth` / `app_state`: 把核心库的存储桥接为 Leptos 信号
//! - `components`: UI 组件层

mod app_state;
mod auth;
mod components {
    pub mod login;
    pub mod not_found;
    pub mod reports;
    pub mod scanner;
    pub mod shell;
    pub mod toast;
}
mod logging;

// 原生 Web API 封装模块
pub(crate) mod web;

use crate::app_state::AppContext;
use crate::auth::AuthContext;
use crate::components::login::LoginPage;
use crate::components::not_found::NotFoundPage;
use crate::components::reports::ReportPage;
use crate::components::scanner::ScannerPage;
use crate::components::shell::{PageShell, PlaceholderPage};
use crate::components::toast::ToastHost;
use crate::web::router::{RouterOutlet, provide_router};
use crate::web::{BrowserScheduler, BrowserStorage, FetchClient, document};

use giftdesk::api::reports::ReportKind;
use giftdesk::config::AppConfig;
use giftdesk::route::{AppRoute, Location};
use giftdesk::{Platform, Services};
use leptos::prelude::*;
use leptos::task::spawn_local;
use std::rc::Rc;

fn report_kind(route: &AppRoute) -> Option<ReportKind> {
    match route {
        AppRoute::InterestShowsReport => Some(ReportKind::InterestShows),
        AppRoute::DispatchedGiftsReport => Some(ReportKind::DispatchedGifts),
        AppRoute::PendingDeliveryReport => Some(ReportKind::PendingDelivery),
        AppRoute::BarcodeReport => Some(ReportKind::BarcodePrint),
        _ => None,
    }
}

/// 路由匹配函数
///
/// 根据当前位置返回对应的视图组件。
fn route_matcher(location: Location) -> AnyView {
    match &location.route {
        AppRoute::Login => view! { <LoginPage /> }.into_any(),
        AppRoute::NotFound { path } => view! { <NotFoundPage path=path.clone() /> }.into_any(),
        AppRoute::Offline => view! {
            <div class="flex items-center justify-center min-h-screen bg-base-200">
                <div class="text-center">
                    <h1 class="text-3xl font-bold">"You are offline"</h1>
                    <p class="mt-4">"Check your connection and try again."</p>
                </div>
            </div>
        }
        .into_any(),
        AppRoute::Scanner => view! { <PageShell><ScannerPage /></PageShell> }.into_any(),
        route => match report_kind(route) {
            Some(kind) => view! { <PageShell><ReportPage kind=kind /></PageShell> }.into_any(),
            None => {
                let location = location.clone();
                view! { <PageShell><PlaceholderPage location=location /></PageShell> }.into_any()
            }
        },
    }
}

#[component]
pub fn App(services: Rc<Services>) -> impl IntoView {
    // 1. 认证与界面上下文
    let auth_ctx = AuthContext::new(services.session.clone());
    provide_context(auth_ctx);
    provide_context(AppContext::new(services.clone()));

    // 2. 路由服务：注入守卫与认证信号
    let router = provide_router(
        services.guard.clone(),
        services.config.clone(),
        auth_ctx.is_authenticated_signal(),
    );

    // 3. 会话恢复失败与扫码入口都交给路由
    services
        .rpc
        .set_login_redirect(move || router.replace(AppRoute::Login));
    services
        .ui
        .set_scanner_handler(Some(Rc::new(move || router.navigate(AppRoute::Scanner))));

    view! {
        <RouterOutlet matcher=route_matcher />
        <ToastHost />
    }
}

fn load_config() -> AppConfig {
    let mut config = AppConfig::from_lookup(document::global_string);
    if cfg!(debug_assertions) && config.asset_origin.is_empty() {
        config.asset_origin = AppConfig::DEV_ORIGIN.to_string();
    }
    config
}

/// 装配服务，确认会话后挂载
///
/// 本应用下的页面 (登录与离线页除外) 先向服务器确认会话，失败直接整页跳转到登录页。
pub fn start() {
    logging::init();

    let config = load_config();
    let platform = Platform {
        http: Rc::new(FetchClient),
        storage: Rc::new(BrowserStorage),
        scheduler: Rc::new(BrowserScheduler),
        screen_width: document::inner_width(),
    };
    let services = Rc::new(Services::new(config, platform));
    services.rpc.set_csrf_source(document::csrf_token);

    spawn_local(async move {
        let path = document::current_path();
        if services.config.requires_session_check(&path) {
            let restored = services.session.check_auth().await;
            if !restored || !services.session.is_authenticated() {
                tracing::info!(path = %path, "session not restored, leaving for login");
                document::replace_location(&services.config.app_path("/login"));
                return;
            }
        }
        mount_to_body(move || view! { <App services=services /> });
    });
}
