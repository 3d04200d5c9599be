//! 路由服务模块 - 核心引擎
//!
//! 封装了 web_sys 的 History API，所有对 window.history 的操作都集中在此模块。
//! 导航流程："请求 -> 守卫(异步) -> 写入 History -> 更新信号 -> afterEach"。
//! 首屏同样如此：守卫完成前没有当前位置，出口只显示加载状态。

use giftdesk::config::AppConfig;
use giftdesk::guard::NavigationGuard;
use giftdesk::route::{AppRoute, Location, RouteName};
use leptos::prelude::*;
use leptos::task::spawn_local;
use std::rc::Rc;
use wasm_bindgen::prelude::*;

use super::document;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HistoryMode {
    Push,
    Replace,
}

fn write_history(url: &str, mode: HistoryMode) {
    if let Some(window) = web_sys::window() {
        if let Ok(history) = window.history() {
            let _ = match mode {
                HistoryMode::Push => history.push_state_with_url(&JsValue::NULL, "", Some(url)),
                HistoryMode::Replace => {
                    history.replace_state_with_url(&JsValue::NULL, "", Some(url))
                }
            };
        }
    }
}

/// 路由器服务
///
/// 当前位置保存在信号中驱动界面更新；守卫与配置存放在本地 arena 中，句柄可 Copy。
#[derive(Clone, Copy)]
pub struct RouterService {
    /// 第一次导航提交前为 `None`
    current: ReadSignal<Option<Location>>,
    set_current: WriteSignal<Option<Location>>,
    guard: StoredValue<Rc<NavigationGuard>, LocalStorage>,
    config: StoredValue<AppConfig>,
    /// 每次导航递增，过期的守卫结果直接丢弃
    generation: StoredValue<u64>,
}

impl RouterService {
    fn new(guard: Rc<NavigationGuard>, config: AppConfig) -> Self {
        let (current, set_current) = signal(None);
        Self {
            current,
            set_current,
            guard: StoredValue::new_local(guard),
            config: StoredValue::new(config),
            generation: StoredValue::new(0),
        }
    }

    /// 从地址栏解析当前位置 (去掉应用基础路径)
    fn browser_location(config: &AppConfig) -> Location {
        let path = document::current_path();
        let url = format!("{}{}", config.strip_app_base(&path), document::current_search());
        Location::parse(&url)
    }

    /// 已提交的位置；只在路由出口渲染出的视图中使用
    pub fn current(&self) -> Signal<Location> {
        let current = self.current;
        Signal::derive(move || current.get().unwrap_or_default())
    }

    /// 推入新的历史记录
    pub fn navigate(&self, to: impl Into<Location>) {
        self.run(to.into(), HistoryMode::Push);
    }

    /// 替换当前历史记录
    pub fn replace(&self, to: impl Into<Location>) {
        self.run(to.into(), HistoryMode::Replace);
    }

    /// 按应用内 URL (如 `/gifts?page=2`) 导航
    pub fn navigate_url(&self, url: &str) {
        self.navigate(Location::parse(url));
    }

    /// 带基础路径的完整地址，用于 `<a href>`
    pub fn href(&self, to: &Location) -> String {
        self.config.with_value(|c| c.app_path(&to.to_url()))
    }

    fn run(&self, target: Location, mode: HistoryMode) {
        let this = *self;
        let generation = self.generation.get_value() + 1;
        self.generation.set_value(generation);
        let guard = self.guard.get_value();
        let first_load = self.current.get_untracked().is_none();

        spawn_local(async move {
            // 重定向链过长时留在原地；首屏则显示经过守卫的 NotFound 页
            let resolved = guard.resolve(target, first_load).await;
            if this.generation.get_value() != generation {
                return;
            }
            let Some(resolved) = resolved else {
                return;
            };
            document::set_title(&resolved.title);
            let mode = if resolved.redirected {
                HistoryMode::Replace
            } else {
                mode
            };
            this.commit(resolved.location, mode);
        });
    }

    fn commit(&self, location: Location, mode: HistoryMode) {
        write_history(&self.href(&location), mode);
        self.after_each(&location);
        self.set_current.set(Some(location));
    }

    fn after_each(&self, to: &Location) {
        if to.route.name() == RouteName::Scanner {
            document::lock_viewport_for_scanner();
        }
    }

    /// 浏览器后退/前进：地址已变化，只需重新走守卫
    fn init_popstate_listener(&self) {
        let this = *self;
        let closure = Closure::<dyn Fn()>::new(move || {
            let target = this.config.with_value(Self::browser_location);
            this.run(target, HistoryMode::Replace);
        });

        if let Some(window) = web_sys::window() {
            let _ = window
                .add_event_listener_with_callback("popstate", closure.as_ref().unchecked_ref());
        }

        // 泄漏闭包以保持监听器存活
        closure.forget();
    }

    /// 认证状态变化时的自动重定向
    fn setup_auth_redirect(&self, is_authenticated: Signal<bool>) {
        let this = *self;
        Effect::new(move |_| {
            let is_auth = is_authenticated.get();
            // 首次导航尚未提交，交给它的守卫处理
            let Some(route) = this.current.get_untracked().map(|l| l.route) else {
                return;
            };

            if is_auth && route == AppRoute::Login {
                tracing::info!("logged in, redirecting to dashboard");
                this.replace(AppRoute::Dashboard);
            } else if !is_auth && route.meta().requires_auth {
                tracing::info!("logged out, redirecting to login");
                this.replace(AppRoute::Login);
            }
        });
    }
}

/// 提供路由服务到 Context 并初始化
pub fn provide_router(
    guard: Rc<NavigationGuard>,
    config: AppConfig,
    is_authenticated: Signal<bool>,
) -> RouterService {
    let router = RouterService::new(guard, config);

    router.init_popstate_listener();
    router.setup_auth_redirect(is_authenticated);
    // 首屏也经过守卫，完成后才有当前位置
    let initial = router.config.with_value(RouterService::browser_location);
    router.replace(initial);

    provide_context(router);
    router
}

/// 从 Context 获取路由服务
pub fn use_router() -> RouterService {
    use_context::<RouterService>()
        .expect("RouterService not found in context. Ensure Router is provided.")
}

// ============================================================================
// UI 组件
// ============================================================================

/// 路由出口组件
///
/// 根据当前位置渲染对应的组件。
#[component]
pub fn RouterOutlet(
    /// 路由匹配函数：接收当前位置，返回对应视图
    matcher: fn(Location) -> AnyView,
) -> impl IntoView {
    let router = use_router();

    move || match router.current.get() {
        Some(location) => matcher(location),
        None => view! {
            <div class="flex items-center justify-center min-h-screen">
                <span class="loading loading-spinner loading-lg text-primary"></span>
            </div>
        }
        .into_any(),
    }
}

/// 应用内链接：拦截点击，走路由服务
#[component]
pub fn Link(
    /// 目标位置
    #[prop(into)]
    to: Location,
    #[prop(optional, into)] class: MaybeProp<String>,
    children: Children,
) -> impl IntoView {
    let router = use_router();
    let href = router.href(&to);

    let on_click = move |ev: web_sys::MouseEvent| {
        ev.prevent_default();
        router.navigate(to.clone());
    };

    view! {
        <a href=href class=move || class.get().unwrap_or_default() on:click=on_click>
            {children()}
        </a>
    }
}
