//! 导航守卫与导航菜单
//!
//! 每次路由跳转前执行 [`NavigationGuard::before_each`]，决定放行或重定向。

use crate::route::{AppRoute, Location, RouteName};
use crate::session::SessionStore;
use std::rc::Rc;
use tracing::{debug, warn};

pub const QUERY_ACCESS_DENIED: &str = "access_denied";
pub const QUERY_MESSAGE: &str = "message";

/// 一次导航最多跟随的重定向次数
pub const MAX_REDIRECTS: u8 = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect(Location),
}

/// 导航解析结果：守卫已放行、可以提交的位置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub location: Location,
    pub title: String,
    /// 经过了至少一次重定向 (提交时应替换历史记录)
    pub redirected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardOutcome {
    /// 文档标题，形如 `Gift Inventory - Gift Management`
    pub title: String,
    pub decision: GuardDecision,
}

pub struct NavigationGuard {
    session: Rc<SessionStore>,
    app_name: String,
}

impl NavigationGuard {
    pub fn new(session: Rc<SessionStore>, app_name: impl Into<String>) -> Self {
        Self {
            session,
            app_name: app_name.into(),
        }
    }

    pub async fn before_each(&self, to: &Location) -> GuardOutcome {
        let meta = to.route.meta();
        let title = format!("{} - {}", meta.title, self.app_name);
        let decision = self.decide(to).await;
        if let GuardDecision::Redirect(target) = &decision {
            debug!(from = %to.to_url(), to = %target.to_url(), "navigation redirected");
        }
        GuardOutcome { title, decision }
    }

    /// 沿重定向链解析导航，每一跳都经过守卫
    ///
    /// 超过 [`MAX_REDIRECTS`] 时停下：已有页面时返回 `None` (留在原地)；
    /// 首屏 (`first_load`) 则解析为请求地址的 NotFound 页，同样经过守卫。
    pub async fn resolve(&self, target: Location, first_load: bool) -> Option<Resolved> {
        self.resolve_within(target, first_load, MAX_REDIRECTS).await
    }

    async fn resolve_within(
        &self,
        target: Location,
        first_load: bool,
        max_redirects: u8,
    ) -> Option<Resolved> {
        if let Some(resolved) = self.follow(target.clone(), max_redirects).await {
            return Some(resolved);
        }
        warn!(to = %target.to_url(), "redirect chain too long, stopping");
        if !first_load {
            return None;
        }
        let fallback = Location::new(AppRoute::NotFound {
            path: target.to_url(),
        });
        self.follow(fallback, 0).await
    }

    async fn follow(&self, target: Location, max_redirects: u8) -> Option<Resolved> {
        let mut current = target;
        for hop in 0..=max_redirects {
            let outcome = self.before_each(&current).await;
            match outcome.decision {
                GuardDecision::Allow => {
                    return Some(Resolved {
                        location: current,
                        title: outcome.title,
                        redirected: hop > 0,
                    });
                }
                GuardDecision::Redirect(next) => current = next,
            }
        }
        None
    }

    async fn decide(&self, to: &Location) -> GuardDecision {
        let meta = to.route.meta();
        let session = &self.session;

        // 已登录用户访问登录页直接回到首页
        if to.route == AppRoute::Login {
            return if session.is_authenticated() {
                GuardDecision::Redirect(AppRoute::Dashboard.into())
            } else {
                GuardDecision::Allow
            };
        }

        if !meta.requires_auth {
            return GuardDecision::Allow;
        }

        if !session.is_authenticated() && !session.check_auth().await {
            return GuardDecision::Redirect(AppRoute::Login.into());
        }

        if session.role().is_none() {
            if let Err(e) = session.load_user_role().await {
                warn!(error = %e, "role load failed during navigation");
            }
        }

        // 会话可能在角色加载中失效 (如 401 后刷新失败)
        if !session.is_authenticated() {
            return GuardDecision::Redirect(AppRoute::Login.into());
        }

        let role = session.role();
        if meta.permits(role.as_deref()) {
            return GuardDecision::Allow;
        }

        let fallback = meta
            .parent_route
            .and_then(RouteName::to_route)
            .unwrap_or(AppRoute::Dashboard);
        warn!(route = %to.route.name(), role = ?role, "access denied");
        GuardDecision::Redirect(
            Location::new(fallback)
                .with_query(QUERY_ACCESS_DENIED, "true")
                .with_query(QUERY_MESSAGE, meta.access_denied_message()),
        )
    }
}

// =========================================================
// 导航菜单
// =========================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavItem {
    pub name: RouteName,
    pub path: &'static str,
    pub title: &'static str,
    pub icon: Option<&'static str>,
    pub mobile_tab_order: Option<u32>,
    pub is_scan_button: bool,
}

impl From<RouteName> for NavItem {
    fn from(name: RouteName) -> Self {
        let meta = name.meta();
        Self {
            name,
            path: meta.path,
            title: meta.title,
            icon: meta.icon,
            mobile_tab_order: meta.mobile_tab_order,
            is_scan_button: meta.is_scan_button,
        }
    }
}

/// Dashboard 永远排第一，其余按 `mobile_tab_order` 升序；缺失或为 0 视作 999
fn sort_key(item: &NavItem) -> (u8, u32) {
    if item.name == RouteName::Dashboard {
        return (0, 0);
    }
    let order = match item.mobile_tab_order {
        None | Some(0) => 999,
        Some(order) => order,
    };
    (1, order)
}

fn collect(role: Option<&str>, is_pwa: bool, visible: impl Fn(RouteName) -> bool) -> Vec<NavItem> {
    let mut items: Vec<NavItem> = RouteName::ALL
        .into_iter()
        .filter(|name| visible(*name))
        .filter(|name| {
            let meta = name.meta();
            meta.permits(role) && !(is_pwa && meta.hide_in_pwa)
        })
        .map(NavItem::from)
        .collect();
    // 稳定排序，同序号保持路由表顺序
    items.sort_by_key(sort_key);
    items
}

/// 桌面端侧边栏菜单
pub fn navigation_items(role: Option<&str>, is_pwa: bool) -> Vec<NavItem> {
    collect(role, is_pwa, |name| name.meta().show_in_navigation)
}

/// 移动端底部标签栏
pub fn mobile_navigation_items(role: Option<&str>, is_pwa: bool) -> Vec<NavItem> {
    collect(role, is_pwa, |name| {
        name.meta().shows_in_mobile_navigation()
    })
}

/// 当前路由或其父路由与菜单项匹配即视为激活
pub fn is_route_active(item: RouteName, current: &AppRoute) -> bool {
    let current = current.name();
    current == item || current.meta().parent_route == Some(item)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::request::{HttpMethod, MockHttpClient};
    use crate::rpc::RpcClient;
    use crate::storage::{
        AUTH_KEYS, KEY_USER, KEY_USER_ROLE, KeyValueStore, KeyValueStoreExt, MemoryStore,
    };
    use giftdesk_shared::SessionUser;
    use serde_json::json;

    const WHO_URL: &str = "/api/method/frappe.auth.get_logged_user";
    const ROLE_URL: &str = "/api/method/gift.api.get_current_user_role";

    fn guard_with(storage: MemoryStore) -> (Rc<MockHttpClient>, Rc<SessionStore>, NavigationGuard) {
        let (mock, _, session, guard) = guard_with_storage(storage);
        (mock, session, guard)
    }

    fn guard_with_storage(
        storage: MemoryStore,
    ) -> (Rc<MockHttpClient>, Rc<MemoryStore>, Rc<SessionStore>, NavigationGuard) {
        let mock = Rc::new(MockHttpClient::new());
        let storage = Rc::new(storage);
        let rpc = Rc::new(RpcClient::new(mock.clone(), &AppConfig::default()));
        let session = SessionStore::new(rpc, storage.clone());
        let guard = NavigationGuard::new(session.clone(), "Gift Management");
        (mock, storage, session, guard)
    }

    /// 服务器确认当前用户，并返回给定角色
    fn server_knows_user(mock: &MockHttpClient, role: Option<&str>) {
        mock.mock_response(HttpMethod::Get, WHO_URL, 200, json!({ "message": "a@b.com" }));
        mock.mock_response(
            HttpMethod::Get,
            ROLE_URL,
            200,
            json!({ "message": { "user": "a@b.com", "role": role } }),
        );
    }

    fn signed_in(role: Option<&str>) -> MemoryStore {
        let storage = MemoryStore::new();
        storage
            .set_json(KEY_USER, &SessionUser::new("a@b.com", "Ahmed"))
            .unwrap();
        if let Some(role) = role {
            storage.set(KEY_USER_ROLE, role).unwrap();
        }
        storage
    }

    #[tokio::test]
    async fn test_title_is_suffixed() {
        let (_, _, guard) = guard_with(MemoryStore::new());
        let outcome = guard.before_each(&AppRoute::Login.into()).await;
        assert_eq!(outcome.title, "Login - Gift Management");
        assert_eq!(outcome.decision, GuardDecision::Allow);
    }

    #[tokio::test]
    async fn test_login_open_until_session_confirmed() {
        let (mock, session, guard) = guard_with(signed_in(Some("Admin")));
        let outcome = guard.before_each(&AppRoute::Login.into()).await;
        assert_eq!(outcome.decision, GuardDecision::Allow);
        assert_eq!(mock.count(HttpMethod::Get, WHO_URL), 0);

        server_knows_user(&mock, Some("Admin"));
        assert!(session.check_auth().await);
        let outcome = guard.before_each(&AppRoute::Login.into()).await;
        assert_eq!(
            outcome.decision,
            GuardDecision::Redirect(AppRoute::Dashboard.into())
        );
    }

    #[tokio::test]
    async fn test_expired_stored_session_goes_to_login() {
        let (mock, storage, session, guard) = guard_with_storage(signed_in(Some("Admin")));
        mock.mock_response(HttpMethod::Get, WHO_URL, 200, json!({ "message": "Guest" }));

        let outcome = guard.before_each(&AppRoute::Gifts.into()).await;
        assert_eq!(
            outcome.decision,
            GuardDecision::Redirect(AppRoute::Login.into())
        );
        assert_eq!(mock.count(HttpMethod::Get, WHO_URL), 1);
        assert!(!session.is_authenticated());
        for key in AUTH_KEYS {
            assert!(!storage.contains(key), "{key} should be removed");
        }
    }

    #[tokio::test]
    async fn test_confirmed_stored_session_is_allowed() {
        let (mock, session, guard) = guard_with(signed_in(Some("Admin")));
        server_knows_user(&mock, Some("Admin"));

        let outcome = guard.before_each(&AppRoute::Gifts.into()).await;
        assert_eq!(outcome.decision, GuardDecision::Allow);
        assert_eq!(mock.count(HttpMethod::Get, WHO_URL), 1);
        assert!(session.is_authenticated());
    }

    #[tokio::test]
    async fn test_protected_route_without_session_goes_to_login() {
        let (mock, _, guard) = guard_with(MemoryStore::new());
        let outcome = guard.before_each(&AppRoute::Gifts.into()).await;
        assert_eq!(outcome.title, "Gift Inventory - Gift Management");
        assert_eq!(
            outcome.decision,
            GuardDecision::Redirect(AppRoute::Login.into())
        );
        // 没有存储的用户时不需要询问服务器
        assert_eq!(mock.count(HttpMethod::Get, WHO_URL), 0);
    }

    #[tokio::test]
    async fn test_public_routes_are_allowed() {
        let (_, _, guard) = guard_with(MemoryStore::new());
        for route in [
            AppRoute::Offline,
            AppRoute::NotFound {
                path: "/nope".into(),
            },
        ] {
            let outcome = guard.before_each(&route.into()).await;
            assert_eq!(outcome.decision, GuardDecision::Allow);
        }
    }

    #[tokio::test]
    async fn test_missing_role_is_loaded() {
        let (mock, session, guard) = guard_with(signed_in(None));
        server_knows_user(&mock, Some("Event Coordinator"));

        let outcome = guard.before_each(&AppRoute::Scanner.into()).await;
        assert_eq!(outcome.decision, GuardDecision::Allow);
        assert_eq!(session.role().as_deref(), Some("Event Coordinator"));
    }

    #[tokio::test]
    async fn test_wrong_role_redirects_to_parent_with_message() {
        let (mock, _, guard) = guard_with(signed_in(Some("Event Coordinator")));
        server_knows_user(&mock, Some("Event Coordinator"));
        let to = Location::new(AppRoute::GiftEdit { id: "G-1".into() });
        let outcome = guard.before_each(&to).await;

        let GuardDecision::Redirect(target) = outcome.decision else {
            panic!("expected redirect");
        };
        assert_eq!(target.route, AppRoute::Gifts);
        assert_eq!(target.query_value(QUERY_ACCESS_DENIED), Some("true"));
        assert_eq!(
            target.query_value(QUERY_MESSAGE),
            Some("Access denied: Admin or Event Manager role required")
        );
    }

    #[tokio::test]
    async fn test_role_failure_still_allows_without_role() {
        let (mock, _, guard) = guard_with(signed_in(None));
        mock.mock_response(HttpMethod::Get, WHO_URL, 200, json!({ "message": "a@b.com" }));
        mock.mock_response(HttpMethod::Get, ROLE_URL, 500, json!({}));

        let outcome = guard.before_each(&AppRoute::GiftCreate.into()).await;
        assert_eq!(outcome.decision, GuardDecision::Allow);
    }

    #[tokio::test]
    async fn test_resolve_follows_redirects() {
        let (_, _, guard) = guard_with(MemoryStore::new());
        let resolved = guard.resolve(AppRoute::Gifts.into(), true).await.unwrap();
        assert_eq!(resolved.location, AppRoute::Login.into());
        assert_eq!(resolved.title, "Login - Gift Management");
        assert!(resolved.redirected);

        let resolved = guard.resolve(AppRoute::Offline.into(), true).await.unwrap();
        assert_eq!(resolved.location, AppRoute::Offline.into());
        assert!(!resolved.redirected);
    }

    #[tokio::test]
    async fn test_resolve_never_yields_login_for_confirmed_user() {
        let (mock, session, guard) = guard_with(signed_in(Some("Admin")));
        server_knows_user(&mock, Some("Admin"));
        assert!(session.check_auth().await);

        let resolved = guard.resolve(AppRoute::Login.into(), true).await.unwrap();
        assert_eq!(resolved.location, AppRoute::Dashboard.into());
        assert_eq!(resolved.title, "Dashboard - Gift Management");
    }

    #[tokio::test]
    async fn test_resolve_stops_when_redirects_run_out() {
        let (_, _, guard) = guard_with(MemoryStore::new());

        // 已有页面：原地不动
        let stalled = guard
            .resolve_within(AppRoute::Gifts.into(), false, 0)
            .await;
        assert_eq!(stalled, None);

        // 首屏：落到经过守卫的 NotFound 页
        let resolved = guard
            .resolve_within(AppRoute::Gifts.into(), true, 0)
            .await
            .unwrap();
        assert_eq!(
            resolved.location.route,
            AppRoute::NotFound {
                path: "/gifts".into()
            }
        );
        assert!(!resolved.redirected);
    }

    #[test]
    fn test_navigation_order() {
        let names: Vec<RouteName> = navigation_items(Some("Admin"), false)
            .into_iter()
            .map(|item| item.name)
            .collect();
        assert_eq!(
            names,
            vec![
                RouteName::Dashboard,
                RouteName::Gifts,
                RouteName::Dispatches,
                RouteName::Scanner,
                RouteName::Reports,
                RouteName::Profile,
                RouteName::Settings,
            ]
        );
    }

    #[test]
    fn test_navigation_filters_role_and_pwa() {
        let items = navigation_items(Some("Guest Viewer"), true);
        assert!(items.iter().all(|item| item.name != RouteName::Scanner));
        assert!(items.iter().all(|item| item.name != RouteName::Settings));
    }

    #[test]
    fn test_mobile_navigation() {
        let items = mobile_navigation_items(None, false);
        let names: Vec<RouteName> = items.iter().map(|item| item.name).collect();
        assert_eq!(
            names,
            vec![
                RouteName::Dashboard,
                RouteName::Gifts,
                RouteName::Dispatches,
                RouteName::Scanner,
                RouteName::Profile,
            ]
        );
        assert!(items[3].is_scan_button);
    }

    #[test]
    fn test_route_active_follows_parent() {
        assert!(is_route_active(
            RouteName::Gifts,
            &AppRoute::GiftDetail { id: "G-1".into() }
        ));
        assert!(is_route_active(RouteName::Settings, &AppRoute::UserManagement));
        assert!(!is_route_active(RouteName::Gifts, &AppRoute::Dispatches));
    }
}
