//! 路由定义模块 - 领域模型
//!
//! 纯粹的业务逻辑层，不依赖 DOM 或 web_sys。
//! 定义应用的全部路由、路径解析以及每个路由的元数据。

use crate::request::encode_component;
use giftdesk_shared::{ROLE_ADMIN, ROLE_EVENT_COORDINATOR, ROLE_EVENT_MANAGER};
use std::fmt::Display;

const MANAGERS: &[&str] = &[ROLE_ADMIN, ROLE_EVENT_MANAGER];
const SCANNER_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_EVENT_MANAGER, ROLE_EVENT_COORDINATOR];

// =========================================================
// 路由名
// =========================================================

/// 路由名 (不带参数)，用于元数据、父路由与导航菜单
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteName {
    Dashboard,
    Login,
    Gifts,
    GiftCreate,
    GiftDetail,
    GiftEdit,
    Dispatches,
    IssueCreate,
    IssueDetail,
    Scanner,
    ScannerDebug,
    GiftIssueFlow,
    Profile,
    Reports,
    Settings,
    CategoryManagement,
    UserManagement,
    GiftRecipientManagement,
    BarcodeReport,
    InterestShowsReport,
    DispatchedGiftsReport,
    PendingDeliveryReport,
    Offline,
    NotFound,
}

impl RouteName {
    /// 路由表顺序 (导航菜单排序的平局依据)
    pub const ALL: [RouteName; 24] = [
        RouteName::Dashboard,
        RouteName::Login,
        RouteName::Gifts,
        RouteName::GiftCreate,
        RouteName::GiftDetail,
        RouteName::GiftEdit,
        RouteName::Dispatches,
        RouteName::IssueCreate,
        RouteName::IssueDetail,
        RouteName::Scanner,
        RouteName::ScannerDebug,
        RouteName::GiftIssueFlow,
        RouteName::Profile,
        RouteName::Reports,
        RouteName::Settings,
        RouteName::CategoryManagement,
        RouteName::UserManagement,
        RouteName::GiftRecipientManagement,
        RouteName::BarcodeReport,
        RouteName::InterestShowsReport,
        RouteName::DispatchedGiftsReport,
        RouteName::PendingDeliveryReport,
        RouteName::Offline,
        RouteName::NotFound,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RouteName::Dashboard => "Dashboard",
            RouteName::Login => "Login",
            RouteName::Gifts => "Gifts",
            RouteName::GiftCreate => "GiftCreate",
            RouteName::GiftDetail => "GiftDetail",
            RouteName::GiftEdit => "GiftEdit",
            RouteName::Dispatches => "Dispatches",
            RouteName::IssueCreate => "IssueCreate",
            RouteName::IssueDetail => "IssueDetail",
            RouteName::Scanner => "Scanner",
            RouteName::ScannerDebug => "ScannerDebug",
            RouteName::GiftIssueFlow => "GiftIssueFlow",
            RouteName::Profile => "Profile",
            RouteName::Reports => "Reports",
            RouteName::Settings => "Settings",
            RouteName::CategoryManagement => "CategoryManagement",
            RouteName::UserManagement => "UserManagement",
            RouteName::GiftRecipientManagement => "GiftRecipientManagement",
            RouteName::BarcodeReport => "BarcodeReport",
            RouteName::InterestShowsReport => "InterestShowsReport",
            RouteName::DispatchedGiftsReport => "DispatchedGiftsReport",
            RouteName::PendingDeliveryReport => "PendingDeliveryReport",
            RouteName::Offline => "Offline",
            RouteName::NotFound => "NotFound",
        }
    }

    /// 无参数路由的实例；带参数的路由不能作为重定向目标
    pub fn to_route(self) -> Option<AppRoute> {
        let route = match self {
            RouteName::Dashboard => AppRoute::Dashboard,
            RouteName::Login => AppRoute::Login,
            RouteName::Gifts => AppRoute::Gifts,
            RouteName::GiftCreate => AppRoute::GiftCreate,
            RouteName::Dispatches => AppRoute::Dispatches,
            RouteName::IssueCreate => AppRoute::IssueCreate,
            RouteName::Scanner => AppRoute::Scanner,
            RouteName::ScannerDebug => AppRoute::ScannerDebug,
            RouteName::Profile => AppRoute::Profile,
            RouteName::Reports => AppRoute::Reports,
            RouteName::Settings => AppRoute::Settings,
            RouteName::CategoryManagement => AppRoute::CategoryManagement,
            RouteName::UserManagement => AppRoute::UserManagement,
            RouteName::GiftRecipientManagement => AppRoute::GiftRecipientManagement,
            RouteName::BarcodeReport => AppRoute::BarcodeReport,
            RouteName::InterestShowsReport => AppRoute::InterestShowsReport,
            RouteName::DispatchedGiftsReport => AppRoute::DispatchedGiftsReport,
            RouteName::PendingDeliveryReport => AppRoute::PendingDeliveryReport,
            RouteName::Offline => AppRoute::Offline,
            RouteName::GiftDetail
            | RouteName::GiftEdit
            | RouteName::IssueDetail
            | RouteName::GiftIssueFlow
            | RouteName::NotFound => return None,
        };
        Some(route)
    }

    /// **核心元数据：认证、角色、导航展示**
    pub fn meta(self) -> RouteMeta {
        const BASE: RouteMeta = RouteMeta {
            path: "/",
            requires_auth: true,
            requires_role: None,
            show_in_navigation: false,
            show_in_mobile_navigation: None,
            title: "",
            parent_route: None,
            mobile_tab_order: None,
            icon: None,
            hide_navigation: false,
            hide_in_pwa: false,
            is_scan_button: false,
        };

        match self {
            RouteName::Dashboard => RouteMeta {
                title: "Dashboard",
                icon: Some("home"),
                show_in_navigation: true,
                mobile_tab_order: Some(0),
                ..BASE
            },
            RouteName::Login => RouteMeta {
                path: "/login",
                requires_auth: false,
                title: "Login",
                hide_navigation: true,
                ..BASE
            },
            RouteName::Gifts => RouteMeta {
                path: "/gifts",
                title: "Gift Inventory",
                icon: Some("gift"),
                show_in_navigation: true,
                mobile_tab_order: Some(1),
                ..BASE
            },
            RouteName::GiftCreate => RouteMeta {
                path: "/gifts/new",
                title: "Add New Gift",
                parent_route: Some(RouteName::Gifts),
                requires_role: Some(MANAGERS),
                ..BASE
            },
            RouteName::GiftDetail => RouteMeta {
                path: "/gifts/:id",
                title: "Gift Details",
                parent_route: Some(RouteName::Gifts),
                ..BASE
            },
            RouteName::GiftEdit => RouteMeta {
                path: "/gifts/:id/edit",
                title: "Edit Gift",
                parent_route: Some(RouteName::Gifts),
                requires_role: Some(MANAGERS),
                ..BASE
            },
            RouteName::Dispatches => RouteMeta {
                path: "/issues",
                title: "Gift Dispatch",
                icon: Some("document-text"),
                show_in_navigation: true,
                mobile_tab_order: Some(2),
                ..BASE
            },
            RouteName::IssueCreate => RouteMeta {
                path: "/issues/new",
                title: "Dispatch Gift",
                parent_route: Some(RouteName::Dispatches),
                ..BASE
            },
            RouteName::IssueDetail => RouteMeta {
                path: "/issues/:id",
                title: "Dispatch Details",
                parent_route: Some(RouteName::Dispatches),
                ..BASE
            },
            RouteName::Scanner => RouteMeta {
                path: "/scan",
                title: "Scan",
                icon: Some("qr-code"),
                show_in_navigation: true,
                mobile_tab_order: Some(3),
                is_scan_button: true,
                requires_role: Some(SCANNER_ROLES),
                ..BASE
            },
            RouteName::ScannerDebug => RouteMeta {
                path: "/scan/debug",
                title: "Scanner Debug",
                parent_route: Some(RouteName::Scanner),
                requires_role: Some(MANAGERS),
                ..BASE
            },
            RouteName::GiftIssueFlow => RouteMeta {
                path: "/scan/gift/:id",
                title: "Dispatch Gift",
                parent_route: Some(RouteName::Scanner),
                hide_navigation: true,
                requires_role: Some(SCANNER_ROLES),
                ..BASE
            },
            RouteName::Profile => RouteMeta {
                path: "/profile",
                title: "My Profile",
                icon: Some("user"),
                show_in_navigation: true,
                mobile_tab_order: Some(5),
                ..BASE
            },
            RouteName::Reports => RouteMeta {
                path: "/reports",
                title: "Reports",
                icon: Some("document-chart-bar"),
                show_in_navigation: true,
                show_in_mobile_navigation: Some(false),
                mobile_tab_order: Some(4),
                ..BASE
            },
            RouteName::Settings => RouteMeta {
                path: "/settings",
                title: "Settings",
                icon: Some("cog-6-tooth"),
                show_in_navigation: true,
                show_in_mobile_navigation: Some(false),
                hide_in_pwa: true,
                mobile_tab_order: Some(5),
                ..BASE
            },
            RouteName::CategoryManagement => RouteMeta {
                path: "/settings/categories",
                title: "Category Management",
                parent_route: Some(RouteName::Settings),
                hide_in_pwa: true,
                ..BASE
            },
            RouteName::UserManagement => RouteMeta {
                path: "/settings/users",
                title: "User Management",
                parent_route: Some(RouteName::Settings),
                hide_in_pwa: true,
                ..BASE
            },
            RouteName::GiftRecipientManagement => RouteMeta {
                path: "/settings/gift-recipients",
                title: "Gift Recipient Management",
                parent_route: Some(RouteName::Settings),
                hide_in_pwa: true,
                ..BASE
            },
            RouteName::BarcodeReport => RouteMeta {
                path: "/reports/barcode-print",
                title: "Barcode Print Report",
                parent_route: Some(RouteName::Reports),
                ..BASE
            },
            RouteName::InterestShowsReport => RouteMeta {
                path: "/reports/interest-shows",
                title: "Interest Shows Report",
                parent_route: Some(RouteName::Reports),
                ..BASE
            },
            RouteName::DispatchedGiftsReport => RouteMeta {
                path: "/reports/dispatched-gifts",
                title: "Dispatched Gifts Report",
                parent_route: Some(RouteName::Reports),
                ..BASE
            },
            RouteName::PendingDeliveryReport => RouteMeta {
                path: "/reports/pending-delivery",
                title: "Pending Delivery Report",
                parent_route: Some(RouteName::Reports),
                ..BASE
            },
            RouteName::Offline => RouteMeta {
                path: "/offline",
                requires_auth: false,
                title: "Offline",
                hide_navigation: true,
                ..BASE
            },
            RouteName::NotFound => RouteMeta {
                path: "/*",
                requires_auth: false,
                title: "Page Not Found",
                hide_navigation: true,
                ..BASE
            },
        }
    }
}

impl Display for RouteName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 路由元数据
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteMeta {
    /// 路径模式，`:id` 为参数
    pub path: &'static str,
    pub requires_auth: bool,
    pub requires_role: Option<&'static [&'static str]>,
    pub show_in_navigation: bool,
    /// 未设置时沿用 `show_in_navigation`
    pub show_in_mobile_navigation: Option<bool>,
    pub title: &'static str,
    pub parent_route: Option<RouteName>,
    pub mobile_tab_order: Option<u32>,
    pub icon: Option<&'static str>,
    pub hide_navigation: bool,
    pub hide_in_pwa: bool,
    pub is_scan_button: bool,
}

impl RouteMeta {
    /// 角色门禁：没有角色的会话不受限制
    ///
    /// 空的角色集合仍是门禁：有角色的会话一律拒绝。
    pub fn permits(&self, role: Option<&str>) -> bool {
        match (self.requires_role, role) {
            (None, _) | (Some(_), None) => true,
            (Some(required), Some(role)) => required.contains(&role),
        }
    }

    pub fn shows_in_mobile_navigation(&self) -> bool {
        self.show_in_mobile_navigation
            .unwrap_or(self.show_in_navigation)
    }

    /// 拒绝访问时附带的提示，如 `Access denied: Admin or Event Manager role required`
    pub fn access_denied_message(&self) -> String {
        format!(
            "Access denied: {} role required",
            self.requires_role.unwrap_or_default().join(" or ")
        )
    }
}

// =========================================================
// 路由实例
// =========================================================

/// 应用路由枚举 (携带路径参数)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AppRoute {
    /// 控制面板 (默认路由)
    #[default]
    Dashboard,
    Login,
    Gifts,
    GiftCreate,
    GiftDetail { id: String },
    GiftEdit { id: String },
    Dispatches,
    IssueCreate,
    IssueDetail { id: String },
    Scanner,
    ScannerDebug,
    GiftIssueFlow { id: String },
    Profile,
    Reports,
    Settings,
    CategoryManagement,
    UserManagement,
    GiftRecipientManagement,
    BarcodeReport,
    InterestShowsReport,
    DispatchedGiftsReport,
    PendingDeliveryReport,
    Offline,
    /// 页面未找到，保留原始路径
    NotFound { path: String },
}

impl AppRoute {
    /// 将 URL path (已去掉应用基础路径) 解析为路由枚举
    pub fn from_path(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<String> = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(decode_component)
            .collect();
        let parts: Vec<&str> = segments.iter().map(String::as_str).collect();

        match parts.as_slice() {
            [] => Self::Dashboard,
            ["login"] => Self::Login,
            ["gifts"] => Self::Gifts,
            ["gifts", "new"] => Self::GiftCreate,
            ["gifts", id] => Self::GiftDetail { id: id.to_string() },
            ["gifts", id, "edit"] => Self::GiftEdit { id: id.to_string() },
            ["issues"] => Self::Dispatches,
            ["issues", "new"] => Self::IssueCreate,
            ["issues", id] => Self::IssueDetail { id: id.to_string() },
            ["scan"] => Self::Scanner,
            ["scan", "debug"] => Self::ScannerDebug,
            ["scan", "gift", id] => Self::GiftIssueFlow { id: id.to_string() },
            ["profile"] => Self::Profile,
            ["reports"] => Self::Reports,
            ["reports", "barcode-print"] => Self::BarcodeReport,
            ["reports", "interest-shows"] => Self::InterestShowsReport,
            ["reports", "dispatched-gifts"] => Self::DispatchedGiftsReport,
            ["reports", "pending-delivery"] => Self::PendingDeliveryReport,
            ["settings"] => Self::Settings,
            ["settings", "categories"] => Self::CategoryManagement,
            ["settings", "users"] => Self::UserManagement,
            ["settings", "gift-recipients"] => Self::GiftRecipientManagement,
            ["offline"] => Self::Offline,
            _ => Self::NotFound {
                path: path.to_string(),
            },
        }
    }

    /// 获取路由对应的 URL path
    pub fn to_path(&self) -> String {
        match self {
            Self::GiftDetail { id } => format!("/gifts/{}", encode_component(id)),
            Self::GiftEdit { id } => format!("/gifts/{}/edit", encode_component(id)),
            Self::IssueDetail { id } => format!("/issues/{}", encode_component(id)),
            Self::GiftIssueFlow { id } => format!("/scan/gift/{}", encode_component(id)),
            Self::NotFound { path } => path.clone(),
            other => other.name().meta().path.to_string(),
        }
    }

    pub fn name(&self) -> RouteName {
        match self {
            Self::Dashboard => RouteName::Dashboard,
            Self::Login => RouteName::Login,
            Self::Gifts => RouteName::Gifts,
            Self::GiftCreate => RouteName::GiftCreate,
            Self::GiftDetail { .. } => RouteName::GiftDetail,
            Self::GiftEdit { .. } => RouteName::GiftEdit,
            Self::Dispatches => RouteName::Dispatches,
            Self::IssueCreate => RouteName::IssueCreate,
            Self::IssueDetail { .. } => RouteName::IssueDetail,
            Self::Scanner => RouteName::Scanner,
            Self::ScannerDebug => RouteName::ScannerDebug,
            Self::GiftIssueFlow { .. } => RouteName::GiftIssueFlow,
            Self::Profile => RouteName::Profile,
            Self::Reports => RouteName::Reports,
            Self::Settings => RouteName::Settings,
            Self::CategoryManagement => RouteName::CategoryManagement,
            Self::UserManagement => RouteName::UserManagement,
            Self::GiftRecipientManagement => RouteName::GiftRecipientManagement,
            Self::BarcodeReport => RouteName::BarcodeReport,
            Self::InterestShowsReport => RouteName::InterestShowsReport,
            Self::DispatchedGiftsReport => RouteName::DispatchedGiftsReport,
            Self::PendingDeliveryReport => RouteName::PendingDeliveryReport,
            Self::Offline => RouteName::Offline,
            Self::NotFound { .. } => RouteName::NotFound,
        }
    }

    pub fn meta(&self) -> RouteMeta {
        self.name().meta()
    }

    /// 路径参数 (如果有)
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::GiftDetail { id }
            | Self::GiftEdit { id }
            | Self::IssueDetail { id }
            | Self::GiftIssueFlow { id } => Some(id),
            _ => None,
        }
    }
}

impl Display for AppRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_path())
    }
}

// =========================================================
// Location: 路由 + 查询参数
// =========================================================

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Location {
    pub route: AppRoute,
    pub query: Vec<(String, String)>,
}

impl Location {
    pub fn new(route: AppRoute) -> Self {
        Self {
            route,
            query: Vec::new(),
        }
    }

    pub fn with_query(mut self, key: &str, value: impl Into<String>) -> Self {
        self.query.push((key.to_string(), value.into()));
        self
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// 解析 `path?k=v&...`
    pub fn parse(url: &str) -> Self {
        let (path, query) = url.split_once('?').unwrap_or((url, ""));
        let query = query
            .split('#')
            .next()
            .unwrap_or_default()
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
                (decode_component(k), decode_component(v))
            })
            .collect();
        Self {
            route: AppRoute::from_path(path),
            query,
        }
    }

    /// 渲染为 `path?k=v&...`
    pub fn to_url(&self) -> String {
        let path = self.route.to_path();
        if self.query.is_empty() {
            return path;
        }
        let query = self
            .query
            .iter()
            .map(|(k, v)| format!("{}={}", encode_component(k), encode_component(v)))
            .collect::<Vec<_>>()
            .join("&");
        format!("{}?{}", path, query)
    }
}

impl From<AppRoute> for Location {
    fn from(route: AppRoute) -> Self {
        Self::new(route)
    }
}

/// `encode_component` 的逆操作，`+` 视为空格；非法序列原样保留
pub fn decode_component(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' if i + 2 < bytes.len() => {
                let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).ok();
                match hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                    Some(byte) => {
                        out.push(byte);
                        i += 3;
                    }
                    None => {
                        out.push(b'%');
                        i += 1;
                    }
                }
            }
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            byte => {
                out.push(byte);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_named_route_round_trips() {
        for name in RouteName::ALL {
            if let Some(route) = name.to_route() {
                assert_eq!(AppRoute::from_path(&route.to_path()), route, "{name}");
            }
        }
    }

    #[test]
    fn parameterised_paths() {
        assert_eq!(
            AppRoute::from_path("/gifts/GIFT-0001/edit"),
            AppRoute::GiftEdit {
                id: "GIFT-0001".into()
            }
        );
        assert_eq!(
            AppRoute::from_path("/scan/gift/G%201/"),
            AppRoute::GiftIssueFlow { id: "G 1".into() }
        );
        assert_eq!(
            AppRoute::GiftDetail { id: "G 1".into() }.to_path(),
            "/gifts/G%201"
        );
    }

    #[test]
    fn unknown_paths_are_not_found() {
        assert_eq!(
            AppRoute::from_path("/gifts/a/b/c"),
            AppRoute::NotFound {
                path: "/gifts/a/b/c".into()
            }
        );
        assert_eq!(AppRoute::from_path("/"), AppRoute::Dashboard);
        assert_eq!(AppRoute::from_path(""), AppRoute::Dashboard);
    }

    #[test]
    fn role_rule_is_permissive_without_role() {
        let meta = RouteName::GiftCreate.meta();
        assert!(meta.permits(None));
        assert!(meta.permits(Some("Admin")));
        assert!(!meta.permits(Some("Event Coordinator")));
        assert!(RouteName::Gifts.meta().permits(Some("Anything")));
    }

    #[test]
    fn empty_role_set_only_admits_unassigned() {
        let meta = RouteMeta {
            requires_role: Some(&[]),
            ..RouteName::Gifts.meta()
        };
        assert!(meta.permits(None));
        assert!(!meta.permits(Some("Admin")));
    }

    #[test]
    fn access_denied_message_joins_roles() {
        assert_eq!(
            RouteName::GiftEdit.meta().access_denied_message(),
            "Access denied: Admin or Event Manager role required"
        );
    }

    #[test]
    fn location_round_trip() {
        let loc = Location::new(AppRoute::Gifts)
            .with_query("access_denied", "true")
            .with_query("message", "Access denied: Admin role required");
        let url = loc.to_url();
        assert_eq!(
            url,
            "/gifts?access_denied=true&message=Access%20denied%3A%20Admin%20role%20required"
        );
        assert_eq!(Location::parse(&url), loc);
    }
}
