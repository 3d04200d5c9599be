//! 礼品库存与派发客户端核心
//!
//! 平台无关：HTTP、持久化与定时器都以 trait 注入，浏览器实现位于 `frontend/src/web`。

pub mod api;
pub mod composables;
pub mod config;
pub mod error;
pub mod guard;
pub mod request;
pub mod route;
pub mod rpc;
pub mod scheduler;
pub mod session;
pub mod storage;
pub mod ui_state;

use api::Api;
use config::AppConfig;
use guard::NavigationGuard;
use request::HttpClient;
use rpc::RpcClient;
use scheduler::Scheduler;
use session::SessionStore;
use std::rc::Rc;
use storage::KeyValueStore;
use tracing::info;
use ui_state::UiState;

pub use error::{ApiError, ApiResult};

// =========================================================
// 平台能力 (Platform)
// =========================================================

/// 由宿主环境提供的底层实现
pub struct Platform {
    pub http: Rc<dyn HttpClient>,
    pub storage: Rc<dyn KeyValueStore>,
    pub scheduler: Rc<dyn Scheduler>,
    pub screen_width: u32,
}

// =========================================================
// 服务装配 (Service Wiring)
// =========================================================

/// 应用级单例集合，视图层通过上下文共享
pub struct Services {
    pub config: AppConfig,
    pub rpc: Rc<RpcClient>,
    pub session: Rc<SessionStore>,
    pub api: Api,
    pub guard: Rc<NavigationGuard>,
    pub ui: Rc<UiState>,
}

impl Services {
    pub fn new(config: AppConfig, platform: Platform) -> Self {
        let is_online = platform.http.is_online();
        let rpc = Rc::new(RpcClient::new(platform.http, &config));
        // 会话存储在构造时向 RPC 客户端注册 401 恢复入口
        let session = SessionStore::new(rpc.clone(), platform.storage.clone());
        let api = Api::new(rpc.clone(), &config);
        let guard = Rc::new(NavigationGuard::new(session.clone(), config.app_name.clone()));
        let ui = UiState::new(
            platform.storage,
            platform.scheduler,
            platform.screen_width,
            is_online,
        );

        info!(
            api_base = %config.api_base,
            authenticated = session.is_authenticated(),
            "services ready"
        );

        Self {
            config,
            rpc,
            session,
            api,
            guard,
            ui,
        }
    }

    /// 把接口错误转为提示文案并弹出错误通知
    pub fn report_error(&self, error: &str) -> String {
        self.ui.show_error(error, Default::default())
    }
}

// =========================================================
// 单元测试 (Unit Tests)
// =========================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::guard::GuardDecision;
    use crate::request::{HttpMethod, MockHttpClient};
    use crate::route::{AppRoute, Location};
    use crate::scheduler::ManualScheduler;
    use crate::storage::MemoryStore;
    use giftdesk_shared::protocol::ListQuery;
    use serde_json::json;

    fn services() -> (Rc<MockHttpClient>, Services) {
        let mock = Rc::new(MockHttpClient::new());
        let platform = Platform {
            http: mock.clone(),
            storage: Rc::new(MemoryStore::new()),
            scheduler: ManualScheduler::new(),
            screen_width: 1280,
        };
        (mock, Services::new(AppConfig::default(), platform))
    }

    #[tokio::test]
    async fn test_anonymous_navigation_goes_to_login() {
        let (mock, services) = services();
        mock.mock_response(
            HttpMethod::Get,
            "/api/method/frappe.auth.get_logged_user",
            401,
            json!({}),
        );

        let outcome = services
            .guard
            .before_each(&Location::from(AppRoute::Gifts))
            .await;
        assert_eq!(
            outcome.decision,
            GuardDecision::Redirect(AppRoute::Login.into())
        );
        assert!(services.ui.is_desktop());
    }

    #[tokio::test]
    async fn test_api_failure_becomes_notification() {
        let (mock, services) = services();
        mock.mock_response(
            HttpMethod::Get,
            "/api/method/gift.api.get_gifts",
            500,
            json!({}),
        );

        let err = services
            .api
            .gifts
            .list(ListQuery::default())
            .await
            .unwrap_err();
        services.report_error(&err);

        let notifications = services.ui.notifications();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].message, err);
        assert!(!notifications[0].auto_remove);
    }
}
