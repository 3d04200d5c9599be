use super::*;
use crate::request::MockHttpClient;
use giftdesk_shared::protocol::{GetGiftRequest, ListGiftsRequest, ListQuery, LoggedUserRequest, NameRef};
use giftdesk_shared::{Gift, Page};
use serde_json::json;

const GIFTS_URL: &str = "/api/method/gift.api.get_gifts";
const GIFT_URL: &str = "/api/method/gift.api.get_gift";
const LOGGED_USER_URL: &str = "/api/method/frappe.auth.get_logged_user";

// =========================================================
// 辅助函数
// =========================================================

struct FakeRecovery {
    succeed: bool,
    refreshes: Cell<u32>,
    cleared: Cell<bool>,
    /// 刷新过程中要顺带发起的请求，用来模拟 refresh -> role load -> 401
    nested: RefCell<Option<Rc<RpcClient>>>,
}

impl FakeRecovery {
    fn new(succeed: bool) -> Rc<Self> {
        Rc::new(Self {
            succeed,
            refreshes: Cell::new(0),
            cleared: Cell::new(false),
            nested: RefCell::new(None),
        })
    }
}

#[async_trait::async_trait(?Send)]
impl AuthRecovery for FakeRecovery {
    async fn refresh_auth_token(&self) -> bool {
        self.refreshes.set(self.refreshes.get() + 1);
        let nested = self.nested.borrow().clone();
        if let Some(rpc) = nested {
            let _ = rpc.call(&GetGiftRequest(NameRef::new("G-1"))).await;
        }
        self.succeed
    }

    fn clear_auth_data(&self) {
        self.cleared.set(true);
    }
}

fn setup() -> (Rc<MockHttpClient>, Rc<RpcClient>) {
    let mock = Rc::new(MockHttpClient::new());
    let rpc = Rc::new(RpcClient::new(mock.clone(), &AppConfig::default()));
    (mock, rpc)
}

fn attach(rpc: &RpcClient, recovery: &Rc<FakeRecovery>) {
    let recovery: Rc<dyn AuthRecovery> = recovery.clone();
    rpc.set_recovery(Rc::downgrade(&recovery));
}

// =========================================================
// 请求构造
// =========================================================

#[tokio::test]
async fn test_get_carries_cache_buster_and_csrf() {
    let (mock, rpc) = setup();
    rpc.set_csrf_source(|| Some("tok-123".to_string()));
    mock.mock_response(
        HttpMethod::Get,
        GIFTS_URL,
        200,
        json!({ "message": { "data": [{ "name": "G-1" }], "total": 1, "page": 1, "total_pages": 1 } }),
    );

    let page: Page<Gift> = rpc
        .call(&ListGiftsRequest(ListQuery::page(1, 20).filter("status", "Available")))
        .await
        .unwrap();
    assert_eq!(page.data[0].name, "G-1");

    let req = mock.last_request().unwrap();
    assert!(req.query_value("_t").is_some());
    assert_eq!(req.query_value("status"), Some("Available"));
    assert_eq!(req.header(HEADER_CSRF_TOKEN), Some("tok-123"));
    assert_eq!(req.body, crate::request::RequestBody::Empty);
}

#[tokio::test]
async fn test_missing_csrf_sends_empty_header() {
    let (mock, rpc) = setup();
    mock.mock_response(HttpMethod::Get, LOGGED_USER_URL, 200, json!({ "message": "a@b.com" }));

    let user = rpc.call_raw(&LoggedUserRequest).await.unwrap();
    assert_eq!(user, "a@b.com");
    assert_eq!(mock.last_request().unwrap().header(HEADER_CSRF_TOKEN), Some(""));
}

#[tokio::test]
async fn test_post_sends_json_without_cache_buster() {
    let (mock, rpc) = setup();
    let url = "/api/method/gift.api.delete_gift";
    mock.mock_response(HttpMethod::Post, url, 200, json!({ "message": "deleted" }));

    let reply = rpc
        .call(&giftdesk_shared::protocol::DeleteGiftRequest(NameRef::new("G-9")))
        .await
        .unwrap();
    assert_eq!(reply, json!("deleted"));

    let req = mock.last_request().unwrap();
    assert!(req.query_value("_t").is_none());
    assert_eq!(
        req.body,
        crate::request::RequestBody::Json(json!({ "name": "G-9" }).to_string())
    );
}

#[test]
fn test_to_query_encodes_nested_values_as_json() {
    let query = to_query(&json!({
        "doctype": "File",
        "limit": 1,
        "fields": ["name"],
        "skip": null
    }));
    assert_eq!(
        query,
        vec![
            ("doctype".to_string(), "File".to_string()),
            ("fields".to_string(), "[\"name\"]".to_string()),
            ("limit".to_string(), "1".to_string()),
        ]
    );
}

// =========================================================
// 401 拦截
// =========================================================

#[tokio::test]
async fn test_401_refresh_then_single_retry() {
    let (mock, rpc) = setup();
    let recovery = FakeRecovery::new(true);
    attach(&rpc, &recovery);

    mock.mock_raw(HttpMethod::Get, GIFT_URL, 401, "{}");
    mock.mock_response(HttpMethod::Get, GIFT_URL, 200, json!({ "message": { "name": "G-1" } }));

    let gift = rpc.call(&GetGiftRequest(NameRef::new("G-1"))).await.unwrap();
    assert_eq!(gift.name, "G-1");
    assert_eq!(recovery.refreshes.get(), 1);
    assert_eq!(mock.count(HttpMethod::Get, GIFT_URL), 2);
    assert!(!recovery.cleared.get());
}

#[tokio::test]
async fn test_second_401_is_surfaced() {
    let (mock, rpc) = setup();
    let recovery = FakeRecovery::new(true);
    attach(&rpc, &recovery);
    mock.mock_raw(HttpMethod::Get, GIFT_URL, 401, "{}");

    let err = rpc.call(&GetGiftRequest(NameRef::new("G-1"))).await.unwrap_err();
    assert!(err.is_unauthorized());
    // 只刷新一次、只重放一次
    assert_eq!(recovery.refreshes.get(), 1);
    assert_eq!(mock.count(HttpMethod::Get, GIFT_URL), 2);
}

#[tokio::test]
async fn test_failed_refresh_clears_and_redirects() {
    let (mock, rpc) = setup();
    let recovery = FakeRecovery::new(false);
    attach(&rpc, &recovery);
    let redirected = Rc::new(Cell::new(false));
    let flag = redirected.clone();
    rpc.set_login_redirect(move || flag.set(true));
    mock.mock_raw(HttpMethod::Get, GIFT_URL, 401, "{}");

    let err = rpc.call(&GetGiftRequest(NameRef::new("G-1"))).await.unwrap_err();
    assert_eq!(err.status(), Some(401));
    assert!(recovery.cleared.get());
    assert!(redirected.get());
    assert_eq!(mock.count(HttpMethod::Get, GIFT_URL), 1);
}

#[tokio::test]
async fn test_raw_calls_skip_interceptor() {
    let (mock, rpc) = setup();
    let recovery = FakeRecovery::new(true);
    attach(&rpc, &recovery);
    mock.mock_raw(HttpMethod::Get, LOGGED_USER_URL, 401, "{}");

    let err = rpc.call_raw(&LoggedUserRequest).await.unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(recovery.refreshes.get(), 0);
}

#[tokio::test]
async fn test_401_inside_refresh_does_not_recurse() {
    let (mock, rpc) = setup();
    let recovery = FakeRecovery::new(false);
    *recovery.nested.borrow_mut() = Some(rpc.clone());
    attach(&rpc, &recovery);
    mock.mock_raw(HttpMethod::Get, GIFT_URL, 401, "{}");

    let err = rpc.call(&GetGiftRequest(NameRef::new("G-1"))).await.unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(recovery.refreshes.get(), 1);
    // 外层一次 + 刷新内部一次
    assert_eq!(mock.count(HttpMethod::Get, GIFT_URL), 2);
    assert!(!rpc.refreshing.get());
}

#[tokio::test]
async fn test_dropped_recovery_fails_closed() {
    let (mock, rpc) = setup();
    {
        let recovery = FakeRecovery::new(true);
        attach(&rpc, &recovery);
    }
    mock.mock_raw(HttpMethod::Get, GIFT_URL, 401, "{}");

    let err = rpc.call(&GetGiftRequest(NameRef::new("G-1"))).await.unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(mock.count(HttpMethod::Get, GIFT_URL), 1);
}

// =========================================================
// 错误分类
// =========================================================

#[tokio::test]
async fn test_transport_failure_while_offline_is_offline() {
    let (mock, rpc) = setup();
    mock.online.set(false);
    mock.mock_failure(HttpMethod::Get, GIFT_URL, ApiError::Transport("failed to fetch".into()));

    let err = rpc.call(&GetGiftRequest(NameRef::new("G-1"))).await.unwrap_err();
    assert_eq!(err, ApiError::Offline);
}

#[tokio::test]
async fn test_error_body_message_is_kept() {
    let (mock, rpc) = setup();
    mock.mock_response(
        HttpMethod::Get,
        GIFT_URL,
        404,
        json!({ "message": "Gift G-404 not found" }),
    );

    let err = rpc.call(&GetGiftRequest(NameRef::new("G-404"))).await.unwrap_err();
    assert_eq!(err.user_message("Failed to fetch gift"), "Gift G-404 not found");
}

#[tokio::test]
async fn test_non_json_success_is_decode_error() {
    let (mock, rpc) = setup();
    mock.mock_raw(HttpMethod::Get, GIFT_URL, 200, "<html>proxy</html>");

    let err = rpc.call(&GetGiftRequest(NameRef::new("G-1"))).await.unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)));
}
