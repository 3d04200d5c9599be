use crate::config::AppConfig;
use crate::error::{ApiError, ApiResult};
use crate::request::{FormPart, HttpClient, HttpMethod, HttpRequest, HttpResponse};

use giftdesk_shared::protocol::ApiRequest;
use giftdesk_shared::{Date, HEADER_CSRF_TOKEN};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::time::Duration;
use tracing::{debug, warn};

// =========================================================
// 会话恢复接口
// =========================================================

/// 401 拦截器回调的会话层能力
///
/// 由会话存储实现，RPC 客户端只持有它的弱引用。
#[async_trait::async_trait(?Send)]
pub trait AuthRecovery {
    /// 向服务器重新确认会话，成功返回 `true`
    async fn refresh_auth_token(&self) -> bool;
    /// 清除内存与持久化的认证数据
    fn clear_auth_data(&self);
}

/// 401 重试状态机
///
/// `Fresh -> RetriedOnce` (刷新成功，重放一次)
/// `Fresh -> Failed` (刷新失败，跳转登录)
/// 后两个状态都是终态，再次收到 401 直接交给调用方。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryState {
    Fresh,
    RetriedOnce,
    Failed,
}

/// 刷新期间置位，drop 时复位
struct RefreshGuard<'a>(&'a Cell<bool>);

impl<'a> RefreshGuard<'a> {
    fn enter(flag: &'a Cell<bool>) -> Self {
        flag.set(true);
        Self(flag)
    }
}

impl Drop for RefreshGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

// =========================================================
// RPC Client
// =========================================================

pub struct RpcClient {
    http: Rc<dyn HttpClient>,
    /// e.g. "/api/method"
    base_url: String,
    timeout: Duration,
    /// 发送时读取页面上的 CSRF token
    csrf: RefCell<Option<Rc<dyn Fn() -> Option<String>>>>,
    recovery: RefCell<Option<Weak<dyn AuthRecovery>>>,
    on_login_required: RefCell<Option<Rc<dyn Fn()>>>,
    refreshing: Cell<bool>,
}

impl RpcClient {
    pub fn new(http: Rc<dyn HttpClient>, config: &AppConfig) -> Self {
        Self {
            http,
            base_url: config.api_base.clone(),
            timeout: config.timeout,
            csrf: RefCell::new(None),
            recovery: RefCell::new(None),
            on_login_required: RefCell::new(None),
            refreshing: Cell::new(false),
        }
    }

    pub fn set_csrf_source(&self, source: impl Fn() -> Option<String> + 'static) {
        *self.csrf.borrow_mut() = Some(Rc::new(source));
    }

    pub fn set_recovery(&self, recovery: Weak<dyn AuthRecovery>) {
        *self.recovery.borrow_mut() = Some(recovery);
    }

    /// 会话恢复失败后的跳转 (浏览器端为替换到登录页)
    pub fn set_login_redirect(&self, hook: impl Fn() + 'static) {
        *self.on_login_required.borrow_mut() = Some(Rc::new(hook));
    }

    pub fn is_online(&self) -> bool {
        self.http.is_online()
    }

    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') || path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    // --- 强类型调用 ---

    /// 经过 401 拦截的调用
    pub async fn call<R: ApiRequest>(&self, req: &R) -> ApiResult<R::Response> {
        let payload = serde_json::to_value(req)?;
        let request = self.build(R::METHOD, R::PATH, &payload);
        let response = self.execute(request, true).await?;
        decode(R::PATH, response, R::ENVELOPED)
    }

    /// 不经过拦截器的调用，会话端点 (login / logout / get_logged_user) 使用
    pub async fn call_raw<R: ApiRequest>(&self, req: &R) -> ApiResult<R::Response> {
        let payload = serde_json::to_value(req)?;
        let request = self.build(R::METHOD, R::PATH, &payload);
        let response = self.execute(request, false).await?;
        decode(R::PATH, response, R::ENVELOPED)
    }

    /// 路径在运行时决定的调用 (报表)
    pub async fn call_path<P, T>(&self, method: HttpMethod, path: &str, payload: &P) -> ApiResult<T>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let payload = serde_json::to_value(payload)?;
        let request = self.build(method, path, &payload);
        let response = self.execute(request, true).await?;
        decode(path, response, true)
    }

    /// multipart 上传
    pub async fn upload<T: DeserializeOwned>(&self, path: &str, parts: Vec<FormPart>) -> ApiResult<T> {
        let request = HttpRequest::new(&self.url(path), HttpMethod::Post)
            .with_header("Accept", "application/json")
            .with_multipart(parts)
            .with_timeout(self.timeout);
        let response = self.execute(request, true).await?;
        decode(path, response, true)
    }

    /// 删除 REST 资源，只关心状态码
    pub async fn delete_resource(&self, path: &str) -> ApiResult<()> {
        let request = HttpRequest::new(&self.url(path), HttpMethod::Delete)
            .with_header("Accept", "application/json")
            .with_timeout(self.timeout);
        let response = self.execute(request, true).await?;
        if response.is_success() {
            Ok(())
        } else {
            Err(ApiError::from_status(response.status, &response.body))
        }
    }

    // --- 管道 ---

    fn build(&self, method: HttpMethod, path: &str, payload: &Value) -> HttpRequest {
        let mut request = HttpRequest::new(&self.url(path), method)
            .with_header("Accept", "application/json")
            .with_header("Content-Type", "application/json")
            .with_timeout(self.timeout);

        match method {
            HttpMethod::Get => {
                request.query = to_query(payload);
                // 防止浏览器缓存 GET
                request = request.with_query("_t", Date::now_timestamp().as_millis().to_string());
            }
            HttpMethod::Delete => {}
            HttpMethod::Post | HttpMethod::Put => {
                let body = if payload.is_null() {
                    Value::Object(Default::default())
                } else {
                    payload.clone()
                };
                request = request.with_json(&body);
            }
        }
        request
    }

    /// 发送并处理 401：刷新会话后最多重放一次
    async fn execute(&self, request: HttpRequest, intercept: bool) -> ApiResult<HttpResponse> {
        let mut state = RetryState::Fresh;
        loop {
            let response = self.dispatch(request.clone()).await?;
            if response.status != 401 || !intercept {
                return Ok(response);
            }

            match state {
                RetryState::Fresh => {
                    if self.refreshing.get() {
                        // 刷新流程内部的请求再次 401，不再递归恢复
                        warn!(url = %request.url, "401 during session refresh, surfacing");
                        return Ok(response);
                    }
                    state = if self.recover().await {
                        RetryState::RetriedOnce
                    } else {
                        RetryState::Failed
                    };
                    if state == RetryState::Failed {
                        self.fail_session();
                        return Ok(response);
                    }
                    debug!(url = %request.url, "session refreshed, retrying once");
                }
                RetryState::RetriedOnce | RetryState::Failed => {
                    warn!(url = %request.url, ?state, "401 after recovery, surfacing");
                    return Ok(response);
                }
            }
        }
    }

    async fn dispatch(&self, request: HttpRequest) -> ApiResult<HttpResponse> {
        let token = self
            .csrf
            .borrow()
            .as_ref()
            .and_then(|source| source())
            .unwrap_or_default();
        let request = request.with_header(HEADER_CSRF_TOKEN, &token);

        let url = request.url.clone();
        let method = request.method;
        match self.http.send(request).await {
            Ok(response) => {
                debug!(method = method.as_str(), %url, status = response.status, "rpc response");
                Ok(response)
            }
            Err(e) => {
                warn!(method = method.as_str(), %url, error = %e, "rpc transport failure");
                if self.http.is_online() {
                    Err(e)
                } else {
                    Err(ApiError::Offline)
                }
            }
        }
    }

    async fn recover(&self) -> bool {
        let recovery = self.recovery.borrow().as_ref().and_then(Weak::upgrade);
        let Some(recovery) = recovery else {
            return false;
        };
        let _guard = RefreshGuard::enter(&self.refreshing);
        recovery.refresh_auth_token().await
    }

    fn fail_session(&self) {
        warn!("session recovery failed, redirecting to login");
        let recovery = self.recovery.borrow().as_ref().and_then(Weak::upgrade);
        if let Some(recovery) = recovery {
            recovery.clear_auth_data();
        }
        let hook = self.on_login_required.borrow().clone();
        if let Some(hook) = hook {
            hook();
        }
    }
}

// =========================================================
// 编解码工具
// =========================================================

/// 把 JSON 对象展开成查询参数
///
/// `null` 被跳过，字符串原样使用，数组与对象编码为 JSON 文本 (框架的 `fields`/`filters` 约定)。
pub fn to_query(payload: &Value) -> Vec<(String, String)> {
    let Value::Object(map) = payload else {
        return Vec::new();
    };
    map.iter()
        .filter_map(|(key, value)| {
            let text = match value {
                Value::Null => return None,
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            Some((key.clone(), text))
        })
        .collect()
}

/// 校验状态码并拆开 `{ message }` 信封
///
/// 信封缺失时退回整个响应体。
fn decode<T: DeserializeOwned>(path: &str, response: HttpResponse, enveloped: bool) -> ApiResult<T> {
    if !response.is_success() {
        return Err(ApiError::from_status(response.status, &response.body));
    }

    let body: Value = response.json().map_err(|e| {
        warn!(path, "response is not JSON");
        e
    })?;

    let payload = if enveloped {
        match body {
            Value::Object(mut map) => match map.remove("message") {
                Some(message) if !message.is_null() => message,
                _ => Value::Object(map),
            },
            other => other,
        }
    } else {
        body
    };

    serde_json::from_value(payload).map_err(|e| ApiError::Decode(format!("{}: {}", path, e)))
}

#[cfg(test)]
mod tests;
