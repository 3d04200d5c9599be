use crate::error::{ApiError, ApiResult};
use giftdesk_shared::FileBlob;
use serde::de::DeserializeOwned;
use std::time::Duration;

pub use giftdesk_shared::protocol::HttpMethod;

#[cfg(test)]
use std::{
    cell::{Cell, RefCell},
    collections::{HashMap, VecDeque},
};

// =========================================================
// 核心抽象层 (HTTP Interface Abstraction)
// =========================================================

/// multipart 表单字段
#[derive(Debug, Clone, PartialEq)]
pub enum FormPart {
    Text { name: String, value: String },
    File { name: String, blob: FileBlob },
}

impl FormPart {
    pub fn text(name: &str, value: impl Into<String>) -> Self {
        FormPart::Text {
            name: name.to_string(),
            value: value.into(),
        }
    }

    pub fn file(name: &str, blob: FileBlob) -> Self {
        FormPart::File {
            name: name.to_string(),
            blob,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            FormPart::Text { name, .. } | FormPart::File { name, .. } => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    /// 已序列化的 JSON 文本
    Json(String),
    /// 由传输层编码为 `multipart/form-data`，边界也由传输层生成
    Multipart(Vec<FormPart>),
}

// 增加 Clone 以支持 401 之后的重放
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub url: String,
    pub method: HttpMethod,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    pub fn new(url: &str, method: HttpMethod) -> Self {
        Self {
            url: url.to_string(),
            method,
            headers: Vec::new(),
            query: Vec::new(),
            body: RequestBody::Empty,
            timeout: None,
        }
    }

    /// 同名 Header 覆盖旧值
    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(key));
        self.headers.push((key.to_string(), value.to_string()));
        self
    }

    pub fn with_query(mut self, key: &str, value: impl Into<String>) -> Self {
        self.query.push((key.to_string(), value.into()));
        self
    }

    pub fn with_json(mut self, body: &serde_json::Value) -> Self {
        self.body = RequestBody::Json(body.to_string());
        self
    }

    pub fn with_multipart(mut self, parts: Vec<FormPart>) -> Self {
        self.body = RequestBody::Multipart(parts);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// 带查询串的完整 URL
    pub fn full_url(&self) -> String {
        if self.query.is_empty() {
            return self.url.clone();
        }
        let query = self
            .query
            .iter()
            .map(|(k, v)| format!("{}={}", encode_component(k), encode_component(v)))
            .collect::<Vec<_>>()
            .join("&");
        let sep = if self.url.contains('?') { '&' } else { '?' };
        format!("{}{}{}", self.url, sep, query)
    }
}

/// 按 `encodeURIComponent` 的规则编码
pub fn encode_component(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => out.push(byte as char),
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: DeserializeOwned>(&self) -> ApiResult<T> {
        serde_json::from_str(&self.body).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

/// 传输层接口
///
/// 浏览器端由 fetch 实现 (携带 cookie)，测试中由 [`MockHttpClient`] 实现。
/// 只有传输失败才返回 `Err`，任何状态码都作为 `Ok(HttpResponse)` 交回。
#[async_trait::async_trait(?Send)]
pub trait HttpClient {
    async fn send(&self, req: HttpRequest) -> ApiResult<HttpResponse>;

    /// 网络可达性 (浏览器的 `navigator.onLine`)
    fn is_online(&self) -> bool {
        true
    }
}

// =========================================================
// 测试工具: MockHttpClient
// =========================================================

#[cfg(test)]
#[derive(Debug, Clone)]
pub enum MockReply {
    Respond(u16, String),
    Fail(ApiError),
}

/// 按 `METHOD url` (不含查询串) 排队返回响应
///
/// 队列只剩最后一条时重复返回它，未登记的地址返回 404。
#[cfg(test)]
pub struct MockHttpClient {
    replies: RefCell<HashMap<String, VecDeque<MockReply>>>,
    pub requests: RefCell<Vec<HttpRequest>>,
    pub online: Cell<bool>,
}

#[cfg(test)]
impl MockHttpClient {
    pub fn new() -> Self {
        Self {
            replies: RefCell::new(HashMap::new()),
            requests: RefCell::new(Vec::new()),
            online: Cell::new(true),
        }
    }

    fn key(method: HttpMethod, url: &str) -> String {
        format!("{} {}", method.as_str(), url)
    }

    pub fn mock_response(&self, method: HttpMethod, url: &str, status: u16, body: serde_json::Value) {
        self.replies
            .borrow_mut()
            .entry(Self::key(method, url))
            .or_default()
            .push_back(MockReply::Respond(status, body.to_string()));
    }

    pub fn mock_raw(&self, method: HttpMethod, url: &str, status: u16, body: &str) {
        self.replies
            .borrow_mut()
            .entry(Self::key(method, url))
            .or_default()
            .push_back(MockReply::Respond(status, body.to_string()));
    }

    pub fn mock_failure(&self, method: HttpMethod, url: &str, error: ApiError) {
        self.replies
            .borrow_mut()
            .entry(Self::key(method, url))
            .or_default()
            .push_back(MockReply::Fail(error));
    }

    /// 发往某个地址的请求次数
    pub fn count(&self, method: HttpMethod, url: &str) -> usize {
        self.requests
            .borrow()
            .iter()
            .filter(|r| r.method == method && r.url == url)
            .count()
    }

    pub fn last_request(&self) -> Option<HttpRequest> {
        self.requests.borrow().last().cloned()
    }
}

#[cfg(test)]
#[async_trait::async_trait(?Send)]
impl HttpClient for MockHttpClient {
    async fn send(&self, req: HttpRequest) -> ApiResult<HttpResponse> {
        let key = Self::key(req.method, &req.url);
        self.requests.borrow_mut().push(req);

        let reply = {
            let mut replies = self.replies.borrow_mut();
            match replies.get_mut(&key) {
                Some(queue) if queue.len() > 1 => queue.pop_front(),
                Some(queue) => queue.front().cloned(),
                None => None,
            }
        };

        match reply {
            Some(MockReply::Respond(status, body)) => Ok(HttpResponse::new(status, body)),
            Some(MockReply::Fail(error)) => Err(error),
            None => Ok(HttpResponse::new(404, "Not Found")),
        }
    }

    fn is_online(&self) -> bool {
        self.online.get()
    }
}
