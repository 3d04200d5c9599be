//! 业务 API 封装
//!
//! 每个实体一个模块，把界面调用翻译成 RPC 调用，
//! 并把框架信封统一成 `Result<T, String>`：错误一律是可以直接展示的文案。

pub mod categories;
pub mod files;
pub mod gifts;
pub mod interests;
pub mod issues;
pub mod recipients;
pub mod reports;
pub mod users;

pub use categories::CategoryApi;
pub use files::FileApi;
pub use gifts::GiftApi;
pub use interests::InterestApi;
pub use issues::IssueApi;
pub use recipients::RecipientApi;
pub use reports::{ReportApi, ReportKind};
pub use users::UserApi;

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::rpc::RpcClient;
use giftdesk_shared::Page;
use serde_json::Value;
use std::rc::Rc;
use tracing::warn;

/// 列表结果，分页字段已按请求值补齐
#[derive(Debug, Clone, PartialEq)]
pub struct Listing<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub total_pages: u32,
}

impl<T> Listing<T> {
    pub(crate) fn from_page(page: Page<T>, requested: u32) -> Self {
        Self {
            page: page.page_or(requested),
            total_pages: page.total_pages_or_one(),
            total: page.total,
            data: page.data,
        }
    }
}

/// 把 [`ApiError`] 记录下来并换成展示文案
pub(crate) fn failure(operation: &'static str, default: &'static str) -> impl Fn(ApiError) -> String {
    move |e| {
        warn!(operation, error = %e, "api call failed");
        e.user_message(default)
    }
}

/// 删除类接口：服务器给出的文案优先
pub(crate) fn reply_message(reply: &Value, fallback: &str) -> String {
    match reply {
        Value::String(s) if !s.is_empty() => s.clone(),
        _ => fallback.to_string(),
    }
}

/// 全部业务 API 的集合
#[derive(Clone)]
pub struct Api {
    pub gifts: GiftApi,
    pub categories: CategoryApi,
    pub issues: IssueApi,
    pub interests: InterestApi,
    pub users: UserApi,
    pub recipients: RecipientApi,
    pub reports: ReportApi,
    pub files: FileApi,
}

impl Api {
    pub fn new(rpc: Rc<RpcClient>, config: &AppConfig) -> Self {
        Self {
            gifts: GiftApi::new(rpc.clone(), config.page_size),
            categories: CategoryApi::new(rpc.clone()),
            issues: IssueApi::new(rpc.clone()),
            interests: InterestApi::new(rpc.clone()),
            users: UserApi::new(rpc.clone()),
            recipients: RecipientApi::new(rpc.clone()),
            reports: ReportApi::new(rpc.clone()),
            files: FileApi::new(rpc, config.upload.clone()),
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::config::AppConfig;
    use crate::request::MockHttpClient;
    use crate::rpc::RpcClient;
    use std::rc::Rc;

    pub const METHOD_BASE: &str = "/api/method";

    pub fn url(path: &str) -> String {
        format!("{}/{}", METHOD_BASE, path)
    }

    pub fn rpc() -> (Rc<MockHttpClient>, Rc<RpcClient>) {
        let mock = Rc::new(MockHttpClient::new());
        let rpc = Rc::new(RpcClient::new(mock.clone(), &AppConfig::default()));
        (mock, rpc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn listing_fills_missing_paging() {
        let page: Page<Value> = serde_json::from_value(json!({ "data": [1, 2], "total": 2 })).unwrap();
        let listing = Listing::from_page(page, 3);
        assert_eq!(listing.page, 3);
        assert_eq!(listing.total_pages, 1);
        assert_eq!(listing.data.len(), 2);
    }

    #[test]
    fn reply_message_prefers_server_text() {
        assert_eq!(reply_message(&json!("Removed"), "Deleted"), "Removed");
        assert_eq!(reply_message(&json!(""), "Deleted"), "Deleted");
        assert_eq!(reply_message(&json!({ "ok": true }), "Deleted"), "Deleted");
    }
}
