//! 报表
//!
//! 四种报表结构相同，只有 RPC 路径不同；行数据按列定义通用渲染。

use super::{Listing, failure};
use crate::request::HttpMethod;
use crate::rpc::RpcClient;
use giftdesk_shared::protocol::ListQuery;
use giftdesk_shared::{Page, ReportRow};
use std::fmt::Display;
use std::rc::Rc;
use tracing::info;

/// 导出时一次取回的最大行数
pub const EXPORT_LIMIT: u32 = 10_000;
pub const MSG_EXPORT_FAILED: &str = "Failed to export report";
pub const MSG_INVALID_REPORT: &str = "Invalid report type";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportKind {
    InterestShows,
    DispatchedGifts,
    PendingDelivery,
    BarcodePrint,
}

impl ReportKind {
    pub const ALL: [ReportKind; 4] = [
        ReportKind::InterestShows,
        ReportKind::DispatchedGifts,
        ReportKind::PendingDelivery,
        ReportKind::BarcodePrint,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            ReportKind::InterestShows => "gift.api.get_interest_shows_report",
            ReportKind::DispatchedGifts => "gift.api.get_dispatched_gifts_report",
            ReportKind::PendingDelivery => "gift.api.get_pending_delivery_report",
            ReportKind::BarcodePrint => "gift.api.get_barcode_print_report",
        }
    }

    /// 路由与导出文件名里使用的标识
    pub fn slug(&self) -> &'static str {
        match self {
            ReportKind::InterestShows => "interest-shows",
            ReportKind::DispatchedGifts => "dispatched-gifts",
            ReportKind::PendingDelivery => "pending-delivery",
            ReportKind::BarcodePrint => "barcode-print",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.slug() == slug)
    }

    fn failure_message(&self) -> &'static str {
        match self {
            ReportKind::InterestShows => "Failed to fetch interest shows report",
            ReportKind::DispatchedGifts => "Failed to fetch dispatched gifts report",
            ReportKind::PendingDelivery => "Failed to fetch pending delivery report",
            ReportKind::BarcodePrint => "Failed to fetch barcode print report",
        }
    }
}

impl Display for ReportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

#[derive(Clone)]
pub struct ReportApi {
    rpc: Rc<RpcClient>,
}

impl ReportApi {
    pub fn new(rpc: Rc<RpcClient>) -> Self {
        Self { rpc }
    }

    /// 取一页报表；页码缺省为 1
    pub async fn fetch(&self, kind: ReportKind, query: ListQuery) -> Result<Listing<ReportRow>, String> {
        let page = query.page.unwrap_or(1);
        self.rpc
            .call_path::<_, Page<ReportRow>>(HttpMethod::Get, kind.path(), &query)
            .await
            .map(|p| Listing::from_page(p, page))
            .map_err(failure("reports.fetch", kind.failure_message()))
    }

    pub async fn interest_shows(&self, query: ListQuery) -> Result<Listing<ReportRow>, String> {
        self.fetch(ReportKind::InterestShows, query).await
    }

    pub async fn dispatched_gifts(&self, query: ListQuery) -> Result<Listing<ReportRow>, String> {
        self.fetch(ReportKind::DispatchedGifts, query).await
    }

    pub async fn pending_delivery(&self, query: ListQuery) -> Result<Listing<ReportRow>, String> {
        self.fetch(ReportKind::PendingDelivery, query).await
    }

    pub async fn barcode_print(&self, query: ListQuery) -> Result<Listing<ReportRow>, String> {
        self.fetch(ReportKind::BarcodePrint, query).await
    }

    /// 导出全部行 (上限 [`EXPORT_LIMIT`])，失败时沿用报表自身的错误文案
    pub async fn export(&self, kind: ReportKind, mut query: ListQuery) -> Result<Vec<ReportRow>, String> {
        query.limit = Some(EXPORT_LIMIT);
        let listing = self.fetch(kind, query).await.map_err(|e| {
            if e.is_empty() {
                MSG_EXPORT_FAILED.to_string()
            } else {
                e
            }
        })?;
        info!(report = %kind, rows = listing.data.len(), "report exported");
        Ok(listing.data)
    }

    /// 按路由标识导出
    pub async fn export_slug(&self, slug: &str, query: ListQuery) -> Result<Vec<ReportRow>, String> {
        let kind = ReportKind::from_slug(slug).ok_or_else(|| MSG_INVALID_REPORT.to_string())?;
        self.export(kind, query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::{rpc, url};
    use serde_json::json;

    #[test]
    fn slugs_round_trip() {
        for kind in ReportKind::ALL {
            assert_eq!(ReportKind::from_slug(kind.slug()), Some(kind));
        }
        assert_eq!(ReportKind::from_slug("nope"), None);
    }

    #[tokio::test]
    async fn test_fetch_defaults_page() {
        let (mock, rpc) = rpc();
        let api = ReportApi::new(rpc);
        mock.mock_response(
            HttpMethod::Get,
            &url(ReportKind::PendingDelivery.path()),
            200,
            json!({ "message": { "data": [{ "gift": "G-1", "status": "Pending" }], "total": 1 } }),
        );

        let listing = api
            .pending_delivery(ListQuery::default().filter("from_date", "2025-01-01"))
            .await
            .unwrap();
        assert_eq!(listing.page, 1);
        assert_eq!(listing.data[0]["status"], "Pending");
        assert_eq!(
            mock.last_request().unwrap().query_value("from_date"),
            Some("2025-01-01")
        );
    }

    #[tokio::test]
    async fn test_export_raises_limit() {
        let (mock, rpc) = rpc();
        let api = ReportApi::new(rpc);
        mock.mock_response(
            HttpMethod::Get,
            &url(ReportKind::BarcodePrint.path()),
            200,
            json!({ "message": { "data": [{ "gift_id": "G-1" }, { "gift_id": "G-2" }], "total": 2 } }),
        );

        let rows = api
            .export(ReportKind::BarcodePrint, ListQuery::page(3, 20))
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
        let req = mock.last_request().unwrap();
        assert_eq!(req.query_value("limit"), Some("10000"));
        assert_eq!(req.query_value("page"), Some("3"));
    }

    #[tokio::test]
    async fn test_export_errors() {
        let (mock, rpc) = rpc();
        let api = ReportApi::new(rpc);
        assert_eq!(
            api.export_slug("bogus", ListQuery::default()).await.unwrap_err(),
            MSG_INVALID_REPORT
        );

        mock.mock_raw(HttpMethod::Get, &url(ReportKind::InterestShows.path()), 502, "");
        assert_eq!(
            api.export_slug("interest-shows", ListQuery::default())
                .await
                .unwrap_err(),
            "Failed to fetch interest shows report"
        );
    }
}
