//! 礼品意向

use super::{Listing, failure, reply_message};
use crate::rpc::RpcClient;
use giftdesk_shared::protocol::{
    CreateInterestRequest, DeleteInterestRequest, GetInterestRequest, ListInterestsRequest,
    ListQuery, NameRef, UpdateInterestRequest,
};
use giftdesk_shared::{Extra, GiftInterest};
use serde_json::Value;
use std::rc::Rc;

pub const MSG_DELETED: &str = "Gift interest deleted successfully";
const MSG_LIST_FAILED: &str = "Failed to fetch gift interests";

#[derive(Clone)]
pub struct InterestApi {
    rpc: Rc<RpcClient>,
}

impl InterestApi {
    pub fn new(rpc: Rc<RpcClient>) -> Self {
        Self { rpc }
    }

    pub async fn list(&self, query: ListQuery) -> Result<Listing<GiftInterest>, String> {
        let page = query.page.unwrap_or(1);
        self.rpc
            .call(&ListInterestsRequest(query))
            .await
            .map(|p| Listing::from_page(p, page))
            .map_err(failure("interests.list", MSG_LIST_FAILED))
    }

    /// 某个礼品收到的全部意向
    pub async fn by_gift(&self, gift_id: &str) -> Result<Listing<GiftInterest>, String> {
        self.list(ListQuery::default().filter("gift", gift_id)).await
    }

    pub async fn get(&self, id: &str) -> Result<GiftInterest, String> {
        self.rpc
            .call(&GetInterestRequest(NameRef::new(id)))
            .await
            .map_err(failure("interests.get", "Failed to fetch gift interest"))
    }

    pub async fn create(&self, fields: Extra) -> Result<Value, String> {
        self.rpc
            .call(&CreateInterestRequest(fields))
            .await
            .map_err(failure("interests.create", "Failed to create gift interest"))
    }

    pub async fn update(&self, id: &str, fields: Extra) -> Result<Value, String> {
        let req = UpdateInterestRequest {
            name: id.to_string(),
            fields,
        };
        self.rpc
            .call(&req)
            .await
            .map_err(failure("interests.update", "Failed to update gift interest"))
    }

    pub async fn delete(&self, id: &str) -> Result<String, String> {
        self.rpc
            .call(&DeleteInterestRequest(NameRef::new(id)))
            .await
            .map(|reply| reply_message(&reply, MSG_DELETED))
            .map_err(failure("interests.delete", "Failed to delete gift interest"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::{rpc, url};
    use crate::request::{HttpMethod, RequestBody};
    use serde_json::json;

    #[tokio::test]
    async fn test_by_gift_filters() {
        let (mock, rpc) = rpc();
        let api = InterestApi::new(rpc);
        mock.mock_response(
            HttpMethod::Get,
            &url("gift.api.get_gift_interests"),
            200,
            json!({ "message": { "data": [{ "name": "INT-1", "gift": "G-1" }], "total": 1 } }),
        );

        let listing = api.by_gift("G-1").await.unwrap();
        assert_eq!(listing.data[0].gift.as_deref(), Some("G-1"));
        assert_eq!(mock.last_request().unwrap().query_value("gift"), Some("G-1"));
    }

    #[tokio::test]
    async fn test_update_merges_name() {
        let (mock, rpc) = rpc();
        let api = InterestApi::new(rpc);
        let path = url("gift.api.update_gift_interest");
        mock.mock_response(HttpMethod::Post, &path, 200, json!({ "message": {} }));

        let mut fields = Extra::new();
        fields.insert("remarks".into(), json!("VIP"));
        api.update("INT-1", fields).await.unwrap();
        assert_eq!(
            mock.last_request().unwrap().body,
            RequestBody::Json(json!({ "name": "INT-1", "remarks": "VIP" }).to_string())
        );
    }

    #[tokio::test]
    async fn test_list_failure_message() {
        let (mock, rpc) = rpc();
        let api = InterestApi::new(rpc);
        mock.mock_raw(HttpMethod::Get, &url("gift.api.get_gift_interests"), 503, "");
        assert_eq!(
            api.list(ListQuery::default()).await.unwrap_err(),
            MSG_LIST_FAILED
        );
    }
}
