//! 礼品发放 (dispatch / issue)

use super::{Listing, failure, reply_message};
use crate::rpc::RpcClient;
use giftdesk_shared::protocol::{
    DeleteIssueRequest, DispatchHistoryRequest, GetIssueRequest, ListIssuesRequest, ListQuery,
    NameRef, UpdateIssueRequest, ValidateEmiratesIdRequest,
};
use giftdesk_shared::{DeliveryStatusUpdate, GiftIssue, IssueDraft};
use serde_json::Value;
use std::rc::Rc;

pub const MSG_DELETED: &str = "Gift dispatch deleted successfully";

#[derive(Clone)]
pub struct IssueApi {
    rpc: Rc<RpcClient>,
}

impl IssueApi {
    pub fn new(rpc: Rc<RpcClient>) -> Self {
        Self { rpc }
    }

    pub async fn list(&self, query: ListQuery) -> Result<Listing<GiftIssue>, String> {
        let page = query.page.unwrap_or(1);
        self.rpc
            .call(&ListIssuesRequest(query))
            .await
            .map(|p| Listing::from_page(p, page))
            .map_err(failure("issues.list", "Failed to fetch gift dispatches"))
    }

    pub async fn get(&self, id: &str) -> Result<GiftIssue, String> {
        self.rpc
            .call(&GetIssueRequest(NameRef::new(id)))
            .await
            .map_err(failure("issues.get", "Failed to fetch gift dispatch"))
    }

    /// 发放礼品；服务器同时把礼品状态改为已发放
    pub async fn create(&self, draft: IssueDraft) -> Result<Value, String> {
        self.rpc
            .call(&draft)
            .await
            .map_err(failure("issues.create", "Failed to issue gift"))
    }

    pub async fn update(&self, id: &str, draft: IssueDraft) -> Result<Value, String> {
        let req = UpdateIssueRequest {
            name: id.to_string(),
            draft,
        };
        self.rpc
            .call(&req)
            .await
            .map_err(failure("issues.update", "Failed to update gift dispatch"))
    }

    /// 删除发放记录，礼品状态随之回退
    pub async fn delete(&self, id: &str) -> Result<String, String> {
        self.rpc
            .call(&DeleteIssueRequest(NameRef::new(id)))
            .await
            .map(|reply| reply_message(&reply, MSG_DELETED))
            .map_err(failure("issues.delete", "Failed to delete gift dispatch"))
    }

    pub async fn dispatch_history(&self, gift_id: &str) -> Result<Value, String> {
        let req = DispatchHistoryRequest {
            gift_id: gift_id.to_string(),
        };
        self.rpc
            .call(&req)
            .await
            .map_err(failure("issues.dispatch_history", "Failed to fetch gift dispatch history"))
    }

    pub async fn update_delivery_status(&self, update: DeliveryStatusUpdate) -> Result<Value, String> {
        self.rpc
            .call(&update)
            .await
            .map_err(failure("issues.update_delivery_status", "Failed to update delivery status"))
    }

    pub async fn validate_emirates_id(&self, emirates_id: &str) -> Result<Value, String> {
        let req = ValidateEmiratesIdRequest {
            emirates_id: emirates_id.to_string(),
        };
        self.rpc
            .call(&req)
            .await
            .map_err(failure("issues.validate_emirates_id", "Failed to validate Emirates ID"))
    }
}
