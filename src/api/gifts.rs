//! 礼品库存

use super::{Listing, failure, reply_message};
use crate::rpc::RpcClient;
use giftdesk_shared::protocol::{
    DashboardStatsRequest, DeleteGiftRequest, GetGiftRequest, GiftByCodeRequest,
    GiftCategoriesRequest, GiftDetailsRequest, ListGiftsRequest, ListQuery, NameRef,
    RegenerateBarcodeRequest, UpdateBarcodeRequest, UpdateGiftRequest,
};
use giftdesk_shared::{Category, DashboardStats, Gift, GiftDraft};
use serde_json::Value;
use std::rc::Rc;

pub const MSG_DELETED: &str = "Gift deleted successfully";

#[derive(Clone)]
pub struct GiftApi {
    rpc: Rc<RpcClient>,
    page_size: u32,
}

impl GiftApi {
    pub fn new(rpc: Rc<RpcClient>, page_size: u32) -> Self {
        Self { rpc, page_size }
    }

    /// 分页列出礼品；未指定页码时取第 1 页与默认页大小
    pub async fn list(&self, mut query: ListQuery) -> Result<Listing<Gift>, String> {
        let page = *query.page.get_or_insert(1);
        query.limit.get_or_insert(self.page_size);
        self.rpc
            .call(&ListGiftsRequest(query))
            .await
            .map(|p| Listing::from_page(p, page))
            .map_err(failure("gifts.list", "Failed to fetch gifts"))
    }

    pub async fn get(&self, id: &str) -> Result<Gift, String> {
        self.rpc
            .call(&GetGiftRequest(NameRef::new(id)))
            .await
            .map_err(failure("gifts.get", "Failed to fetch gift"))
    }

    /// 礼品详情与发放记录
    pub async fn details(&self, id: &str) -> Result<Value, String> {
        let req = GiftDetailsRequest {
            gift_name: id.to_string(),
        };
        self.rpc
            .call(&req)
            .await
            .map_err(failure("gifts.details", "Failed to fetch gift details"))
    }

    pub async fn create(&self, draft: GiftDraft) -> Result<Value, String> {
        self.rpc
            .call(&draft)
            .await
            .map_err(failure("gifts.create", "Failed to create gift"))
    }

    pub async fn update(&self, id: &str, draft: GiftDraft) -> Result<Value, String> {
        let req = UpdateGiftRequest {
            name: id.to_string(),
            draft,
        };
        self.rpc
            .call(&req)
            .await
            .map_err(failure("gifts.update", "Failed to update gift"))
    }

    pub async fn delete(&self, id: &str) -> Result<String, String> {
        self.rpc
            .call(&DeleteGiftRequest(NameRef::new(id)))
            .await
            .map(|reply| reply_message(&reply, MSG_DELETED))
            .map_err(failure("gifts.delete", "Failed to delete gift"))
    }

    /// 扫码查找
    pub async fn by_code(&self, code: &str) -> Result<Gift, String> {
        let req = GiftByCodeRequest {
            barcode_value: code.to_string(),
        };
        self.rpc
            .call(&req)
            .await
            .map_err(failure("gifts.by_code", "Gift not found"))
    }

    pub async fn dashboard_stats(&self) -> Result<DashboardStats, String> {
        self.rpc
            .call(&DashboardStatsRequest)
            .await
            .map_err(failure("gifts.dashboard_stats", "Failed to fetch statistics"))
    }

    pub async fn categories(&self) -> Result<Vec<Category>, String> {
        self.rpc
            .call(&GiftCategoriesRequest)
            .await
            .map_err(failure("gifts.categories", "Failed to fetch categories"))
    }

    pub async fn regenerate_barcode(&self, id: &str) -> Result<Value, String> {
        self.rpc
            .call(&RegenerateBarcodeRequest(NameRef::new(id)))
            .await
            .map_err(failure("gifts.regenerate_barcode", "Failed to regenerate barcode"))
    }

    pub async fn update_barcode(&self, update: UpdateBarcodeRequest) -> Result<Value, String> {
        self.rpc
            .call(&update)
            .await
            .map_err(failure("gifts.update_barcode", "Failed to update barcode"))
    }
}
