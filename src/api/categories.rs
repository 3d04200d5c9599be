//! 礼品分类 (下拉选项与设置页管理)

use super::{Listing, failure, reply_message};
use crate::rpc::RpcClient;
use giftdesk_shared::protocol::{
    DeleteCategoryRequest, DocListRequest, ListQuery, NameRef, SettingsCategoriesRequest,
    UpdateCategoryRequest,
};
use giftdesk_shared::{Category, CategoryDraft};
use serde_json::Value;
use std::rc::Rc;

pub const DOCTYPE: &str = "Gift Category";
pub const MSG_DELETED: &str = "Category deleted successfully";

#[derive(Clone)]
pub struct CategoryApi {
    rpc: Rc<RpcClient>,
}

impl CategoryApi {
    pub fn new(rpc: Rc<RpcClient>) -> Self {
        Self { rpc }
    }

    /// 按名称排序的全部分类，供表单下拉使用
    pub async fn options(&self) -> Result<Vec<Category>, String> {
        let req = DocListRequest {
            doctype: DOCTYPE.to_string(),
            fields: Some(vec!["name".to_string(), "category_name".to_string()]),
            filters: None,
            order_by: Some("category_name".to_string()),
            limit: None,
        };
        let rows = self
            .rpc
            .call(&req)
            .await
            .map_err(failure("categories.options", "Failed to fetch gift categories"))?;
        Ok(rows
            .into_iter()
            .filter_map(|row| serde_json::from_value(row).ok())
            .collect())
    }

    pub async fn list(&self, query: ListQuery) -> Result<Listing<Category>, String> {
        let page = query.page.unwrap_or(1);
        self.rpc
            .call(&SettingsCategoriesRequest(query))
            .await
            .map(|p| Listing::from_page(p, page))
            .map_err(failure("categories.list", "Failed to fetch categories"))
    }

    pub async fn create(&self, draft: CategoryDraft) -> Result<Value, String> {
        self.rpc
            .call(&draft)
            .await
            .map_err(failure("categories.create", "Failed to create category"))
    }

    pub async fn update(&self, name: &str, draft: CategoryDraft) -> Result<Value, String> {
        let req = UpdateCategoryRequest {
            name: name.to_string(),
            draft,
        };
        self.rpc
            .call(&req)
            .await
            .map_err(failure("categories.update", "Failed to update category"))
    }

    pub async fn delete(&self, name: &str) -> Result<String, String> {
        self.rpc
            .call(&DeleteCategoryRequest(NameRef::new(name)))
            .await
            .map(|reply| reply_message(&reply, MSG_DELETED))
            .map_err(failure("categories.delete", "Failed to delete category"))
    }
}
