//! 礼品接收人 (设置页)
//!
//! 新建与更新走 multipart，这样照片可以和字段一起提交。

use super::{Listing, failure, reply_message};
use crate::request::FormPart;
use crate::rpc::RpcClient;
use giftdesk_shared::protocol::{
    DeleteRecipientRequest, ListQuery, NameRef, PATH_CREATE_RECIPIENT, PATH_UPDATE_RECIPIENT,
    SettingsRecipientsRequest,
};
use giftdesk_shared::{GiftRecipient, RecipientDraft};
use serde_json::Value;
use std::rc::Rc;

pub const MSG_DELETED: &str = "Gift recipient deleted successfully";

/// 空字段不提交；照片只有在选了文件时才附带
fn form_parts(draft: RecipientDraft) -> Vec<FormPart> {
    let fields = [
        ("owner_full_name", draft.owner_full_name),
        ("coordinator_full_name", draft.coordinator_full_name),
        ("coordinator_mobile_no", draft.coordinator_mobile_no),
        ("coordinator_emirates_id", draft.coordinator_emirates_id),
        ("address", draft.address),
    ];
    let mut parts: Vec<FormPart> = fields
        .into_iter()
        .filter_map(|(name, value)| value.map(|v| FormPart::text(name, v)))
        .collect();
    if let Some(photo) = draft.person_photo {
        parts.push(FormPart::file("person_photo", photo));
    }
    parts
}

#[derive(Clone)]
pub struct RecipientApi {
    rpc: Rc<RpcClient>,
}

impl RecipientApi {
    pub fn new(rpc: Rc<RpcClient>) -> Self {
        Self { rpc }
    }

    pub async fn list(&self, query: ListQuery) -> Result<Listing<GiftRecipient>, String> {
        let page = query.page.unwrap_or(1);
        self.rpc
            .call(&SettingsRecipientsRequest(query))
            .await
            .map(|p| Listing::from_page(p, page))
            .map_err(failure("recipients.list", "Failed to fetch gift recipients"))
    }

    pub async fn create(&self, draft: RecipientDraft) -> Result<Value, String> {
        self.rpc
            .upload(PATH_CREATE_RECIPIENT, form_parts(draft))
            .await
            .map_err(failure("recipients.create", "Failed to create gift recipient"))
    }

    pub async fn update(&self, name: &str, draft: RecipientDraft) -> Result<Value, String> {
        let mut parts = vec![FormPart::text("name", name)];
        parts.extend(form_parts(draft));
        self.rpc
            .upload(PATH_UPDATE_RECIPIENT, parts)
            .await
            .map_err(failure("recipients.update", "Failed to update gift recipient"))
    }

    pub async fn delete(&self, name: &str) -> Result<String, String> {
        self.rpc
            .call(&DeleteRecipientRequest(NameRef::new(name)))
            .await
            .map(|reply| reply_message(&reply, MSG_DELETED))
            .map_err(failure("recipients.delete", "Failed to delete gift recipient"))
    }
}
