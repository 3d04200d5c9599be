//! 附件上传与删除

use super::failure;
use crate::composables::format_file_size;
use crate::config::UploadConfig;
use crate::request::FormPart;
use crate::rpc::RpcClient;
use giftdesk_shared::protocol::{DocListRequest, PATH_UPLOAD_FILE, file_resource_path, uploaded_files};
use giftdesk_shared::{FileBlob, UploadedFile};
use serde_json::json;
use std::rc::Rc;
use tracing::info;

pub const MSG_DELETED: &str = "File deleted successfully";
pub const MSG_NOT_FOUND: &str = "File not found";
pub const MSG_TYPE_NOT_ALLOWED: &str = "File type is not allowed";

#[derive(Clone)]
pub struct FileApi {
    rpc: Rc<RpcClient>,
    config: UploadConfig,
}

impl FileApi {
    pub fn new(rpc: Rc<RpcClient>, config: UploadConfig) -> Self {
        Self { rpc, config }
    }

    /// 上传前的本地校验：大小与类型
    pub fn validate(&self, blob: &FileBlob) -> Result<(), String> {
        if blob.bytes.len() as u64 > self.config.max_file_size {
            return Err(format!(
                "File is too large. Maximum size is {}",
                format_file_size(self.config.max_file_size)
            ));
        }
        if !self.config.accepts(&blob.content_type) {
            return Err(MSG_TYPE_NOT_ALLOWED.to_string());
        }
        Ok(())
    }

    pub async fn upload(&self, blob: FileBlob, is_private: bool) -> Result<UploadedFile, String> {
        self.validate(&blob)?;
        let file_name = blob.file_name.clone();
        let parts = vec![
            FormPart::file("file", blob),
            FormPart::text("is_private", if is_private { "1" } else { "0" }),
            FormPart::text("folder", self.config.folder.as_str()),
        ];
        let uploaded: UploadedFile = self
            .rpc
            .upload(PATH_UPLOAD_FILE, parts)
            .await
            .map_err(failure("files.upload", "Failed to upload file"))?;
        info!(file = %file_name, url = ?uploaded.file_url, "file uploaded");
        Ok(uploaded)
    }

    /// 按 `file_url` 找到 File 文档后删除
    pub async fn delete(&self, file_url: &str) -> Result<String, String> {
        let lookup = DocListRequest {
            doctype: "File".to_string(),
            fields: None,
            filters: Some(json!([["file_url", "=", file_url]]).to_string()),
            order_by: None,
            limit: Some(1),
        };
        let rows = self
            .rpc
            .call(&lookup)
            .await
            .map_err(failure("files.lookup", "Failed to delete file"))?;

        let Some(name) = uploaded_files(rows).into_iter().find_map(|f| f.name) else {
            return Err(MSG_NOT_FOUND.to_string());
        };

        self.rpc
            .delete_resource(&file_resource_path(&name))
            .await
            .map_err(failure("files.delete", "Failed to delete file"))?;
        Ok(MSG_DELETED.to_string())
    }
}
