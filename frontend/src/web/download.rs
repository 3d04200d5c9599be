//! 文件下载：生成 Blob 后通过隐藏的 `<a download>` 触发

use giftdesk::composables::blob_url_to_revoke;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, Url};

fn js_error(e: JsValue) -> String {
    format!("{:?}", e)
}

pub fn download_text(file_name: &str, mime: &str, content: &str) -> Result<(), String> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| "无法获取 document 对象".to_string())?;
    let body = document.body().ok_or_else(|| "document 没有 body".to_string())?;

    let options = BlobPropertyBag::new();
    options.set_type(mime);
    let parts = js_sys::Array::of1(&JsValue::from_str(content));
    let blob = Blob::new_with_str_sequence_and_options(&parts, &options).map_err(js_error)?;
    let url = Url::create_object_url_with_blob(&blob).map_err(js_error)?;

    let link: HtmlAnchorElement = document
        .create_element("a")
        .map_err(js_error)?
        .dyn_into()
        .map_err(|_| "无法创建下载链接".to_string())?;
    link.set_href(&url);
    link.set_download(file_name);
    let _ = link.set_attribute("style", "visibility: hidden");

    body.append_child(&link).map_err(js_error)?;
    link.click();
    link.remove();
    revoke(&url);
    Ok(())
}

/// 释放 `blob:` 地址，其它地址忽略
pub fn revoke(url: &str) {
    if let Some(blob_url) = blob_url_to_revoke(url) {
        let _ = Url::revoke_object_url(blob_url);
    }
}
