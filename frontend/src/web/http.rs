//! HTTP 传输层
//!
//! 使用 `web_sys::fetch` 实现核心库的 [`HttpClient`]：携带 Cookie，支持 multipart 与超时。

use giftdesk::error::{ApiError, ApiResult};
use giftdesk::request::{FormPart, HttpClient, HttpRequest, HttpResponse, RequestBody};
use gloo_timers::callback::Timeout;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    AbortController, Blob, BlobPropertyBag, FormData, Headers, Request, RequestCredentials,
    RequestInit, Response,
};

fn build_error(e: JsValue) -> ApiError {
    ApiError::Transport(format!("请求构建失败: {:?}", e))
}

/// 把表单字段编码为 `FormData`，文件字段转为 `Blob`
fn form_data(parts: &[FormPart]) -> Result<FormData, JsValue> {
    let form = FormData::new()?;
    for part in parts {
        match part {
            FormPart::Text { name, value } => form.append_with_str(name, value)?,
            FormPart::File { name, blob } => {
                let bytes = js_sys::Uint8Array::from(blob.bytes.as_slice());
                let options = BlobPropertyBag::new();
                options.set_type(&blob.content_type);
                let file = Blob::new_with_u8_array_sequence_and_options(
                    &js_sys::Array::of1(&bytes),
                    &options,
                )?;
                form.append_with_blob_and_filename(name, &file, &blob.file_name)?;
            }
        }
    }
    Ok(form)
}

/// 基于 fetch 的传输实现
pub struct FetchClient;

#[async_trait::async_trait(?Send)]
impl HttpClient for FetchClient {
    async fn send(&self, req: HttpRequest) -> ApiResult<HttpResponse> {
        let headers = Headers::new().map_err(build_error)?;
        for (key, value) in &req.headers {
            headers.set(key, value).map_err(build_error)?;
        }

        let opts = RequestInit::new();
        opts.set_method(req.method.as_str());
        // 会话 Cookie 必须随请求发送
        opts.set_credentials(RequestCredentials::Include);

        match &req.body {
            RequestBody::Empty => {}
            RequestBody::Json(text) => {
                headers
                    .set("Content-Type", "application/json")
                    .map_err(build_error)?;
                opts.set_body(&JsValue::from_str(text));
            }
            // Content-Type 与 boundary 交给浏览器生成
            RequestBody::Multipart(parts) => {
                let form = form_data(parts).map_err(build_error)?;
                opts.set_body(&form);
            }
        }
        opts.set_headers(&headers);

        // 超时后中止请求；计时器随本函数返回被 drop 而取消
        let _deadline = match (req.timeout, AbortController::new().ok()) {
            (Some(timeout), Some(controller)) => {
                opts.set_signal(Some(&controller.signal()));
                let millis = u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX);
                Some(Timeout::new(millis, move || controller.abort()))
            }
            _ => None,
        };

        let request = Request::new_with_str_and_init(&req.full_url(), &opts).map_err(build_error)?;

        let window =
            web_sys::window().ok_or_else(|| ApiError::Transport("无法获取 window 对象".into()))?;

        let resp_value = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(|e| ApiError::Transport(format!("{:?}", e)))?;

        let response: Response = resp_value
            .dyn_into()
            .map_err(|e| ApiError::Transport(format!("Response 类型转换失败: {:?}", e)))?;

        let text_promise = response
            .text()
            .map_err(|e| ApiError::Decode(format!("{:?}", e)))?;
        let body = JsFuture::from(text_promise)
            .await
            .map_err(|e| ApiError::Decode(format!("{:?}", e)))?
            .as_string()
            .unwrap_or_default();

        Ok(HttpResponse::new(response.status(), body))
    }

    fn is_online(&self) -> bool {
        web_sys::window()
            .map(|w| w.navigator().on_line())
            .unwrap_or(true)
    }
}
