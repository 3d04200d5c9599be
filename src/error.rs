use serde_json::Value;
use thiserror::Error;

// =========================================================
// 用户提示文案
// =========================================================

pub const MSG_OFFLINE: &str = "No internet connection. Please check your network.";
pub const MSG_BAD_REQUEST: &str = "Invalid request. Please check your input.";
pub const MSG_UNAUTHORIZED: &str = "Authentication required. Please log in.";
pub const MSG_FORBIDDEN: &str = "You do not have permission to perform this action.";
pub const MSG_NOT_FOUND: &str = "The requested resource was not found.";
pub const MSG_RATE_LIMITED: &str = "Too many requests. Please try again later.";
pub const MSG_SERVER: &str = "Server error. Please try again later.";

// =========================================================
// 核心错误类型
// =========================================================

/// HTTP 管道产生的错误
///
/// 只在 core 内部流转，API 包装层会通过 [`ApiError::user_message`] 把它压平成字符串。
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// 浏览器报告离线，请求没有发出或中途失败
    #[error("network is offline")]
    Offline,

    /// 服务器返回了非 2xx 状态码
    #[error("HTTP {status}: {message:?}")]
    Status {
        status: u16,
        /// 框架给出的提示 (`message` 或 `_server_messages` 的第一条)
        message: Option<String>,
        /// 响应体是否携带 `exc` (服务端异常栈)
        exc: bool,
    },

    /// 底层传输失败 (超时、DNS、CORS 等)
    #[error("transport error: {0}")]
    Transport(String),

    /// 响应体不是预期的 JSON 结构
    #[error("decode error: {0}")]
    Decode(String),

    /// 响应结构合法但缺少必需内容
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

impl ApiError {
    /// 从非 2xx 响应构造错误，顺带提取框架提示
    pub fn from_status(status: u16, body: &str) -> Self {
        let parsed = serde_json::from_str::<Value>(body).ok();
        let message = parsed.as_ref().and_then(server_message);
        let exc = parsed
            .as_ref()
            .and_then(|v| v.get("exc"))
            .is_some_and(|v| !v.is_null());
        ApiError::Status {
            status,
            message,
            exc,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    pub fn has_exception(&self) -> bool {
        matches!(self, ApiError::Status { exc: true, .. })
    }

    /// 转换为展示给用户的文案
    ///
    /// 优先级：离线 > 框架提示 > 固定状态码文案 > 调用方默认文案
    pub fn user_message(&self, default: &str) -> String {
        if matches!(self, ApiError::Offline) {
            return MSG_OFFLINE.to_string();
        }
        if let Some(message) = self.server_message() {
            return message.to_string();
        }
        let fixed = match self.status() {
            Some(400) => Some(MSG_BAD_REQUEST),
            Some(401) => Some(MSG_UNAUTHORIZED),
            Some(403) => Some(MSG_FORBIDDEN),
            Some(404) => Some(MSG_NOT_FOUND),
            Some(429) => Some(MSG_RATE_LIMITED),
            Some(500) => Some(MSG_SERVER),
            _ => None,
        };
        fixed.unwrap_or(default).to_string()
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Decode(e.to_string())
    }
}

// =========================================================
// 框架提示提取
// =========================================================

/// 读取响应体中的框架提示
///
/// `message` 为非空字符串时直接使用；否则解析 `_server_messages`，
/// 它是一个 JSON 编码的字符串数组，每个元素又是 JSON 编码的 `{ "message": ... }`。
pub fn server_message(body: &Value) -> Option<String> {
    if let Some(message) = body.get("message").and_then(Value::as_str) {
        if !message.trim().is_empty() {
            return Some(message.to_string());
        }
    }

    let raw = body.get("_server_messages")?.as_str()?;
    let entries: Vec<String> = serde_json::from_str(raw).ok()?;
    let first = entries.into_iter().next()?;
    let text = match serde_json::from_str::<Value>(&first) {
        Ok(Value::Object(obj)) => obj.get("message")?.as_str()?.to_string(),
        Ok(Value::String(s)) => s,
        _ => first,
    };
    (!text.trim().is_empty()).then_some(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn offline_wins_over_everything() {
        assert_eq!(ApiError::Offline.user_message("Failed"), MSG_OFFLINE);
    }

    #[test]
    fn framework_message_beats_status_text() {
        let err = ApiError::from_status(403, r#"{"message":"Not allowed to edit Gift"}"#);
        assert_eq!(err.user_message("Failed"), "Not allowed to edit Gift");
    }

    #[test]
    fn server_messages_first_entry() {
        let inner = json!({ "message": "Gift name is mandatory" }).to_string();
        let outer = serde_json::to_string(&vec![inner, "\"second\"".to_string()]).unwrap();
        let body = json!({ "exc_type": "ValidationError", "_server_messages": outer });
        let err = ApiError::from_status(417, &body.to_string());
        assert_eq!(err.user_message("Failed"), "Gift name is mandatory");
    }

    #[test]
    fn fixed_status_messages_then_default() {
        assert_eq!(ApiError::from_status(404, "").user_message("x"), MSG_NOT_FOUND);
        assert_eq!(ApiError::from_status(429, "<html>").user_message("x"), MSG_RATE_LIMITED);
        assert_eq!(ApiError::from_status(500, "{}").user_message("x"), MSG_SERVER);
        assert_eq!(ApiError::from_status(502, "{}").user_message("Failed to load"), "Failed to load");
        assert_eq!(ApiError::Transport("boom".into()).user_message("Failed"), "Failed");
    }

    #[test]
    fn exc_flag() {
        let err = ApiError::from_status(500, r#"{"exc":"Traceback ..."}"#);
        assert!(err.has_exception());
        assert!(!ApiError::from_status(500, r#"{"exc":null}"#).has_exception());
    }
}
