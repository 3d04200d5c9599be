//! 运行时配置
//!
//! 所有值都有内置默认值，部署时可以通过变量查找函数覆盖
//! (前端从页面注入的全局变量读取，测试中直接传闭包)。

use std::time::Duration;

pub const ENV_API_BASE: &str = "GIFT_API_BASE";
pub const ENV_APP_NAME: &str = "GIFT_APP_NAME";
pub const ENV_APP_BASE: &str = "GIFT_APP_BASE";
pub const ENV_DEV_ORIGIN: &str = "GIFT_DEV_ORIGIN";
pub const ENV_TIMEOUT_MS: &str = "GIFT_API_TIMEOUT_MS";
pub const ENV_PAGE_SIZE: &str = "GIFT_PAGE_SIZE";

const MIB: u64 = 1024 * 1024;

#[derive(Debug, Clone, PartialEq)]
pub struct UploadConfig {
    pub max_file_size: u64,
    pub allowed_types: Vec<String>,
    pub folder: String,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size: 5 * MIB,
            allowed_types: ["image/jpeg", "image/png", "image/gif", "application/pdf"]
                .into_iter()
                .map(String::from)
                .collect(),
            folder: giftdesk_shared::protocol::DEFAULT_UPLOAD_FOLDER.to_string(),
        }
    }
}

impl UploadConfig {
    pub fn accepts(&self, content_type: &str) -> bool {
        self.allowed_types.iter().any(|t| t == content_type)
    }
}

/// 应用配置
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// RPC 基础路径
    pub api_base: String,
    pub app_name: String,
    /// SPA 挂载的基础路径
    pub app_base: String,
    /// 开发模式下图片等静态资源的来源 (生产环境为空，即同源)
    pub asset_origin: String,
    pub timeout: Duration,
    pub page_size: u32,
    pub debounce_delay: Duration,
    pub toast_duration: Duration,
    pub upload: UploadConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base: "/api/method".to_string(),
            app_name: "Gift Management".to_string(),
            app_base: "/gift".to_string(),
            asset_origin: String::new(),
            timeout: Duration::from_secs(30),
            page_size: 20,
            debounce_delay: Duration::from_millis(300),
            toast_duration: Duration::from_millis(3000),
            upload: UploadConfig::default(),
        }
    }
}

impl AppConfig {
    /// 开发服务器地址
    pub const DEV_ORIGIN: &'static str = "http://localhost:8000";

    /// 以默认值为基础，用 `lookup` 返回的值覆盖。
    ///
    /// 无法解析的数字保持默认值。
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = non_empty(ENV_API_BASE) {
            config.api_base = v.trim_end_matches('/').to_string();
        }
        if let Some(v) = non_empty(ENV_APP_NAME) {
            config.app_name = v;
        }
        if let Some(v) = non_empty(ENV_APP_BASE) {
            config.app_base = v.trim_end_matches('/').to_string();
        }
        if let Some(v) = non_empty(ENV_DEV_ORIGIN) {
            config.asset_origin = v.trim_end_matches('/').to_string();
        }
        if let Some(ms) = non_empty(ENV_TIMEOUT_MS).and_then(|v| v.parse::<u64>().ok()) {
            config.timeout = Duration::from_millis(ms);
        }
        if let Some(size) = non_empty(ENV_PAGE_SIZE).and_then(|v| v.parse::<u32>().ok()) {
            if size > 0 {
                config.page_size = size;
            }
        }
        config
    }

    /// 开发模式配置：静态资源指向本地开发服务器
    pub fn development() -> Self {
        Self {
            asset_origin: Self::DEV_ORIGIN.to_string(),
            ..Self::default()
        }
    }

    /// 拼接应用内路径，如 `/login` -> `/gift/login`
    pub fn app_path(&self, path: &str) -> String {
        if path == "/" || path.is_empty() {
            format!("{}/", self.app_base)
        } else {
            format!("{}{}", self.app_base, path)
        }
    }

    /// 去掉基础路径，返回路由表使用的路径
    pub fn strip_app_base<'a>(&self, path: &'a str) -> &'a str {
        match path.strip_prefix(self.app_base.as_str()) {
            Some("") => "/",
            Some(rest) if rest.starts_with('/') => rest,
            _ => path,
        }
    }

    /// 当前路径是否属于本应用
    pub fn is_app_path(&self, path: &str) -> bool {
        path == self.app_base || path.starts_with(&format!("{}/", self.app_base))
    }

    /// 挂载前是否需要向服务器确认会话
    ///
    /// 只检查本应用下的页面，登录页与离线页除外。
    pub fn requires_session_check(&self, path: &str) -> bool {
        self.is_app_path(path)
            && !path.starts_with(&self.app_path("/login"))
            && !path.starts_with(&self.app_path("/offline"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = AppConfig::default();
        assert_eq!(config.api_base, "/api/method");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.page_size, 20);
        assert_eq!(config.upload.max_file_size, 5 * 1024 * 1024);
        assert!(config.upload.accepts("application/pdf"));
        assert!(!config.upload.accepts("text/plain"));
    }

    #[test]
    fn lookup_overrides_and_ignores_garbage() {
        let config = AppConfig::from_lookup(|key| match key {
            ENV_API_BASE => Some("https://erp.example.com/api/method/".to_string()),
            ENV_PAGE_SIZE => Some("abc".to_string()),
            ENV_TIMEOUT_MS => Some("5000".to_string()),
            _ => None,
        });
        assert_eq!(config.api_base, "https://erp.example.com/api/method");
        assert_eq!(config.page_size, 20);
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn app_paths() {
        let config = AppConfig::default();
        assert_eq!(config.app_path("/login"), "/gift/login");
        assert_eq!(config.app_path("/"), "/gift/");
        assert_eq!(config.strip_app_base("/gift/gifts/G-1"), "/gifts/G-1");
        assert_eq!(config.strip_app_base("/gift"), "/");
        assert_eq!(config.strip_app_base("/giftshop"), "/giftshop");
        assert!(config.is_app_path("/gift/scan"));
        assert!(!config.is_app_path("/giftshop"));
    }

    #[test]
    fn session_check_paths() {
        let config = AppConfig::default();
        assert!(config.requires_session_check("/gift"));
        assert!(config.requires_session_check("/gift/"));
        assert!(config.requires_session_check("/gift/gifts/G-1"));
        assert!(!config.requires_session_check("/gift/login"));
        assert!(!config.requires_session_check("/gift/offline"));
        assert!(!config.requires_session_check("/other"));
    }
}
