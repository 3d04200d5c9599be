//! 图片地址处理

/// 私有文件下载接口，需要携带会话 Cookie 获取
pub const PRIVATE_DOWNLOAD_PATH: &str = "/api/method/frappe.core.doctype.file.file.download_file";

/// 把后端返回的图片路径补全为可访问的地址
pub fn resolve_image_url(path: &str, base: &str) -> String {
    if path.is_empty() {
        return String::new();
    }
    if path.starts_with("http://")
        || path.starts_with("https://")
        || is_private_download(path)
        || (!base.is_empty() && path.starts_with(base))
    {
        return path.to_string();
    }
    if path.starts_with('/') {
        format!("{base}{path}")
    } else {
        format!("{base}/{path}")
    }
}

pub fn is_private_download(url: &str) -> bool {
    url.contains(PRIVATE_DOWNLOAD_PATH)
}

/// 只有 `blob:` 地址需要释放
pub fn blob_url_to_revoke(url: &str) -> Option<&str> {
    url.starts_with("blob:").then_some(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "http://localhost:8000";

    #[test]
    fn resolves_relative_paths() {
        assert_eq!(resolve_image_url("", BASE), "");
        assert_eq!(
            resolve_image_url("/files/a.png", BASE),
            "http://localhost:8000/files/a.png"
        );
        assert_eq!(
            resolve_image_url("files/a.png", BASE),
            "http://localhost:8000/files/a.png"
        );
    }

    #[test]
    fn keeps_absolute_and_private() {
        assert_eq!(resolve_image_url("https://cdn/x.png", BASE), "https://cdn/x.png");
        assert_eq!(
            resolve_image_url("http://localhost:8000/files/a.png", BASE),
            "http://localhost:8000/files/a.png"
        );
        let private = format!("{PRIVATE_DOWNLOAD_PATH}?file_url=/private/files/a.png");
        assert_eq!(resolve_image_url(&private, BASE), private);
        assert!(is_private_download(&private));
    }

    #[test]
    fn only_blob_urls_are_revoked() {
        assert_eq!(blob_url_to_revoke("blob:http://x/1"), Some("blob:http://x/1"));
        assert_eq!(blob_url_to_revoke("/files/a.png"), None);
    }
}
