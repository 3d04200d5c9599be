//! 页面级 DOM 操作：标题、语言方向、视口、PWA 检测、页面注入的全局变量

use wasm_bindgen::JsValue;

const VIEWPORT_SCANNER: &str =
    "width=device-width, initial-scale=1.0, user-scalable=no, maximum-scale=1.0";

fn document() -> Option<web_sys::Document> {
    web_sys::window()?.document()
}

pub fn set_title(title: &str) {
    if let Some(doc) = document() {
        doc.set_title(title);
    }
}

/// 设置 `<html lang dir>`
pub fn set_language(lang: &str, dir: &str) {
    if let Some(root) = document().and_then(|d| d.document_element()) {
        let _ = root.set_attribute("lang", lang);
        let _ = root.set_attribute("dir", dir);
    }
}

/// 扫码页禁止缩放
pub fn lock_viewport_for_scanner() {
    if let Some(meta) = document().and_then(|d| d.query_selector("meta[name=viewport]").ok().flatten()) {
        let _ = meta.set_attribute("content", VIEWPORT_SCANNER);
    }
}

pub fn current_path() -> String {
    web_sys::window()
        .and_then(|w| w.location().pathname().ok())
        .unwrap_or_else(|| "/".to_string())
}

pub fn current_search() -> String {
    web_sys::window()
        .and_then(|w| w.location().search().ok())
        .unwrap_or_default()
}

/// 整页替换 (不留历史记录)
pub fn replace_location(url: &str) {
    if let Some(window) = web_sys::window() {
        let _ = window.location().replace(url);
    }
}

pub fn inner_width() -> u32 {
    web_sys::window()
        .and_then(|w| w.inner_width().ok())
        .and_then(|v| v.as_f64())
        .map(|w| w as u32)
        .unwrap_or(1024)
}

/// 读取 `window[name]` 上的字符串
pub fn global_string(name: &str) -> Option<String> {
    let window = web_sys::window()?;
    js_sys::Reflect::get(&window, &JsValue::from_str(name))
        .ok()?
        .as_string()
        .filter(|s| !s.is_empty())
}

/// Frappe 在页面上注入的 `window.csrf_token`
pub fn csrf_token() -> Option<String> {
    global_string("csrf_token")
}

/// 以独立窗口 (PWA) 方式运行
pub fn is_pwa() -> bool {
    let Some(window) = web_sys::window() else {
        return false;
    };
    let standalone_media = window
        .match_media("(display-mode: standalone)")
        .ok()
        .flatten()
        .map(|m| m.matches())
        .unwrap_or(false);
    // iOS Safari
    let ios_standalone = js_sys::Reflect::get(&window.navigator(), &JsValue::from_str("standalone"))
        .ok()
        .and_then(|v| v.as_bool())
        .unwrap_or(false);
    let android_app = document()
        .map(|d| d.referrer().contains("android-app://"))
        .unwrap_or(false);
    standalone_media || ios_standalone || android_app
}
