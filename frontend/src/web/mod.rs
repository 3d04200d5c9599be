//! 原生 Web API 封装模块
//!
//! 对浏览器原生 API 的轻量级封装，实现核心库注入的各个 trait。

pub mod document;
pub mod download;
pub mod feedback;
mod http;
pub mod router;
mod storage;
mod timer;

pub use http::FetchClient;
pub use storage::BrowserStorage;
pub use timer::BrowserScheduler;
