//! 界面小工具
//!
//! 与 DOM 无关的部分放在这里，浏览器相关的调用通过 trait 注入。

pub mod audio;
pub mod breakpoints;
pub mod debounce;
pub mod export;
pub mod haptics;
pub mod image;
pub mod text;
pub mod validation;

pub use audio::{AudioSink, ScannerAudio, Sound};
pub use breakpoints::{Breakpoint, Breakpoints};
pub use debounce::{Debounce, Throttle};
pub use export::{Column, ExportFormat};
pub use haptics::{Haptics, Vibrator};
pub use image::{blob_url_to_revoke, is_private_download, resolve_image_url};
pub use text::{format_file_size, truncate_text};
pub use validation::{ValidationError, validate_emirates_id, validate_phone_number};
