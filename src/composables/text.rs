//! 文本与文件名的展示格式

const SIZE_UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
const IMAGE_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "gif", "webp", "svg"];
pub const ELLIPSIS: &str = "...";

/// `1536` -> `1.5 KB`，保留一位小数并去掉多余的 `.0`；最大单位为 GB
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let rounded = format!("{value:.1}");
    let rounded = rounded.strip_suffix(".0").unwrap_or(&rounded);
    format!("{} {}", rounded, SIZE_UNITS[unit])
}

/// 超过 `max_len` 个字符时截断并以 `...` 结尾 (结果总长不超过 `max_len`)
pub fn truncate_text(text: &str, max_len: usize) -> String {
    truncate_with(text, max_len, ELLIPSIS)
}

pub fn truncate_with(text: &str, max_len: usize, suffix: &str) -> String {
    if text.chars().count() <= max_len {
        return text.to_string();
    }
    let keep = max_len.saturating_sub(suffix.chars().count());
    let mut out: String = text.chars().take(keep).collect();
    out.push_str(suffix);
    out
}

/// 首字母大写，其余小写
pub fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.as_str().to_lowercase().chars())
            .collect(),
        None => String::new(),
    }
}

/// 最后一个 `.` 之后的部分 (小写)；没有 `.` 时为整个文件名
pub fn file_extension(file_name: &str) -> String {
    file_name
        .rsplit('.')
        .next()
        .unwrap_or_default()
        .to_lowercase()
}

pub fn is_image_file(file_name: &str) -> bool {
    IMAGE_EXTENSIONS.contains(&file_extension(file_name).as_str())
}

/// 状态徽章的颜色名，未知状态为 `gray`
pub fn status_color(status: &str) -> &'static str {
    match status {
        "Available" | "Active" | "Completed" => "emerald",
        "Issued" => "gold",
        "Expired" | "Inactive" | "Error" => "red",
        "Pending" => "yellow",
        _ => "gray",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_sizes() {
        assert_eq!(format_file_size(0), "0 B");
        assert_eq!(format_file_size(512), "512 B");
        assert_eq!(format_file_size(1024), "1 KB");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(5 * 1024 * 1024), "5 MB");
        assert_eq!(format_file_size(3 * 1024 * 1024 * 1024 * 1024), "3072 GB");
    }

    #[test]
    fn truncation() {
        assert_eq!(truncate_text("short", 10), "short");
        assert_eq!(truncate_text("Falcon of the desert", 10), "Falcon ...");
        assert_eq!(truncate_with("abcdef", 2, "..."), "...");
        assert_eq!(truncate_with("صقر الصحراء", 5, "…"), "صقر …");
    }

    #[test]
    fn capitalization() {
        assert_eq!(capitalize_first(""), "");
        assert_eq!(capitalize_first("aVAILABLE"), "Available");
    }

    #[test]
    fn image_detection() {
        assert_eq!(file_extension("photo.final.JPG"), "jpg");
        assert_eq!(file_extension("README"), "readme");
        assert!(is_image_file("gift.webp"));
        assert!(!is_image_file("report.csv"));
    }

    #[test]
    fn badge_colors() {
        assert_eq!(status_color("Issued"), "gold");
        assert_eq!(status_color("Completed"), "emerald");
        assert_eq!(status_color("Unknown"), "gray");
    }
}
