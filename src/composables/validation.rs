//! 表单校验：阿联酋身份证号 (Emirates ID) 与手机号
//!
//! 校验通过时返回规范化后的展示格式。

use thiserror::Error;

pub const EMIRATES_ID_LEN: usize = 15;
pub const EMIRATES_ID_PREFIX: &str = "784";
pub const UAE_COUNTRY_CODE: &str = "971";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Emirates ID is required")]
    EmiratesIdRequired,
    #[error("Emirates ID must be 15 digits (format: 784-YYYY-XXXXXXX-X)")]
    EmiratesIdFormat,
    #[error("Emirates ID must start with 784")]
    EmiratesIdPrefix,
    #[error("Phone number is required")]
    PhoneRequired,
    #[error("Please enter a valid UAE phone number")]
    PhoneInvalid,
}

/// 去掉空白与连字符
fn strip_id_separators(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect()
}

/// 去掉空白、连字符与括号
fn strip_phone_separators(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '-' | '(' | ')'))
        .collect()
}

fn all_digits(s: &str) -> bool {
    s.chars().all(|c| c.is_ascii_digit())
}

/// 按字符下标截取，越界时收缩到末尾
fn slice(chars: &[char], start: usize, end: usize) -> String {
    let end = end.min(chars.len());
    let start = start.min(end);
    chars[start..end].iter().collect()
}

// =========================================================
// Emirates ID
// =========================================================

/// 15 位数字、以 784 开头；成功时返回 `784-YYYY-XXXXXXX-X`
pub fn validate_emirates_id(input: &str) -> Result<String, ValidationError> {
    if input.is_empty() {
        return Err(ValidationError::EmiratesIdRequired);
    }
    let clean = strip_id_separators(input);
    if clean.len() != EMIRATES_ID_LEN || !all_digits(&clean) {
        return Err(ValidationError::EmiratesIdFormat);
    }
    if !clean.starts_with(EMIRATES_ID_PREFIX) {
        return Err(ValidationError::EmiratesIdPrefix);
    }
    Ok(format_emirates_id(&clean))
}

/// 长度不是 15 时原样返回
pub fn format_emirates_id(input: &str) -> String {
    let clean: Vec<char> = strip_id_separators(input).chars().collect();
    if clean.len() != EMIRATES_ID_LEN {
        return input.to_string();
    }
    format!(
        "{}-{}-{}-{}",
        slice(&clean, 0, 3),
        slice(&clean, 3, 7),
        slice(&clean, 7, 14),
        slice(&clean, 14, 15)
    )
}

/// 遮住中间 7 位：`784-1990-*******-1`
pub fn mask_emirates_id(input: &str) -> String {
    let formatted = format_emirates_id(input);
    let chars: Vec<char> = formatted.chars().collect();
    // 形如 ddd-dddd-ddddddd-d 的第一段
    const SHAPE: &[u8] = b"ddd-dddd-ddddddd-d";
    let matches_at = |start: usize| {
        SHAPE.iter().enumerate().all(|(i, kind)| {
            let c = chars[start + i];
            match kind {
                b'd' => c.is_ascii_digit(),
                _ => c == '-',
            }
        })
    };

    if chars.len() < SHAPE.len() {
        return formatted;
    }
    let Some(start) = (0..=chars.len() - SHAPE.len()).find(|&start| matches_at(start)) else {
        return formatted;
    };

    chars
        .iter()
        .enumerate()
        .map(|(i, c)| if (start + 9..start + 16).contains(&i) { '*' } else { *c })
        .collect()
}

// =========================================================
// 手机号
// =========================================================

/// 接受 `971` + 8/9 位、`0` + 8/9 位、或 8/9 位数字
pub fn validate_phone_number(input: &str) -> Result<String, ValidationError> {
    if input.is_empty() {
        return Err(ValidationError::PhoneRequired);
    }
    let clean = strip_phone_separators(input);
    let local_len_ok = |rest: &str| matches!(rest.len(), 8 | 9);
    let valid = all_digits(&clean)
        && (clean
            .strip_prefix(UAE_COUNTRY_CODE)
            .is_some_and(local_len_ok)
            || clean.strip_prefix('0').is_some_and(local_len_ok)
            || local_len_ok(&clean));
    if !valid {
        return Err(ValidationError::PhoneInvalid);
    }
    Ok(format_phone_number(&clean))
}

/// `+971 XX XXX XXXX`、`0XX XXX XXXX` 或 `XX XXX XXXX`
pub fn format_phone_number(input: &str) -> String {
    if input.is_empty() {
        return String::new();
    }
    let clean = strip_phone_separators(input);
    let chars: Vec<char> = clean.chars().collect();
    if clean.starts_with(UAE_COUNTRY_CODE) {
        format!(
            "+{} {} {} {}",
            slice(&chars, 0, 3),
            slice(&chars, 3, 5),
            slice(&chars, 5, 8),
            slice(&chars, 8, chars.len())
        )
    } else if clean.starts_with('0') {
        format!(
            "{} {} {}",
            slice(&chars, 0, 3),
            slice(&chars, 3, 6),
            slice(&chars, 6, chars.len())
        )
    } else {
        format!(
            "{} {} {}",
            slice(&chars, 0, 2),
            slice(&chars, 2, 5),
            slice(&chars, 5, chars.len())
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emirates_id_rules() {
        assert_eq!(
            validate_emirates_id(""),
            Err(ValidationError::EmiratesIdRequired)
        );
        assert_eq!(
            validate_emirates_id("784-1990-123456"),
            Err(ValidationError::EmiratesIdFormat)
        );
        assert_eq!(
            validate_emirates_id("784-1990-12345AB-1"),
            Err(ValidationError::EmiratesIdFormat)
        );
        assert_eq!(
            validate_emirates_id("123199012345671"),
            Err(ValidationError::EmiratesIdPrefix)
        );
        assert_eq!(
            validate_emirates_id("784 1990 1234567 1").as_deref(),
            Ok("784-1990-1234567-1")
        );
        assert_eq!(
            ValidationError::EmiratesIdPrefix.to_string(),
            "Emirates ID must start with 784"
        );
    }

    #[test]
    fn emirates_id_format_and_mask() {
        assert_eq!(format_emirates_id(""), "");
        assert_eq!(format_emirates_id("7841990"), "7841990");
        assert_eq!(format_emirates_id("784199012345671"), "784-1990-1234567-1");
        assert_eq!(mask_emirates_id("784199012345671"), "784-1990-*******-1");
        assert_eq!(mask_emirates_id("not an id"), "not an id");
    }

    #[test]
    fn phone_rules() {
        assert_eq!(validate_phone_number(""), Err(ValidationError::PhoneRequired));
        assert_eq!(
            validate_phone_number("+971 50 123 4567"),
            Err(ValidationError::PhoneInvalid)
        );
        assert_eq!(
            validate_phone_number("971501234567").as_deref(),
            Ok("+971 50 123 4567")
        );
        assert_eq!(
            validate_phone_number("(050) 123-4567").as_deref(),
            Ok("050 123 4567")
        );
        assert_eq!(
            validate_phone_number("501234567").as_deref(),
            Ok("50 123 4567")
        );
        assert_eq!(
            validate_phone_number("1234567"),
            Err(ValidationError::PhoneInvalid)
        );
    }

    #[test]
    fn phone_format_tolerates_short_input() {
        assert_eq!(format_phone_number(""), "");
        assert_eq!(format_phone_number("97150"), "+971 50  ");
    }
}
