//! 價格顯示格式化
//!
//! 截斷直接作用在十進位數字字串上（f64 的最短表示、JSON 數字原文或
//! `Decimal`），不經過二進位浮點，也不受 `Decimal` 的 28 位上限影響。
//! 第三位小數一律捨去（朝零截斷），不做四捨五入：`999.999 -> "999.99"`。
//! 負數與非有限值直接拒絕。

use crate::utils::error::{MarketplaceError, Result};
use rust_decimal::Decimal;
use serde_json::Value;

const DISPLAY_SCALE: usize = 2;

/// 指數超過此值的文字不可能來自 f64，視為無效
const MAX_EXPONENT: i64 = 400;

/// 將數值格式化為千分位、固定兩位小數的字串
pub fn format_price(value: f64) -> Result<String> {
    if !value.is_finite() {
        return Err(MarketplaceError::InvalidPrice {
            value: value.to_string(),
            reason: "Price must be a finite number".to_string(),
        });
    }

    // f64 的 Display 會輸出最短且可還原的十進位表示
    format_decimal_text(&value.to_string())
}

/// manifest 中的價格是 JSON 數字，直接以其文字表示格式化
pub fn format_json_price(value: &Value) -> Result<String> {
    match value {
        Value::Number(number) => format_decimal_text(&number.to_string()),
        other => Err(MarketplaceError::InvalidPrice {
            value: other.to_string(),
            reason: "Price must be a number".to_string(),
        }),
    }
}

pub fn format_decimal_price(value: Decimal) -> Result<String> {
    format_decimal_text(&value.to_string())
}

/// 接受 `123`、`0.019`、`1e27`、`1.5e-7` 這類十進位文字
fn format_decimal_text(raw: &str) -> Result<String> {
    let invalid = |reason: &str| MarketplaceError::InvalidPrice {
        value: raw.to_string(),
        reason: reason.to_string(),
    };

    let (negative, unsigned) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw.strip_prefix('+').unwrap_or(raw)),
    };

    let (mantissa, exponent) = match unsigned.split_once(|c: char| c == 'e' || c == 'E') {
        Some((mantissa, exponent)) => {
            let exponent: i64 = exponent
                .strip_prefix('+')
                .unwrap_or(exponent)
                .parse()
                .map_err(|_| invalid("Malformed exponent"))?;
            (mantissa, exponent)
        }
        None => (unsigned, 0),
    };
    if exponent.abs() > MAX_EXPONENT {
        return Err(invalid("Exponent out of range"));
    }

    let (integer_digits, fraction_digits) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let digits = format!("{}{}", integer_digits, fraction_digits);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid("Not a decimal number"));
    }

    if negative && digits.bytes().any(|b| b != b'0') {
        return Err(invalid("Price cannot be negative"));
    }

    // 小數點在 digits 中的位置
    let point = integer_digits.len() as i64 + exponent;
    let (integer_part, fraction_part) = if point <= 0 {
        let zeros = "0".repeat(point.unsigned_abs() as usize);
        (String::new(), format!("{}{}", zeros, digits))
    } else if point as usize >= digits.len() {
        let zeros = "0".repeat(point as usize - digits.len());
        (format!("{}{}", digits, zeros), String::new())
    } else {
        let (integer, fraction) = digits.split_at(point as usize);
        (integer.to_string(), fraction.to_string())
    };

    let integer_part = match integer_part.trim_start_matches('0') {
        "" => "0",
        trimmed => trimmed,
    };
    let mut fraction: String = fraction_part.chars().take(DISPLAY_SCALE).collect();
    while fraction.len() < DISPLAY_SCALE {
        fraction.push('0');
    }

    Ok(format!("{}.{}", group_thousands(integer_part), fraction))
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut grouped = String::with_capacity(len + len / 3);

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    grouped
}
