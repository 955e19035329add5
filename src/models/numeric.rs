//! 宽松数值解析
//!
//! 上游和前端输入里的数值可能是数字、数字字符串、null 或任意文本。
//! 约定与仪表盘一致: 无法解析的值一律按 0 处理，不报错。

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// 解析字符串前缀中的数字 (`"12.5kg"` -> 12.5)，失败返回 0
pub fn parse_lenient(input: &str) -> f64 {
    let trimmed = input.trim();
    if let Ok(v) = trimmed.parse::<f64>() {
        return finite_or_zero(v);
    }

    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;
    for (idx, ch) in trimmed.char_indices() {
        match ch {
            '+' | '-' if idx == 0 => {}
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end = idx + ch.len_utf8();
    }

    if !seen_digit {
        return 0.0;
    }
    trimmed[..end]
        .trim_end_matches('.')
        .parse::<f64>()
        .map(finite_or_zero)
        .unwrap_or(0.0)
}

/// 将任意 JSON 值转换为数值
pub fn coerce_value(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().map(finite_or_zero).unwrap_or(0.0),
        Value::String(s) => parse_lenient(s),
        _ => 0.0,
    }
}

/// serde 字段适配: 宽松解析为 f64
pub fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(coerce_value).unwrap_or(0.0))
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}
