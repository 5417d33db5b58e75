//! Loose numeric parsing for fields that come from spreadsheets and
//! third-party JSON, where numbers show up as numbers, strings or garbage.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static FLOAT_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:[eE][+-]?[0-9]+)?")
        .expect("float prefix pattern is valid")
});

/// 解析字串開頭的數字部分，例如 "1234.5 MXN" -> 1234.5
pub fn parse_float_prefix(text: &str) -> Option<f64> {
    let trimmed = text.trim_start();
    FLOAT_PREFIX
        .find(trimmed)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

pub fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_float_prefix(s),
        _ => None,
    }
}

/// 價格四捨五入為整數；無法解析時回傳 None，由呼叫端決定預設值
pub fn round_price(raw: f64) -> i64 {
    (raw + 0.5).floor() as i64
}

pub fn price_from_str(text: &str) -> Option<i64> {
    parse_float_prefix(text).map(round_price)
}

pub fn price_from_value(value: &Value) -> Option<i64> {
    value_as_f64(value).map(round_price)
}

/// 庫存取整數部分
pub fn stock_from_value(value: &Value) -> Option<i64> {
    value_as_f64(value).map(|v| v.trunc() as i64)
}

pub fn stock_from_str(text: &str) -> Option<i64> {
    parse_float_prefix(text).map(|v| v.trunc() as i64)
}

/// 解析尺寸欄位（寬度、扁平比、輪圈直徑）。
/// 先去掉 `R`/`r`，空字串或 0 視為未提供。
pub fn parse_measure(text: &str) -> std::result::Result<Option<u32>, String> {
    let cleaned: String = text.chars().filter(|c| *c != 'R' && *c != 'r').collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return Ok(None);
    }
    if !cleaned.chars().all(|c| c.is_ascii_digit()) {
        return Err(format!("'{}' is not a whole number", text));
    }
    match cleaned.parse::<u32>() {
        Ok(0) => Ok(None),
        Ok(v) => Ok(Some(v)),
        Err(e) => Err(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_float_prefix() {
        assert_eq!(parse_float_prefix("1234.5"), Some(1234.5));
        assert_eq!(parse_float_prefix("  99 MXN"), Some(99.0));
        assert_eq!(parse_float_prefix("N/A"), None);
        assert_eq!(parse_float_prefix(""), None);
    }

    #[test]
    fn test_price_rounding() {
        assert_eq!(price_from_value(&json!(1499.5)), Some(1500));
        assert_eq!(price_from_value(&json!(1499.49)), Some(1499));
        assert_eq!(price_from_value(&json!("2100.7")), Some(2101));
        assert_eq!(price_from_value(&json!(null)), None);
        assert_eq!(price_from_str("abc"), None);
    }

    #[test]
    fn test_stock_truncates() {
        assert_eq!(stock_from_value(&json!(4.9)), Some(4));
        assert_eq!(stock_from_value(&json!("12")), Some(12));
        assert_eq!(stock_from_str("-"), None);
    }

    #[test]
    fn test_parse_measure() {
        assert_eq!(parse_measure("R15"), Ok(Some(15)));
        assert_eq!(parse_measure("r15"), Ok(Some(15)));
        assert_eq!(parse_measure(" 15 "), Ok(Some(15)));
        assert_eq!(parse_measure(""), Ok(None));
        assert_eq!(parse_measure("0"), Ok(None));
        assert!(parse_measure("15.5").is_err());
        assert!(parse_measure("abc").is_err());
    }
}
