//! 数值格式化

use serde_json::Value;

const YI: f64 = 100_000_000.0;
const WAN: f64 = 10_000.0;

/// 将金额格式化为亿或万元单位
///
/// 123456789 -> "1.23亿"，56789 -> "5.68万"，123.4 -> "123.40"
pub fn format_currency_value(value: f64) -> String {
    if value.abs() >= YI {
        format!("{:.2}亿", value / YI)
    } else if value.abs() >= WAN {
        format!("{:.2}万", value / WAN)
    } else {
        format!("{:.2}", value)
    }
}

/// 对 JSON 值做金额格式化
///
/// 数字或数字字符串按 `format_currency_value` 处理；其他字符串原样返回；null 返回 None
pub fn format_currency(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(
            s.trim()
                .parse::<f64>()
                .map(format_currency_value)
                .unwrap_or_else(|_| s.clone()),
        ),
        other => other.as_f64().map(format_currency_value),
    }
}

/// 保留两位小数
pub fn format_number(value: f64) -> String {
    format!("{:.2}", value)
}

/// 成交量、成交额等大数：亿/万保留两位小数，万以下取整
pub fn format_large_number(value: f64) -> String {
    if value.abs() >= YI {
        format!("{:.2}亿", value / YI)
    } else if value.abs() >= WAN {
        format!("{:.2}万", value / WAN)
    } else {
        format!("{:.0}", value)
    }
}

/// 百分比，如 12.346 -> "12.35%"
pub fn format_percent(value: f64) -> String {
    format!("{:.2}%", value)
}

/// 带正号的百分比，如 1.5 -> "+1.50%"
pub fn format_signed_percent(value: f64) -> String {
    format!("{}{:.2}%", if value > 0.0 { "+" } else { "" }, value)
}

/// 带正号的数值，如 1.5 -> "+1.50"
pub fn format_signed_number(value: f64) -> String {
    format!("{}{:.2}", if value > 0.0 { "+" } else { "" }, value)
}

/// 从 JSON 值读取数值，兼容数字字符串
pub fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::String(s) => s.trim().parse().ok(),
        other => other.as_f64(),
    }
}
