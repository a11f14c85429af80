//! 工具注册与调用
//!
//! 每个工具是一个异步函数：接收 JSON 参数，返回 Markdown 文本。
//! 爬虫方法本身不依赖注册机制，这里只负责参数读取、调用和格式化。

mod financial;
mod kline;
mod market;

use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::{Map, Value};

use crate::models::{Row, ToolInfo};
use crate::services::eastmoney::{FinancialAnalysisCrawler, MarketCrawler};
use crate::utils::{format_currency, format_number, format_percent, value_as_f64};

pub use financial::register_financial_analysis_tools;
pub use kline::register_kline_tools;
pub use market::register_market_tools;

type ToolHandler = Arc<dyn Fn(ToolArgs) -> BoxFuture<'static, String> + Send + Sync>;

/// 工具调用参数
#[derive(Debug, Clone, Default)]
pub struct ToolArgs(Map<String, Value>);

impl ToolArgs {
    /// 读取字符串参数，数字参数会转成字符串
    pub fn str(&self, key: &str) -> Option<String> {
        match self.0.get(key)? {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn str_or(&self, key: &str, default: &str) -> String {
        self.str(key).unwrap_or_else(|| default.to_string())
    }

    /// 读取整数参数，兼容数字字符串
    pub fn i64_or(&self, key: &str, default: i64) -> i64 {
        match self.0.get(key) {
            Some(Value::Number(n)) => n.as_i64().unwrap_or(default),
            Some(Value::String(s)) => s.trim().parse().unwrap_or(default),
            _ => default,
        }
    }

    /// 读取必填字符串参数，缺失时返回提示文本
    pub fn required(&self, key: &str) -> Result<String, String> {
        self.str(key).ok_or_else(|| format!("缺少参数: {}", key))
    }
}

impl From<Value> for ToolArgs {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }
}

struct RegisteredTool {
    info: ToolInfo,
    handler: ToolHandler,
}

/// 工具注册表
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<RegisteredTool>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册工具，同名工具会被替换
    pub fn register<F, Fut>(&mut self, name: &str, description: &str, handler: F)
    where
        F: Fn(ToolArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = String> + Send + 'static,
    {
        let handler: ToolHandler = Arc::new(move |args: ToolArgs| handler(args).boxed());
        let info = ToolInfo {
            name: name.to_string(),
            description: description.trim().to_string(),
        };

        match self.tools.iter_mut().find(|t| t.info.name == name) {
            Some(existing) => {
                log::warn!("工具 {} 已存在，覆盖注册", name);
                existing.info = info;
                existing.handler = handler;
            }
            None => self.tools.push(RegisteredTool { info, handler }),
        }
    }

    /// 已注册工具列表（按注册顺序）
    pub fn list(&self) -> Vec<ToolInfo> {
        self.tools.iter().map(|t| t.info.clone()).collect()
    }

    /// 调用工具，工具不存在时返回 None
    pub async fn call(&self, name: &str, args: ToolArgs) -> Option<String> {
        let handler = self
            .tools
            .iter()
            .find(|t| t.info.name == name)
            .map(|t| t.handler.clone())?;
        log::info!("调用工具 {}", name);
        Some(handler(args).await)
    }
}

/// 注册全部工具
pub fn build_registry(
    financial: Arc<FinancialAnalysisCrawler>,
    market: Arc<MarketCrawler>,
) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    register_financial_analysis_tools(&mut registry, financial);
    register_market_tools(&mut registry, market.clone());
    register_kline_tools(&mut registry, market);
    registry
}

// ==================== 行格式化辅助 ====================

/// 读取字段原值，缺失或 null 时为空字符串
fn field(row: &Row, key: &str) -> Value {
    match row.get(key) {
        None | Some(Value::Null) => Value::String(String::new()),
        Some(v) => v.clone(),
    }
}

/// 金额字段，格式化为亿/万元
fn currency_yuan(row: &Row, key: &str) -> Value {
    row.get(key)
        .and_then(format_currency)
        .map(|s| Value::String(format!("{}元", s)))
        .unwrap_or(Value::Null)
}

/// 百分比字段
fn percent(row: &Row, key: &str) -> Value {
    row.get(key)
        .and_then(value_as_f64)
        .map(|v| Value::String(format_percent(v)))
        .unwrap_or(Value::Null)
}

/// 两位小数字段
fn decimal(row: &Row, key: &str) -> Value {
    row.get(key)
        .and_then(value_as_f64)
        .map(|v| Value::String(format_number(v)))
        .unwrap_or(Value::Null)
}

/// 日期字段，只保留前 10 个字符
fn date10(row: &Row, key: &str) -> Value {
    let s = row.get(key).and_then(Value::as_str).unwrap_or("");
    Value::String(s.chars().take(10).collect())
}

/// 错误标记行中的错误信息
fn error_message(rows: &[Row]) -> Option<String> {
    rows.first()?.get("error").map(|e| match e {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_register_and_call() {
        let mut registry = ToolRegistry::new();
        registry.register("echo", "回显股票代码", |args: ToolArgs| async move {
            match args.required("stock_code") {
                Ok(code) => format!("code={}", code),
                Err(msg) => msg,
            }
        });

        assert_eq!(registry.list()[0].name, "echo");
        assert_eq!(registry.list()[0].description, "回显股票代码");

        let out = registry
            .call("echo", ToolArgs::from(json!({"stock_code": "688041.SH"})))
            .await;
        assert_eq!(out.as_deref(), Some("code=688041.SH"));

        let out = registry.call("echo", ToolArgs::default()).await;
        assert_eq!(out.as_deref(), Some("缺少参数: stock_code"));

        assert!(registry.call("missing", ToolArgs::default()).await.is_none());
    }

    #[tokio::test]
    async fn test_register_replaces_same_name() {
        let mut registry = ToolRegistry::new();
        registry.register("t", "v1", |_| async { "1".to_string() });
        registry.register("t", "v2", |_| async { "2".to_string() });

        assert_eq!(registry.list().len(), 1);
        assert_eq!(registry.list()[0].description, "v2");
        assert_eq!(registry.call("t", ToolArgs::default()).await.as_deref(), Some("2"));
    }

    #[test]
    fn test_tool_args() {
        let args = ToolArgs::from(json!({"plate_type": "3", "n": 5, "blank": "  "}));
        assert_eq!(args.i64_or("plate_type", 2), 3);
        assert_eq!(args.i64_or("missing", 2), 2);
        assert_eq!(args.str("n").as_deref(), Some("5"));
        assert!(args.str("blank").is_none());
        assert_eq!(args.str_or("date_type_code", "004"), "004");
    }

    #[test]
    fn test_row_helpers() {
        let row = json!({
            "TOTALOPERATEREVE": 123456789.0,
            "RATIO": 12.346,
            "END_DATE": "2024-09-30 00:00:00",
            "NAME": null
        })
        .as_object()
        .cloned()
        .unwrap();

        assert_eq!(currency_yuan(&row, "TOTALOPERATEREVE"), json!("1.23亿元"));
        assert_eq!(currency_yuan(&row, "MISSING"), Value::Null);
        assert_eq!(percent(&row, "RATIO"), json!("12.35%"));
        assert_eq!(date10(&row, "END_DATE"), json!("2024-09-30"));
        assert_eq!(field(&row, "NAME"), json!(""));
    }
}
