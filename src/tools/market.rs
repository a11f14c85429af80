//! 市场行情工具

use std::sync::Arc;

use serde_json::{json, Value};

use super::{ToolArgs, ToolRegistry};
use crate::models::{PlateType, Row};
use crate::services::eastmoney::MarketCrawler;
use crate::utils::{
    format_currency_value, format_list_to_markdown_table, format_number, format_percent,
    format_signed_number, format_signed_percent, value_as_f64,
};

const PLATE_QUOTATION_DESC: &str = r#"
获取板块行情数据：东方财富网按涨跌幅排序的板块行情。
参数：plate_type 板块类型，1 地域板块，2 行业板块（默认），3 概念板块。
"#;

const FUND_FLOW_DESC: &str = r#"
获取个股历史资金流向：最近 10 个交易日主力、超大单、大单、中单、小单的净流入及净占比。
参数：stock_code 股票代码，包含交易所代码，如 300750.SZ。
"#;

/// 资金流向K线最少字段数（f51..f63）
const FUND_FLOW_MIN_FIELDS: usize = 13;

/// 注册市场行情工具
pub fn register_market_tools(registry: &mut ToolRegistry, crawler: Arc<MarketCrawler>) {
    let c = crawler.clone();
    registry.register("get_plate_quotation", PLATE_QUOTATION_DESC, move |args: ToolArgs| {
        let c = c.clone();
        async move { plate_quotation(&c, args.i64_or("plate_type", 2)).await }
    });

    let c = crawler;
    registry.register("get_historical_fund_flow", FUND_FLOW_DESC, move |args: ToolArgs| {
        let c = c.clone();
        async move {
            match args.required("stock_code") {
                Ok(stock_code) => historical_fund_flow(&c, &stock_code).await,
                Err(msg) => msg,
            }
        }
    });

    log::info!("市场板块行情工具已注册");
}

/// 板块行情 Markdown
pub async fn plate_quotation(crawler: &MarketCrawler, plate_type: i64) -> String {
    log::info!("获取板块行情数据: 板块类型={}", plate_type);

    let raw = match crawler.get_plate_quotation(plate_type).await {
        Ok(raw) => raw,
        Err(e) => {
            log::error!("工具执行出错: {}", e);
            return format!("执行失败: {}", e);
        }
    };
    if raw.is_empty() {
        return "未找到板块行情数据".to_string();
    }

    let plate_name = PlateType::from_code(plate_type)
        .map(|p| p.name())
        .unwrap_or("未知板块");
    let formatted = format_plate_data(&raw);

    format!(
        "## {}行情数据\n\n{}\n\n💡 显示前{}个{}的行情数据",
        plate_name,
        format_list_to_markdown_table(&formatted),
        formatted.len(),
        plate_name
    )
}

/// 个股历史资金流向 Markdown
pub async fn historical_fund_flow(crawler: &MarketCrawler, stock_code: &str) -> String {
    log::info!("获取股票 {} 的历史资金流向", stock_code);

    let data = match crawler.get_historical_fund_flow(stock_code).await {
        Ok(Some(data)) => data,
        Ok(None) => return format!("未能获取到股票 {} 的资金流向数据", stock_code),
        Err(e) => {
            log::error!("工具执行出错: {}", e);
            return format!("执行失败: {}", e);
        }
    };

    let klines: Vec<&str> = data
        .get("klines")
        .and_then(Value::as_array)
        .map(|arr| arr.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();
    let formatted = format_fund_flow(&klines);
    if formatted.is_empty() {
        return format!("未能获取到股票 {} 的资金流向数据", stock_code);
    }

    let title = match data.get("name").and_then(Value::as_str) {
        Some(name) => format!("{}({})", name, stock_code),
        None => stock_code.to_string(),
    };
    format!(
        "## {} 历史资金流向\n\n{}\n\n💡 显示 {} 条资金流向数据",
        title,
        format_list_to_markdown_table(&formatted),
        formatted.len()
    )
}

/// 读取数值字段，缺失、null 或 "-" 时为 0
fn num(item: &Value, key: &str) -> f64 {
    item.get(key).and_then(value_as_f64).unwrap_or(0.0)
}

fn text(item: &Value, key: &str) -> String {
    match item.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn market_name(item: &Value, key: &str) -> &'static str {
    if num(item, key) == 1.0 {
        "沪市"
    } else {
        "深市"
    }
}

/// 板块行情字段：价格类 ×100 存储，总市值换算为亿
fn format_plate_data(raw: &[Value]) -> Vec<Row> {
    raw.iter()
        .map(|item| {
            let mut row = Row::new();
            row.insert("板块代码".into(), json!(text(item, "f12")));
            row.insert("板块名称".into(), json!(text(item, "f14")));
            row.insert("最新价".into(), json!(format_number(num(item, "f2") / 100.0)));
            row.insert("涨跌幅".into(), json!(format_signed_percent(num(item, "f3") / 100.0)));
            row.insert("涨跌额".into(), json!(format_signed_number(num(item, "f4") / 100.0)));
            row.insert("换手率".into(), json!(format_percent(num(item, "f8") / 100.0)));
            row.insert("总市值(亿)".into(), json!(format_number(num(item, "f20") / 100_000_000.0)));
            row.insert("上涨家数".into(), item.get("f104").cloned().unwrap_or(json!(0)));
            row.insert("下跌家数".into(), item.get("f105").cloned().unwrap_or(json!(0)));
            row.insert(
                "领涨股".into(),
                json!(format!("{}({})", text(item, "f128"), text(item, "f140"))),
            );
            row.insert("领涨股市场".into(), json!(market_name(item, "f141")));
            row.insert(
                "领涨股涨跌幅".into(),
                json!(format_signed_percent(num(item, "f136") / 100.0)),
            );
            row.insert(
                "领跌股".into(),
                json!(format!("{}({})", text(item, "f207"), text(item, "f208"))),
            );
            row.insert("领跌股市场".into(), json!(market_name(item, "f209")));
            row.insert(
                "领跌股涨跌幅".into(),
                json!(format_signed_percent(num(item, "f222") / 100.0)),
            );
            row
        })
        .collect()
}

/// 资金流向K线: 日期,主力,小单,中单,大单,超大单净流入,主力..超大单净占比,收盘价,涨跌幅,...
fn format_fund_flow(klines: &[&str]) -> Vec<Row> {
    klines
        .iter()
        .filter_map(|line| {
            let fields: Vec<&str> = line.split(',').map(str::trim).collect();
            if fields.len() < FUND_FLOW_MIN_FIELDS {
                log::debug!("跳过无法解析的资金流向: {}", line);
                return None;
            }
            let n = |i: usize| fields[i].parse::<f64>().unwrap_or(0.0);
            let inflow = |i: usize| json!(format!("{}元", format_currency_value(n(i))));
            let ratio = |i: usize| json!(format_signed_percent(n(i)));

            let mut row = Row::new();
            row.insert("日期".into(), json!(fields[0]));
            row.insert("主力净流入".into(), inflow(1));
            row.insert("主力净占比".into(), ratio(6));
            row.insert("超大单净流入".into(), inflow(5));
            row.insert("超大单净占比".into(), ratio(10));
            row.insert("大单净流入".into(), inflow(4));
            row.insert("大单净占比".into(), ratio(9));
            row.insert("中单净流入".into(), inflow(3));
            row.insert("中单净占比".into(), ratio(8));
            row.insert("小单净流入".into(), inflow(2));
            row.insert("小单净占比".into(), ratio(7));
            row.insert("收盘价".into(), json!(format_number(n(11))));
            row.insert("涨跌幅".into(), json!(format_signed_percent(n(12))));
            Some(row)
        })
        .collect()
}
