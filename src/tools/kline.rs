//! K线数据工具

use std::sync::Arc;

use serde_json::json;

use super::{ToolArgs, ToolRegistry};
use crate::models::{KLineRecord, Row};
use crate::services::eastmoney::{parse_kline_data, MarketCrawler};
use crate::utils::{
    format_large_number, format_list_to_markdown_table, format_number, format_percent,
    format_signed_percent,
};

const KLINE_DESC: &str = r#"
获取指定股票在指定日期范围内的K线数据，支持沪深北A股及指数（如 000001.SH 上证指数）。
参数：stock_code 股票代码，6 位数字后加交易所代码 SH/SZ/BJ，如 300750.SZ；
start_date 开始日期 (YYYY-MM-DD)；end_date 结束日期 (YYYY-MM-DD)；
frequency K线周期，"d" 日（默认），"w" 周，"m" 月，"5"/"15"/"30"/"60" 分钟。
"#;

/// 注册K线数据工具
pub fn register_kline_tools(registry: &mut ToolRegistry, crawler: Arc<MarketCrawler>) {
    registry.register("get_kline", KLINE_DESC, move |args: ToolArgs| {
        let c = crawler.clone();
        async move {
            let params = args
                .required("stock_code")
                .and_then(|code| Ok((code, args.required("start_date")?)))
                .and_then(|(code, start)| Ok((code, start, args.required("end_date")?)));
            match params {
                Ok((stock_code, start_date, end_date)) => {
                    let frequency = args.str_or("frequency", "d");
                    kline(&c, &stock_code, &start_date, &end_date, &frequency).await
                }
                Err(msg) => msg,
            }
        }
    });

    log::info!("K线数据工具已注册");
}

/// K线 Markdown
pub async fn kline(
    crawler: &MarketCrawler,
    stock_code: &str,
    start_date: &str,
    end_date: &str,
    frequency: &str,
) -> String {
    log::info!(
        "获取K线: {}, {} 至 {}, 频率: {}",
        stock_code,
        start_date,
        end_date,
        frequency
    );

    let raw = match crawler
        .get_historical_k_data(stock_code, start_date, end_date, frequency)
        .await
    {
        Ok(raw) => raw,
        Err(e) => {
            log::error!("获取K线时出错: {}", e);
            return format!("获取K线失败: {}", e);
        }
    };

    let records = parse_kline_data(&raw);
    if records.is_empty() {
        return format!(
            "未找到股票代码 '{}' 在 {} 至 {} 的K线数据",
            stock_code, start_date, end_date
        );
    }

    let formatted: Vec<Row> = records.iter().map(format_kline).collect();
    format!(
        "## {} K线数据\n\n{}\n\n💡 显示 {} 条K线数据，频率: {}",
        stock_code,
        format_list_to_markdown_table(&formatted),
        formatted.len(),
        frequency
    )
}

fn kline_status(k: &KLineRecord) -> &'static str {
    if k.close > k.open {
        "上涨（阳线）"
    } else if k.close < k.open {
        "下跌（阴线）"
    } else {
        "平盘（十字星）"
    }
}

fn format_kline(k: &KLineRecord) -> Row {
    let mut row = Row::new();
    row.insert("日期".into(), json!(k.date));
    row.insert("K线状态".into(), json!(kline_status(k)));
    row.insert("开盘".into(), json!(format_number(k.open)));
    row.insert("收盘".into(), json!(format_number(k.close)));
    row.insert("最高".into(), json!(format_number(k.high)));
    row.insert("最低".into(), json!(format_number(k.low)));
    row.insert("涨跌幅".into(), json!(format_signed_percent(k.change_percent)));
    row.insert("成交量".into(), json!(format_large_number(k.volume as f64)));
    row.insert("成交额".into(), json!(format_large_number(k.amount)));
    row.insert("振幅".into(), json!(format_percent(k.amplitude)));
    row.insert("涨跌额".into(), json!(format_number(k.change_amount)));
    row.insert("换手率".into(), json!(format_percent(k.turnover_rate)));
    row
}
