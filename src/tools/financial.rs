//! 财务分析工具
//!
//! 业绩概况、股东户数、同行业公司盈利对比

use std::sync::Arc;

use serde_json::{json, Value};

use super::{currency_yuan, date10, decimal, error_message, field, percent, ToolArgs, ToolRegistry};
use crate::models::{ReportType, Row};
use crate::services::eastmoney::FinancialAnalysisCrawler;
use crate::utils::{format_list_to_markdown_table, value_as_f64};

const FINANCIAL_SUMMARY_DESC: &str = r#"
获取业绩概况数据：指定股票历史各期的营业收入、归母净利润、扣非净利润及同比增长。
参数：stock_code 股票代码，包含交易所代码，如 688041.SH；
date_type_code 报告类型代码，"001" 一季度报告，"002" 半年度报告，"003" 三季度报告，"004" 年度报告（默认）。
"#;

const HOLDER_NUMBER_DESC: &str = r#"
获取股东户数数据：指定股票历史各期的股东人数及对应收盘价。
参数：stock_code 股票代码，包含交易所代码，如 688041.SH。
"#;

const INDUSTRY_COMPARISON_DESC: &str = r#"
获取同行业公司盈利对比数据：同行业公司的市值、市净率、净资产收益率、营收和净利润等指标。
参数：stock_code 股票代码，数字后必须添加交易所代码，如 688041.SH。
"#;

/// 注册财务分析相关工具
pub fn register_financial_analysis_tools(
    registry: &mut ToolRegistry,
    crawler: Arc<FinancialAnalysisCrawler>,
) {
    let c = crawler.clone();
    registry.register("get_financial_summary", FINANCIAL_SUMMARY_DESC, move |args: ToolArgs| {
        let c = c.clone();
        async move {
            match args.required("stock_code") {
                Ok(stock_code) => {
                    let date_type_code = args.str_or("date_type_code", "004");
                    financial_summary(&c, &stock_code, &date_type_code).await
                }
                Err(msg) => msg,
            }
        }
    });

    let c = crawler.clone();
    registry.register("get_holder_number", HOLDER_NUMBER_DESC, move |args: ToolArgs| {
        let c = c.clone();
        async move {
            match args.required("stock_code") {
                Ok(stock_code) => holder_number(&c, &stock_code).await,
                Err(msg) => msg,
            }
        }
    });

    let c = crawler;
    registry.register(
        "get_industry_profit_comparison",
        INDUSTRY_COMPARISON_DESC,
        move |args: ToolArgs| {
            let c = c.clone();
            async move {
                match args.required("stock_code") {
                    Ok(stock_code) => industry_profit_comparison(&c, &stock_code).await,
                    Err(msg) => msg,
                }
            }
        },
    );

    log::info!("财务分析工具已注册");
}

/// 业绩概况 Markdown
pub async fn financial_summary(
    crawler: &FinancialAnalysisCrawler,
    stock_code: &str,
    date_type_code: &str,
) -> String {
    log::info!("获取股票 {} 的业绩概况数据", stock_code);
    let rows = crawler.get_financial_summary(stock_code, date_type_code).await;

    if rows.is_empty() {
        return format!("未能获取到股票 {} 的业绩概况数据", stock_code);
    }
    if let Some(error) = error_message(&rows) {
        return format!("获取业绩概况数据失败: {}", error);
    }

    let report_name = ReportType::from_code(date_type_code)
        .map(|r| format!("（{}）", r.name()))
        .unwrap_or_default();
    let formatted = format_financial_summary(&rows);
    format!(
        "## {} 业绩概况数据{}\n\n{}\n\n💡 显示 {} 条业绩概况数据",
        stock_code,
        report_name,
        format_list_to_markdown_table(&formatted),
        formatted.len()
    )
}

/// 股东户数 Markdown
pub async fn holder_number(crawler: &FinancialAnalysisCrawler, stock_code: &str) -> String {
    log::info!("获取股票 {} 的股东户数数据", stock_code);
    let rows = crawler.get_holder_number(stock_code).await;

    if rows.is_empty() {
        return format!("未能获取到股票 {} 的股东户数数据", stock_code);
    }
    if let Some(error) = error_message(&rows) {
        return format!("获取股东户数数据失败: {}", error);
    }

    let formatted = format_holder_number(&rows);
    format!(
        "## {} 股东户数数据\n\n{}\n\n💡 显示 {} 条股东户数数据",
        stock_code,
        format_list_to_markdown_table(&formatted),
        formatted.len()
    )
}

/// 同行业公司盈利对比 Markdown
pub async fn industry_profit_comparison(
    crawler: &FinancialAnalysisCrawler,
    stock_code: &str,
) -> String {
    log::info!("获取股票 {} 的同行业公司盈利数据", stock_code);
    let rows = crawler.get_industry_profit_comparison(stock_code, None).await;

    if rows.is_empty() {
        return format!("未能获取到股票 {} 的同行业公司盈利数据", stock_code);
    }
    if let Some(error) = error_message(&rows) {
        return format!("获取同行业公司盈利数据失败: {}", error);
    }

    let formatted = format_industry_comparison(&rows);
    format!(
        "## {} 同行业公司盈利对比数据\n\n{}\n\n💡 显示 {} 条同行业公司盈利数据",
        stock_code,
        format_list_to_markdown_table(&formatted),
        formatted.len()
    )
}

fn format_financial_summary(rows: &[Row]) -> Vec<Row> {
    rows.iter()
        .map(|item| {
            let mut row = Row::new();
            row.insert("报告期".into(), field(item, "DATE_TYPE"));
            row.insert("报告类型".into(), field(item, "TYPE"));
            row.insert("营业收入".into(), currency_yuan(item, "TOTALOPERATEREVE"));
            row.insert("营业收入同比增长".into(), percent(item, "TOTALOPERATEREVE_RATIO"));
            row.insert("归母净利润".into(), currency_yuan(item, "PARENTNETPROFIT"));
            row.insert("归母净利润同比增长率".into(), percent(item, "PARENTNETPROFIT_RATIO"));
            row.insert("扣非净利润".into(), currency_yuan(item, "KCFJCXSYJLR"));
            row.insert("扣非净利润同比增长".into(), percent(item, "KCFJCXSYJLR_RATIO"));
            row
        })
        .collect()
}

fn format_holder_number(rows: &[Row]) -> Vec<Row> {
    rows.iter()
        .map(|item| {
            let holder_num = item
                .get("HOLDER_NUM")
                .and_then(value_as_f64)
                .map(|n| json!(format!("{}户", thousands(n))))
                .unwrap_or(Value::Null);
            let close_price = item
                .get("CLOSE_PRICE")
                .and_then(value_as_f64)
                .map(|p| json!(format!("{:.2}元", p)))
                .unwrap_or(Value::Null);

            let mut row = Row::new();
            row.insert("股东户数".into(), holder_num);
            row.insert("股价".into(), close_price);
            row.insert("报告期".into(), field(item, "REPORT"));
            row.insert("截止日期".into(), date10(item, "END_DATE"));
            row
        })
        .collect()
}

fn format_industry_comparison(rows: &[Row]) -> Vec<Row> {
    rows.iter()
        .map(|item| {
            let is_self = item.get("IS_SELF").and_then(value_as_f64) == Some(1.0);
            let roe = |key: &str| percent(item, key);

            let mut row = Row::new();
            row.insert("证券代码".into(), field(item, "SECURITY_CODE"));
            row.insert("证券简称".into(), field(item, "SECURITY_NAME_ABBR"));
            row.insert("关联代码".into(), field(item, "CORRE_SECURITY_CODE"));
            row.insert("关联名称".into(), field(item, "CORRE_SECURITY_NAME"));
            row.insert("行业".into(), field(item, "INDUSTRY"));
            row.insert("总市值".into(), currency_yuan(item, "TOTAL_MARKET_CAP"));
            row.insert("总市值排名".into(), field(item, "TOTAL_MARKET_CAP_RANK"));
            row.insert("市净率".into(), decimal(item, "PB"));
            row.insert("市净率排名".into(), field(item, "PB_RANK"));
            row.insert("行业平均市净率".into(), decimal(item, "AVG_INDUSTRY_PB"));
            row.insert("净资产收益率".into(), roe("ROE"));
            row.insert("净资产收益率排名".into(), field(item, "ROE_RANK"));
            row.insert("行业平均净资产收益率".into(), roe("AVG_INDUSTRY_ROE"));
            row.insert("营业收入".into(), currency_yuan(item, "TOTALOPERATEREVE"));
            row.insert("上年同期营业收入".into(), currency_yuan(item, "TOTALOPERATEREVE_L1Y"));
            row.insert("上上年营业收入".into(), currency_yuan(item, "TOTALOPERATEREVE_L2Y"));
            row.insert("营收排名".into(), field(item, "TOTALOPERATEREVE_RANK"));
            row.insert("归母净利润".into(), currency_yuan(item, "PARENTNETPROFIT"));
            row.insert("上年同期归母净利润".into(), currency_yuan(item, "PARENTNETPROFIT_L1Y"));
            row.insert("上上年归母净利润".into(), currency_yuan(item, "PARENTNETPROFIT_L2Y"));
            row.insert("是否本股".into(), json!(if is_self { "是" } else { "否" }));
            row.insert("报告期".into(), date10(item, "REPORT_DATE"));
            row.insert("报告类型".into(), field(item, "REPORT_TYPE"));
            row
        })
        .collect()
}

/// 千分位整数，如 12345.0 -> "12,345"
fn thousands(n: f64) -> String {
    let digits = format!("{:.0}", n.abs());
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    if n < 0.0 {
        format!("-{}", out)
    } else {
        out
    }
}
