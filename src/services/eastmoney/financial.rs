//! 财报分析数据爬虫
//!
//! 对接东方财富数据中心 F10 接口，获取业绩概况、股东户数、同行业盈利比较等数据。
//!
//! 返回约定（各方法不同，调用方需分别处理）：
//! - 业绩概况、股东户数、同行业比较：失败时返回 `[{"error": 消息}]`
//! - 最新报告日期：接口失败返回 `[消息]`，异常返回 `["获取最新报告日期时发生异常: ..."]`

use std::collections::HashSet;

use serde_json::{json, Value};

use super::client::{EastMoneyClient, QueryParams};
use super::common::{current_year, date_prefix};
use super::error::{CrawlerError, CrawlerResult};
use crate::models::Row;

/// 报告日期异常标记，出现在异常路径返回的字符串中
pub const EXCEPTION_MARKER: &str = "异常";

const UNKNOWN_ERROR: &str = "未知错误";

const FINANCIAL_SUMMARY_COLUMNS: &str = "SECUCODE,SECURITY_CODE,SECURITY_NAME_ABBR,ORG_CODE,REPORT_DATE,DATE_TYPE_CODE,DATE_TYPE,PARENTNETPROFIT,TOTALOPERATEREVE,KCFJCXSYJLR,PARENTNETPROFIT_RATIO,TOTALOPERATEREVE_RATIO,KCFJCXSYJLR_RATIO,YEAR,TYPE,IS_PUBLISH";
const HOLDER_NUMBER_COLUMNS: &str =
    "SECURITY_CODE,SECUCODE,SECURITY_NAME_ABBR,HOLDER_NUM,REPORT,END_DATE,CLOSE_PRICE";

/// 财报分析数据爬虫
#[derive(Debug, Clone)]
pub struct FinancialAnalysisCrawler {
    client: EastMoneyClient,
    base_url: String,
}

impl FinancialAnalysisCrawler {
    /// 指定数据中心接口地址
    pub fn with_base_url(client: EastMoneyClient, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// 获取业绩概况数据
    ///
    /// - stock_code: 股票代码，包含交易所代码，如 688041.SH
    /// - date_type_code: "001" 一季报，"002" 半年报，"003" 三季报，"004" 年报
    pub async fn get_financial_summary(&self, stock_code: &str, date_type_code: &str) -> Vec<Row> {
        let params: QueryParams = vec![
            ("reportName", "RPT_F10_FN_PERFORM".to_string()),
            ("columns", FINANCIAL_SUMMARY_COLUMNS.to_string()),
            (
                "filter",
                format!(
                    r#"(SECUCODE="{}")(DATE_TYPE_CODE in ("{}"))"#,
                    stock_code, date_type_code
                ),
            ),
            ("sortTypes", "-1".to_string()),
            ("sortColumns", "REPORT_DATE".to_string()),
            ("pageNumber", "1".to_string()),
            ("pageSize", "200".to_string()),
            ("source", "F10".to_string()),
            ("client", "PC".to_string()),
            ("v", "0748758885949164".to_string()),
        ];

        self.fetch_report(&params).await.unwrap_or_else(error_rows)
    }

    /// 获取股东户数数据，按截止日期倒序
    pub async fn get_holder_number(&self, stock_code: &str) -> Vec<Row> {
        let params: QueryParams = vec![
            ("reportName", "RPT_HOLDERNUM_DET".to_string()),
            ("columns", HOLDER_NUMBER_COLUMNS.to_string()),
            ("filter", format!(r#"(SECUCODE="{}")"#, stock_code)),
            ("sortTypes", "-1".to_string()),
            ("sortColumns", "END_DATE".to_string()),
            ("pageNumber", "1".to_string()),
            ("pageSize", "200".to_string()),
            ("source", "F10".to_string()),
            ("client", "PC".to_string()),
            ("v", "07356204940503169".to_string()),
        ];

        self.fetch_report(&params).await.unwrap_or_else(error_rows)
    }

    /// 获取最新报告日期（YYYY-MM-DD），去重并保持首次出现顺序
    pub async fn get_latest_report_dates(&self, stock_code: &str) -> Vec<String> {
        let params: QueryParams = vec![
            ("reportName", "RPT_F10_INDUSTRY_COMPARED".to_string()),
            ("columns", "REPORT_DATE".to_string()),
            ("quoteColumns", String::new()),
            ("filter", format!(r#"(SECUCODE="{}")"#, stock_code)),
            ("sortTypes", "1,-1".to_string()),
            ("sortColumns", "IS_SELF,TOTALOPERATEREVE_RANK".to_string()),
            ("pageNumber", "1".to_string()),
            ("pageSize", "4".to_string()),
            ("source", "F10".to_string()),
            ("client", "PC".to_string()),
            ("v", "005130138354940328".to_string()),
        ];

        match self.fetch_report(&params).await {
            Ok(rows) => unique_report_dates(&rows),
            Err(CrawlerError::Provider(message)) => vec![message],
            Err(e) => vec![format!("获取最新报告日期时发生{}: {}", EXCEPTION_MARKER, e)],
        }
    }

    /// 获取同行业公司盈利数据
    ///
    /// 未指定报告日期时先查询最新报告日期；每个日期单独请求一次，结果按日期顺序拼接。
    /// 某个日期失败只影响该日期，对应位置追加一行 `{"error": ...}`。
    pub async fn get_industry_profit_comparison(
        &self,
        stock_code: &str,
        report_dates: Option<Vec<String>>,
    ) -> Vec<Row> {
        let report_dates = match report_dates {
            Some(dates) if !dates.is_empty() => dates,
            _ => self.resolve_report_dates(stock_code).await,
        };

        let mut all_data = Vec::new();
        for report_date in &report_dates {
            let params: QueryParams = vec![
                ("reportName", "RPT_F10_INDUSTRY_COMPARED".to_string()),
                ("columns", "ALL".to_string()),
                ("quoteColumns", String::new()),
                (
                    "filter",
                    format!(r#"(SECUCODE="{}")(REPORT_DATE='{}')"#, stock_code, report_date),
                ),
                ("sortTypes", "-1,1".to_string()),
                ("sortColumns", "IS_SELF,TOTALOPERATEREVE_RANK".to_string()),
                ("pageNumber", "1".to_string()),
                ("pageSize", "4".to_string()),
                ("source", "F10".to_string()),
                ("client", "PC".to_string()),
                ("v", "08494015389572059".to_string()),
            ];

            match self.fetch_report(&params).await {
                Ok(rows) => all_data.extend(rows),
                Err(e) => {
                    log::warn!("获取 {} 在 {} 的同行业数据失败: {}", stock_code, report_date, e);
                    all_data.extend(error_rows(e));
                }
            }
        }

        all_data
    }

    /// 查询最新报告日期，失败时退回当年三季报日期
    async fn resolve_report_dates(&self, stock_code: &str) -> Vec<String> {
        let dates = self.get_latest_report_dates(stock_code).await;
        let failed = dates
            .first()
            .map_or(true, |first| first.contains(EXCEPTION_MARKER));

        if failed {
            let default_date = format!("{}-9-30", current_year());
            log::warn!("无法获取最新报告日期，尝试使用默认日期: {}", default_date);
            vec![default_date]
        } else {
            dates
        }
    }

    /// 请求数据中心接口并校验响应
    ///
    /// 成功条件：code == 0 且 success == true 且 result 非空
    async fn fetch_report(&self, params: &QueryParams) -> CrawlerResult<Vec<Row>> {
        let response = self.client.get_json(&self.base_url, params).await?;
        parse_envelope(&response)
    }
}

/// 校验数据中心响应信封并取出 result.data
fn parse_envelope(response: &Value) -> CrawlerResult<Vec<Row>> {
    let code_ok = response.get("code").and_then(Value::as_i64) == Some(0);
    let success = response.get("success").and_then(Value::as_bool) == Some(true);
    let result = response.get("result").filter(|r| is_truthy(r));

    match result {
        Some(result) if code_ok && success => Ok(result
            .get("data")
            .and_then(Value::as_array)
            .map(|rows| rows.iter().filter_map(|r| r.as_object().cloned()).collect())
            .unwrap_or_default()),
        _ => {
            let message = response
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or(UNKNOWN_ERROR);
            Err(CrawlerError::Provider(message.to_string()))
        }
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Object(map) => !map.is_empty(),
        Value::Array(arr) => !arr.is_empty(),
        Value::String(s) => !s.is_empty(),
        Value::Number(_) => true,
    }
}

fn unique_report_dates(rows: &[Row]) -> Vec<String> {
    let mut seen = HashSet::new();
    rows.iter()
        .filter_map(|row| row.get("REPORT_DATE").and_then(Value::as_str))
        .map(date_prefix)
        .filter(|date| !date.is_empty())
        .filter(|date| seen.insert(date.to_string()))
        .map(str::to_string)
        .collect()
}

/// 错误标记：单元素列表 `[{"error": 消息}]`
fn error_rows(e: CrawlerError) -> Vec<Row> {
    let mut row = Row::new();
    row.insert("error".to_string(), json!(e.to_string()));
    vec![row]
}
