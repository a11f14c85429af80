//! 股票数据模型
//!
//! 定义股票代码、报告类型、K线等数据结构

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

use crate::services::eastmoney::{CrawlerError, CrawlerResult};

/// 接口返回的单行数据，保持接口原始字段顺序
pub type Row = serde_json::Map<String, serde_json::Value>;

/// 交易所
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Exchange {
    /// 上海证券交易所
    SH,
    /// 深圳证券交易所
    SZ,
    /// 北京证券交易所
    BJ,
}

impl Exchange {
    pub fn from_suffix(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "SH" => Some(Self::SH),
            "SZ" => Some(Self::SZ),
            "BJ" => Some(Self::BJ),
            _ => None,
        }
    }

    pub fn suffix(&self) -> &'static str {
        match self {
            Self::SH => "SH",
            Self::SZ => "SZ",
            Self::BJ => "BJ",
        }
    }

    /// secid 中的市场编号：沪市为 1，深市和北交所为 0
    pub fn market_digit(&self) -> u8 {
        match self {
            Self::SH => 1,
            Self::SZ | Self::BJ => 0,
        }
    }
}

/// 股票代码，格式如 688041.SH
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockCode {
    /// 6 位数字代码
    pub code: String,
    /// 交易所
    pub exchange: Exchange,
}

fn stock_code_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d{6})\.([A-Za-z]{2})$").unwrap())
}

impl StockCode {
    /// 解析 `{code}.{exchange}` 形式的股票代码
    pub fn parse(s: &str) -> CrawlerResult<Self> {
        let s = s.trim();
        let caps = stock_code_regex()
            .captures(s)
            .ok_or_else(|| CrawlerError::MalformedInput(format!("股票代码 {} 格式应为 688041.SH", s)))?;

        let suffix = &caps[2];
        let exchange = Exchange::from_suffix(suffix)
            .ok_or_else(|| CrawlerError::MalformedInput(format!("未知交易所后缀: {}", suffix)))?;

        Ok(Self {
            code: caps[1].to_string(),
            exchange,
        })
    }

    /// 数据中心接口使用的 SECUCODE，如 688041.SH
    pub fn secucode(&self) -> String {
        format!("{}.{}", self.code, self.exchange.suffix())
    }

    /// 行情接口使用的 secid，如 1.688041
    pub fn secid(&self) -> String {
        format!("{}.{}", self.exchange.market_digit(), self.code)
    }
}

impl fmt::Display for StockCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.secucode())
    }
}

/// 财报类型代码
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportType {
    FirstQuarter,
    HalfYear,
    ThirdQuarter,
    Annual,
}

impl ReportType {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "001" => Some(Self::FirstQuarter),
            "002" => Some(Self::HalfYear),
            "003" => Some(Self::ThirdQuarter),
            "004" => Some(Self::Annual),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::FirstQuarter => "001",
            Self::HalfYear => "002",
            Self::ThirdQuarter => "003",
            Self::Annual => "004",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::FirstQuarter => "一季度报告",
            Self::HalfYear => "半年度报告",
            Self::ThirdQuarter => "三季度报告",
            Self::Annual => "年度报告",
        }
    }
}

/// 板块类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlateType {
    /// 地域板块
    Region = 1,
    /// 行业板块
    Industry = 2,
    /// 概念板块
    Concept = 3,
}

impl PlateType {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::Region),
            2 => Some(Self::Industry),
            3 => Some(Self::Concept),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Region => "地域板块",
            Self::Industry => "行业板块",
            Self::Concept => "概念板块",
        }
    }
}

/// K线周期
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KlineFrequency {
    Daily,
    Weekly,
    Monthly,
    Min5,
    Min15,
    Min30,
    Min60,
}

impl KlineFrequency {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "d" | "D" => Some(Self::Daily),
            "w" | "W" => Some(Self::Weekly),
            "m" | "M" => Some(Self::Monthly),
            "5" => Some(Self::Min5),
            "15" => Some(Self::Min15),
            "30" => Some(Self::Min30),
            "60" => Some(Self::Min60),
            _ => None,
        }
    }

    /// 东方财富 klt 参数
    pub fn klt(&self) -> &'static str {
        match self {
            Self::Daily => "101",
            Self::Weekly => "102",
            Self::Monthly => "103",
            Self::Min5 => "5",
            Self::Min15 => "15",
            Self::Min30 => "30",
            Self::Min60 => "60",
        }
    }
}

/// K线数据
///
/// 由东方财富 klines 字符串解析得到，字段顺序固定：
/// 日期,开盘,收盘,最高,最低,成交量,成交额,振幅,涨跌幅,涨跌额,换手率
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KLineRecord {
    /// 日期
    pub date: String,
    /// 开盘价
    pub open: f64,
    /// 收盘价
    pub close: f64,
    /// 最高价
    pub high: f64,
    /// 最低价
    pub low: f64,
    /// 成交量（手）
    pub volume: i64,
    /// 成交额
    pub amount: f64,
    /// 振幅（百分比）
    pub amplitude: f64,
    /// 涨跌幅（百分比）
    pub change_percent: f64,
    /// 涨跌额
    pub change_amount: f64,
    /// 换手率（百分比）
    pub turnover_rate: f64,
}

/// 财报查询参数
#[derive(Debug, Deserialize)]
pub struct FinancialQuery {
    /// 报告类型代码 001-004
    pub date_type_code: Option<String>,
    /// 报告日期列表，逗号分隔，格式 YYYY-MM-DD
    pub report_dates: Option<String>,
}

/// K线查询参数
#[derive(Debug, Deserialize)]
pub struct KlineQuery {
    /// 开始日期（YYYY-MM-DD）
    pub start_date: String,
    /// 结束日期（YYYY-MM-DD）
    pub end_date: String,
    /// K线周期：d, w, m, 5, 15, 30, 60
    pub frequency: Option<String>,
}

/// 板块行情查询参数
#[derive(Debug, Deserialize)]
pub struct PlateQuery {
    /// 板块类型：1 地域，2 行业，3 概念
    pub plate_type: Option<i64>,
}
