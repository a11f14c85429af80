//! 东方财富数据服务
//!
//! ## 数据来源
//! - datacenter.eastmoney.com：业绩概况、股东户数、同行业比较
//! - push2.eastmoney.com：板块行情
//! - push2his.eastmoney.com：历史资金流向、历史K线
//!
//! 各爬虫互不依赖，只共享基础请求客户端。

mod client;
mod common;
mod error;
mod financial;
mod kline;
mod market;

pub use client::{EastMoneyClient, DEFAULT_TIMEOUT_SECS};
pub use common::{get_beijing_time, DATACENTER_API};
pub use error::{CrawlerError, CrawlerResult};
pub use financial::FinancialAnalysisCrawler;
pub use kline::parse_kline_data;
pub use market::{MarketCrawler, MarketEndpoints};
