//! 公共常量和辅助函数

use chrono::{Datelike, Utc};
use chrono_tz::Asia::Shanghai;

// ==================== 东方财富 API 常量 ====================

/// 数据中心 F10 接口（财报、股东户数、同行业比较）
pub const DATACENTER_API: &str = "https://datacenter.eastmoney.com/securities/api/data/v1/get";
/// 板块行情列表接口
pub const PUSH2_CLIST_API: &str = "https://push2.eastmoney.com/api/qt/clist/get";
/// 个股历史资金流向接口
pub const PUSH2HIS_FFLOW_API: &str = "https://push2his.eastmoney.com/api/qt/stock/fflow/daykline/get";
/// 个股历史K线接口
pub const PUSH2HIS_KLINE_API: &str = "https://push2his.eastmoney.com/api/qt/stock/kline/get";

/// 行情接口固定 ut 参数
pub const QUOTE_UT: &str = "fa5fd1943c7b386f172d6893dbfba10b";
/// 资金流向接口固定 ut 参数
pub const FFLOW_UT: &str = "b2884a393a59ad64002292a3e90d46a5";

pub const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// 获取北京时间字符串（ISO 8601 格式，带+08:00时区）
pub fn get_beijing_time() -> String {
    Utc::now().with_timezone(&Shanghai).to_rfc3339()
}

/// 当前北京时间所在年份
pub fn current_year() -> i32 {
    Utc::now().with_timezone(&Shanghai).year()
}

/// 截取日期字符串的日期部分，如 "2024-09-30 00:00:00" -> "2024-09-30"
pub fn date_prefix(s: &str) -> &str {
    s.split_whitespace().next().unwrap_or("")
}

/// YYYY-MM-DD 转为 YYYYMMDD
pub fn compact_date(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_digit()).collect()
}
