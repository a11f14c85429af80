//! 爬虫错误类型

use thiserror::Error;

/// 东方财富爬虫错误
#[derive(Debug, Error)]
pub enum CrawlerError {
    /// 网络请求失败、超时或 HTTP 状态码异常
    #[error("请求失败: {0}")]
    Transport(#[from] reqwest::Error),

    /// 响应体不是合法 JSON
    #[error("解析JSON失败: {0}")]
    Decode(#[from] serde_json::Error),

    /// 响应解析成功，但接口返回失败
    #[error("{0}")]
    Provider(String),

    /// 股票代码等输入格式错误
    #[error("输入格式错误: {0}")]
    MalformedInput(String),
}

pub type CrawlerResult<T> = std::result::Result<T, CrawlerError>;
