//! 东方财富基础请求客户端
//!
//! 负责 HTTP 请求、超时控制、JSON 解析和 JSONP 解包。
//! 各爬虫持有一个客户端句柄，底层 reqwest::Client 可注入、可克隆，连接池共享。

use std::time::Duration;

use chrono::Utc;
use rand::Rng;
use reqwest::Client;
use serde_json::Value;

use super::common::USER_AGENT;
use super::error::CrawlerResult;
use crate::models::StockCode;

/// 默认请求超时（秒）
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// 有序查询参数
pub type QueryParams = Vec<(&'static str, String)>;

/// 东方财富请求客户端
#[derive(Debug, Clone)]
pub struct EastMoneyClient {
    client: Client,
    timeout: Duration,
}

impl Default for EastMoneyClient {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT_SECS)
    }
}

impl EastMoneyClient {
    /// 创建客户端
    pub fn new(timeout_secs: u64) -> Self {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|e| {
                log::warn!("构建 HTTP 客户端失败，使用默认配置: {}", e);
                Client::new()
            });
        Self::with_client(client, timeout_secs)
    }

    /// 使用外部传入的 reqwest::Client
    pub fn with_client(client: Client, timeout_secs: u64) -> Self {
        Self {
            client,
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// 发送 GET 请求并按 JSON 解析响应体
    pub async fn get_json(&self, url: &str, params: &[(&str, String)]) -> CrawlerResult<Value> {
        let text = self.get_text(url, params).await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// 发送 GET 请求并解包 JSONP 响应
    ///
    /// 每次请求生成新的回调名并以 `cb` 参数附加在调用方参数之后。
    /// 响应无法解包时返回 `Ok(None)`，表示无数据。
    pub async fn get_jsonp(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> CrawlerResult<Option<Value>> {
        let mut query = params.to_vec();
        query.push(("cb", Self::generate_callback()));

        let text = self.get_text(url, &query).await?;
        let value = unwrap_jsonp(&text);
        if value.is_none() {
            let preview: String = text.chars().take(200).collect();
            log::warn!("JSONP 解包失败: {}", preview);
        }
        Ok(value)
    }

    async fn get_text(&self, url: &str, params: &[(&str, String)]) -> CrawlerResult<String> {
        log::debug!("📡 请求 URL: {} 参数: {:?}", url, params);

        let response = self
            .client
            .get(url)
            .query(params)
            .header("Referer", "https://quote.eastmoney.com/")
            .timeout(self.timeout)
            .send()
            .await?
            .error_for_status()?;

        let text = response.text().await?;
        let preview: String = text.chars().take(300).collect();
        log::trace!("📥 原始响应数据: {}", preview);
        Ok(text)
    }

    /// 生成 JSONP 回调函数名，如 jQuery112306817249012352718_1719999999999
    pub fn generate_callback() -> String {
        let mut rng = rand::thread_rng();
        let digits: String = (0..21)
            .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
            .collect();
        format!("jQuery{}_{}", digits, Self::timestamp_ms())
    }

    /// 当前毫秒时间戳
    pub fn timestamp_ms() -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// 去掉 `callback(...)` 包装并解析内部 JSON
pub fn unwrap_jsonp(text: &str) -> Option<Value> {
    let start = text.find('(')?;
    let end = text.rfind(')')?;
    if start >= end {
        return None;
    }
    serde_json::from_str(&text[start + 1..end]).ok()
}

/// 将 688041.SH 形式的股票代码转换为行情接口的 secid（1.688041）
///
/// 交易所后缀：SH -> 1，SZ/BJ -> 0。无法识别的后缀或代码格式返回 MalformedInput。
pub fn format_secid(stock_code: &str) -> CrawlerResult<String> {
    StockCode::parse(stock_code).map(|code| code.secid())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::eastmoney::CrawlerError;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_format_secid() {
        assert_eq!(format_secid("688041.SH").unwrap(), "1.688041");
        assert_eq!(format_secid("000021.SZ").unwrap(), "0.000021");
        assert_eq!(format_secid("830799.BJ").unwrap(), "0.830799");
    }

    #[test]
    fn test_format_secid_malformed() {
        assert!(matches!(
            format_secid("00700.HK"),
            Err(CrawlerError::MalformedInput(_))
        ));
        assert!(matches!(
            format_secid("600000"),
            Err(CrawlerError::MalformedInput(_))
        ));
    }

    #[test]
    fn test_generate_callback() {
        let a = EastMoneyClient::generate_callback();
        let b = EastMoneyClient::generate_callback();
        assert!(a.starts_with("jQuery"));
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
        assert_ne!(a, b);
    }

    #[test]
    fn test_unwrap_jsonp() {
        let v = unwrap_jsonp(r#"jQuery123_456({"rc":0,"data":{"total":1}});"#).unwrap();
        assert_eq!(v["data"]["total"], 1);

        assert!(unwrap_jsonp("no wrapper here").is_none());
        assert!(unwrap_jsonp("cb(not json)").is_none());
        assert!(unwrap_jsonp(")(").is_none());
    }

    #[tokio::test]
    async fn test_get_json_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/get"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let client = EastMoneyClient::default();
        let err = client
            .get_json(&format!("{}/get", server.uri()), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, CrawlerError::Decode(_)));
    }

    #[tokio::test]
    async fn test_get_json_http_status_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let client = EastMoneyClient::default();
        let err = client.get_json(&server.uri(), &[]).await.unwrap_err();
        assert!(matches!(err, CrawlerError::Transport(_)));
    }

    #[tokio::test]
    async fn test_get_json_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("{}")
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let client = EastMoneyClient::new(1);
        let err = client.get_json(&server.uri(), &[]).await.unwrap_err();
        match err {
            CrawlerError::Transport(e) => assert!(e.is_timeout()),
            other => panic!("期望超时错误，实际: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_get_jsonp_passes_params_and_unwraps() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/jsonp"))
            .and(query_param("fid", "f3"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(r#"jQuery1_2({"data":{"diff":[]}});"#),
            )
            .mount(&server)
            .await;

        let client = EastMoneyClient::default();
        let value = client
            .get_jsonp(
                &format!("{}/jsonp", server.uri()),
                &[("fid", "f3".to_string())],
            )
            .await
            .unwrap()
            .unwrap();
        assert!(value["data"]["diff"].is_array());
    }

    #[tokio::test]
    async fn test_get_jsonp_unwrap_failure_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("blocked"))
            .mount(&server)
            .await;

        let client = EastMoneyClient::default();
        let value = client.get_jsonp(&server.uri(), &[]).await.unwrap();
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn test_get_jsonp_generates_callback_param() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"cb({"data":null});"#))
            .mount(&server)
            .await;

        let client = EastMoneyClient::default();
        client
            .get_jsonp(&server.uri(), &[("x", "1".to_string())])
            .await
            .unwrap();
        client.get_jsonp(&server.uri(), &[]).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 2);

        let callbacks: Vec<String> = requests
            .iter()
            .map(|req| {
                let pairs: Vec<(String, String)> = req.url.query_pairs().into_owned().collect();
                let callback = pairs
                    .iter()
                    .filter(|(k, _)| k == "cb")
                    .map(|(_, v)| v.clone())
                    .collect::<Vec<_>>();
                assert_eq!(callback.len(), 1, "每次请求只带一个 cb 参数");
                callback[0].clone()
            })
            .collect();

        assert!(callbacks.iter().all(|cb| cb.starts_with("jQuery")));
        assert_ne!(callbacks[0], callbacks[1]);
        assert_eq!(requests[0].url.query_pairs().next().unwrap().0, "x");
    }
}
