//! 市场行情爬虫
//!
//! 板块行情（JSONP）、个股历史资金流向（JSONP）、历史K线（JSON）。
//! 这组接口没有 code/success 信封，只看数据字段是否存在；网络错误直接向上返回。

use serde_json::Value;

use super::client::{format_secid, EastMoneyClient, QueryParams};
use super::common::{
    compact_date, FFLOW_UT, PUSH2HIS_FFLOW_API, PUSH2HIS_KLINE_API, PUSH2_CLIST_API, QUOTE_UT,
};
use super::error::{CrawlerError, CrawlerResult};
use crate::models::KlineFrequency;

const PLATE_FIELDS: &str =
    "f12,f13,f14,f1,f2,f4,f3,f152,f20,f8,f104,f105,f128,f140,f141,f207,f208,f209,f136,f222";
const FFLOW_FIELDS2: &str = "f51,f52,f53,f54,f55,f56,f57,f58,f59,f60,f61,f62,f63,f64,f65";

/// 行情接口地址
#[derive(Debug, Clone)]
pub struct MarketEndpoints {
    pub clist: String,
    pub fund_flow: String,
    pub kline: String,
}

impl Default for MarketEndpoints {
    fn default() -> Self {
        Self {
            clist: PUSH2_CLIST_API.to_string(),
            fund_flow: PUSH2HIS_FFLOW_API.to_string(),
            kline: PUSH2HIS_KLINE_API.to_string(),
        }
    }
}

/// 市场行情爬虫
#[derive(Debug, Clone)]
pub struct MarketCrawler {
    client: EastMoneyClient,
    endpoints: MarketEndpoints,
}

impl MarketCrawler {
    pub fn with_endpoints(client: EastMoneyClient, endpoints: MarketEndpoints) -> Self {
        Self { client, endpoints }
    }

    /// 获取板块行情数据（按涨跌幅倒序前 10 条）
    ///
    /// plate_type: 1 地域板块，2 行业板块，3 概念板块。
    /// 返回 data.diff 原始字段（f12 代码，f14 名称，f2 价格×100 等），缺失时返回空列表。
    pub async fn get_plate_quotation(&self, plate_type: i64) -> CrawlerResult<Vec<Value>> {
        let params: QueryParams = vec![
            ("np", "1".to_string()),
            ("fltt", "1".to_string()),
            ("invt", "2".to_string()),
            ("fs", format!("m:90 t:{} f:!50", plate_type)),
            ("fields", PLATE_FIELDS.to_string()),
            ("fid", "f3".to_string()),
            ("pn", "1".to_string()),
            ("pz", "10".to_string()),
            ("po", "1".to_string()),
            ("ut", QUOTE_UT.to_string()),
            ("dect", "1".to_string()),
            ("wbp2u", "|0|0|0|web".to_string()),
            ("_", EastMoneyClient::timestamp_ms().to_string()),
        ];

        let response = self.client.get_jsonp(&self.endpoints.clist, &params).await?;

        let diff = response
            .as_ref()
            .and_then(|r| r.get("data"))
            .and_then(|d| d.get("diff"));

        Ok(match diff {
            Some(Value::Array(rows)) => rows.clone(),
            // fltt=1 时部分情况下 diff 以 {"0": {...}, "1": {...}} 形式返回
            Some(Value::Object(map)) => map.values().cloned().collect(),
            _ => Vec::new(),
        })
    }

    /// 获取个股最近 10 个交易日的资金流向
    ///
    /// 返回 data 原始对象（含 code、name、klines），data 为空时返回 None。
    pub async fn get_historical_fund_flow(&self, stock_code: &str) -> CrawlerResult<Option<Value>> {
        let secid = format_secid(stock_code)?;
        let params: QueryParams = vec![
            ("lmt", "10".to_string()),
            ("klt", "101".to_string()),
            ("secid", secid),
            ("fields1", "f1,f2,f3,f7".to_string()),
            ("fields2", FFLOW_FIELDS2.to_string()),
            ("ut", FFLOW_UT.to_string()),
            ("_", EastMoneyClient::timestamp_ms().to_string()),
        ];

        let response = self.client.get_jsonp(&self.endpoints.fund_flow, &params).await?;

        Ok(response
            .and_then(|r| r.get("data").cloned())
            .filter(|data| !data.is_null()))
    }

    /// 获取历史K线原始字符串
    ///
    /// start_date / end_date 格式 YYYY-MM-DD，frequency 取值 d, w, m, 5, 15, 30, 60。
    pub async fn get_historical_k_data(
        &self,
        stock_code: &str,
        start_date: &str,
        end_date: &str,
        frequency: &str,
    ) -> CrawlerResult<Vec<String>> {
        let secid = format_secid(stock_code)?;
        let frequency = KlineFrequency::from_str(frequency)
            .ok_or_else(|| CrawlerError::MalformedInput(format!("不支持的K线周期: {}", frequency)))?;

        let params: QueryParams = vec![
            ("secid", secid),
            ("fields1", "f1,f2,f3,f4,f5,f6".to_string()),
            (
                "fields2",
                "f51,f52,f53,f54,f55,f56,f57,f58,f59,f60,f61".to_string(),
            ),
            ("klt", frequency.klt().to_string()),
            ("fqt", "1".to_string()),
            ("beg", compact_date(start_date)),
            ("end", compact_date(end_date)),
            ("ut", QUOTE_UT.to_string()),
        ];

        let response = self.client.get_json(&self.endpoints.kline, &params).await?;

        Ok(response
            .get("data")
            .and_then(|d| d.get("klines"))
            .and_then(Value::as_array)
            .map(|klines| {
                klines
                    .iter()
                    .filter_map(|k| k.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn crawler(server: &MockServer) -> MarketCrawler {
        MarketCrawler::with_endpoints(
            EastMoneyClient::default(),
            MarketEndpoints {
                clist: format!("{}/clist", server.uri()),
                fund_flow: format!("{}/fflow", server.uri()),
                kline: format!("{}/kline", server.uri()),
            },
        )
    }

    #[tokio::test]
    async fn test_plate_quotation_returns_diff() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/clist"))
            .and(query_param("fs", "m:90 t:3 f:!50"))
            .and(query_param("pz", "10"))
            .and(query_param("fid", "f3"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"jQuery1123_1700000000000({"rc":0,"data":{"total":2,"diff":[{"f12":"BK1036","f14":"半导体","f2":123456},{"f12":"BK0480","f14":"航天航空","f2":98765}]}});"#,
            ))
            .expect(1)
            .mount(&server)
            .await;

        let rows = crawler(&server).get_plate_quotation(3).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["f14"], "半导体");
    }

    #[tokio::test]
    async fn test_plate_quotation_missing_diff_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/clist"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(r#"jQuery1_2({"rc":0,"data":null});"#),
            )
            .mount(&server)
            .await;

        let rows = crawler(&server).get_plate_quotation(2).await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_plate_quotation_unwrap_failure_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/clist"))
            .respond_with(ResponseTemplate::new(200).set_body_string("forbidden"))
            .mount(&server)
            .await;

        let rows = crawler(&server).get_plate_quotation(1).await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_plate_quotation_transport_error_propagates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let result = crawler(&server).get_plate_quotation(2).await;
        assert!(matches!(result, Err(CrawlerError::Transport(_))));
    }

    #[tokio::test]
    async fn test_fund_flow_uses_secid() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/fflow"))
            .and(query_param("secid", "1.688041"))
            .and(query_param("lmt", "10"))
            .and(query_param("klt", "101"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"jQuery9_9({"rc":0,"data":{"code":"688041","market":1,"name":"海光信息","klines":["2024-10-08,1.0,2.0,3.0,4.0,5.0,1.1,1.2,1.3,1.4,1.5,120.5,5.2,0.00,0.00"]}});"#,
            ))
            .expect(1)
            .mount(&server)
            .await;

        let data = crawler(&server)
            .get_historical_fund_flow("688041.SH")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(data["name"], "海光信息");
        assert_eq!(data["klines"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_fund_flow_null_data_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/fflow"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(r#"cb({"rc":102,"data":null});"#),
            )
            .mount(&server)
            .await;

        let data = crawler(&server)
            .get_historical_fund_flow("000021.SZ")
            .await
            .unwrap();
        assert!(data.is_none());
    }

    #[tokio::test]
    async fn test_fund_flow_malformed_code() {
        let server = MockServer::start().await;
        let result = crawler(&server).get_historical_fund_flow("000021").await;
        assert!(matches!(result, Err(CrawlerError::MalformedInput(_))));
    }

    #[tokio::test]
    async fn test_historical_k_data() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/kline"))
            .and(query_param("secid", "0.300750"))
            .and(query_param("klt", "102"))
            .and(query_param("beg", "20240101"))
            .and(query_param("end", "20240131"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "rc": 0,
                "data": {
                    "code": "300750",
                    "klines": [
                        "2024-01-05,160.00,158.50,161.20,157.00,123456,1956789012.00,2.63,-0.94,-1.50,0.31",
                        "2024-01-12,158.50,162.00,163.00,155.10,234567,3756789012.00,4.98,2.21,3.50,0.59"
                    ]
                }
            })))
            .mount(&server)
            .await;

        let klines = crawler(&server)
            .get_historical_k_data("300750.SZ", "2024-01-01", "2024-01-31", "w")
            .await
            .unwrap();
        assert_eq!(klines.len(), 2);
        assert!(klines[0].starts_with("2024-01-05"));
    }

    #[tokio::test]
    async fn test_historical_k_data_rejects_unknown_frequency() {
        let server = MockServer::start().await;
        let result = crawler(&server)
            .get_historical_k_data("300750.SZ", "2024-01-01", "2024-01-31", "y")
            .await;
        assert!(matches!(result, Err(CrawlerError::MalformedInput(_))));
    }
}
