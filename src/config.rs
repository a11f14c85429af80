//! 配置模块
//!
//! 支持从 JSON 文件加载系统配置，API_KEY 环境变量优先于文件中的 api_key

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

use crate::services::eastmoney::{
    MarketEndpoints, DATACENTER_API, DEFAULT_TIMEOUT_SECS,
};

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,
    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,
    /// 工作线程数（0 表示使用 CPU 核心数）
    #[serde(default)]
    pub workers: usize,
}

/// API 配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API Key（为空则不启用认证）
    #[serde(default)]
    pub api_key: String,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// 日志级别: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// 东方财富接口配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EastMoneyConfig {
    /// 单次请求超时时间（秒）
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_datacenter_url")]
    pub datacenter_url: String,
    #[serde(default = "default_clist_url")]
    pub clist_url: String,
    #[serde(default = "default_fund_flow_url")]
    pub fund_flow_url: String,
    #[serde(default = "default_kline_url")]
    pub kline_url: String,
}

/// 应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub eastmoney: EastMoneyConfig,
}

// 默认值函数
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }
fn default_timeout() -> u64 { DEFAULT_TIMEOUT_SECS }
fn default_log_level() -> String { "info".to_string() }
fn default_datacenter_url() -> String { DATACENTER_API.to_string() }
fn default_clist_url() -> String { MarketEndpoints::default().clist }
fn default_fund_flow_url() -> String { MarketEndpoints::default().fund_flow }
fn default_kline_url() -> String { MarketEndpoints::default().kline }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: 0,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl LogConfig {
    /// 解析日志级别，无法识别时使用 info
    pub fn level_filter(&self) -> log::LevelFilter {
        self.level.trim().parse().unwrap_or_else(|_| {
            log::warn!("无法识别的日志级别 {}，使用 info", self.level);
            log::LevelFilter::Info
        })
    }
}

impl Default for EastMoneyConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            datacenter_url: default_datacenter_url(),
            clist_url: default_clist_url(),
            fund_flow_url: default_fund_flow_url(),
            kline_url: default_kline_url(),
        }
    }
}

impl EastMoneyConfig {
    /// 行情接口地址
    pub fn market_endpoints(&self) -> MarketEndpoints {
        MarketEndpoints {
            clist: self.clist_url.clone(),
            fund_flow: self.fund_flow_url.clone(),
            kline: self.kline_url.clone(),
        }
    }
}

impl AppConfig {
    /// 从 JSON 文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// 加载配置，优先从文件，失败则使用默认值；最后应用环境变量
    pub fn load() -> Self {
        let mut config = Self::load_file();
        config.apply_env(env::var("API_KEY").ok());
        config
    }

    fn load_file() -> Self {
        let config_paths = ["config.json", "config/config.json"];

        for path in config_paths {
            if Path::new(path).exists() {
                match Self::from_file(path) {
                    Ok(config) => {
                        log::info!("从 {} 加载配置成功", path);
                        return config;
                    }
                    Err(e) => {
                        log::warn!("加载配置文件 {} 失败: {}", path, e);
                    }
                }
            }
        }

        log::info!("使用默认配置");
        Self::default()
    }

    fn apply_env(&mut self, api_key: Option<String>) {
        if let Some(key) = api_key.filter(|k| !k.is_empty()) {
            self.api.api_key = key;
        }
    }

    /// 获取服务器绑定地址
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
