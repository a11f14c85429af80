//! 东方财富数据后端服务
//!
//! 提供财务分析、板块行情、资金流向和K线数据的 RESTful API 及工具调用接口
//! 数据来源：东方财富网数据中心、行情中心

mod config;     // 配置加载
mod handlers;   // HTTP 请求处理器
mod middleware; // 中间件
mod models;     // 数据模型定义
mod services;   // 数据爬虫
mod tools;      // 工具注册与 Markdown 格式化
mod utils;      // 格式化工具

use std::env;
use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;
use log::LevelFilter;

use crate::config::AppConfig;
use crate::middleware::ApiKeyMiddleware;
use crate::services::eastmoney::{EastMoneyClient, FinancialAnalysisCrawler, MarketCrawler};

/// 应用程序入口
///
/// 加载配置，创建共享的请求客户端和爬虫，启动 HTTP 服务器
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // 先初始化日志，配置加载过程中的告警才能输出；RUST_LOG 优先于配置文件中的日志级别
    let rust_log_set = env::var_os("RUST_LOG").is_some();
    env_logger::init_from_env(Env::default().default_filter_or("trace"));
    if !rust_log_set {
        log::set_max_level(LevelFilter::Info);
    }

    let config = AppConfig::load();
    if !rust_log_set {
        log::set_max_level(config.log.level_filter());
    }

    if config.api.api_key.is_empty() {
        log::warn!("未设置 API Key，接口认证已关闭");
    }

    let client = EastMoneyClient::new(config.eastmoney.timeout_secs);
    let financial = Arc::new(FinancialAnalysisCrawler::with_base_url(
        client.clone(),
        config.eastmoney.datacenter_url.clone(),
    ));
    let market = Arc::new(MarketCrawler::with_endpoints(
        client,
        config.eastmoney.market_endpoints(),
    ));
    let registry = web::Data::new(tools::build_registry(financial.clone(), market.clone()));
    let financial = web::Data::from(financial);
    let market = web::Data::from(market);

    log::info!(
        "启动东方财富数据服务，监听 {}，已注册 {} 个工具",
        config.bind_addr(),
        registry.list().len()
    );

    let api_key = config.api.api_key.clone();
    let mut server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default()) // 请求日志
            .wrap(ApiKeyMiddleware::new(api_key.clone())) // API Key 认证
            .app_data(financial.clone())
            .app_data(market.clone())
            .app_data(registry.clone())
            .configure(handlers::config)
    });
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    server.bind(config.bind_addr())?.run().await
}
