pub mod health;
pub mod market;
pub mod stock;
pub mod tools;

use actix_web::{web, HttpResponse};

use crate::models::{ApiResponse, Row};
use crate::services::eastmoney::CrawlerError;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(health::config)
            .configure(stock::config)
            .configure(market::config)
            .configure(tools::config),
    );
}

/// 爬虫错误映射为 HTTP 响应：输入格式错误 400，其余视为上游失败 502
fn crawler_error_response(e: &CrawlerError) -> HttpResponse {
    let response = ApiResponse::<()>::error(e.to_string());
    match e {
        CrawlerError::MalformedInput(_) => HttpResponse::BadRequest().json(response),
        _ => HttpResponse::BadGateway().json(response),
    }
}

/// 财务接口的行数据：首行带 error 字段时按失败处理
fn rows_response(rows: Vec<Row>) -> HttpResponse {
    match rows.first().and_then(|r| r.get("error")) {
        Some(error) => {
            let message = error.as_str().map(str::to_string).unwrap_or_else(|| error.to_string());
            HttpResponse::BadGateway().json(ApiResponse::<()>::error(message))
        }
        None => HttpResponse::Ok().json(ApiResponse::success(rows)),
    }
}
