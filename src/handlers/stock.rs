use actix_web::{web, HttpResponse, Result};

use super::{crawler_error_response, rows_response};
use crate::models::{ApiResponse, FinancialQuery, KlineQuery, ReportType};
use crate::services::eastmoney::{parse_kline_data, FinancialAnalysisCrawler, MarketCrawler};

pub async fn get_financial_summary(
    crawler: web::Data<FinancialAnalysisCrawler>,
    path: web::Path<String>,
    query: web::Query<FinancialQuery>,
) -> Result<HttpResponse> {
    let code = path.into_inner();
    let date_type_code = query.date_type_code.as_deref().unwrap_or("004");
    let Some(report_type) = ReportType::from_code(date_type_code) else {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::<()>::error(format!("不支持的报告类型: {}", date_type_code))));
    };

    let rows = crawler.get_financial_summary(&code, report_type.code()).await;
    Ok(rows_response(rows))
}

pub async fn get_holder_number(
    crawler: web::Data<FinancialAnalysisCrawler>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let code = path.into_inner();
    let rows = crawler.get_holder_number(&code).await;
    Ok(rows_response(rows))
}

pub async fn get_report_dates(
    crawler: web::Data<FinancialAnalysisCrawler>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let code = path.into_inner();
    let dates = crawler.get_latest_report_dates(&code).await;
    Ok(HttpResponse::Ok().json(ApiResponse::success(dates)))
}

pub async fn get_industry_comparison(
    crawler: web::Data<FinancialAnalysisCrawler>,
    path: web::Path<String>,
    query: web::Query<FinancialQuery>,
) -> Result<HttpResponse> {
    let code = path.into_inner();
    let report_dates = query.report_dates.as_deref().map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string)
            .collect::<Vec<_>>()
    });

    let rows = crawler.get_industry_profit_comparison(&code, report_dates).await;
    Ok(rows_response(rows))
}

pub async fn get_fund_flow(
    crawler: web::Data<MarketCrawler>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let code = path.into_inner();

    match crawler.get_historical_fund_flow(&code).await {
        Ok(Some(data)) => Ok(HttpResponse::Ok().json(ApiResponse::success(data))),
        Ok(None) => Ok(HttpResponse::NotFound()
            .json(ApiResponse::<()>::error(format!("未找到股票 {} 的资金流向数据", code)))),
        Err(e) => Ok(crawler_error_response(&e)),
    }
}

pub async fn get_kline(
    crawler: web::Data<MarketCrawler>,
    path: web::Path<String>,
    query: web::Query<KlineQuery>,
) -> Result<HttpResponse> {
    let code = path.into_inner();
    let frequency = query.frequency.as_deref().unwrap_or("d");

    match crawler
        .get_historical_k_data(&code, &query.start_date, &query.end_date, frequency)
        .await
    {
        Ok(klines) => Ok(HttpResponse::Ok().json(ApiResponse::success(parse_kline_data(&klines)))),
        Err(e) => Ok(crawler_error_response(&e)),
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/stocks")
            .route("/{code}/financial_summary", web::get().to(get_financial_summary))
            .route("/{code}/holder_number", web::get().to(get_holder_number))
            .route("/{code}/report_dates", web::get().to(get_report_dates))
            .route("/{code}/industry_comparison", web::get().to(get_industry_comparison))
            .route("/{code}/fund_flow", web::get().to(get_fund_flow))
            .route("/{code}/kline", web::get().to(get_kline)),
    );
}
