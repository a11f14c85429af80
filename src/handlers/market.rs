use actix_web::{web, HttpResponse, Result};

use super::crawler_error_response;
use crate::models::{ApiResponse, PlateQuery};
use crate::services::eastmoney::MarketCrawler;

pub async fn get_plate_quotation(
    crawler: web::Data<MarketCrawler>,
    query: web::Query<PlateQuery>,
) -> Result<HttpResponse> {
    let plate_type = query.plate_type.unwrap_or(2);

    match crawler.get_plate_quotation(plate_type).await {
        Ok(plates) => Ok(HttpResponse::Ok().json(ApiResponse::success(plates))),
        Err(e) => Ok(crawler_error_response(&e)),
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/market").route("/plates", web::get().to(get_plate_quotation)));
}
