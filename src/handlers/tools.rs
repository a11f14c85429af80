use actix_web::{web, HttpResponse, Result};
use serde_json::Value;

use crate::models::ApiResponse;
use crate::tools::{ToolArgs, ToolRegistry};

pub async fn list_tools(registry: web::Data<ToolRegistry>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(ApiResponse::success(registry.list())))
}

/// 调用工具，请求体为参数对象，返回 Markdown 文本
pub async fn call_tool(
    registry: web::Data<ToolRegistry>,
    path: web::Path<String>,
    body: Option<web::Json<Value>>,
) -> Result<HttpResponse> {
    let name = path.into_inner();
    let args = body.map(|b| ToolArgs::from(b.into_inner())).unwrap_or_default();

    match registry.call(&name, args).await {
        Some(output) => Ok(HttpResponse::Ok().json(ApiResponse::success(output))),
        None => Ok(HttpResponse::NotFound()
            .json(ApiResponse::<()>::error(format!("未知工具: {}", name)))),
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/tools")
            .route("", web::get().to(list_tools))
            .route("/{name}", web::post().to(call_tool)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test, App};
    use serde_json::json;

    fn registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register("echo", "回显股票代码", |args: ToolArgs| async move {
            args.str_or("stock_code", "无")
        });
        registry
    }

    #[actix_web::test]
    async fn test_list_and_call_tools() {
        let app = test::init_service(
            App::new().app_data(web::Data::new(registry())).configure(config),
        )
        .await;

        let req = test::TestRequest::get().uri("/tools").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"][0]["name"], "echo");

        let req = test::TestRequest::post()
            .uri("/tools/echo")
            .set_json(json!({"stock_code": "688041.SH"}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"], "688041.SH");

        let req = test::TestRequest::post().uri("/tools/echo").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"], "无");
    }

    #[actix_web::test]
    async fn test_unknown_tool_is_not_found() {
        let app = test::init_service(
            App::new().app_data(web::Data::new(registry())).configure(config),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/tools/missing")
            .set_json(json!({}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
