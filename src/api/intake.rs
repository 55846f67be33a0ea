//! 案件接收接口
//!
//! 收到的案件只入队，不等待处理结果。

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use tracing::error;

use crate::models::CrawlTask;
use crate::orchestrator::CaseProcessor;
use crate::utils::logging::truncate_text;

/// `POST /crawl-court-cases`
pub async fn crawl_court_cases(
    State(processor): State<Arc<CaseProcessor>>,
    payload: Result<Json<Vec<CrawlTask>>, JsonRejection>,
) -> impl IntoResponse {
    match payload {
        Ok(Json(court_cases)) => {
            processor.add_court_cases(court_cases).await;
            (
                StatusCode::OK,
                Json(json!({ "message": "Court cases added to the queue" })),
            )
        }
        Err(rejection) => {
            error!("❌ 无法解析请求: {}", truncate_text(&rejection.body_text(), 200));
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "message": "Internal server error" })),
            )
        }
    }
}
