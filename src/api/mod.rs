//! API 模块
//!
//! 对外的 HTTP 接口

pub mod intake;

use std::sync::Arc;

use axum::routing::post;
use axum::Router;

use crate::orchestrator::CaseProcessor;

pub use intake::crawl_court_cases;

/// 构建路由
pub fn router(processor: Arc<CaseProcessor>) -> Router {
    Router::new()
        .route("/crawl-court-cases", post(crawl_court_cases))
        .with_state(processor)
}
