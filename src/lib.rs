//! # Court Case Crawler
//!
//! 从法院 eSAJ 系统抓取一审、二审案件数据，并批量投递到下游存储。
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（Page），以租约形式借出
//! - `PagePool` / `PreloadedPagePool` - 通用页面池与按法院预加载的页面池
//! - `JsExecutor` - 页面 owner，提供 eval() 与页面操作能力
//!
//! ### ② 业务能力层（Crawler）
//! - `crawler/` - 描述"我能抓什么"，只处理单个案件的单个审级
//! - `FirstDegreeCrawler` / `SecondDegreeCrawler`
//!
//! ### ③ 编排层（Orchestration）
//! - `orchestrator/case_orchestrator` - 单个案件，并发运行两个审级
//! - `orchestrator/batch_processor` - 队列、批次、并发与失败隔离
//! - `orchestrator/flush` - 定时刷出结果
//!
//! ### ④ 接口层
//! - `api/` - 接收案件的 HTTP 接口
//! - `clients/` - 下游存储 API 客户端

pub mod api;
pub mod browser;
pub mod clients;
pub mod config;
pub mod crawler;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod utils;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::JsExecutor;
pub use models::{CourtCaseResult, CrawlTask};
pub use orchestrator::{CaseOrchestrator, CaseProcessor};
