//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 后台案件处理器
//! - 持有队列和结果缓冲区
//! - 调度循环：按批出队、控制并发、隔离单个案件失败
//! - 管理刷出定时器的启动和停止
//!
//! ### `case_orchestrator` - 单个案件处理器
//! - 并发运行一审、二审爬虫并汇总结果
//!
//! ### `flush` - 结果刷出
//! - 定时取走缓冲区，逐个投递，失败整批放回
//!
//! ## 层次关系
//!
//! ```text
//! api::intake (接收案件)
//!     ↓
//! batch_processor (队列 → 批次)
//!     ↓
//! case_orchestrator (单个案件)
//!     ↓
//! crawler (一审 / 二审)
//!     ↓
//! infrastructure (页面池、JsExecutor)
//! ```

pub mod batch_processor;
pub mod case_orchestrator;
pub mod flush;
pub mod queue;
pub mod result_buffer;

pub use batch_processor::{BatchResult, CaseProcessor, LoopExit};
pub use case_orchestrator::CaseOrchestrator;
pub use flush::{FlushBatcher, FlushOutcome, FlushTimer};
pub use queue::IntakeQueue;
pub use result_buffer::ResultBuffer;
