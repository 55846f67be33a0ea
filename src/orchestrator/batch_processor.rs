//! 后台案件处理器 - 编排层
//!
//! ## 职责
//!
//! 1. **接收案件**：把 API 收到的案件追加到队列
//! 2. **调度循环**：按批出队，批大小受 `worker_limit` 限制
//! 3. **并发控制**：批内使用 Semaphore 限制同时处理的案件数
//! 4. **失败隔离**：单个案件失败只产生一个 `failed` 结果，不影响同批其他案件
//! 5. **结果刷出**：持有刷出定时器，停止时取消
//!
//! ## 调度规则
//!
//! - 每轮开始前检查队列长度，达到 `worker_limit` 时调度循环直接结束
//!   （`halt_on_backlog = false` 时不检查）
//! - 队列非空：出队至多 `worker_limit` 个案件处理，然后立即进入下一轮
//! - 队列为空：等待 `empty_queue_delay_ms`
//! - 批处理本身出错时记录日志后立即进入下一轮，不等待
//! - 任何时刻至多一个调度循环：停止后旧循环还没退出就重新启动，
//!   只重新置位运行标志，由旧循环继续调度

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::Semaphore;
use tracing::{error, info, warn};

use crate::clients::ResultSink;
use crate::config::Config;
use crate::error::{AppError, AppResult, ConfigError};
use crate::models::{CourtCaseResult, CrawlTask};
use crate::orchestrator::case_orchestrator::CaseOrchestrator;
use crate::orchestrator::flush::{FlushBatcher, FlushOutcome, FlushTimer};
use crate::orchestrator::queue::IntakeQueue;
use crate::orchestrator::result_buffer::ResultBuffer;
use crate::utils::logging;

/// 调度循环结束的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// 收到停止信号
    Stopped,
    /// 队列积压达到 worker_limit
    Backlog,
    /// 已有调度循环在运行
    AlreadyRunning,
}

/// 批次处理结果
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchResult {
    pub available: usize,
    pub failed: usize,
}

/// 后台案件处理器
pub struct CaseProcessor {
    config: Config,
    orchestrator: CaseOrchestrator,
    queue: IntakeQueue,
    buffer: Arc<ResultBuffer>,
    batcher: Arc<FlushBatcher>,
    is_processing: AtomicBool,
    loop_active: AtomicBool,
    flush_timer: Mutex<Option<FlushTimer>>,
}

impl CaseProcessor {
    pub fn new(config: Config, orchestrator: CaseOrchestrator, sink: Arc<dyn ResultSink>) -> Self {
        let buffer = Arc::new(ResultBuffer::new());
        let batcher = Arc::new(FlushBatcher::new(
            buffer.clone(),
            sink,
            config.flush_concurrency_limit,
        ));

        Self {
            config,
            orchestrator,
            queue: IntakeQueue::new(),
            buffer,
            batcher,
            is_processing: AtomicBool::new(false),
            loop_active: AtomicBool::new(false),
            flush_timer: Mutex::new(None),
        }
    }

    /// 启动调度循环，直到停止或队列积压才返回
    pub async fn start_processing(&self) -> LoopExit {
        self.is_processing.store(true, Ordering::SeqCst);
        self.start_flush_timer();

        if self.loop_active.swap(true, Ordering::SeqCst) {
            warn!("⚠️ 调度循环已在运行");
            return LoopExit::AlreadyRunning;
        }

        logging::log_processing_settings(&self.config, self.queue.len().await);

        loop {
            if !self.is_processing() {
                if self.release_loop() {
                    continue;
                }
                info!("调度循环已停止");
                return LoopExit::Stopped;
            }

            if self.config.halt_on_backlog {
                let queued = self.queue.len().await;
                if queued >= self.config.worker_limit {
                    warn!(
                        "⚠️ 队列中有 {} 个案件，达到上限 {}，调度循环结束",
                        queued, self.config.worker_limit
                    );
                    self.is_processing.store(false, Ordering::SeqCst);
                    if self.release_loop() {
                        continue;
                    }
                    return LoopExit::Backlog;
                }
            }

            if let Err(e) = self.process_court_cases().await {
                error!("❌ 处理案件时发生错误: {}", e);
            }
        }
    }

    /// 停止调度循环并取消刷出定时器
    ///
    /// 正在处理的批次会执行完；缓冲区中未发送的结果保留在内存中。
    pub fn stop_processing(&self) {
        let was_processing = self.is_processing.swap(false, Ordering::SeqCst);
        let timer = self.timer_slot().take();

        if was_processing || timer.is_some() {
            info!("停止处理案件");
        }
        if let Some(timer) = timer {
            // 不等待：正在进行的刷出由定时器任务自己执行完
            drop(timer.cancel());
        }
    }

    pub fn is_processing(&self) -> bool {
        self.is_processing.load(Ordering::SeqCst)
    }

    /// 把案件追加到队列尾部
    pub async fn add_court_cases(&self, court_cases: Vec<CrawlTask>) {
        info!("📥 添加 {} 个案件到队列", court_cases.len());
        self.queue.enqueue(court_cases).await;
    }

    pub async fn queue_len(&self) -> usize {
        self.queue.len().await
    }

    /// 待投递结果缓冲区
    pub fn results(&self) -> &ResultBuffer {
        &self.buffer
    }

    /// 立即执行一次刷出（不依赖定时器）
    pub async fn flush_now(&self) -> FlushOutcome {
        self.batcher.flush_once().await
    }

    /// 调度循环的一轮
    async fn process_court_cases(&self) -> AppResult<()> {
        let batch = self.queue.drain_batch(self.config.worker_limit).await;

        if batch.is_empty() {
            tokio::time::sleep(Duration::from_millis(self.config.empty_queue_delay_ms)).await;
            return Ok(());
        }

        logging::log_batch_start(batch.len(), self.queue.len().await, self.config.worker_limit);
        let result = self.execute_batch(batch).await?;
        logging::log_batch_complete(result.available, result.failed);
        Ok(())
    }

    /// 在并发上限内处理一批案件，每个案件恰好产生一个结果
    pub async fn execute_batch(&self, batch: Vec<CrawlTask>) -> AppResult<BatchResult> {
        if self.config.concurrency_limit == 0 {
            return Err(ConfigError::Invalid {
                field: "concurrency_limit".to_string(),
                reason: format!("必须大于 0，本批 {} 个案件未处理", batch.len()),
            }
            .into());
        }

        let semaphore = Arc::new(Semaphore::new(self.config.concurrency_limit));
        let mut handles = Vec::with_capacity(batch.len());

        for task in batch {
            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|e| AppError::Other(format!("无法获取并发许可: {}", e)))?;

            let orchestrator = self.orchestrator.clone();
            let buffer = self.buffer.clone();
            let case_number = task.case_number.clone();

            let handle = tokio::spawn(async move {
                let _permit = permit;
                let result = match orchestrator.execute(&task).await {
                    Ok(result) => result,
                    Err(e) => {
                        error!("[案件 {}] ❌ 获取案件失败: {}", task.case_number, e);
                        CourtCaseResult::failed(&task.case_number)
                    }
                };
                let failed = result.is_failed();
                buffer.push(result).await;
                failed
            });
            handles.push((case_number, handle));
        }

        let mut result = BatchResult::default();
        for (case_number, handle) in handles {
            match handle.await {
                Ok(false) => result.available += 1,
                Ok(true) => result.failed += 1,
                Err(e) => {
                    // 任务 panic 时还没有写入结果
                    error!("[案件 {}] 任务执行失败: {}", case_number, e);
                    self.buffer.push(CourtCaseResult::failed(case_number)).await;
                    result.failed += 1;
                }
            }
        }

        Ok(result)
    }

    /// 清除循环占用标志
    ///
    /// 返回 `true` 表示期间有人重新启动，本循环重新占用并继续调度。
    fn release_loop(&self) -> bool {
        self.loop_active.store(false, Ordering::SeqCst);
        self.is_processing() && !self.loop_active.swap(true, Ordering::SeqCst)
    }

    fn start_flush_timer(&self) {
        let mut slot = self.timer_slot();
        if slot.as_ref().is_some_and(|timer| !timer.is_finished()) {
            return;
        }
        *slot = Some(FlushTimer::spawn(
            self.batcher.clone(),
            Duration::from_millis(self.config.flush_interval_ms),
        ));
    }

    fn timer_slot(&self) -> MutexGuard<'_, Option<FlushTimer>> {
        self.flush_timer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for CaseProcessor {
    fn drop(&mut self) {
        if let Some(timer) = self.timer_slot().take() {
            drop(timer.cancel());
        }
    }
}
