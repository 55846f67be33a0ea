//! 结果刷出 - 编排层
//!
//! 定时取走缓冲区中的全部结果，逐个投递到下游（并发数受限）。
//! 任何一次投递失败，整批结果放回缓冲区队头，下个周期重试；
//! 不区分单条坏数据，没有退避也没有重试上限。

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, TryStreamExt};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::clients::ResultSink;
use crate::error::DeliveryError;
use crate::orchestrator::result_buffer::ResultBuffer;

/// 一次刷出的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushOutcome {
    /// 缓冲区为空，什么都没做
    Empty,
    /// 全部投递成功
    Delivered(usize),
    /// 投递失败，整批已放回
    Restored(usize),
}

pub struct FlushBatcher {
    buffer: Arc<ResultBuffer>,
    sink: Arc<dyn ResultSink>,
    concurrency_limit: usize,
}

impl FlushBatcher {
    pub fn new(buffer: Arc<ResultBuffer>, sink: Arc<dyn ResultSink>, concurrency_limit: usize) -> Self {
        Self {
            buffer,
            sink,
            concurrency_limit,
        }
    }

    /// 执行一个刷出周期
    pub async fn flush_once(&self) -> FlushOutcome {
        let drained = self.buffer.drain().await;
        if drained.is_empty() {
            return FlushOutcome::Empty;
        }

        let count = drained.len();
        info!("📤 发送 {} 个已处理案件", count);

        let delivery = stream::iter(drained.iter().map(Ok::<_, DeliveryError>))
            .try_for_each_concurrent(self.concurrency_limit, |result| {
                self.sink.deliver(std::slice::from_ref(result))
            })
            .await;

        match delivery {
            Ok(()) => {
                info!("✓ {} 个案件发送完成", count);
                FlushOutcome::Delivered(count)
            }
            Err(e) => {
                error!("❌ 发送已处理案件失败，{} 个案件放回缓冲区: {}", count, e);
                self.buffer.restore_front(drained).await;
                FlushOutcome::Restored(count)
            }
        }
    }
}

/// 定时刷出任务
///
/// 取消只在两次刷出之间生效，正在进行的刷出会执行完。
pub struct FlushTimer {
    stop_tx: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl FlushTimer {
    pub fn spawn(batcher: Arc<FlushBatcher>, interval: Duration) -> Self {
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = &mut stop_rx => break,
                    _ = ticker.tick() => {
                        batcher.flush_once().await;
                    }
                }
            }
            debug!("刷出定时器已停止");
        });

        Self { stop_tx, handle }
    }

    /// 停止定时器，返回任务句柄以便等待当前刷出结束
    pub fn cancel(self) -> JoinHandle<()> {
        let _ = self.stop_tx.send(());
        self.handle
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}
