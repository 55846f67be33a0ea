//! 待处理案件队列
//!
//! 无界 FIFO；入队和出队在同一把锁下，互相原子。

use std::collections::VecDeque;

use tokio::sync::Mutex;

use crate::models::CrawlTask;

#[derive(Debug, Default)]
pub struct IntakeQueue {
    tasks: Mutex<VecDeque<CrawlTask>>,
}

impl IntakeQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// 按提交顺序追加到队尾
    pub async fn enqueue(&self, tasks: Vec<CrawlTask>) {
        self.tasks.lock().await.extend(tasks);
    }

    pub async fn len(&self) -> usize {
        self.tasks.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tasks.lock().await.is_empty()
    }

    /// 从队头取出至多 `max` 个任务，取出后不再回到队列
    pub async fn drain_batch(&self, max: usize) -> Vec<CrawlTask> {
        let mut tasks = self.tasks.lock().await;
        let count = max.min(tasks.len());
        tasks.drain(..count).collect()
    }
}
