//! 待投递结果缓冲区

use tokio::sync::Mutex;

use crate::models::CourtCaseResult;

#[derive(Debug, Default)]
pub struct ResultBuffer {
    results: Mutex<Vec<CourtCaseResult>>,
}

impl ResultBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn push(&self, result: CourtCaseResult) {
        self.results.lock().await.push(result);
    }

    /// 一次性取走全部结果
    pub async fn drain(&self) -> Vec<CourtCaseResult> {
        std::mem::take(&mut *self.results.lock().await)
    }

    /// 把投递失败的一批放回队头，排在期间新加入的结果之前
    pub async fn restore_front(&self, mut batch: Vec<CourtCaseResult>) {
        let mut results = self.results.lock().await;
        batch.append(&mut results);
        *results = batch;
    }

    pub async fn len(&self) -> usize {
        self.results.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.results.lock().await.is_empty()
    }

    /// 当前内容的副本
    pub async fn snapshot(&self) -> Vec<CourtCaseResult> {
        self.results.lock().await.clone()
    }
}
