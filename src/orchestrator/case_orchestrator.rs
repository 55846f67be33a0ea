//! 单个案件处理器 - 编排层
//!
//! 同时运行一审、二审爬虫，等待两者结束后汇总成一个结果。
//! 审级爬虫自己吞掉页面上的失败，所以这里只会因页面池错误而失败。

use std::sync::Arc;

use tracing::info;

use crate::crawler::DegreeCrawler;
use crate::error::PoolError;
use crate::models::{CourtCaseResult, CrawlTask};

#[derive(Clone)]
pub struct CaseOrchestrator {
    first_degree: Arc<dyn DegreeCrawler>,
    second_degree: Arc<dyn DegreeCrawler>,
}

impl CaseOrchestrator {
    pub fn new(first_degree: Arc<dyn DegreeCrawler>, second_degree: Arc<dyn DegreeCrawler>) -> Self {
        Self {
            first_degree,
            second_degree,
        }
    }

    /// 处理单个案件
    ///
    /// 只要运行结束就是 `available`，即使两个审级都没有数据。
    pub async fn execute(&self, task: &CrawlTask) -> Result<CourtCaseResult, PoolError> {
        let ids = task.case_ids();
        info!("[案件 {}] 开始抓取 ({})", task.case_number, task.court);

        let (first, second) = tokio::join!(
            self.first_degree.scrape_case(&ids),
            self.second_degree.scrape_case(&ids),
        );

        let result = CourtCaseResult::available(&task.case_number, first?, second?);
        info!(
            "[案件 {}] 抓取完成: 一审 {}, 二审 {}",
            task.case_number,
            presence(&result.first_degree_case_data),
            presence(&result.second_degree_case_data)
        );
        Ok(result)
    }
}

fn presence<T>(data: &Option<T>) -> &'static str {
    if data.is_some() {
        "有数据"
    } else {
        "无数据"
    }
}
