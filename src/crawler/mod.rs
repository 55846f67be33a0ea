//! 审级爬虫 - 业务能力层
//!
//! 一审、二审两种爬虫实现同一个能力：给定案件标识，返回该审级的数据或"无数据"。
//!
//! 每次调用的生命周期：借页面 → 查找案件 → 并发提取字段 → 归还页面。
//! 页面由租约持有，任何退出路径都会归还。
//! 站点上的预期情况（找不到案件、需要密码）以及其他页面错误都在这里吞掉，
//! 只有页面池错误会向上传播。

pub mod case_page;
pub mod first_degree;
pub mod second_degree;

use std::fmt;
use std::time::Instant;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::error::{PoolError, ScrapeError};
use crate::models::{CaseIds, DegreeCaseData};

pub use first_degree::FirstDegreeCrawler;
pub use second_degree::SecondDegreeCrawler;

/// 审级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Degree {
    First,
    Second,
}

impl fmt::Display for Degree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Degree::First => f.write_str("一审"),
            Degree::Second => f.write_str("二审"),
        }
    }
}

/// 审级爬虫
#[async_trait]
pub trait DegreeCrawler: Send + Sync {
    fn degree(&self) -> Degree;

    /// 抓取一个案件在本审级的数据
    ///
    /// 页面上的任何失败都表现为 `Ok(None)`；`Err` 只表示拿不到页面。
    async fn scrape_case(&self, ids: &CaseIds) -> Result<Option<DegreeCaseData>, PoolError>;
}

/// 记录耗时并把抓取结果折叠为"有数据 / 无数据"
fn finish_scrape(
    degree: Degree,
    case_tag: &str,
    started: Instant,
    outcome: Result<DegreeCaseData, ScrapeError>,
) -> Option<DegreeCaseData> {
    let seconds = started.elapsed().as_secs_f64();
    match outcome {
        Ok(data) => {
            info!("[{}] 案件 {} 抓取耗时 {:.2} 秒", degree, case_tag, seconds);
            Some(data)
        }
        Err(e) if e.is_expected() => {
            info!(
                "[{}] 案件 {} 抓取耗时 {:.2} 秒 - NO DATA ({})",
                degree, case_tag, seconds, e
            );
            None
        }
        Err(e) => {
            warn!(
                "[{}] 案件 {} 抓取耗时 {:.2} 秒 - NO DATA，页面错误: {}",
                degree, case_tag, seconds, e
            );
            None
        }
    }
}
