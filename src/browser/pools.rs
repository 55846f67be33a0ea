//! 预加载页面池
//!
//! 通用池装空白页（二审使用）；每个法院一个子池，页面提前打开一审查询页。

use std::sync::Arc;

use chromiumoxide::Browser;
use tracing::info;

use crate::config::Config;
use crate::error::{AppResult, BrowserError};
use crate::infrastructure::{JsExecutor, PagePool, PreloadedPagePool};
use crate::models::Court;

/// 通用池名称
pub const GENERIC_POOL: &str = "generic";

pub struct PagePools {
    pub generic: Arc<PagePool<JsExecutor>>,
    pub preloaded: Arc<PreloadedPagePool<JsExecutor>>,
}

impl PagePools {
    /// 关闭所有页面池
    pub fn close(&self) {
        self.generic.close();
        self.preloaded.close();
    }
}

pub async fn build_page_pools(browser: &Browser, config: &Config) -> AppResult<PagePools> {
    let mut blank_pages = Vec::with_capacity(config.preloaded_empty_pages);
    for _ in 0..config.preloaded_empty_pages {
        blank_pages.push(open_page(browser, "about:blank").await?);
    }
    info!("✓ 通用页面池已预加载 {} 个页面", blank_pages.len());

    let mut preloaded = PreloadedPagePool::new();
    for court in Court::ALL {
        let search_url = court.first_degree_search_url();
        let mut pages = Vec::with_capacity(config.preloaded_pages_per_court);
        for _ in 0..config.preloaded_pages_per_court {
            pages.push(open_page(browser, &search_url).await?);
        }
        info!(
            "✓ {} 已预加载 {} 个一审查询页面",
            court.court_system(),
            pages.len()
        );
        preloaded.insert(court.court_system(), pages);
    }

    Ok(PagePools {
        generic: Arc::new(PagePool::new(GENERIC_POOL, blank_pages)),
        preloaded: Arc::new(preloaded),
    })
}

async fn open_page(browser: &Browser, url: &str) -> AppResult<JsExecutor> {
    let page = browser
        .new_page(url)
        .await
        .map_err(BrowserError::PageCreationFailed)?;
    Ok(JsExecutor::new(page))
}
