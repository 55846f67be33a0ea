//! 一审爬虫
//!
//! 使用按法院预加载的查询页面：填写案件号和来源号，提交表单后在结果页提取。

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tracing::debug;

use super::case_page::{fetch_case_data, FIRST_DEGREE_SELECTORS};
use super::{finish_scrape, Degree, DegreeCrawler};
use crate::error::{PoolError, ScrapeError};
use crate::infrastructure::{DocketPage, PreloadedPagePool};
use crate::models::{CaseIds, DegreeCaseData};

const INPUT_CASE_NUMBER: &str = "#numeroDigitoAnoUnificado";
const INPUT_ORIGIN_NUMBER: &str = "#foroNumeroUnificado";
const SEARCH_BUTTON: &str = "#botaoConsultarProcessos";

pub struct FirstDegreeCrawler<H> {
    pages: Arc<PreloadedPagePool<H>>,
}

impl<H: DocketPage> FirstDegreeCrawler<H> {
    pub fn new(pages: Arc<PreloadedPagePool<H>>) -> Self {
        Self { pages }
    }

    /// 在查询页提交案件号，等待跳转到案件页
    async fn go_to_case(page: &H, ids: &CaseIds) -> Result<(), ScrapeError> {
        let search_url = ids.court.first_degree_search_url();
        if !page.current_url().await?.starts_with(&search_url) {
            debug!("不在一审查询页，导航到 {}", search_url);
            page.goto(&search_url).await?;
        }

        debug!("输入案件号 {}", ids.process_number);
        page.type_text(INPUT_CASE_NUMBER, &ids.process_number).await?;
        debug!("输入来源号 {}", ids.origin_number);
        page.type_text(INPUT_ORIGIN_NUMBER, &ids.origin_number).await?;

        page.click_and_wait_for_navigation(SEARCH_BUTTON).await
    }
}

#[async_trait]
impl<H: DocketPage> DegreeCrawler for FirstDegreeCrawler<H> {
    fn degree(&self) -> Degree {
        Degree::First
    }

    async fn scrape_case(&self, ids: &CaseIds) -> Result<Option<DegreeCaseData>, PoolError> {
        let page = self.pages.acquire(ids.court.court_system()).await?;
        let started = Instant::now();

        let outcome = match Self::go_to_case(&page, ids).await {
            Ok(()) => fetch_case_data(&*page, &FIRST_DEGREE_SELECTORS).await,
            Err(e) => Err(e),
        };

        Ok(finish_scrape(self.degree(), &ids.process_number, started, outcome))
    }
}
