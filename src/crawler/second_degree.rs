//! 二审爬虫
//!
//! 通过查询地址定位案件：站点提示"不存在信息"时视为找不到案件，
//! 出现多个匹配时取第一个，然后进入案件页提取。

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use reqwest::Url;
use tracing::{debug, info};

use super::case_page::{fetch_case_data, SECOND_DEGREE_SELECTORS};
use super::{finish_scrape, Degree, DegreeCrawler};
use crate::error::{PoolError, ScrapeError};
use crate::infrastructure::{DocketPage, PagePool};
use crate::models::{CaseIds, DegreeCaseData};

const SELECTED_PROCESS_RADIO: &str = "#processoSelecionado:nth-child(1)";
const RETURN_MESSAGE: &str = "#mensagemRetorno";
const NO_INFORMATION_WARNING: &str = "Não existem informações";

pub struct SecondDegreeCrawler<H> {
    pages: Arc<PagePool<H>>,
}

impl<H: DocketPage> SecondDegreeCrawler<H> {
    pub fn new(pages: Arc<PagePool<H>>) -> Self {
        Self { pages }
    }

    /// 找到案件页地址
    async fn fetch_case_url(page: &H, ids: &CaseIds) -> Result<String, ScrapeError> {
        info!("查找二审案件地址: {}", ids.case_number);
        let base_url = ids.court.second_degree_base_url();
        let search_url = search_url(&base_url, ids)?;
        page.goto(search_url.as_str()).await?;

        Self::ensure_no_warning_message(page, ids).await?;

        match page.attribute(SELECTED_PROCESS_RADIO, "value").await? {
            Some(process_code) => Ok(format!("{}/show.do?processo.codigo={}", base_url, process_code)),
            None => page.current_url().await,
        }
    }

    async fn ensure_no_warning_message(page: &H, ids: &CaseIds) -> Result<(), ScrapeError> {
        if let Some(message) = page.text_or_none(RETURN_MESSAGE).await? {
            if message.contains(NO_INFORMATION_WARNING) {
                return Err(ScrapeError::CaseNotFound {
                    case_number: ids.case_number.clone(),
                });
            }
        }
        debug!("没有警告信息");
        Ok(())
    }

    async fn scrape_on_page(page: &H, ids: &CaseIds) -> Result<DegreeCaseData, ScrapeError> {
        let case_url = Self::fetch_case_url(page, ids).await?;
        if !page.current_url().await?.starts_with(&case_url) {
            page.goto(&case_url).await?;
        }
        fetch_case_data(page, &SECOND_DEGREE_SELECTORS).await
    }
}

/// 二审查询地址
pub fn search_url(base_url: &str, ids: &CaseIds) -> Result<Url, ScrapeError> {
    Url::parse_with_params(
        &format!("{}/search.do", base_url),
        &[
            ("conversationId", ""),
            ("paginaConsulta", "0"),
            ("cbPesquisa", "NUMPROC"),
            ("numeroDigitoAnoUnificado", ids.process_number.as_str()),
            ("foroNumeroUnificado", "0001"),
            ("dePesquisaNuUnificado", ids.case_number.as_str()),
            ("dePesquisaNuUnificado", "UNIFICADO"),
            ("dePesquisa", ""),
            ("tipoNuProcesso", "UNIFICADO"),
        ],
    )
    .map_err(|e| ScrapeError::Page(format!("无法构造查询地址: {}", e)))
}

#[async_trait]
impl<H: DocketPage> DegreeCrawler for SecondDegreeCrawler<H> {
    fn degree(&self) -> Degree {
        Degree::Second
    }

    async fn scrape_case(&self, ids: &CaseIds) -> Result<Option<DegreeCaseData>, PoolError> {
        let page = self.pages.acquire().await?;
        let started = Instant::now();

        let outcome = Self::scrape_on_page(&page, ids).await;

        Ok(finish_scrape(self.degree(), &ids.case_number, started, outcome))
    }
}
