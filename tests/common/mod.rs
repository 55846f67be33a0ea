#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use court_case_crawler::clients::ResultSink;
use court_case_crawler::crawler::{Degree, DegreeCrawler};
use court_case_crawler::error::{DeliveryError, PoolError, ScrapeError};
use court_case_crawler::infrastructure::{DocketPage, RawPartyRow};
use court_case_crawler::models::{
    CaseIds, Court, CourtCaseResult, CrawlTask, DegreeCaseData, Movement,
};

/// 页面内容（与地址无关）
#[derive(Debug, Clone, Default)]
pub struct FakeSite {
    pub texts: HashMap<String, String>,
    pub attributes: HashMap<(String, String), String>,
    pub parties: Vec<RawPartyRow>,
    pub movements: Vec<Movement>,
    pub failing_selectors: HashSet<String>,
}

impl FakeSite {
    pub fn with_text(mut self, selector: &str, text: &str) -> Self {
        self.texts.insert(selector.to_string(), text.to_string());
        self
    }

    pub fn with_attribute(mut self, selector: &str, name: &str, value: &str) -> Self {
        self.attributes
            .insert((selector.to_string(), name.to_string()), value.to_string());
        self
    }

    pub fn with_party(mut self, kind: &str, text: &str) -> Self {
        self.parties.push(RawPartyRow {
            kind: kind.to_string(),
            text: Some(text.to_string()),
        });
        self
    }

    pub fn failing(mut self, selector: &str) -> Self {
        self.failing_selectors.insert(selector.to_string());
        self
    }

    /// 一个正常的一审案件页
    pub fn first_degree_case() -> Self {
        FakeSite::default()
            .with_text("#classeProcesso", "Procedimento Comum Cível")
            .with_text("#areaProcesso", "Cível")
            .with_text("#assuntoProcesso", "Dano Material")
            .with_text("#dataHoraDistribuicaoProcesso", "02/05/2018 às 19:01")
            .with_text("#juizProcesso", "José Cícero Alves da Silva")
            .with_text("#valorAcaoProcesso", "R$ 281.178,42")
            .with_party("Autor", "José Carlos Advogado: Vinicius Faria")
    }

    /// 一个正常的二审案件页
    pub fn second_degree_case() -> Self {
        FakeSite::default()
            .with_text("#classeProcesso span", "Apelação Cível")
            .with_text("#areaProcesso span", "Cível")
            .with_text("#valorAcaoProcesso span", "281.178,42")
            .with_party("Apelante", "Cony Engenharia Ltda. Advogada: Carla Souza")
    }
}

pub struct FakePage {
    site: FakeSite,
    url: Mutex<String>,
    pub visited: Mutex<Vec<String>>,
    pub typed: Mutex<Vec<(String, String)>>,
}

impl FakePage {
    pub fn new(site: FakeSite) -> Self {
        Self::at(site, "about:blank")
    }

    pub fn at(site: FakeSite, url: &str) -> Self {
        Self {
            site,
            url: Mutex::new(url.to_string()),
            visited: Mutex::new(Vec::new()),
            typed: Mutex::new(Vec::new()),
        }
    }

    fn check(&self, selector: &str) -> Result<(), ScrapeError> {
        if self.site.failing_selectors.contains(selector) {
            return Err(ScrapeError::Page(format!("{} timed out", selector)));
        }
        Ok(())
    }
}

#[async_trait]
impl DocketPage for FakePage {
    async fn current_url(&self) -> Result<String, ScrapeError> {
        Ok(self.url.lock().unwrap().clone())
    }

    async fn goto(&self, url: &str) -> Result<(), ScrapeError> {
        tokio::time::sleep(Duration::from_millis(2)).await;
        *self.url.lock().unwrap() = url.to_string();
        self.visited.lock().unwrap().push(url.to_string());
        Ok(())
    }

    async fn type_text(&self, selector: &str, text: &str) -> Result<(), ScrapeError> {
        self.check(selector)?;
        self.typed
            .lock()
            .unwrap()
            .push((selector.to_string(), text.to_string()));
        Ok(())
    }

    async fn click_and_wait_for_navigation(&self, selector: &str) -> Result<(), ScrapeError> {
        self.check(selector)?;
        *self.url.lock().unwrap() = "https://court.example/show.do".to_string();
        Ok(())
    }

    async fn text_or_none(&self, selector: &str) -> Result<Option<String>, ScrapeError> {
        self.check(selector)?;
        Ok(self.site.texts.get(selector).cloned())
    }

    async fn attribute(&self, selector: &str, name: &str) -> Result<Option<String>, ScrapeError> {
        self.check(selector)?;
        Ok(self
            .site
            .attributes
            .get(&(selector.to_string(), name.to_string()))
            .cloned())
    }

    async fn party_rows(&self, selector: &str) -> Result<Vec<RawPartyRow>, ScrapeError> {
        self.check(selector)?;
        Ok(self.site.parties.clone())
    }

    async fn movement_rows(&self, selector: &str) -> Result<Vec<Movement>, ScrapeError> {
        self.check(selector)?;
        Ok(self.site.movements.clone())
    }
}

/// 记录每次投递的下游
#[derive(Default)]
pub struct RecordingSink {
    pub payloads: tokio::sync::Mutex<Vec<Vec<CourtCaseResult>>>,
    pub fail_remaining: AtomicUsize,
}

impl RecordingSink {
    /// 前 `count` 次投递失败
    pub fn failing(count: usize) -> Self {
        Self {
            fail_remaining: AtomicUsize::new(count),
            ..Default::default()
        }
    }

    pub async fn delivered_case_numbers(&self) -> Vec<String> {
        self.payloads
            .lock()
            .await
            .iter()
            .flatten()
            .map(|r| r.case_number.clone())
            .collect()
    }
}

#[async_trait]
impl ResultSink for RecordingSink {
    async fn deliver(&self, results: &[CourtCaseResult]) -> Result<(), DeliveryError> {
        let failing = self
            .fail_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(DeliveryError::Other("connection refused".into()));
        }
        self.payloads.lock().await.push(results.to_vec());
        Ok(())
    }
}

/// 按案件号决定结果的审级爬虫
pub struct ScriptedCrawler {
    pub degree: Degree,
    pub delay: Duration,
    pub failing_cases: HashSet<String>,
    pub calls: AtomicUsize,
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl ScriptedCrawler {
    pub fn new(degree: Degree) -> Self {
        Self {
            degree,
            delay: Duration::from_millis(15),
            failing_cases: HashSet::new(),
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn failing_on(mut self, case_number: &str) -> Self {
        self.failing_cases.insert(case_number.to_string());
        self
    }
}

#[async_trait]
impl DegreeCrawler for ScriptedCrawler {
    fn degree(&self) -> Degree {
        self.degree
    }

    async fn scrape_case(&self, ids: &CaseIds) -> Result<Option<DegreeCaseData>, PoolError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing_cases.contains(&ids.case_number) {
            return Err(PoolError::Exhausted {
                pool: "generic".into(),
            });
        }
        Ok(Some(DegreeCaseData {
            case_class: Some(format!("{} {}", self.degree, ids.case_number)),
            ..Default::default()
        }))
    }
}

pub fn task(case_number: &str) -> CrawlTask {
    task_for(case_number, Court::Tjal)
}

pub fn task_for(case_number: &str, court: Court) -> CrawlTask {
    CrawlTask {
        case_number: case_number.to_string(),
        process_number: format!("{}-proc", case_number),
        origin_number: "0001".to_string(),
        court,
    }
}
