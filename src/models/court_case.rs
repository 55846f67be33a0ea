use serde::{Deserialize, Serialize};

use super::court::Court;

/// 一次抓取请求
///
/// 入队后不可变，由调度循环消费一次；不去重。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlTask {
    pub case_number: String,
    pub process_number: String,
    pub origin_number: String,
    pub court: Court,
}

impl CrawlTask {
    /// 审级爬虫查询用的标识
    pub fn case_ids(&self) -> CaseIds {
        CaseIds {
            case_number: self.case_number.clone(),
            process_number: self.process_number.clone(),
            origin_number: self.origin_number.clone(),
            court: self.court,
        }
    }
}

/// 查询一个案件所需的标识
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseIds {
    pub case_number: String,
    pub process_number: String,
    pub origin_number: String,
    pub court: Court,
}

/// 抓取状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrawlStatus {
    Available,
    Failed,
}

/// 当事人
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lawyer: Option<String>,
}

/// 案件动态
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movement {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// 单个审级的案件数据
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DegreeCaseData {
    pub case_class: Option<String>,
    pub area: Option<String>,
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distribution_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub judge: Option<String>,
    pub action_value: Option<String>,
    pub parties: Vec<Party>,
    pub movements: Vec<Movement>,
}

/// 一个案件的抓取结果，最终投递给下游
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourtCaseResult {
    pub case_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_degree_case_data: Option<DegreeCaseData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub second_degree_case_data: Option<DegreeCaseData>,
    pub crawl_status: CrawlStatus,
}

impl CourtCaseResult {
    pub fn available(
        case_number: impl Into<String>,
        first_degree_case_data: Option<DegreeCaseData>,
        second_degree_case_data: Option<DegreeCaseData>,
    ) -> Self {
        Self {
            case_number: case_number.into(),
            first_degree_case_data,
            second_degree_case_data,
            crawl_status: CrawlStatus::Available,
        }
    }

    /// 案件级失败：不带任何审级数据
    pub fn failed(case_number: impl Into<String>) -> Self {
        Self {
            case_number: case_number.into(),
            first_degree_case_data: None,
            second_degree_case_data: None,
            crawl_status: CrawlStatus::Failed,
        }
    }

    pub fn is_failed(&self) -> bool {
        self.crawl_status == CrawlStatus::Failed
    }
}
