/// 下游存储 API 客户端
///
/// 每次调用投递一组结果（刷出时每组只有一个案件）
use async_trait::async_trait;
use tracing::debug;

use crate::config::Config;
use crate::error::DeliveryError;
use crate::models::CourtCaseResult;

/// 结果投递目标
#[async_trait]
pub trait ResultSink: Send + Sync {
    async fn deliver(&self, results: &[CourtCaseResult]) -> Result<(), DeliveryError>;
}

/// 存储 API 客户端
pub struct CourtApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl CourtApiClient {
    /// 创建新的存储 API 客户端
    pub fn new(config: &Config) -> Self {
        Self::with_client(reqwest::Client::new(), &config.court_api_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// 写入案件的接口地址
    pub fn endpoint(&self) -> String {
        format!("{}/insert-court-cases", self.base_url)
    }
}

#[async_trait]
impl ResultSink for CourtApiClient {
    async fn deliver(&self, results: &[CourtCaseResult]) -> Result<(), DeliveryError> {
        let endpoint = self.endpoint();
        debug!("投递 {} 个案件到 {}", results.len(), endpoint);

        let response = self
            .client
            .post(&endpoint)
            .json(results)
            .send()
            .await
            .map_err(|source| DeliveryError::RequestFailed {
                endpoint: endpoint.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DeliveryError::BadStatus {
                endpoint,
                status: status.as_u16(),
            });
        }

        Ok(())
    }
}
