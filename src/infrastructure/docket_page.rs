//! 案件页面操作能力
//!
//! 审级爬虫只通过这个 trait 操作页面，不直接接触浏览器。

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::ScrapeError;
use crate::models::Movement;

/// 当事人表格的一行原始文本
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawPartyRow {
    /// 第一列：当事人类型
    #[serde(rename = "type", default)]
    pub kind: String,
    /// 第二列：名称与律师混在一起的文本
    #[serde(default)]
    pub text: Option<String>,
}

/// 单个页面上的 DOM 操作
#[async_trait]
pub trait DocketPage: Send + Sync {
    /// 当前地址
    async fn current_url(&self) -> Result<String, ScrapeError>;

    /// 导航并等待页面加载
    async fn goto(&self, url: &str) -> Result<(), ScrapeError>;

    /// 在输入框中键入文本
    async fn type_text(&self, selector: &str, text: &str) -> Result<(), ScrapeError>;

    /// 点击元素并等待导航完成
    async fn click_and_wait_for_navigation(&self, selector: &str) -> Result<(), ScrapeError>;

    /// 元素去除首尾空白后的文本，元素不存在时为 `None`
    async fn text_or_none(&self, selector: &str) -> Result<Option<String>, ScrapeError>;

    /// 第一个匹配元素的属性值
    async fn attribute(&self, selector: &str, name: &str) -> Result<Option<String>, ScrapeError>;

    /// 当事人表格的所有行
    async fn party_rows(&self, selector: &str) -> Result<Vec<RawPartyRow>, ScrapeError>;

    /// 案件动态列表
    async fn movement_rows(&self, selector: &str) -> Result<Vec<Movement>, ScrapeError>;
}
