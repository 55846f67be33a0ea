//! JS 执行器 - 基础设施层
//!
//! 持有一个浏览器 page，对外只暴露"执行 JS"和页面操作能力

use async_trait::async_trait;
use chromiumoxide::Page;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::error::ScrapeError;
use crate::infrastructure::docket_page::{DocketPage, RawPartyRow};
use crate::models::Movement;

/// JS 执行器
///
/// 职责：
/// - 持有一个 Page 资源（由页面池管理生命周期）
/// - 暴露 eval() 能力
/// - 不认识案件 / 审级
pub struct JsExecutor {
    page: Page,
}

/// 脚本统一返回对象，避免 `null` 返回值无法反序列化
#[derive(Debug, Deserialize)]
struct Wrapped<T> {
    value: Option<T>,
}

impl JsExecutor {
    /// 创建新的 JS 执行器
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    /// 执行 JS 代码并返回 JSON 结果
    pub async fn eval(&self, js_code: impl Into<String>) -> Result<JsonValue, ScrapeError> {
        let result = self.page.evaluate(js_code.into()).await?;
        let json_value = result.into_value()?;
        Ok(json_value)
    }

    /// 执行 JS 代码并反序列化为指定类型
    pub async fn eval_as<T: DeserializeOwned>(
        &self,
        js_code: impl Into<String>,
    ) -> Result<T, ScrapeError> {
        let json_value = self.eval(js_code).await?;
        let typed_value = serde_json::from_value(json_value)?;
        Ok(typed_value)
    }

    /// 执行返回 `{ value }` 的脚本
    async fn eval_wrapped<T: DeserializeOwned>(&self, js_code: String) -> Result<Option<T>, ScrapeError> {
        let wrapped: Wrapped<T> = self.eval_as(js_code).await?;
        Ok(wrapped.value)
    }
}

#[async_trait]
impl DocketPage for JsExecutor {
    async fn current_url(&self) -> Result<String, ScrapeError> {
        Ok(self.page.url().await?.unwrap_or_default())
    }

    async fn goto(&self, url: &str) -> Result<(), ScrapeError> {
        self.page.goto(url).await?;
        Ok(())
    }

    async fn type_text(&self, selector: &str, text: &str) -> Result<(), ScrapeError> {
        self.page
            .find_element(selector)
            .await?
            .click()
            .await?
            .type_str(text)
            .await?;
        Ok(())
    }

    async fn click_and_wait_for_navigation(&self, selector: &str) -> Result<(), ScrapeError> {
        self.page.find_element(selector).await?.click().await?;
        self.page.wait_for_navigation().await?;
        Ok(())
    }

    async fn text_or_none(&self, selector: &str) -> Result<Option<String>, ScrapeError> {
        let js_code = format!(
            r#"
            (() => {{
                const el = document.querySelector({});
                return {{ value: el ? el.textContent.trim() : null }};
            }})()
            "#,
            serde_json::to_string(selector)?
        );
        self.eval_wrapped(js_code).await
    }

    async fn attribute(&self, selector: &str, name: &str) -> Result<Option<String>, ScrapeError> {
        let js_code = format!(
            r#"
            (() => {{
                const el = document.querySelector({});
                return {{ value: el ? el.getAttribute({}) : null }};
            }})()
            "#,
            serde_json::to_string(selector)?,
            serde_json::to_string(name)?
        );
        self.eval_wrapped(js_code).await
    }

    async fn party_rows(&self, selector: &str) -> Result<Vec<RawPartyRow>, ScrapeError> {
        let js_code = format!(
            r#"
            (() => {{
                const rows = Array.from(document.querySelectorAll({}), row => {{
                    const columns = row.querySelectorAll('td');
                    return {{
                        type: columns[0] ? columns[0].innerText.trim() : '',
                        text: columns[1] ? columns[1].innerText : null
                    }};
                }});
                return {{ value: rows }};
            }})()
            "#,
            serde_json::to_string(selector)?
        );
        Ok(self.eval_wrapped(js_code).await?.unwrap_or_default())
    }

    async fn movement_rows(&self, selector: &str) -> Result<Vec<Movement>, ScrapeError> {
        let js_code = format!(
            r#"
            (() => {{
                const text = el => el && el.textContent ? el.textContent.trim() : null;
                const rows = Array.from(document.querySelectorAll({}), row => {{
                    const description = row.querySelector('.descricaoMovimentacao');
                    return {{
                        date: text(row.querySelector('.dataMovimentacao')),
                        description: description ? text(description.childNodes[0]) : null,
                        details: text(row.querySelector('.descricaoMovimentacao span'))
                    }};
                }});
                return {{ value: rows }};
            }})()
            "#,
            serde_json::to_string(selector)?
        );
        Ok(self.eval_wrapped(js_code).await?.unwrap_or_default())
    }
}
