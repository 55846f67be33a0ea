//! 案件详情页字段提取（一审、二审共用）
//!
//! 所有字段并发提取，任何一个失败（包括密码检查）整体失败，
//! 已经提取成功的字段一并丢弃。

use std::sync::OnceLock;

use regex::Regex;

use crate::error::ScrapeError;
use crate::infrastructure::{DocketPage, RawPartyRow};
use crate::models::{DegreeCaseData, Party};

/// 需要密码时弹窗标题的文本
const PASSWORD_MODAL_TITLE: &str = "Senha do processo";

/// 详情页各字段的选择器
#[derive(Debug, Clone, Copy)]
pub struct CasePageSelectors {
    pub case_class: &'static str,
    pub area: &'static str,
    pub subject: &'static str,
    /// 二审页面不提取
    pub distribution_date: Option<&'static str>,
    /// 二审页面不提取
    pub judge: Option<&'static str>,
    pub action_value: &'static str,
    pub parties_table_rows: &'static str,
    pub movements_table_rows: &'static str,
    pub modal_title: &'static str,
}

pub const FIRST_DEGREE_SELECTORS: CasePageSelectors = CasePageSelectors {
    case_class: "#classeProcesso",
    area: "#areaProcesso",
    subject: "#assuntoProcesso",
    distribution_date: Some("#dataHoraDistribuicaoProcesso"),
    judge: Some("#juizProcesso"),
    action_value: "#valorAcaoProcesso",
    parties_table_rows: "#tableTodasPartes tr",
    movements_table_rows: "#tabelaTodasMovimentacoes .containerMovimentacao",
    modal_title: ".modalTitulo",
};

pub const SECOND_DEGREE_SELECTORS: CasePageSelectors = CasePageSelectors {
    case_class: "#classeProcesso span",
    area: "#areaProcesso span",
    subject: "#assuntoProcesso span",
    distribution_date: None,
    judge: None,
    action_value: "#valorAcaoProcesso span",
    parties_table_rows: "#tableTodasPartes tr",
    movements_table_rows: "#tabelaTodasMovimentacoes .containerMovimentacao",
    modal_title: ".modalTitulo",
};

/// 提取当前页面上的案件数据
pub async fn fetch_case_data<P: DocketPage + ?Sized>(
    page: &P,
    selectors: &CasePageSelectors,
) -> Result<DegreeCaseData, ScrapeError> {
    let (
        case_class,
        area,
        subject,
        distribution_date,
        judge,
        action_value,
        party_rows,
        movements,
        (),
    ) = tokio::try_join!(
        page.text_or_none(selectors.case_class),
        page.text_or_none(selectors.area),
        page.text_or_none(selectors.subject),
        optional_text(page, selectors.distribution_date),
        optional_text(page, selectors.judge),
        page.text_or_none(selectors.action_value),
        page.party_rows(selectors.parties_table_rows),
        page.movement_rows(selectors.movements_table_rows),
        check_password_gate(page, selectors.modal_title),
    )?;

    Ok(DegreeCaseData {
        case_class,
        area,
        subject,
        distribution_date,
        judge,
        action_value,
        parties: party_rows.into_iter().map(parse_party_row).collect(),
        movements,
    })
}

async fn optional_text<P: DocketPage + ?Sized>(
    page: &P,
    selector: Option<&str>,
) -> Result<Option<String>, ScrapeError> {
    match selector {
        Some(selector) => page.text_or_none(selector).await,
        None => Ok(None),
    }
}

/// 弹窗提示需要密码时失败
async fn check_password_gate<P: DocketPage + ?Sized>(
    page: &P,
    modal_selector: &str,
) -> Result<(), ScrapeError> {
    let modal_text = page.text_or_none(modal_selector).await?;
    if modal_text.as_deref() == Some(PASSWORD_MODAL_TITLE) {
        return Err(ScrapeError::PasswordRequired);
    }
    Ok(())
}

fn lawyer_marker() -> &'static Regex {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    MARKER.get_or_init(|| Regex::new(r"(?i)Advogad[ao]:").expect("valid lawyer marker regex"))
}

/// 拆分当事人名称和律师
///
/// 第二列形如 `Fulano de Tal  Advogado: Beltrano`，
/// 第一个 `Advogado:` / `Advogada:` 之前是名称，之后是律师。
pub fn parse_party_row(row: RawPartyRow) -> Party {
    let kind = row.kind.trim().to_string();
    let Some(text) = row.text else {
        return Party {
            kind,
            description: String::new(),
            lawyer: None,
        };
    };

    match lawyer_marker().find(&text) {
        Some(marker) => Party {
            kind,
            description: text[..marker.start()].trim().to_string(),
            lawyer: Some(text[marker.end()..].trim().to_string()),
        },
        None => Party {
            kind,
            description: text.trim().to_string(),
            lawyer: None,
        },
    }
}
