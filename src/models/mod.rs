pub mod court;
pub mod court_case;

pub use court::Court;
pub use court_case::{
    CaseIds, CourtCaseResult, CrawlStatus, CrawlTask, DegreeCaseData, Movement, Party,
};
