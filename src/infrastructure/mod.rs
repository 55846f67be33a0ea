pub mod docket_page;
pub mod js_executor;
pub mod pool;

pub use docket_page::{DocketPage, RawPartyRow};
pub use js_executor::JsExecutor;
pub use pool::{PageLease, PagePool, PoolStats, PreloadedPagePool};
