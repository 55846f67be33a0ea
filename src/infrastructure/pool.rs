//! 页面池 - 基础设施层
//!
//! 持有稀缺的浏览器页面，只以租约（`PageLease`）的形式借出。
//! 租约在 `Drop` 时归还页面，所以每次借出恰好归还一次，
//! 不论抓取成功、找不到案件还是中途出错。

use std::collections::{HashMap, VecDeque};
use std::ops::Deref;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::Semaphore;
use tracing::debug;

use crate::error::PoolError;

/// 借出 / 归还计数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    pub acquired: usize,
    pub released: usize,
}

impl PoolStats {
    /// 当前仍在外的租约数
    pub fn outstanding(&self) -> usize {
        self.acquired - self.released
    }
}

/// 通用页面池
///
/// 空闲页面数始终等于信号量的可用许可数；池空时 `acquire` 挂起，
/// 直到有人归还页面。没有任何页面的池永远等不到归还，`acquire` 直接失败。
pub struct PagePool<H> {
    name: String,
    capacity: usize,
    idle: Mutex<VecDeque<H>>,
    permits: Semaphore,
    acquired: AtomicUsize,
    released: AtomicUsize,
}

impl<H> PagePool<H> {
    pub fn new(name: impl Into<String>, pages: Vec<H>) -> Self {
        let capacity = pages.len();
        Self {
            name: name.into(),
            capacity,
            idle: Mutex::new(pages.into()),
            permits: Semaphore::new(capacity),
            acquired: AtomicUsize::new(0),
            released: AtomicUsize::new(0),
        }
    }

    /// 借出一个页面，池空时挂起
    pub async fn acquire(&self) -> Result<PageLease<'_, H>, PoolError> {
        if self.capacity == 0 {
            return Err(PoolError::Exhausted {
                pool: self.name.clone(),
            });
        }

        let permit = self.permits.acquire().await.map_err(|_| PoolError::Closed {
            pool: self.name.clone(),
        })?;

        let page = self.idle().pop_front().ok_or_else(|| PoolError::Exhausted {
            pool: self.name.clone(),
        })?;

        // 许可随页面一起借出，归还时再补回
        permit.forget();
        self.acquired.fetch_add(1, Ordering::SeqCst);
        debug!("页面池 {} 借出页面，剩余 {}", self.name, self.available());

        Ok(PageLease {
            pool: self,
            page: Some(page),
        })
    }

    /// 关闭页面池，等待中的和之后的 `acquire` 都会失败
    pub fn close(&self) {
        self.permits.close();
    }

    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            acquired: self.acquired.load(Ordering::SeqCst),
            released: self.released.load(Ordering::SeqCst),
        }
    }

    fn release(&self, page: H) {
        self.idle().push_back(page);
        self.released.fetch_add(1, Ordering::SeqCst);
        self.permits.add_permits(1);
        debug!("页面池 {} 归还页面", self.name);
    }

    fn idle(&self) -> MutexGuard<'_, VecDeque<H>> {
        self.idle.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// 页面租约，离开作用域时自动归还
pub struct PageLease<'a, H> {
    pool: &'a PagePool<H>,
    page: Option<H>,
}

impl<H> Deref for PageLease<'_, H> {
    type Target = H;

    fn deref(&self) -> &H {
        // 只有 drop 会取走页面
        self.page.as_ref().expect("page lease used after release")
    }
}

impl<H> Drop for PageLease<'_, H> {
    fn drop(&mut self) {
        if let Some(page) = self.page.take() {
            self.pool.release(page);
        }
    }
}

/// 按法院系统划分的预加载页面池
///
/// 每个法院系统一个子池，页面已停在该法院的一审查询页。
pub struct PreloadedPagePool<H> {
    pools: HashMap<String, PagePool<H>>,
}

impl<H> PreloadedPagePool<H> {
    pub fn new() -> Self {
        Self {
            pools: HashMap::new(),
        }
    }

    /// 登记一个法院系统的页面
    pub fn insert(&mut self, court_system: impl Into<String>, pages: Vec<H>) {
        let court_system = court_system.into();
        let pool = PagePool::new(court_system.clone(), pages);
        self.pools.insert(court_system, pool);
    }

    pub async fn acquire(&self, court_system: &str) -> Result<PageLease<'_, H>, PoolError> {
        self.pool(court_system)?.acquire().await
    }

    pub fn pool(&self, court_system: &str) -> Result<&PagePool<H>, PoolError> {
        self.pools
            .get(court_system)
            .ok_or_else(|| PoolError::UnknownCourtSystem {
                court_system: court_system.to_string(),
            })
    }

    pub fn stats(&self, court_system: &str) -> Option<PoolStats> {
        self.pools.get(court_system).map(PagePool::stats)
    }

    pub fn close(&self) {
        self.pools.values().for_each(PagePool::close);
    }
}

impl<H> Default for PreloadedPagePool<H> {
    fn default() -> Self {
        Self::new()
    }
}
