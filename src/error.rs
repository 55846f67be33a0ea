use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 浏览器相关错误
    #[error("浏览器错误: {0}")]
    Browser(#[from] BrowserError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 其他错误（用于包装第三方库错误）
    #[error("错误: {0}")]
    Other(String),
}

/// 浏览器相关错误
#[derive(Debug, Error)]
pub enum BrowserError {
    /// 连接浏览器失败
    #[error("无法连接到浏览器 (端口: {port}): {source}")]
    ConnectionFailed {
        port: u16,
        #[source]
        source: chromiumoxide::error::CdpError,
    },
    /// 启动浏览器失败
    #[error("启动浏览器失败: {0}")]
    LaunchFailed(String),
    /// 创建页面失败
    #[error("创建页面失败: {0}")]
    PageCreationFailed(#[source] chromiumoxide::error::CdpError),
}

/// 页面池错误
///
/// 这是唯一会让案件整体失败的错误：抓取层自己吞掉页面上的预期情况。
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// 页面池已关闭
    #[error("页面池已关闭: {pool}")]
    Closed { pool: String },
    /// 没有对应法院的预加载页面池
    #[error("没有为 {court_system} 预加载页面池")]
    UnknownCourtSystem { court_system: String },
    /// 许可与空闲页面数量不一致
    #[error("页面池 {pool} 已无空闲页面")]
    Exhausted { pool: String },
}

/// 页面抓取错误（单个审级内部处理，不会上抛到案件级别）
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// 站点返回"不存在信息"
    #[error("案件不存在: {case_number}")]
    CaseNotFound { case_number: String },
    /// 案件需要密码才能查看
    #[error("案件需要密码")]
    PasswordRequired,
    /// 浏览器协议错误
    #[error("浏览器操作失败: {0}")]
    Cdp(#[from] chromiumoxide::error::CdpError),
    /// 脚本返回值解析失败
    #[error("脚本返回值解析失败: {0}")]
    Json(#[from] serde_json::Error),
    /// 其他页面错误（测试替身也使用）
    #[error("页面错误: {0}")]
    Page(String),
}

/// 结果投递错误
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// 网络请求失败
    #[error("请求 {endpoint} 失败: {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// 下游返回非成功状态码
    #[error("下游 {endpoint} 返回状态码 {status}")]
    BadStatus { endpoint: String, status: u16 },
    /// 其他投递错误
    #[error("投递失败: {0}")]
    Other(String),
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 读取配置文件失败
    #[error("读取配置文件 {path} 失败: {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("配置文件 {path} 解析失败: {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// 配置值非法
    #[error("配置项 {field} 非法: {reason}")]
    Invalid { field: String, reason: String },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建浏览器连接错误
    pub fn browser_connection_failed(port: u16, source: chromiumoxide::error::CdpError) -> Self {
        AppError::Browser(BrowserError::ConnectionFailed { port, source })
    }
}

impl ScrapeError {
    /// 是否属于站点上的预期情况（找不到案件 / 需要密码）
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            ScrapeError::CaseNotFound { .. } | ScrapeError::PasswordRequired
        )
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
