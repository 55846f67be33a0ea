use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;

/// 程序配置
///
/// 进程启动时构造一次，之后只读，显式传给各个组件。
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 每批最多出队的案件数；队列长度达到该值时调度循环停止
    pub worker_limit: usize,
    /// 一批内同时处理的案件数
    pub concurrency_limit: usize,
    /// 结果刷出间隔（毫秒）
    pub flush_interval_ms: u64,
    /// 刷出时同时投递的请求数
    pub flush_concurrency_limit: usize,
    /// 队列为空时的等待时间（毫秒）
    pub empty_queue_delay_ms: u64,
    /// 通用页面池预加载的空白页面数
    pub preloaded_empty_pages: usize,
    /// 每个法院系统预加载的一审查询页面数
    pub preloaded_pages_per_court: usize,
    /// 队列积压达到 worker_limit 时是否停止调度
    pub halt_on_backlog: bool,
    /// HTTP 监听地址
    pub listen_addr: String,
    /// 下游存储 API 地址
    pub court_api_url: String,
    /// 已运行浏览器的调试端口，未设置时启动无头浏览器
    pub browser_debug_port: Option<u16>,
    /// 无头模式下使用的浏览器可执行文件
    pub chrome_executable: Option<String>,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            worker_limit: 1000,
            concurrency_limit: 10,
            flush_interval_ms: 3000,
            flush_concurrency_limit: 5,
            empty_queue_delay_ms: 2000,
            preloaded_empty_pages: 1,
            preloaded_pages_per_court: 1,
            halt_on_backlog: true,
            listen_addr: "0.0.0.0:3008".to_string(),
            court_api_url: "http://localhost:3000".to_string(),
            browser_debug_port: None,
            chrome_executable: None,
            verbose_logging: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            worker_limit: env_parse("WORKER_LIMIT").unwrap_or(default.worker_limit),
            concurrency_limit: env_parse("CONCURRENCY_LIMIT").unwrap_or(default.concurrency_limit),
            flush_interval_ms: env_parse("FLUSH_INTERVAL_MS").unwrap_or(default.flush_interval_ms),
            flush_concurrency_limit: env_parse("FLUSH_CONCURRENCY_LIMIT").unwrap_or(default.flush_concurrency_limit),
            empty_queue_delay_ms: env_parse("EMPTY_QUEUE_DELAY_MS").unwrap_or(default.empty_queue_delay_ms),
            preloaded_empty_pages: env_parse("PRELOADED_EMPTY_PAGES").unwrap_or(default.preloaded_empty_pages),
            preloaded_pages_per_court: env_parse("PRELOADED_PAGES_PER_COURT").unwrap_or(default.preloaded_pages_per_court),
            halt_on_backlog: env_parse("HALT_ON_BACKLOG").unwrap_or(default.halt_on_backlog),
            listen_addr: std::env::var("LISTEN_ADDR").unwrap_or(default.listen_addr),
            court_api_url: std::env::var("TJ_API_URL").unwrap_or(default.court_api_url),
            browser_debug_port: env_parse("BROWSER_DEBUG_PORT").or(default.browser_debug_port),
            chrome_executable: std::env::var("CHROME_EXECUTABLE").ok().or(default.chrome_executable),
            verbose_logging: env_parse("VERBOSE_LOGGING").unwrap_or(default.verbose_logging),
        }
    }

    /// 从 TOML 文件加载，缺失的键使用默认值
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|source| ConfigError::TomlParseFailed {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// 设置了 `CRAWLER_CONFIG` 时读取该文件，否则读取环境变量
    pub fn load() -> Result<Self, ConfigError> {
        let config = match std::env::var("CRAWLER_CONFIG") {
            Ok(path) => Self::from_toml_file(path)?,
            Err(_) => Self::from_env(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let limits = [
            ("worker_limit", self.worker_limit),
            ("concurrency_limit", self.concurrency_limit),
            ("flush_concurrency_limit", self.flush_concurrency_limit),
            ("preloaded_empty_pages", self.preloaded_empty_pages),
            ("preloaded_pages_per_court", self.preloaded_pages_per_court),
        ];
        for (field, value) in limits {
            if value == 0 {
                return Err(ConfigError::Invalid {
                    field: field.to_string(),
                    reason: "必须大于 0".to_string(),
                });
            }
        }
        if self.flush_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "flush_interval_ms".to_string(),
                reason: "必须大于 0".to_string(),
            });
        }
        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}
