/// 日志工具模块
///
/// 提供日志初始化和输出的辅助函数
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// 初始化日志
///
/// `RUST_LOG` 优先；否则默认 `info`，开启详细日志时为 `debug`。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // 测试中可能重复初始化
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 案件抓取服务启动");
    info!(
        "启动时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("🌐 监听地址: {}", config.listen_addr);
    info!("📮 存储 API: {}", config.court_api_url);
    match config.browser_debug_port {
        Some(port) => info!("🧭 连接已有浏览器 (端口: {})", port),
        None => info!("🧭 启动无头浏览器"),
    }
    info!("{}", "=".repeat(60));
}

/// 记录调度参数
pub fn log_processing_settings(config: &Config, queue_size: usize) {
    info!("使用以下参数处理案件:");
    info!(
        "workerLimit={} concurrencyLimit={} delay={}ms queueSize={}",
        config.worker_limit, config.concurrency_limit, config.empty_queue_delay_ms, queue_size
    );
}

/// 记录批次开始信息
pub fn log_batch_start(batch_size: usize, remaining: usize, worker_limit: usize) {
    info!("{}", "─".repeat(60));
    info!("📦 本批处理 {} 个案件 (上限 {})，队列剩余 {}", batch_size, worker_limit, remaining);
}

/// 记录批次完成信息
pub fn log_batch_complete(available: usize, failed: usize) {
    info!(
        "✓ 本批完成: 成功 {}/{}，失败 {}",
        available,
        available + failed,
        failed
    );
    info!("{}", "─".repeat(60));
}

/// 截断长文本用于日志显示
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
