use std::sync::Arc;

use anyhow::{Context, Result};
use court_case_crawler::browser::{build_page_pools, open_browser};
use court_case_crawler::clients::CourtApiClient;
use court_case_crawler::crawler::{FirstDegreeCrawler, SecondDegreeCrawler};
use court_case_crawler::utils::logging;
use court_case_crawler::{api, CaseOrchestrator, CaseProcessor, Config};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::load().context("加载配置失败")?;

    // 初始化日志
    logging::init(config.verbose_logging);
    logging::log_startup(&config);

    // 浏览器与页面池
    let browser = open_browser(&config).await?;
    let pools = build_page_pools(&browser, &config).await?;

    let orchestrator = CaseOrchestrator::new(
        Arc::new(FirstDegreeCrawler::new(pools.preloaded.clone())),
        Arc::new(SecondDegreeCrawler::new(pools.generic.clone())),
    );
    let sink = Arc::new(CourtApiClient::new(&config));
    let processor = Arc::new(CaseProcessor::new(config.clone(), orchestrator, sink));

    // 后台调度循环
    let background = processor.clone();
    tokio::spawn(async move {
        let exit = background.start_processing().await;
        warn!("调度循环结束: {:?}", exit);
    });

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .with_context(|| format!("无法监听 {}", config.listen_addr))?;
    info!("✓ 服务已启动: {}", config.listen_addr);

    axum::serve(listener, api::router(processor.clone()))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP 服务异常退出")?;

    // 退出前把缓冲区里的结果再发一次
    processor.stop_processing();
    let outcome = processor.flush_now().await;
    info!("退出前刷出: {:?}", outcome);
    pools.close();

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("无法监听退出信号: {}", e);
        std::future::pending::<()>().await;
    }
    info!("收到退出信号");
}
