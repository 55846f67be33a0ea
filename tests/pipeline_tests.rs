mod common;

use std::future::Future;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use common::{task, RecordingSink, ScriptedCrawler};
use court_case_crawler::crawler::Degree;
use court_case_crawler::models::{CourtCaseResult, CrawlStatus};
use court_case_crawler::orchestrator::{FlushOutcome, LoopExit};
use court_case_crawler::{CaseOrchestrator, CaseProcessor, Config};
use tokio_test::assert_ok;

struct Harness {
    processor: Arc<CaseProcessor>,
    first: Arc<ScriptedCrawler>,
    second: Arc<ScriptedCrawler>,
    sink: Arc<RecordingSink>,
}

fn harness(config: Config, first: ScriptedCrawler, sink: RecordingSink) -> Harness {
    let first = Arc::new(first);
    let second = Arc::new(ScriptedCrawler::new(Degree::Second));
    let sink = Arc::new(sink);
    let orchestrator = CaseOrchestrator::new(first.clone(), second.clone());
    let processor = Arc::new(CaseProcessor::new(config, orchestrator, sink.clone()));
    Harness {
        processor,
        first,
        second,
        sink,
    }
}

fn fast_config(worker_limit: usize, concurrency_limit: usize) -> Config {
    Config {
        worker_limit,
        concurrency_limit,
        flush_interval_ms: 30,
        empty_queue_delay_ms: 10,
        ..Config::default()
    }
}

async fn wait_until<F, Fut>(mut condition: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    tokio::time::timeout(Duration::from_secs(5), async {
        while !condition().await {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

#[tokio::test]
async fn test_backlog_at_worker_limit_halts_without_dequeuing() {
    let h = harness(
        fast_config(2, 2),
        ScriptedCrawler::new(Degree::First),
        RecordingSink::default(),
    );
    h.processor
        .add_court_cases(vec![task("A"), task("B"), task("C")])
        .await;

    let exit = h.processor.start_processing().await;

    assert_eq!(exit, LoopExit::Backlog);
    assert!(!h.processor.is_processing());
    assert_eq!(h.processor.queue_len().await, 3);
    assert_eq!(h.first.calls.load(Ordering::SeqCst), 0);
    assert!(h.processor.results().is_empty().await);
    h.processor.stop_processing();
}

#[tokio::test]
async fn test_backlog_check_can_be_disabled() {
    let h = harness(
        Config {
            halt_on_backlog: false,
            ..fast_config(2, 2)
        },
        ScriptedCrawler::new(Degree::First),
        RecordingSink::default(),
    );
    h.processor
        .add_court_cases(vec![task("A"), task("B"), task("C")])
        .await;

    let processor = h.processor.clone();
    let loop_handle = tokio::spawn(async move { processor.start_processing().await });

    let sink = h.sink.clone();
    wait_until(|| {
        let sink = sink.clone();
        async move { sink.delivered_case_numbers().await.len() == 3 }
    })
    .await;

    h.processor.stop_processing();
    assert_eq!(loop_handle.await.unwrap(), LoopExit::Stopped);
    assert_eq!(h.processor.queue_len().await, 0);
}

#[tokio::test]
async fn test_batch_is_processed_within_concurrency_limit_and_flushed() {
    let h = harness(
        fast_config(5, 2),
        ScriptedCrawler::new(Degree::First),
        RecordingSink::default(),
    );
    h.processor
        .add_court_cases(vec![task("A"), task("B"), task("C")])
        .await;

    let processor = h.processor.clone();
    let loop_handle = tokio::spawn(async move { processor.start_processing().await });

    let sink = h.sink.clone();
    wait_until(|| {
        let sink = sink.clone();
        async move { sink.delivered_case_numbers().await.len() == 3 }
    })
    .await;

    h.processor.stop_processing();
    assert_eq!(loop_handle.await.unwrap(), LoopExit::Stopped);

    let mut delivered = h.sink.delivered_case_numbers().await;
    delivered.sort();
    assert_eq!(delivered, vec!["A", "B", "C"]);
    assert!(h.first.max_in_flight.load(Ordering::SeqCst) <= 2);
    assert!(h.second.max_in_flight.load(Ordering::SeqCst) <= 2);
    assert_eq!(h.first.calls.load(Ordering::SeqCst), 3);
    assert_eq!(h.processor.queue_len().await, 0);

    // 每次投递只带一个案件
    assert!(h.sink.payloads.lock().await.iter().all(|p| p.len() == 1));
}

#[tokio::test]
async fn test_failing_case_does_not_affect_siblings() {
    let h = harness(
        fast_config(5, 2),
        ScriptedCrawler::new(Degree::First).failing_on("B"),
        RecordingSink::default(),
    );

    let result = assert_ok!(
        h.processor
            .execute_batch(vec![task("A"), task("B"), task("C")])
            .await
    );
    assert_eq!((result.available, result.failed), (2, 1));

    let results = h.processor.results().snapshot().await;
    assert_eq!(results.len(), 3);
    let by_case = |case: &str| -> CourtCaseResult {
        results
            .iter()
            .find(|r| r.case_number == case)
            .cloned()
            .unwrap()
    };

    let failed = by_case("B");
    assert_eq!(failed.crawl_status, CrawlStatus::Failed);
    assert!(failed.first_degree_case_data.is_none());
    assert!(failed.second_degree_case_data.is_none());

    for case in ["A", "C"] {
        let ok = by_case(case);
        assert_eq!(ok.crawl_status, CrawlStatus::Available);
        assert!(ok.first_degree_case_data.is_some());
        assert!(ok.second_degree_case_data.is_some());
    }
}

#[tokio::test]
async fn test_failed_flush_restores_whole_batch_ahead_of_new_results() {
    let h = harness(
        Config {
            flush_concurrency_limit: 1,
            ..fast_config(5, 2)
        },
        ScriptedCrawler::new(Degree::First),
        RecordingSink::failing(1),
    );
    h.processor
        .execute_batch(vec![task("A"), task("B")])
        .await
        .unwrap();

    assert_eq!(h.processor.flush_now().await, FlushOutcome::Restored(2));
    assert_eq!(h.processor.results().len().await, 2);

    h.processor.execute_batch(vec![task("C")]).await.unwrap();
    let buffered: Vec<String> = h
        .processor
        .results()
        .snapshot()
        .await
        .into_iter()
        .map(|r| r.case_number)
        .collect();
    assert_eq!(buffered.len(), 3);
    assert_eq!(buffered[2], "C");

    assert_eq!(h.processor.flush_now().await, FlushOutcome::Delivered(3));
    assert!(h.processor.results().is_empty().await);
    assert_eq!(h.processor.flush_now().await, FlushOutcome::Empty);

    let delivered = h.sink.delivered_case_numbers().await;
    assert!(delivered.ends_with(&[
        buffered[0].clone(),
        buffered[1].clone(),
        "C".to_string()
    ]));
}

#[tokio::test]
async fn test_second_start_while_running_is_rejected() {
    let h = harness(
        fast_config(5, 2),
        ScriptedCrawler::new(Degree::First),
        RecordingSink::default(),
    );

    let processor = h.processor.clone();
    let loop_handle = tokio::spawn(async move { processor.start_processing().await });

    let processor = h.processor.clone();
    wait_until(|| {
        let processor = processor.clone();
        async move { processor.is_processing() }
    })
    .await;

    assert_eq!(h.processor.start_processing().await, LoopExit::AlreadyRunning);

    h.processor.stop_processing();
    h.processor.stop_processing();
    assert_eq!(loop_handle.await.unwrap(), LoopExit::Stopped);
}

#[tokio::test]
async fn test_restart_before_old_loop_exits_keeps_a_single_loop() {
    let h = harness(
        Config {
            empty_queue_delay_ms: 200,
            ..fast_config(5, 2)
        },
        ScriptedCrawler::new(Degree::First),
        RecordingSink::default(),
    );

    let processor = h.processor.clone();
    let first_loop = tokio::spawn(async move { processor.start_processing().await });
    let processor = h.processor.clone();
    wait_until(|| {
        let processor = processor.clone();
        async move { processor.is_processing() }
    })
    .await;

    // 旧循环还在空队列等待中
    tokio::time::sleep(Duration::from_millis(20)).await;
    h.processor.stop_processing();
    let restart = tokio::time::timeout(Duration::from_secs(1), h.processor.start_processing())
        .await
        .expect("restart must hand over to the running loop");
    assert_eq!(restart, LoopExit::AlreadyRunning);
    assert!(h.processor.is_processing());
    assert!(!first_loop.is_finished());

    h.processor
        .add_court_cases(vec![task("A"), task("B")])
        .await;
    let sink = h.sink.clone();
    wait_until(|| {
        let sink = sink.clone();
        async move { sink.delivered_case_numbers().await.len() == 2 }
    })
    .await;
    assert_eq!(h.first.calls.load(Ordering::SeqCst), 2);

    h.processor.stop_processing();
    assert_eq!(first_loop.await.unwrap(), LoopExit::Stopped);
}

#[tokio::test]
async fn test_stop_keeps_buffered_results_until_restart() {
    let h = harness(
        fast_config(5, 2),
        ScriptedCrawler::new(Degree::First),
        RecordingSink::default(),
    );

    let processor = h.processor.clone();
    let loop_handle = tokio::spawn(async move { processor.start_processing().await });
    let processor = h.processor.clone();
    wait_until(|| {
        let processor = processor.clone();
        async move { processor.is_processing() }
    })
    .await;
    h.processor.stop_processing();
    assert_eq!(loop_handle.await.unwrap(), LoopExit::Stopped);

    assert_ok!(h.processor.execute_batch(vec![task("A")]).await);
    tokio::time::sleep(Duration::from_millis(120)).await;
    assert!(h.sink.delivered_case_numbers().await.is_empty());
    assert_eq!(h.processor.results().len().await, 1);

    let processor = h.processor.clone();
    let loop_handle = tokio::spawn(async move { processor.start_processing().await });
    let sink = h.sink.clone();
    wait_until(|| {
        let sink = sink.clone();
        async move { sink.delivered_case_numbers().await == ["A"] }
    })
    .await;
    assert!(h.processor.results().is_empty().await);

    h.processor.stop_processing();
    assert_eq!(loop_handle.await.unwrap(), LoopExit::Stopped);
}

#[tokio::test]
async fn test_batch_execution_error_moves_straight_to_next_cycle() {
    let h = harness(
        Config {
            worker_limit: 1,
            concurrency_limit: 0,
            halt_on_backlog: false,
            empty_queue_delay_ms: 60_000,
            flush_interval_ms: 30,
            ..Config::default()
        },
        ScriptedCrawler::new(Degree::First),
        RecordingSink::default(),
    );
    h.processor
        .add_court_cases(vec![task("A"), task("B"), task("C")])
        .await;

    let processor = h.processor.clone();
    let loop_handle = tokio::spawn(async move { processor.start_processing().await });

    let processor = h.processor.clone();
    wait_until(|| {
        let processor = processor.clone();
        async move { processor.queue_len().await == 0 }
    })
    .await;

    assert!(h.processor.is_processing());
    assert_eq!(h.first.calls.load(Ordering::SeqCst), 0);
    assert!(h.processor.results().is_empty().await);

    h.processor.stop_processing();
    loop_handle.abort();
}
