use std::io::Write;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use proxyprobe_core::{Outcome, Stats, TaskDescriptor};
use proxyprobe_exec::executor::{
    CompletedProbe, CompositeEventSink, Event, EventSink, ResultRow, TracingEventSink,
};
use uuid::Uuid;

struct CountingSink {
    kinds: Arc<Mutex<Vec<&'static str>>>,
}

#[async_trait]
impl EventSink for CountingSink {
    async fn emit(&self, event: Event) {
        self.kinds.lock().unwrap().push(event.kind());
    }
}

#[tokio::test]
async fn composite_sink_fans_out_in_order() {
    let kinds = Arc::new(Mutex::new(Vec::new()));
    let sink = CompositeEventSink::new()
        .with(Box::new(CountingSink { kinds: kinds.clone() }))
        .with(Box::new(TracingEventSink))
        .with(Box::new(CountingSink { kinds: kinds.clone() }));

    sink.emit(Event::TaskStarted {
        run_id: Uuid::nil(),
        task_id: 1,
    })
    .await;

    assert_eq!(*kinds.lock().unwrap(), vec!["task.started", "task.started"]);
}

#[test]
fn task_completed_json_carries_row_and_stats() {
    let descriptor = TaskDescriptor::new(3, "https://example.com", "");
    let outcome = Outcome::success(200, 1234.5, "ok");
    let mut stats = Stats::default();
    stats.record(&outcome);

    let event = Event::TaskCompleted {
        run_id: Uuid::nil(),
        row: ResultRow::new(&descriptor, &outcome),
        stats,
    };
    let json = event.to_json();

    assert_eq!(json["type"], "task.completed");
    assert_eq!(json["row"]["id"], 3);
    assert_eq!(json["row"]["outcome_summary"], "success");
    assert_eq!(json["row"]["response_time_display"], "1.23");
    assert_eq!(json["row"]["label"], "200");
    assert_eq!(json["stats"]["total"], 1);
    assert_eq!(json["stats"]["code_histogram"]["200"], 1);
}

#[test]
fn failure_rows_show_na_without_response_time() {
    let completed = CompletedProbe {
        descriptor: TaskDescriptor::new(9, "https://example.com", ""),
        outcome: Outcome::timeout("connect timed out"),
        attempts: 3,
    };
    let row = completed.row();

    assert_eq!(row.outcome_summary, "failure");
    assert_eq!(row.response_time_display, "N/A");
    assert_eq!(row.label, "timeout");
    assert_eq!(row.details, "connect timed out");
}

#[test]
fn retry_scheduled_json_has_delay() {
    let json = Event::RetryScheduled {
        run_id: Uuid::nil(),
        task_id: 5,
        attempt_no: 2,
        delay_ms: 2000,
    }
    .to_json();
    assert_eq!(json["type"], "retry.scheduled");
    assert_eq!(json["delay_ms"], 2000);
    assert_eq!(json["attempt_no"], 2);
}

#[test]
fn instant_success_still_shows_its_time() {
    let descriptor = TaskDescriptor::new(4, "https://example.com", "");
    let row = ResultRow::new(&descriptor, &Outcome::success(204, 0.0, ""));
    assert_eq!(row.response_time_display, "0.00");

    let failed = Outcome::Failure {
        kind: proxyprobe_core::FailureKind::NetworkError,
        response_time_ms: Some(0.0),
        details: String::new(),
    };
    assert_eq!(ResultRow::new(&descriptor, &failed).response_time_display, "N/A");
}

#[test]
fn task_skipped_json_names_the_task() {
    let json = Event::TaskSkipped {
        run_id: Uuid::nil(),
        task_id: 8,
    }
    .to_json();
    assert_eq!(json["type"], "task.skipped");
    assert_eq!(json["task_id"], 8);
}

#[derive(Clone, Default)]
struct CapturedLog(Arc<Mutex<Vec<u8>>>);

impl Write for CapturedLog {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn tracing_sink_leaves_run_lifecycle_to_the_engine() {
    let log = CapturedLog::default();
    let writer = log.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::TRACE)
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let descriptor = TaskDescriptor::new(1, "https://example.com", "");
    let outcome = Outcome::success(200, 10.0, "");
    let mut stats = Stats::default();
    stats.record(&outcome);

    let sink = TracingEventSink;
    sink.emit(Event::RunStarted {
        run_id: Uuid::nil(),
        total: 1,
        concurrency: 1,
    })
    .await;
    sink.emit(Event::RetryScheduled {
        run_id: Uuid::nil(),
        task_id: 1,
        attempt_no: 1,
        delay_ms: 1000,
    })
    .await;
    sink.emit(Event::TaskCompleted {
        run_id: Uuid::nil(),
        row: ResultRow::new(&descriptor, &outcome),
        stats: stats.clone(),
    })
    .await;
    sink.emit(Event::RunFinished {
        run_id: Uuid::nil(),
        stats,
        skipped: 0,
        cancelled: false,
    })
    .await;

    let text = String::from_utf8(log.0.lock().unwrap().clone()).unwrap();
    assert_eq!(text.matches("task completed").count(), 1);
    assert!(!text.contains("run started"));
    assert!(!text.contains("run finished"));
    assert!(!text.contains("retry scheduled"));
}
