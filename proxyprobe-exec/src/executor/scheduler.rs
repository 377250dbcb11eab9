use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use proxyprobe_core::{RunParams, Stats, TaskDescriptor};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use uuid::Uuid;

use crate::executor::backlog::Backlog;
use crate::executor::collector::collect;
use crate::executor::concurrency::InFlightGauge;
use crate::executor::control::RunControl;
use crate::executor::events::{Event, EventSink};
use crate::executor::result::{ExecutionError, RunSummary};
use crate::executor::stats::StatsAggregator;
use crate::executor::stream::OutcomeStream;
use crate::executor::types::ExecutorConfig;
use crate::executor::worker::{RunShared, Worker};
use crate::probe::ProbeClient;
use crate::retry::RetryPolicy;

/// Runs descriptors through the retry policy with at most `concurrency` in
/// flight, feeding every outcome to the statistics aggregator and the event
/// sink.
///
/// A scheduler drives one run at a time.
pub struct Scheduler {
    config: ExecutorConfig,
    probe: Arc<dyn ProbeClient>,
    aggregator: Arc<StatsAggregator>,
    event_sink: Arc<dyn EventSink>,
    active: Arc<AtomicBool>,
}

impl Scheduler {
    pub fn new(
        config: ExecutorConfig,
        probe: Arc<dyn ProbeClient>,
        event_sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            config,
            probe,
            aggregator: Arc::new(StatsAggregator::new()),
            event_sink,
            active: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    pub fn aggregator(&self) -> Arc<StatsAggregator> {
        self.aggregator.clone()
    }

    pub async fn snapshot(&self) -> Stats {
        self.aggregator.snapshot().await
    }

    pub fn is_running(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    pub async fn reset_stats(&self) -> Result<(), ExecutionError> {
        let _claim = self.claim()?;
        self.aggregator.reset().await;
        Ok(())
    }

    /// Validates `params` and runs `testCount` descriptors for them.
    pub async fn start(
        &self,
        params: &RunParams,
        control: RunControl,
    ) -> Result<OutcomeStream, ExecutionError> {
        params.validate()?;
        self.run(params.descriptors(), params.concurrency, control)
            .await
    }

    /// Starts a run and returns its outcomes as a stream in completion order.
    ///
    /// Statistics are reset before the first descriptor is admitted.
    pub async fn run(
        &self,
        descriptors: Vec<TaskDescriptor>,
        concurrency: usize,
        control: RunControl,
    ) -> Result<OutcomeStream, ExecutionError> {
        if concurrency == 0 {
            return Err(ExecutionError::InvalidConcurrency);
        }
        let claim = self.claim()?;
        self.aggregator.reset().await;
        Ok(self.launch(claim, descriptors, concurrency, control).await)
    }

    fn claim(&self) -> Result<ActiveRun, ExecutionError> {
        self.active
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| ExecutionError::RunInProgress)?;
        Ok(ActiveRun(self.active.clone()))
    }

    async fn launch(
        &self,
        claim: ActiveRun,
        descriptors: Vec<TaskDescriptor>,
        concurrency: usize,
        control: RunControl,
    ) -> OutcomeStream {
        let run_id = Uuid::new_v4();
        let started = Instant::now();
        let total = descriptors.len();
        let workers = concurrency.min(total);

        tracing::info!(run_id = %run_id, total, concurrency, workers, "run started");
        self.event_sink
            .emit(Event::RunStarted {
                run_id,
                total,
                concurrency,
            })
            .await;

        let shared = Arc::new(RunShared {
            run_id,
            backlog: Backlog::new(descriptors),
            gauge: InFlightGauge::new(concurrency),
            aggregator: self.aggregator.clone(),
            event_sink: self.event_sink.clone(),
            control,
            skipped: AtomicUsize::new(0),
        });

        let (out_tx, out_rx) = mpsc::channel(workers.max(1));
        let (done_tx, done_rx) = mpsc::channel(workers.max(1));
        let collector = tokio::spawn(collect(shared.clone(), done_rx, out_tx));

        let worker = Worker {
            shared: shared.clone(),
            policy: RetryPolicy::new(self.probe.clone(), self.config.retry.clone())
                .with_event_sink(self.event_sink.clone())
                .for_run(run_id),
            done: done_tx,
        };
        let handles: Vec<JoinHandle<()>> = (0..workers)
            .map(|n| tokio::spawn(worker.clone().run(n)))
            .collect();
        drop(worker);

        let supervisor = tokio::spawn(supervise(shared, handles, collector, started, claim));
        OutcomeStream::new(run_id, out_rx, supervisor)
    }
}

/// Waits for every worker and the collector, then publishes the final
/// statistics.
async fn supervise(
    shared: Arc<RunShared>,
    handles: Vec<JoinHandle<()>>,
    collector: JoinHandle<()>,
    started: Instant,
    _claim: ActiveRun,
) -> Result<RunSummary, ExecutionError> {
    let mut join_error = None;
    for handle in handles.into_iter().chain(std::iter::once(collector)) {
        if let Err(e) = handle.await {
            tracing::error!(run_id = %shared.run_id, error = %e, "run task failed");
            join_error.get_or_insert_with(|| format!("run {}: {e}", shared.run_id));
        }
    }

    let stats = shared.aggregator.snapshot().await;
    let skipped = shared.skipped.load(Ordering::SeqCst) + shared.backlog.len();
    let cancelled = shared.control.is_cancelled();
    let elapsed = started.elapsed();

    tracing::info!(
        run_id = %shared.run_id,
        total = stats.total,
        success = stats.success,
        failed = stats.failed,
        timeout = stats.timeout,
        skipped,
        cancelled,
        elapsed_ms = elapsed.as_millis() as u64,
        "run finished"
    );
    shared
        .event_sink
        .emit(Event::RunFinished {
            run_id: shared.run_id,
            stats: stats.clone(),
            skipped,
            cancelled,
        })
        .await;

    if let Some(e) = join_error {
        return Err(ExecutionError::TaskJoin(e));
    }
    Ok(RunSummary {
        run_id: shared.run_id,
        stats,
        skipped,
        cancelled,
        elapsed,
        peak_in_flight: shared.gauge.peak(),
    })
}

/// Marks the scheduler busy until dropped.
struct ActiveRun(Arc<AtomicBool>);

impl Drop for ActiveRun {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}
