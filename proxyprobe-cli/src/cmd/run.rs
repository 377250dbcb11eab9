use std::sync::Arc;

use futures_util::StreamExt;
use proxyprobe_core::{RunParams, Stats};
use proxyprobe_exec::executor::{
    CompositeEventSink, EventSink, NoOpEventSink, ResultRow, StdoutEventSink, TracingEventSink,
};
use proxyprobe_exec::{ExecutorConfig, HttpProbeClient, RunControl, RunSummary, Scheduler};
use serde::Serialize;

use crate::cmd::config::{self, ConfigError};
use crate::cmd::progress::ProgressEventSink;
use crate::exit_codes;
use crate::output::{print_error, print_result, OutputFormat};
use crate::utils::redact_url_password;
use crate::{EndpointArgs, EventsMode, OutputArgs, ParamsArgs, RetryArgs};

#[derive(Serialize)]
struct RunReport {
    run_id: String,
    started_at: String,
    finished_at: String,
    target_url: String,
    proxy_url: String,
    endpoint: String,
    test_count: usize,
    concurrency: usize,
    summary: serde_json::Value,
    rates: Rates,
    avg_response_ms: Option<f64>,
    rows: Vec<ResultRow>,
}

#[derive(Serialize)]
struct Rates {
    success: f64,
    failed: f64,
    timeout: f64,
}

pub async fn run_cmd(
    params: ParamsArgs,
    endpoint: EndpointArgs,
    retry: RetryArgs,
    events: EventsMode,
    output: OutputArgs,
) -> i32 {
    let resolved = match config::resolve(&params, &endpoint, &retry) {
        Ok(r) => r,
        Err(e @ ConfigError::Unreadable(_)) => {
            e.report(&output);
            return exit_codes::RUNTIME_ERROR;
        }
        Err(e) => {
            e.report(&output);
            return exit_codes::VALIDATION_FAILED;
        }
    };

    let probe = match HttpProbeClient::from_config(&resolved.executor) {
        Ok(p) => p,
        Err(e) => {
            print_error(
                output.format,
                output.quiet,
                &format!("failed to build HTTP client: {e}"),
            );
            return exit_codes::RUNTIME_ERROR;
        }
    };

    let sink = build_event_sink(events, &output, resolved.params.test_count);
    let scheduler = Scheduler::new(resolved.executor.clone(), Arc::new(probe), sink);

    let control = RunControl::new();
    let interrupt = {
        let control = control.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupt received, cancelling run");
                control.cancel();
            }
        })
    };

    let started_at = chrono::Utc::now();
    let mut stream = match scheduler.start(&resolved.params, control).await {
        Ok(s) => s,
        Err(e) => {
            interrupt.abort();
            print_error(output.format, output.quiet, &format!("run failed to start: {e}"));
            return exit_codes::RUNTIME_ERROR;
        }
    };

    let print_rows = output.format == OutputFormat::Text && !output.quiet;
    let mut rows = Vec::with_capacity(resolved.params.test_count);
    while let Some(completed) = stream.next().await {
        let row = completed.row();
        if print_rows {
            println!("{}", format_row(&row));
        }
        rows.push(row);
    }

    let summary = stream.into_summary().await;
    interrupt.abort();
    let summary = match summary {
        Ok(s) => s,
        Err(e) => {
            print_error(output.format, output.quiet, &format!("run failed: {e}"));
            return exit_codes::RUNTIME_ERROR;
        }
    };

    match output.format {
        OutputFormat::Text => {
            if !output.quiet {
                print!("{}", render_report(&summary));
            }
        }
        OutputFormat::Json => {
            rows.sort_by_key(|r| r.id);
            let report = build_report(
                &resolved.params,
                &resolved.executor,
                &summary,
                started_at,
                rows,
            );
            print_result(output.format, output.quiet, &report);
        }
    }

    exit_code_for(&summary)
}

fn build_event_sink(
    events: EventsMode,
    output: &OutputArgs,
    total: usize,
) -> Arc<dyn EventSink> {
    let mut sinks: Vec<Box<dyn EventSink>> = Vec::new();
    match events {
        EventsMode::None => {}
        EventsMode::Stdout => sinks.push(Box::new(StdoutEventSink)),
        EventsMode::Log => sinks.push(Box::new(TracingEventSink)),
    }
    if output.format == OutputFormat::Text && !output.quiet {
        sinks.push(Box::new(ProgressEventSink::new(total)));
    }
    if sinks.is_empty() {
        return Arc::new(NoOpEventSink);
    }
    let mut composite = CompositeEventSink::new();
    for sink in sinks {
        composite.add(sink);
    }
    Arc::new(composite)
}

fn exit_code_for(summary: &RunSummary) -> i32 {
    let stats = &summary.stats;
    if summary.cancelled || summary.skipped > 0 || stats.failed > 0 || stats.timeout > 0 {
        exit_codes::RUN_FAILED
    } else {
        exit_codes::SUCCESS
    }
}

fn format_row(row: &ResultRow) -> String {
    let detail = row.details.lines().next().unwrap_or("");
    if detail.is_empty() {
        format!(
            "#{:<5} {:<8} {:>7}s  {}",
            row.id, row.outcome_summary, row.response_time_display, row.label
        )
    } else {
        format!(
            "#{:<5} {:<8} {:>7}s  {}  {}",
            row.id, row.outcome_summary, row.response_time_display, row.label, detail
        )
    }
}

fn render_report(summary: &RunSummary) -> String {
    let stats = &summary.stats;
    let mut out = String::new();
    out.push_str(&format!(
        "\nRun {} {} in {:.2}s\n",
        summary.run_id,
        if summary.cancelled { "cancelled" } else { "finished" },
        summary.elapsed.as_secs_f64()
    ));
    out.push_str(&format!("  Total:    {}\n", stats.total));
    out.push_str(&format!(
        "  Success:  {} ({:.2}%)\n",
        stats.success,
        stats.success_rate()
    ));
    out.push_str(&format!(
        "  Failed:   {} ({:.2}%)\n",
        stats.failed,
        stats.failure_rate()
    ));
    out.push_str(&format!(
        "  Timeout:  {} ({:.2}%)\n",
        stats.timeout,
        stats.timeout_rate()
    ));
    if summary.skipped > 0 {
        out.push_str(&format!("  Skipped:  {}\n", summary.skipped));
    }
    out.push_str(&format!("  Peak in flight: {}\n", summary.peak_in_flight));
    out.push_str(&render_response_times(stats));
    if !stats.code_histogram.is_empty() {
        out.push_str("  Status codes:\n");
        for (label, count) in &stats.code_histogram {
            out.push_str(&format!(
                "    {label}: {count} ({:.2}%)\n",
                stats.histogram_share(label)
            ));
        }
    }
    out
}

fn render_response_times(stats: &Stats) -> String {
    let rt = &stats.response_time;
    match (rt.avg_ms(), rt.min_ms, rt.max_ms) {
        (Some(avg), Some(min), Some(max)) => format!(
            "  Response time: avg {:.3}s, min {:.3}s, max {:.3}s\n",
            avg / 1000.0,
            min / 1000.0,
            max / 1000.0
        ),
        _ => "  Response time: N/A\n".to_string(),
    }
}

fn build_report(
    params: &RunParams,
    executor: &ExecutorConfig,
    summary: &RunSummary,
    started_at: chrono::DateTime<chrono::Utc>,
    rows: Vec<ResultRow>,
) -> RunReport {
    let stats = &summary.stats;
    RunReport {
        run_id: summary.run_id.to_string(),
        started_at: started_at.to_rfc3339(),
        finished_at: chrono::Utc::now().to_rfc3339(),
        target_url: params.target_url.clone(),
        proxy_url: redact_url_password(&params.proxy_url),
        endpoint: executor.endpoint.clone(),
        test_count: params.test_count,
        concurrency: params.concurrency,
        summary: summary.to_json(),
        rates: Rates {
            success: stats.success_rate(),
            failed: stats.failure_rate(),
            timeout: stats.timeout_rate(),
        },
        avg_response_ms: stats.response_time.avg_ms(),
        rows,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use proxyprobe_core::Outcome;
    use uuid::Uuid;

    use super::*;

    fn summary_with(outcomes: &[Outcome]) -> RunSummary {
        let mut stats = Stats::default();
        for o in outcomes {
            stats.record(o);
        }
        RunSummary {
            run_id: Uuid::nil(),
            stats,
            skipped: 0,
            cancelled: false,
            elapsed: Duration::from_millis(1500),
            peak_in_flight: 2,
        }
    }

    #[test]
    fn report_lists_rates_and_histogram() {
        let summary = summary_with(&[
            Outcome::success(200, 100.0, ""),
            Outcome::success(200, 300.0, ""),
            Outcome::timeout("slow"),
            Outcome::application_error("502", "bad gateway"),
        ]);
        let report = render_report(&summary);
        assert!(report.contains("Success:  2 (50.00%)"));
        assert!(report.contains("Failed:   1 (25.00%)"));
        assert!(report.contains("Timeout:  1 (25.00%)"));
        assert!(report.contains("avg 0.200s, min 0.100s, max 0.300s"));
        assert!(report.contains("200: 2 (50.00%)"));
        assert!(report.contains("timeout: 1 (25.00%)"));
        assert_eq!(exit_code_for(&summary), exit_codes::RUN_FAILED);
    }

    #[test]
    fn all_success_exits_zero() {
        let summary = summary_with(&[Outcome::success(204, 10.0, "")]);
        assert_eq!(exit_code_for(&summary), exit_codes::SUCCESS);

        let mut cancelled = summary.clone();
        cancelled.cancelled = true;
        assert_eq!(exit_code_for(&cancelled), exit_codes::RUN_FAILED);
    }

    #[test]
    fn row_shows_first_detail_line() {
        let row = ResultRow {
            id: 7,
            outcome_summary: "failure".into(),
            response_time_display: "N/A".into(),
            label: "NETWORK_ERROR".into(),
            details: "connection refused\nretried 3 times".into(),
        };
        let line = format_row(&row);
        assert!(line.starts_with("#7"));
        assert!(line.ends_with("NETWORK_ERROR  connection refused"));
    }
}
