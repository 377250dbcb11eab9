use proxyprobe_core::{FailureKind, Outcome, RunParams, Stats, TaskDescriptor};

#[test]
fn run_params_accepts_valid_input() {
    let p = RunParams::new(" https://example.com/ip ", "", 10, 3).unwrap();
    assert_eq!(p.target_url, "https://example.com/ip");
    assert_eq!(p.proxy_url, "");
    assert_eq!(p.descriptors().len(), 10);
}

#[test]
fn run_params_rejects_zero_count_and_concurrency() {
    let err = RunParams::new("https://example.com", "", 0, 0).unwrap_err();
    let fields: Vec<_> = err.violations.iter().map(|v| v.field.as_str()).collect();
    assert_eq!(fields, vec!["testCount", "concurrency"]);
    assert!(err.to_string().contains("2 violations"));
}

#[test]
fn run_params_rejects_bad_urls() {
    let err = RunParams::new("ftp://example.com", "not a url", 1, 1).unwrap_err();
    assert_eq!(err.violations.len(), 2);
    assert!(err.violations[0].message.contains("unsupported scheme 'ftp'"));
    assert_eq!(err.violations[1].field, "proxyUrl");
}

#[test]
fn run_params_accepts_socks_proxy() {
    assert!(RunParams::new("http://example.com", "socks5://127.0.0.1:1080", 1, 1).is_ok());
}

#[test]
fn descriptors_have_unique_positive_ids() {
    let ds = TaskDescriptor::batch(1, 5, "http://t", "http://p");
    let ids: Vec<u64> = ds.iter().map(|d| d.id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    assert!(ds.iter().all(|d| d.proxy_url == "http://p"));
}

#[test]
fn stats_count_each_outcome_once() {
    let mut stats = Stats::default();
    stats.record(&Outcome::success(200, 120.0, "ok"));
    stats.record(&Outcome::success(200, 80.0, "ok"));
    stats.record(&Outcome::timeout("slow"));
    stats.record(&Outcome::network_error("refused"));
    stats.record(&Outcome::application_error("502", "bad gateway"));

    assert_eq!(stats.total, 5);
    assert_eq!(stats.success, 2);
    assert_eq!(stats.timeout, 1);
    assert_eq!(stats.failed, 2);
    assert_eq!(stats.code_histogram["200"], 2);
    assert_eq!(stats.code_histogram["timeout"], 1);
    assert_eq!(stats.code_histogram["NETWORK_ERROR"], 1);
    assert_eq!(stats.code_histogram["502"], 1);
    assert!(stats.is_consistent());
}

#[test]
fn stats_track_response_times_of_successes() {
    let mut stats = Stats::default();
    stats.record(&Outcome::success(200, 100.0, ""));
    stats.record(&Outcome::success(200, 300.0, ""));
    stats.record(&Outcome::Failure {
        kind: FailureKind::Timeout,
        response_time_ms: Some(10_000.0),
        details: String::new(),
    });

    assert_eq!(stats.response_time.count, 2);
    assert_eq!(stats.response_time.avg_ms(), Some(200.0));
    assert_eq!(stats.response_time.min_ms, Some(100.0));
    assert_eq!(stats.response_time.max_ms, Some(300.0));
}

#[test]
fn stats_rates_are_zero_when_empty() {
    let stats = Stats::default();
    assert_eq!(stats.success_rate(), 0.0);
    assert_eq!(stats.response_time.avg_ms(), None);
    assert!(stats.is_consistent());
}

#[test]
fn stats_rates_are_percentages() {
    let mut stats = Stats::default();
    for _ in 0..3 {
        stats.record(&Outcome::success(200, 1.0, ""));
    }
    stats.record(&Outcome::timeout(""));
    assert_eq!(stats.success_rate(), 75.0);
    assert_eq!(stats.timeout_rate(), 25.0);
    assert_eq!(stats.failure_rate(), 0.0);
    assert_eq!(stats.histogram_share("200"), 75.0);
}
