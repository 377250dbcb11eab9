use std::path::Path;
use std::time::Duration;

use proxyprobe_core::RunParams;
use proxyprobe_exec::retry::Jitter;
use proxyprobe_exec::{ExecutorConfig, RetryConfig};
use serde::Deserialize;

use crate::output::{print_error, print_violations};
use crate::{EndpointArgs, OutputArgs, ParamsArgs, RetryArgs};

pub const ENDPOINT_ENV: &str = "PROXYPROBE_ENDPOINT";

/// On-disk run configuration. Every field is optional; flags win over it.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ConfigFile {
    pub target_url: Option<String>,
    pub proxy_url: Option<String>,
    pub test_count: Option<usize>,
    pub concurrency: Option<usize>,
    pub endpoint: Option<String>,
    pub timeout_ms: Option<u64>,
    #[serde(default)]
    pub retry: RetryFile,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RetryFile {
    pub max_retries: Option<u32>,
    pub base_delay_ms: Option<u64>,
    pub max_delay_ms: Option<u64>,
    pub jitter: Option<String>,
}

#[derive(Debug)]
pub struct Resolved {
    pub params: RunParams,
    pub executor: ExecutorConfig,
}

#[derive(Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    Unreadable(String),
    /// The config file could not be parsed.
    Malformed(String),
    Invalid(Vec<String>),
}

impl ConfigError {
    pub fn report(&self, output: &OutputArgs) {
        match self {
            ConfigError::Unreadable(msg) | ConfigError::Malformed(msg) => {
                print_error(output.format, output.quiet, msg)
            }
            ConfigError::Invalid(violations) => {
                print_violations(output.format, output.quiet, violations)
            }
        }
    }
}

pub fn load_config_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        ConfigError::Unreadable(format!("failed to read {}: {e}", path.display()))
    })?;
    if let Ok(v) = serde_json::from_str(&content) {
        return Ok(v);
    }
    serde_yaml::from_str(&content).map_err(|e| {
        ConfigError::Malformed(format!(
            "{} is neither a valid JSON nor a valid YAML config: {e}",
            path.display()
        ))
    })
}

/// Layers defaults < config file < environment < flags and validates the result.
pub fn resolve(
    params: &ParamsArgs,
    endpoint: &EndpointArgs,
    retry: &RetryArgs,
) -> Result<Resolved, ConfigError> {
    let file = match &params.config {
        Some(path) => load_config_file(path)?,
        None => ConfigFile::default(),
    };
    let env_endpoint = std::env::var(ENDPOINT_ENV).ok().filter(|v| !v.trim().is_empty());
    resolve_with(params, endpoint, retry, file, env_endpoint)
}

fn resolve_with(
    params: &ParamsArgs,
    endpoint: &EndpointArgs,
    retry: &RetryArgs,
    file: ConfigFile,
    env_endpoint: Option<String>,
) -> Result<Resolved, ConfigError> {
    let mut violations = Vec::new();
    let mut missing = Vec::new();

    let target_url = params
        .target_url
        .clone()
        .or(file.target_url)
        .unwrap_or_default();
    let proxy_url = params.proxy_url.clone().or(file.proxy_url).unwrap_or_default();
    let test_count = params.test_count.or(file.test_count).unwrap_or_else(|| {
        missing.push("testCount");
        0
    });
    let concurrency = params.concurrency.or(file.concurrency).unwrap_or_else(|| {
        missing.push("concurrency");
        0
    });
    for field in &missing {
        violations.push(format!("{field}: is required"));
    }

    let run_params = match RunParams::new(target_url, proxy_url, test_count, concurrency) {
        Ok(p) => Some(p),
        Err(err) => {
            violations.extend(
                err.violations
                    .iter()
                    .filter(|v| !missing.contains(&v.field.as_str()))
                    .map(|v| v.to_string()),
            );
            None
        }
    };

    let endpoint_url = endpoint
        .endpoint
        .clone()
        .or(env_endpoint)
        .or(file.endpoint)
        .map(|e| e.trim().to_string())
        .unwrap_or_else(|| proxyprobe_exec::executor::DEFAULT_ENDPOINT.to_string());
    if !(endpoint_url.starts_with("http://") || endpoint_url.starts_with("https://")) {
        violations.push(format!("endpoint: '{endpoint_url}' is not an http(s) URL"));
    }

    let defaults = ExecutorConfig::default();
    let probe_timeout = match endpoint.timeout.or(file.timeout_ms) {
        Some(0) => {
            violations.push("timeout: must be greater than 0".to_string());
            defaults.probe_timeout
        }
        Some(ms) => Duration::from_millis(ms),
        None => defaults.probe_timeout,
    };

    let retry_config = match resolve_retry(retry, file.retry, defaults.retry) {
        Ok(cfg) => cfg,
        Err(mut errs) => {
            violations.append(&mut errs);
            RetryConfig::default()
        }
    };

    match run_params {
        Some(params) if violations.is_empty() => Ok(Resolved {
            params,
            executor: ExecutorConfig {
                endpoint: endpoint_url,
                probe_timeout,
                retry: retry_config,
            },
        }),
        _ => Err(ConfigError::Invalid(violations)),
    }
}

fn resolve_retry(
    args: &RetryArgs,
    file: RetryFile,
    defaults: RetryConfig,
) -> Result<RetryConfig, Vec<String>> {
    let mut violations = Vec::new();

    let base_delay = args
        .retry_base_delay
        .or(file.base_delay_ms)
        .map(Duration::from_millis)
        .unwrap_or(defaults.base_delay);
    let max_delay = args
        .retry_max_delay
        .or(file.max_delay_ms)
        .map(Duration::from_millis)
        .unwrap_or(defaults.max_delay);
    if max_delay < base_delay {
        violations.push(format!(
            "retryMaxDelay: {}ms is below the base delay of {}ms",
            max_delay.as_millis(),
            base_delay.as_millis()
        ));
    }

    let jitter = match args.retry_jitter.clone().or(file.jitter) {
        Some(raw) => raw.parse::<Jitter>().unwrap_or_else(|e| {
            violations.push(format!("retryJitter: {e}"));
            Jitter::None
        }),
        None => defaults.jitter,
    };

    if !violations.is_empty() {
        return Err(violations);
    }
    Ok(RetryConfig {
        max_retries: args
            .retries
            .or(file.max_retries)
            .unwrap_or(defaults.max_retries),
        base_delay,
        max_delay,
        jitter,
        ..defaults
    })
}
