use serde::Serialize;

use crate::cmd::config::{self, ConfigError};
use crate::exit_codes;
use crate::output::{print_result, OutputFormat};
use crate::utils::redact_url_password;
use crate::{EndpointArgs, OutputArgs, ParamsArgs, RetryArgs};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ValidateResult {
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    resolved: Option<ResolvedView>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ResolvedView {
    target_url: String,
    proxy_url: String,
    test_count: usize,
    concurrency: usize,
    endpoint: String,
    timeout_ms: u64,
    max_retries: u32,
    base_delay_ms: u64,
    max_delay_ms: u64,
    jitter: String,
}

pub async fn validate_cmd(
    params: ParamsArgs,
    endpoint: EndpointArgs,
    retry: RetryArgs,
    output: OutputArgs,
) -> i32 {
    match config::resolve(&params, &endpoint, &retry) {
        Ok(resolved) => {
            let p = &resolved.params;
            let e = &resolved.executor;
            let view = ResolvedView {
                target_url: p.target_url.clone(),
                proxy_url: redact_url_password(&p.proxy_url),
                test_count: p.test_count,
                concurrency: p.concurrency,
                endpoint: e.endpoint.clone(),
                timeout_ms: e.probe_timeout.as_millis() as u64,
                max_retries: e.retry.max_retries,
                base_delay_ms: e.retry.base_delay.as_millis() as u64,
                max_delay_ms: e.retry.max_delay.as_millis() as u64,
                jitter: format!("{:?}", e.retry.jitter).to_lowercase(),
            };
            if output.format == OutputFormat::Text && !output.quiet {
                println!(
                    "ok: {} probes of {} via {} ({} concurrent, endpoint {})",
                    view.test_count,
                    view.target_url,
                    if view.proxy_url.is_empty() { "no proxy" } else { view.proxy_url.as_str() },
                    view.concurrency,
                    view.endpoint
                );
            } else {
                let result = ValidateResult {
                    valid: true,
                    resolved: Some(view),
                    errors: vec![],
                };
                print_result(output.format, output.quiet, &result);
            }
            exit_codes::SUCCESS
        }
        Err(e @ ConfigError::Unreadable(_)) => {
            e.report(&output);
            exit_codes::RUNTIME_ERROR
        }
        Err(ConfigError::Invalid(errors)) if output.format == OutputFormat::Json => {
            let result = ValidateResult {
                valid: false,
                resolved: None,
                errors,
            };
            print_result(output.format, output.quiet, &result);
            exit_codes::VALIDATION_FAILED
        }
        Err(e) => {
            e.report(&output);
            exit_codes::VALIDATION_FAILED
        }
    }
}
