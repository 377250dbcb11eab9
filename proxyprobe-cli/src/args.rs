use std::path::PathBuf;

use clap::Args;

use crate::output::OutputFormat;

#[derive(Debug, Args, Clone)]
pub struct OutputArgs {
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

/// Run parameters. Unset flags fall back to the config file.
#[derive(Debug, Args, Clone, Default)]
pub struct ParamsArgs {
    /// JSON or YAML file with run parameters and endpoint settings.
    #[arg(long)]
    pub config: Option<PathBuf>,
    #[arg(long = "target", value_name = "URL")]
    pub target_url: Option<String>,
    #[arg(long = "proxy", value_name = "URL")]
    pub proxy_url: Option<String>,
    #[arg(long = "count", value_name = "N")]
    pub test_count: Option<usize>,
    #[arg(long, value_name = "N")]
    pub concurrency: Option<usize>,
}

#[derive(Debug, Args, Clone, Default)]
pub struct EndpointArgs {
    /// Test endpoint URL; overrides PROXYPROBE_ENDPOINT.
    #[arg(long, value_name = "URL")]
    pub endpoint: Option<String>,
    /// Per-attempt timeout in milliseconds.
    #[arg(long, value_name = "MS")]
    pub timeout: Option<u64>,
}

#[derive(Debug, Args, Clone, Default)]
pub struct RetryArgs {
    #[arg(long, value_name = "N")]
    pub retries: Option<u32>,
    #[arg(long, value_name = "MS")]
    pub retry_base_delay: Option<u64>,
    #[arg(long, value_name = "MS")]
    pub retry_max_delay: Option<u64>,
    #[arg(long, value_name = "none|full")]
    pub retry_jitter: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum EventsMode {
    #[default]
    None,
    /// One JSON event per line on stdout.
    Stdout,
    /// Events as tracing records on stderr.
    Log,
}
