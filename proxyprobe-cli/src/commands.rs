use clap::Subcommand;

use crate::args::*;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Probe the target through the proxy and report statistics.
    Run {
        #[command(flatten)]
        params: ParamsArgs,
        #[command(flatten)]
        endpoint: EndpointArgs,
        #[command(flatten)]
        retry: RetryArgs,
        #[arg(long, value_enum, default_value_t = EventsMode::None)]
        events: EventsMode,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Resolve and validate run parameters without probing.
    Validate {
        #[command(flatten)]
        params: ParamsArgs,
        #[command(flatten)]
        endpoint: EndpointArgs,
        #[command(flatten)]
        retry: RetryArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
}
