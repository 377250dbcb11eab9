use clap::Parser;
use tracing_subscriber::EnvFilter;

mod args;
mod cmd;
mod commands;
mod exit_codes;
mod output;
mod utils;

pub use args::*;
use commands::Command;

const DEFAULT_LOG_DIRECTIVE: &str = "proxyprobe=warn";

#[derive(Debug, Parser)]
#[command(name = "proxyprobe", version, about = "Concurrent proxy probe runner")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(&cli.command);

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("error: failed to create tokio runtime: {e}");
            std::process::exit(exit_codes::RUNTIME_ERROR);
        }
    };

    let exit_code = rt.block_on(run_command(cli.command));
    std::process::exit(exit_code);
}

fn init_tracing(command: &Command) {
    let default_directive = match command {
        Command::Run {
            events: EventsMode::Log,
            ..
        } => "proxyprobe=info",
        _ => DEFAULT_LOG_DIRECTIVE,
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run_command(command: Command) -> i32 {
    match command {
        Command::Run {
            params,
            endpoint,
            retry,
            events,
            output,
        } => cmd::run::run_cmd(params, endpoint, retry, events, output).await,
        Command::Validate {
            params,
            endpoint,
            retry,
            output,
        } => cmd::validate::validate_cmd(params, endpoint, retry, output).await,
    }
}
