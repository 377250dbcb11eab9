use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

pub fn print_result<T: Serialize>(format: OutputFormat, quiet: bool, result: &T) {
    if quiet {
        return;
    }
    match format {
        OutputFormat::Text => {
            if let Ok(json) = serde_json::to_string_pretty(result) {
                println!("{json}");
            }
        }
        OutputFormat::Json => {
            if let Ok(json) = serde_json::to_string(result) {
                println!("{json}");
            }
        }
    }
}

pub fn print_error(format: OutputFormat, quiet: bool, message: &str) {
    if quiet {
        return;
    }
    match format {
        OutputFormat::Text => eprintln!("error: {message}"),
        OutputFormat::Json => {
            let err = serde_json::json!({"error": message});
            eprintln!("{}", serde_json::to_string(&err).unwrap_or_default());
        }
    }
}

pub fn print_violations(format: OutputFormat, quiet: bool, violations: &[String]) {
    if quiet {
        return;
    }
    match format {
        OutputFormat::Text => {
            eprintln!("error: invalid run parameters");
            for v in violations {
                eprintln!("- {v}");
            }
        }
        OutputFormat::Json => {
            let err = serde_json::json!({"error": "invalid run parameters", "violations": violations});
            eprintln!("{}", serde_json::to_string(&err).unwrap_or_default());
        }
    }
}
