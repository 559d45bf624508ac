//! lsched CLI - basic-block instruction scheduler

mod cli;
mod commands;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

use cli::Cli;

fn main() {
    let cli = Cli::parse();

    // Initialize metric descriptions
    lsched::metrics::init();

    let default_level = if cli.verbose {
        "lsched=debug"
    } else if cli.silent {
        "lsched=error"
    } else {
        "lsched=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(default_level.parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_span_events(FmtSpan::CLOSE)
        .init();

    std::process::exit(commands::run_command(&cli));
}
