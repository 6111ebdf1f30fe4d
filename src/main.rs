use anyhow::Result;
use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use nss_tools::cli::{Command, RootArgs};
use nss_tools::{checklist, console, release, workflow};

fn main() {
    init_tracing();
    let args = RootArgs::parse();
    if let Err(err) = run(args) {
        console::die(&format!("{err:#}"));
        std::process::exit(1);
    }
}

fn run(args: RootArgs) -> Result<()> {
    match args.command {
        Command::Land(args) => workflow::run_land(args),
        Command::ReleaseNotes(args) => release::run_release_notes(args),
        Command::Review(args) => checklist::run_review(args),
    }
}

/// `RUST_LOG` controls diagnostics; operator output is unconditional and
/// stays on stdout, so diagnostics go to stderr.
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init()
        .ok();
}
