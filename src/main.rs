use anyhow::Result;
use clap::Parser;
use hwsnap::{cli::Cli, commands::SystemRunner, snapshot};
use std::io::{self, BufWriter};
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

fn main() -> Result<()> {
    let args = Cli::parse();

    init_tracing(args.debug);

    let config = args.to_config();
    let stdout = io::stdout();
    snapshot::run(&config, &SystemRunner::new(), BufWriter::new(stdout.lock()))?;
    Ok(())
}
