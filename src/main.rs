//! fpsutil: very basic network IO counters.
//!
//! Samples network counters for all interfaces once per second and writes
//! the per-second deltas to `netstats<YYYYMMDDThhmmss>.csv` until
//! interrupted. SIGINT or SIGTERM flushes buffered rows before exiting.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use fpsutil::cli::Cli;
use fpsutil::config::Config;
use fpsutil::logging;
use fpsutil::output;
use fpsutil::sampler::{run_sampler, Sampler, SAMPLE_INTERVAL};
use fpsutil::shutdown::ShutdownSignal;
use fpsutil::system::default_source;
use fpsutil::writer::{row_queue, spawn_writer, QUEUE_CAPACITY};

fn main() {
    let cli = Cli::parse();

    let result = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("starting async runtime")
        .and_then(|rt| rt.block_on(run(cli)));

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref()).context("loading configuration")?;
    logging::init_tracing(cli.verbose, &config)?;

    if let Some(banner) = config.banner() {
        eprintln!("{banner}");
    }
    if cli.toggle {
        debug!("--toggle has no effect");
    }

    let mut signals = ShutdownSignal::install().context("installing signal handlers")?;

    let (path, file) =
        output::create_output(Path::new("."), &Local::now()).context("creating output file")?;

    let (tx, rx) = row_queue(QUEUE_CAPACITY);
    let writer = spawn_writer(rx, file);
    let sampler = Sampler::new(default_source());

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        let name = signals.recv().await;
        info!(signal = name, "shutting down");
        on_signal.cancel();
    });

    let sampled = run_sampler(sampler, tx, SAMPLE_INTERVAL, cancel).await;

    let summary = writer
        .await
        .context("writer task failed")?
        .with_context(|| format!("flushing {}", path.display()))?;
    info!(
        rows = summary.rows,
        flushes = summary.flushes,
        bytes = summary.bytes,
        path = %path.display(),
        "output closed"
    );

    sampled?;
    Ok(())
}
