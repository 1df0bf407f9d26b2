use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tokio::sync::watch;
use tracing::Level;

use epd_tabletd::config::Cli;
use epd_tabletd::input_devices::{Digitizer, I2cTransport};
use epd_tabletd::runtime;
use epd_tabletd::screen_overlay::{SolidBrush, TracingRefresh};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    match daemon(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn daemon(cli: &Cli) -> anyhow::Result<()> {
    let cfg = cli.resolve()?;
    tracing::debug!(?cfg);

    let path = cfg.i2c_device_path();
    let transport = I2cTransport::open(&path, cfg.i2c_address)
        .with_context(|| format!("opening digitizer on {}", path.display()))?;
    tracing::info!(
        "digitizer on {} at address {:#04x}",
        path.display(),
        transport.address()
    );
    let mut digitizer = Digitizer::new(transport);
    let features = digitizer
        .query_features()
        .context("querying digitizer features")?;

    let (stop, shutdown) = watch::channel(false);
    tokio::spawn(async move {
        wait_for_signal().await;
        tracing::info!("stopping");
        let _ = stop.send(true);
    });

    let stats = runtime::run(
        digitizer,
        features,
        cfg,
        SolidBrush,
        TracingRefresh::new(),
        shutdown,
    )
    .await?;
    tracing::info!(
        "painted {} samples, {} refreshes, {} transport and {} decode errors",
        stats.sampler.painted,
        stats.refreshes,
        stats.sampler.transport_errors,
        stats.sampler.decode_errors
    );
    Ok(())
}

async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    let mut term = match signal(SignalKind::terminate()) {
        Ok(term) => term,
        Err(e) => {
            tracing::warn!("cannot listen for SIGTERM: {e}");
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = term.recv() => {}
    }
}
