use clap::Parser;
use color_eyre::{eyre::eyre, Result};
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::BufReader;
use tokio::sync::mpsc;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use cursor_integrate::config::{AppConfig, LoggingSettings};
use cursor_integrate::pipeline::PipelineHandle;
use cursor_integrate::replay::replay_reports;
use cursor_integrate::report::DeviceReport;

/// Replays tablet reports from stdin through the velocity integrator
#[derive(Parser, Debug)]
#[command(name = "cursor-integrate")]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (defaults to the user config directory)
    #[arg(short, long, env = "CURSOR_INTEGRATE_CONFIG")]
    config: Option<PathBuf>,

    /// Log filter, overrides the config file
    #[arg(long)]
    log_level: Option<String>,

    /// Delay between replayed reports in microseconds, 0 replays as fast as possible
    #[arg(long, default_value_t = 5000)]
    report_interval_us: u64,

    /// Write a default configuration file and exit
    #[arg(long)]
    write_default_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config_path = args.config.clone().unwrap_or_else(AppConfig::default_path);

    if args.write_default_config {
        let created = AppConfig::ensure_default(&config_path).await?;
        if created {
            println!("Wrote default configuration to {}", config_path.display());
        } else {
            println!("Configuration already exists at {}", config_path.display());
        }
        return Ok(());
    }

    let config = AppConfig::load_or_default(&config_path).await?;
    setup(&config.logging, args.log_level.as_deref())?;
    debug!("Config: {:?}", config);

    let capacity = config.pipeline.channel_capacity;
    let (report_sender, report_receiver) = mpsc::channel(capacity);
    let (output_sender, mut output_receiver) = mpsc::channel::<DeviceReport>(capacity);

    let pipeline = PipelineHandle::spawn(
        config.pipeline.clone(),
        config.filter.clone(),
        report_receiver,
        output_sender,
    );

    let printer = tokio::spawn(async move {
        while let Some(report) = output_receiver.recv().await {
            println!("{}", report);
        }
        debug!("Output channel closed");
    });

    let stdin = BufReader::new(tokio::io::stdin());
    let interval = Duration::from_micros(args.report_interval_us);

    let stats = tokio::select! {
        result = replay_reports(stdin, report_sender, interval) => {
            let sent = result?;
            info!("Input exhausted after {} reports, draining pipeline", sent);
            pipeline.join().await?
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted");
            pipeline.shutdown().await?
        }
    };
    info!(
        "Consumed {} reports, emitted {}, report interval {:.2}ms",
        stats.consumed, stats.emitted, stats.report_interval_avg_ms
    );

    printer
        .await
        .map_err(|e| eyre!("Output task failed: {}", e))?;
    Ok(())
}

fn setup(logging: &LoggingSettings, level_override: Option<&str>) -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;

    let filter = match level_override {
        Some(level) => EnvFilter::try_new(level)?,
        None => EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&logging.level))?,
    };

    // stdout carries the emitted reports
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(logging.with_thread_ids)
        .with_file(true)
        .with_line_number(true)
        .init();
    Ok(())
}
