use std::{
    path::PathBuf,
    sync::Arc,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use cd_metrics_core::{DispatchOutcome, Metrics};
use clap::Parser;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use crate::{
    cache::{get_client_id_path, get_root_cache_dir, load_or_create_client_id},
    config::{
        FileConfig, LOG_ENV, PROPERTY_ENV, load_config, resolve_endpoint, resolve_property_id,
        with_host_defaults,
    },
    sink::CliSink,
};

mod cache;
mod config;
mod sink;

fn format_duration(d: Duration) -> String {
    let millis = d.as_secs_f64() * 1000.0;
    if millis < 1000.0 {
        format!("{:.0}ms", millis)
    } else {
        format!("{:.1}s", millis / 1000.0)
    }
}

#[derive(Parser)]
#[command(name = "cd-metrics")]
#[command(about = "Record a single event with the cd-metrics client")]
struct Cli {
    /// Event category (e.g., "eng", "user")
    category: String,

    /// Action that triggered the event (e.g., "open-app")
    action: String,

    /// Event label (e.g., "memory")
    label: String,

    /// Event value. Integer unless --floating is set.
    #[arg(allow_negative_numbers = true)]
    value: String,

    /// Send the value as a floating point measurement
    #[arg(short, long)]
    floating: bool,

    /// Client id. Defaults to an id generated once and cached on disk.
    #[arg(long)]
    client_id: Option<String>,

    /// Client id for this event only
    #[arg(long)]
    override_client_id: Option<String>,

    /// Analytics property id
    #[arg(short, long, env = PROPERTY_ENV)]
    property: Option<String>,

    /// Collection endpoint
    #[arg(short, long)]
    endpoint: Option<String>,

    /// JSON config file with `analytics`, `endpoint` and `client` keys
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Dispatch through the deferred path
    #[arg(short, long)]
    deferred: bool,

    /// Attach a UTC timestamp dimension
    #[arg(short, long)]
    stamp: bool,

    /// Route client log lines to tracing instead of the terminal
    #[arg(short, long)]
    trace: bool,
}

fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    let file_config = match &cli.config {
        Some(path) => load_config(path).await?,
        None => FileConfig::default(),
    };

    let client_id = match cli.client_id.clone() {
        Some(id) => id,
        None => load_or_create_client_id(&get_client_id_path(&get_root_cache_dir())).await?,
    };
    let property_id = resolve_property_id(cli.property.clone(), &file_config);
    let endpoint = resolve_endpoint(cli.endpoint.clone(), &file_config);
    let options = with_host_defaults(file_config.client);

    println!(
        "\n{}  {}\n",
        style("cd-metrics").cyan().bold(),
        style(format!("{} → {}", property_id, endpoint)).dim()
    );

    let spinner = create_spinner("Recording event...");
    let (sink, mut done_rx) = CliSink::new(spinner.clone(), cli.trace);

    let metrics = Metrics::builder(client_id)
        .options(options)
        .property_id(property_id)
        .endpoint(endpoint)
        .logger(Arc::new(sink))
        .stamp_events(cli.stamp)
        .build();

    let start = Instant::now();
    let override_id = cli.override_client_id.as_deref();

    match (cli.floating, cli.deferred) {
        (true, deferred) => {
            let value: f64 = cli
                .value
                .parse()
                .with_context(|| format!("invalid floating point value {:?}", cli.value))?;
            if deferred {
                metrics.record_floating_point_event_async(
                    &cli.category,
                    &cli.action,
                    &cli.label,
                    value,
                    override_id,
                );
            } else {
                metrics
                    .record_floating_point_event(
                        &cli.category,
                        &cli.action,
                        &cli.label,
                        value,
                        override_id,
                    )
                    .await;
            }
        }
        (false, deferred) => {
            let value: i64 = cli.value.parse().with_context(|| {
                format!(
                    "invalid integer value {:?} (use --floating for measurements)",
                    cli.value
                )
            })?;
            if deferred {
                metrics.record_event_async(
                    &cli.category,
                    &cli.action,
                    &cli.label,
                    value,
                    override_id,
                );
            } else {
                metrics
                    .record_event(&cli.category, &cli.action, &cli.label, value, override_id)
                    .await;
            }
        }
    }

    let outcome = done_rx
        .recv()
        .await
        .context("client finished without reporting an outcome")?;
    let elapsed = style(format!("[{}]", format_duration(start.elapsed()))).dim();

    match outcome {
        DispatchOutcome::Succeeded { status } => {
            spinner.finish_with_message(format!(
                "{} Event recorded (status {}) {}",
                style("✓").green().bold(),
                status,
                elapsed
            ));
            Ok(())
        }
        DispatchOutcome::Failed(err) => {
            spinner.finish_with_message(format!(
                "{} {} {}",
                style("✗").red().bold(),
                style(&err).red(),
                elapsed
            ));
            tracing::debug!(category = err.category(), "event was not recorded");
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_a_deferred_floating_event() {
        let cli = Cli::try_parse_from([
            "cd-metrics",
            "eng",
            "measure",
            "memory",
            "999999.9",
            "--floating",
            "--deferred",
            "--override-client-id",
            "abc",
        ])
        .unwrap();

        assert!(cli.floating);
        assert!(cli.deferred);
        assert_eq!(cli.value, "999999.9");
        assert_eq!(cli.override_client_id.as_deref(), Some("abc"));
        assert_eq!(cli.client_id, None);
    }

    #[test]
    fn short_durations_render_in_millis() {
        assert_eq!(format_duration(Duration::from_millis(42)), "42ms");
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.5s");
    }
}
