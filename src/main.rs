use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use drivewatch::application::config::AppConfig;
use drivewatch::application::services::collection::CollectionService;
use drivewatch::domain::ports::publisher::RecordPublisher;
use drivewatch::infrastructure::os::system_runner::SystemCommandRunner;
use drivewatch::infrastructure::probes::host::{local_hostname, HostProbe};
use drivewatch::infrastructure::publish::elasticsearch::ElasticsearchPublisher;
use drivewatch::presentation::cli::app::{Cli, Commands};
use drivewatch::presentation::cli::commands::disks::run_disks;
use drivewatch::presentation::cli::commands::system::run_system;

fn setup_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn build_publisher(
    config: &AppConfig,
    wanted: bool,
) -> anyhow::Result<Option<ElasticsearchPublisher>> {
    if wanted {
        let publisher = ElasticsearchPublisher::new(
            &config.publisher.endpoint,
            config.publisher.disk_index.clone(),
            config.publisher.system_index.clone(),
            Duration::from_secs(config.publisher.timeout_secs),
        )?;
        Ok(Some(publisher))
    } else {
        Ok(None)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_tracing(cli.verbose);

    // Load configuration
    let config = if let Some(ref path) = cli.config {
        AppConfig::load_from(path)?
    } else {
        AppConfig::load()?
    };

    let hostname = config
        .general
        .hostname
        .clone()
        .unwrap_or_else(local_hostname);

    // Manual DI — main.rs is the only place that knows concrete types
    let runner =
        SystemCommandRunner::new(Duration::from_secs(config.collector.command_timeout_secs));

    match cli.command.unwrap_or(Commands::Disks {
        publish: false,
        json: false,
    }) {
        Commands::Disks { publish, json } => {
            let service = CollectionService::new(
                &runner,
                config.collector.sudo_command.clone(),
                hostname,
            );
            let publisher = build_publisher(&config, publish)?;
            run_disks(
                &service,
                publisher.as_ref().map(|p| p as &dyn RecordPublisher),
                json,
            )?;
        }
        Commands::System { publish, json } => {
            let probe = HostProbe::new();
            let publisher = build_publisher(&config, publish)?;
            run_system(
                &probe,
                &hostname,
                publisher.as_ref().map(|p| p as &dyn RecordPublisher),
                json,
            )?;
        }
    }

    Ok(())
}
