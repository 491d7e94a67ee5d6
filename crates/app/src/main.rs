use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use dioxus::LaunchBuilder;
use dioxus::desktop::{Config as DesktopConfig, WindowBuilder};
use qbank_core::model::Level;
use services::config::{DEFAULT_API_URL, DEFAULT_TIMEOUT_SECS};
use services::{AppServices, BackendConfig, Clock, ConfigError, NoopObserver};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use ui::{App, build_app_context};

const DEFAULT_LOG_FILTER: &str = "app=info,services=info,ui=info";

/// Desktop client for the question bank.
#[derive(Parser, Debug)]
#[command(name = "qbank")]
#[command(version)]
struct Args {
    /// Base URL of the question bank backend
    #[arg(long, default_value = DEFAULT_API_URL, env = "QBANK_API_URL")]
    api_url: String,

    /// Seconds a single backend request may take
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS, env = "QBANK_REQUEST_TIMEOUT_SECS")]
    timeout_secs: u64,

    /// Log filter, e.g. `services=debug`; overrides RUST_LOG
    #[arg(long)]
    log: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Open the desktop window (default)
    Ui,
    /// Load the subject list once and print it
    Check,
}

fn init_tracing(directive: Option<&str>) {
    let filter = match directive {
        Some(directive) => EnvFilter::new(directive),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn check(services: &AppServices) -> Result<(), Box<dyn std::error::Error>> {
    let controller = services.filter_controller(Arc::new(NoopObserver));
    controller.load_roots().await.map_err(|err| err.message())?;
    let subjects = controller.available_options(Level::Subject);
    tracing::info!(count = subjects.len(), "backend reachable");
    for subject in subjects.iter() {
        println!("{subject}");
    }
    Ok(())
}

fn launch_ui(services: AppServices) {
    let context = build_app_context(Arc::new(services));

    // Some dev setups default to an always-on-top window.
    let desktop_cfg = DesktopConfig::new().with_window(
        WindowBuilder::new()
            .with_title("Question Bank")
            .with_always_on_top(false),
    );

    LaunchBuilder::desktop()
        .with_cfg(desktop_cfg)
        .with_context(context)
        .launch(App);
}

fn backend_config(args: &Args) -> Result<BackendConfig, ConfigError> {
    BackendConfig::new(&args.api_url, Duration::from_secs(args.timeout_secs))
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = backend_config(&args)?;
    let services = AppServices::new(config, Clock::default_clock())?;

    match args.command.unwrap_or(Command::Ui) {
        Command::Ui => {
            launch_ui(services);
            Ok(())
        }
        Command::Check => check(&services).await,
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_tracing(args.log.as_deref());

    if let Err(err) = run(args).await {
        tracing::error!(error = %err, "startup failed");
        eprintln!("{err}");
        std::process::exit(2);
    }
}
