//! consentkit — applies a saved cookie-consent decision at startup and lets
//! an operator inspect or change it.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use consentkit_core::ConsentConfig;
use consentkit_protocol::{
    Category, CategorySet, ConsentManager, ConsentRecord, ConsentState, ConsentStore,
    LoggingIntegrations,
};
use consentkit_store::FileCookieJar;

#[derive(Parser)]
#[command(name = "consentkit")]
#[command(about = "Cookie consent store: inspect, decide, reset", long_about = None)]
struct Cli {
    /// Cookie jar file (default: $CONSENTKIT_DATA_DIR/cookies.json)
    #[arg(long, global = true)]
    jar: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the saved decision
    Status,
    /// List cookie categories
    Categories,
    /// Grant every category
    AcceptAll,
    /// Grant only essential cookies
    RejectAll,
    /// Save a custom decision; unlisted categories are denied
    Save {
        #[arg(long)]
        functional: bool,
        #[arg(long)]
        analytics: bool,
        #[arg(long)]
        performance: bool,
        #[arg(long)]
        advertising: bool,
    },
    /// Revoke the saved decision
    Reset,
    /// Decode a raw cookie value
    Decode { value: String },
}

fn resolve_data_dir() -> PathBuf {
    std::env::var("CONSENTKIT_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data"))
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = ConsentConfig::from_env().context("loading consent configuration")?;
    let jar_path = cli
        .jar
        .unwrap_or_else(|| resolve_data_dir().join("cookies.json"));

    let jar = Arc::new(FileCookieJar::open(&jar_path));
    let integrations = Arc::new(LoggingIntegrations::new(config.analytics_measurement_id.clone()));
    let store = ConsentStore::new(jar, integrations).with_config(config);
    let manager = ConsentManager::new(store);

    info!("consentkit using jar {}", jar_path.display());
    manager.initialize();

    let output = run(cli.command, &manager)?;
    println!("{output}");
    Ok(())
}

fn run(command: Command, manager: &ConsentManager) -> anyhow::Result<String> {
    let output = match command {
        Command::Status => match manager.state() {
            ConsentState::Undecided => "undecided".to_string(),
            ConsentState::Decided(record) => describe(&record)?,
        },
        Command::Categories => Category::all()
            .iter()
            .map(|c| {
                format!(
                    "{:<12} {:<20} {}",
                    c.key(),
                    c.title(),
                    if c.required() { "required" } else { "optional" }
                )
            })
            .collect::<Vec<_>>()
            .join("\n"),
        Command::AcceptAll => describe(&manager.accept_all())?,
        Command::RejectAll => describe(&manager.reject_all())?,
        Command::Save {
            functional,
            analytics,
            performance,
            advertising,
        } => {
            let prefs = CategorySet::new(functional, analytics, performance, advertising);
            describe(&manager.save_custom(prefs))?
        }
        Command::Reset => {
            manager.reset();
            "undecided".to_string()
        }
        Command::Decode { value } => match ConsentRecord::decode(value.trim()) {
            Ok(record) => describe(&record)?,
            Err(e) => format!("absent ({e})"),
        },
    };
    Ok(output)
}

fn describe(record: &ConsentRecord) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(record)?)
}
