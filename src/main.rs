use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use log::info;

mod accessory;
mod api;
mod config;
mod error;
mod geo;
mod identity;
mod models;
mod poller;

#[derive(Parser)]
#[command(name = "tado-presence")]
#[command(about = "Home/away switch for tado, backed by a fake mobile device")]
struct Cli {
    /// Configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the current presence reported by tado
    Status,
    /// Move the fake device home
    Home,
    /// Move the fake device away
    Away,
    /// Poll presence every `interval` seconds until Ctrl-C
    Watch,
    /// Print the accessory information
    Info,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let cli = Cli::parse();

    let config_contents = std::fs::read_to_string(&cli.config)
        .with_context(|| format!("reading {}", cli.config.display()))?;
    let config: config::AppConfig = toml::de::from_str(&config_contents)
        .with_context(|| format!("parsing {}", cli.config.display()))?;

    info!("Starting '{}'", config.name());

    let client = api::HttpClient::new(config.credentials()).context("building HTTP client")?;
    let mut accessory = accessory::PresenceAccessory::new(client, config.home(), config.device());

    match cli.command {
        Commands::Status => {
            let is_home = accessory.get_presence().await?;
            println!("{}", if is_home { "home" } else { "away" });
        }
        Commands::Home | Commands::Away => {
            let is_home = matches!(cli.command, Commands::Home);
            let outcome = accessory.set_presence(is_home).await?;
            if let Some(settings) = outcome.settings {
                println!("fake device settings {:?}", settings);
            }
            println!(
                "{}: geolocation fix {:?}, presence {:?}",
                if is_home { "home" } else { "away" },
                outcome.fix,
                outcome.presence
            );
        }
        Commands::Watch => {
            let interval = Duration::from_secs(config.interval_seconds());
            info!("Polling presence every {:?}", interval);
            poller::Poller::new(accessory, interval).run().await;
        }
        Commands::Info => {
            let info = accessory.info();
            println!("Name: {}", config.name());
            println!("Manufacturer: {}", info.manufacturer);
            println!("Model: {}", info.model);
            println!("Serial: {}", info.serial_number);
        }
    }

    Ok(())
}
