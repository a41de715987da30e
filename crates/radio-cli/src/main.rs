mod action;
mod console;

use anyhow::Context;
use clap::Parser;
use radio_player::config::Config;
use radio_player::stations::{self, Station};
use radio_player::{platform, BackendKind};
use std::io::Write;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser, Debug)]
#[command(name = "radio")]
#[command(about = "Console radio player")]
struct Cli {
    /// Path to the stations TOML file.
    #[arg(short, long)]
    stations: Option<PathBuf>,
    /// Start and play.  The value is a station number, or empty for random.
    #[arg(short, long)]
    play: Option<Option<usize>>,
    /// Add a station to the list.
    #[arg(short, long)]
    add: bool,
    /// List the stations and exit.
    #[arg(short, long)]
    list: bool,
    /// Start in debug mode (verbose log file).
    #[arg(short, long)]
    debug: bool,
    /// Only try this player (mplayer, mpv or vlc).
    #[arg(long)]
    player: Option<BackendKind>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_path = platform::log_path();
    if let Some(dir) = log_path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    // Allow RUST_LOG override; --debug turns on lifecycle logging for our crates.
    let default_filter = if cli.debug {
        "info,radio_player=debug,radio=debug"
    } else {
        "warn"
    };
    let log_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.to_string());
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(log_filter.as_str())
        .with_ansi(false)
        .init();

    if cli.debug {
        eprintln!("radio log: {}", log_path.display());
    }
    tracing::info!("radio starting…");

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("config: {:#}, using defaults", e);
            Config::default()
        }
    };
    let stations_path = cli
        .stations
        .clone()
        .unwrap_or_else(|| config.stations.stations_toml.clone());

    if cli.stations.is_none() {
        stations::ensure_station_file(&stations_path)?;
    }

    if cli.add {
        let station = prompt_station().await?;
        stations::append_station(&stations_path, station)?;
        return Ok(());
    }

    let stations = stations::load_stations(&stations_path)
        .with_context(|| format!("failed to read stations from {}", stations_path.display()))?;

    if cli.list {
        for station in &stations {
            println!("{:50} {}", station.name, station.url);
        }
        return Ok(());
    }

    let backends = match cli.player {
        Some(kind) => vec![config.player.backend(kind)],
        None => config.player.backends(),
    };
    let backend = radio_player::probe(&backends)
        .await
        .context("cannot start playback")?;

    console::run(backend, stations, cli.play).await
}

async fn prompt_station() -> anyhow::Result<Station> {
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    ask("name")?;
    let name = input.next_line().await?.unwrap_or_default();
    ask("url")?;
    let url = input.next_line().await?.unwrap_or_default();

    let station = Station {
        name: name.trim().to_string(),
        url: url.trim().to_string(),
    };
    anyhow::ensure!(!station.url.is_empty(), "a station needs a url");
    Ok(station)
}

fn ask(label: &str) -> std::io::Result<()> {
    print!("Enter the {label}: ");
    std::io::stdout().flush()
}
