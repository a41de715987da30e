//! Line-oriented remote control around a `PlayerController`.
//!
//! stdin lines become `Action`s; titles from the status reader are printed
//! as they arrive.

use radio_player::stations::Station;
use radio_player::{Backend, PlayerController};
use rand::Rng;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::action::{Action, HELP};

pub fn print_stations(stations: &[Station]) {
    for (i, station) in stations.iter().enumerate() {
        println!("{:>3}. {}", i + 1, station.name);
    }
}

/// Resolve `--play`: `Some(n)` is 1-based, `None` picks at random.
pub fn pick_station(stations: &[Station], choice: Option<usize>) -> Option<usize> {
    if stations.is_empty() {
        return None;
    }
    match choice {
        Some(n) if (1..=stations.len()).contains(&n) => Some(n - 1),
        Some(_) => None,
        None => Some(rand::thread_rng().gen_range(0..stations.len())),
    }
}

pub async fn run(
    backend: Backend,
    stations: Vec<Station>,
    autoplay: Option<Option<usize>>,
) -> anyhow::Result<()> {
    let (title_tx, mut title_rx) = mpsc::unbounded_channel::<String>();
    let mut player = PlayerController::new(backend, Arc::new(title_tx));

    print_stations(&stations);
    println!("{HELP}");

    if let Some(choice) = autoplay {
        match pick_station(&stations, choice) {
            Some(idx) => play(&mut player, &stations, idx).await,
            None => println!("No such station"),
        }
    }

    let mut input = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = input.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                match Action::parse(&line) {
                    Action::Play(n) => match pick_station(&stations, Some(n)) {
                        Some(idx) => play(&mut player, &stations, idx).await,
                        None => println!("No station {n}"),
                    },
                    Action::Stop => player.close().await,
                    Action::Pause => player.pause().await,
                    Action::Mute => player.mute().await,
                    Action::VolumeUp => player.volume_up().await,
                    Action::VolumeDown => player.volume_down().await,
                    Action::List => print_stations(&stations),
                    Action::Help => println!("{HELP}"),
                    Action::Quit => break,
                    Action::Nothing => {}
                    Action::Unknown(s) => println!("Unknown command {s:?} (h for help)"),
                }
            }
            Some(title) = title_rx.recv() => {
                println!("Now playing: {title}");
            }
        }
    }

    player.close().await;
    Ok(())
}

async fn play(player: &mut PlayerController, stations: &[Station], idx: usize) {
    let station = &stations[idx];
    println!("Playing {}", station.name);
    info!("console: playing {:?} ({})", station.name, station.url);
    // A spawn failure ends this attempt only; the prompt stays usable.
    if let Err(e) = player.play(&station.url).await {
        warn!("console: {}", e);
        println!("Error: {e}");
    }
}
