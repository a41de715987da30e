//! Action enum — one line of console input.

/// All actions a user can type at the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    // ── Playback ─────────────────────────────────────────────────────────────
    Play(usize), // play station by 1-based number
    Stop,
    Pause,
    Mute,
    VolumeUp,
    VolumeDown,

    // ── Misc ─────────────────────────────────────────────────────────────────
    List,
    Help,
    Quit,
    Nothing,
    Unknown(String),
}

impl Action {
    pub fn parse(line: &str) -> Self {
        let input = line.trim();
        if input.is_empty() {
            return Self::Nothing;
        }
        if let Ok(n) = input.parse::<usize>() {
            return Self::Play(n);
        }
        match input {
            "p" => Self::Pause,
            "m" => Self::Mute,
            "+" | "*" => Self::VolumeUp,
            "-" | "/" => Self::VolumeDown,
            "s" => Self::Stop,
            "l" => Self::List,
            "h" | "?" => Self::Help,
            "q" => Self::Quit,
            other => Self::Unknown(other.to_string()),
        }
    }
}

pub const HELP: &str = "\
  <n>  play station n      p  pause
  m    mute                +  volume up
  -    volume down         s  stop
  l    list stations       q  quit";
