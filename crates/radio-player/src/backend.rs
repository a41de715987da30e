use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

// ── backend kinds ─────────────────────────────────────────────────────────────

/// The supported external players.  Each kind fixes its executable name,
/// start arguments, command vocabulary and "now playing" line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    MPlayer,
    Mpv,
    Vlc,
}

/// Playback control requests understood by every backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerCommand {
    Pause,
    Stop,
    Mute,
    VolumeUp,
    VolumeDown,
}

/// Prefix and regex used to pull a track title out of a status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TitleFormat {
    pub prefix: &'static str,
    pub pattern: &'static str,
}

impl BackendKind {
    /// Default probe order.
    pub const ALL: [BackendKind; 3] = [BackendKind::MPlayer, BackendKind::Mpv, BackendKind::Vlc];

    pub fn executable(self) -> &'static str {
        match self {
            Self::MPlayer => "mplayer",
            Self::Mpv => "mpv",
            Self::Vlc => "cvlc",
        }
    }

    /// Harmless flag used when probing for the executable.
    pub fn probe_arg(self) -> &'static str {
        "--help"
    }

    /// Arguments for starting `url`.  VLC has no separate playlist form.
    pub fn start_args(self, url: &str, playlist: bool) -> Vec<String> {
        let flags: &[&str] = match (self, playlist) {
            (Self::MPlayer, false) => &["-quiet"],
            (Self::MPlayer, true) => &["-quiet", "-playlist"],
            (Self::Mpv, false) => &["--quiet"],
            (Self::Mpv, true) => &["--quiet", "--playlist"],
            (Self::Vlc, _) => &["-Irc", "--quiet"],
        };
        flags
            .iter()
            .map(|f| f.to_string())
            .chain(std::iter::once(url.to_string()))
            .collect()
    }

    /// Token written to stdin for `cmd`.  `muted` is only consulted by VLC,
    /// whose mute is a toggle between two absolute volume commands.
    pub fn command(self, cmd: PlayerCommand, muted: bool) -> &'static str {
        match self {
            Self::MPlayer => match cmd {
                PlayerCommand::Pause => "p",
                PlayerCommand::Stop => "q",
                PlayerCommand::Mute => "m",
                PlayerCommand::VolumeUp => "*",
                PlayerCommand::VolumeDown => "/",
            },
            Self::Mpv => match cmd {
                PlayerCommand::Pause => "p",
                PlayerCommand::Stop => "q",
                PlayerCommand::Mute => "m",
                PlayerCommand::VolumeUp => "0",
                PlayerCommand::VolumeDown => "9",
            },
            Self::Vlc => match cmd {
                PlayerCommand::Pause => "stop\n",
                PlayerCommand::Stop => "shutdown\n",
                PlayerCommand::Mute if muted => "volume 256\n",
                PlayerCommand::Mute => "volume 0\n",
                PlayerCommand::VolumeUp => "volup\n",
                PlayerCommand::VolumeDown => "voldown\n",
            },
        }
    }

    /// Whether `cmd` flips the session's mute flag.
    pub fn toggles_mute(self, cmd: PlayerCommand) -> bool {
        self == Self::Vlc && cmd == PlayerCommand::Mute
    }

    /// `None` for VLC: its rc interface prints nothing we can parse a title from.
    pub fn title_format(self) -> Option<TitleFormat> {
        match self {
            Self::MPlayer => Some(TitleFormat {
                prefix: "ICY Info:",
                pattern: r"^ICY Info: StreamTitle='([^']*)';",
            }),
            Self::Mpv => Some(TitleFormat {
                prefix: "icy-title:",
                pattern: r"^icy-title: (.*)",
            }),
            Self::Vlc => None,
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.executable())
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mplayer" => Ok(Self::MPlayer),
            "mpv" => Ok(Self::Mpv),
            "vlc" | "cvlc" => Ok(Self::Vlc),
            _ => Err(format!("unknown player {s:?} (expected mplayer, mpv or vlc)")),
        }
    }
}

// ── configured backend ────────────────────────────────────────────────────────

/// A backend kind bound to the program that runs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backend {
    pub kind: BackendKind,
    pub program: PathBuf,
    /// Inserted before the kind's own arguments.
    pub extra_args: Vec<String>,
}

impl Backend {
    pub fn new(kind: BackendKind) -> Self {
        Self {
            kind,
            program: PathBuf::from(kind.executable()),
            extra_args: Vec::new(),
        }
    }

    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_extra_args<I, A>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        self.extra_args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Full argument list (without the program) for playing `url`.
    pub fn play_args(&self, url: &str) -> Vec<String> {
        let mut args = self.extra_args.clone();
        args.extend(self.kind.start_args(url, is_playlist_url(url)));
        args
    }

    pub fn probe_args(&self) -> Vec<String> {
        let mut args = self.extra_args.clone();
        args.push(self.kind.probe_arg().to_string());
        args
    }
}

/// True when the last path segment of `url` (query string and fragment
/// ignored) has an `m3u` or `pls` extension.  The match is case-sensitive.
pub fn is_playlist_url(url: &str) -> bool {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let segment = path.rsplit('/').next().unwrap_or(path);
    match segment.rsplit_once('.') {
        Some((_, ext)) => ext == "m3u" || ext == "pls",
        None => false,
    }
}
