//! Supervision of external stream players (mplayer, mpv, cvlc).
//!
//! ```text
//!   probe(backends) ──► Backend
//!                          │
//!   PlayerController::new(backend, sink)
//!         │
//!         ├── play(url)    spawn process, start status reader
//!         ├── pause/mute/volume_*   keystrokes → process stdin
//!         └── close()      stop command, SIGTERM, reap, join reader
//! ```

pub mod backend;
pub mod config;
pub mod controller;
pub mod error;
pub mod platform;
pub mod probe;
pub mod sink;
pub mod stations;
pub mod status;

pub use backend::{Backend, BackendKind, PlayerCommand};
pub use controller::PlayerController;
pub use error::PlayerError;
pub use probe::probe;
pub use sink::{NullSink, OutputSink};
