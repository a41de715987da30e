/// Player controller: one backend process at a time.
///
/// ```text
///   play(url) ── close() any previous session
///       │
///       ├── spawn  <program> [extra args] <kind args> <url>
///       │            stdin  ← keystroke commands (pause/mute/volume)
///       │            stdout ┐
///       │            stderr ┴→ one pipe → status reader task → OutputSink
///       │
///   close() ── stop command → SIGTERM to the process group → wait()
///              → join status reader
/// ```
///
/// Command failures never reach the caller of `pause()`/`mute()`/...;
/// they are logged.  `send_command()` exposes the underlying result.
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::{Child, ChildStdin, Command};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::backend::{Backend, PlayerCommand};
use crate::error::PlayerError;
use crate::sink::OutputSink;
use crate::status::{read_status, TitleMatcher};

/// How long a signalled process gets before it is killed outright.
const TERMINATE_GRACE: Duration = Duration::from_secs(3);
/// How long the status reader gets to notice EOF after the process is reaped.
const READER_JOIN_GRACE: Duration = Duration::from_secs(2);

// ── session ───────────────────────────────────────────────────────────────────

/// A running backend process and the task reading its output.
struct PlaybackSession {
    child: Child,
    stdin: Option<ChildStdin>,
    reader: JoinHandle<Result<(), PlayerError>>,
    /// VLC only: mute is sent as absolute volumes, so we track the state.
    muted: bool,
}

// ── controller ────────────────────────────────────────────────────────────────

pub struct PlayerController {
    backend: Backend,
    sink: Arc<dyn OutputSink>,
    session: Option<PlaybackSession>,
}

impl PlayerController {
    pub fn new(backend: Backend, sink: Arc<dyn OutputSink>) -> Self {
        Self {
            backend,
            sink,
            session: None,
        }
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    /// True while a session is bound.  Does not check whether the process
    /// is still alive.
    pub fn is_playing(&self) -> bool {
        self.session.is_some()
    }

    pub fn process_id(&self) -> Option<u32> {
        self.session.as_ref().and_then(|s| s.child.id())
    }

    /// Start playing `stream_url`, replacing any current session.
    pub async fn play(&mut self, stream_url: &str) -> Result<(), PlayerError> {
        self.close().await;

        let matcher = TitleMatcher::for_backend(self.backend.kind)?;
        let args = self.backend.play_args(stream_url);
        debug!("player: {} {:?}", self.backend.program.display(), args);

        let program = &self.backend.program;
        let spawn_failed = |source: std::io::Error| PlayerError::Spawn {
            program: program.clone(),
            source,
        };

        // stdout and stderr share one pipe so lines keep their write order.
        let (output, writer) = os_pipe::pipe().map_err(spawn_failed)?;
        let mut command = Command::new(program);
        command
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(writer.try_clone().map_err(spawn_failed)?)
            .stderr(writer)
            .kill_on_drop(true);
        // Own process group, so close() also reaches helpers the backend forks.
        #[cfg(unix)]
        command.process_group(0);
        let spawned = command.spawn();
        // The command holds our copies of the write end; EOF needs them closed.
        drop(command);
        let mut child = spawned.map_err(spawn_failed)?;

        let stdin = child.stdin.take();
        let output = match output_stream(output) {
            Ok(output) => output,
            Err(e) => {
                kill_group(&mut child);
                return Err(spawn_failed(e));
            }
        };
        let reader = tokio::spawn(read_status(output, matcher, Arc::clone(&self.sink)));

        info!(
            "player: started {} (pid {:?}) for {}",
            self.backend.kind,
            child.id(),
            stream_url
        );
        self.session = Some(PlaybackSession {
            child,
            stdin,
            reader,
            muted: false,
        });
        Ok(())
    }

    /// Write the backend token for `cmd` to the process.
    pub async fn send_command(&mut self, cmd: PlayerCommand) -> Result<(), PlayerError> {
        let kind = self.backend.kind;
        let session = self.session.as_mut().ok_or(PlayerError::NoSession)?;

        let token = kind.command(cmd, session.muted);
        if kind.toggles_mute(cmd) {
            session.muted = !session.muted;
        }
        debug!("player: command {:?}", token.trim_end());

        let write_failed = |source: std::io::Error| PlayerError::CommandWriteFailed {
            command: token.to_string(),
            source,
        };
        let stdin = session
            .stdin
            .as_mut()
            .ok_or_else(|| write_failed(std::io::ErrorKind::BrokenPipe.into()))?;
        stdin.write_all(token.as_bytes()).await.map_err(write_failed)?;
        stdin.flush().await.map_err(write_failed)
    }

    pub async fn pause(&mut self) {
        self.dispatch(PlayerCommand::Pause).await;
    }

    pub async fn mute(&mut self) {
        self.dispatch(PlayerCommand::Mute).await;
    }

    pub async fn volume_up(&mut self) {
        self.dispatch(PlayerCommand::VolumeUp).await;
    }

    pub async fn volume_down(&mut self) {
        self.dispatch(PlayerCommand::VolumeDown).await;
    }

    async fn dispatch(&mut self, cmd: PlayerCommand) {
        match self.send_command(cmd).await {
            Ok(()) => {}
            Err(PlayerError::NoSession) => debug!("player: {:?} ignored, nothing playing", cmd),
            Err(e) => warn!("player: {}", e),
        }
    }

    /// Stop the backend and reap it.  Does nothing when idle.
    pub async fn close(&mut self) {
        if self.session.is_none() {
            return;
        }

        if let Err(e) = self.send_command(PlayerCommand::Stop).await {
            debug!("player: graceful stop failed: {}", e);
        }

        let Some(mut session) = self.session.take() else {
            return;
        };
        terminate(&mut session.child);
        drop(session.stdin.take());

        let status = match tokio::time::timeout(TERMINATE_GRACE, session.child.wait()).await {
            Ok(status) => status,
            Err(_) => {
                warn!("player: backend ignored SIGTERM, killing");
                kill_group(&mut session.child);
                session.child.kill().await.and(session.child.wait().await)
            }
        };
        match status {
            Ok(status) => debug!("player: process exited: {}", status),
            Err(e) => warn!("player: failed to reap process: {}", e),
        }

        match tokio::time::timeout(READER_JOIN_GRACE, &mut session.reader).await {
            Ok(Ok(Ok(()))) => {}
            Ok(Ok(Err(e))) => warn!("player: {}", e),
            Ok(Err(e)) => warn!("player: status reader task failed: {}", e),
            Err(_) => {
                warn!("player: status reader outlived its process, aborting");
                session.reader.abort();
            }
        }
        info!("player: stopped");
    }
}

impl Drop for PlayerController {
    fn drop(&mut self) {
        // kill_on_drop only reaches the child itself.
        if let Some(mut session) = self.session.take() {
            kill_group(&mut session.child);
            session.reader.abort();
        }
    }
}

#[cfg(unix)]
type OutputStream = tokio::net::unix::pipe::Receiver;

#[cfg(unix)]
fn output_stream(reader: os_pipe::PipeReader) -> std::io::Result<OutputStream> {
    let file = std::fs::File::from(std::os::fd::OwnedFd::from(reader));
    tokio::net::unix::pipe::Receiver::from_file(file)
}

#[cfg(windows)]
type OutputStream = tokio::fs::File;

#[cfg(windows)]
fn output_stream(reader: os_pipe::PipeReader) -> std::io::Result<OutputStream> {
    let file = std::fs::File::from(std::os::windows::io::OwnedHandle::from(reader));
    Ok(tokio::fs::File::from_std(file))
}

#[cfg(unix)]
fn terminate(child: &mut Child) {
    signal_group(child, nix::sys::signal::Signal::SIGTERM);
}

#[cfg(unix)]
fn kill_group(child: &mut Child) {
    signal_group(child, nix::sys::signal::Signal::SIGKILL);
}

/// Signal the process group led by `child`.
#[cfg(unix)]
fn signal_group(child: &mut Child, signal: nix::sys::signal::Signal) {
    use nix::sys::signal::killpg;
    use nix::unistd::Pid;

    // None once tokio has already reaped the process.
    let Some(pid) = child.id() else {
        return;
    };
    if let Err(e) = killpg(Pid::from_raw(pid as i32), signal) {
        debug!("player: {:?} to group {} failed: {}", signal, pid, e);
        let _ = child.start_kill();
    }
}

#[cfg(not(unix))]
fn terminate(child: &mut Child) {
    kill_group(child);
}

#[cfg(not(unix))]
fn kill_group(child: &mut Child) {
    if let Err(e) = child.start_kill() {
        debug!("player: kill failed: {}", e);
    }
}
