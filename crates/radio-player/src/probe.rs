//! Backend selection at startup.
//!
//! Backends are tried in the configured order; the first whose executable
//! can be spawned wins.  Later backends are never started.

use std::future::Future;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

use crate::backend::Backend;
use crate::error::PlayerError;

/// Return the first backend in `backends` that can be started on this host.
pub async fn probe(backends: &[Backend]) -> Result<Backend, PlayerError> {
    probe_with(backends, try_spawn).await
}

/// Probe loop with a pluggable launch attempt.
pub async fn probe_with<F, Fut>(backends: &[Backend], mut attempt: F) -> Result<Backend, PlayerError>
where
    F: FnMut(Backend) -> Fut,
    Fut: Future<Output = std::io::Result<()>>,
{
    info!(
        "probe: implemented players: {}",
        backends
            .iter()
            .map(|b| b.kind.executable())
            .collect::<Vec<_>>()
            .join(", ")
    );

    for backend in backends {
        match attempt(backend.clone()).await {
            Ok(()) => {
                info!("probe: {} supported ({})", backend.kind, backend.program.display());
                return Ok(backend.clone());
            }
            Err(e) => debug!("probe: {} not supported: {}", backend.kind, e),
        }
    }

    Err(PlayerError::NoBackend {
        tried: backends.iter().map(|b| b.kind).collect(),
    })
}

/// Spawn the backend with its help flag, then kill and reap it at once.
async fn try_spawn(backend: Backend) -> std::io::Result<()> {
    let mut child = Command::new(&backend.program)
        .args(backend.probe_args())
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()?;
    // It may already have exited after printing help.
    let _ = child.start_kill();
    let _ = child.wait().await;
    Ok(())
}
