//! Fake backends for process-level tests.
//!
//! A fake backend is `sh <script>`: the script records its arguments and
//! pid, prints whatever output the test wants, then becomes `cat` so that
//! everything written to its stdin lands in `<dir>/stdin`.
#![allow(dead_code)]

use radio_player::{Backend, BackendKind};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

pub struct FakeBackend {
    dir: TempDir,
    script: PathBuf,
}

impl FakeBackend {
    /// `output` is shell code run before stdin capture starts.
    pub fn new(output: &str) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let d = dir.path().display();
        let body = format!(
            "printf '%s\\n' \"$@\" > '{d}/args'\n\
             echo $$ >> '{d}/pids'\n\
             {output}\n\
             exec cat > '{d}/stdin'\n"
        );
        Self::with_script(dir, &body)
    }

    /// A backend that closes its stdin and idles, so command writes fail.
    pub fn deaf() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let d = dir.path().display();
        let body = format!(
            "exec 0<&-\n\
             echo closed > '{d}/ready'\n\
             exec sleep 30\n"
        );
        Self::with_script(dir, &body)
    }

    fn with_script(dir: TempDir, body: &str) -> Self {
        let script = dir.path().join("backend.sh");
        std::fs::write(&script, body).expect("write script");
        Self { dir, script }
    }

    pub fn backend(&self, kind: BackendKind) -> Backend {
        Backend::new(kind)
            .with_program("sh")
            .with_extra_args([self.script.display().to_string()])
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// Poll `name` until `done` accepts its contents.
    pub async fn wait_for(&self, name: &str, done: impl Fn(&str) -> bool) -> String {
        wait_for_file(&self.path(name), done).await
    }
}

pub async fn wait_for_file(path: &Path, done: impl Fn(&str) -> bool) -> String {
    let mut last = String::new();
    for _ in 0..250 {
        if let Ok(content) = tokio::fs::read_to_string(path).await {
            if done(&content) {
                return content;
            }
            last = content;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("timed out waiting for {}: last content {:?}", path.display(), last);
}

/// Whether `pid` still names a process (zombies included).
pub fn pid_exists(pid: u32) -> bool {
    use nix::sys::signal::kill;
    use nix::unistd::Pid;
    kill(Pid::from_raw(pid as i32), None).is_ok()
}

/// Whether `pid` is alive and not a zombie awaiting its reaper.
pub fn pid_running(pid: u32) -> bool {
    match std::fs::read_to_string(format!("/proc/{pid}/stat")) {
        // The state letter follows the parenthesised command name.
        Ok(stat) => !stat
            .rsplit(')')
            .next()
            .is_some_and(|rest| rest.trim_start().starts_with('Z')),
        Err(_) if Path::new("/proc/self").exists() => false,
        Err(_) => pid_exists(pid),
    }
}
