use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::backend::{Backend, BackendKind};
use super::platform;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub player: PlayerConfig,
    #[serde(default)]
    pub stations: StationsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Probe order.  The first backend that starts is used.
    #[serde(default = "default_order")]
    pub order: Vec<BackendKind>,
    #[serde(default)]
    pub mplayer: BackendOverride,
    #[serde(default)]
    pub mpv: BackendOverride,
    #[serde(default)]
    pub vlc: BackendOverride,
}

/// Per-backend executable location and extra arguments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackendOverride {
    /// Executable to run instead of the default name looked up on PATH.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// Arguments placed before the player's own flags.
    #[serde(default)]
    pub extra_args: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationsConfig {
    /// Station list used when `--stations` is not given.
    /// Defaults to `$XDG_CONFIG_HOME/radio/stations.toml`.
    #[serde(default = "default_stations_toml")]
    pub stations_toml: PathBuf,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            order: default_order(),
            mplayer: BackendOverride::default(),
            mpv: BackendOverride::default(),
            vlc: BackendOverride::default(),
        }
    }
}

impl Default for StationsConfig {
    fn default() -> Self {
        Self {
            stations_toml: default_stations_toml(),
        }
    }
}

fn default_order() -> Vec<BackendKind> {
    BackendKind::ALL.to_vec()
}

fn default_stations_toml() -> PathBuf {
    platform::config_dir().join("stations.toml")
}

impl PlayerConfig {
    pub fn override_for(&self, kind: BackendKind) -> &BackendOverride {
        match kind {
            BackendKind::MPlayer => &self.mplayer,
            BackendKind::Mpv => &self.mpv,
            BackendKind::Vlc => &self.vlc,
        }
    }

    pub fn backend(&self, kind: BackendKind) -> Backend {
        let ov = self.override_for(kind);
        let backend = Backend::new(kind).with_extra_args(ov.extra_args.iter().cloned());
        match &ov.path {
            Some(path) => backend.with_program(path),
            None => backend,
        }
    }

    /// Backends in probe order, duplicates dropped.
    pub fn backends(&self) -> Vec<Backend> {
        let mut seen = Vec::new();
        for kind in &self.order {
            if !seen.contains(kind) {
                seen.push(*kind);
            }
        }
        seen.into_iter().map(|k| self.backend(k)).collect()
    }
}

impl Config {
    /// Load the config file, writing the defaults on first run.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(config_path: &Path) -> anyhow::Result<Self> {
        if !config_path.exists() {
            let config = Self::default();
            config.save_to(config_path)?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(config_path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to(&self, config_path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        platform::config_dir().join("config.toml")
    }
}
