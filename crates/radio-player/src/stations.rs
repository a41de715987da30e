use serde::{Deserialize, Serialize};
use std::path::Path;

/// A named stream URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Station {
    pub name: String,
    pub url: String,
}

/// Stations shipped with the player, used to seed a missing station file.
pub const BUNDLED_STATIONS: &str = include_str!("../stations.toml");

#[derive(Debug, Default, Serialize, Deserialize)]
struct StationFile {
    #[serde(default)]
    station: Vec<Station>,
}

pub fn load_stations(path: &Path) -> anyhow::Result<Vec<Station>> {
    let content = std::fs::read_to_string(path)?;
    parse_stations(&content)
}

pub fn parse_stations(content: &str) -> anyhow::Result<Vec<Station>> {
    let file: StationFile = toml::from_str(content)?;
    let stations = file
        .station
        .into_iter()
        .map(|s| Station {
            name: s.name.trim().to_string(),
            url: s.url.trim().to_string(),
        })
        .filter(|s| !s.url.is_empty())
        .collect();
    Ok(stations)
}

pub fn save_stations(path: &Path, stations: &[Station]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = StationFile {
        station: stations.to_vec(),
    };
    std::fs::write(path, toml::to_string_pretty(&file)?)?;
    Ok(())
}

/// Write the bundled list to `path` unless a file already exists there.
pub fn ensure_station_file(path: &Path) -> anyhow::Result<()> {
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, BUNDLED_STATIONS)?;
    tracing::info!("stations: seeded {}", path.display());
    Ok(())
}

/// Add `station` to the end of the list at `path`, creating the file if needed.
pub fn append_station(path: &Path, station: Station) -> anyhow::Result<()> {
    let mut stations = if path.exists() {
        load_stations(path)?
    } else {
        Vec::new()
    };
    stations.push(station);
    save_stations(path, &stations)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_stations() {
        let stations = parse_stations(
            r#"
            # comments are fine
            [[station]]
            name = " Night Jazz "
            url = "http://example.com/jazz.pls"

            [[station]]
            name = "Broken"
            url = ""

            [[station]]
            name = "Ambient"
            url = "http://example.com/ambient"
            "#,
        )
        .unwrap();
        assert_eq!(stations.len(), 2);
        assert_eq!(stations[0].name, "Night Jazz");
        assert_eq!(stations[1].url, "http://example.com/ambient");
    }

    #[test]
    fn test_bundled_stations_parse() {
        let stations = parse_stations(BUNDLED_STATIONS).unwrap();
        assert!(!stations.is_empty());
        assert!(stations.iter().all(|s| s.url.starts_with("http")));
    }

    #[test]
    fn test_ensure_station_file_keeps_existing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("radio").join("stations.toml");
        ensure_station_file(&path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), BUNDLED_STATIONS);

        std::fs::write(&path, "").unwrap();
        ensure_station_file(&path).unwrap();
        assert!(load_stations(&path).unwrap().is_empty());
    }

    #[test]
    fn test_empty_file_has_no_stations() {
        assert!(parse_stations("").unwrap().is_empty());
    }

    #[test]
    fn test_append_creates_and_extends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stations.toml");
        append_station(
            &path,
            Station {
                name: "One".into(),
                url: "http://example.com/1".into(),
            },
        )
        .unwrap();
        append_station(
            &path,
            Station {
                name: "Two".into(),
                url: "http://example.com/2.m3u".into(),
            },
        )
        .unwrap();

        let stations = load_stations(&path).unwrap();
        let names: Vec<_> = stations.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["One", "Two"]);
    }
}
