use crate::errors::{EngineError, Result};
use crate::network_model::vehicles::ClassValues;
use crate::network_model::{CorridorNetwork, NetworkRecords};
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Locations of the four input tables.
#[derive(Debug, Clone)]
pub struct NetworkPaths {
    pub segments: PathBuf,
    pub intersections: PathBuf,
    pub od: PathBuf,
    pub zones: PathBuf,
}

impl NetworkPaths {
    /// The conventional file names inside one data directory.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            segments: dir.join("segments.csv"),
            intersections: dir.join("intersections.csv"),
            od: dir.join("od.csv"),
            zones: dir.join("zones.csv"),
        }
    }
}

/// Parses one CSV table. Any malformed row is reported against `source_name`.
pub fn read_table<T, R>(source_name: &str, reader: R) -> Result<Vec<T>>
where
    T: DeserializeOwned,
    R: Read,
{
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for record in rdr.deserialize() {
        let row: T = record.map_err(|e| {
            let line = e
                .position()
                .map(|p| format!("line {}: ", p.line()))
                .unwrap_or_default();
            EngineError::data_integrity(source_name, format!("{}{}", line, e))
        })?;
        rows.push(row);
    }
    Ok(rows)
}

/// Builds a network from four CSV readers.
pub fn load_from_readers(
    segments: impl Read,
    intersections: impl Read,
    od: impl Read,
    zones: impl Read,
    default_split: &ClassValues,
) -> Result<CorridorNetwork> {
    let records = NetworkRecords {
        segments: read_table("segments", segments)?,
        intersections: read_table("intersections", intersections)?,
        od_pairs: read_table("od", od)?,
        zones: read_table("zones", zones)?,
    };
    CorridorNetwork::load(records, default_split)
}

/// Builds a network from CSV files on disk.
pub fn load_from_paths(paths: &NetworkPaths, default_split: &ClassValues) -> Result<CorridorNetwork> {
    log::info!("[Loader] Reading network tables from {}", paths.segments.display());
    let open = |path: &Path| -> Result<File> {
        File::open(path).map_err(|e| EngineError::data_integrity(&path.display().to_string(), e.to_string()))
    };
    let records = NetworkRecords {
        segments: read_table(&paths.segments.display().to_string(), open(&paths.segments)?)?,
        intersections: read_table(
            &paths.intersections.display().to_string(),
            open(&paths.intersections)?,
        )?,
        od_pairs: read_table(&paths.od.display().to_string(), open(&paths.od)?)?,
        zones: read_table(&paths.zones.display().to_string(), open(&paths.zones)?)?,
    };
    CorridorNetwork::load(records, default_split)
}
