// map_io.rs
use crate::domination;
use crate::error::MapFileError;
use crate::map_config::MapConfig;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Source of map files. `Ok(None)` means the file does not exist, which
/// callers treat as an ordinary outcome rather than a failure.
pub trait MapReader {
    fn read_map(&self, file_name: &str) -> Result<Option<MapConfig>, MapFileError>;
}

pub trait MapWriter {
    fn write_map(&self, file_name: &str, config: &MapConfig) -> Result<(), MapFileError>;
}

/// Map files stored under one directory. `.json` files hold a serialized
/// `MapConfig`; any other extension is read and written as a domination map.
#[derive(Debug, Clone)]
pub struct MapFiles {
    directory: PathBuf,
}

impl MapFiles {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Resolves `file_name` under the map directory. Only plain relative
    /// names are accepted: no root, no prefix, no `.` or `..` parts.
    pub fn path_of(&self, file_name: &str) -> Result<PathBuf, MapFileError> {
        let relative = Path::new(file_name);
        let plain = relative.components().next().is_some()
            && relative
                .components()
                .all(|part| matches!(part, Component::Normal(_)));
        if !plain {
            return Err(MapFileError::OutsideMapDirectory(file_name.to_string()));
        }
        Ok(self.directory.join(relative))
    }

    fn is_json(path: &Path) -> bool {
        path.extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false)
    }

    fn map_name(path: &Path) -> String {
        path.file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "world".to_string())
    }
}

impl MapReader for MapFiles {
    fn read_map(&self, file_name: &str) -> Result<Option<MapConfig>, MapFileError> {
        let path = self.path_of(file_name)?;
        let data = match fs::read_to_string(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "map file does not exist");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let config = if Self::is_json(&path) {
            MapConfig::from_json_str(&data)?
        } else {
            domination::parse_map(&data)?
        };
        debug!(
            path = %path.display(),
            continents = config.continents.len(),
            countries = config.countries.len(),
            "map file read"
        );
        Ok(Some(config))
    }
}

impl MapWriter for MapFiles {
    fn write_map(&self, file_name: &str, config: &MapConfig) -> Result<(), MapFileError> {
        let path = self.path_of(file_name)?;
        let data = if Self::is_json(&path) {
            config.to_json_string()?
        } else {
            domination::write_map(&Self::map_name(&path), config)?
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, data)?;
        debug!(path = %path.display(), "map file written");
        Ok(())
    }
}
