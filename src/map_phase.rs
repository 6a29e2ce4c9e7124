// map_phase.rs
use crate::error::{MapError, MapResult, Outcome};
use crate::world_map::WorldMap;
use serde::{Deserialize, Serialize};
use std::mem;
use tracing::{info, warn};

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum MapPhase {
    NotLoaded,
    ReadyForEdit,
    Loaded,
}

impl WorldMap {
    pub fn phase(&self) -> MapPhase {
        self.phase
    }

    pub fn is_ready_for_edit(&self) -> bool {
        self.phase == MapPhase::ReadyForEdit
    }

    pub fn is_map_loaded(&self) -> bool {
        self.phase == MapPhase::Loaded
    }

    /// True when the current edit session did not find its file and started
    /// from an empty map.
    pub fn is_new_map(&self) -> bool {
        self.new_map_from_scratch
    }

    /// Opens `file_name` for editing, or starts an empty map when the file
    /// does not exist or cannot be read.
    pub fn edit_map(&mut self, file_name: &str) -> MapResult {
        self.clear();
        self.file_name = Some(file_name.to_string());
        self.new_map_from_scratch = match self.reader.read_map(file_name) {
            Ok(Some(config)) => match self.apply_config(&config) {
                Ok(()) => false,
                Err(e) => {
                    warn!(file = file_name, error = %e, "map file is inconsistent, starting from scratch");
                    self.clear();
                    true
                }
            },
            Ok(None) => true,
            Err(e) => {
                warn!(file = file_name, error = %e, "cannot read map file, starting from scratch");
                true
            }
        };
        self.phase = MapPhase::ReadyForEdit;

        info!(
            file = file_name,
            new_map = self.new_map_from_scratch,
            "map ready to edit"
        );
        Ok(Outcome::Applied(format!(
            "Map with file name \"{}\" is ready to edit",
            file_name
        )))
    }

    /// Reads `file_name` and makes it the playable map if it passes
    /// validation. On any failure the map keeps its previous content, file
    /// name and phase.
    pub fn load_map(&mut self, file_name: &str) -> MapResult {
        let config = match self.reader.read_map(file_name) {
            Ok(Some(config)) => config,
            Ok(None) => return Err(MapError::MapFileNotFound(file_name.to_string())),
            Err(e) => {
                return Err(MapError::CorruptMapFile {
                    file: file_name.to_string(),
                    reason: e.to_string(),
                })
            }
        };

        let previous = (mem::take(&mut self.continents), mem::take(&mut self.countries));
        if let Err(e) = self.apply_config(&config) {
            (self.continents, self.countries) = previous;
            return Err(MapError::CorruptMapFile {
                file: file_name.to_string(),
                reason: e.to_string(),
            });
        }

        let report = self.validate_map();
        if !report.is_valid() {
            (self.continents, self.countries) = previous;
            warn!(file = file_name, "map file failed validation, keeping the current map");
            return Err(MapError::InvalidMap(report));
        }

        self.file_name = Some(file_name.to_string());
        self.new_map_from_scratch = false;
        self.phase = MapPhase::Loaded;
        info!(
            file = file_name,
            continents = self.continents.len(),
            countries = self.countries.len(),
            "map loaded"
        );
        Ok(Outcome::Applied(format!(
            "Map with file name \"{}\" is loaded successfully.",
            file_name
        )))
    }

    /// Writes the map being edited. Only an edit session can be saved.
    pub fn save_map(&mut self, file_name: &str) -> MapResult {
        if self.phase != MapPhase::ReadyForEdit {
            return Err(MapError::NoMapTo("save"));
        }
        self.writer.write_map(file_name, &self.to_config())?;

        info!(file = file_name, "map saved");
        Ok(Outcome::Applied(format!(
            "Map with file name \"{}\" has been saved successfully",
            file_name
        )))
    }

    pub(crate) fn ensure_editable(&self) -> Result<(), MapError> {
        match self.phase {
            MapPhase::NotLoaded => Err(MapError::NoMapTo("edit")),
            MapPhase::ReadyForEdit | MapPhase::Loaded => Ok(()),
        }
    }
}
