// command.rs
use crate::error::{MapResult, ValidationErrors};
use crate::world_map::{MapState, WorldMap};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One step of a compound edit command.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum MapEdit {
    AddContinent { name: String, value: Option<i32> },
    RemoveContinent { name: String },
    AddCountry { name: String, continent: String },
    RemoveCountry { name: String },
    AddNeighbour { first: String, second: String },
    RemoveNeighbour { first: String, second: String },
    PlaceArmies { country: String, armies: u16 },
    SetOwner { country: String, owner: Option<String> },
}

impl MapEdit {
    pub fn apply(&self, map: &mut WorldMap) -> MapResult {
        match self {
            MapEdit::AddContinent { name, value } => map.add_continent(name, *value),
            MapEdit::RemoveContinent { name } => map.remove_continent(name),
            MapEdit::AddCountry { name, continent } => map.add_country(name, continent),
            MapEdit::RemoveCountry { name } => map.remove_country(name),
            MapEdit::AddNeighbour { first, second } => map.add_neighbour(first, second),
            MapEdit::RemoveNeighbour { first, second } => map.remove_neighbour(first, second),
            MapEdit::PlaceArmies { country, armies } => map.place_armies(country, *armies),
            MapEdit::SetOwner { country, owner } => map.set_owner(country, owner.clone()),
        }
    }
}

/// Applies every edit in order. A failing edit does not stop the ones after
/// it; all failures come back together.
pub fn apply_edits(
    map: &mut WorldMap,
    edits: &[MapEdit],
) -> Result<Vec<String>, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    for edit in edits {
        match edit.apply(map) {
            Ok(outcome) => errors.add_completed(outcome.into_message()),
            Err(e) => {
                debug!(?edit, error = %e, "edit rejected");
                errors.add_validation_error(e);
            }
        }
    }

    if errors.is_empty() {
        Ok(errors.into_parts().0)
    } else {
        Err(errors)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Command {
    EditMap { file_name: String },
    LoadMap { file_name: String },
    SaveMap { file_name: String },
    Edit { edits: Vec<MapEdit> },
    ValidateMap,
    ShowMap,
    GetMapState,
}

/// What a command produced: every message in the order it was produced,
/// failures separately, and the map as it stands afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandReport {
    pub messages: Vec<String>,
    pub errors: Vec<String>,
    pub map_state: MapState,
}

impl CommandReport {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

pub fn execute(map: &mut WorldMap, command: Command) -> CommandReport {
    let mut messages = Vec::new();
    let mut errors = Vec::new();

    let result: Option<MapResult> = match command {
        Command::EditMap { file_name } => Some(map.edit_map(&file_name)),
        Command::LoadMap { file_name } => Some(map.load_map(&file_name)),
        Command::SaveMap { file_name } => Some(map.save_map(&file_name)),
        Command::Edit { edits } => {
            match apply_edits(map, &edits) {
                Ok(done) => messages.extend(done),
                Err(failures) => {
                    let (done, failed) = failures.into_parts();
                    messages.extend(done);
                    errors.extend(failed);
                }
            }
            None
        }
        Command::ValidateMap => {
            let report = map.validate_map();
            if report.is_valid() {
                messages.push(report.to_string());
            } else {
                errors.push(report.to_string());
            }
            None
        }
        Command::ShowMap => {
            messages.push(map.show_map());
            None
        }
        Command::GetMapState => None,
    };

    match result {
        Some(Ok(outcome)) => messages.push(outcome.into_message()),
        Some(Err(e)) => errors.push(e.to_string()),
        None => {}
    }

    CommandReport {
        messages,
        errors,
        map_state: map.map_state(),
    }
}
