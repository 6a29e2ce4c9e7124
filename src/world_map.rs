// world_map.rs
use crate::continent::Continent;
use crate::country::Country;
use crate::error::{MapError, MapResult, Outcome};
use crate::map_config::{ContinentConfig, CountryConfig, MapConfig};
use crate::map_formatter::{FormatType, MapFormatter};
use crate::map_io::{MapFiles, MapReader, MapWriter};
use crate::map_phase::MapPhase;
use crate::map_validation::{self, ValidationReport};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use tracing::debug;

/// Everything a client needs to draw the map, in name order.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MapState {
    pub file_name: Option<String>,
    pub phase: MapPhase,
    pub new_map_from_scratch: bool,
    pub continents: Vec<Continent>,
    pub countries: Vec<Country>,
}

/// The world map: every continent and country of the game plus the editing
/// lifecycle around them.
///
/// Continents and countries refer to each other by name. Every mutation keeps
/// neighbour edges symmetric and continent membership consistent with each
/// country's continent, and checks its inputs before touching anything.
pub struct WorldMap {
    pub(crate) continents: HashMap<String, Continent>,
    pub(crate) countries: HashMap<String, Country>,
    pub(crate) file_name: Option<String>,
    pub(crate) phase: MapPhase,
    pub(crate) new_map_from_scratch: bool,
    pub(crate) reader: Box<dyn MapReader + Send>,
    pub(crate) writer: Box<dyn MapWriter + Send>,
}

impl fmt::Debug for WorldMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorldMap")
            .field("continents", &self.continents)
            .field("countries", &self.countries)
            .field("file_name", &self.file_name)
            .field("phase", &self.phase)
            .field("new_map_from_scratch", &self.new_map_from_scratch)
            .finish_non_exhaustive()
    }
}

impl WorldMap {
    pub fn new(reader: Box<dyn MapReader + Send>, writer: Box<dyn MapWriter + Send>) -> Self {
        Self {
            continents: HashMap::new(),
            countries: HashMap::new(),
            file_name: None,
            phase: MapPhase::NotLoaded,
            new_map_from_scratch: false,
            reader,
            writer,
        }
    }

    pub fn with_files(files: MapFiles) -> Self {
        Self::new(Box::new(files.clone()), Box::new(files))
    }

    pub fn continents(&self) -> impl Iterator<Item = &Continent> {
        self.continents.values()
    }

    pub fn countries(&self) -> impl Iterator<Item = &Country> {
        self.countries.values()
    }

    pub fn get_continent(&self, name: &str) -> Option<&Continent> {
        self.continents.get(name)
    }

    pub fn get_country(&self, name: &str) -> Option<&Country> {
        self.countries.get(name)
    }

    pub fn contains_country(&self, name: &str) -> bool {
        self.countries.contains_key(name)
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn add_continent(&mut self, name: &str, value: Option<i32>) -> MapResult {
        self.ensure_editable()?;
        if name.trim().is_empty() {
            return Err(MapError::InvalidContinentName);
        }
        let value = value
            .and_then(|v| u32::try_from(v).ok())
            .ok_or(MapError::InvalidContinentValue)?;
        self.insert_continent(name, value)
    }

    pub fn remove_continent(&mut self, name: &str) -> MapResult {
        self.ensure_editable()?;
        if name.trim().is_empty() {
            return Err(MapError::InvalidContinentName);
        }
        let continent = self
            .continents
            .get(name)
            .ok_or_else(|| MapError::ContinentNotFound(name.to_string()))?;

        let members: Vec<String> = continent.countries().iter().cloned().collect();
        for country in &members {
            self.detach_country(country);
        }
        self.continents.remove(name);

        debug!(continent = name, countries = members.len(), "continent removed");
        Ok(Outcome::Applied(format!(
            "Continent with name \"{}\" is successfully removed from World Map",
            name
        )))
    }

    pub fn add_country(&mut self, country: &str, continent: &str) -> MapResult {
        self.ensure_editable()?;
        self.insert_country(country, continent)
    }

    pub fn remove_country(&mut self, country: &str) -> MapResult {
        self.ensure_editable()?;
        if !self.detach_country(country) {
            return Err(MapError::CountryNotFound(country.to_string()));
        }
        debug!(country, "country removed");
        Ok(Outcome::Applied(format!(
            "Country with name \"{}\" is successfully removed from World Map",
            country
        )))
    }

    pub fn add_neighbour(&mut self, first: &str, second: &str) -> MapResult {
        self.ensure_editable()?;
        self.insert_neighbour(first, second)
    }

    pub fn remove_neighbour(&mut self, first: &str, second: &str) -> MapResult {
        self.ensure_editable()?;
        let (first_country, second_country) = self.country_pair(first, second)?;
        if !first_country.is_adjacent_to(second) && !second_country.is_adjacent_to(first) {
            return Ok(Outcome::Unchanged(format!(
                "\"{}\" and \"{}\" are not adjacent countries.",
                first, second
            )));
        }

        self.sever(first, second);
        Ok(Outcome::Applied(format!(
            "\"{}\" and \"{}\" are not adjacent countries now.",
            first, second
        )))
    }

    pub fn place_armies(&mut self, country: &str, num_armies: u16) -> MapResult {
        let target = self
            .countries
            .get_mut(country)
            .ok_or_else(|| MapError::CountryNotFound(country.to_string()))?;
        target.place_armies(num_armies);
        Ok(Outcome::Applied(format!(
            "{} armies placed on \"{}\", it now has {}.",
            num_armies,
            country,
            target.armies()
        )))
    }

    pub fn set_owner(&mut self, country: &str, owner: Option<String>) -> MapResult {
        let target = self
            .countries
            .get_mut(country)
            .ok_or_else(|| MapError::CountryNotFound(country.to_string()))?;
        let message = match &owner {
            Some(player) => format!("\"{}\" is now owned by {}.", country, player),
            None => format!("\"{}\" has no owner now.", country),
        };
        target.set_owner(owner);
        Ok(Outcome::Applied(message))
    }

    pub fn validate_map(&self) -> ValidationReport {
        map_validation::validate(self)
    }

    pub fn show_map(&self) -> String {
        let format_type = if self.is_map_loaded() {
            FormatType::Detail
        } else {
            FormatType::Default
        };
        MapFormatter::new(self).format(format_type)
    }

    /// True when `from` and `to` are two different countries with the same
    /// owner, joined by a path that never leaves that owner's countries.
    pub fn has_owned_path(&self, from: &str, to: &str) -> bool {
        if from == to {
            return false;
        }
        let (Some(from_country), Some(to_country)) = (self.get_country(from), self.get_country(to))
        else {
            return false;
        };
        let Some(owner) = from_country.owner() else {
            return false;
        };
        if to_country.owner() != Some(owner) {
            return false;
        }

        let owned: HashSet<&str> = self
            .countries
            .values()
            .filter(|c| c.owner() == Some(owner))
            .map(Country::name)
            .collect();
        map_validation::reachable_within(self, from, &owned).contains(to)
    }

    pub fn to_config(&self) -> MapConfig {
        MapConfig {
            continents: self
                .continents
                .values()
                .sorted_by(|a, b| a.name().cmp(b.name()))
                .map(|c| ContinentConfig {
                    name: c.name().to_string(),
                    value: c.value(),
                })
                .collect(),
            countries: self
                .countries
                .values()
                .sorted_by(|a, b| a.name().cmp(b.name()))
                .map(|c| CountryConfig {
                    name: c.name().to_string(),
                    continent: c.continent().to_string(),
                    neighbours: c.neighbours().iter().sorted().cloned().collect(),
                })
                .collect(),
        }
    }

    pub fn map_state(&self) -> MapState {
        MapState {
            file_name: self.file_name.clone(),
            phase: self.phase,
            new_map_from_scratch: self.new_map_from_scratch,
            continents: self
                .continents
                .values()
                .sorted_by(|a, b| a.name().cmp(b.name()))
                .cloned()
                .collect(),
            countries: self
                .countries
                .values()
                .sorted_by(|a, b| a.name().cmp(b.name()))
                .cloned()
                .collect(),
        }
    }

    /// Replaces the whole content of the map with `config`. On error the map
    /// is left half built; callers restore or clear it.
    pub(crate) fn apply_config(&mut self, config: &MapConfig) -> Result<(), MapError> {
        self.clear();
        for continent in &config.continents {
            self.insert_continent(&continent.name, continent.value)?;
        }
        for country in &config.countries {
            self.insert_country(&country.name, &country.continent)?;
        }
        for country in &config.countries {
            for neighbour in &country.neighbours {
                self.insert_neighbour(&country.name, neighbour)?;
            }
        }
        Ok(())
    }

    pub(crate) fn clear(&mut self) {
        self.continents.clear();
        self.countries.clear();
    }

    fn insert_continent(&mut self, name: &str, value: u32) -> MapResult {
        if name.trim().is_empty() {
            return Err(MapError::InvalidContinentName);
        }
        if value == 0 {
            return Err(MapError::InvalidContinentValue);
        }
        if self.continents.contains_key(name) {
            return Err(MapError::ContinentExists(name.to_string()));
        }

        self.continents
            .insert(name.to_string(), Continent::new(name, value));
        debug!(continent = name, value, "continent added");
        Ok(Outcome::Applied(format!(
            "Continent with name \"{}\" is successfully added to map",
            name
        )))
    }

    fn insert_country(&mut self, country: &str, continent: &str) -> MapResult {
        if country.trim().is_empty() {
            return Err(MapError::InvalidCountryName);
        }
        if continent.trim().is_empty() {
            return Err(MapError::InvalidContinentName);
        }
        if self.countries.contains_key(country) {
            return Err(MapError::CountryExists(country.to_string()));
        }
        let target = self
            .continents
            .get_mut(continent)
            .ok_or_else(|| MapError::ContinentNotFound(continent.to_string()))?;

        target.add_country(country);
        self.countries
            .insert(country.to_string(), Country::new(country, continent));
        debug!(country, continent, "country added");
        Ok(Outcome::Applied(format!(
            "Country with name \"{}\" is successfully added to \"{}\"",
            country, continent
        )))
    }

    fn insert_neighbour(&mut self, first: &str, second: &str) -> MapResult {
        let (first_country, second_country) = self.country_pair(first, second)?;
        if first == second {
            return Err(MapError::SelfNeighbour(first.to_string()));
        }
        if first_country.is_adjacent_to(second) && second_country.is_adjacent_to(first) {
            return Ok(Outcome::Unchanged(format!(
                "\"{}\" and \"{}\" are already adjacent countries.",
                first, second
            )));
        }

        if let Some(country) = self.countries.get_mut(first) {
            country.add_neighbour(second);
        }
        if let Some(country) = self.countries.get_mut(second) {
            country.add_neighbour(first);
        }
        Ok(Outcome::Applied(format!(
            "\"{}\" and \"{}\" are adjacent countries now.",
            first, second
        )))
    }

    fn country_pair(&self, first: &str, second: &str) -> Result<(&Country, &Country), MapError> {
        let first_country = self
            .countries
            .get(first)
            .ok_or_else(|| MapError::CountryNotFound(first.to_string()))?;
        let second_country = self
            .countries
            .get(second)
            .ok_or_else(|| MapError::CountryNotFound(second.to_string()))?;
        Ok((first_country, second_country))
    }

    fn sever(&mut self, first: &str, second: &str) {
        if let Some(country) = self.countries.get_mut(first) {
            country.remove_neighbour(second);
        }
        if let Some(country) = self.countries.get_mut(second) {
            country.remove_neighbour(first);
        }
    }

    /// Removes a country with its edges and its continent membership.
    /// Returns false when there is no such country.
    fn detach_country(&mut self, name: &str) -> bool {
        let Some(removed) = self.countries.remove(name) else {
            return false;
        };
        if let Some(continent) = self.continents.get_mut(removed.continent()) {
            continent.remove_country(name);
        }
        for neighbour in removed.neighbours() {
            if let Some(country) = self.countries.get_mut(neighbour) {
                country.remove_neighbour(name);
            }
        }
        true
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::MapFileError;
    use std::sync::{Arc, Mutex};

    /// Map files kept in memory; clones share the same files.
    #[derive(Clone, Default)]
    pub(crate) struct MemoryFiles {
        pub(crate) files: Arc<Mutex<HashMap<String, MapConfig>>>,
    }

    impl MemoryFiles {
        pub(crate) fn with_file(file_name: &str, config: MapConfig) -> Self {
            let files = Self::default();
            files
                .files
                .lock()
                .unwrap()
                .insert(file_name.to_string(), config);
            files
        }

        pub(crate) fn get(&self, file_name: &str) -> Option<MapConfig> {
            self.files.lock().unwrap().get(file_name).cloned()
        }
    }

    impl MapReader for MemoryFiles {
        fn read_map(&self, file_name: &str) -> Result<Option<MapConfig>, MapFileError> {
            Ok(self.get(file_name))
        }
    }

    impl MapWriter for MemoryFiles {
        fn write_map(&self, file_name: &str, config: &MapConfig) -> Result<(), MapFileError> {
            self.files
                .lock()
                .unwrap()
                .insert(file_name.to_string(), config.clone());
            Ok(())
        }
    }

    pub(crate) fn map_over(files: &MemoryFiles) -> WorldMap {
        WorldMap::new(Box::new(files.clone()), Box::new(files.clone()))
    }

    pub(crate) fn editable_map() -> WorldMap {
        let mut map = map_over(&MemoryFiles::default());
        map.edit_map("scratch.map").unwrap();
        map
    }

    fn south_america() -> WorldMap {
        let mut map = editable_map();
        map.add_continent("South America", Some(2)).unwrap();
        map.add_continent("Africa", Some(3)).unwrap();
        for country in ["Peru", "Brazil", "Argentina", "Venezuela"] {
            map.add_country(country, "South America").unwrap();
        }
        map.add_country("North Africa", "Africa").unwrap();
        map.add_neighbour("Peru", "Brazil").unwrap();
        map.add_neighbour("Peru", "Argentina").unwrap();
        map.add_neighbour("Brazil", "Argentina").unwrap();
        map.add_neighbour("Brazil", "Venezuela").unwrap();
        map.add_neighbour("Brazil", "North Africa").unwrap();
        map
    }

    fn assert_consistent(map: &WorldMap) {
        for country in map.countries() {
            assert!(!country.is_adjacent_to(country.name()));
            for neighbour in country.neighbours() {
                let other = map.get_country(neighbour).expect("dangling neighbour");
                assert!(other.is_adjacent_to(country.name()));
            }
            let continent = map
                .get_continent(country.continent())
                .expect("dangling continent");
            assert!(continent.contains(country.name()));
        }
        for continent in map.continents() {
            for member in continent.countries() {
                assert_eq!(map.get_country(member).unwrap().continent(), continent.name());
            }
        }
    }

    #[test]
    fn neighbours_are_symmetric() {
        let mut map = south_america();
        let peru = map.get_country("Peru").unwrap();
        let brazil = map.get_country("Brazil").unwrap();
        assert!(peru.is_adjacent_to("Brazil") && brazil.is_adjacent_to("Peru"));

        map.remove_neighbour("Brazil", "Peru").unwrap();
        assert!(!map.get_country("Peru").unwrap().is_adjacent_to("Brazil"));
        assert!(!map.get_country("Brazil").unwrap().is_adjacent_to("Peru"));
        assert_consistent(&map);
    }

    #[test]
    fn redundant_edges_leave_map_unchanged() {
        let mut map = south_america();
        map.add_country("Chile", "South America").unwrap();

        let first = map.add_neighbour("Chile", "Peru").unwrap();
        let before = map.to_config();
        let second = map.add_neighbour("Chile", "Peru").unwrap();
        assert!(first.is_applied());
        assert_eq!(
            second,
            Outcome::Unchanged("\"Chile\" and \"Peru\" are already adjacent countries.".to_string())
        );
        assert_eq!(map.to_config(), before);

        let removed = map.remove_neighbour("Chile", "Argentina").unwrap();
        assert!(!removed.is_applied());
        assert_eq!(map.to_config(), before);
    }

    #[test]
    fn neighbour_errors() {
        let mut map = south_america();
        assert!(matches!(
            map.add_neighbour("Peru", "Atlantis"),
            Err(MapError::CountryNotFound(name)) if name == "Atlantis"
        ));
        assert!(matches!(
            map.remove_neighbour("Atlantis", "Peru"),
            Err(MapError::CountryNotFound(name)) if name == "Atlantis"
        ));
        assert!(matches!(
            map.add_neighbour("Peru", "Peru"),
            Err(MapError::SelfNeighbour(_))
        ));
    }

    #[test]
    fn removing_a_country_cuts_its_edges() {
        let mut map = south_america();
        map.remove_country("Brazil").unwrap();

        assert!(!map.contains_country("Brazil"));
        assert!(!map.get_continent("South America").unwrap().contains("Brazil"));
        for name in ["Peru", "Argentina", "Venezuela", "North Africa"] {
            assert!(!map.get_country(name).unwrap().is_adjacent_to("Brazil"));
        }
        assert!(map.get_country("Peru").unwrap().is_adjacent_to("Argentina"));
        assert_consistent(&map);

        assert!(matches!(
            map.remove_country("Brazil"),
            Err(MapError::CountryNotFound(_))
        ));
    }

    #[test]
    fn removing_a_continent_cascades() {
        let mut map = south_america();
        map.remove_continent("South America").unwrap();

        assert!(map.get_continent("South America").is_none());
        assert_eq!(map.countries().count(), 1);
        assert!(map.get_country("North Africa").unwrap().neighbours().is_empty());
        assert_consistent(&map);

        assert!(matches!(
            map.remove_continent("South America"),
            Err(MapError::ContinentNotFound(_))
        ));
        assert!(matches!(
            map.remove_continent("  "),
            Err(MapError::InvalidContinentName)
        ));
    }

    #[test]
    fn names_are_unique() {
        let mut map = south_america();
        assert!(matches!(
            map.add_continent("Africa", Some(9)),
            Err(MapError::ContinentExists(_))
        ));
        assert_eq!(map.get_continent("Africa").unwrap().value(), 3);

        assert!(matches!(
            map.add_country("Peru", "Africa"),
            Err(MapError::CountryExists(_))
        ));
        assert_eq!(map.get_country("Peru").unwrap().continent(), "South America");
        assert!(map.get_country("Peru").unwrap().is_adjacent_to("Brazil"));
        assert_consistent(&map);
    }

    #[test]
    fn invalid_inputs() {
        let mut map = editable_map();
        assert!(matches!(
            map.add_continent("", Some(1)),
            Err(MapError::InvalidContinentName)
        ));
        assert!(matches!(
            map.add_continent("Asia", None),
            Err(MapError::InvalidContinentValue)
        ));
        assert!(matches!(
            map.add_continent("Asia", Some(0)),
            Err(MapError::InvalidContinentValue)
        ));
        assert!(matches!(
            map.add_continent("Asia", Some(-4)),
            Err(MapError::InvalidContinentValue)
        ));
        map.add_continent("Asia", Some(7)).unwrap();

        assert!(matches!(
            map.add_country(" ", "Asia"),
            Err(MapError::InvalidCountryName)
        ));
        assert!(matches!(
            map.add_country("Siam", ""),
            Err(MapError::InvalidContinentName)
        ));
        assert!(matches!(
            map.add_country("Siam", "Europe"),
            Err(MapError::ContinentNotFound(_))
        ));
        assert!(map.countries().next().is_none());
    }

    #[test]
    fn owned_paths_follow_ownership() {
        let mut map = south_america();
        for country in ["Peru", "Brazil", "Venezuela"] {
            map.set_owner(country, Some("John".to_string())).unwrap();
        }
        map.set_owner("Argentina", Some("Robert".to_string())).unwrap();

        assert!(map.has_owned_path("Peru", "Venezuela"));
        assert!(!map.has_owned_path("Peru", "Argentina"));

        map.set_owner("Brazil", Some("Robert".to_string())).unwrap();
        assert!(!map.has_owned_path("Peru", "Venezuela"));
        assert!(!map.has_owned_path("North Africa", "Peru"));
        assert!(!map.has_owned_path("Peru", "Atlantis"));
    }

    #[test]
    fn no_owned_path_from_a_country_to_itself() {
        let mut map = south_america();
        for country in ["Peru", "Brazil"] {
            map.set_owner(country, Some("John".to_string())).unwrap();
        }
        map.add_country("Falklands", "South America").unwrap();
        map.set_owner("Falklands", Some("John".to_string())).unwrap();

        assert!(map.has_owned_path("Peru", "Brazil"));
        assert!(!map.has_owned_path("Peru", "Peru"));
        assert!(!map.has_owned_path("Falklands", "Falklands"));
    }

    #[test]
    fn armies_accumulate() {
        let mut map = south_america();
        map.place_armies("Peru", 3).unwrap();
        map.place_armies("Peru", 2).unwrap();
        assert_eq!(map.get_country("Peru").unwrap().armies(), 5);
        assert!(matches!(
            map.place_armies("Atlantis", 1),
            Err(MapError::CountryNotFound(_))
        ));
    }

    #[test]
    fn config_snapshot_is_sorted() {
        let config = south_america().to_config();
        assert_eq!(config.continents[0].name, "Africa");
        let brazil = config.countries.iter().find(|c| c.name == "Brazil").unwrap();
        assert_eq!(
            brazil.neighbours,
            vec!["Argentina", "North Africa", "Peru", "Venezuela"]
        );
    }
}
