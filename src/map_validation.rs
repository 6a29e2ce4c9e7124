// map_validation.rs
use crate::world_map::WorldMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Result of checking the two playability rules of a map. Both rules are
/// always evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub connected_graph: bool,
    pub connected_sub_graph: bool,
    pub disconnected_continents: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.connected_graph && self.connected_sub_graph
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            writeln!(f, "Map is Valid:")?;
            writeln!(f, "1.Map is a connected Graph")?;
            return writeln!(f, "2.Every continent is a connected subgraph in the Map");
        }
        writeln!(f, "Map is not Valid:")?;
        if !self.connected_graph {
            writeln!(f, "worldMap is not a connected graph.")?;
        }
        if !self.connected_sub_graph {
            writeln!(
                f,
                "All the continents in the worldMap are not connected subgraphs of worldMap."
            )?;
            writeln!(
                f,
                "Disconnected continents: {}",
                self.disconnected_continents.join(", ")
            )?;
        }
        Ok(())
    }
}

/// Checks that the whole map is one connected graph and that every continent,
/// taken on its own, is connected too.
pub fn validate(map: &WorldMap) -> ValidationReport {
    let all_countries: HashSet<&str> = map.countries().map(|c| c.name()).collect();
    let connected_graph = is_connected(map, &all_countries);

    let disconnected_continents: Vec<String> = map
        .continents()
        .filter(|continent| {
            let members: HashSet<&str> =
                continent.countries().iter().map(String::as_str).collect();
            !is_connected(map, &members)
        })
        .map(|continent| continent.name().to_string())
        .sorted()
        .collect();

    ValidationReport {
        connected_graph,
        connected_sub_graph: disconnected_continents.is_empty(),
        disconnected_continents,
    }
}

/// True when every country of `candidates` is reachable from any other one
/// without leaving `candidates`. An empty set is connected.
pub fn is_connected(map: &WorldMap, candidates: &HashSet<&str>) -> bool {
    let Some(&start) = candidates.iter().next() else {
        return true;
    };
    reachable_within(map, start, candidates).len() == candidates.len()
}

/// Countries reachable from `start` through edges whose both ends are in
/// `candidates`.
pub fn reachable_within<'a>(
    map: &'a WorldMap,
    start: &'a str,
    candidates: &HashSet<&str>,
) -> HashSet<&'a str> {
    let mut visited = HashSet::new();
    let mut stack = vec![start];

    while let Some(current) = stack.pop() {
        if !visited.insert(current) {
            continue;
        }
        if let Some(country) = map.get_country(current) {
            for adjacent in country.neighbours() {
                let adjacent = adjacent.as_str();
                if candidates.contains(adjacent) && !visited.contains(adjacent) {
                    stack.push(adjacent);
                }
            }
        }
    }

    visited
}
