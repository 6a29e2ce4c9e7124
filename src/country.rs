// country.rs
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A node of the map graph.
///
/// Neighbour edges are stored one direction at a time; `WorldMap` pairs the
/// calls so every edge is stored on both ends.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Country {
    name: String,
    continent: String,
    neighbours: HashSet<String>,
    armies: u16,
    owner: Option<String>,
}

impl Country {
    pub fn new(name: &str, continent: &str) -> Self {
        Self {
            name: name.to_string(),
            continent: continent.to_string(),
            neighbours: HashSet::new(),
            armies: 0,
            owner: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn continent(&self) -> &str {
        &self.continent
    }

    pub fn neighbours(&self) -> &HashSet<String> {
        &self.neighbours
    }

    pub fn is_adjacent_to(&self, country: &str) -> bool {
        self.neighbours.contains(country)
    }

    pub fn armies(&self) -> u16 {
        self.armies
    }

    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    pub fn place_armies(&mut self, num_armies: u16) {
        self.armies = self.armies.saturating_add(num_armies);
    }

    pub fn remove_armies(&mut self, num_armies: u16) {
        self.armies = self.armies.saturating_sub(num_armies);
    }

    pub fn set_owner(&mut self, owner: Option<String>) {
        self.owner = owner;
    }

    pub(crate) fn add_neighbour(&mut self, neighbour: &str) {
        if neighbour != self.name {
            self.neighbours.insert(neighbour.to_string());
        }
    }

    pub(crate) fn remove_neighbour(&mut self, neighbour: &str) -> bool {
        self.neighbours.remove(neighbour)
    }
}
