// continent.rs
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A named group of countries worth `value` points to whoever holds all of it.
///
/// Membership only; the countries themselves live in the `WorldMap`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Continent {
    name: String,
    value: u32,
    countries: HashSet<String>,
}

impl Continent {
    pub fn new(name: &str, value: u32) -> Self {
        Self {
            name: name.to_string(),
            value,
            countries: HashSet::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    pub fn countries(&self) -> &HashSet<String> {
        &self.countries
    }

    pub fn contains(&self, country: &str) -> bool {
        self.countries.contains(country)
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }

    // The country's back-reference is the caller's job.
    pub(crate) fn add_country(&mut self, country: &str) {
        self.countries.insert(country.to_string());
    }

    pub(crate) fn remove_country(&mut self, country: &str) -> bool {
        self.countries.remove(country)
    }
}
