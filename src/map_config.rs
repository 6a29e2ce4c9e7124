use serde::{Deserialize, Serialize};

/// Format-neutral description of a map, exchanged with the map readers and
/// writers. Adjacency is listed by name on each country.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MapConfig {
    pub continents: Vec<ContinentConfig>,
    pub countries: Vec<CountryConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContinentConfig {
    pub name: String,
    pub value: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CountryConfig {
    pub name: String,
    pub continent: String,
    #[serde(default)]
    pub neighbours: Vec<String>,
}

impl MapConfig {
    pub fn from_json_str(data: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(data)
    }

    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn countries_in<'a>(&'a self, continent: &'a str) -> impl Iterator<Item = &'a CountryConfig> {
        self.countries.iter().filter(move |c| c.continent == continent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neighbours_default_to_empty() {
        let config = MapConfig::from_json_str(
            r#"{
                "continents": [{ "name": "Oceania", "value": 2 }],
                "countries": [
                    { "name": "Siam", "continent": "Oceania" },
                    { "name": "Indonesia", "continent": "Oceania", "neighbours": ["Siam"] }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(config.continents[0].value, 2);
        assert!(config.countries[0].neighbours.is_empty());
        assert_eq!(config.countries_in("Oceania").count(), 2);
        assert_eq!(config.countries_in("Asia").count(), 0);
    }
}
