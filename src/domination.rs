// domination.rs
//! Reading and writing of the "domination" `.map` text format.
//!
//! ```text
//! ; comment
//! [files]
//! pic world_pic.png
//!
//! name WORLD map
//!
//! [continents]
//! Asia 7
//!
//! [countries]
//! 1 Siam 1
//! 2 China 1
//!
//! [borders]
//! 1 2
//! 2 1
//! ```
//!
//! Countries refer to continents by their 1-based position in the
//! `[continents]` section, borders refer to countries by their number.
use crate::error::MapFileError;
use crate::map_config::{ContinentConfig, CountryConfig, MapConfig};
use itertools::Itertools;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;

const COMMENT_SYMBOL: &str = ";";

lazy_static! {
    static ref SECTION: Regex = Regex::new(r"^\[(?P<section>[A-Za-z]+)\]$").unwrap();
    static ref CONTINENT_ROW: Regex =
        Regex::new(r"^(?P<name>\S+)\s+(?P<value>\d+)(\s+.*)?$").unwrap();
    static ref COUNTRY_ROW: Regex =
        Regex::new(r"^(?P<number>\d+)\s+(?P<name>\S+)\s+(?P<continent>\d+)(\s+.*)?$").unwrap();
    static ref BORDER_ROW: Regex = Regex::new(r"^\d+(\s+\d+)*$").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Section {
    Preamble,
    Files,
    Continents,
    Countries,
    Borders,
    Unknown,
}

fn parse_error(line: usize, reason: impl Into<String>) -> MapFileError {
    MapFileError::Parse {
        line,
        reason: reason.into(),
    }
}

pub fn parse_map(data: &str) -> Result<MapConfig, MapFileError> {
    let mut config = MapConfig::default();
    let mut section = Section::Preamble;
    let mut country_index: HashMap<usize, usize> = HashMap::new();

    for (index, raw_line) in data.lines().enumerate() {
        let line_number = index + 1;
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with(COMMENT_SYMBOL) {
            continue;
        }

        if let Some(captures) = SECTION.captures(line) {
            section = match captures["section"].to_ascii_lowercase().as_str() {
                "files" => Section::Files,
                "continents" => Section::Continents,
                "countries" | "territories" => Section::Countries,
                "borders" => Section::Borders,
                _ => Section::Unknown,
            };
            continue;
        }

        match section {
            Section::Preamble | Section::Files | Section::Unknown => {}
            Section::Continents => {
                let captures = CONTINENT_ROW
                    .captures(line)
                    .ok_or_else(|| parse_error(line_number, "expected \"<name> <value>\""))?;
                let value = captures["value"]
                    .parse::<u32>()
                    .map_err(|e| parse_error(line_number, e.to_string()))?;
                config.continents.push(ContinentConfig {
                    name: captures["name"].to_string(),
                    value,
                });
            }
            Section::Countries => {
                let captures = COUNTRY_ROW.captures(line).ok_or_else(|| {
                    parse_error(line_number, "expected \"<number> <name> <continent>\"")
                })?;
                let number = captures["number"]
                    .parse::<usize>()
                    .map_err(|e| parse_error(line_number, e.to_string()))?;
                let continent_number = captures["continent"]
                    .parse::<usize>()
                    .map_err(|e| parse_error(line_number, e.to_string()))?;
                let continent = continent_number
                    .checked_sub(1)
                    .and_then(|i| config.continents.get(i))
                    .ok_or_else(|| {
                        parse_error(line_number, format!("no continent number {}", continent_number))
                    })?;
                if country_index.contains_key(&number) {
                    return Err(parse_error(
                        line_number,
                        format!("country number {} is used twice", number),
                    ));
                }
                country_index.insert(number, config.countries.len());
                config.countries.push(CountryConfig {
                    name: captures["name"].to_string(),
                    continent: continent.name.clone(),
                    neighbours: Vec::new(),
                });
            }
            Section::Borders => {
                if !BORDER_ROW.is_match(line) {
                    return Err(parse_error(line_number, "expected country numbers"));
                }
                let mut numbers = line.split_whitespace().map(|token| {
                    token
                        .parse::<usize>()
                        .map_err(|e| parse_error(line_number, e.to_string()))
                });
                let lookup = |number: usize| {
                    country_index.get(&number).copied().ok_or_else(|| {
                        parse_error(line_number, format!("no country number {}", number))
                    })
                };
                let Some(first) = numbers.next() else {
                    continue;
                };
                let country = lookup(first?)?;
                for number in numbers {
                    let neighbour = lookup(number?)?;
                    let neighbour_name = config.countries[neighbour].name.clone();
                    config.countries[country].neighbours.push(neighbour_name);
                }
            }
        }
    }

    Ok(config)
}

pub fn write_map(map_name: &str, config: &MapConfig) -> Result<String, MapFileError> {
    for name in config
        .continents
        .iter()
        .map(|c| &c.name)
        .chain(config.countries.iter().map(|c| &c.name))
    {
        if name.chars().any(char::is_whitespace) {
            return Err(MapFileError::Unrepresentable(name.clone()));
        }
    }

    let continents: Vec<&ContinentConfig> = config
        .continents
        .iter()
        .sorted_by(|a, b| a.name.cmp(&b.name))
        .collect();

    // Number countries continent by continent, by name inside a continent
    let mut numbered: Vec<(usize, usize, &CountryConfig)> = Vec::new();
    for (continent_position, continent) in continents.iter().enumerate() {
        for country in config
            .countries_in(&continent.name)
            .sorted_by(|a, b| a.name.cmp(&b.name))
        {
            numbered.push((numbered.len() + 1, continent_position + 1, country));
        }
    }
    let numbers: HashMap<&str, usize> = numbered
        .iter()
        .map(|(number, _, country)| (country.name.as_str(), *number))
        .collect();

    let mut out = String::new();
    let mut line = |text: String| {
        out.push_str(&text);
        out.push('\n');
    };

    line(format!("{} RISK MAP", COMMENT_SYMBOL));
    line(format!("{} Conquerdia Map Editor", COMMENT_SYMBOL));
    line(String::new());
    line("[files]".to_string());
    line(format!("pic {}_pic.png", map_name));
    line(format!("map {}_map.gif", map_name));
    line("crd card.cards".to_string());
    line(format!("prv {}.jpg", map_name));
    line(String::new());
    line(format!("name {} map", map_name.to_uppercase()));
    line(String::new());
    line("[continents]".to_string());
    for continent in &continents {
        line(format!("{} {}", continent.name, continent.value));
    }
    line(String::new());
    line("[countries]".to_string());
    for (number, continent_number, country) in &numbered {
        line(format!("{} {} {}", number, country.name, continent_number));
    }
    line(String::new());
    line("[borders]".to_string());
    for (number, _, country) in &numbered {
        let neighbours = country
            .neighbours
            .iter()
            .filter_map(|name| numbers.get(name.as_str()))
            .sorted()
            .join(" ");
        if neighbours.is_empty() {
            line(number.to_string());
        } else {
            line(format!("{} {}", number, neighbours));
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL_MAP: &str = "\
; RISK MAP
[files]
pic small_pic.png

name SMALL map

[continents]
Asia 7 yellow
Europe 5

[countries]
1 Siam 1 120 40
2 China 1
3 Ukraine 2

[borders]
1 2
2 1 3
3 2
";

    #[test]
    fn parses_sections_and_resolves_numbers() {
        let config = parse_map(SMALL_MAP).unwrap();

        assert_eq!(config.continents.len(), 2);
        assert_eq!(config.continents[1].name, "Europe");
        assert_eq!(config.continents[1].value, 5);

        let ukraine = &config.countries[2];
        assert_eq!(ukraine.name, "Ukraine");
        assert_eq!(ukraine.continent, "Europe");
        assert_eq!(ukraine.neighbours, vec!["China".to_string()]);
        assert_eq!(config.countries[1].neighbours.len(), 2);
    }

    #[test]
    fn reports_the_offending_line() {
        let data = "[continents]\nAsia 7\n[countries]\n1 Siam 4\n";
        match parse_map(data) {
            Err(MapFileError::Parse { line, reason }) => {
                assert_eq!(line, 4);
                assert!(reason.contains("continent number 4"));
            }
            other => panic!("expected a parse error, got {:?}", other),
        }

        let data = "[continents]\nAsia 7\n[countries]\n1 Siam 1\n[borders]\n1 9\n";
        assert!(matches!(
            parse_map(data),
            Err(MapFileError::Parse { line: 6, .. })
        ));

        assert!(matches!(
            parse_map("[continents]\nAsia seven\n"),
            Err(MapFileError::Parse { line: 2, .. })
        ));
    }

    #[test]
    fn written_map_parses_back() {
        let config = parse_map(SMALL_MAP).unwrap();
        let text = write_map("small", &config).unwrap();
        assert!(text.contains("name SMALL map"));
        assert!(text.contains("[countries]\n1 China 1\n2 Siam 1\n3 Ukraine 2\n"));
        assert!(text.contains("[borders]\n1 2 3\n2 1\n3 1\n"));

        let mut reread = parse_map(&text).unwrap();
        reread.countries.sort_by(|a, b| a.name.cmp(&b.name));
        let mut expected = config;
        expected.countries.sort_by(|a, b| a.name.cmp(&b.name));
        assert_eq!(reread, expected);
    }

    #[test]
    fn rejects_names_with_whitespace() {
        let config = MapConfig {
            continents: vec![ContinentConfig {
                name: "North America".to_string(),
                value: 5,
            }],
            countries: vec![],
        };
        assert!(matches!(
            write_map("world", &config),
            Err(MapFileError::Unrepresentable(name)) if name == "North America"
        ));
    }
}
