// map_formatter.rs
use crate::country::Country;
use crate::world_map::WorldMap;
use itertools::Itertools;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatType {
    /// Countries with their neighbours.
    Default,
    /// Adds armies and owner of every country.
    Detail,
}

/// Renders the map as text, one table per continent.
pub struct MapFormatter<'a> {
    map: &'a WorldMap,
}

impl<'a> MapFormatter<'a> {
    pub fn new(map: &'a WorldMap) -> Self {
        Self { map }
    }

    pub fn format(&self, format_type: FormatType) -> String {
        let name_width = self
            .map
            .countries()
            .map(|c| c.name().chars().count())
            .chain(std::iter::once("Country".len()))
            .max()
            .unwrap_or_default();
        let owner_width = self
            .map
            .countries()
            .map(|c| c.owner().map_or(1, |owner| owner.chars().count()))
            .chain(std::iter::once("Owner".len()))
            .max()
            .unwrap_or_default();

        let mut out = String::new();
        for continent in self.map.continents().sorted_by(|a, b| a.name().cmp(b.name())) {
            out.push_str(&format!("{} ({})\n", continent.name(), continent.value()));
            if continent.is_empty() {
                out.push_str("  (no countries)\n\n");
                continue;
            }

            let header = match format_type {
                FormatType::Default => format!("{:<name_width$}| Neighbours", "Country"),
                FormatType::Detail => format!(
                    "{:<name_width$}| {:<6}| {:<owner_width$}| Neighbours",
                    "Country", "Armies", "Owner"
                ),
            };
            out.push_str(&header);
            out.push('\n');

            let countries = continent
                .countries()
                .iter()
                .filter_map(|name| self.map.get_country(name))
                .sorted_by(|a, b| a.name().cmp(b.name()));
            for country in countries {
                let row = match format_type {
                    FormatType::Default => {
                        format!("{:<name_width$}| {}", country.name(), neighbours(country))
                    }
                    FormatType::Detail => format!(
                        "{:<name_width$}| {:<6}| {:<owner_width$}| {}",
                        country.name(),
                        country.armies(),
                        country.owner().unwrap_or("-"),
                        neighbours(country)
                    ),
                };
                out.push_str(row.trim_end());
                out.push('\n');
            }
            out.push('\n');
        }
        out
    }
}

fn neighbours(country: &Country) -> String {
    country.neighbours().iter().sorted().join(", ")
}
