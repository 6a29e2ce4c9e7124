// error.rs
use crate::map_validation::ValidationReport;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Business-rule failures of map operations. The `Display` text is the
/// message shown to the user.
#[derive(Debug, Error)]
pub enum MapError {
    #[error("Continent name is not valid!")]
    InvalidContinentName,
    #[error("Country name is not valid!")]
    InvalidCountryName,
    #[error("Continent value is not valid!")]
    InvalidContinentValue,
    #[error("Continent with name \"{0}\" already exists.")]
    ContinentExists(String),
    #[error("Country with name \"{0}\" already exists.")]
    CountryExists(String),
    #[error("Continent with name \"{0}\" is not found.")]
    ContinentNotFound(String),
    #[error("Country with name \"{0}\" is not found.")]
    CountryNotFound(String),
    #[error("Country \"{0}\" cannot be a neighbour of itself.")]
    SelfNeighbour(String),
    #[error("Map with file name \"{0}\" is not found!")]
    MapFileNotFound(String),
    #[error("Map with file name \"{file}\" could not be read: {reason}")]
    CorruptMapFile { file: String, reason: String },
    #[error("There is no map to {0}. Use \"editmap filename\" command to load or create a map.")]
    NoMapTo(&'static str),
    #[error("{0}")]
    InvalidMap(ValidationReport),
    #[error(transparent)]
    File(#[from] MapFileError),
}

/// Failures of the map file reader/writer.
#[derive(Debug, Error)]
pub enum MapFileError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("line {line}: {reason}")]
    Parse { line: usize, reason: String },
    #[error("\"{0}\" contains whitespace and cannot be written to a .map file")]
    Unrepresentable(String),
    #[error("\"{0}\" is not a file name inside the map directory")]
    OutsideMapDirectory(String),
}

/// Successful result of a map operation.
///
/// `Unchanged` marks a redundant request (an edge that already exists, or one
/// that does not) which left the map as it was.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Applied(String),
    Unchanged(String),
}

impl Outcome {
    pub fn message(&self) -> &str {
        match self {
            Outcome::Applied(message) | Outcome::Unchanged(message) => message,
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied(_))
    }

    pub fn into_message(self) -> String {
        match self {
            Outcome::Applied(message) | Outcome::Unchanged(message) => message,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

pub type MapResult = Result<Outcome, MapError>;

/// Failures collected from a compound command. One failing step never stops
/// the remaining steps; `completed` keeps the messages of the steps that went
/// through.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrors {
    errors: Vec<String>,
    completed: Vec<String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_validation_error(&mut self, error: impl fmt::Display) {
        self.errors.push(format!("Validation Error! {}", error));
    }

    pub fn add_completed(&mut self, message: String) {
        self.completed.push(message);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn completed(&self) -> &[String] {
        &self.completed
    }

    pub fn into_parts(self) -> (Vec<String>, Vec<String>) {
        (self.completed, self.errors)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.errors.join("\n"))
    }
}

impl std::error::Error for ValidationErrors {}
