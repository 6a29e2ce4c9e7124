// lib.rs
pub mod command;
pub mod continent;
pub mod country;
pub mod domination;
pub mod error;
pub mod map_config;
pub mod map_formatter;
pub mod map_io;
pub mod map_phase;
pub mod map_validation;
pub mod settings;
pub mod world_map;
