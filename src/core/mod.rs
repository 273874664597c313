//! Core enrichment logic: types, mappings, file name grammar, enrichment, list building.

pub mod discovery;
pub mod enricher;
pub mod error;
pub mod filename;
pub mod fragments;
pub mod mapping;
pub mod parser;
pub mod types;
pub mod versioning;
