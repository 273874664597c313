//! KE-002: Enrichment errors.
//!
//! Every variant aborts processing of the current file and, through
//! [`build_resource_list`](super::fragments::build_resource_list), the whole
//! list. Messages name the offending file and the violated constraint.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading, enriching or converting resource fragments.
#[derive(Error, Debug)]
pub enum EnrichError {
    /// Malformed kind ↔ filename mapping.
    #[error("invalid mapping for kind '{kind}' and filename types {tokens:?}")]
    Configuration { kind: String, tokens: Vec<String> },

    /// File name does not follow `<name>[-<type>].<ext>`.
    #[error("resource file name '{file}' does not match pattern <name>-<type>.(yaml|yml|json)")]
    NameFormat { file: String },

    /// Explicit type token is not registered.
    #[error("unknown type '{token}' for file {file}. Must be one of: {}", .known.join(", "))]
    UnknownType {
        file: String,
        token: String,
        known: Vec<String>,
    },

    /// Neither the file name nor the fragment provides a kind.
    #[error(
        "no type given as part of the file name (e.g. 'app-rc.yml') and no 'kind' defined in resource descriptor {file}"
    )]
    MissingKind { file: String },

    /// `metadata` exists but is not a mapping.
    #[error("metadata in {file} is expected to be a mapping, not a {found}")]
    InvalidMetadataType { file: String, found: &'static str },

    /// Typed conversion rejected the enriched fragment.
    #[error("resource fragment {file} has an invalid syntax ({reason})")]
    InvalidFragmentSyntax { file: String, reason: String },

    /// Fragment file could not be read.
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Fragment file is not a decodable mapping.
    #[error("cannot decode resource fragment {file}: {reason}")]
    Decode { file: String, reason: String },

    /// Built-in mapping catalog could not be loaded.
    #[error("invalid built-in mapping catalog: {0}")]
    Catalog(String),
}

/// Result alias for enrichment operations.
pub type Result<T> = std::result::Result<T, EnrichError>;
