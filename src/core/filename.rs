//! KE-004: Fragment file name grammar.
//!
//! `<name>[-<type>].(yaml|yml|json)`. The name is matched lazily, so the type
//! is always the last dash-separated segment: `my-app-svc.yaml` yields name
//! `my-app` and type `svc`. Extensions are case-sensitive.

use super::error::{EnrichError, Result};
use super::types::ParsedFilename;
use regex::Regex;
use std::sync::LazyLock;

static FILENAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<name>.*?)(?:-(?P<type>[^-]+))?\.(?:yaml|yml|json)$")
        .expect("filename pattern is a valid regex")
});

/// Split a base file name into resource name and optional type token.
pub fn parse_filename(file_name: &str) -> Result<ParsedFilename> {
    let captures = FILENAME_PATTERN
        .captures(file_name)
        .ok_or_else(|| EnrichError::NameFormat {
            file: file_name.to_string(),
        })?;

    Ok(ParsedFilename {
        name: captures.name("name").map(|m| m.as_str().to_string()),
        type_token: captures.name("type").map(|m| m.as_str().to_string()),
    })
}
