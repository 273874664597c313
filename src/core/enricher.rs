//! KE-006: Fragment enrichment: kind, apiVersion and metadata.name.
//!
//! Kind precedence:
//! 1. explicit `-<type>` segment of the file name (must be registered)
//! 2. the bare name reinterpreted as a type token (`dc.yaml`), which clears the name
//! 3. the fragment's own `kind`
//!
//! Values already present in the fragment are never overwritten. A key bound
//! to `null` counts as absent.

use super::error::{EnrichError, Result};
use super::mapping::MappingRegistry;
use super::types::{yaml_shape, Fragment, ParsedFilename};
use super::versioning::ApiVersions;
use serde_yaml_ng::{Mapping, Value};

/// Fills in missing identity fields of fragments.
pub struct Enricher<'a> {
    registry: &'a MappingRegistry,
    api_versions: &'a dyn ApiVersions,
    app_name: &'a str,
}

impl<'a> Enricher<'a> {
    /// `app_name` becomes the resource name when the file name carries none.
    pub fn new(
        registry: &'a MappingRegistry,
        api_versions: &'a dyn ApiVersions,
        app_name: &'a str,
    ) -> Self {
        Self {
            registry,
            api_versions,
            app_name,
        }
    }

    pub fn enrich(
        &self,
        file_name: &str,
        parsed: ParsedFilename,
        mut fragment: Fragment,
    ) -> Result<Fragment> {
        let ParsedFilename {
            mut name,
            type_token,
        } = parsed;

        let kind = match type_token {
            Some(ref token) => Some(self.registry.kind_for_type(file_name, token)?),
            None => {
                let as_type = name
                    .as_deref()
                    .and_then(|n| self.registry.resolve_kind_by_token(n));
                if as_type.is_some() {
                    // The name was really a type token; no explicit name given.
                    name = None;
                }
                as_type
            }
        };

        add_kind(&mut fragment, kind, file_name)?;

        let declared_kind = fragment
            .get("kind")
            .and_then(Value::as_str)
            .map(str::to_string);
        if let Some(version) = declared_kind.and_then(|k| self.api_versions.for_kind(&k)) {
            put_if_absent(&mut fragment, "apiVersion", Value::String(version));
        }

        let resource_name = match name {
            Some(n) if !n.trim().is_empty() => n,
            _ => self.app_name.to_string(),
        };
        let metadata = metadata_mut(&mut fragment, file_name)?;
        if metadata.get("name").is_none_or(Value::is_null) {
            metadata.insert(Value::String("name".to_string()), Value::String(resource_name));
        }

        let kind = fragment
            .get("kind")
            .and_then(Value::as_str)
            .unwrap_or_default();
        tracing::debug!(file = file_name, kind, "enriched fragment");
        Ok(fragment)
    }
}

fn is_absent(fragment: &Fragment, key: &str) -> bool {
    fragment.get(key).is_none_or(Value::is_null)
}

fn put_if_absent(fragment: &mut Fragment, key: &str, value: Value) {
    if is_absent(fragment, key) {
        fragment.insert(key.to_string(), value);
    }
}

fn add_kind(fragment: &mut Fragment, kind: Option<String>, file_name: &str) -> Result<()> {
    match kind {
        Some(kind) => {
            put_if_absent(fragment, "kind", Value::String(kind));
            Ok(())
        }
        None if is_absent(fragment, "kind") => Err(EnrichError::MissingKind {
            file: file_name.to_string(),
        }),
        None => Ok(()),
    }
}

/// The fragment's metadata mapping, created empty when missing.
fn metadata_mut<'f>(fragment: &'f mut Fragment, file_name: &str) -> Result<&'f mut Mapping> {
    if is_absent(fragment, "metadata") {
        fragment.insert("metadata".to_string(), Value::Mapping(Mapping::new()));
    }
    match fragment.get_mut("metadata") {
        Some(Value::Mapping(map)) => Ok(map),
        Some(other) => Err(EnrichError::InvalidMetadataType {
            file: file_name.to_string(),
            found: yaml_shape(other),
        }),
        None => Err(EnrichError::InvalidMetadataType {
            file: file_name.to_string(),
            found: "null",
        }),
    }
}
