//! KE-007: Reading resource fragment files into an enriched resource list.
//!
//! Per file, in input order: skip excluded names, parse the file name, decode
//! the content, enrich it and convert it into a [`KubernetesResource`]. The
//! first error aborts the whole list.

use super::enricher::Enricher;
use super::error::{EnrichError, Result};
use super::filename::parse_filename;
use super::mapping::MappingRegistry;
use super::types::{
    scalar_to_string, yaml_shape, yaml_value_to_string, Fragment, KubernetesList,
    KubernetesResource, ObjectMeta,
};
use super::versioning::ApiVersions;
use serde::Deserialize;
use serde_yaml_ng::Value;
use std::path::Path;

/// File name suffixes (compared lower-cased) that are never resource fragments.
pub const EXCLUDED_SUFFIXES: &[&str] = &[".helm.yaml", ".helm.yml"];

/// True when a file name ends with one of [`EXCLUDED_SUFFIXES`].
pub fn is_excluded(file_name: &str) -> bool {
    let lower = file_name.to_lowercase();
    EXCLUDED_SUFFIXES.iter().any(|s| lower.ends_with(s))
}

/// Read all fragment files and build the enriched list.
///
/// `default_name` is used as metadata.name for fragments whose file name
/// carries no explicit name (`dc.yaml`, `-svc.yaml`).
pub fn build_resource_list<P: AsRef<Path>>(
    registry: &MappingRegistry,
    api_versions: &dyn ApiVersions,
    default_name: &str,
    files: &[P],
) -> Result<KubernetesList> {
    let enricher = Enricher::new(registry, api_versions, default_name);
    let mut list = KubernetesList::default();
    let mut skipped = 0usize;

    for file in files {
        let path = file.as_ref();
        if is_excluded(&file_name(path)) {
            tracing::debug!(file = %path.display(), "skipping excluded fragment");
            skipped += 1;
            continue;
        }
        list.push(read_resource(&enricher, path)?);
    }

    tracing::info!(
        resources = list.len(),
        skipped,
        "built resource list"
    );
    Ok(list)
}

/// Read, enrich and convert a single fragment file.
pub fn read_resource(enricher: &Enricher<'_>, path: &Path) -> Result<KubernetesResource> {
    let name = file_name(path);
    let parsed = parse_filename(&name)?;
    let fragment = read_fragment(path)?;
    let enriched = enricher.enrich(&name, parsed, fragment)?;
    to_resource(&path.display().to_string(), enriched)
}

/// Decode a fragment file; `.json` files use JSON, everything else YAML.
pub fn read_fragment(path: &Path) -> Result<Fragment> {
    let content = std::fs::read_to_string(path).map_err(|source| EnrichError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    decode_fragment(&file_name(path), &content, is_json)
}

/// Decode fragment text. An empty document yields an empty fragment.
///
/// Only the first document of a multi-document YAML stream is read.
pub fn decode_fragment(file: &str, content: &str, is_json: bool) -> Result<Fragment> {
    let decode_err = |reason: String| EnrichError::Decode {
        file: file.to_string(),
        reason,
    };

    if content.trim().is_empty() {
        return Ok(Fragment::new());
    }
    let value: Value = if is_json {
        serde_json::from_str(content).map_err(|e| decode_err(e.to_string()))?
    } else {
        match serde_yaml_ng::Deserializer::from_str(content).next() {
            Some(document) => Value::deserialize(document).map_err(|e| decode_err(e.to_string()))?,
            None => Value::Null,
        }
    };

    match value {
        Value::Null => Ok(Fragment::new()),
        Value::Mapping(map) => Ok(map
            .into_iter()
            .map(|(k, v)| (yaml_value_to_string(&k), v))
            .collect()),
        other => Err(decode_err(format!(
            "expected a mapping at the top level, found a {}",
            yaml_shape(&other)
        ))),
    }
}

/// Convert an enriched fragment into a typed resource.
///
/// apiVersion, kind and metadata are taken out; every other key stays in the
/// body untouched and in order.
pub fn to_resource(file: &str, mut fragment: Fragment) -> Result<KubernetesResource> {
    let invalid = |reason: String| EnrichError::InvalidFragmentSyntax {
        file: file.to_string(),
        reason,
    };

    let api_version = match fragment.shift_remove("apiVersion") {
        None | Some(Value::Null) => None,
        Some(v) => Some(scalar_to_string(&v).ok_or_else(|| {
            invalid(format!("apiVersion must be a string, found a {}", yaml_shape(&v)))
        })?),
    };
    let kind = match fragment.shift_remove("kind") {
        Some(Value::String(kind)) => kind,
        other => {
            let found = other.as_ref().map_or("null", yaml_shape);
            return Err(invalid(format!("kind must be a string, found a {}", found)));
        }
    };
    let metadata = match fragment.shift_remove("metadata") {
        Some(Value::Mapping(map)) => ObjectMeta::from_mapping(map).map_err(invalid)?,
        other => {
            let found = other.as_ref().map_or("null", yaml_shape);
            return Err(invalid(format!("metadata must be a mapping, found a {}", found)));
        }
    };

    Ok(KubernetesResource {
        api_version,
        kind,
        metadata,
        body: fragment,
    })
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
