//! KE-001: Core types: fragments, parsed file names, mappings, typed resources.
//!
//! Fragments are the generic decoding of one descriptor file. Enrichment turns
//! them into [`KubernetesResource`] values, which derive Serialize/Deserialize so
//! the enriched list can be written back out as YAML or JSON.

use super::versioning::ResourceVersioning;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

// ============================================================================
// Top-level kenrich.yaml
// ============================================================================

/// Project configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KenrichConfig {
    /// Schema version (must be "1.0")
    pub version: String,

    /// Application name, used as metadata.name when a file name carries none
    pub name: String,

    /// Optional description
    #[serde(default)]
    pub description: Option<String>,

    /// Directory holding the resource fragments
    #[serde(default = "default_resource_dir")]
    pub resource_dir: String,

    /// Extra kind ↔ filename mappings, upserted over the built-in catalog
    #[serde(default)]
    pub mappings: Vec<MappingConfig>,

    /// API versions per group, plus per-kind overrides
    #[serde(default)]
    pub api_versions: ResourceVersioning,
}

fn default_resource_dir() -> String {
    "src/main/jkube".to_string()
}

// ============================================================================
// Fragments
// ============================================================================

/// One resource descriptor prior to typed conversion (insertion ordered).
pub type Fragment = IndexMap<String, serde_yaml_ng::Value>;

/// Name and optional type token decoded from a fragment's file name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedFilename {
    /// Resource name; `None` once the name has been reinterpreted as a type token
    pub name: Option<String>,

    /// Explicit `-<type>` segment, if any
    pub type_token: Option<String>,
}

// ============================================================================
// Kind ↔ filename mappings
// ============================================================================

/// A kind together with the filename tokens that select it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingEntry {
    pub kind: String,
    pub tokens: Vec<String>,
}

impl MappingEntry {
    pub fn new<K, I, T>(kind: K, tokens: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            kind: kind.into(),
            tokens: tokens.into_iter().map(Into::into).collect(),
        }
    }

    /// A mapping needs a kind and at least one non-blank token.
    pub fn is_valid(&self) -> bool {
        !self.kind.trim().is_empty() && self.tokens.iter().any(|t| !t.trim().is_empty())
    }
}

/// Mapping as written in kenrich.yaml: tokens are a comma-separated string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingConfig {
    /// Resource kind (e.g. "Deployment")
    #[serde(default)]
    pub kind: String,

    /// Comma-separated filename types (e.g. "deploy, dep")
    #[serde(default)]
    pub filename_types: String,
}

impl MappingConfig {
    pub fn is_valid(&self) -> bool {
        !self.kind.trim().is_empty() && !self.filenames().is_empty()
    }

    /// Split `filename_types` on commas, trimming and dropping empty pieces.
    pub fn filenames(&self) -> Vec<String> {
        self.filename_types
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn to_entry(&self) -> MappingEntry {
        MappingEntry::new(self.kind.trim(), self.filenames())
    }
}

// ============================================================================
// Typed resources
// ============================================================================

/// Standard object metadata. Unknown keys are kept in `extra`.
///
/// Scalar numbers and booleans in the string fields are accepted and
/// stringified (`labels: {version: 1}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectMeta {
    #[serde(deserialize_with = "scalar::string")]
    pub name: String,

    #[serde(
        default,
        deserialize_with = "scalar::optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub namespace: Option<String>,

    #[serde(
        default,
        deserialize_with = "scalar::map",
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub labels: IndexMap<String, String>,

    #[serde(
        default,
        deserialize_with = "scalar::map",
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub annotations: IndexMap<String, String>,

    #[serde(flatten)]
    pub extra: IndexMap<String, serde_yaml_ng::Value>,
}

impl ObjectMeta {
    /// Build metadata from a decoded mapping without going through serde's
    /// flatten buffering, so tagged values in `extra` survive.
    pub fn from_mapping(map: serde_yaml_ng::Mapping) -> Result<Self, String> {
        let mut name = None;
        let mut namespace = None;
        let mut labels = IndexMap::new();
        let mut annotations = IndexMap::new();
        let mut extra = IndexMap::new();

        for (key, value) in map {
            let key = yaml_value_to_string(&key);
            match key.as_str() {
                "name" => name = Some(scalar_field("metadata.name", &value)?),
                "namespace" => namespace = scalar_optional("metadata.namespace", &value)?,
                "labels" => labels = scalar_map("metadata.labels", value)?,
                "annotations" => annotations = scalar_map("metadata.annotations", value)?,
                _ => {
                    extra.insert(key, value);
                }
            }
        }

        Ok(Self {
            name: name.ok_or_else(|| "missing field `name` in metadata".to_string())?,
            namespace,
            labels,
            annotations,
            extra,
        })
    }
}

/// String form of a scalar value; `None` for null, sequences, mappings and tags.
pub fn scalar_to_string(val: &serde_yaml_ng::Value) -> Option<String> {
    match val {
        serde_yaml_ng::Value::String(_)
        | serde_yaml_ng::Value::Number(_)
        | serde_yaml_ng::Value::Bool(_) => Some(yaml_value_to_string(val)),
        _ => None,
    }
}

fn scalar_field(field: &str, val: &serde_yaml_ng::Value) -> Result<String, String> {
    scalar_to_string(val)
        .ok_or_else(|| format!("{} must be a scalar, found a {}", field, yaml_shape(val)))
}

fn scalar_optional(field: &str, val: &serde_yaml_ng::Value) -> Result<Option<String>, String> {
    match val {
        serde_yaml_ng::Value::Null => Ok(None),
        other => scalar_field(field, other).map(Some),
    }
}

fn scalar_map(
    field: &str,
    val: serde_yaml_ng::Value,
) -> Result<IndexMap<String, String>, String> {
    match val {
        serde_yaml_ng::Value::Null => Ok(IndexMap::new()),
        serde_yaml_ng::Value::Mapping(map) => map
            .into_iter()
            .map(|(k, v)| {
                let key = yaml_value_to_string(&k);
                let value = scalar_field(&format!("{}.{}", field, key), &v)?;
                Ok((key, value))
            })
            .collect(),
        other => Err(format!("{} must be a mapping, found a {}", field, yaml_shape(&other))),
    }
}

/// `deserialize_with` adapters for the stringified metadata fields.
mod scalar {
    use indexmap::IndexMap;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};
    use serde_yaml_ng::Value;

    pub fn string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        let val = Value::deserialize(d)?;
        super::scalar_field("metadata.name", &val).map_err(D::Error::custom)
    }

    pub fn optional<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        let val = Value::deserialize(d)?;
        super::scalar_optional("metadata.namespace", &val).map_err(D::Error::custom)
    }

    pub fn map<'de, D: Deserializer<'de>>(d: D) -> Result<IndexMap<String, String>, D::Error> {
        let val = Value::deserialize(d)?;
        super::scalar_map("metadata", val).map_err(D::Error::custom)
    }
}

/// A fully addressable resource: apiVersion, kind and metadata.name are known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KubernetesResource {
    /// Left unset when the API-version resolver knows nothing about the kind
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,

    pub kind: String,

    pub metadata: ObjectMeta,

    /// Everything else (spec, data, rules, ...)
    #[serde(flatten)]
    pub body: IndexMap<String, serde_yaml_ng::Value>,
}

impl KubernetesResource {
    pub fn name(&self) -> &str {
        &self.metadata.name
    }
}

/// Ordered collection of enriched resources, serialized as a `v1/List`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KubernetesList {
    pub api_version: String,
    pub kind: String,
    #[serde(default)]
    pub items: Vec<KubernetesResource>,
}

impl Default for KubernetesList {
    fn default() -> Self {
        Self {
            api_version: "v1".to_string(),
            kind: "List".to_string(),
            items: Vec::new(),
        }
    }
}

impl KubernetesList {
    pub fn push(&mut self, resource: KubernetesResource) {
        self.items.push(resource);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, KubernetesResource> {
        self.items.iter()
    }
}

// ============================================================================
// Value helpers
// ============================================================================

/// Convert a serde_yaml_ng::Value to a string (used for non-string mapping keys).
pub fn yaml_value_to_string(val: &serde_yaml_ng::Value) -> String {
    match val {
        serde_yaml_ng::Value::String(s) => s.clone(),
        serde_yaml_ng::Value::Number(n) => n.to_string(),
        serde_yaml_ng::Value::Bool(b) => b.to_string(),
        serde_yaml_ng::Value::Null => String::new(),
        other => format!("{:?}", other),
    }
}

/// Short name of a value's shape, for diagnostics.
pub fn yaml_shape(val: &serde_yaml_ng::Value) -> &'static str {
    match val {
        serde_yaml_ng::Value::Null => "null",
        serde_yaml_ng::Value::Bool(_) => "bool",
        serde_yaml_ng::Value::Number(_) => "number",
        serde_yaml_ng::Value::String(_) => "string",
        serde_yaml_ng::Value::Sequence(_) => "sequence",
        serde_yaml_ng::Value::Mapping(_) => "mapping",
        serde_yaml_ng::Value::Tagged(_) => "tagged",
    }
}

// ============================================================================
// Tests
// ============================================================================
