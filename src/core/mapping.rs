//! KE-003: Kind ↔ filename token registry.
//!
//! Two indices are kept behind a single lock:
//! - token → kind, keyed by the lower-cased token (lookups are case-insensitive)
//! - kind → token, holding only the *last* token of the most recent upsert
//!
//! The registry is seeded from the embedded catalog, can be extended with
//! [`MappingRegistry::upsert`], and never shrinks.

use super::error::{EnrichError, Result};
use super::types::{MappingConfig, MappingEntry};
use indexmap::IndexMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard};

/// Embedded `kind: [tokens]` catalog.
const DEFAULT_MAPPINGS: &str = include_str!("default-mappings.yaml");

/// Suffix used by [`MappingRegistry::suffix_for_kind`] for unmapped kinds.
pub const DEFAULT_SUFFIX: &str = "cr";

#[derive(Debug, Default, Clone)]
struct Indices {
    token_to_kind: IndexMap<String, String>,
    kind_to_token: IndexMap<String, String>,
}

impl Indices {
    fn apply(&mut self, kind: &str, tokens: &[String]) {
        for token in tokens {
            self.token_to_kind
                .insert(token.to_lowercase(), kind.to_string());
        }
        if let Some(last) = tokens.last() {
            self.kind_to_token.insert(kind.to_string(), last.clone());
        }
    }

    fn known_tokens(&self) -> Vec<String> {
        let mut tokens: Vec<String> = self.token_to_kind.keys().cloned().collect();
        tokens.sort();
        tokens
    }
}

/// Thread-safe kind ↔ filename token table.
#[derive(Debug, Default)]
pub struct MappingRegistry {
    indices: RwLock<Indices>,
}

impl MappingRegistry {
    /// An empty registry (no built-in mappings).
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry seeded with the built-in catalog.
    pub fn with_defaults() -> Result<Self> {
        let registry = Self::new();
        registry.upsert(&load_default_mappings()?)?;
        Ok(registry)
    }

    fn read(&self) -> RwLockReadGuard<'_, Indices> {
        // Indices are only mutated after validation, so a poisoned lock still holds consistent data.
        self.indices.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add or replace mappings.
    ///
    /// The batch is validated before anything is written: one invalid entry
    /// rejects the whole batch. Within a batch, a later entry for the same kind
    /// replaces an earlier one.
    pub fn upsert(&self, entries: &[MappingEntry]) -> Result<()> {
        let mut batch: IndexMap<String, Vec<String>> = IndexMap::new();
        for entry in entries {
            if !entry.is_valid() {
                return Err(EnrichError::Configuration {
                    kind: entry.kind.clone(),
                    tokens: entry.tokens.clone(),
                });
            }
            let tokens = entry
                .tokens
                .iter()
                .map(|t| t.trim())
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect();
            batch.insert(entry.kind.trim().to_string(), tokens);
        }

        let mut indices = self
            .indices
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        for (kind, tokens) in &batch {
            indices.apply(kind, tokens);
        }
        tracing::debug!(kinds = batch.len(), "upserted kind mappings");
        Ok(())
    }

    /// Upsert mappings in their kenrich.yaml form.
    pub fn upsert_configs(&self, configs: &[MappingConfig]) -> Result<()> {
        let mut entries = Vec::with_capacity(configs.len());
        for config in configs {
            if !config.is_valid() {
                return Err(EnrichError::Configuration {
                    kind: config.kind.clone(),
                    tokens: config.filenames(),
                });
            }
            entries.push(config.to_entry());
        }
        self.upsert(&entries)
    }

    /// Case-insensitive token lookup.
    pub fn resolve_kind_by_token(&self, token: &str) -> Option<String> {
        self.read().token_to_kind.get(&token.to_lowercase()).cloned()
    }

    pub fn resolve_token_by_kind(&self, kind: &str) -> Option<String> {
        self.read().kind_to_token.get(kind).cloned()
    }

    /// Resolve an explicit type token from `file`, failing with the full
    /// token list when it is unknown.
    pub fn kind_for_type(&self, file: &str, token: &str) -> Result<String> {
        let indices = self.read();
        match indices.token_to_kind.get(&token.to_lowercase()) {
            Some(kind) => Ok(kind.clone()),
            None => Err(EnrichError::UnknownType {
                file: file.to_string(),
                token: token.to_string(),
                known: indices.known_tokens(),
            }),
        }
    }

    /// `<name>-<token>` for a kind, `<name>-cr` when the kind is unmapped.
    pub fn suffix_for_kind(&self, name: &str, kind: &str) -> String {
        let indices = self.read();
        let suffix = indices
            .kind_to_token
            .get(kind)
            .map(String::as_str)
            .unwrap_or(DEFAULT_SUFFIX);
        format!("{}-{}", name, suffix)
    }

    /// All registered tokens, sorted.
    pub fn known_tokens(&self) -> Vec<String> {
        self.read().known_tokens()
    }

    /// All `(token, kind)` pairs, sorted by token.
    pub fn entries(&self) -> Vec<(String, String)> {
        let mut entries: Vec<(String, String)> = self
            .read()
            .token_to_kind
            .iter()
            .map(|(t, k)| (t.clone(), k.clone()))
            .collect();
        entries.sort();
        entries
    }

    pub fn len(&self) -> usize {
        self.read().token_to_kind.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().token_to_kind.is_empty()
    }
}

/// Load the embedded catalog, preserving its order.
pub fn load_default_mappings() -> Result<Vec<MappingEntry>> {
    parse_mappings(DEFAULT_MAPPINGS)
}

/// Parse a `kind: [tokens]` YAML document into mapping entries.
pub fn parse_mappings(yaml: &str) -> Result<Vec<MappingEntry>> {
    let table: IndexMap<String, Vec<String>> =
        serde_yaml_ng::from_str(yaml).map_err(|e| EnrichError::Catalog(e.to_string()))?;
    Ok(table
        .into_iter()
        .map(|(kind, tokens)| MappingEntry { kind, tokens })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::Arc;

    #[test]
    fn test_ke003_defaults_load() {
        let entries = load_default_mappings().unwrap();
        assert!(entries.iter().all(MappingEntry::is_valid));
        assert!(entries.iter().any(|e| e.kind == "DeploymentConfig"));
    }

    #[test]
    fn test_ke003_defaults_resolve() {
        let reg = MappingRegistry::with_defaults().unwrap();
        assert_eq!(reg.resolve_kind_by_token("dc").as_deref(), Some("DeploymentConfig"));
        assert_eq!(reg.resolve_kind_by_token("svc").as_deref(), Some("Service"));
        assert_eq!(reg.resolve_kind_by_token("cm").as_deref(), Some("ConfigMap"));
        assert_eq!(reg.resolve_token_by_kind("Service").as_deref(), Some("service"));
        assert!(reg.resolve_kind_by_token("nope").is_none());
    }

    #[test]
    fn test_ke003_lookup_case_insensitive() {
        let reg = MappingRegistry::new();
        reg.upsert(&[MappingEntry::new("Foo", ["FooType"])]).unwrap();
        assert_eq!(reg.resolve_kind_by_token("footype").as_deref(), Some("Foo"));
        assert_eq!(reg.resolve_kind_by_token("FOOTYPE").as_deref(), Some("Foo"));
        // kind → token keeps the token as written
        assert_eq!(reg.resolve_token_by_kind("Foo").as_deref(), Some("FooType"));
    }

    #[test]
    fn test_ke003_kind_to_token_keeps_last() {
        let reg = MappingRegistry::new();
        reg.upsert(&[MappingEntry::new("Foo", ["a", "b", "c"])]).unwrap();
        assert_eq!(reg.resolve_token_by_kind("Foo").as_deref(), Some("c"));

        reg.upsert(&[MappingEntry::new("Foo", ["d"])]).unwrap();
        assert_eq!(reg.resolve_token_by_kind("Foo").as_deref(), Some("d"));
        // earlier tokens still resolve: the registry never shrinks
        assert_eq!(reg.resolve_kind_by_token("a").as_deref(), Some("Foo"));
    }

    #[test]
    fn test_ke003_token_last_upsert_wins() {
        let reg = MappingRegistry::new();
        reg.upsert(&[MappingEntry::new("Foo", ["x"])]).unwrap();
        reg.upsert(&[MappingEntry::new("Bar", ["x"])]).unwrap();
        assert_eq!(reg.resolve_kind_by_token("x").as_deref(), Some("Bar"));
    }

    #[test]
    fn test_ke003_same_kind_in_batch_last_wins() {
        let reg = MappingRegistry::new();
        reg.upsert(&[
            MappingEntry::new("Foo", ["one"]),
            MappingEntry::new("Foo", ["two"]),
        ])
        .unwrap();
        assert_eq!(reg.resolve_token_by_kind("Foo").as_deref(), Some("two"));
        assert!(reg.resolve_kind_by_token("one").is_none());
    }

    #[test]
    fn test_ke003_invalid_batch_applies_nothing() {
        let reg = MappingRegistry::new();
        let result = reg.upsert(&[
            MappingEntry::new("Good", ["good"]),
            MappingEntry::new("", ["bad"]),
        ]);
        match result {
            Err(EnrichError::Configuration { kind, tokens }) => {
                assert_eq!(kind, "");
                assert_eq!(tokens, vec!["bad"]);
            }
            other => panic!("expected configuration error, got {:?}", other),
        }
        assert!(reg.is_empty());
    }

    #[test]
    fn test_ke003_empty_tokens_rejected() {
        let reg = MappingRegistry::new();
        let err = reg
            .upsert(&[MappingEntry::new("Foo", Vec::<String>::new())])
            .unwrap_err();
        assert!(err.to_string().contains("'Foo'"));
    }

    #[test]
    fn test_ke003_upsert_configs() {
        let reg = MappingRegistry::new();
        reg.upsert_configs(&[MappingConfig {
            kind: "Foo".to_string(),
            filename_types: "foo, fo".to_string(),
        }])
        .unwrap();
        assert_eq!(reg.resolve_kind_by_token("fo").as_deref(), Some("Foo"));
        assert_eq!(reg.resolve_token_by_kind("Foo").as_deref(), Some("fo"));

        let err = reg
            .upsert_configs(&[MappingConfig {
                kind: "Bar".to_string(),
                filename_types: String::new(),
            }])
            .unwrap_err();
        assert!(matches!(err, EnrichError::Configuration { .. }));
    }

    #[test]
    fn test_ke003_suffix_for_kind() {
        let reg = MappingRegistry::with_defaults().unwrap();
        assert_eq!(reg.suffix_for_kind("app", "DeploymentConfig"), "app-deploymentconfig");
        assert_eq!(reg.suffix_for_kind("app", "Unmapped"), "app-cr");
    }

    #[test]
    fn test_ke003_kind_for_type_unknown() {
        let reg = MappingRegistry::new();
        reg.upsert(&[MappingEntry::new("Foo", ["zz", "aa"])]).unwrap();
        match reg.kind_for_type("x-nope.yaml", "nope") {
            Err(EnrichError::UnknownType { file, token, known }) => {
                assert_eq!(file, "x-nope.yaml");
                assert_eq!(token, "nope");
                assert_eq!(known, vec!["aa", "zz"]);
            }
            other => panic!("expected unknown type, got {:?}", other),
        }
        assert_eq!(reg.kind_for_type("x-ZZ.yaml", "ZZ").unwrap(), "Foo");
    }

    #[test]
    fn test_ke003_entries_sorted() {
        let reg = MappingRegistry::new();
        reg.upsert(&[MappingEntry::new("B", ["b"]), MappingEntry::new("A", ["a"])])
            .unwrap();
        assert_eq!(
            reg.entries(),
            vec![
                ("a".to_string(), "A".to_string()),
                ("b".to_string(), "B".to_string())
            ]
        );
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn test_ke003_parse_mappings_rejects_garbage() {
        assert!(matches!(
            parse_mappings("- just\n- a list\n"),
            Err(EnrichError::Catalog(_))
        ));
    }

    #[test]
    fn test_ke003_concurrent_readers_see_whole_entries() {
        let reg = Arc::new(MappingRegistry::new());
        let writer = {
            let reg = Arc::clone(&reg);
            std::thread::spawn(move || {
                for i in 0..200 {
                    let kind = format!("Kind{i}");
                    reg.upsert(&[MappingEntry::new(
                        kind,
                        [format!("a{i}"), format!("b{i}")],
                    )])
                    .unwrap();
                }
            })
        };
        let reader = {
            let reg = Arc::clone(&reg);
            std::thread::spawn(move || {
                for _ in 0..200 {
                    // tokens are always registered in pairs
                    assert_eq!(reg.len() % 2, 0);
                }
            })
        };
        writer.join().unwrap();
        reader.join().unwrap();
        assert_eq!(reg.len(), 400);
    }

    proptest! {
        #[test]
        fn prop_ke003_resolve_inverts_upsert(
            kind in "[A-Z][a-zA-Z]{0,15}",
            tokens in prop::collection::vec("[a-zA-Z][a-zA-Z0-9]{0,7}", 1..5),
        ) {
            let reg = MappingRegistry::new();
            reg.upsert(&[MappingEntry::new(kind.clone(), tokens.clone())]).unwrap();
            for token in &tokens {
                prop_assert_eq!(reg.resolve_kind_by_token(token), Some(kind.clone()));
                prop_assert_eq!(reg.resolve_kind_by_token(&token.to_uppercase()), Some(kind.clone()));
                prop_assert_eq!(reg.resolve_kind_by_token(&token.to_lowercase()), Some(kind.clone()));
            }
            prop_assert_eq!(reg.resolve_token_by_kind(&kind), tokens.last().cloned());
        }

        #[test]
        fn prop_ke003_unmapped_kind_suffix(
            name in "[a-z][a-z0-9-]{0,20}",
            kind in "Zz[A-Za-z]{1,12}",
        ) {
            let reg = MappingRegistry::with_defaults().unwrap();
            prop_assert_eq!(reg.suffix_for_kind(&name, &kind), format!("{}-cr", name));
        }
    }
}
