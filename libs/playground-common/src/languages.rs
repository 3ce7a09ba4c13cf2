// Friendly language names -> identifiers accepted by the execution backend

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Aliases recognised out of the box, keyed by lower-case friendly name
pub const DEFAULT_ALIASES: &[(&str, &str)] = &[
    ("javascript", "javascript"),
    ("node", "javascript"),
    ("python", "python"),
    ("python3", "python"),
    ("java", "java"),
    ("c", "c"),
    ("cpp", "cpp"),
    ("c++", "cpp"),
    ("go", "go"),
    ("ruby", "ruby"),
    ("php", "php"),
    ("rust", "rust"),
];

/// Case-insensitive alias table.
///
/// Unknown names are not rejected here; they pass through lower-cased and the
/// backend decides whether it supports them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "HashMap<String, String>", into = "BTreeMap<String, String>")]
pub struct LanguageMapping {
    aliases: HashMap<String, String>,
}

impl LanguageMapping {
    pub fn new<I, K, V>(aliases: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let aliases = aliases
            .into_iter()
            .map(|(k, v)| (k.as_ref().to_lowercase(), v.into()))
            .collect();
        Self { aliases }
    }

    /// Resolve a caller-supplied name to the backend's canonical identifier
    pub fn resolve(&self, name: &str) -> String {
        let key = name.to_lowercase();
        match self.aliases.get(&key) {
            Some(canonical) => canonical.clone(),
            None => key,
        }
    }

    pub fn is_known(&self, name: &str) -> bool {
        self.aliases.contains_key(&name.to_lowercase())
    }

    /// All aliases, sorted by friendly name
    pub fn aliases(&self) -> Vec<(&str, &str)> {
        let mut pairs: Vec<_> = self
            .aliases
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        pairs.sort_unstable();
        pairs
    }

    /// Distinct canonical identifiers, sorted
    pub fn canonical_ids(&self) -> Vec<&str> {
        let mut ids: Vec<_> = self.aliases.values().map(String::as_str).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

impl Default for LanguageMapping {
    fn default() -> Self {
        Self::new(DEFAULT_ALIASES.iter().copied())
    }
}

impl From<HashMap<String, String>> for LanguageMapping {
    fn from(aliases: HashMap<String, String>) -> Self {
        Self::new(aliases)
    }
}

impl From<LanguageMapping> for BTreeMap<String, String> {
    fn from(mapping: LanguageMapping) -> Self {
        mapping.aliases.into_iter().collect()
    }
}
