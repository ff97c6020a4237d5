//! Documentation lookup for types and fields
//!
//! Names are fully qualified: `Type` for a type, `Type.field` for a field.
//! The renderer only asks [`DocumentationLookup::has_documentation`] while
//! building lines; the full text is fetched when the user opens the panel.

use rustc_hash::FxHashMap;
use serde::Deserialize;

/// Documentation attached to one name
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Documentation {
    pub summary: String,
    pub remarks: Option<String>,
    /// `(name, description)` pairs
    pub parameters: Vec<(String, String)>,
    pub returns: Option<String>,
}

/// Source of documentation for inspected types
pub trait DocumentationLookup {
    fn has_documentation(&self, name: &str) -> bool;

    fn documentation(&self, name: &str) -> Option<Documentation>;
}

/// In-memory documentation table
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct DocIndex {
    entries: FxHashMap<String, Documentation>,
}

impl DocIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a table of `["Type.field"]` sections
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn insert(&mut self, name: impl Into<String>, doc: Documentation) {
        self.entries.insert(name.into(), doc);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl DocumentationLookup for DocIndex {
    fn has_documentation(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    fn documentation(&self, name: &str) -> Option<Documentation> {
        self.entries.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOCS: &str = r#"
["Player"]
summary = "A connected player"

["Player.health"]
summary = "Remaining hit points"
remarks = "Clamped to max_health"

["Player.respawn"]
summary = "Respawn the player"
parameters = [["delay", "Seconds to wait"]]
returns = "Whether the respawn was queued"
"#;

    #[test]
    fn test_parse_index() {
        let index = DocIndex::from_toml_str(DOCS).unwrap();
        assert_eq!(index.len(), 3);
        assert!(index.has_documentation("Player"));
        assert!(!index.has_documentation("Player.mana"));

        let health = index.documentation("Player.health").unwrap();
        assert_eq!(health.remarks.as_deref(), Some("Clamped to max_health"));
        assert!(health.parameters.is_empty());

        let respawn = index.documentation("Player.respawn").unwrap();
        assert_eq!(
            respawn.parameters,
            vec![("delay".to_string(), "Seconds to wait".to_string())]
        );
    }
}
