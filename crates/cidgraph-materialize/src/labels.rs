use std::collections::HashMap;

/// Lookup table from a data-group label to its canonical identifier.
///
/// Used only to choose a friendlier root filename during materialization; a
/// miss is non-fatal and falls back to the reference-based name. Labels are
/// normalized (trimmed, ASCII-lowercased) so manifest casing does not matter.
#[derive(Clone, Debug, Default)]
pub struct LabelTable {
    entries: HashMap<String, String>,
}

impl LabelTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a label → identifier mapping.
    pub fn insert(&mut self, label: &str, id: impl Into<String>) {
        self.entries.insert(Self::normalize(label), id.into());
    }

    /// Look up the canonical identifier for a label, if any.
    pub fn lookup(&self, label: &str) -> Option<&str> {
        self.entries.get(&Self::normalize(label)).map(String::as_str)
    }

    /// Number of mappings.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the table has no mappings.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn normalize(label: &str) -> String {
        label.trim().to_ascii_lowercase()
    }
}

impl FromIterator<(String, String)> for LabelTable {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (label, id) in iter {
            table.insert(&label, id);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        let mut table = LabelTable::new();
        table.insert("County", "county-records-v2");
        assert_eq!(table.lookup("county"), Some("county-records-v2"));
        assert_eq!(table.lookup(" COUNTY "), Some("county-records-v2"));
    }

    #[test]
    fn miss_returns_none() {
        let table = LabelTable::new();
        assert_eq!(table.lookup("unknown"), None);
    }

    #[test]
    fn collect_from_pairs() {
        let table: LabelTable = vec![
            ("County".to_string(), "county-v2".to_string()),
            ("Parcel".to_string(), "parcel-v1".to_string()),
        ]
        .into_iter()
        .collect();
        assert_eq!(table.len(), 2);
        assert_eq!(table.lookup("parcel"), Some("parcel-v1"));
    }
}
