//! Catalog of label names offered to the operator.
//!
//! The catalog only drives which labels are offered; it never rewrites
//! stored annotations, and toggling a label outside the catalog is allowed.

use serde::{Deserialize, Serialize};

/// Labels offered when nothing has been persisted yet.
pub const DEFAULT_LABELS: &[&str] = &["有趣", "廣告", "重要"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelCatalog {
    labels: Vec<String>,
}

impl LabelCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The starting catalog for a fresh session.
    pub fn with_defaults() -> Self {
        Self::from_labels(DEFAULT_LABELS)
    }

    /// Build a catalog from persisted names, applying the same rules as
    /// [`LabelCatalog::add`].
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut catalog = Self::new();
        for label in labels {
            catalog.add(label.as_ref());
        }
        catalog
    }

    /// Append a trimmed label name. Blank and duplicate names are ignored.
    ///
    /// Returns `true` if the catalog changed.
    pub fn add(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || self.contains(name) {
            return false;
        }
        self.labels.push(name.to_string());
        true
    }

    /// Returns `true` if the label was present.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.labels.len();
        self.labels.retain(|l| l != name);
        self.labels.len() != before
    }

    pub fn contains(&self, name: &str) -> bool {
        self.labels.iter().any(|l| l == name)
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}
