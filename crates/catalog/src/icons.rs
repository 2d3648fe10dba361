use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Icon discriminator: selects a marker's image and click target.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IconKind(String);

impl IconKind {
    pub fn new(kind: impl Into<String>) -> Self {
        Self(kind.into())
    }

    /// Default kind for the `n`th (1-based) icon of a building.
    pub fn nth(n: usize) -> Self {
        Self(format!("icon{n}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IconKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub const DEFAULT_ICON_SCALE: f64 = 0.1;

fn default_icon_scale() -> f64 {
    DEFAULT_ICON_SCALE
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IconTarget {
    /// Page opened in the overlay when a marker of this kind is clicked.
    pub url: String,
    /// Billboard image (URL or bundled asset path).
    pub image: String,
    #[serde(default = "default_icon_scale")]
    pub scale: f64,
}

/// Static discriminator → target table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IconTable {
    entries: BTreeMap<IconKind, IconTarget>,
}

impl IconTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, kind: IconKind, target: IconTarget) -> Self {
        self.entries.insert(kind, target);
        self
    }

    pub fn get(&self, kind: &IconKind) -> Option<&IconTarget> {
        self.entries.get(kind)
    }

    pub fn url(&self, kind: &IconKind) -> Option<&str> {
        self.get(kind).map(|t| t.url.as_str())
    }

    pub fn contains(&self, kind: &IconKind) -> bool {
        self.entries.contains_key(kind)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&IconKind, &IconTarget)> {
        self.entries.iter()
    }
}
