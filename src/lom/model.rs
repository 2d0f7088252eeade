//! LOM data model.

use crate::common::duration::parse_duration;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A string with an optional language tag.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LangString {
    pub language: Option<String>,
    pub value: String,
}

impl LangString {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            language: None,
            value: value.into(),
        }
    }
}

/// Pick the first non-empty value of a multi-language string.
pub(crate) fn first_value(strings: &[LangString]) -> Option<&str> {
    strings
        .iter()
        .map(|s| s.value.as_str())
        .find(|v| !v.trim().is_empty())
}

/// Catalog entry identifying a learning object.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LomIdentifier {
    pub catalog: Option<String>,
    pub entry: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct General {
    pub identifiers: Vec<LomIdentifier>,
    pub title: Vec<LangString>,
    pub language: Vec<String>,
    pub description: Vec<LangString>,
    /// One entry per `<keyword>` element
    pub keywords: Vec<Vec<LangString>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LifeCycle {
    pub version: Vec<LangString>,
    /// Vocabulary value such as `final` or `draft`
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Technical {
    pub format: Vec<String>,
    /// Size in bytes, as written
    pub size: Option<String>,
    pub location: Vec<String>,
    pub duration: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Educational {
    pub typical_learning_time: Option<String>,
    pub description: Vec<LangString>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rights {
    pub cost: Option<String>,
    pub copyright_and_other_restrictions: Option<String>,
    pub description: Vec<LangString>,
}

/// A LOM record.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Lom {
    pub general: Option<General>,
    pub lifecycle: Option<LifeCycle>,
    pub technical: Option<Technical>,
    pub educational: Option<Educational>,
    pub rights: Option<Rights>,
}

impl Lom {
    /// First general title.
    pub fn title(&self) -> Option<&str> {
        self.general.as_ref().and_then(|g| first_value(&g.title))
    }

    /// First general description.
    pub fn description(&self) -> Option<&str> {
        self.general.as_ref().and_then(|g| first_value(&g.description))
    }

    /// Entry of the first general identifier.
    pub fn identifier(&self) -> Option<&str> {
        self.general
            .as_ref()?
            .identifiers
            .iter()
            .find_map(|id| id.entry.as_deref())
    }

    /// First lifecycle version.
    pub fn version(&self) -> Option<&str> {
        self.lifecycle.as_ref().and_then(|l| first_value(&l.version))
    }

    /// All keywords, flattened.
    pub fn keywords(&self) -> Vec<&str> {
        self.general
            .iter()
            .flat_map(|g| g.keywords.iter())
            .filter_map(|k| first_value(k))
            .collect()
    }

    /// Educational typical learning time, falling back to the technical duration.
    pub fn typical_learning_time(&self) -> Option<Duration> {
        self.educational
            .as_ref()
            .and_then(|e| e.typical_learning_time.as_deref())
            .and_then(parse_duration)
            .or_else(|| {
                self.technical
                    .as_ref()
                    .and_then(|t| t.duration.as_deref())
                    .and_then(parse_duration)
            })
    }
}
