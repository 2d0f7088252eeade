//! `<resources>` and their files and dependencies.

use super::metadata::CpMetadata;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// `adlcp:scormType` / `adlcp:scormtype`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScormType {
    /// Communicates with the LMS through the run-time API
    Sco,
    /// Plain content
    Asset,
}

impl FromStr for ScormType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            v if v.eq_ignore_ascii_case("sco") => Ok(ScormType::Sco),
            v if v.eq_ignore_ascii_case("asset") => Ok(ScormType::Asset),
            other => Err(format!("unknown SCORM type '{}'", other)),
        }
    }
}

impl fmt::Display for ScormType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ScormType::Sco => "sco",
            ScormType::Asset => "asset",
        })
    }
}

/// A `<file>` entry of a resource.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResourceFile {
    pub href: String,
    pub metadata: Option<CpMetadata>,
}

/// A `<resource>`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Resource {
    pub identifier: String,
    /// `type` attribute, normally `webcontent`
    pub resource_type: Option<String>,
    pub scorm_type: Option<ScormType>,
    /// Launch location, verbatim
    pub href: Option<String>,
    /// `xml:base`
    pub base: Option<String>,
    pub files: Vec<ResourceFile>,
    /// `identifierref` of each `<dependency>`
    pub dependencies: Vec<String>,
    pub metadata: Option<CpMetadata>,
}

impl Resource {
    pub fn is_sco(&self) -> bool {
        self.scorm_type == Some(ScormType::Sco)
    }
}

/// The `<resources>` element.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Resources {
    /// `xml:base`
    pub base: Option<String>,
    pub resources: Vec<Resource>,
}

impl Resources {
    /// Resource with the given identifier.
    pub fn get(&self, identifier: &str) -> Option<&Resource> {
        self.resources.iter().find(|r| r.identifier == identifier)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Resource> {
        self.resources.iter()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

impl<'a> IntoIterator for &'a Resources {
    type Item = &'a Resource;
    type IntoIter = std::slice::Iter<'a, Resource>;

    fn into_iter(self) -> Self::IntoIter {
        self.resources.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scorm_type_is_case_insensitive() {
        assert_eq!("sco".parse::<ScormType>(), Ok(ScormType::Sco));
        assert_eq!("SCO".parse::<ScormType>(), Ok(ScormType::Sco));
        assert_eq!(" Asset ".parse::<ScormType>(), Ok(ScormType::Asset));
        assert!("lesson".parse::<ScormType>().is_err());
    }
}
