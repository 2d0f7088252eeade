//! SCORM 1.2 manifest object graph.

use crate::cp::{CpMetadata, Resource, Resources};
use crate::detection::ModuleType;
use crate::manifest::PackageManifest;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// An `<item>` of an organization tree.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Item {
    pub identifier: String,
    /// Resource launched by this item; absent on pure aggregations
    pub identifier_ref: Option<String>,
    pub is_visible: bool,
    /// Query string appended to the resource href at launch
    pub parameters: Option<String>,
    pub title: Option<String>,
    pub items: Vec<Item>,
    pub metadata: Option<CpMetadata>,
    /// `adlcp:prerequisites` expression
    pub prerequisites: Option<String>,
    /// `adlcp:maxtimeallowed`, a CMI timespan
    pub max_time_allowed: Option<String>,
    /// `adlcp:timelimitaction`, e.g. `exit,message`
    pub time_limit_action: Option<String>,
    /// `adlcp:datafromlms`
    pub data_from_lms: Option<String>,
    /// `adlcp:masteryscore`, as written
    pub mastery_score: Option<String>,
}

impl Item {
    /// Mastery score as a number, when it is one.
    pub fn mastery_score_value(&self) -> Option<f64> {
        self.mastery_score.as_deref()?.trim().parse().ok()
    }

    /// Maximum time allowed as a duration.
    pub fn max_time(&self) -> Option<Duration> {
        self.max_time_allowed
            .as_deref()
            .and_then(crate::common::duration::parse_duration)
    }

    /// This item followed by all its descendants, depth first.
    pub fn flatten(&self) -> Vec<&Item> {
        let mut out = vec![self];
        for child in &self.items {
            out.extend(child.flatten());
        }
        out
    }
}

/// An `<organization>`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Organization {
    pub identifier: String,
    /// `structure` attribute, `hierarchical` when absent
    pub structure: Option<String>,
    pub title: Option<String>,
    pub items: Vec<Item>,
    pub metadata: Option<CpMetadata>,
}

impl Organization {
    /// Every item of the tree, depth first.
    pub fn all_items(&self) -> Vec<&Item> {
        self.items.iter().flat_map(Item::flatten).collect()
    }
}

/// The `<organizations>` element.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Organizations {
    /// `default` attribute
    pub default: Option<String>,
    pub organizations: Vec<Organization>,
}

impl Organizations {
    /// The organization named by `default`, or the first one.
    pub fn default_organization(&self) -> Option<&Organization> {
        self.default
            .as_deref()
            .and_then(|id| self.organizations.iter().find(|o| o.identifier == id))
            .or_else(|| self.organizations.first())
    }
}

/// A parsed SCORM 1.2 `imsmanifest.xml`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Scorm12Manifest {
    pub identifier: String,
    pub version: Option<String>,
    /// `xml:base`
    pub base: Option<String>,
    pub metadata: Option<CpMetadata>,
    pub organizations: Organizations,
    pub resources: Resources,
}

impl Scorm12Manifest {
    /// Resource launched first: that of the first item of the default
    /// organization carrying an `identifierref`.
    pub fn launch_resource(&self) -> Option<&Resource> {
        let organization = self.organizations.default_organization()?;
        let item = organization
            .all_items()
            .into_iter()
            .find(|item| item.identifier_ref.is_some())?;
        self.resources.get(item.identifier_ref.as_deref()?)
    }

    /// Resources with `adlcp:scormtype="sco"`.
    pub fn scos(&self) -> impl Iterator<Item = &Resource> {
        self.resources.iter().filter(|r| r.is_sco())
    }
}

impl PackageManifest for Scorm12Manifest {
    fn module_type(&self) -> ModuleType {
        ModuleType::Scorm12
    }

    fn title(&self) -> Option<&str> {
        self.organizations
            .default_organization()
            .and_then(|o| o.title.as_deref())
            .or_else(|| self.metadata.as_ref().and_then(CpMetadata::title))
    }

    fn description(&self) -> Option<&str> {
        self.metadata.as_ref().and_then(CpMetadata::description)
    }

    fn launch_url(&self) -> Option<&str> {
        self.launch_resource().and_then(|r| r.href.as_deref())
    }

    fn identifier(&self) -> Option<&str> {
        Some(self.identifier.as_str()).filter(|id| !id.is_empty())
    }

    fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    fn duration(&self) -> Option<Duration> {
        self.metadata
            .as_ref()
            .and_then(|m| m.lom.as_ref())
            .and_then(|lom| lom.typical_learning_time())
    }
}
