//! SCORM 2004 manifest object graph.

use super::sequencing::Sequencing;
use crate::cp::{CpMetadata, Resource, Resources};
use crate::detection::ModuleType;
use crate::manifest::PackageManifest;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// SCORM 2004 edition, from the manifest's `<schemaversion>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Scorm2004Edition {
    /// `CAM 1.3`
    Second,
    /// `2004 3rd Edition`
    Third,
    /// `2004 4th Edition`
    Fourth,
}

impl Scorm2004Edition {
    pub fn from_schema_version(version: &str) -> Option<Self> {
        match version.trim() {
            "CAM 1.3" => Some(Scorm2004Edition::Second),
            "2004 3rd Edition" => Some(Scorm2004Edition::Third),
            "2004 4th Edition" => Some(Scorm2004Edition::Fourth),
            _ => None,
        }
    }
}

/// `<adlcp:completionThreshold>`.
///
/// 3rd Edition writes the threshold as element text; 4th Edition uses
/// attributes. Both end up in `min_progress_measure`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompletionThreshold {
    pub completed_by_measure: bool,
    pub min_progress_measure: f64,
    pub progress_weight: f64,
}

impl Default for CompletionThreshold {
    fn default() -> Self {
        Self {
            completed_by_measure: false,
            min_progress_measure: 1.0,
            progress_weight: 1.0,
        }
    }
}

/// `<adlnav:hideLMSUI>` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HideLmsUi {
    Previous,
    Continue,
    Exit,
    ExitAll,
    Abandon,
    AbandonAll,
    SuspendAll,
}

impl std::str::FromStr for HideLmsUi {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            "previous" => HideLmsUi::Previous,
            "continue" => HideLmsUi::Continue,
            "exit" => HideLmsUi::Exit,
            "exitAll" => HideLmsUi::ExitAll,
            "abandon" => HideLmsUi::Abandon,
            "abandonAll" => HideLmsUi::AbandonAll,
            "suspendAll" => HideLmsUi::SuspendAll,
            other => return Err(format!("unknown token '{}'", other)),
        })
    }
}

/// `<adlcp:map>`: shared data bucket access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataMap {
    pub target_id: String,
    pub read_shared_data: bool,
    pub write_shared_data: bool,
}

/// An `<item>`, i.e. an activity of the activity tree.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Item {
    pub identifier: String,
    pub identifier_ref: Option<String>,
    pub is_visible: bool,
    pub parameters: Option<String>,
    pub title: Option<String>,
    pub items: Vec<Item>,
    pub metadata: Option<CpMetadata>,
    /// `adlcp:timeLimitAction`
    pub time_limit_action: Option<String>,
    /// `adlcp:dataFromLMS`
    pub data_from_lms: Option<String>,
    pub completion_threshold: Option<CompletionThreshold>,
    pub sequencing: Option<Sequencing>,
    /// `adlnav:presentation` controls to hide
    pub hide_lms_ui: Vec<HideLmsUi>,
    /// `adlcp:data`
    pub data: Vec<DataMap>,
}

impl Item {
    /// Whether this activity is a leaf (delivers content).
    pub fn is_leaf(&self) -> bool {
        self.items.is_empty()
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

/// An `<organization>`: the root of an activity tree.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Organization {
    pub identifier: String,
    pub structure: Option<String>,
    pub title: Option<String>,
    pub items: Vec<Item>,
    pub metadata: Option<CpMetadata>,
    pub completion_threshold: Option<CompletionThreshold>,
    pub sequencing: Option<Sequencing>,
    /// `adlseq:objectivesGlobalToSystem`
    pub objectives_global_to_system: bool,
    /// `adlcp:sharedDataGlobalToSystem`
    pub shared_data_global_to_system: bool,
}

impl Organization {
    /// Every item of the tree, depth first.
    pub fn all_items(&self) -> Vec<&Item> {
        self.items.iter().flat_map(Item::flatten).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Organizations {
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

/// A parsed SCORM 2004 `imsmanifest.xml`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Scorm2004Manifest {
    pub identifier: String,
    pub version: Option<String>,
    pub base: Option<String>,
    pub metadata: Option<CpMetadata>,
    /// Edition declared by `<schemaversion>`, when recognized
    pub edition: Option<Scorm2004Edition>,
    pub organizations: Organizations,
    pub resources: Resources,
    /// `<imsss:sequencingCollection>` entries
    pub sequencing_collection: Vec<Sequencing>,
}

impl Scorm2004Manifest {
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

    /// Collection entry with the given `ID`.
    pub fn collection_entry(&self, id: &str) -> Option<&Sequencing> {
        self.sequencing_collection
            .iter()
            .find(|s| s.id.as_deref() == Some(id))
    }

    /// Sequencing in effect for a declaration, with any `IDRef` applied.
    ///
    /// An unresolvable `IDRef` leaves the local declaration as is.
    pub fn effective_sequencing(&self, sequencing: &Sequencing) -> Sequencing {
        match sequencing.id_ref.as_deref().and_then(|id| self.collection_entry(id)) {
            Some(base) => sequencing.merged_over(base),
            None => sequencing.clone(),
        }
    }

    /// `<schemaversion>` of the manifest metadata.
    pub fn schema_version(&self) -> Option<&str> {
        self.metadata.as_ref()?.schema_version.as_deref()
    }
}

impl PackageManifest for Scorm2004Manifest {
    fn module_type(&self) -> ModuleType {
        ModuleType::Scorm2004
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

    /// The `version` attribute, else the `<schemaversion>`.
    fn version(&self) -> Option<&str> {
        self.version.as_deref().or_else(|| self.schema_version())
    }

    fn duration(&self) -> Option<Duration> {
        self.metadata
            .as_ref()
            .and_then(|m| m.lom.as_ref())
            .and_then(|lom| lom.typical_learning_time())
            .or_else(|| {
                let organization = self.organizations.default_organization()?;
                let sequencing = self.effective_sequencing(organization.sequencing.as_ref()?);
                sequencing.limit_conditions?.attempt_duration()
            })
    }
}
