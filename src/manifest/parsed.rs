//! Run-time dispatch over the four standards.

use super::ModuleMetadata;
use crate::aicc::AiccManifest;
use crate::cmi5::Cmi5Manifest;
use crate::common::error::ParseResult;
use crate::detection::ModuleType;
use crate::scorm12::Scorm12Manifest;
use crate::scorm2004::Scorm2004Manifest;
use crate::validation::{self, ValidationResult};
use serde::Serialize;

/// A parser bound to one package.
pub trait ModuleParser: Send + Sync {
    /// The standard this parser reads.
    fn module_type(&self) -> ModuleType;

    /// Parse the package into its normalized form.
    fn parse(&self) -> ParseResult<ParsedModule>;
}

/// A parsed package of any standard.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "standard", content = "module")]
pub enum ParsedModule {
    Scorm12(ModuleMetadata<Scorm12Manifest>),
    Scorm2004(ModuleMetadata<Scorm2004Manifest>),
    Aicc(ModuleMetadata<AiccManifest>),
    Cmi5(ModuleMetadata<Cmi5Manifest>),
}

macro_rules! common_field {
    ($self:ident, $field:ident) => {
        match $self {
            ParsedModule::Scorm12(m) => m.$field.as_deref(),
            ParsedModule::Scorm2004(m) => m.$field.as_deref(),
            ParsedModule::Aicc(m) => m.$field.as_deref(),
            ParsedModule::Cmi5(m) => m.$field.as_deref(),
        }
    };
}

impl ParsedModule {
    pub fn module_type(&self) -> ModuleType {
        match self {
            ParsedModule::Scorm12(_) => ModuleType::Scorm12,
            ParsedModule::Scorm2004(_) => ModuleType::Scorm2004,
            ParsedModule::Aicc(_) => ModuleType::Aicc,
            ParsedModule::Cmi5(_) => ModuleType::Cmi5,
        }
    }

    pub fn title(&self) -> Option<&str> {
        common_field!(self, title)
    }

    pub fn description(&self) -> Option<&str> {
        common_field!(self, description)
    }

    pub fn identifier(&self) -> Option<&str> {
        common_field!(self, identifier)
    }

    pub fn version(&self) -> Option<&str> {
        common_field!(self, version)
    }

    pub fn launch_url(&self) -> Option<&str> {
        common_field!(self, launch_url)
    }

    pub fn duration(&self) -> Option<std::time::Duration> {
        match self {
            ParsedModule::Scorm12(m) => m.duration,
            ParsedModule::Scorm2004(m) => m.duration,
            ParsedModule::Aicc(m) => m.duration,
            ParsedModule::Cmi5(m) => m.duration,
        }
    }

    pub fn xapi_enabled(&self) -> bool {
        match self {
            ParsedModule::Scorm12(m) => m.xapi_enabled,
            ParsedModule::Scorm2004(m) => m.xapi_enabled,
            ParsedModule::Aicc(m) => m.xapi_enabled,
            ParsedModule::Cmi5(m) => m.xapi_enabled,
        }
    }

    pub fn size_on_disk(&self) -> u64 {
        match self {
            ParsedModule::Scorm12(m) => m.size_on_disk,
            ParsedModule::Scorm2004(m) => m.size_on_disk,
            ParsedModule::Aicc(m) => m.size_on_disk,
            ParsedModule::Cmi5(m) => m.size_on_disk,
        }
    }

    pub fn as_scorm12(&self) -> Option<&ModuleMetadata<Scorm12Manifest>> {
        match self {
            ParsedModule::Scorm12(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_scorm2004(&self) -> Option<&ModuleMetadata<Scorm2004Manifest>> {
        match self {
            ParsedModule::Scorm2004(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_aicc(&self) -> Option<&ModuleMetadata<AiccManifest>> {
        match self {
            ParsedModule::Aicc(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_cmi5(&self) -> Option<&ModuleMetadata<Cmi5Manifest>> {
        match self {
            ParsedModule::Cmi5(m) => Some(m),
            _ => None,
        }
    }

    /// Run the default validator of the package's standard.
    pub fn validate(&self) -> ValidationResult {
        match self {
            ParsedModule::Scorm12(m) => validation::scorm12_validator().validate(&m.manifest),
            ParsedModule::Scorm2004(m) => validation::scorm2004_validator().validate(&m.manifest),
            ParsedModule::Aicc(m) => validation::aicc_validator().validate(&m.manifest),
            ParsedModule::Cmi5(m) => validation::cmi5_validator().validate(&m.manifest),
        }
    }
}
