//! AICC course object graph.

use crate::common::duration::parse_timespan;
use crate::detection::ModuleType;
use crate::manifest::PackageManifest;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Literal block name of the top of the course structure.
pub const ROOT_BLOCK: &str = "ROOT";

/// `[Course]` of the `.crs` file.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Course {
    pub course_creator: Option<String>,
    pub course_id: Option<String>,
    pub course_system: Option<String>,
    pub course_title: Option<String>,
    pub level: Option<String>,
    pub max_fields_cst: Option<u32>,
    pub max_fields_ort: Option<u32>,
    pub total_aus: Option<u32>,
    pub total_blocks: Option<u32>,
    pub total_objectives: Option<u32>,
    pub total_complex_obj: Option<u32>,
    pub version: Option<String>,
    /// Free text of `[Course_Description]`
    pub description: Option<String>,
}

/// `[Course_Behavior]` of the `.crs` file.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CourseBehavior {
    pub max_normal: Option<u32>,
}

/// A row of the `.des` file.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Descriptor {
    pub system_id: String,
    pub developer_id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
}

/// A row of the `.au` file, joined with its descriptor.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AssignableUnit {
    pub system_id: String,
    pub au_type: Option<String>,
    pub command_line: Option<String>,
    pub file_name: Option<String>,
    pub core_vendor: Option<String>,
    pub max_score: Option<f64>,
    pub mastery_score: Option<f64>,
    /// CMI timespan, as written
    pub max_time_allowed: Option<String>,
    pub time_limit_action: Option<String>,
    pub system_vendor: Option<String>,
    pub web_launch: Option<String>,
    pub au_password: Option<String>,
    /// Descriptor with the same system ID
    pub descriptor: Option<Descriptor>,
}

impl AssignableUnit {
    pub fn max_time(&self) -> Option<Duration> {
        self.max_time_allowed.as_deref().and_then(parse_timespan)
    }
}

/// An edge of the `.cst` course structure.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CourseStructure {
    pub block: String,
    pub member: String,
}

/// A parsed AICC course.
///
/// Fields are public so that rule checks can be exercised on hand-built
/// manifests; [`AiccParser`](super::AiccParser) always produces a course
/// with a resolved root assignable unit.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AiccManifest {
    pub course: Option<Course>,
    pub course_behavior: Option<CourseBehavior>,
    pub assignable_units: Vec<AssignableUnit>,
    pub descriptors: Vec<Descriptor>,
    pub course_structure: Vec<CourseStructure>,
    /// System ID of the assignable unit launched first
    pub root_system_id: Option<String>,
}

impl AiccManifest {
    /// Assignable unit with the given system ID (case-insensitive).
    pub fn assignable_unit(&self, system_id: &str) -> Option<&AssignableUnit> {
        self.assignable_units
            .iter()
            .find(|au| au.system_id.eq_ignore_ascii_case(system_id))
    }

    pub fn root_assignable_unit(&self) -> Option<&AssignableUnit> {
        self.assignable_unit(self.root_system_id.as_deref()?)
    }

    pub fn course(&self) -> Option<&Course> {
        self.course.as_ref()
    }

    /// Members of a block, in file order.
    pub fn members(&self, block: &str) -> impl Iterator<Item = &str> {
        self.course_structure
            .iter()
            .filter(move |edge| edge.block == block)
            .map(|edge| edge.member.as_str())
    }
}

impl PackageManifest for AiccManifest {
    fn module_type(&self) -> ModuleType {
        ModuleType::Aicc
    }

    fn title(&self) -> Option<&str> {
        self.course.as_ref()?.course_title.as_deref()
    }

    /// Description of the root assignable unit's descriptor, not the
    /// `[Course_Description]` text.
    fn description(&self) -> Option<&str> {
        self.root_assignable_unit()?
            .descriptor
            .as_ref()?
            .description
            .as_deref()
    }

    fn launch_url(&self) -> Option<&str> {
        self.root_assignable_unit()?.file_name.as_deref()
    }

    fn identifier(&self) -> Option<&str> {
        self.course.as_ref()?.course_id.as_deref()
    }

    fn version(&self) -> Option<&str> {
        self.course.as_ref()?.version.as_deref()
    }

    fn duration(&self) -> Option<Duration> {
        self.root_assignable_unit()?.max_time()
    }
}
