//! cmi5 course structure object graph.

use crate::detection::ModuleType;
use crate::lom::LangString;
use crate::lom::model::first_value;
use crate::manifest::PackageManifest;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// Criteria for an AU to count as satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MoveOn {
    Passed,
    Completed,
    CompletedAndPassed,
    CompletedOrPassed,
    #[default]
    NotApplicable,
}

impl FromStr for MoveOn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            "Passed" => MoveOn::Passed,
            "Completed" => MoveOn::Completed,
            "CompletedAndPassed" => MoveOn::CompletedAndPassed,
            "CompletedOrPassed" => MoveOn::CompletedOrPassed,
            "NotApplicable" => MoveOn::NotApplicable,
            other => return Err(format!("unknown token '{}'", other)),
        })
    }
}

/// Where the LMS opens an AU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LaunchMethod {
    #[default]
    AnyWindow,
    OwnWindow,
}

impl FromStr for LaunchMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "AnyWindow" => Ok(LaunchMethod::AnyWindow),
            "OwnWindow" => Ok(LaunchMethod::OwnWindow),
            other => Err(format!("unknown token '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cmi5Course {
    pub id: Option<String>,
    pub title: Vec<LangString>,
    pub description: Vec<LangString>,
}

/// A course-level `<objective>` declaration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cmi5Objective {
    pub id: String,
    pub title: Vec<LangString>,
    pub description: Vec<LangString>,
}

/// An `<au>`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AssignableUnit {
    pub id: String,
    pub title: Vec<LangString>,
    pub description: Vec<LangString>,
    /// Launch URL, relative to the package or absolute
    pub url: Option<String>,
    pub move_on: MoveOn,
    /// Between 0 and 1 when valid
    pub mastery_score: Option<f64>,
    pub launch_method: LaunchMethod,
    pub activity_type: Option<String>,
    pub launch_parameters: Option<String>,
    pub entitlement_key: Option<String>,
    /// `idref` of each referenced objective
    pub objectives: Vec<String>,
}

/// A `<block>` grouping AUs and nested blocks.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Block {
    pub id: String,
    pub title: Vec<LangString>,
    pub description: Vec<LangString>,
    pub objectives: Vec<String>,
    pub children: Vec<CourseNode>,
}

/// A child of the course structure or of a block, in document order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CourseNode {
    Au(AssignableUnit),
    Block(Block),
}

impl CourseNode {
    pub fn id(&self) -> &str {
        match self {
            CourseNode::Au(au) => &au.id,
            CourseNode::Block(block) => &block.id,
        }
    }
}

/// A parsed `cmi5.xml`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Cmi5Manifest {
    pub course: Cmi5Course,
    pub objectives: Vec<Cmi5Objective>,
    pub children: Vec<CourseNode>,
}

impl Cmi5Manifest {
    /// All AUs, depth first in document order.
    pub fn assignable_units(&self) -> Vec<&AssignableUnit> {
        fn walk<'a>(nodes: &'a [CourseNode], out: &mut Vec<&'a AssignableUnit>) {
            for node in nodes {
                match node {
                    CourseNode::Au(au) => out.push(au),
                    CourseNode::Block(block) => walk(&block.children, out),
                }
            }
        }
        let mut out = Vec::new();
        walk(&self.children, &mut out);
        out
    }

    /// All blocks, depth first in document order.
    pub fn blocks(&self) -> Vec<&Block> {
        fn walk<'a>(nodes: &'a [CourseNode], out: &mut Vec<&'a Block>) {
            for node in nodes {
                if let CourseNode::Block(block) = node {
                    out.push(block);
                    walk(&block.children, out);
                }
            }
        }
        let mut out = Vec::new();
        walk(&self.children, &mut out);
        out
    }

    pub fn declares_objective(&self, id: &str) -> bool {
        self.objectives.iter().any(|o| o.id == id)
    }
}

impl PackageManifest for Cmi5Manifest {
    fn module_type(&self) -> ModuleType {
        ModuleType::Cmi5
    }

    fn title(&self) -> Option<&str> {
        first_value(&self.course.title)
    }

    fn description(&self) -> Option<&str> {
        first_value(&self.course.description)
    }

    /// URL of the first AU in document order.
    fn launch_url(&self) -> Option<&str> {
        self.assignable_units().first()?.url.as_deref()
    }

    fn identifier(&self) -> Option<&str> {
        self.course.id.as_deref()
    }

    fn version(&self) -> Option<&str> {
        None
    }

    fn duration(&self) -> Option<Duration> {
        None
    }
}
