//! cmi5 course structures (`cmi5.xml`).
//!
//! A cmi5 course is a tree of blocks and assignable units. Each AU names
//! the URL the LMS launches; there is no sequencing model beyond the
//! `moveOn` criteria.

pub mod model;
pub mod parser;

pub use model::{AssignableUnit, Block, Cmi5Course, Cmi5Manifest, Cmi5Objective, CourseNode, LaunchMethod, MoveOn};
pub use parser::Cmi5Parser;
