//! SCORM 2004 content packages.
//!
//! SCORM 2004 extends the SCORM 1.2 packaging with an activity tree carrying
//! IMS Simple Sequencing definitions, a reusable `sequencingCollection`,
//! completion thresholds and navigation presentation hints. Editions are
//! told apart by the manifest's `<schemaversion>`.

pub mod decode;
pub mod model;
pub mod parser;
pub mod sequencing;

pub use model::{
    CompletionThreshold, DataMap, HideLmsUi, Item, Organization, Organizations, Scorm2004Edition,
    Scorm2004Manifest,
};
pub use parser::Scorm2004Parser;
pub use sequencing::Sequencing;

#[cfg(test)]
mod tests;
