//! IEEE Learning Object Metadata.
//!
//! SCORM manifests carry LOM either inline (`<metadata><lom>...`) or in a
//! separate file referenced by `<adlcp:location>`. Two XML bindings are in
//! circulation and both are read:
//!
//! - the IMS LOM 1.2 binding used by SCORM 1.2, with `<langstring>` values
//!   and `<datetime>` durations;
//! - the IEEE LOM 2004 binding used by SCORM 2004, with `<string>` values
//!   and `<duration>` durations.
//!
//! Only the categories a package catalogue cares about are modelled.
//! Decoding is lenient: unknown elements are ignored and nothing here
//! makes a parse fail.

pub mod model;
pub mod parser;

pub use model::{
    Educational, General, LangString, LifeCycle, Lom, LomIdentifier, Rights, Technical,
};
pub use parser::{load_external_lom, parse_lom};
