//! Parser configuration.

use serde::{Deserialize, Serialize};

/// Default upper bound on a single manifest file (32 MiB).
pub const DEFAULT_MAX_MANIFEST_SIZE: u64 = 32 * 1024 * 1024;

/// Options shared by every manifest parser.
///
/// # Example
///
/// ```
/// use elearning_module_parser::common::ParseOptions;
///
/// let options = ParseOptions::default()
///     .with_external_metadata(false)
///     .with_legacy_encoding_fallback(false);
/// assert!(!options.resolve_external_metadata);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Load LOM files referenced through `<adlcp:location>`
    pub resolve_external_metadata: bool,
    /// Decode invalid UTF-8 manifests as Windows-1252 instead of failing
    pub legacy_encoding_fallback: bool,
    /// Manifest files larger than this fail to parse
    pub max_manifest_size: u64,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            resolve_external_metadata: true,
            legacy_encoding_fallback: true,
            max_manifest_size: DEFAULT_MAX_MANIFEST_SIZE,
        }
    }
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_external_metadata(mut self, enabled: bool) -> Self {
        self.resolve_external_metadata = enabled;
        self
    }

    pub fn with_legacy_encoding_fallback(mut self, enabled: bool) -> Self {
        self.legacy_encoding_fallback = enabled;
        self
    }

    pub fn with_max_manifest_size(mut self, bytes: u64) -> Self {
        self.max_manifest_size = bytes;
        self
    }
}
