//! Detector plugin trait.

use super::types::ModuleType;
use crate::access::FileAccess;
use crate::common::error::AccessResult;

/// A single detection heuristic.
///
/// Plugins are run by [`ModuleTypeDetector`](super::ModuleTypeDetector) in
/// descending [`priority`](DetectorPlugin::priority) order. Returning
/// `Ok(None)` passes the package on to the next plugin; returning an error
/// aborts detection altogether.
pub trait DetectorPlugin: Send + Sync {
    /// Human-readable name, used in logs and errors.
    fn name(&self) -> &str;

    /// Higher runs earlier.
    fn priority(&self) -> i32;

    /// Inspect the package.
    fn detect(&self, access: &dyn FileAccess) -> AccessResult<Option<ModuleType>>;
}
