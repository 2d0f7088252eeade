//! Priority-ordered detector plugin chain.

use super::aicc::AiccDetectorPlugin;
use super::cmi5::Cmi5DetectorPlugin;
use super::plugin::DetectorPlugin;
use super::scorm::ScormDetectorPlugin;
use super::types::ModuleType;
use crate::access::FileAccess;
use crate::common::error::DetectionError;
use parking_lot::RwLock;
use std::sync::Arc;

/// Runs registered [`DetectorPlugin`]s by descending priority.
///
/// The first plugin to return a type wins. A plugin that fails with an
/// access error ends detection immediately; the remaining plugins are not
/// consulted, because a broken storage backend would otherwise surface as a
/// misleading "wrong type" answer further down the chain.
///
/// Registration may happen concurrently with detection: each run works on a
/// snapshot of the plugin list taken under a read lock.
///
/// # Example
///
/// ```
/// use elearning_module_parser::access::InMemoryFileAccess;
/// use elearning_module_parser::detection::{ModuleType, ModuleTypeDetector};
///
/// let access = InMemoryFileAccess::new("pkg").with_file("cmi5.xml", "<courseStructure/>");
/// let detector = ModuleTypeDetector::with_default_plugins();
/// assert_eq!(detector.detect(&access).unwrap(), ModuleType::Cmi5);
/// ```
#[derive(Default)]
pub struct ModuleTypeDetector {
    plugins: RwLock<Vec<Arc<dyn DetectorPlugin>>>,
}

impl ModuleTypeDetector {
    /// Detector without any plugins.
    pub fn new() -> Self {
        Self::default()
    }

    /// Detector with the AICC, cmi5 and SCORM plugins.
    pub fn with_default_plugins() -> Self {
        let detector = Self::new();
        detector.register(Arc::new(AiccDetectorPlugin));
        detector.register(Arc::new(Cmi5DetectorPlugin));
        detector.register(Arc::new(ScormDetectorPlugin));
        detector
    }

    /// Add a plugin. Registering the same plugin twice is allowed.
    pub fn register(&self, plugin: Arc<dyn DetectorPlugin>) {
        tracing::debug!(plugin = plugin.name(), priority = plugin.priority(), "registering detector plugin");
        self.plugins.write().push(plugin);
    }

    /// Remove the first registration of `plugin`, compared by identity.
    ///
    /// Returns `false` when the plugin was not registered.
    pub fn unregister(&self, plugin: &Arc<dyn DetectorPlugin>) -> bool {
        let mut plugins = self.plugins.write();
        match plugins.iter().position(|p| Arc::ptr_eq(p, plugin)) {
            Some(index) => {
                plugins.remove(index);
                true
            },
            None => false,
        }
    }

    /// Number of registrations.
    pub fn len(&self) -> usize {
        self.plugins.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.read().is_empty()
    }

    /// Snapshot of the plugins in the order they will run.
    pub fn plugins(&self) -> Vec<Arc<dyn DetectorPlugin>> {
        let mut plugins = self.plugins.read().clone();
        // Stable sort keeps registration order for equal priorities.
        plugins.sort_by_key(|p| std::cmp::Reverse(p.priority()));
        plugins
    }

    /// Determine the package's module type.
    pub fn detect(&self, access: &dyn FileAccess) -> Result<ModuleType, DetectionError> {
        for plugin in self.plugins() {
            match plugin.detect(access) {
                Ok(Some(module_type)) => {
                    tracing::debug!(
                        plugin = plugin.name(),
                        root = access.root_path(),
                        %module_type,
                        "module type detected"
                    );
                    return Ok(module_type);
                },
                Ok(None) => {
                    tracing::trace!(plugin = plugin.name(), "detector plugin did not match");
                },
                Err(source) => {
                    tracing::warn!(plugin = plugin.name(), error = %source, "detector plugin failed");
                    return Err(DetectionError::Access {
                        plugin: plugin.name().to_string(),
                        source,
                    });
                },
            }
        }
        Err(DetectionError::NoModuleTypeDetected)
    }
}

impl std::fmt::Debug for ModuleTypeDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<String> = self.plugins().iter().map(|p| p.name().to_string()).collect();
        f.debug_struct("ModuleTypeDetector").field("plugins", &names).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::InMemoryFileAccess;
    use crate::common::error::{AccessError, AccessResult};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedPlugin {
        name: &'static str,
        priority: i32,
        answer: Option<ModuleType>,
        calls: AtomicUsize,
    }

    impl FixedPlugin {
        fn new(name: &'static str, priority: i32, answer: Option<ModuleType>) -> Arc<Self> {
            Arc::new(Self {
                name,
                priority,
                answer,
                calls: AtomicUsize::new(0),
            })
        }
    }

    impl DetectorPlugin for FixedPlugin {
        fn name(&self) -> &str {
            self.name
        }
        fn priority(&self) -> i32 {
            self.priority
        }
        fn detect(&self, _access: &dyn FileAccess) -> AccessResult<Option<ModuleType>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.answer)
        }
    }

    struct BrokenPlugin;

    impl DetectorPlugin for BrokenPlugin {
        fn name(&self) -> &str {
            "broken"
        }
        fn priority(&self) -> i32 {
            100
        }
        fn detect(&self, _access: &dyn FileAccess) -> AccessResult<Option<ModuleType>> {
            Err(AccessError::io("", std::io::Error::other("disk on fire")))
        }
    }

    fn aicc_package() -> InMemoryFileAccess {
        InMemoryFileAccess::new("mem")
            .with_file("course.au", "")
            .with_file("course.crs", "")
            .with_file("imsmanifest.xml", "<manifest/>")
    }

    #[test]
    fn test_highest_priority_wins() {
        let detector = ModuleTypeDetector::with_default_plugins();
        // Both AICC and SCORM markers are present; AICC runs first.
        assert_eq!(detector.detect(&aicc_package()).unwrap(), ModuleType::Aicc);
    }

    #[test]
    fn test_registration_order_does_not_matter() {
        let detector = ModuleTypeDetector::new();
        detector.register(Arc::new(ScormDetectorPlugin));
        detector.register(Arc::new(AiccDetectorPlugin));
        assert_eq!(detector.detect(&aicc_package()).unwrap(), ModuleType::Aicc);
    }

    #[test]
    fn test_ties_keep_registration_order() {
        let detector = ModuleTypeDetector::new();
        detector.register(FixedPlugin::new("first", 10, Some(ModuleType::Cmi5)));
        detector.register(FixedPlugin::new("second", 10, Some(ModuleType::Aicc)));
        let access = InMemoryFileAccess::new("mem");
        assert_eq!(detector.detect(&access).unwrap(), ModuleType::Cmi5);
    }

    #[test]
    fn test_no_match() {
        let detector = ModuleTypeDetector::with_default_plugins();
        let access = InMemoryFileAccess::new("mem").with_file("index.html", "");
        let err = detector.detect(&access).unwrap_err();
        assert!(matches!(err, DetectionError::NoModuleTypeDetected));
        assert_eq!(err.to_string(), "No module type detected");
    }

    #[test]
    fn test_access_failure_is_fatal() {
        let detector = ModuleTypeDetector::new();
        let fallback = FixedPlugin::new("fallback", 1, Some(ModuleType::Scorm12));
        detector.register(fallback.clone());
        detector.register(Arc::new(BrokenPlugin));

        let err = detector.detect(&InMemoryFileAccess::new("mem")).unwrap_err();
        assert!(matches!(err, DetectionError::Access { ref plugin, .. } if plugin == "broken"));
        assert_eq!(fallback.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_duplicates_and_identity_removal() {
        let detector = ModuleTypeDetector::new();
        let plugin: Arc<dyn DetectorPlugin> = FixedPlugin::new("p", 1, None);
        let lookalike: Arc<dyn DetectorPlugin> = FixedPlugin::new("p", 1, None);
        detector.register(plugin.clone());
        detector.register(plugin.clone());
        assert_eq!(detector.len(), 2);

        assert!(!detector.unregister(&lookalike));
        assert!(detector.unregister(&plugin));
        assert_eq!(detector.len(), 1);
        assert!(detector.unregister(&plugin));
        assert!(detector.is_empty());
    }

    #[test]
    fn test_empty_detector_detects_nothing() {
        let detector = ModuleTypeDetector::new();
        assert!(matches!(
            detector.detect(&aicc_package()),
            Err(DetectionError::NoModuleTypeDetected)
        ));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn detection_is_idempotent(
                names in proptest::collection::vec(
                    prop_oneof![
                        Just("course.au"), Just("course.crs"), Just("course.AU"),
                        Just("cmi5.xml"), Just("imsmanifest.xml"), Just("index.html"),
                    ],
                    0..6,
                )
            ) {
                let mut access = InMemoryFileAccess::new("mem");
                for name in names {
                    access.insert(name, "<manifest/>");
                }
                let detector = ModuleTypeDetector::with_default_plugins();
                let first = detector.detect(&access).ok();
                let second = detector.detect(&access).ok();
                prop_assert_eq!(first, second);
            }
        }
    }
}
