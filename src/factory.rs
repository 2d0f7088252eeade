//! Detection plus dispatch to a registered parser.

use crate::access::FileAccess;
use crate::aicc::AiccParser;
use crate::cmi5::Cmi5Parser;
use crate::common::error::{DetectionError, Result};
use crate::common::options::ParseOptions;
use crate::detection::{ModuleType, ModuleTypeDetector};
use crate::manifest::{ModuleParser, ParsedModule};
use crate::scorm12::Scorm12Parser;
use crate::scorm2004::Scorm2004Parser;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Builds a parser bound to one package.
pub type ParserConstructor = Arc<dyn Fn(Arc<dyn FileAccess>, ParseOptions) -> Box<dyn ModuleParser> + Send + Sync>;

/// Maps each [`ModuleType`] to a parser constructor.
///
/// [`parser`](Self::parser) detects the package type first, so it fails
/// either with the detector's error or with
/// [`DetectionError::NoParserRegistered`] when detection succeeded but
/// nothing handles the type.
///
/// # Example
///
/// ```
/// use elearning_module_parser::access::InMemoryFileAccess;
/// use elearning_module_parser::detection::ModuleType;
/// use elearning_module_parser::factory::ModuleParserFactory;
/// use std::sync::Arc;
///
/// let access = InMemoryFileAccess::new("pkg").with_file(
///     "cmi5.xml",
///     r#"<courseStructure>
///          <course id="c1"><title><langstring lang="en">Intro</langstring></title></course>
///          <au id="au1"><url>index.html</url></au>
///        </courseStructure>"#,
/// );
/// let factory = ModuleParserFactory::with_default_parsers();
/// let module = factory.parse_module(Arc::new(access)).unwrap();
/// assert_eq!(module.module_type(), ModuleType::Cmi5);
/// assert_eq!(module.launch_url(), Some("index.html"));
/// assert!(module.validate().is_valid());
/// ```
pub struct ModuleParserFactory {
    detector: ModuleTypeDetector,
    options: ParseOptions,
    constructors: RwLock<HashMap<ModuleType, ParserConstructor>>,
}

impl ModuleParserFactory {
    /// Factory without registered parsers.
    pub fn new(detector: ModuleTypeDetector) -> Self {
        Self {
            detector,
            options: ParseOptions::default(),
            constructors: RwLock::new(HashMap::new()),
        }
    }

    /// Factory with the default detector plugins and a parser for every
    /// module type.
    pub fn with_default_parsers() -> Self {
        let factory = Self::new(ModuleTypeDetector::with_default_plugins());
        factory.register(ModuleType::Scorm12, |access, options| {
            Box::new(Scorm12Parser::with_options(access, options))
        });
        factory.register(ModuleType::Scorm2004, |access, options| {
            Box::new(Scorm2004Parser::with_options(access, options))
        });
        factory.register(ModuleType::Aicc, |access, options| {
            Box::new(AiccParser::with_options(access, options))
        });
        factory.register(ModuleType::Cmi5, |access, options| {
            Box::new(Cmi5Parser::with_options(access, options))
        });
        factory
    }

    /// Options handed to every parser this factory builds.
    pub fn with_options(mut self, options: ParseOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    pub fn detector(&self) -> &ModuleTypeDetector {
        &self.detector
    }

    /// Register the constructor for `module_type`, replacing any previous one.
    pub fn register<F>(&self, module_type: ModuleType, constructor: F)
    where
        F: Fn(Arc<dyn FileAccess>, ParseOptions) -> Box<dyn ModuleParser> + Send + Sync + 'static,
    {
        tracing::debug!(%module_type, "registering parser");
        self.constructors.write().insert(module_type, Arc::new(constructor));
    }

    /// Remove the constructor for `module_type`.
    ///
    /// Returns `false` when none was registered.
    pub fn unregister(&self, module_type: ModuleType) -> bool {
        self.constructors.write().remove(&module_type).is_some()
    }

    pub fn is_registered(&self, module_type: ModuleType) -> bool {
        self.constructors.read().contains_key(&module_type)
    }

    /// Detect the package type and build its parser.
    pub fn parser(&self, access: Arc<dyn FileAccess>) -> std::result::Result<Box<dyn ModuleParser>, DetectionError> {
        let module_type = self.detector.detect(access.as_ref())?;
        // Clone out of the lock so a constructor may use the factory.
        let constructor = self
            .constructors
            .read()
            .get(&module_type)
            .cloned()
            .ok_or(DetectionError::NoParserRegistered(module_type))?;
        Ok(constructor(access, self.options.clone()))
    }

    /// Detect, then parse.
    pub fn parse_module(&self, access: Arc<dyn FileAccess>) -> Result<ParsedModule> {
        let parser = self.parser(access)?;
        let module = parser.parse()?;
        tracing::info!(
            module_type = %module.module_type(),
            title = module.title().unwrap_or_default(),
            "parsed package"
        );
        Ok(module)
    }
}

impl Default for ModuleParserFactory {
    fn default() -> Self {
        Self::with_default_parsers()
    }
}

impl std::fmt::Debug for ModuleParserFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut types: Vec<ModuleType> = self.constructors.read().keys().copied().collect();
        types.sort_by_key(|t| t.as_str());
        f.debug_struct("ModuleParserFactory")
            .field("detector", &self.detector)
            .field("options", &self.options)
            .field("parsers", &types)
            .finish()
    }
}
