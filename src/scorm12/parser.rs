//! SCORM 1.2 manifest decoder.

use super::model::{Item, Organization, Organizations, Scorm12Manifest};
use crate::access::FileAccess;
use crate::common::error::ParseResult;
use crate::common::options::ParseOptions;
use crate::common::xml::XmlElement;
use crate::cp::{PackageContext, Resources, load_manifest_document};
use crate::detection::ModuleType;
use crate::manifest::{ModuleMetadata, ModuleParser, ParsedModule};

/// Parses SCORM 1.2 packages.
#[derive(Debug)]
pub struct Scorm12Parser<A> {
    access: A,
    options: ParseOptions,
}

impl<A: FileAccess> Scorm12Parser<A> {
    pub fn new(access: A) -> Self {
        Self::with_options(access, ParseOptions::default())
    }

    pub fn with_options(access: A, options: ParseOptions) -> Self {
        Self { access, options }
    }

    /// Parse `imsmanifest.xml` into the SCORM 1.2 object graph.
    pub fn parse_manifest(&self) -> ParseResult<Scorm12Manifest> {
        tracing::debug!(root = self.access.root_path(), "parsing SCORM 1.2 manifest");
        let document = load_manifest_document(&self.access, &self.options)?;
        let ctx = PackageContext::new(&self.access, &self.options, &document.path);
        let manifest = decode_manifest(&ctx, &document.root)?;
        tracing::debug!(
            identifier = %manifest.identifier,
            organizations = manifest.organizations.organizations.len(),
            resources = manifest.resources.len(),
            "parsed SCORM 1.2 manifest"
        );
        Ok(manifest)
    }

    /// Parse and project into [`ModuleMetadata`].
    pub fn parse_metadata(&self) -> ParseResult<ModuleMetadata<Scorm12Manifest>> {
        ModuleMetadata::from_manifest(self.parse_manifest()?, &self.access)
    }
}

impl<A: FileAccess> ModuleParser for Scorm12Parser<A> {
    fn module_type(&self) -> ModuleType {
        ModuleType::Scorm12
    }

    fn parse(&self) -> ParseResult<ParsedModule> {
        self.parse_metadata().map(ParsedModule::Scorm12)
    }
}

pub(crate) fn decode_manifest(ctx: &PackageContext<'_>, root: &XmlElement) -> ParseResult<Scorm12Manifest> {
    let organizations = match root.child("organizations") {
        Some(element) => Organizations {
            default: element.attr("default").map(str::to_string),
            organizations: element
                .children_named("organization")
                .map(|o| decode_organization(ctx, o))
                .collect::<ParseResult<Vec<_>>>()?,
        },
        None => Organizations::default(),
    };
    let resources = match root.child("resources") {
        Some(element) => ctx.resources(element)?,
        None => Resources::default(),
    };

    Ok(Scorm12Manifest {
        identifier: root.attr("identifier").unwrap_or_default().to_string(),
        version: root.attr("version").map(str::to_string),
        base: root.attr_qualified("xml", "base").map(str::to_string),
        metadata: ctx.child_metadata(root)?,
        organizations,
        resources,
    })
}

fn decode_organization(ctx: &PackageContext<'_>, element: &XmlElement) -> ParseResult<Organization> {
    Ok(Organization {
        identifier: element.attr("identifier").unwrap_or_default().to_string(),
        structure: element.attr("structure").map(str::to_string),
        title: element.child_raw_text("title"),
        items: decode_items(ctx, element)?,
        metadata: ctx.child_metadata(element)?,
    })
}

fn decode_items(ctx: &PackageContext<'_>, parent: &XmlElement) -> ParseResult<Vec<Item>> {
    parent
        .children_named("item")
        .map(|item| decode_item(ctx, item))
        .collect()
}

fn decode_item(ctx: &PackageContext<'_>, element: &XmlElement) -> ParseResult<Item> {
    Ok(Item {
        identifier: element.attr("identifier").unwrap_or_default().to_string(),
        identifier_ref: element.attr("identifierref").map(str::to_string),
        is_visible: ctx.bool_attr(element, "isvisible", true)?,
        parameters: element.attr("parameters").map(str::to_string),
        title: element.child_raw_text("title"),
        items: decode_items(ctx, element)?,
        metadata: ctx.child_metadata(element)?,
        prerequisites: element.child_text("prerequisites"),
        max_time_allowed: element.child_text("maxtimeallowed"),
        time_limit_action: element.child_text("timelimitaction"),
        data_from_lms: element.child_text("datafromlms"),
        mastery_score: element.child_text("masteryscore"),
    })
}
