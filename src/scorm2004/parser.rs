//! SCORM 2004 manifest decoder.

use super::decode::decode_sequencing;
use super::model::{
    CompletionThreshold, DataMap, HideLmsUi, Item, Organization, Organizations, Scorm2004Edition,
    Scorm2004Manifest,
};
use crate::access::FileAccess;
use crate::common::error::{ParseError, ParseResult};
use crate::common::options::ParseOptions;
use crate::common::xml::XmlElement;
use crate::cp::{PackageContext, Resources, load_manifest_document};
use crate::detection::ModuleType;
use crate::manifest::{ModuleMetadata, ModuleParser, ParsedModule};

/// Parses SCORM 2004 packages (2nd, 3rd and 4th Edition).
#[derive(Debug)]
pub struct Scorm2004Parser<A> {
    access: A,
    options: ParseOptions,
}

impl<A: FileAccess> Scorm2004Parser<A> {
    pub fn new(access: A) -> Self {
        Self::with_options(access, ParseOptions::default())
    }

    pub fn with_options(access: A, options: ParseOptions) -> Self {
        Self { access, options }
    }

    /// Parse `imsmanifest.xml` into the SCORM 2004 object graph.
    pub fn parse_manifest(&self) -> ParseResult<Scorm2004Manifest> {
        tracing::debug!(root = self.access.root_path(), "parsing SCORM 2004 manifest");
        let document = load_manifest_document(&self.access, &self.options)?;
        let ctx = PackageContext::new(&self.access, &self.options, &document.path);
        let manifest = decode_manifest(&ctx, &document.root)?;
        tracing::debug!(
            identifier = %manifest.identifier,
            edition = ?manifest.edition,
            organizations = manifest.organizations.organizations.len(),
            resources = manifest.resources.len(),
            "parsed SCORM 2004 manifest"
        );
        Ok(manifest)
    }

    /// Parse and project into [`ModuleMetadata`].
    pub fn parse_metadata(&self) -> ParseResult<ModuleMetadata<Scorm2004Manifest>> {
        ModuleMetadata::from_manifest(self.parse_manifest()?, &self.access)
    }
}

impl<A: FileAccess> ModuleParser for Scorm2004Parser<A> {
    fn module_type(&self) -> ModuleType {
        ModuleType::Scorm2004
    }

    fn parse(&self) -> ParseResult<ParsedModule> {
        self.parse_metadata().map(ParsedModule::Scorm2004)
    }
}

fn decode_manifest(ctx: &PackageContext<'_>, root: &XmlElement) -> ParseResult<Scorm2004Manifest> {
    let metadata = ctx.child_metadata(root)?;
    let edition = metadata
        .as_ref()
        .and_then(|m| m.schema_version.as_deref())
        .and_then(Scorm2004Edition::from_schema_version);

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
    let sequencing_collection = match root.child("sequencingCollection") {
        Some(collection) => collection
            .children_named("sequencing")
            .map(|s| decode_sequencing(ctx, s))
            .collect::<ParseResult<Vec<_>>>()?,
        None => Vec::new(),
    };

    Ok(Scorm2004Manifest {
        identifier: root.attr("identifier").unwrap_or_default().to_string(),
        version: root.attr("version").map(str::to_string),
        base: root.attr_qualified("xml", "base").map(str::to_string),
        metadata,
        edition,
        organizations,
        resources,
        sequencing_collection,
    })
}

fn decode_organization(ctx: &PackageContext<'_>, element: &XmlElement) -> ParseResult<Organization> {
    Ok(Organization {
        identifier: element.attr("identifier").unwrap_or_default().to_string(),
        structure: element.attr("structure").map(str::to_string),
        title: element.child_raw_text("title"),
        items: decode_items(ctx, element)?,
        metadata: ctx.child_metadata(element)?,
        completion_threshold: decode_completion_threshold(ctx, element)?,
        sequencing: element
            .child("sequencing")
            .map(|s| decode_sequencing(ctx, s))
            .transpose()?,
        objectives_global_to_system: ctx.bool_attr(element, "objectivesGlobalToSystem", true)?,
        shared_data_global_to_system: ctx.bool_attr(element, "sharedDataGlobalToSystem", true)?,
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
        time_limit_action: element.child_text("timeLimitAction"),
        data_from_lms: element.child_text("dataFromLMS"),
        completion_threshold: decode_completion_threshold(ctx, element)?,
        sequencing: element
            .child("sequencing")
            .map(|s| decode_sequencing(ctx, s))
            .transpose()?,
        hide_lms_ui: decode_presentation(ctx, element)?,
        data: decode_data(ctx, element)?,
    })
}

fn decode_completion_threshold(
    ctx: &PackageContext<'_>,
    parent: &XmlElement,
) -> ParseResult<Option<CompletionThreshold>> {
    let Some(element) = parent.child("completionThreshold") else {
        return Ok(None);
    };
    let defaults = CompletionThreshold::default();
    let mut threshold = CompletionThreshold {
        completed_by_measure: ctx.bool_attr(element, "completedByMeasure", defaults.completed_by_measure)?,
        min_progress_measure: ctx
            .parse_attr(element, "minProgressMeasure")?
            .unwrap_or(defaults.min_progress_measure),
        progress_weight: ctx
            .parse_attr(element, "progressWeight")?
            .unwrap_or(defaults.progress_weight),
    };
    if let Some(text) = element.trimmed_text() {
        threshold.min_progress_measure = text.parse().map_err(|e| {
            ParseError::format(
                ctx.path,
                element.qualified_name(),
                format!("invalid value '{}': {}", text, e),
            )
        })?;
    }
    Ok(Some(threshold))
}

fn decode_presentation(ctx: &PackageContext<'_>, item: &XmlElement) -> ParseResult<Vec<HideLmsUi>> {
    let Some(interface) = item
        .child("presentation")
        .and_then(|p| p.child("navigationInterface"))
    else {
        return Ok(Vec::new());
    };
    interface
        .children_named("hideLMSUI")
        .map(|hide| {
            let token = hide.text.trim();
            token.parse::<HideLmsUi>().map_err(|e| {
                ParseError::format(ctx.path, hide.qualified_name(), e)
            })
        })
        .collect()
}

fn decode_data(ctx: &PackageContext<'_>, item: &XmlElement) -> ParseResult<Vec<DataMap>> {
    let Some(data) = item.child("data") else {
        return Ok(Vec::new());
    };
    data.children_named("map")
        .map(|map| {
            Ok(DataMap {
                target_id: map
                    .attr("targetID")
                    .ok_or_else(|| ctx.attribute_error(map, "targetID", "missing required attribute"))?
                    .to_string(),
                read_shared_data: ctx.bool_attr(map, "readSharedData", true)?,
                write_shared_data: ctx.bool_attr(map, "writeSharedData", true)?,
            })
        })
        .collect()
}
