//! `cmi5.xml` decoder.

use super::model::{AssignableUnit, Block, Cmi5Course, Cmi5Manifest, Cmi5Objective, CourseNode};
use crate::access::{FileAccess, find_file_ignore_case};
use crate::common::error::{ParseError, ParseResult};
use crate::common::options::ParseOptions;
use crate::common::xml::{XmlDocument, XmlElement};
use crate::cp::PackageContext;
use crate::detection::ModuleType;
use crate::detection::cmi5::CMI5_MANIFEST;
use crate::lom::LangString;
use crate::manifest::{ModuleMetadata, ModuleParser, ParsedModule};

/// Parses cmi5 packages.
#[derive(Debug)]
pub struct Cmi5Parser<A> {
    access: A,
    options: ParseOptions,
}

impl<A: FileAccess> Cmi5Parser<A> {
    pub fn new(access: A) -> Self {
        Self::with_options(access, ParseOptions::default())
    }

    pub fn with_options(access: A, options: ParseOptions) -> Self {
        Self { access, options }
    }

    /// Parse `cmi5.xml`.
    pub fn parse_manifest(&self) -> ParseResult<Cmi5Manifest> {
        tracing::debug!(root = self.access.root_path(), "parsing cmi5 course structure");
        let path = find_file_ignore_case(&self.access, CMI5_MANIFEST)
            .map_err(|e| ParseError::list(CMI5_MANIFEST, e))?
            .ok_or_else(|| ParseError::MissingFile(CMI5_MANIFEST.to_string()))?;
        let document = XmlDocument::load(&self.access, &path, &self.options)?;
        if document.used_fallback() {
            tracing::warn!(path = %path, "course structure decoded with the Windows-1252 fallback");
        }
        let root = &document.root;
        if !root.is("courseStructure") {
            return Err(ParseError::format(
                &path,
                "root element",
                format!("expected <courseStructure>, found <{}>", root.qualified_name()),
            ));
        }

        let ctx = PackageContext::new(&self.access, &self.options, &path);
        let course = root
            .child("course")
            .map(|course| Cmi5Course {
                id: course.attr("id").map(str::to_string),
                title: lang_strings(course, "title"),
                description: lang_strings(course, "description"),
            })
            .unwrap_or_default();
        let objectives = root
            .child("objectives")
            .map(|objectives| {
                objectives
                    .children_named("objective")
                    .map(|o| Cmi5Objective {
                        id: o.attr("id").unwrap_or_default().to_string(),
                        title: lang_strings(o, "title"),
                        description: lang_strings(o, "description"),
                    })
                    .collect()
            })
            .unwrap_or_default();

        let manifest = Cmi5Manifest {
            course,
            objectives,
            children: decode_children(&ctx, root)?,
        };
        tracing::debug!(
            assignable_units = manifest.assignable_units().len(),
            blocks = manifest.blocks().len(),
            "parsed cmi5 course structure"
        );
        Ok(manifest)
    }

    /// Parse and project into [`ModuleMetadata`].
    pub fn parse_metadata(&self) -> ParseResult<ModuleMetadata<Cmi5Manifest>> {
        ModuleMetadata::from_manifest(self.parse_manifest()?, &self.access)
    }
}

impl<A: FileAccess> ModuleParser for Cmi5Parser<A> {
    fn module_type(&self) -> ModuleType {
        ModuleType::Cmi5
    }

    fn parse(&self) -> ParseResult<ParsedModule> {
        self.parse_metadata().map(ParsedModule::Cmi5)
    }
}

/// `<langstring lang="...">` children of the named child element.
fn lang_strings(parent: &XmlElement, local: &str) -> Vec<LangString> {
    let Some(element) = parent.child(local) else {
        return Vec::new();
    };
    element
        .children_named("langstring")
        .map(|s| LangString {
            language: s.attr("lang").map(str::to_string),
            value: s.text.clone(),
        })
        .collect()
}

fn objective_refs(element: &XmlElement) -> Vec<String> {
    element
        .child("objectives")
        .map(|objectives| {
            objectives
                .children_named("objective")
                .filter_map(|o| o.attr("idref"))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn decode_children(ctx: &PackageContext<'_>, parent: &XmlElement) -> ParseResult<Vec<CourseNode>> {
    parent
        .children
        .iter()
        .filter_map(|child| {
            if child.is("au") {
                Some(decode_au(ctx, child).map(CourseNode::Au))
            } else if child.is("block") {
                Some(decode_block(ctx, child).map(CourseNode::Block))
            } else {
                None
            }
        })
        .collect()
}

fn decode_block(ctx: &PackageContext<'_>, element: &XmlElement) -> ParseResult<Block> {
    Ok(Block {
        id: element.attr("id").unwrap_or_default().to_string(),
        title: lang_strings(element, "title"),
        description: lang_strings(element, "description"),
        objectives: objective_refs(element),
        children: decode_children(ctx, element)?,
    })
}

fn decode_au(ctx: &PackageContext<'_>, element: &XmlElement) -> ParseResult<AssignableUnit> {
    Ok(AssignableUnit {
        id: element.attr("id").unwrap_or_default().to_string(),
        title: lang_strings(element, "title"),
        description: lang_strings(element, "description"),
        url: element.child_raw_text("url"),
        move_on: ctx.parse_attr(element, "moveOn")?.unwrap_or_default(),
        mastery_score: ctx.parse_attr(element, "masteryScore")?,
        launch_method: ctx.parse_attr(element, "launchMethod")?.unwrap_or_default(),
        activity_type: element.attr("activityType").map(str::to_string),
        launch_parameters: element.child_text("launchParameters"),
        entitlement_key: element.child_text("entitlementKey"),
        objectives: objective_refs(element),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::InMemoryFileAccess;
    use crate::cmi5::{LaunchMethod, MoveOn};
    use crate::manifest::PackageManifest;

    const CMI5: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<courseStructure xmlns="https://w3id.org/xapi/profiles/cmi5/v1/CourseStructure.xsd">
  <course id="https://example.com/courses/intro">
    <title><langstring lang="en-US">Introduction to Geology</langstring></title>
    <description><langstring lang="en-US">Rocks and minerals</langstring></description>
  </course>
  <objectives>
    <objective id="https://example.com/objectives/rocks">
      <title><langstring lang="en-US">Rocks</langstring></title>
    </objective>
  </objectives>
  <block id="https://example.com/blocks/1">
    <title><langstring lang="en-US">Module 1</langstring></title>
    <au id="https://example.com/aus/1" moveOn="CompletedAndPassed" masteryScore="0.8" launchMethod="OwnWindow">
      <title><langstring lang="en-US">Lesson 1</langstring></title>
      <objectives><objective idref="https://example.com/objectives/rocks"/></objectives>
      <url>lesson1/index.html</url>
      <launchParameters>{"mode":"guided"}</launchParameters>
    </au>
  </block>
  <au id="https://example.com/aus/2">
    <title><langstring lang="en-US">Final Quiz</langstring></title>
    <url>quiz/index.html</url>
  </au>
</courseStructure>"#;

    fn parse(xml: &str) -> ParseResult<Cmi5Manifest> {
        Cmi5Parser::new(InMemoryFileAccess::new("mem").with_file("cmi5.xml", xml.to_string())).parse_manifest()
    }

    #[test]
    fn test_course_structure() {
        let manifest = parse(CMI5).unwrap();
        assert_eq!(manifest.title(), Some("Introduction to Geology"));
        assert_eq!(manifest.description(), Some("Rocks and minerals"));
        assert_eq!(manifest.identifier(), Some("https://example.com/courses/intro"));
        // First AU in document order, nested inside the block.
        assert_eq!(manifest.launch_url(), Some("lesson1/index.html"));
        assert_eq!(manifest.blocks().len(), 1);
        assert!(manifest.declares_objective("https://example.com/objectives/rocks"));

        let aus = manifest.assignable_units();
        assert_eq!(aus.len(), 2);
        assert_eq!(aus[0].move_on, MoveOn::CompletedAndPassed);
        assert_eq!(aus[0].mastery_score, Some(0.8));
        assert_eq!(aus[0].launch_method, LaunchMethod::OwnWindow);
        assert_eq!(aus[0].launch_parameters.as_deref(), Some(r#"{"mode":"guided"}"#));
        assert_eq!(aus[0].objectives, vec!["https://example.com/objectives/rocks"]);
        assert_eq!(aus[1].move_on, MoveOn::NotApplicable);
        assert_eq!(aus[1].launch_method, LaunchMethod::AnyWindow);
    }

    #[test]
    fn test_title_and_url_are_kept_as_written() {
        let xml = CMI5
            .replace(">Introduction to Geology<", "> Introduction to Geology <")
            .replace("<url>lesson1/index.html</url>", "<url> lesson1/index.html</url>");
        let manifest = parse(&xml).unwrap();
        assert_eq!(manifest.title(), Some(" Introduction to Geology "));
        assert_eq!(manifest.launch_url(), Some(" lesson1/index.html"));
    }

    #[test]
    fn test_no_assignable_units_means_no_launch_url() {
        let manifest = parse(r#"<courseStructure><course id="c"><title><langstring>T</langstring></title></course></courseStructure>"#)
            .unwrap();
        assert_eq!(manifest.launch_url(), None);
    }

    #[test]
    fn test_unknown_move_on_fails() {
        let xml = r#"<courseStructure><au id="a" moveOn="Whenever"><url>a.html</url></au></courseStructure>"#;
        assert!(matches!(parse(xml), Err(ParseError::Format { ref field, .. }) if field == "au@moveOn"));
    }

    #[test]
    fn test_wrong_root_element() {
        assert!(matches!(parse("<manifest/>"), Err(ParseError::Format { .. })));
    }

    #[test]
    fn test_metadata_is_xapi_enabled() {
        let parser = Cmi5Parser::new(InMemoryFileAccess::new("mem").with_file("cmi5.xml", CMI5));
        let metadata = parser.parse_metadata().unwrap();
        assert!(metadata.xapi_enabled);
        assert_eq!(metadata.module_type, ModuleType::Cmi5);
    }
}
