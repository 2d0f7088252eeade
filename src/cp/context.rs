//! Manifest loading and the decoding context shared by both SCORM parsers.

use super::metadata::CpMetadata;
use super::resource::{Resource, ResourceFile, Resources, ScormType};
use crate::access::{FileAccess, find_file_ignore_case};
use crate::common::error::{ParseError, ParseResult};
use crate::common::options::ParseOptions;
use crate::common::xml::{XmlDocument, XmlElement, parse_bool};
use crate::lom::{load_external_lom, parse_lom};
use std::fmt::Display;
use std::str::FromStr;

/// Name of the IMS manifest at the package root.
pub const MANIFEST_FILE: &str = "imsmanifest.xml";

/// Locate and parse `imsmanifest.xml`.
///
/// The file name is matched case-insensitively, but only at the package
/// root: a manifest in a subdirectory is never picked up.
pub fn load_manifest_document(access: &dyn FileAccess, options: &ParseOptions) -> ParseResult<XmlDocument> {
    let path = find_file_ignore_case(access, MANIFEST_FILE)
        .map_err(|e| ParseError::list(MANIFEST_FILE, e))?
        .ok_or_else(|| ParseError::MissingFile(MANIFEST_FILE.to_string()))?;
    let document = XmlDocument::load(access, &path, options)?;
    if !document.root.is("manifest") {
        return Err(ParseError::format(
            &path,
            "root element",
            format!("expected <manifest>, found <{}>", document.root.qualified_name()),
        ));
    }
    if document.used_fallback() {
        tracing::warn!(path = %path, "manifest decoded with the Windows-1252 fallback");
    }
    Ok(document)
}

/// Everything a manifest decoder needs besides the element it is looking at.
#[derive(Clone, Copy)]
pub struct PackageContext<'a> {
    pub access: &'a dyn FileAccess,
    pub options: &'a ParseOptions,
    /// Path of the manifest file, for error messages
    pub path: &'a str,
}

impl<'a> PackageContext<'a> {
    pub fn new(access: &'a dyn FileAccess, options: &'a ParseOptions, path: &'a str) -> Self {
        Self { access, options, path }
    }

    /// Error naming an attribute of `element`.
    pub fn attribute_error(&self, element: &XmlElement, attribute: &str, message: impl Into<String>) -> ParseError {
        ParseError::format(
            self.path,
            format!("{}@{}", element.qualified_name(), attribute),
            message,
        )
    }

    /// Parse an optional attribute with [`FromStr`].
    pub fn parse_attr<T>(&self, element: &XmlElement, attribute: &str) -> ParseResult<Option<T>>
    where
        T: FromStr,
        T::Err: Display,
    {
        match element.attr(attribute) {
            Some(raw) => raw
                .trim()
                .parse::<T>()
                .map(Some)
                .map_err(|e| self.attribute_error(element, attribute, format!("invalid value '{}': {}", raw, e))),
            None => Ok(None),
        }
    }

    /// Parse an optional `xs:boolean` attribute, with a default.
    pub fn bool_attr(&self, element: &XmlElement, attribute: &str, default: bool) -> ParseResult<bool> {
        match element.attr(attribute) {
            Some(raw) => parse_bool(raw).ok_or_else(|| {
                self.attribute_error(element, attribute, format!("invalid boolean '{}'", raw))
            }),
            None => Ok(default),
        }
    }

    /// Decode a `<metadata>` element.
    ///
    /// An `<adlcp:location>` is resolved when external metadata is enabled;
    /// an external record takes the place of any inline one.
    pub fn metadata(&self, element: &XmlElement) -> ParseResult<CpMetadata> {
        let location = element.child_text("location");
        let mut lom = element.child("lom").map(parse_lom);
        if let Some(location) = &location {
            if self.options.resolve_external_metadata {
                if let Some(external) = load_external_lom(self.access, location, self.options)? {
                    lom = Some(external);
                }
            } else {
                tracing::debug!(location = %location, "external metadata resolution disabled");
            }
        }
        Ok(CpMetadata {
            schema: element.child_text("schema"),
            schema_version: element.child_text("schemaversion"),
            location,
            lom,
        })
    }

    /// Decode the optional `<metadata>` child of `element`.
    pub fn child_metadata(&self, element: &XmlElement) -> ParseResult<Option<CpMetadata>> {
        element.child("metadata").map(|m| self.metadata(m)).transpose()
    }

    /// Decode `<resources>`.
    pub fn resources(&self, element: &XmlElement) -> ParseResult<Resources> {
        let resources = element
            .children_named("resource")
            .map(|r| self.resource(r))
            .collect::<ParseResult<Vec<_>>>()?;
        Ok(Resources {
            base: element.attr_qualified("xml", "base").map(str::to_string),
            resources,
        })
    }

    fn resource(&self, element: &XmlElement) -> ParseResult<Resource> {
        let scorm_type = match element.attr_ignore_case("scormType") {
            Some(raw) => Some(
                raw.parse::<ScormType>()
                    .map_err(|e| self.attribute_error(element, "adlcp:scormType", e))?,
            ),
            None => None,
        };
        let files = element
            .children_named("file")
            .map(|f| {
                Ok(ResourceFile {
                    href: f.attr("href").unwrap_or_default().to_string(),
                    metadata: self.child_metadata(f)?,
                })
            })
            .collect::<ParseResult<Vec<_>>>()?;

        Ok(Resource {
            identifier: element.attr("identifier").unwrap_or_default().to_string(),
            resource_type: element.attr("type").map(str::to_string),
            scorm_type,
            href: element.attr("href").map(str::to_string),
            base: element.attr_qualified("xml", "base").map(str::to_string),
            files,
            dependencies: element
                .children_named("dependency")
                .filter_map(|d| d.attr("identifierref"))
                .map(str::to_string)
                .collect(),
            metadata: self.child_metadata(element)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::InMemoryFileAccess;
    use crate::common::xml::parse_document;

    const LOM: &str = r#"<lom><general><title><string>External</string></title></general></lom>"#;

    fn context<'a>(access: &'a InMemoryFileAccess, options: &'a ParseOptions) -> PackageContext<'a> {
        PackageContext::new(access, options, MANIFEST_FILE)
    }

    #[test]
    fn test_manifest_lookup_is_root_only() {
        let options = ParseOptions::default();
        let upper = InMemoryFileAccess::new("mem").with_file("IMSManifest.XML", "<manifest/>");
        assert_eq!(load_manifest_document(&upper, &options).unwrap().path, "IMSManifest.XML");

        let nested = InMemoryFileAccess::new("mem").with_file("course/imsmanifest.xml", "<manifest/>");
        assert!(matches!(
            load_manifest_document(&nested, &options),
            Err(ParseError::MissingFile(ref f)) if f == "imsmanifest.xml"
        ));
    }

    #[test]
    fn test_manifest_root_must_be_manifest() {
        let access = InMemoryFileAccess::new("mem").with_file("imsmanifest.xml", "<package/>");
        assert!(matches!(
            load_manifest_document(&access, &ParseOptions::default()),
            Err(ParseError::Format { .. })
        ));
    }

    #[test]
    fn test_external_metadata_resolution() {
        let access = InMemoryFileAccess::new("mem").with_file("meta/course.xml", LOM);
        let element = parse_document(
            "<metadata><schema>ADL SCORM</schema><schemaversion>1.2</schemaversion>\
             <adlcp:location>meta/course.xml</adlcp:location></metadata>",
        )
        .unwrap();

        let options = ParseOptions::default();
        let metadata = context(&access, &options).metadata(&element).unwrap();
        assert_eq!(metadata.schema_version.as_deref(), Some("1.2"));
        assert_eq!(metadata.title(), Some("External"));

        let disabled = ParseOptions::default().with_external_metadata(false);
        let metadata = context(&access, &disabled).metadata(&element).unwrap();
        assert_eq!(metadata.location.as_deref(), Some("meta/course.xml"));
        assert_eq!(metadata.lom, None);
    }

    #[test]
    fn test_resources() {
        let access = InMemoryFileAccess::new("mem");
        let options = ParseOptions::default();
        let element = parse_document(
            r#"<resources xml:base="content/">
                 <resource identifier="R1" type="webcontent" adlcp:scormtype="sco" href="index.html">
                   <file href="index.html"/><file href="app.js"/>
                   <dependency identifierref="SHARED"/>
                 </resource>
                 <resource identifier="SHARED" type="webcontent" adlcp:scormType="asset"/>
               </resources>"#,
        )
        .unwrap();
        let resources = context(&access, &options).resources(&element).unwrap();
        assert_eq!(resources.base.as_deref(), Some("content/"));
        assert_eq!(resources.len(), 2);
        let r1 = resources.get("R1").unwrap();
        assert!(r1.is_sco());
        assert_eq!(r1.files.len(), 2);
        assert_eq!(r1.dependencies, vec!["SHARED"]);
        assert_eq!(resources.get("SHARED").unwrap().scorm_type, Some(ScormType::Asset));
    }

    #[test]
    fn test_unknown_scorm_type_names_attribute() {
        let access = InMemoryFileAccess::new("mem");
        let options = ParseOptions::default();
        let element =
            parse_document(r#"<resources><resource identifier="R" adlcp:scormType="lesson"/></resources>"#).unwrap();
        let err = context(&access, &options).resources(&element).unwrap_err();
        assert!(matches!(err, ParseError::Format { ref field, .. } if field == "resource@adlcp:scormType"));
    }
}
