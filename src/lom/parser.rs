//! LOM decoding for both XML bindings.

use super::model::{Educational, General, LangString, LifeCycle, Lom, LomIdentifier, Rights, Technical};
use crate::access::{FileAccess, find_file_ignore_case};
use crate::common::error::{ParseError, ParseResult};
use crate::common::options::ParseOptions;
use crate::common::xml::{XmlDocument, XmlElement};

/// Decode a `<lom>` element.
pub fn parse_lom(element: &XmlElement) -> Lom {
    Lom {
        general: element.child("general").map(parse_general),
        lifecycle: element.child("lifecycle").map(parse_lifecycle),
        technical: element.child("technical").map(parse_technical),
        educational: element.child("educational").map(parse_educational),
        rights: element.child("rights").map(parse_rights),
    }
}

/// Load a LOM file referenced by `<adlcp:location>`.
///
/// A missing file is not fatal: it is logged and `None` is returned, since
/// metadata never decides whether content can be delivered. A file that
/// exists but is malformed fails the parse.
pub fn load_external_lom(
    access: &dyn FileAccess,
    location: &str,
    options: &ParseOptions,
) -> ParseResult<Option<Lom>> {
    let location = location.trim();
    if location.is_empty() {
        return Ok(None);
    }
    let found = find_file_ignore_case(access, location).map_err(|e| ParseError::read(location, e))?;
    let Some(path) = found else {
        tracing::warn!(location, "external metadata file not found; skipping");
        return Ok(None);
    };

    let document = XmlDocument::load(access, &path, options)?;
    let root = &document.root;
    if root.is("lom") {
        return Ok(Some(parse_lom(root)));
    }
    // Some authoring tools wrap the record in a <metadata> element.
    match root.descendant("lom") {
        Some(lom) => Ok(Some(parse_lom(lom))),
        None => {
            tracing::warn!(path = %path, root = %root.qualified_name(), "external metadata is not a LOM record; skipping");
            Ok(None)
        },
    }
}

/// Language strings under `element`: `<langstring>` (LOM 1.2) or `<string>` (LOM 2004).
///
/// Plain text without either wrapper is accepted as a single untagged value.
fn lang_strings(element: &XmlElement) -> Vec<LangString> {
    let tagged: Vec<LangString> = element
        .children
        .iter()
        .filter(|c| c.is("langstring") || c.is("string"))
        .map(|c| LangString {
            language: c
                .attr_qualified("xml", "lang")
                .or_else(|| c.attr("language"))
                .map(str::to_string),
            value: c.text.trim().to_string(),
        })
        .collect();
    if !tagged.is_empty() {
        return tagged;
    }
    element.trimmed_text().map(LangString::new).into_iter().collect()
}

fn child_lang_strings(element: &XmlElement, local: &str) -> Vec<LangString> {
    element.child(local).map(lang_strings).unwrap_or_default()
}

/// A vocabulary `<value>`: plain text (2004) or wrapped in `<langstring>` (1.2).
fn vocabulary_value(element: &XmlElement) -> Option<String> {
    let value = element.child("value")?;
    lang_strings(value).into_iter().map(|s| s.value).find(|v| !v.is_empty())
}

/// Duration text: `<duration>` (2004), `<datetime>` (1.2) or bare text.
fn duration_text(element: &XmlElement) -> Option<String> {
    element
        .child_text("duration")
        .or_else(|| element.child_text("datetime"))
        .or_else(|| element.trimmed_text())
}

fn parse_identifier(element: &XmlElement) -> LomIdentifier {
    match (element.child_text("catalog"), element.child_text("entry")) {
        (None, None) => LomIdentifier {
            catalog: None,
            entry: element.trimmed_text(),
        },
        (catalog, entry) => LomIdentifier {
            catalog,
            entry: entry.or_else(|| element.child("entry").and_then(|e| lang_strings(e).into_iter().next().map(|s| s.value))),
        },
    }
}

fn parse_general(element: &XmlElement) -> General {
    let mut identifiers: Vec<LomIdentifier> = element.children_named("identifier").map(parse_identifier).collect();
    // LOM 1.2: <catalogentry><catalog/><entry><langstring/></entry></catalogentry>
    identifiers.extend(element.children_named("catalogentry").map(parse_identifier));

    General {
        identifiers,
        title: child_lang_strings(element, "title"),
        language: element
            .children_named("language")
            .filter_map(XmlElement::trimmed_text)
            .collect(),
        description: element
            .children_named("description")
            .flat_map(lang_strings)
            .collect(),
        keywords: element
            .children_named("keyword")
            .map(lang_strings)
            .filter(|k| !k.is_empty())
            .collect(),
    }
}

fn parse_lifecycle(element: &XmlElement) -> LifeCycle {
    LifeCycle {
        version: child_lang_strings(element, "version"),
        status: element.child("status").and_then(vocabulary_value),
    }
}

fn parse_technical(element: &XmlElement) -> Technical {
    Technical {
        format: element
            .children_named("format")
            .filter_map(XmlElement::trimmed_text)
            .collect(),
        size: element.child_text("size"),
        location: element
            .children_named("location")
            .filter_map(XmlElement::trimmed_text)
            .collect(),
        duration: element.child("duration").and_then(duration_text),
    }
}

fn parse_educational(element: &XmlElement) -> Educational {
    Educational {
        typical_learning_time: element.child("typicallearningtime").and_then(duration_text),
        description: element
            .children_named("description")
            .flat_map(lang_strings)
            .collect(),
    }
}

fn parse_rights(element: &XmlElement) -> Rights {
    Rights {
        cost: element.child("cost").and_then(vocabulary_value),
        copyright_and_other_restrictions: element
            .child("copyrightandotherrestrictions")
            .and_then(vocabulary_value),
        description: child_lang_strings(element, "description"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::InMemoryFileAccess;
    use crate::common::xml::parse_document;
    use std::time::Duration;

    const LOM_12: &str = r#"<lom xmlns="http://www.imsglobal.org/xsd/imsmd_rootv1p2p1">
      <general>
        <identifier>urn:course:42</identifier>
        <title><langstring xml:lang="en-US">Fire Safety</langstring></title>
        <language>en</language>
        <description><langstring xml:lang="en-US">Basic fire safety</langstring></description>
        <keyword><langstring>fire</langstring></keyword>
        <keyword><langstring>safety</langstring></keyword>
      </general>
      <lifecycle>
        <version><langstring>1.0</langstring></version>
        <status><source><langstring>LOMv1.0</langstring></source><value><langstring>Final</langstring></value></status>
      </lifecycle>
      <educational>
        <typicallearningtime><datetime>00:45:00</datetime></typicallearningtime>
      </educational>
      <rights>
        <cost><source><langstring>LOMv1.0</langstring></source><value><langstring>no</langstring></value></cost>
      </rights>
    </lom>"#;

    const LOM_2004: &str = r#"<lom xmlns="http://ltsc.ieee.org/xsd/LOM">
      <general>
        <identifier><catalog>URI</catalog><entry>urn:course:7</entry></identifier>
        <title><string language="en">Golf Explained</string></title>
        <description><string language="en">Rules of golf</string></description>
      </general>
      <technical>
        <format>text/html</format>
        <size>1024</size>
        <duration><duration>PT2H</duration></duration>
      </technical>
      <educational>
        <typicalLearningTime><duration>PT1H30M</duration></typicalLearningTime>
      </educational>
    </lom>"#;

    #[test]
    fn test_lom_12_binding() {
        let lom = parse_lom(&parse_document(LOM_12).unwrap());
        assert_eq!(lom.title(), Some("Fire Safety"));
        assert_eq!(lom.description(), Some("Basic fire safety"));
        assert_eq!(lom.identifier(), Some("urn:course:42"));
        assert_eq!(lom.version(), Some("1.0"));
        assert_eq!(lom.keywords(), vec!["fire", "safety"]);
        assert_eq!(lom.lifecycle.as_ref().unwrap().status.as_deref(), Some("Final"));
        assert_eq!(lom.rights.as_ref().unwrap().cost.as_deref(), Some("no"));
        assert_eq!(lom.typical_learning_time(), Some(Duration::from_secs(2_700)));
        assert_eq!(
            lom.general.as_ref().unwrap().title[0].language.as_deref(),
            Some("en-US")
        );
    }

    #[test]
    fn test_lom_2004_binding() {
        let lom = parse_lom(&parse_document(LOM_2004).unwrap());
        assert_eq!(lom.title(), Some("Golf Explained"));
        assert_eq!(lom.identifier(), Some("urn:course:7"));
        assert_eq!(lom.typical_learning_time(), Some(Duration::from_secs(5_400)));
        let technical = lom.technical.as_ref().unwrap();
        assert_eq!(technical.format, vec!["text/html"]);
        assert_eq!(technical.duration.as_deref(), Some("PT2H"));
    }

    #[test]
    fn test_external_lom() {
        let access = InMemoryFileAccess::new("mem").with_file("metadata/course.xml", LOM_2004);
        let options = ParseOptions::default();
        let lom = load_external_lom(&access, "metadata/course.xml", &options).unwrap().unwrap();
        assert_eq!(lom.title(), Some("Golf Explained"));

        // Missing external metadata is skipped, not fatal.
        assert_eq!(load_external_lom(&access, "missing.xml", &options).unwrap(), None);
    }

    #[test]
    fn test_external_lom_must_be_well_formed() {
        let access = InMemoryFileAccess::new("mem").with_file("broken.xml", "<lom><general></lom>");
        assert!(matches!(
            load_external_lom(&access, "broken.xml", &ParseOptions::default()),
            Err(ParseError::Xml { .. })
        ));
    }
}
