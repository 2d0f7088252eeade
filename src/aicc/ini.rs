//! The course file (`.crs`).
//!
//! `.crs` is INI-like, except that `[Course_Description]` holds free text
//! rather than key/value pairs. That section is cut out before the rest is
//! handed to `rust-ini`. Section and key names are case-insensitive and
//! returned lowercase.

use crate::common::error::{ParseError, ParseResult};
use ini::{Ini, ParseOption};
use std::collections::HashMap;

/// Name of the free-text section, lowercase.
pub const DESCRIPTION_SECTION: &str = "course_description";

/// Sections of a course file: lowercase section name to lowercase key to value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CourseFile {
    pub sections: HashMap<String, HashMap<String, String>>,
    /// Text of `[Course_Description]`, trimmed
    pub description: Option<String>,
}

impl CourseFile {
    pub fn section(&self, name: &str) -> Option<&HashMap<String, String>> {
        self.sections.get(&name.to_ascii_lowercase())
    }

    /// Value of `key` in `section`, `None` when absent or blank.
    pub fn value(&self, section: &str, key: &str) -> Option<&str> {
        self.section(section)?
            .get(&key.to_ascii_lowercase())
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }
}

/// Parse the text of a course file; `file` names the source in errors.
pub fn parse_course_file(text: &str, file: &str) -> ParseResult<CourseFile> {
    let (rest, description) = lift_description(text);
    let options = ParseOption {
        enabled_quote: false,
        enabled_escape: false,
        ..Default::default()
    };
    let ini = Ini::load_from_str_opt(&rest, options).map_err(|e| ParseError::from(e).in_file(file))?;

    let mut sections: HashMap<String, HashMap<String, String>> = HashMap::new();
    for (name, properties) in ini.iter() {
        let Some(name) = name else {
            // Keys before the first section header carry no meaning.
            continue;
        };
        let section = sections.entry(name.trim().to_ascii_lowercase()).or_default();
        for (key, value) in properties.iter() {
            section.insert(key.trim().to_ascii_lowercase(), value.trim().to_string());
        }
    }
    Ok(CourseFile { sections, description })
}

fn section_header(line: &str) -> Option<&str> {
    let line = line.trim();
    line.strip_prefix('[')?.strip_suffix(']').map(str::trim)
}

/// Split off `[Course_Description]`, returning the remaining text and the description.
fn lift_description(text: &str) -> (String, Option<String>) {
    let mut rest = String::with_capacity(text.len());
    let mut description = String::new();
    let mut in_description = false;
    let mut found = false;

    for line in text.lines() {
        if let Some(header) = section_header(line) {
            in_description = header.eq_ignore_ascii_case(DESCRIPTION_SECTION);
            found |= in_description;
            if in_description {
                continue;
            }
        }
        let target = if in_description { &mut description } else { &mut rest };
        target.push_str(line);
        target.push('\n');
    }

    let description = description.trim();
    let description = (found && !description.is_empty()).then(|| description.to_string());
    (rest, description)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CRS: &str = "[Course]\r\n\
        Course_Creator=Example Corp\r\n\
        Course_ID=COURSE-1\r\n\
        Course_System=HTML\r\n\
        Course_Title=Test AICC Course\r\n\
        Level=1\r\n\
        Max_Fields_CST=2\r\n\
        Total_AUs=1\r\n\
        Total_Blocks=0\r\n\
        Version=2.0\r\n\
        [Course_Behavior]\r\n\
        Max_Normal=99\r\n\
        [Course_Description]\r\n\
        A course; with = signs, [brackets] and\r\n\
        several lines.\r\n";

    #[test]
    fn test_sections_and_keys_are_lowercased() {
        let course = parse_course_file(CRS, "course.crs").unwrap();
        assert_eq!(course.value("Course", "Course_Title"), Some("Test AICC Course"));
        assert_eq!(course.value("course", "version"), Some("2.0"));
        assert_eq!(course.value("COURSE_BEHAVIOR", "max_normal"), Some("99"));
        assert_eq!(course.value("course", "missing"), None);
    }

    #[test]
    fn test_description_is_free_text() {
        let course = parse_course_file(CRS, "course.crs").unwrap();
        assert_eq!(
            course.description.as_deref(),
            Some("A course; with = signs, [brackets] and\nseveral lines.")
        );
        assert!(course.section(DESCRIPTION_SECTION).is_none());
    }

    #[test]
    fn test_description_section_in_the_middle() {
        let text = "[Course_Description]\nIntro text\n[Course]\nCourse_Title=T\n";
        let course = parse_course_file(text, "c.crs").unwrap();
        assert_eq!(course.description.as_deref(), Some("Intro text"));
        assert_eq!(course.value("course", "course_title"), Some("T"));
    }

    #[test]
    fn test_malformed_line_names_file() {
        let err = parse_course_file("[Course\nCourse_Title=T\n", "broken.crs").unwrap_err();
        assert!(matches!(err, ParseError::Format { ref file, .. } if file == "broken.crs"));
    }
}
