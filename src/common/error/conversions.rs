//! Error conversion implementations.
//!
//! This module contains From trait implementations to convert from third-party
//! error types to the crate's error enums.

use super::types::{AccessError, ParseError};

#[cfg(feature = "zip")]
impl From<zip::result::ZipError> for AccessError {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => AccessError::Io {
                path: String::new(),
                source: e,
            },
            zip::result::ZipError::FileNotFound => AccessError::not_found(String::new()),
            other => AccessError::Zip(other.to_string()),
        }
    }
}

impl From<quick_xml::Error> for ParseError {
    fn from(err: quick_xml::Error) -> Self {
        ParseError::Xml {
            path: String::new(),
            position: 0,
            message: err.to_string(),
        }
    }
}

impl From<ini::ParseError> for ParseError {
    fn from(err: ini::ParseError) -> Self {
        ParseError::Format {
            file: String::new(),
            field: format!("line {}", err.line),
            message: err.msg.to_string(),
        }
    }
}

impl ParseError {
    /// Attaches the file name to a format error produced without one.
    pub(crate) fn in_file(self, file: &str) -> Self {
        match self {
            ParseError::Format {
                file: f,
                field,
                message,
            } if f.is_empty() => ParseError::Format {
                file: file.to_string(),
                field,
                message,
            },
            ParseError::Xml {
                path,
                position,
                message,
            } if path.is_empty() => ParseError::Xml {
                path: file.to_string(),
                position,
                message,
            },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xml_error_gets_file_name() {
        let mut reader = quick_xml::Reader::from_str("<a></b>");
        let err = loop {
            match reader.read_event() {
                Ok(quick_xml::events::Event::Eof) => panic!("mismatched tags accepted"),
                Ok(_) => {},
                Err(e) => break e,
            }
        };
        let err = ParseError::from(err).in_file("imsmanifest.xml");
        assert!(matches!(err, ParseError::Xml { ref path, .. } if path == "imsmanifest.xml"));
    }

    #[test]
    fn test_ini_error_names_line() {
        let err = ini::Ini::load_from_str("[Course]\n[Broken").unwrap_err();
        match ParseError::from(err).in_file("course.crs") {
            ParseError::Format { file, field, .. } => {
                assert_eq!(file, "course.crs");
                assert!(field.starts_with("line "));
            },
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_in_file_keeps_existing_file() {
        let err = ParseError::format("a.au", "system_id", "missing").in_file("b.au");
        assert!(matches!(err, ParseError::Format { ref file, .. } if file == "a.au"));
    }
}
