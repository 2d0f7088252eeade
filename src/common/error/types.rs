//! Error enums for the detection, parsing and file access stages.
use crate::detection::ModuleType;
use thiserror::Error;

/// Errors raised by a [`FileAccess`](crate::access::FileAccess) backend.
#[derive(Error, Debug)]
pub enum AccessError {
    /// IO error while touching a specific path
    #[error("IO error on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Requested file does not exist
    #[error("File not found: {path}{}", format_similar(.similar))]
    NotFound { path: String, similar: Vec<String> },

    /// Caller passed an unusable argument (empty path and the like)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// ZIP archive error
    #[error("ZIP error: {0}")]
    Zip(String),
}

impl AccessError {
    /// Wraps an IO error with the path it occurred on.
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        AccessError::Io {
            path: path.into(),
            source,
        }
    }

    /// Not-found error without any near-miss suggestions.
    pub fn not_found(path: impl Into<String>) -> Self {
        AccessError::NotFound {
            path: path.into(),
            similar: Vec::new(),
        }
    }
}

fn format_similar(similar: &[String]) -> String {
    if similar.is_empty() {
        String::new()
    } else {
        format!(" (similar files found: {})", similar.join(", "))
    }
}

/// Errors raised while deciding which standard a package uses.
#[derive(Error, Debug)]
pub enum DetectionError {
    /// No registered plugin recognised the package
    #[error("No module type detected")]
    NoModuleTypeDetected,

    /// A plugin hit a storage fault; detection stops at the first one
    #[error("Detector '{plugin}' failed to inspect the package: {source}")]
    Access {
        plugin: String,
        #[source]
        source: AccessError,
    },

    /// Detection succeeded but nothing can parse the detected type
    #[error("No parser registered for module type {0}")]
    NoParserRegistered(ModuleType),
}

/// Errors raised while turning a package into a manifest object graph.
#[derive(Error, Debug)]
pub enum ParseError {
    /// File access fault, with the file and operation it happened in
    #[error("Failed to {operation} '{path}': {source}")]
    Access {
        path: String,
        operation: &'static str,
        #[source]
        source: AccessError,
    },

    /// A file the standard requires is absent
    #[error("Missing required file: {0}")]
    MissingFile(String),

    /// The file exceeds the configured manifest size limit
    #[error("File '{path}' is {size} bytes, exceeding the {limit} byte limit")]
    TooLarge { path: String, size: u64, limit: u64 },

    /// Text could not be decoded
    #[error("Encoding error in '{path}': {message}")]
    Encoding { path: String, message: String },

    /// XML is not well formed
    #[error("Malformed XML in '{path}' at byte {position}: {message}")]
    Xml {
        path: String,
        position: u64,
        message: String,
    },

    /// A section, field or attribute of a file is malformed
    #[error("Invalid content in '{file}' ({field}): {message}")]
    Format {
        file: String,
        field: String,
        message: String,
    },

    /// The files parsed but do not form a consistent manifest
    #[error("{0}")]
    Structure(String),
}

impl ParseError {
    /// Wraps an access fault raised while reading `path`.
    pub fn read(path: impl Into<String>, source: AccessError) -> Self {
        ParseError::Access {
            path: path.into(),
            operation: "read",
            source,
        }
    }

    /// Wraps an access fault raised while listing `path`.
    pub fn list(path: impl Into<String>, source: AccessError) -> Self {
        ParseError::Access {
            path: path.into(),
            operation: "list",
            source,
        }
    }

    pub fn format(
        file: impl Into<String>,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        ParseError::Format {
            file: file.into(),
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Main error type for package processing.
#[derive(Error, Debug)]
pub enum Error {
    /// The package type could not be determined
    #[error(transparent)]
    Detection(#[from] DetectionError),

    /// The package type is known but the package cannot be parsed
    #[error(transparent)]
    Parsing(#[from] ParseError),

    /// File access fault outside of a parse
    #[error(transparent)]
    Access(#[from] AccessError),
}

/// Result type for file access operations.
pub type AccessResult<T> = std::result::Result<T, AccessError>;

/// Result type for parser operations.
pub type ParseResult<T> = std::result::Result<T, ParseError>;

/// Result type for crate-level operations.
pub type Result<T> = std::result::Result<T, Error>;
