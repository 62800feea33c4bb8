use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML error: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("invalid DOCX: {0}")]
    InvalidDocx(String),

    /// Malformed configuration root or section role. Nothing was applied.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The configuration source could not be read or parsed.
    #[error("cannot load configuration from {path}: {reason}")]
    ConfigLoad { path: PathBuf, reason: String },

    #[error("unknown element type '{kind}'. Available types: {available}")]
    UnknownElement { kind: String, available: String },

    #[error("invalid '{kind}' element: {reason}")]
    InvalidElement { kind: String, reason: String },

    #[error("image not found: {}", .0.display())]
    ImageNotFound(PathBuf),

    #[error("unsupported image {}: {reason}", path.display())]
    Image { path: PathBuf, reason: String },

    #[error("invalid color '{0}' (expected 6 hex digits, optionally prefixed with '#')")]
    InvalidColor(String),

    /// A generated inline picture lacks a node the anchor conversion needs.
    #[error("inline picture is missing <{0}>; cannot build a floating anchor")]
    MissingGraphicNode(&'static str),

    #[error("unexpected document structure: {0}")]
    Structure(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Config(e.to_string())
    }
}
