use thiserror::Error;

pub type Result<T> = std::result::Result<T, DocumentError>;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("XML parse error: {0}")]
    Xml(#[from] roxmltree::Error),
    #[error("XML write error: {0}")]
    XmlWrite(#[from] quick_xml::Error),
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

impl DocumentError {
    /// `true` when the input document itself could not be parsed.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Json(_) | Self::Xml(_))
    }
}
