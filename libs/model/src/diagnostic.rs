//! Field-level diagnostics
//!
//! Diagnostics never abort a pass. They are accumulated while mappings run and
//! returned with the (possibly partial) output document.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Information,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Information => write!(f, "information"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticCode {
    UnresolvedPath,
    UnsupportedConversion,
    ConversionRange,
    ConversionFormat,
    LookupTableNotFound,
    UnknownDocument,
    InvalidMapping,
    Placement,
    UndeclaredPrefix,
    CollectionLimit,
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::UnresolvedPath => "unresolved-path",
            Self::UnsupportedConversion => "unsupported-conversion",
            Self::ConversionRange => "conversion-range",
            Self::ConversionFormat => "conversion-format",
            Self::LookupTableNotFound => "lookup-table-not-found",
            Self::UnknownDocument => "unknown-document",
            Self::InvalidMapping => "invalid-mapping",
            Self::Placement => "placement",
            Self::UndeclaredPrefix => "undeclared-prefix",
            Self::CollectionLimit => "collection-limit",
        };
        write!(f, "{}", s)
    }
}

/// Individual diagnostic
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: DiagnosticCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mapping: Option<String>,
}

impl Diagnostic {
    pub fn new(severity: Severity, code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
            path: None,
            mapping: None,
        }
    }

    pub fn error(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, code, message)
    }

    pub fn warning(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, code, message)
    }

    pub fn information(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self::new(Severity::Information, code, message)
    }

    pub fn with_path(mut self, path: impl fmt::Display) -> Self {
        self.path = Some(path.to_string());
        self
    }

    pub fn with_mapping(mut self, mapping: impl Into<String>) -> Self {
        self.mapping = Some(mapping.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.severity, self.code)?;
        if let Some(mapping) = &self.mapping {
            write!(f, " (mapping {})", mapping)?;
        }
        if let Some(path) = &self.path {
            write!(f, " at {}", path)?;
        }
        write!(f, ": {}", self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let d = Diagnostic::warning(DiagnosticCode::ConversionRange, "LONG to INTEGER")
            .with_path("/a/b")
            .with_mapping("3");
        assert_eq!(
            d.to_string(),
            "[warning] conversion-range (mapping 3) at /a/b: LONG to INTEGER"
        );
        assert!(!d.is_error());
    }

    #[test]
    fn test_serialize() {
        let d = Diagnostic::error(DiagnosticCode::UnsupportedConversion, "no converter");
        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json["severity"], "error");
        assert_eq!(json["code"], "unsupported-conversion");
        assert!(json.get("path").is_none());
    }
}
