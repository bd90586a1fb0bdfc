use fieldmap_document::Document;
use fieldmap_model::{Diagnostic, DiagnosticCode, Severity};

/// Result of one mapping pass: the best-effort document plus everything that
/// went wrong on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct MappingOutcome {
    /// `None` when nothing was written and no target document was supplied
    pub document: Option<Document>,
    pub diagnostics: Vec<Diagnostic>,
}

impl MappingOutcome {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    pub fn information_count(&self) -> usize {
        self.count(Severity::Information)
    }

    /// Diagnostics carrying `code`.
    pub fn diagnostics_with(&self, code: DiagnosticCode) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.code == code)
    }

    fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts() {
        let outcome = MappingOutcome {
            document: None,
            diagnostics: vec![
                Diagnostic::error(DiagnosticCode::InvalidMapping, "bad"),
                Diagnostic::warning(DiagnosticCode::ConversionRange, "narrow"),
                Diagnostic::warning(DiagnosticCode::ConversionFormat, "parse"),
                Diagnostic::information(DiagnosticCode::UnresolvedPath, "missing"),
            ],
        };
        assert!(outcome.has_errors());
        assert_eq!(outcome.error_count(), 1);
        assert_eq!(outcome.warning_count(), 2);
        assert_eq!(outcome.information_count(), 1);
        assert_eq!(outcome.diagnostics_with(DiagnosticCode::ConversionRange).count(), 1);
    }
}
