//! Document title, WCAG 2.4.2 Page Titled

use shared_types::{CheckId, Criterion, Document, FixKind, Issue, Severity};

use crate::config::EngineSettings;

pub fn check_title(document: &Document, _settings: &EngineSettings) -> Vec<Issue> {
    let mut issues = Vec::new();

    let title = document.title.as_deref().map(str::trim).unwrap_or("");
    if title.is_empty() {
        issues.push(
            Issue::new(
                CheckId::Title,
                Criterion::PageTitled,
                Severity::Error,
                "Document title is missing",
            )
            .with_suggestion("Set a descriptive document title in the document properties")
            .fixable_by(FixKind::SetTitle),
        );
        return issues;
    }

    if let Some(stem) = document.file_stem() {
        if title == stem.trim() {
            issues.push(
                Issue::new(
                    CheckId::Title,
                    Criterion::PageTitled,
                    Severity::Warning,
                    &format!("Document title \"{}\" is just the file name", title),
                )
                .with_suggestion("Replace the file name with a title that describes the content")
                .fixable_by(FixKind::SetTitle),
            );
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::{StructureNode, Tag};

    fn doc() -> Document {
        Document::new(StructureNode::new(0, Tag::Document), 1)
    }

    #[test]
    fn test_missing_title_is_fixable_error() {
        let issues = check_title(&doc(), &EngineSettings::default());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Error);
        assert_eq!(issues[0].fix_kind, Some(FixKind::SetTitle));
    }

    #[test]
    fn test_blank_title_counts_as_missing() {
        let issues = check_title(&doc().with_title("   "), &EngineSettings::default());
        assert_eq!(issues[0].severity, Severity::Error);
    }

    #[test]
    fn test_title_equal_to_file_stem_warns() {
        let document = doc().with_title("report").with_file_name("report.pdf");
        let issues = check_title(&document, &EngineSettings::default());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Warning);
        assert!(issues[0].fixable);
    }

    #[test]
    fn test_humanized_stem_is_not_the_file_name() {
        let document = doc().with_title("Report").with_file_name("report.pdf");
        assert!(check_title(&document, &EngineSettings::default()).is_empty());
    }

    #[test]
    fn test_descriptive_title_passes() {
        let document = doc()
            .with_title("Quarterly Revenue Report")
            .with_file_name("report.pdf");
        assert!(check_title(&document, &EngineSettings::default()).is_empty());
    }
}
