//! Figure alternative text, WCAG 1.1.1 Non-text Content

use shared_types::{CheckId, Criterion, Document, FixKind, Issue, Severity, Tag};

use crate::checks::visit;
use crate::config::EngineSettings;
use crate::patterns::is_placeholder_alt_text;

pub fn check_alt_text(document: &Document, _settings: &EngineSettings) -> Vec<Issue> {
    let mut issues = Vec::new();

    for v in visit(document).into_iter().filter(|v| v.node.tag == Tag::Figure) {
        let alt = v.node.attributes.alt_text.as_deref().unwrap_or("").trim();
        let page_label = v.page.map(|p| format!(" on page {}", p)).unwrap_or_default();

        if alt.is_empty() {
            issues.push(
                Issue::new(
                    CheckId::AltText,
                    Criterion::NonTextContent,
                    Severity::Error,
                    &format!("Image{} lacks alt text", page_label),
                )
                .with_page(v.page)
                .with_location(v.node.bbox)
                .with_node(v.node.id)
                .with_suggestion("Add alt text that describes the image")
                .fixable_by(FixKind::SetAltText),
            );
        } else if is_placeholder_alt_text(alt) {
            issues.push(
                Issue::new(
                    CheckId::AltText,
                    Criterion::NonTextContent,
                    Severity::Warning,
                    &format!("Image{} has placeholder alt text \"{}\"", page_label, alt),
                )
                .with_page(v.page)
                .with_location(v.node.bbox)
                .with_node(v.node.id)
                .with_suggestion("Replace the placeholder with a real description")
                .fixable_by(FixKind::SetAltText),
            );
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::PLACEHOLDER_ALT_TEXT;
    use shared_types::StructureNode;

    fn doc(figure: StructureNode) -> Document {
        Document::new(StructureNode::new(0, Tag::Document).with_child(figure), 2).tagged(true)
    }

    #[test]
    fn test_missing_alt_is_error() {
        let document = doc(StructureNode::new(1, Tag::Figure).on_page(2));
        let issues = check_alt_text(&document, &EngineSettings::default());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Error);
        assert_eq!(issues[0].message, "Image on page 2 lacks alt text");
        assert_eq!(issues[0].page, Some(2));
    }

    #[test]
    fn test_placeholder_alt_is_warning() {
        let figure = StructureNode::new(1, Tag::Figure)
            .on_page(1)
            .with_alt_text("IMG_2041.JPG");
        let document = doc(figure);
        let issues = check_alt_text(&document, &EngineSettings::default());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Warning);
        assert!(issues[0].fixable);
    }

    #[test]
    fn test_review_placeholder_is_still_flagged() {
        let document = doc(
            StructureNode::new(1, Tag::Figure)
                .on_page(1)
                .with_alt_text(PLACEHOLDER_ALT_TEXT),
        );
        let issues = check_alt_text(&document, &EngineSettings::default());
        assert_eq!(issues[0].severity, Severity::Warning);
    }

    #[test]
    fn test_descriptive_alt_passes() {
        let document = doc(
            StructureNode::new(1, Tag::Figure)
                .on_page(1)
                .with_alt_text("A bar chart showing quarterly revenue"),
        );
        assert!(check_alt_text(&document, &EngineSettings::default()).is_empty());
    }
}
