//! Artifact candidates, WCAG 1.3.1 (informational only)

use shared_types::{CheckId, Criterion, Document, Issue, Severity, Tag};

use crate::checks::visit;
use crate::config::EngineSettings;

pub fn check_artifacts(document: &Document, _settings: &EngineSettings) -> Vec<Issue> {
    visit(document)
        .into_iter()
        .filter(|v| !v.is_root && v.node.tag == Tag::Untagged)
        .filter(|v| v.node.is_leaf() && !v.node.has_text())
        .map(|v| {
            Issue::new(
                CheckId::Artifacts,
                Criterion::InfoAndRelationships,
                Severity::Info,
                "Empty untagged element could be marked as an artifact",
            )
            .with_page(v.page)
            .with_location(v.node.bbox)
            .with_node(v.node.id)
            .with_suggestion("Mark decorative content as Artifact so screen readers skip it")
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::StructureNode;

    #[test]
    fn test_empty_untagged_leaf_is_info_only() {
        let root = StructureNode::new(0, Tag::Untagged).with_children([
            StructureNode::new(1, Tag::Untagged).on_page(1),
            StructureNode::new(2, Tag::Untagged).on_page(1).with_text("words"),
            StructureNode::new(3, Tag::Artifact).on_page(1),
        ]);
        let document = Document::new(root, 1);
        let issues = check_artifacts(&document, &EngineSettings::default());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Info);
        assert!(!issues[0].fixable);
        assert!(!issues[0].severity.fails_criterion());
    }
}
