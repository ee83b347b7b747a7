//! Tagged structure, WCAG 1.3.1

use shared_types::{CheckId, Criterion, Document, FixKind, Issue, Severity, Tag};

use crate::checks::visit;
use crate::config::EngineSettings;

pub fn check_tagged_structure(document: &Document, _settings: &EngineSettings) -> Vec<Issue> {
    let mut issues = Vec::new();
    let visits = visit(document);

    if !document.is_tagged {
        issues.push(
            Issue::new(
                CheckId::TaggedStructure,
                Criterion::InfoAndRelationships,
                Severity::Error,
                "Document is not tagged",
            )
            .with_suggestion("Add a structure tree so assistive technology can read the content")
            .fixable_by(FixKind::TagDocument),
        );
    } else if !visits
        .iter()
        .any(|v| !v.is_root && v.node.tag != Tag::Untagged)
    {
        issues.push(
            Issue::new(
                CheckId::TaggedStructure,
                Criterion::InfoAndRelationships,
                Severity::Error,
                "Structure tree contains no semantic tags",
            )
            .with_suggestion("Tag headings, paragraphs, figures and tables")
            .fixable_by(FixKind::TagDocument),
        );
    }

    for v in visits.iter().filter(|v| !v.is_root) {
        let content_bearing = v.node.has_text() || v.node.tag == Tag::Figure;
        if content_bearing && v.node.tag != Tag::Artifact && v.page.is_none() {
            issues.push(
                Issue::new(
                    CheckId::TaggedStructure,
                    Criterion::InfoAndRelationships,
                    Severity::Warning,
                    &format!("{} element has no page reference", v.node.tag),
                )
                .with_node(v.node.id)
                .with_suggestion("Attach the element to the page it appears on"),
            );
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::StructureNode;

    #[test]
    fn test_untagged_document() {
        let document = Document::new(StructureNode::new(0, Tag::Untagged), 1);
        let issues = check_tagged_structure(&document, &EngineSettings::default());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].fix_kind, Some(FixKind::TagDocument));
    }

    #[test]
    fn test_tagged_flag_without_semantic_tags() {
        let root = StructureNode::new(0, Tag::Document)
            .with_child(StructureNode::new(1, Tag::Untagged).on_page(1).with_text("x"));
        let document = Document::new(root, 1).tagged(true);
        let issues = check_tagged_structure(&document, &EngineSettings::default());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].message, "Structure tree contains no semantic tags");
    }

    #[test]
    fn test_content_without_page_is_reported_not_fatal() {
        let root = StructureNode::new(0, Tag::Document).with_children([
            StructureNode::new(1, Tag::Paragraph).on_page(1).with_text("paged"),
            StructureNode::new(2, Tag::Paragraph).with_text("floating"),
            StructureNode::new(3, Tag::Artifact).with_text("header"),
        ]);
        let document = Document::new(root, 1).tagged(true);
        let issues = check_tagged_structure(&document, &EngineSettings::default());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Warning);
        assert_eq!(issues[0].node.map(|n| n.0), Some(2));
    }

    #[test]
    fn test_page_inherited_from_parent_is_enough() {
        let root = StructureNode::new(0, Tag::Document).with_child(
            StructureNode::new(1, Tag::List)
                .on_page(1)
                .with_child(StructureNode::new(2, Tag::ListItem).with_text("item")),
        );
        let document = Document::new(root, 1).tagged(true);
        assert!(check_tagged_structure(&document, &EngineSettings::default()).is_empty());
    }
}
