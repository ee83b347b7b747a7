//! Link purpose, WCAG 2.4.4

use shared_types::{CheckId, Criterion, Document, Issue, Severity, StructureNode, Tag};

use crate::checks::visit;
use crate::config::EngineSettings;
use crate::patterns::is_generic_link_text;

pub fn check_links(document: &Document, _settings: &EngineSettings) -> Vec<Issue> {
    let mut issues = Vec::new();

    for v in visit(document).into_iter().filter(|v| v.node.tag == Tag::Link) {
        let text = accessible_text(v.node);
        if text.is_empty() {
            issues.push(
                Issue::new(
                    CheckId::LinkPurpose,
                    Criterion::LinkPurpose,
                    Severity::Warning,
                    "Link has no text",
                )
                .with_page(v.page)
                .with_location(v.node.bbox)
                .with_node(v.node.id)
                .with_suggestion("Give the link text that names its destination"),
            );
        } else if is_generic_link_text(&text) {
            issues.push(
                Issue::new(
                    CheckId::LinkPurpose,
                    Criterion::LinkPurpose,
                    Severity::Error,
                    &format!("Link text \"{}\" does not describe its destination", text),
                )
                .with_page(v.page)
                .with_location(v.node.bbox)
                .with_node(v.node.id)
                .with_suggestion("Replace generic wording with the link's purpose"),
            );
        }
    }

    issues
}

/// Subtree text, falling back to the alternate description
fn accessible_text(link: &StructureNode) -> String {
    let text = link.text_content();
    if !text.is_empty() {
        return text;
    }
    link.attributes
        .alt_text
        .as_deref()
        .map(|alt| alt.trim().to_string())
        .unwrap_or_default()
}
