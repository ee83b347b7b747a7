//! Form field names, WCAG 4.1.2 Name, Role, Value

use shared_types::{CheckId, Criterion, Document, Issue, Severity, Tag};

use crate::checks::visit;
use crate::config::EngineSettings;

pub fn check_form_labels(document: &Document, _settings: &EngineSettings) -> Vec<Issue> {
    visit(document)
        .into_iter()
        .filter(|v| v.node.tag == Tag::FormField)
        .filter(|v| {
            let attrs = &v.node.attributes;
            let named =
                |value: &Option<String>| value.as_deref().is_some_and(|s| !s.trim().is_empty());
            !named(&attrs.label) && !named(&attrs.alt_text) && v.node.text_content().is_empty()
        })
        .map(|v| {
            Issue::new(
                CheckId::FormLabels,
                Criterion::NameRoleValue,
                Severity::Error,
                "Form field has no accessible name",
            )
            .with_page(v.page)
            .with_location(v.node.bbox)
            .with_node(v.node.id)
            .with_suggestion("Add a label or tooltip to the form field")
        })
        .collect()
}
