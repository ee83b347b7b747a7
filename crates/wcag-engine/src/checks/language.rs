//! Document and passage language, WCAG 3.1.1 and 3.1.2

use shared_types::{CheckId, Criterion, Document, FixKind, Issue, Severity};

use crate::checks::visit;
use crate::config::EngineSettings;
use crate::patterns::is_valid_language_tag;

pub fn check_language(document: &Document, _settings: &EngineSettings) -> Vec<Issue> {
    let mut issues = Vec::new();

    match document.language.as_deref().map(str::trim) {
        None | Some("") => issues.push(
            Issue::new(
                CheckId::Language,
                Criterion::LanguageOfPage,
                Severity::Error,
                "Document language is not specified",
            )
            .with_suggestion("Set the document language (e.g. 'en' for English)")
            .fixable_by(FixKind::SetLanguage),
        ),
        Some(lang) if !is_valid_language_tag(lang) => issues.push(
            Issue::new(
                CheckId::Language,
                Criterion::LanguageOfPage,
                Severity::Warning,
                &format!("Document language '{}' is not a valid language tag", lang),
            )
            .with_suggestion("Use a BCP 47 language tag such as 'en', 'en-US' or 'es'"),
        ),
        Some(_) => {}
    }

    for v in visit(document) {
        let Some(lang) = v.node.attributes.lang.as_deref() else {
            continue;
        };
        if !is_valid_language_tag(lang) {
            issues.push(
                Issue::new(
                    CheckId::Language,
                    Criterion::LanguageOfParts,
                    Severity::Warning,
                    &format!("Passage language '{}' is not a valid language tag", lang.trim()),
                )
                .with_page(v.page)
                .with_location(v.node.bbox)
                .with_node(v.node.id)
                .with_suggestion("Use a BCP 47 language tag for the passage"),
            );
        }
    }

    issues
}
