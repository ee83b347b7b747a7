//! Assistive technology access, WCAG 4.1.2

use shared_types::{CheckId, Criterion, Document, Issue, Severity};

use crate::config::EngineSettings;

pub fn check_security(document: &Document, _settings: &EngineSettings) -> Vec<Issue> {
    if document.permissions.accessibility_extraction {
        return Vec::new();
    }
    let message = if document.permissions.encrypted {
        "Document encryption blocks assistive technology from reading content"
    } else {
        "Document permissions block assistive technology from reading content"
    };
    vec![Issue::new(CheckId::Security, Criterion::NameRoleValue, Severity::Error, message)
        .with_suggestion("Allow content extraction for accessibility in the security settings")]
}
