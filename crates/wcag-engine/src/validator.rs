//! Validation and scoring
//!
//! A criterion passes when no enabled check reported an ERROR or WARNING
//! against it. The score is the rounded share of applicable criteria that
//! passed; 100 when nothing is applicable.

use std::collections::BTreeSet;

use shared_types::{
    Criterion, Document, Issue, IssueSummary, Severity, ValidationResult, WcagLevel,
};
use tracing::{debug, info, instrument};

use crate::checks::REGISTRY;
use crate::config::EngineSettings;
use crate::error::Result;

/// Validate a document against the target level in `settings`
///
/// # Errors
///
/// Returns [`EngineError::Structure`](crate::EngineError::Structure) when the
/// tree violates structural integrity (dangling page, duplicate id, bad
/// heading level) and [`EngineError::Settings`](crate::EngineError::Settings)
/// when the heuristics are out of range. Missing optional data is reported
/// as issues instead.
#[instrument(skip_all, fields(target = %settings.target_level, revision = document.revision()))]
pub fn validate(document: &Document, settings: &EngineSettings) -> Result<ValidationResult> {
    settings.check()?;
    document.check_integrity()?;

    let mut issues: Vec<Issue> = Vec::new();
    for check in REGISTRY.iter().filter(|check| settings.runs(check.id)) {
        let found: Vec<Issue> = (check.run)(document, settings)
            .into_iter()
            .filter(|issue| settings.includes_level(issue.level))
            .collect();
        debug!(check = %check.id, issues = found.len(), "check finished");
        issues.extend(found);
    }

    let result = score(issues, settings, document.revision());
    info!(
        score = result.score,
        issues = result.summary.total,
        errors = result.summary.errors,
        "validation complete"
    );
    Ok(result)
}

/// Validate a mutated document and clear its dirty flag
pub fn revalidate(document: &mut Document, settings: &EngineSettings) -> Result<ValidationResult> {
    let result = validate(document, settings)?;
    document.mark_clean();
    Ok(result)
}

/// Build a result from a finished issue list
pub fn score(issues: Vec<Issue>, settings: &EngineSettings, revision: u64) -> ValidationResult {
    let applicable = settings.applicable_criteria();

    let failing: BTreeSet<Criterion> = issues
        .iter()
        .filter(|issue| issue.severity.fails_criterion())
        .map(|issue| issue.criterion)
        .collect();
    let failed_criteria: BTreeSet<Criterion> = applicable
        .iter()
        .copied()
        .filter(|c| failing.contains(c))
        .collect();
    let passed_criteria: BTreeSet<Criterion> = applicable
        .iter()
        .copied()
        .filter(|c| !failing.contains(c))
        .collect();

    let score = if applicable.is_empty() {
        100
    } else {
        (100.0 * passed_criteria.len() as f64 / applicable.len() as f64).round() as u8
    };

    let level_achieved = achieved_level(&applicable, &passed_criteria, settings.target_level);
    let summary = IssueSummary::from_issues(&issues);
    let is_compliant = !issues.iter().any(|issue| issue.severity == Severity::Error);

    ValidationResult {
        issues,
        score,
        level_achieved,
        target_level: settings.target_level,
        summary,
        applicable_criteria_count: applicable.len(),
        passed_criteria_count: passed_criteria.len(),
        passed_criteria,
        failed_criteria,
        is_compliant,
        revision,
    }
}

/// Highest level up to `target` at which every applicable criterion passed
fn achieved_level(
    applicable: &[Criterion],
    passed: &BTreeSet<Criterion>,
    target: WcagLevel,
) -> Option<WcagLevel> {
    let mut achieved = None;
    for level in WcagLevel::ALL.into_iter().filter(|l| *l <= target) {
        let all_passed = applicable
            .iter()
            .filter(|c| c.level() <= level)
            .all(|c| passed.contains(c));
        if !all_passed {
            break;
        }
        achieved = Some(level);
    }
    achieved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use pretty_assertions::assert_eq;
    use shared_types::{CheckId, Rgb, StructureNode, Tag};

    fn clean_document() -> Document {
        let root = StructureNode::new(0, Tag::Document).with_children([
            StructureNode::new(1, Tag::Heading(1))
                .on_page(1)
                .with_text("Course Overview"),
            StructureNode::new(2, Tag::Paragraph)
                .on_page(1)
                .with_text("Welcome to the course."),
            StructureNode::new(3, Tag::Figure)
                .on_page(1)
                .with_alt_text("Campus map with the lecture hall highlighted"),
        ]);
        Document::new(root, 1)
            .with_title("Course Overview")
            .with_language("en")
            .with_file_name("overview.pdf")
            .tagged(true)
    }

    #[test]
    fn test_clean_document_scores_100() {
        let result = validate(&clean_document(), &EngineSettings::default()).unwrap();
        assert_eq!(result.issues, vec![]);
        assert_eq!(result.score, 100);
        assert_eq!(result.level_achieved, Some(WcagLevel::AA));
        assert!(result.is_compliant);
        assert_eq!(result.applicable_criteria_count, 11);
        assert_eq!(result.passed_criteria_count, 11);
    }

    #[test]
    fn test_missing_title_fails_level_a() {
        let mut document = clean_document();
        document.title = None;
        let result = validate(&document, &EngineSettings::default()).unwrap();
        assert_eq!(result.score, 91);
        assert_eq!(result.level_achieved, None);
        assert!(!result.is_compliant);
        assert!(result.failed_criteria.contains(&Criterion::PageTitled));
    }

    #[test]
    fn test_aa_failure_still_achieves_a() {
        let mut document = clean_document();
        document.root.children[1].attributes.color = Some(Rgb(0xaa, 0xaa, 0xaa));
        let result = validate(&document, &EngineSettings::default()).unwrap();
        assert_eq!(result.level_achieved, Some(WcagLevel::A));
        // The AAA issue is above the target and dropped
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].criterion, Criterion::ContrastMinimum);
    }

    #[test]
    fn test_info_issues_do_not_fail_criteria() {
        let mut document = clean_document();
        document
            .root
            .children
            .push(StructureNode::new(9, Tag::Untagged).on_page(1));
        let result = validate(&document, &EngineSettings::default()).unwrap();
        assert_eq!(result.summary.info, 1);
        assert_eq!(result.score, 100);
    }

    #[test]
    fn test_disabled_check_is_not_applicable() {
        let mut document = clean_document();
        document.title = None;
        let settings = EngineSettings::default().with_check(CheckId::Title, false);
        let result = validate(&document, &settings).unwrap();
        assert!(result.issues.is_empty());
        assert_eq!(result.applicable_criteria_count, 10);
        assert_eq!(result.score, 100);
    }

    #[test]
    fn test_nothing_applicable_scores_100() {
        let mut settings = EngineSettings::default();
        for check in CheckId::ALL {
            settings = settings.with_check(check, false);
        }
        let result = validate(&clean_document(), &settings).unwrap();
        assert_eq!(result.applicable_criteria_count, 0);
        assert_eq!(result.score, 100);
    }

    #[test]
    fn test_structural_error_fails_fast() {
        let mut document = clean_document();
        document.root.children[0].page = Some(4);
        let err = validate(&document, &EngineSettings::default()).unwrap_err();
        assert!(matches!(err, EngineError::Structure(_)));
    }

    #[test]
    fn test_invalid_heuristics_are_rejected() {
        let mut settings = EngineSettings::default();
        settings.heuristics.multi_column_match_ratio = f64::NAN;
        let err = validate(&clean_document(), &settings).unwrap_err();
        assert!(matches!(err, EngineError::Settings(_)));
    }

    #[test]
    fn test_result_records_document_revision() {
        let mut document = clean_document();
        document.mark_mutated();
        let result = validate(&document, &EngineSettings::default()).unwrap();
        assert_eq!(result.revision, 1);
        assert!(result.is_current_for(&document));
    }
}
