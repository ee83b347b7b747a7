use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::structure::{BoundingBox, Document, NodeId};

/// WCAG conformance level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WcagLevel {
    A,
    AA,
    AAA,
}

impl WcagLevel {
    pub const ALL: [WcagLevel; 3] = [WcagLevel::A, WcagLevel::AA, WcagLevel::AAA];
}

impl fmt::Display for WcagLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WcagLevel::A => write!(f, "A"),
            WcagLevel::AA => write!(f, "AA"),
            WcagLevel::AAA => write!(f, "AAA"),
        }
    }
}

/// Issue severity. Declaration order is priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    /// Must fix for compliance
    Error,
    /// Should fix; still fails the criterion
    Warning,
    /// Informational, never fails a criterion
    Info,
}

impl Severity {
    pub fn fails_criterion(&self) -> bool {
        matches!(self, Severity::Error | Severity::Warning)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Warning => write!(f, "WARNING"),
            Severity::Info => write!(f, "INFO"),
        }
    }
}

/// The fixed catalogue of WCAG success criteria the engine evaluates
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Criterion {
    #[serde(rename = "1.1.1")]
    NonTextContent,
    #[serde(rename = "1.3.1")]
    InfoAndRelationships,
    #[serde(rename = "1.3.2")]
    MeaningfulSequence,
    #[serde(rename = "1.4.3")]
    ContrastMinimum,
    #[serde(rename = "1.4.6")]
    ContrastEnhanced,
    #[serde(rename = "2.4.1")]
    BypassBlocks,
    #[serde(rename = "2.4.2")]
    PageTitled,
    #[serde(rename = "2.4.4")]
    LinkPurpose,
    #[serde(rename = "2.4.6")]
    HeadingsAndLabels,
    #[serde(rename = "3.1.1")]
    LanguageOfPage,
    #[serde(rename = "3.1.2")]
    LanguageOfParts,
    #[serde(rename = "4.1.2")]
    NameRoleValue,
}

impl Criterion {
    pub const ALL: [Criterion; 12] = [
        Criterion::NonTextContent,
        Criterion::InfoAndRelationships,
        Criterion::MeaningfulSequence,
        Criterion::ContrastMinimum,
        Criterion::ContrastEnhanced,
        Criterion::BypassBlocks,
        Criterion::PageTitled,
        Criterion::LinkPurpose,
        Criterion::HeadingsAndLabels,
        Criterion::LanguageOfPage,
        Criterion::LanguageOfParts,
        Criterion::NameRoleValue,
    ];

    /// Success criterion number, e.g. "1.1.1"
    pub fn id(&self) -> &'static str {
        match self {
            Criterion::NonTextContent => "1.1.1",
            Criterion::InfoAndRelationships => "1.3.1",
            Criterion::MeaningfulSequence => "1.3.2",
            Criterion::ContrastMinimum => "1.4.3",
            Criterion::ContrastEnhanced => "1.4.6",
            Criterion::BypassBlocks => "2.4.1",
            Criterion::PageTitled => "2.4.2",
            Criterion::LinkPurpose => "2.4.4",
            Criterion::HeadingsAndLabels => "2.4.6",
            Criterion::LanguageOfPage => "3.1.1",
            Criterion::LanguageOfParts => "3.1.2",
            Criterion::NameRoleValue => "4.1.2",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Criterion::NonTextContent => "Non-text Content",
            Criterion::InfoAndRelationships => "Info and Relationships",
            Criterion::MeaningfulSequence => "Meaningful Sequence",
            Criterion::ContrastMinimum => "Contrast (Minimum)",
            Criterion::ContrastEnhanced => "Contrast (Enhanced)",
            Criterion::BypassBlocks => "Bypass Blocks",
            Criterion::PageTitled => "Page Titled",
            Criterion::LinkPurpose => "Link Purpose (In Context)",
            Criterion::HeadingsAndLabels => "Headings and Labels",
            Criterion::LanguageOfPage => "Language of Page",
            Criterion::LanguageOfParts => "Language of Parts",
            Criterion::NameRoleValue => "Name, Role, Value",
        }
    }

    pub fn level(&self) -> WcagLevel {
        match self {
            Criterion::ContrastMinimum
            | Criterion::HeadingsAndLabels
            | Criterion::LanguageOfParts => WcagLevel::AA,
            Criterion::ContrastEnhanced => WcagLevel::AAA,
            _ => WcagLevel::A,
        }
    }

    /// Criteria whose failure stops a screen-reader user from following the content
    pub fn is_screen_reader_blocking(&self) -> bool {
        matches!(
            self,
            Criterion::MeaningfulSequence
                | Criterion::HeadingsAndLabels
                | Criterion::NonTextContent
                | Criterion::LinkPurpose
                | Criterion::InfoAndRelationships
        )
    }

    pub fn from_id(id: &str) -> Option<Criterion> {
        Criterion::ALL.into_iter().find(|c| c.id() == id)
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.id(), self.name())
    }
}

/// Registry checks. Declaration order is registry evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckId {
    Title,
    Language,
    TaggedStructure,
    ReadingOrder,
    Headings,
    AltText,
    ColorContrast,
    TableStructure,
    LinkPurpose,
    FormLabels,
    Security,
    Artifacts,
}

impl CheckId {
    pub const ALL: [CheckId; 12] = [
        CheckId::Title,
        CheckId::Language,
        CheckId::TaggedStructure,
        CheckId::ReadingOrder,
        CheckId::Headings,
        CheckId::AltText,
        CheckId::ColorContrast,
        CheckId::TableStructure,
        CheckId::LinkPurpose,
        CheckId::FormLabels,
        CheckId::Security,
        CheckId::Artifacts,
    ];

    /// Criteria this check can report against
    pub fn criteria(&self) -> &'static [Criterion] {
        match self {
            CheckId::Title => &[Criterion::PageTitled],
            CheckId::Language => &[Criterion::LanguageOfPage, Criterion::LanguageOfParts],
            CheckId::TaggedStructure => &[Criterion::InfoAndRelationships],
            CheckId::ReadingOrder => &[Criterion::MeaningfulSequence],
            CheckId::Headings => &[
                Criterion::InfoAndRelationships,
                Criterion::HeadingsAndLabels,
                Criterion::BypassBlocks,
            ],
            CheckId::AltText => &[Criterion::NonTextContent],
            CheckId::ColorContrast => &[Criterion::ContrastMinimum, Criterion::ContrastEnhanced],
            CheckId::TableStructure => &[Criterion::InfoAndRelationships],
            CheckId::LinkPurpose => &[Criterion::LinkPurpose],
            CheckId::FormLabels => &[Criterion::NameRoleValue],
            CheckId::Security => &[Criterion::NameRoleValue],
            CheckId::Artifacts => &[Criterion::InfoAndRelationships],
        }
    }

    /// Lowest conformance level among the covered criteria
    pub fn min_level(&self) -> WcagLevel {
        self.criteria()
            .iter()
            .map(|c| c.level())
            .min()
            .unwrap_or(WcagLevel::A)
    }

    pub fn name(&self) -> &'static str {
        match self {
            CheckId::Title => "Document title",
            CheckId::Language => "Document language",
            CheckId::TaggedStructure => "Tagged structure",
            CheckId::ReadingOrder => "Reading order",
            CheckId::Headings => "Headings",
            CheckId::AltText => "Image alt text",
            CheckId::ColorContrast => "Color contrast",
            CheckId::TableStructure => "Table structure",
            CheckId::LinkPurpose => "Link purpose",
            CheckId::FormLabels => "Form field labels",
            CheckId::Security => "Assistive technology access",
            CheckId::Artifacts => "Artifacts",
        }
    }
}

impl fmt::Display for CheckId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Repairs the auto-fix engine knows how to apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixKind {
    SetTitle,
    SetLanguage,
    TagDocument,
    TagHeadings,
    SetAltText,
    RelevelHeading,
    PromoteTableHeaders,
}

impl FixKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FixKind::SetTitle => "set_title",
            FixKind::SetLanguage => "set_language",
            FixKind::TagDocument => "tag_document",
            FixKind::TagHeadings => "tag_headings",
            FixKind::SetAltText => "set_alt_text",
            FixKind::RelevelHeading => "relevel_heading",
            FixKind::PromoteTableHeaders => "promote_table_headers",
        }
    }
}

impl fmt::Display for FixKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single accessibility issue. Recomputed on every validation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    /// Check that produced the issue
    pub check: CheckId,
    pub criterion: Criterion,
    pub level: WcagLevel,
    pub severity: Severity,
    pub message: String,
    pub page: Option<u32>,
    pub location: Option<BoundingBox>,
    /// Target node, when the issue concerns one node
    pub node: Option<NodeId>,
    pub suggestion: Option<String>,
    pub fixable: bool,
    pub fix_kind: Option<FixKind>,
}

impl Issue {
    pub fn new(check: CheckId, criterion: Criterion, severity: Severity, message: &str) -> Self {
        Self {
            check,
            criterion,
            level: criterion.level(),
            severity,
            message: message.to_string(),
            page: None,
            location: None,
            node: None,
            suggestion: None,
            fixable: false,
            fix_kind: None,
        }
    }

    pub fn with_page(mut self, page: Option<u32>) -> Self {
        self.page = page;
        self
    }

    pub fn with_location(mut self, location: Option<BoundingBox>) -> Self {
        self.location = location;
        self
    }

    pub fn with_node(mut self, node: NodeId) -> Self {
        self.node = Some(node);
        self
    }

    pub fn with_suggestion(mut self, suggestion: &str) -> Self {
        self.suggestion = Some(suggestion.to_string());
        self
    }

    /// Mark as repairable by the auto-fix engine
    pub fn fixable_by(mut self, kind: FixKind) -> Self {
        self.fixable = true;
        self.fix_kind = Some(kind);
        self
    }

    /// Key used to match issues across sessions
    pub fn key(&self) -> IssueKey {
        IssueKey {
            criterion: self.criterion,
            message: self.message.clone(),
        }
    }
}

/// Identity of an issue across validation sessions
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IssueKey {
    pub criterion: Criterion,
    pub message: String,
}

/// Issue counts by severity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueSummary {
    pub errors: usize,
    pub warnings: usize,
    pub info: usize,
    pub total: usize,
}

impl IssueSummary {
    pub fn from_issues(issues: &[Issue]) -> Self {
        let mut summary = IssueSummary::default();
        for issue in issues {
            match issue.severity {
                Severity::Error => summary.errors += 1,
                Severity::Warning => summary.warnings += 1,
                Severity::Info => summary.info += 1,
            }
        }
        summary.total = issues.len();
        summary
    }
}

/// Outcome of one validation pass. Contains no timestamps, so two passes
/// over an unchanged document compare equal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub issues: Vec<Issue>,
    /// 0-100
    pub score: u8,
    pub level_achieved: Option<WcagLevel>,
    pub target_level: WcagLevel,
    pub summary: IssueSummary,
    pub applicable_criteria_count: usize,
    pub passed_criteria_count: usize,
    pub passed_criteria: BTreeSet<Criterion>,
    pub failed_criteria: BTreeSet<Criterion>,
    /// No ERROR issues
    pub is_compliant: bool,
    /// Document revision the result was computed against
    pub revision: u64,
}

impl ValidationResult {
    pub fn issues_for(&self, criterion: Criterion) -> Vec<&Issue> {
        self.issues
            .iter()
            .filter(|issue| issue.criterion == criterion)
            .collect()
    }

    pub fn passed(&self, criterion: Criterion) -> bool {
        self.passed_criteria.contains(&criterion)
    }

    pub fn fixable_issues(&self) -> Vec<&Issue> {
        self.issues.iter().filter(|issue| issue.fixable).collect()
    }

    /// False once the document has been mutated after this result was computed
    pub fn is_current_for(&self, document: &Document) -> bool {
        self.revision == document.revision()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalogue_has_twelve_unique_criteria() {
        let ids: BTreeSet<_> = Criterion::ALL.iter().map(|c| c.id()).collect();
        assert_eq!(ids.len(), 12);
        for c in Criterion::ALL {
            assert_eq!(Criterion::from_id(c.id()), Some(c));
        }
    }

    #[test]
    fn test_levels_order() {
        assert!(WcagLevel::A < WcagLevel::AA);
        assert!(WcagLevel::AA < WcagLevel::AAA);
        assert!(Severity::Error < Severity::Warning);
        assert!(Severity::Warning < Severity::Info);
    }

    #[test]
    fn test_criterion_serializes_as_number() {
        let json = serde_json::to_string(&Criterion::ContrastMinimum).unwrap();
        assert_eq!(json, "\"1.4.3\"");
    }

    #[test]
    fn test_every_check_covers_a_criterion() {
        for check in CheckId::ALL {
            assert!(!check.criteria().is_empty());
        }
        assert_eq!(CheckId::ColorContrast.min_level(), WcagLevel::AA);
        assert_eq!(CheckId::Headings.min_level(), WcagLevel::A);
    }

    #[test]
    fn test_issue_takes_level_from_criterion() {
        let issue = Issue::new(
            CheckId::ColorContrast,
            Criterion::ContrastEnhanced,
            Severity::Warning,
            "low contrast",
        );
        assert_eq!(issue.level, WcagLevel::AAA);
        assert!(!issue.fixable);
    }

    #[test]
    fn test_summary_counts() {
        let issues = vec![
            Issue::new(CheckId::Title, Criterion::PageTitled, Severity::Error, "a"),
            Issue::new(CheckId::Artifacts, Criterion::InfoAndRelationships, Severity::Info, "b"),
            Issue::new(CheckId::Artifacts, Criterion::InfoAndRelationships, Severity::Info, "c"),
        ];
        let summary = IssueSummary::from_issues(&issues);
        assert_eq!(summary.errors, 1);
        assert_eq!(summary.warnings, 0);
        assert_eq!(summary.info, 2);
        assert_eq!(summary.total, 3);
    }
}
