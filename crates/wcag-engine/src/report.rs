//! Report data for renderers
//!
//! Groups a validation result per criterion, attaches the change history
//! and, when known, the score trend from the document profile. Rendering
//! (HTML, PDF, console) is left to the caller.

use serde::{Deserialize, Serialize};
use shared_types::{
    AuditLog, Criterion, DocumentProfile, Issue, IssueSummary, ValidationResult, WcagLevel,
};

use crate::priority::prioritize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriterionStatus {
    Passed,
    Failed,
    /// Above the target level or covered by no enabled check
    NotApplicable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionReport {
    pub criterion: Criterion,
    pub name: String,
    pub level: WcagLevel,
    pub status: CriterionStatus,
    /// In priority order
    pub issues: Vec<Issue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceReport {
    pub document_id: String,
    pub score: u8,
    pub target_level: WcagLevel,
    pub level_achieved: Option<WcagLevel>,
    pub summary: IssueSummary,
    pub criteria: Vec<CriterionReport>,
    /// One line per audit entry
    pub changes: Vec<String>,
    pub previous_score: Option<u8>,
    pub session_count: Option<u32>,
    pub checked_at: u64,
}

impl ComplianceReport {
    pub fn new(document_id: &str, result: &ValidationResult) -> Self {
        let ordered = prioritize(&result.issues);
        let criteria = Criterion::ALL
            .into_iter()
            .map(|criterion| {
                let status = if result.passed_criteria.contains(&criterion) {
                    CriterionStatus::Passed
                } else if result.failed_criteria.contains(&criterion) {
                    CriterionStatus::Failed
                } else {
                    CriterionStatus::NotApplicable
                };
                CriterionReport {
                    criterion,
                    name: criterion.name().to_string(),
                    level: criterion.level(),
                    status,
                    issues: ordered
                        .iter()
                        .filter(|issue| issue.criterion == criterion)
                        .cloned()
                        .collect(),
                }
            })
            .collect();

        Self {
            document_id: document_id.to_string(),
            score: result.score,
            target_level: result.target_level,
            level_achieved: result.level_achieved,
            summary: result.summary,
            criteria,
            changes: Vec::new(),
            previous_score: None,
            session_count: None,
            checked_at: chrono::Utc::now().timestamp() as u64,
        }
    }

    pub fn with_audit_log(mut self, log: &AuditLog) -> Self {
        self.changes = log.summary();
        self
    }

    pub fn with_profile(mut self, profile: &DocumentProfile) -> Self {
        self.previous_score = profile.previous_score();
        self.session_count = Some(profile.session_count);
        self
    }

    pub fn failed(&self) -> impl Iterator<Item = &CriterionReport> {
        self.criteria
            .iter()
            .filter(|c| c.status == CriterionStatus::Failed)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
