//! Issue ordering by real-world impact
//!
//! Level first (A before AA before AAA), then severity, then criteria that
//! block screen-reader users, then registry order, then page (issues with
//! no page last). The sort is stable, so traversal order breaks the
//! remaining ties.

use std::cmp::Reverse;

use serde::{Deserialize, Serialize};
use shared_types::{CheckId, Issue, Severity, WcagLevel};

type PriorityKey = (WcagLevel, Severity, Reverse<bool>, CheckId, bool, u32);

fn priority_key(issue: &Issue) -> PriorityKey {
    (
        issue.level,
        issue.severity,
        Reverse(issue.criterion.is_screen_reader_blocking()),
        issue.check,
        issue.page.is_none(),
        issue.page.unwrap_or(0),
    )
}

/// Issues in priority order
pub fn prioritize(issues: &[Issue]) -> Vec<Issue> {
    let mut ordered = issues.to_vec();
    ordered.sort_by_key(priority_key);
    ordered
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FixPriority {
    High,
    Medium,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedFix {
    pub priority: FixPriority,
    pub issue: Issue,
}

/// Fixable errors (high) then fixable warnings (medium), each in priority order
pub fn fix_plan(issues: &[Issue]) -> Vec<PlannedFix> {
    let mut plan: Vec<PlannedFix> = prioritize(issues)
        .into_iter()
        .filter(|issue| issue.fixable)
        .filter_map(|issue| {
            let priority = match issue.severity {
                Severity::Error => FixPriority::High,
                Severity::Warning => FixPriority::Medium,
                Severity::Info => return None,
            };
            Some(PlannedFix { priority, issue })
        })
        .collect();
    plan.sort_by_key(|fix| fix.priority);
    plan
}
