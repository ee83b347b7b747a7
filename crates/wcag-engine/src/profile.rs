//! Document profile store
//!
//! Profiles are keyed by content hash, so a document keeps its history when
//! it is renamed or moved. Resolved criteria only ever grow.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared_types::{ContentHash, DocumentProfile, IssueKey, ValidationResult};
use tracing::{debug, info, instrument};

/// Storage behind the profile lookups. Implementations decide where profiles live.
pub trait ProfileStore {
    /// `None` for a document never seen before
    fn lookup(&self, hash: &ContentHash) -> Option<DocumentProfile>;

    fn record_at(
        &mut self,
        hash: &ContentHash,
        result: &ValidationResult,
        at: DateTime<Utc>,
    ) -> DocumentProfile;

    fn record(&mut self, hash: &ContentHash, result: &ValidationResult) -> DocumentProfile {
        self.record_at(hash, result, Utc::now())
    }
}

/// Profile store held in memory, with JSON snapshot/restore for whatever
/// persists it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InMemoryProfileStore {
    profiles: BTreeMap<ContentHash, DocumentProfile>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

impl ProfileStore for InMemoryProfileStore {
    fn lookup(&self, hash: &ContentHash) -> Option<DocumentProfile> {
        self.profiles.get(hash).cloned()
    }

    #[instrument(skip_all, fields(hash = %hash, score = result.score))]
    fn record_at(
        &mut self,
        hash: &ContentHash,
        result: &ValidationResult,
        at: DateTime<Utc>,
    ) -> DocumentProfile {
        let issues = issue_keys(result);
        match self.profiles.get_mut(hash) {
            Some(profile) => {
                profile.add_session(at, result.score, &result.passed_criteria, issues);
                debug!(sessions = profile.session_count, "returning document");
                profile.clone()
            }
            None => {
                let profile = DocumentProfile::first_session(
                    hash.clone(),
                    at,
                    result.score,
                    &result.passed_criteria,
                    issues,
                );
                info!("new document profile");
                self.profiles.insert(hash.clone(), profile.clone());
                profile
            }
        }
    }
}

fn issue_keys(result: &ValidationResult) -> Vec<IssueKey> {
    let keys: BTreeSet<IssueKey> = result.issues.iter().map(|issue| issue.key()).collect();
    keys.into_iter().collect()
}

/// How the current validation compares with the last recorded session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionComparison {
    pub is_returning: bool,
    pub session_count: u32,
    pub previous_score: Option<u8>,
    pub current_score: u8,
    pub new_issues: Vec<IssueKey>,
    pub resolved_issues: Vec<IssueKey>,
    pub persistent_issues: Vec<IssueKey>,
}

impl SessionComparison {
    /// Score change since the last session (0 for a new document)
    pub fn score_delta(&self) -> i16 {
        self.previous_score
            .map(|prev| i16::from(self.current_score) - i16::from(prev))
            .unwrap_or(0)
    }
}

/// Compare a fresh result with the stored profile. Call before recording it.
pub fn compare_sessions<S: ProfileStore + ?Sized>(
    store: &S,
    hash: &ContentHash,
    result: &ValidationResult,
) -> SessionComparison {
    let current: BTreeSet<IssueKey> = issue_keys(result).into_iter().collect();

    let Some(profile) = store.lookup(hash) else {
        return SessionComparison {
            is_returning: false,
            session_count: 0,
            previous_score: None,
            current_score: result.score,
            new_issues: current.into_iter().collect(),
            resolved_issues: Vec::new(),
            persistent_issues: Vec::new(),
        };
    };

    let previous: BTreeSet<IssueKey> = profile.last_issues.iter().cloned().collect();
    SessionComparison {
        is_returning: true,
        session_count: profile.session_count,
        previous_score: Some(profile.last_score),
        current_score: result.score,
        new_issues: current.difference(&previous).cloned().collect(),
        resolved_issues: previous.difference(&current).cloned().collect(),
        persistent_issues: current.intersection(&previous).cloned().collect(),
    }
}
