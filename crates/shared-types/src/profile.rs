//! Cross-session document profiles, keyed by content hash

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::types::{Criterion, IssueKey};

/// SHA-256 digest of document bytes, hex encoded. Stable across renames and moves.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentHash(String);

impl ContentHash {
    pub fn of_bytes(bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        ContentHash(hex::encode(hasher.finalize()))
    }

    /// Wrap a digest computed elsewhere
    pub fn from_hex(hex: &str) -> Self {
        ContentHash(hex.to_ascii_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScorePoint {
    pub timestamp: DateTime<Utc>,
    pub score: u8,
}

/// What the engine remembers about a document between sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentProfile {
    pub content_hash: ContentHash,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    pub session_count: u32,
    pub score_history: Vec<ScorePoint>,
    /// Criteria that passed in any session. Never shrinks.
    pub resolved_criteria: BTreeSet<Criterion>,
    pub last_score: u8,
    pub last_issues: Vec<IssueKey>,
}

impl DocumentProfile {
    pub fn first_session(
        content_hash: ContentHash,
        at: DateTime<Utc>,
        score: u8,
        passed: &BTreeSet<Criterion>,
        issues: Vec<IssueKey>,
    ) -> Self {
        Self {
            content_hash,
            first_seen: at,
            last_seen: at,
            session_count: 1,
            score_history: vec![ScorePoint {
                timestamp: at,
                score,
            }],
            resolved_criteria: passed.clone(),
            last_score: score,
            last_issues: issues,
        }
    }

    /// Merge another session into the profile
    pub fn add_session(
        &mut self,
        at: DateTime<Utc>,
        score: u8,
        passed: &BTreeSet<Criterion>,
        issues: Vec<IssueKey>,
    ) {
        self.session_count += 1;
        self.last_seen = at;
        self.score_history.push(ScorePoint {
            timestamp: at,
            score,
        });
        self.resolved_criteria.extend(passed.iter().copied());
        self.last_score = score;
        self.last_issues = issues;
    }

    pub fn previous_score(&self) -> Option<u8> {
        let len = self.score_history.len();
        if len >= 2 {
            Some(self.score_history[len - 2].score)
        } else {
            None
        }
    }
}
