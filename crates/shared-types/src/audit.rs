//! Append-only, tamper-evident ledger of remediation changes

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::structure::NodeId;
use crate::types::{Criterion, FixKind};

/// What produced a change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Fix(FixKind),
    ManualEdit(String),
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditAction::Fix(kind) => write!(f, "{}", kind),
            AuditAction::ManualEdit(name) => write!(f, "manual:{}", name),
        }
    }
}

/// One discrete mutation with its before/after values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub action: AuditAction,
    pub criterion: Option<Criterion>,
    pub page: Option<u32>,
    pub node: Option<NodeId>,
    pub before_value: String,
    pub after_value: String,
    /// Hash of the preceding entry, set when appended to a log
    pub previous_hash: Option<String>,
}

impl AuditLogEntry {
    pub fn new(action: AuditAction, before_value: &str, after_value: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            action,
            criterion: None,
            page: None,
            node: None,
            before_value: before_value.to_string(),
            after_value: after_value.to_string(),
            previous_hash: None,
        }
    }

    pub fn for_criterion(mut self, criterion: Criterion) -> Self {
        self.criterion = Some(criterion);
        self
    }

    pub fn on_page(mut self, page: Option<u32>) -> Self {
        self.page = page;
        self
    }

    pub fn on_node(mut self, node: NodeId) -> Self {
        self.node = Some(node);
        self
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Hash of this entry (for chain linking)
    pub fn compute_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.id.as_bytes());
        hasher.update(self.timestamp.to_rfc3339().as_bytes());
        hasher.update(self.action.to_string().as_bytes());
        if let Some(criterion) = self.criterion {
            hasher.update(criterion.id().as_bytes());
        }
        if let Some(page) = self.page {
            hasher.update(page.to_le_bytes());
        }
        if let Some(node) = self.node {
            hasher.update(node.0.to_le_bytes());
        }
        hasher.update(self.before_value.as_bytes());
        hasher.update([0u8]);
        hasher.update(self.after_value.as_bytes());
        if let Some(ref prev) = self.previous_hash {
            hasher.update(prev.as_bytes());
        }
        hex::encode(hasher.finalize())
    }
}

/// Audit ledger for one document's working session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditLog {
    pub document_hash: String,
    pub created_at: Option<DateTime<Utc>>,
    entries: Vec<AuditLogEntry>,
}

impl AuditLog {
    pub fn new(document_hash: &str) -> Self {
        Self {
            document_hash: document_hash.to_string(),
            created_at: Some(Utc::now()),
            entries: Vec::new(),
        }
    }

    pub fn entries(&self) -> &[AuditLogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last_hash(&self) -> Option<String> {
        self.entries.last().map(|e| e.compute_hash())
    }

    /// Append an entry, linking it to the previous one
    pub fn append(&mut self, mut entry: AuditLogEntry) -> &AuditLogEntry {
        entry.previous_hash = self.last_hash();
        self.entries.push(entry);
        &self.entries[self.entries.len() - 1]
    }

    pub fn extend(&mut self, entries: impl IntoIterator<Item = AuditLogEntry>) {
        for entry in entries {
            self.append(entry);
        }
    }

    /// Entries recorded strictly after `since`
    pub fn entries_since(&self, since: DateTime<Utc>) -> Vec<&AuditLogEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.timestamp > since)
            .collect()
    }

    /// Verify the integrity of the chain
    pub fn verify(&self) -> Result<(), String> {
        let mut expected_prev: Option<String> = None;

        for (i, entry) in self.entries.iter().enumerate() {
            if entry.previous_hash != expected_prev {
                return Err(format!(
                    "Chain broken at entry {}: expected prev {:?}, got {:?}",
                    i, expected_prev, entry.previous_hash
                ));
            }
            expected_prev = Some(entry.compute_hash());
        }

        Ok(())
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// One line per entry, for report rendering
    pub fn summary(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|e| {
                let criterion = e.criterion.map(|c| c.id()).unwrap_or("-");
                let page = e
                    .page
                    .map(|p| format!(" p.{}", p))
                    .unwrap_or_default();
                format!(
                    "[{}] {} ({}){}: {:?} -> {:?}",
                    e.timestamp.format("%Y-%m-%d %H:%M:%S"),
                    e.action,
                    criterion,
                    page,
                    e.before_value,
                    e.after_value
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn entry(before: &str, after: &str) -> AuditLogEntry {
        AuditLogEntry::new(AuditAction::Fix(FixKind::SetTitle), before, after)
            .for_criterion(Criterion::PageTitled)
    }

    #[test]
    fn test_chain_integrity() {
        let mut log = AuditLog::new("hash1");

        log.append(entry("", "Annual Report"));
        log.append(
            AuditLogEntry::new(AuditAction::Fix(FixKind::SetAltText), "", "A chart")
                .for_criterion(Criterion::NonTextContent)
                .on_page(Some(2))
                .on_node(NodeId(7)),
        );
        log.append(AuditLogEntry::new(
            AuditAction::ManualEdit("retag".to_string()),
            "P",
            "H2",
        ));

        assert!(log.verify().is_ok());
        assert_eq!(log.len(), 3);
        assert!(log.entries()[0].previous_hash.is_none());
    }

    #[test]
    fn test_chain_tamper_detection() {
        let mut log = AuditLog::new("hash1");
        log.append(entry("", "Annual Report"));
        log.append(entry("Annual Report", "Annual Report 2024"));

        log.entries[0].after_value = "Something Else".to_string();

        assert!(log.verify().is_err());
    }

    #[test]
    fn test_entries_since_is_exclusive() {
        let base = Utc::now();
        let mut log = AuditLog::new("hash1");
        log.append(entry("", "a").at(base));
        log.append(entry("a", "b").at(base + Duration::seconds(5)));
        log.append(entry("b", "c").at(base + Duration::seconds(10)));

        let recent = log.entries_since(base);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].after_value, "b");
        assert!(log.entries_since(base + Duration::seconds(10)).is_empty());
    }

    #[test]
    fn test_json_snapshot_keeps_chain_valid() {
        let mut log = AuditLog::new("hash1");
        log.append(entry("", "Title"));
        log.append(entry("Title", "Better Title"));

        let restored = AuditLog::from_json(&log.to_json().unwrap()).unwrap();
        assert_eq!(restored.len(), 2);
        assert!(restored.verify().is_ok());
    }

    #[test]
    fn test_summary_mentions_action_and_values() {
        let mut log = AuditLog::new("hash1");
        log.append(entry("", "Annual Report").on_page(Some(1)));
        let lines = log.summary();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("set_title (2.4.2) p.1"));
        assert!(lines[0].contains("\"Annual Report\""));
    }
}
