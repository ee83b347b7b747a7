//! Batch remediation
//!
//! Each document runs validate, auto-fix and re-validate on a blocking
//! worker. Documents are processed in parallel up to
//! `batch.max_parallel`. Profiles are updated after all workers finish, in
//! input order. Cancellation is checked before a document starts, never in
//! the middle of one.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use shared_types::{AuditLogEntry, ContentHash, Document, DocumentProfile, ValidationResult};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use crate::autofix::{AutoFixEngine, FixRequest, NoopWriteBack, SkippedFix};
use crate::config::EngineSettings;
use crate::error::Result;
use crate::profile::ProfileStore;
use crate::validator::{revalidate, validate};

/// One document queued for processing
#[derive(Debug, Clone)]
pub struct BatchItem {
    pub name: String,
    pub content_hash: ContentHash,
    pub document: Document,
    pub request: FixRequest,
}

impl BatchItem {
    pub fn new(name: &str, content_hash: ContentHash, document: Document) -> Self {
        Self {
            name: name.to_string(),
            content_hash,
            document,
            request: FixRequest::default(),
        }
    }

    pub fn with_request(mut self, request: FixRequest) -> Self {
        self.request = request;
        self
    }
}

/// Everything produced for one successfully processed document
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub name: String,
    pub content_hash: ContentHash,
    pub before: ValidationResult,
    pub after: ValidationResult,
    pub entries: Vec<AuditLogEntry>,
    pub skipped: Vec<SkippedFix>,
    pub document: Document,
    /// Set once the profile store has been updated
    pub profile: Option<DocumentProfile>,
}

#[derive(Debug, Clone)]
pub enum BatchOutcome {
    Completed(Box<BatchReport>),
    Failed { name: String, error: String },
    Cancelled { name: String },
}

impl BatchOutcome {
    pub fn name(&self) -> &str {
        match self {
            BatchOutcome::Completed(report) => &report.name,
            BatchOutcome::Failed { name, .. } | BatchOutcome::Cancelled { name } => name,
        }
    }

    pub fn status(&self) -> BatchStatus {
        match self {
            BatchOutcome::Completed(_) => BatchStatus::Completed,
            BatchOutcome::Failed { .. } => BatchStatus::Failed,
            BatchOutcome::Cancelled { .. } => BatchStatus::Cancelled,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchStatus {
    Completed,
    Failed,
    Cancelled,
}

/// validate -> auto-fix -> re-validate for a single document
pub fn process_document(item: BatchItem, settings: &EngineSettings) -> Result<BatchReport> {
    let before = validate(&item.document, settings)?;
    let mut writer = NoopWriteBack;
    let outcome =
        AutoFixEngine::new(settings, &item.request, &mut writer).run(item.document, &before)?;

    let mut document = outcome.document;
    let after = revalidate(&mut document, settings)?;

    Ok(BatchReport {
        name: item.name,
        content_hash: item.content_hash,
        before,
        after,
        entries: outcome.entries,
        skipped: outcome.skipped,
        document,
        profile: None,
    })
}

/// Process `items` concurrently. The returned outcomes follow input order.
#[instrument(skip_all, fields(items = items.len(), max_parallel = settings.batch.max_parallel))]
pub async fn run_batch<S: ProfileStore + ?Sized>(
    items: Vec<BatchItem>,
    settings: Arc<EngineSettings>,
    store: &mut S,
    cancel: CancellationToken,
) -> Vec<BatchOutcome> {
    let semaphore = Arc::new(Semaphore::new(settings.batch.max_parallel.max(1)));
    let names: Vec<String> = items.iter().map(|item| item.name.clone()).collect();
    let mut workers = JoinSet::new();

    for (index, item) in items.into_iter().enumerate() {
        let semaphore = semaphore.clone();
        let settings = settings.clone();
        let cancel = cancel.clone();

        workers.spawn(async move {
            let name = item.name.clone();
            let permit = tokio::select! {
                _ = cancel.cancelled() => None,
                permit = semaphore.acquire_owned() => permit.ok(),
            };
            let Some(_permit) = permit else {
                return (index, BatchOutcome::Cancelled { name });
            };
            if cancel.is_cancelled() {
                return (index, BatchOutcome::Cancelled { name });
            }

            let worker = tokio::task::spawn_blocking(move || process_document(item, &settings));
            let outcome = match worker.await {
                Ok(Ok(report)) => BatchOutcome::Completed(Box::new(report)),
                Ok(Err(e)) => BatchOutcome::Failed {
                    name,
                    error: e.to_string(),
                },
                Err(e) => BatchOutcome::Failed {
                    name,
                    error: format!("worker panicked: {}", e),
                },
            };
            (index, outcome)
        });
    }

    let mut slots: Vec<Option<BatchOutcome>> = vec![None; names.len()];
    while let Some(joined) = workers.join_next().await {
        match joined {
            Ok((index, outcome)) => slots[index] = Some(outcome),
            Err(e) => warn!("batch task aborted: {}", e),
        }
    }

    let mut outcomes = Vec::with_capacity(names.len());
    for (slot, name) in slots.into_iter().zip(names) {
        let outcome = match slot {
            Some(BatchOutcome::Completed(mut report)) => {
                report.profile = Some(store.record(&report.content_hash, &report.after));
                BatchOutcome::Completed(report)
            }
            Some(other) => other,
            None => BatchOutcome::Failed {
                name,
                error: "worker aborted".to_string(),
            },
        };
        match &outcome {
            BatchOutcome::Completed(report) => info!(
                document = %report.name,
                before = report.before.score,
                after = report.after.score,
                fixes = report.entries.len(),
                "document remediated"
            ),
            BatchOutcome::Failed { name, error } => {
                warn!(document = %name, %error, "document failed")
            }
            BatchOutcome::Cancelled { name } => info!(document = %name, "document cancelled"),
        }
        outcomes.push(outcome);
    }
    outcomes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::InMemoryProfileStore;
    use shared_types::{NodeId, StructureNode, Tag};

    fn item(name: &str) -> BatchItem {
        let root = StructureNode::new(0, Tag::Untagged).with_child(
            StructureNode::new(1, Tag::Untagged)
                .on_page(1)
                .with_text("Lecture notes"),
        );
        let document = Document::new(root, 1).with_file_name(&format!("{}.pdf", name));
        BatchItem::new(name, ContentHash::of_bytes(name.as_bytes()), document)
    }

    fn broken(name: &str) -> BatchItem {
        let mut item = item(name);
        item.document.root.children[0].page = Some(9);
        item
    }

    #[tokio::test]
    async fn test_batch_remediates_in_input_order() {
        let mut store = InMemoryProfileStore::new();
        let items = vec![item("week_one"), item("week_two"), item("week_three")];

        let outcomes = run_batch(
            items,
            Arc::new(EngineSettings::default()),
            &mut store,
            CancellationToken::new(),
        )
        .await;

        let names: Vec<_> = outcomes.iter().map(|o| o.name()).collect();
        assert_eq!(names, vec!["week_one", "week_two", "week_three"]);
        for outcome in &outcomes {
            let BatchOutcome::Completed(report) = outcome else {
                panic!("expected completion, got {:?}", outcome.status());
            };
            assert!(report.after.score > report.before.score);
            assert!(!report.document.is_dirty());
            assert_eq!(report.profile.as_ref().map(|p| p.session_count), Some(1));
        }
        assert_eq!(store.len(), 3);
    }

    #[tokio::test]
    async fn test_failure_is_isolated() {
        let mut store = InMemoryProfileStore::new();
        let items = vec![item("good"), broken("bad")];

        let outcomes = run_batch(
            items,
            Arc::new(EngineSettings::default()),
            &mut store,
            CancellationToken::new(),
        )
        .await;

        assert_eq!(outcomes[0].status(), BatchStatus::Completed);
        assert_eq!(outcomes[1].status(), BatchStatus::Failed);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_cancelled_batch_reports_every_item() {
        let mut store = InMemoryProfileStore::new();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let outcomes = run_batch(
            vec![item("a"), item("b")],
            Arc::new(EngineSettings::default()),
            &mut store,
            cancel,
        )
        .await;

        assert!(outcomes
            .iter()
            .all(|o| o.status() == BatchStatus::Cancelled));
        assert!(store.is_empty());
    }

    #[test]
    fn test_process_document_uses_request_suggestions() {
        let mut batch_item = item("figures");
        batch_item
            .document
            .root
            .children
            .push(StructureNode::new(2, Tag::Figure).on_page(1));
        let request = FixRequest::new().with_suggestion(NodeId(2), "Diagram of the water cycle");
        let batch_item = batch_item.with_request(request);

        let report = process_document(batch_item, &EngineSettings::default()).unwrap();
        assert_eq!(
            report
                .document
                .find(NodeId(2))
                .and_then(|n| n.attributes.alt_text.as_deref()),
            Some("Diagram of the water cycle")
        );
        assert!(report.after.issues_for(shared_types::Criterion::NonTextContent).is_empty());
    }
}
