use shared_types::{NodeId, StructureError};
use thiserror::Error;

use crate::autofix::FixOutcome;

/// Errors raised by the engine. Nothing here is process-fatal; batch runs
/// turn them into per-document failures.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Malformed document structure: {0}")]
    Structure(#[from] StructureError),

    #[error("Stale fix target: {0}")]
    StaleTarget(String),

    #[error("Write-back failed: {0}")]
    WriteBack(#[from] WriteBackError),

    #[error("Invalid settings: {0}")]
    Settings(String),

    /// A repair failed after others were applied. `outcome` holds the
    /// document and the entries for everything already written.
    #[error("Auto-fix stopped after {} applied fix(es): {source}", .outcome.entries.len())]
    FixInterrupted {
        source: Box<EngineError>,
        outcome: Box<FixOutcome>,
    },
}

impl EngineError {
    pub fn stale_result(result_revision: u64, document_revision: u64) -> Self {
        EngineError::StaleTarget(format!(
            "validation result is for revision {}, document is at revision {}",
            result_revision, document_revision
        ))
    }

    pub fn missing_node(node: NodeId) -> Self {
        EngineError::StaleTarget(format!("node {} no longer exists", node))
    }

    pub fn unexpected_role(node: NodeId, expected: &str, found: &str) -> Self {
        EngineError::StaleTarget(format!(
            "node {} is now {} (expected {})",
            node, found, expected
        ))
    }

    /// Document and audit entries of an interrupted auto-fix run
    pub fn into_partial_outcome(self) -> Option<FixOutcome> {
        match self {
            EngineError::FixInterrupted { outcome, .. } => Some(*outcome),
            _ => None,
        }
    }
}

/// Failure reported by the document writer collaborator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WriteBackError {
    #[error("Document is read-only")]
    ReadOnly,

    #[error("Writer rejected {field} on node {node}: {reason}")]
    Rejected {
        node: NodeId,
        field: String,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, EngineError>;
