//! Shared data model for the accessibility engine
//!
//! Structure tree, WCAG vocabulary, validation results, document profiles
//! and the audit ledger. Consumed by the engine and by report renderers.

pub mod audit;
pub mod error;
pub mod profile;
pub mod structure;
pub mod types;
pub mod walker;

pub use audit::{AuditAction, AuditLog, AuditLogEntry};
pub use error::StructureError;
pub use profile::{ContentHash, DocumentProfile, ScorePoint};
pub use structure::{
    file_stem, BoundingBox, Document, NodeAttributes, NodeId, Permissions, Rgb, StructureNode,
    Tag,
};
pub use types::{
    CheckId, Criterion, FixKind, Issue, IssueKey, IssueSummary, Severity, ValidationResult,
    WcagLevel,
};
pub use walker::PreOrder;
