//! Accessibility validation, scoring and auto-fix engine
//!
//! Evaluates a tagged document's structure model against twelve WCAG
//! checks, scores it, orders the issues by impact, repairs what can be
//! repaired deterministically, and remembers documents across sessions by
//! content hash.
//!
//! ```no_run
//! use shared_types::{ContentHash, Document};
//! use wcag_engine::{autofix, record_profile, revalidate, validate};
//! use wcag_engine::{EngineSettings, FixRequest, InMemoryProfileStore};
//!
//! # fn run(document: Document, bytes: &[u8]) -> wcag_engine::Result<()> {
//! let settings = EngineSettings::default();
//! let result = validate(&document, &settings)?;
//!
//! let outcome = autofix(document, &result, &FixRequest::new(), &settings)?;
//! let mut document = outcome.document;
//! let result = revalidate(&mut document, &settings)?;
//!
//! let mut store = InMemoryProfileStore::new();
//! record_profile(&mut store, &ContentHash::of_bytes(bytes), &result);
//! # Ok(())
//! # }
//! ```

pub mod autofix;
pub mod batch;
pub mod checks;
pub mod color;
pub mod config;
pub mod error;
pub mod patterns;
pub mod priority;
pub mod profile;
pub mod report;
pub mod validator;

use shared_types::{ContentHash, Document, DocumentProfile, Issue, ValidationResult};

pub use autofix::{
    humanize_title, AutoFixEngine, Field, FixOutcome, FixRequest, NoopWriteBack,
    RecordingWriteBack, SkippedFix, WriteBack,
};
pub use batch::{run_batch, BatchItem, BatchOutcome, BatchReport, BatchStatus};
pub use config::{BatchSettings, EngineSettings, Heuristics};
pub use error::{EngineError, Result, WriteBackError};
pub use priority::{fix_plan, prioritize, FixPriority, PlannedFix};
pub use profile::{compare_sessions, InMemoryProfileStore, ProfileStore, SessionComparison};
pub use report::{ComplianceReport, CriterionReport, CriterionStatus};
pub use validator::{revalidate, validate};

/// Repair `document` using the writer-less path; the caller persists the result
pub fn autofix(
    document: Document,
    result: &ValidationResult,
    request: &FixRequest,
    settings: &EngineSettings,
) -> Result<FixOutcome> {
    let mut writer = NoopWriteBack;
    AutoFixEngine::new(settings, request, &mut writer).run(document, result)
}

/// Merge a validation session into the document's profile
pub fn record_profile<S: ProfileStore + ?Sized>(
    store: &mut S,
    hash: &ContentHash,
    result: &ValidationResult,
) -> DocumentProfile {
    store.record(hash, result)
}

/// Engine entry point holding one immutable settings value
#[derive(Debug, Clone, Default)]
pub struct WcagEngine {
    settings: EngineSettings,
}

impl WcagEngine {
    pub fn new(settings: EngineSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn validate(&self, document: &Document) -> Result<ValidationResult> {
        validate(document, &self.settings)
    }

    pub fn revalidate(&self, document: &mut Document) -> Result<ValidationResult> {
        revalidate(document, &self.settings)
    }

    /// Issues of `result` in priority order
    pub fn prioritize(&self, result: &ValidationResult) -> Vec<Issue> {
        prioritize(&result.issues)
    }

    pub fn autofix<W: WriteBack + ?Sized>(
        &self,
        document: Document,
        result: &ValidationResult,
        request: &FixRequest,
        writer: &mut W,
    ) -> Result<FixOutcome> {
        AutoFixEngine::new(&self.settings, request, writer).run(document, result)
    }
}
