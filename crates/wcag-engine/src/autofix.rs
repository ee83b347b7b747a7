//! Auto-fix engine
//!
//! Applies deterministic repairs for fixable issues, in priority order.
//! Each applied mutation goes through the [`WriteBack`] collaborator, bumps
//! the document revision, and yields exactly one audit entry. A repair whose
//! before and after values agree is a no-op and records nothing, so running
//! the same fixes twice changes nothing the second time.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use shared_types::{
    file_stem, AuditAction, AuditLogEntry, Document, FixKind, Issue, IssueKey, NodeId, Tag,
    ValidationResult,
};
use tracing::{debug, info, instrument, warn};

use crate::checks::headings::{heading_candidates, rank_heading_levels};
use crate::checks::tables::table_rows;
use crate::config::EngineSettings;
use crate::error::{EngineError, Result, WriteBackError};
use crate::patterns::{is_valid_language_tag, PLACEHOLDER_ALT_TEXT};
use crate::priority::prioritize;

/// Field of the persisted document touched by a repair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Title,
    Language,
    Tagged,
    Role,
    AltText,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Title => "title",
            Field::Language => "language",
            Field::Tagged => "tagged",
            Field::Role => "role",
            Field::AltText => "alt_text",
        };
        f.write_str(name)
    }
}

/// Writer side of the document parser. `node` is `None` for document-level
/// fields.
pub trait WriteBack {
    fn write_back(
        &mut self,
        node: Option<NodeId>,
        field: Field,
        value: &str,
    ) -> std::result::Result<(), WriteBackError>;
}

/// Writer for callers that persist the structure model themselves
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopWriteBack;

impl WriteBack for NoopWriteBack {
    fn write_back(
        &mut self,
        _node: Option<NodeId>,
        _field: Field,
        _value: &str,
    ) -> std::result::Result<(), WriteBackError> {
        Ok(())
    }
}

/// Keeps every write in memory
#[derive(Debug, Default, Clone)]
pub struct RecordingWriteBack {
    pub writes: Vec<(Option<NodeId>, Field, String)>,
}

impl WriteBack for RecordingWriteBack {
    fn write_back(
        &mut self,
        node: Option<NodeId>,
        field: Field,
        value: &str,
    ) -> std::result::Result<(), WriteBackError> {
        self.writes.push((node, field, value.to_string()));
        Ok(())
    }
}

/// Caller-supplied inputs for one auto-fix run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixRequest {
    /// Overrides the file name recorded on the document
    pub file_name: Option<String>,
    pub default_language: String,
    /// Alt text suggestions per figure
    pub suggestions: BTreeMap<NodeId, String>,
}

impl Default for FixRequest {
    fn default() -> Self {
        Self {
            file_name: None,
            default_language: "en".to_string(),
            suggestions: BTreeMap::new(),
        }
    }
}

impl FixRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file_name(mut self, file_name: &str) -> Self {
        self.file_name = Some(file_name.to_string());
        self
    }

    pub fn with_language(mut self, language: &str) -> Self {
        self.default_language = language.to_string();
        self
    }

    pub fn with_suggestion(mut self, node: NodeId, text: &str) -> Self {
        self.suggestions.insert(node, text.to_string());
        self
    }
}

/// A fixable issue the engine declined to repair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedFix {
    pub kind: FixKind,
    pub issue: IssueKey,
    pub node: Option<NodeId>,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct FixOutcome {
    pub document: Document,
    /// One entry per applied mutation, in application order
    pub entries: Vec<AuditLogEntry>,
    /// Re-validation required
    pub dirty: bool,
    pub skipped: Vec<SkippedFix>,
}

/// Repairs a document against a validation result computed for it
pub struct AutoFixEngine<'a, W: WriteBack + ?Sized> {
    settings: &'a EngineSettings,
    request: &'a FixRequest,
    writer: &'a mut W,
    entries: Vec<AuditLogEntry>,
    skipped: Vec<SkippedFix>,
}

impl<'a, W: WriteBack + ?Sized> AutoFixEngine<'a, W> {
    pub fn new(settings: &'a EngineSettings, request: &'a FixRequest, writer: &'a mut W) -> Self {
        Self {
            settings,
            request,
            writer,
            entries: Vec::new(),
            skipped: Vec::new(),
        }
    }

    /// Apply every fixable issue of `result`, highest priority first
    ///
    /// # Errors
    ///
    /// [`EngineError::StaleTarget`] when `result` was computed at another
    /// revision. A repair that fails once the run has started (target node
    /// gone or changed role, writer rejection) stops the run with
    /// [`EngineError::FixInterrupted`], which carries the document and the
    /// entries of every mutation applied before the failure.
    #[instrument(skip_all, fields(revision = document.revision(), issues = result.issues.len()))]
    pub fn run(mut self, mut document: Document, result: &ValidationResult) -> Result<FixOutcome> {
        if !result.is_current_for(&document) {
            return Err(EngineError::stale_result(result.revision, document.revision()));
        }

        for issue in prioritize(&result.issues).iter().filter(|i| i.fixable) {
            if let Err(error) = self.apply_issue(&mut document, issue) {
                warn!(%error, applied = self.entries.len(), "auto-fix interrupted");
                return Err(EngineError::FixInterrupted {
                    source: Box::new(error),
                    outcome: Box::new(self.finish(document)),
                });
            }
        }

        info!(
            applied = self.entries.len(),
            skipped = self.skipped.len(),
            "auto-fix complete"
        );
        Ok(self.finish(document))
    }

    fn finish(self, document: Document) -> FixOutcome {
        FixOutcome {
            document,
            dirty: !self.entries.is_empty(),
            entries: self.entries,
            skipped: self.skipped,
        }
    }

    /// Apply the repair for a single issue
    pub fn apply_issue(&mut self, document: &mut Document, issue: &Issue) -> Result<()> {
        let Some(kind) = issue.fix_kind else {
            return Ok(());
        };
        match kind {
            FixKind::SetTitle => self.set_title(document, issue),
            FixKind::SetLanguage => self.set_language(document, issue),
            FixKind::TagDocument => self.tag_document(document, issue),
            FixKind::TagHeadings => self.tag_headings(document, issue),
            FixKind::SetAltText => self.set_alt_text(document, issue),
            FixKind::RelevelHeading => self.relevel_heading(document, issue),
            FixKind::PromoteTableHeaders => self.promote_table_headers(document, issue),
        }
    }

    fn set_title(&mut self, document: &mut Document, issue: &Issue) -> Result<()> {
        let file_name = self
            .request
            .file_name
            .clone()
            .or_else(|| document.file_name.clone());
        let Some(file_name) = file_name else {
            self.skip(FixKind::SetTitle, issue, "no file name to derive a title from");
            return Ok(());
        };

        let title = humanize_title(file_stem(&file_name));
        let before = document.title.clone().unwrap_or_default();
        if title.is_empty() {
            self.skip(FixKind::SetTitle, issue, "file name gives no usable title");
            return Ok(());
        }
        if before.trim() == title {
            if title == file_stem(&file_name).trim() {
                self.skip(FixKind::SetTitle, issue, "file name gives no better title");
            } else {
                debug!("title already set");
            }
            return Ok(());
        }

        self.writer.write_back(None, Field::Title, &title)?;
        document.title = Some(title.clone());
        self.record(document, FixKind::SetTitle, issue, None, &before, &title);
        Ok(())
    }

    fn set_language(&mut self, document: &mut Document, issue: &Issue) -> Result<()> {
        let before = document.language.clone().unwrap_or_default();
        if !before.trim().is_empty() {
            debug!(language = %before, "language already set");
            return Ok(());
        }
        let language = self.request.default_language.trim().to_string();
        if !is_valid_language_tag(&language) {
            self.skip(FixKind::SetLanguage, issue, "default language is not a valid tag");
            return Ok(());
        }

        self.writer.write_back(None, Field::Language, &language)?;
        document.language = Some(language.clone());
        self.record(document, FixKind::SetLanguage, issue, None, &before, &language);
        Ok(())
    }

    fn tag_document(&mut self, document: &mut Document, issue: &Issue) -> Result<()> {
        if !document.is_tagged {
            self.writer.write_back(None, Field::Tagged, "true")?;
            document.is_tagged = true;
            self.record(document, FixKind::TagDocument, issue, None, "false", "true");
        }

        let mut retags: Vec<(NodeId, Tag, Tag)> = Vec::new();
        if document.root.tag != Tag::Document {
            retags.push((document.root.id, document.root.tag, Tag::Document));
        }
        // Text becomes body paragraphs, empty leaves become artifacts
        retags.extend(
            document
                .walk()
                .skip(1)
                .filter(|node| node.tag == Tag::Untagged)
                .filter_map(|node| match (node.has_text(), node.is_leaf()) {
                    (true, _) => Some((node.id, node.tag, Tag::Paragraph)),
                    (false, true) => Some((node.id, node.tag, Tag::Artifact)),
                    (false, false) => None,
                }),
        );

        for (id, before, after) in retags {
            self.retag(document, FixKind::TagDocument, issue, id, before, after)?;
        }

        if !document.walk().skip(1).any(|node| node.tag != Tag::Untagged) {
            self.skip(FixKind::TagDocument, issue, "document has no content to tag");
        }
        Ok(())
    }

    fn tag_headings(&mut self, document: &mut Document, issue: &Issue) -> Result<()> {
        if !document.headings().is_empty() {
            debug!("document already has headings");
            return Ok(());
        }
        let levels = {
            let candidates = heading_candidates(document, &self.settings.heuristics);
            rank_heading_levels(&candidates)
        };
        if levels.is_empty() {
            self.skip(FixKind::TagHeadings, issue, "no heading candidates found");
            return Ok(());
        }

        for (id, level) in levels {
            let before = match document.find(id) {
                Some(node) => node.tag,
                None => return Err(EngineError::missing_node(id)),
            };
            self.retag(document, FixKind::TagHeadings, issue, id, before, Tag::Heading(level))?;
        }
        Ok(())
    }

    fn set_alt_text(&mut self, document: &mut Document, issue: &Issue) -> Result<()> {
        let id = target_node(issue)?;
        let node = document.find(id).ok_or_else(|| EngineError::missing_node(id))?;
        if node.tag != Tag::Figure {
            return Err(EngineError::unexpected_role(id, "Figure", &node.tag.role_name()));
        }

        let before = node.attributes.alt_text.clone().unwrap_or_default();
        let suggestion = self
            .request
            .suggestions
            .get(&id)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty());
        let after = match suggestion {
            Some(text) => text.to_string(),
            None if before.trim().is_empty() => PLACEHOLDER_ALT_TEXT.to_string(),
            None => {
                self.skip(FixKind::SetAltText, issue, "no alt text suggestion for figure");
                return Ok(());
            }
        };
        if before == after {
            return Ok(());
        }

        self.writer.write_back(Some(id), Field::AltText, &after)?;
        if let Some(node) = document.find_mut(id) {
            node.attributes.alt_text = Some(after.clone());
        }
        self.record(document, FixKind::SetAltText, issue, Some(id), &before, &after);
        Ok(())
    }

    fn relevel_heading(&mut self, document: &mut Document, issue: &Issue) -> Result<()> {
        let id = target_node(issue)?;
        let headings = document.headings();
        let position = headings
            .iter()
            .position(|h| h.id == id)
            .ok_or_else(|| match document.find(id) {
                Some(node) => EngineError::unexpected_role(id, "heading", &node.tag.role_name()),
                None => EngineError::missing_node(id),
            })?;

        let current = headings[position].tag;
        let allowed = match position {
            0 => 1,
            _ => headings[position - 1].tag.heading_level().unwrap_or(0) + 1,
        };
        let level = current.heading_level().unwrap_or(1);
        if level <= allowed {
            return Ok(());
        }

        self.retag(document, FixKind::RelevelHeading, issue, id, current, Tag::Heading(allowed))
    }

    fn promote_table_headers(&mut self, document: &mut Document, issue: &Issue) -> Result<()> {
        let id = target_node(issue)?;
        let table = document.find(id).ok_or_else(|| EngineError::missing_node(id))?;
        if table.tag != Tag::Table {
            return Err(EngineError::unexpected_role(id, "Table", &table.tag.role_name()));
        }

        let cells: Vec<NodeId> = table_rows(table)
            .first()
            .map(|row| {
                row.children
                    .iter()
                    .filter(|cell| cell.tag == Tag::TableDataCell)
                    .map(|cell| cell.id)
                    .collect()
            })
            .unwrap_or_default();
        if cells.is_empty() {
            self.skip(FixKind::PromoteTableHeaders, issue, "first row has no data cells");
            return Ok(());
        }

        for cell in cells {
            self.retag(
                document,
                FixKind::PromoteTableHeaders,
                issue,
                cell,
                Tag::TableDataCell,
                Tag::TableHeaderCell,
            )?;
        }
        Ok(())
    }

    fn retag(
        &mut self,
        document: &mut Document,
        kind: FixKind,
        issue: &Issue,
        id: NodeId,
        before: Tag,
        after: Tag,
    ) -> Result<()> {
        if before == after {
            return Ok(());
        }
        let after_name = after.role_name();
        self.writer.write_back(Some(id), Field::Role, &after_name)?;
        let node = document
            .find_mut(id)
            .ok_or_else(|| EngineError::missing_node(id))?;
        node.tag = after;
        self.record(document, kind, issue, Some(id), &before.role_name(), &after_name);
        Ok(())
    }

    fn record(
        &mut self,
        document: &mut Document,
        kind: FixKind,
        issue: &Issue,
        node: Option<NodeId>,
        before: &str,
        after: &str,
    ) {
        document.mark_mutated();
        let page = match node {
            Some(id) => document.effective_page(id).or(issue.page),
            None => issue.page,
        };
        let mut entry = AuditLogEntry::new(AuditAction::Fix(kind), before, after)
            .for_criterion(issue.criterion)
            .on_page(page);
        if let Some(id) = node {
            entry = entry.on_node(id);
        }
        info!(fix = %kind, node = ?node, before, after, "applied fix");
        self.entries.push(entry);
    }

    fn skip(&mut self, kind: FixKind, issue: &Issue, reason: &str) {
        warn!(fix = %kind, node = ?issue.node, reason, "fix skipped");
        self.skipped.push(SkippedFix {
            kind,
            issue: issue.key(),
            node: issue.node,
            reason: reason.to_string(),
        });
    }
}

fn target_node(issue: &Issue) -> Result<NodeId> {
    issue.node.ok_or_else(|| {
        EngineError::StaleTarget(format!("issue \"{}\" names no target node", issue.message))
    })
}

/// "annual_report-2024" -> "Annual Report 2024"
pub fn humanize_title(stem: &str) -> String {
    stem.replace(['_', '-'], " ")
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
