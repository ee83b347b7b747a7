//! Criterion registry
//!
//! Twelve independent checks, each a pure function from the document and
//! settings to issues. The registry order below is the evaluation order and
//! the tie-breaker used by the prioritizer.

pub mod alt_text;
pub mod artifacts;
pub mod contrast;
pub mod forms;
pub mod headings;
pub mod language;
pub mod links;
pub mod reading_order;
pub mod security;
pub mod tables;
pub mod tagged;
pub mod title;

use shared_types::{CheckId, Document, Issue, StructureNode, Tag};

use crate::config::EngineSettings;

pub type CheckFn = fn(&Document, &EngineSettings) -> Vec<Issue>;

pub struct RegisteredCheck {
    pub id: CheckId,
    pub run: CheckFn,
}

pub const REGISTRY: [RegisteredCheck; 12] = [
    RegisteredCheck {
        id: CheckId::Title,
        run: title::check_title,
    },
    RegisteredCheck {
        id: CheckId::Language,
        run: language::check_language,
    },
    RegisteredCheck {
        id: CheckId::TaggedStructure,
        run: tagged::check_tagged_structure,
    },
    RegisteredCheck {
        id: CheckId::ReadingOrder,
        run: reading_order::check_reading_order,
    },
    RegisteredCheck {
        id: CheckId::Headings,
        run: headings::check_headings,
    },
    RegisteredCheck {
        id: CheckId::AltText,
        run: alt_text::check_alt_text,
    },
    RegisteredCheck {
        id: CheckId::ColorContrast,
        run: contrast::check_contrast,
    },
    RegisteredCheck {
        id: CheckId::TableStructure,
        run: tables::check_tables,
    },
    RegisteredCheck {
        id: CheckId::LinkPurpose,
        run: links::check_links,
    },
    RegisteredCheck {
        id: CheckId::FormLabels,
        run: forms::check_form_labels,
    },
    RegisteredCheck {
        id: CheckId::Security,
        run: security::check_security,
    },
    RegisteredCheck {
        id: CheckId::Artifacts,
        run: artifacts::check_artifacts,
    },
];

/// A node seen during traversal, with context inherited from its ancestors
#[derive(Debug, Clone, Copy)]
pub(crate) struct Visit<'a> {
    pub node: &'a StructureNode,
    /// Own page, or the nearest ancestor's
    pub page: Option<u32>,
    pub in_table: bool,
    pub is_root: bool,
}

/// Pre-order visit of the whole tree in one pass
pub(crate) fn visit(document: &Document) -> Vec<Visit<'_>> {
    let mut out = Vec::new();
    collect(&document.root, None, false, true, &mut out);
    out
}

fn collect<'a>(
    node: &'a StructureNode,
    inherited_page: Option<u32>,
    inherited_table: bool,
    is_root: bool,
    out: &mut Vec<Visit<'a>>,
) {
    let page = node.page.or(inherited_page);
    let in_table = inherited_table || node.tag == Tag::Table;
    out.push(Visit {
        node,
        page,
        in_table: inherited_table,
        is_root,
    });
    for child in &node.children {
        collect(child, page, in_table, false, out);
    }
}

/// Text leaves with a position, the raw material of the layout heuristics
pub(crate) fn positioned_text(document: &Document) -> Vec<Visit<'_>> {
    visit(document)
        .into_iter()
        .filter(|v| v.node.is_leaf() && v.node.has_text() && v.node.bbox.is_some())
        .filter(|v| v.node.tag != Tag::Artifact)
        .collect()
}
