//! Table structure, WCAG 1.3.1
//!
//! Tagged tables need rows and header cells. Untagged text laid out on a
//! grid (several rows sharing the same column positions) is reported as a
//! probable table that was never tagged.

use std::collections::{BTreeMap, BTreeSet};

use shared_types::{CheckId, Criterion, Document, FixKind, Issue, Severity, StructureNode, Tag};

use crate::checks::{positioned_text, visit};
use crate::config::{EngineSettings, Heuristics};

pub fn check_tables(document: &Document, settings: &EngineSettings) -> Vec<Issue> {
    let mut issues = Vec::new();

    for v in visit(document).into_iter().filter(|v| v.node.tag == Tag::Table) {
        let rows = table_rows(v.node);
        if rows.is_empty() {
            issues.push(
                Issue::new(
                    CheckId::TableStructure,
                    Criterion::InfoAndRelationships,
                    Severity::Warning,
                    "Table has no rows",
                )
                .with_page(v.page)
                .with_location(v.node.bbox)
                .with_node(v.node.id)
                .with_suggestion("Tag the table contents as TR/TH/TD"),
            );
            continue;
        }

        if !has_header_cells(&rows) {
            issues.push(
                Issue::new(
                    CheckId::TableStructure,
                    Criterion::InfoAndRelationships,
                    Severity::Error,
                    "Table has no header cells",
                )
                .with_page(v.page)
                .with_location(v.node.bbox)
                .with_node(v.node.id)
                .with_suggestion("Mark the first row (or first column) as TH header cells")
                .fixable_by(FixKind::PromoteTableHeaders),
            );
        }
    }

    let mut pages: BTreeMap<u32, Vec<&StructureNode>> = BTreeMap::new();
    for v in positioned_text(document) {
        if v.in_table || !v.node.tag.is_plain_text() {
            continue;
        }
        if let Some(page) = v.page {
            pages.entry(page).or_default().push(v.node);
        }
    }
    for (page, runs) in pages {
        if looks_like_grid(&runs, &settings.heuristics) {
            issues.push(
                Issue::new(
                    CheckId::TableStructure,
                    Criterion::InfoAndRelationships,
                    Severity::Warning,
                    &format!("Possible untagged table on page {}", page),
                )
                .with_page(Some(page))
                .with_suggestion("Tag the tabular content as a Table with header cells"),
            );
        }
    }

    issues
}

/// Rows of a table, nested tables excluded
pub fn table_rows(table: &StructureNode) -> Vec<&StructureNode> {
    let mut rows = Vec::new();
    collect_rows(table, &mut rows);
    rows
}

fn collect_rows<'a>(node: &'a StructureNode, rows: &mut Vec<&'a StructureNode>) {
    for child in &node.children {
        match child.tag {
            Tag::TableRow => rows.push(child),
            Tag::Table => {}
            _ => collect_rows(child, rows),
        }
    }
}

fn row_cells(row: &StructureNode) -> impl Iterator<Item = &StructureNode> {
    row.children
        .iter()
        .filter(|c| matches!(c.tag, Tag::TableHeaderCell | Tag::TableDataCell))
}

/// Header row, or a header column (every row starts with TH)
fn has_header_cells(rows: &[&StructureNode]) -> bool {
    let header_row = rows
        .first()
        .is_some_and(|row| row_cells(row).any(|c| c.tag == Tag::TableHeaderCell));
    let header_column = rows.iter().all(|row| {
        row_cells(row)
            .next()
            .is_some_and(|c| c.tag == Tag::TableHeaderCell)
    });
    header_row || header_column
}

/// At least `table_min_rows` lines that each hold `table_min_columns` runs
/// on shared column positions
fn looks_like_grid(runs: &[&StructureNode], heuristics: &Heuristics) -> bool {
    let mut boxes: Vec<_> = runs.iter().filter_map(|n| n.bbox).collect();
    boxes.sort_by(|a, b| a.y0.total_cmp(&b.y0).then(a.x0.total_cmp(&b.x0)));

    let mut lines: Vec<Vec<f64>> = Vec::new();
    let mut line_top: Option<f64> = None;
    for bbox in boxes {
        match (line_top, lines.last_mut()) {
            (Some(top), Some(line)) if bbox.y0 - top <= heuristics.table_row_tolerance => {
                line.push(bbox.x0)
            }
            _ => {
                lines.push(vec![bbox.x0]);
                line_top = Some(bbox.y0);
            }
        }
    }

    let grid_rows: Vec<BTreeSet<i64>> = lines
        .iter()
        .map(|xs| {
            xs.iter()
                .map(|x| (x / heuristics.table_column_tolerance).round() as i64)
                .collect::<BTreeSet<_>>()
        })
        .filter(|columns| columns.len() >= heuristics.table_min_columns)
        .collect();
    if grid_rows.len() < heuristics.table_min_rows {
        return false;
    }

    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    for columns in &grid_rows {
        for column in columns {
            *counts.entry(*column).or_default() += 1;
        }
    }
    let aligned = counts
        .values()
        .filter(|count| **count >= heuristics.table_min_rows)
        .count();
    aligned >= heuristics.table_min_columns
}
