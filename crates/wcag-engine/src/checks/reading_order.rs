//! Reading order, WCAG 1.3.2 Meaningful Sequence
//!
//! Compares the tagged order of text runs on a page against the order a
//! sighted reader would follow: top to bottom within a column, columns left
//! to right. Column detection clusters left edges separated by more than
//! `column_gap`; lines are runs whose tops lie within `line_tolerance`.

use std::collections::BTreeMap;

use shared_types::{BoundingBox, CheckId, Criterion, Document, Issue, Severity, StructureNode};

use crate::checks::{positioned_text, Visit};
use crate::config::{EngineSettings, Heuristics};

pub fn check_reading_order(document: &Document, settings: &EngineSettings) -> Vec<Issue> {
    let mut issues = Vec::new();
    let heuristics = &settings.heuristics;

    if !document.is_tagged && document.page_count > 1 {
        issues.push(
            Issue::new(
                CheckId::ReadingOrder,
                Criterion::MeaningfulSequence,
                Severity::Warning,
                "Reading order cannot be verified in an untagged multi-page document",
            )
            .with_suggestion("Tag the document so the reading order is explicit"),
        );
    }

    let mut pages: BTreeMap<u32, Vec<Visit<'_>>> = BTreeMap::new();
    for v in positioned_text(document) {
        if let Some(page) = v.page {
            pages.entry(page).or_default().push(v);
        }
    }

    for (page, runs) in &pages {
        if runs.len() < heuristics.min_reading_order_elements {
            continue;
        }
        let boxes: Vec<BoundingBox> = runs.iter().filter_map(|v| v.node.bbox).collect();
        let analysis = analyse_page(&boxes, heuristics);
        if analysis.match_ratio < analysis.threshold {
            issues.push(
                Issue::new(
                    CheckId::ReadingOrder,
                    Criterion::MeaningfulSequence,
                    Severity::Warning,
                    &format!(
                        "Reading order on page {} does not follow the visual layout \
                         ({} of {} text runs in place)",
                        page,
                        analysis.matched,
                        boxes.len()
                    ),
                )
                .with_page(Some(*page))
                .with_suggestion("Reorder the tags to follow the visual reading order"),
            );
        }
    }

    check_page_sequence(&document.root, &mut issues);
    issues
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageAnalysis {
    pub columns: usize,
    pub matched: usize,
    pub match_ratio: f64,
    pub threshold: f64,
}

/// Compare the given (tagged) order of boxes with the expected visual order
pub fn analyse_page(boxes: &[BoundingBox], heuristics: &Heuristics) -> PageAnalysis {
    let column_of = assign_columns(boxes, heuristics.column_gap);
    let columns = column_of.iter().copied().max().map_or(0, |c| c + 1);
    let multi_column = columns > 1;
    let line_of = assign_lines(boxes, heuristics.line_tolerance);

    let mut expected: Vec<usize> = (0..boxes.len()).collect();
    expected.sort_by(|&a, &b| {
        let column_key = if multi_column {
            column_of[a].cmp(&column_of[b])
        } else {
            std::cmp::Ordering::Equal
        };
        column_key
            .then(line_of[a].cmp(&line_of[b]))
            .then(boxes[a].x0.total_cmp(&boxes[b].x0))
    });

    let matched = expected
        .iter()
        .enumerate()
        .filter(|(position, index)| position == *index)
        .count();
    let match_ratio = if boxes.is_empty() {
        1.0
    } else {
        matched as f64 / boxes.len() as f64
    };
    let threshold = if multi_column {
        heuristics.multi_column_match_ratio
    } else {
        heuristics.single_column_match_ratio
    };

    PageAnalysis {
        columns: columns.max(1),
        matched,
        match_ratio,
        threshold,
    }
}

/// Cluster left edges; a gap wider than `column_gap` starts a new column.
/// Clusters holding a single run are folded into their left neighbour so an
/// indented line does not count as a column.
fn assign_columns(boxes: &[BoundingBox], column_gap: f64) -> Vec<usize> {
    let mut edges: Vec<f64> = boxes.iter().map(|b| b.x0).collect();
    edges.sort_by(f64::total_cmp);

    let mut starts: Vec<(f64, usize)> = Vec::new();
    let mut previous: Option<f64> = None;
    for x in edges {
        match (previous, starts.last_mut()) {
            (Some(p), Some(last)) if x - p <= column_gap => last.1 += 1,
            _ => starts.push((x, 1)),
        }
        previous = Some(x);
    }

    let mut merged: Vec<f64> = Vec::new();
    for (i, (start, members)) in starts.iter().enumerate() {
        if *members < 2 && i > 0 {
            continue;
        }
        merged.push(*start);
    }

    boxes
        .iter()
        .map(|b| merged.iter().rposition(|start| b.x0 >= *start).unwrap_or(0))
        .collect()
}

/// Group boxes into lines by the top edge
fn assign_lines(boxes: &[BoundingBox], tolerance: f64) -> Vec<usize> {
    let mut order: Vec<usize> = (0..boxes.len()).collect();
    order.sort_by(|&a, &b| boxes[a].y0.total_cmp(&boxes[b].y0));

    let mut line_of = vec![0; boxes.len()];
    let mut line = 0;
    let mut line_top: Option<f64> = None;
    for index in order {
        let y = boxes[index].y0;
        match line_top {
            Some(top) if y - top <= tolerance => {}
            Some(_) => {
                line += 1;
                line_top = Some(y);
            }
            None => line_top = Some(y),
        }
        line_of[index] = line;
    }
    line_of
}

/// Sibling content must not jump back to an earlier page
fn check_page_sequence(node: &StructureNode, issues: &mut Vec<Issue>) {
    let mut last_page: Option<u32> = None;
    for child in &node.children {
        if let Some(page) = child.page {
            if let Some(previous) = last_page {
                if page < previous {
                    issues.push(
                        Issue::new(
                            CheckId::ReadingOrder,
                            Criterion::MeaningfulSequence,
                            Severity::Warning,
                            &format!(
                                "Content on page {} follows content on page {} in reading order",
                                page, previous
                            ),
                        )
                        .with_page(Some(page))
                        .with_location(child.bbox)
                        .with_node(child.id),
                    );
                }
            }
            last_page = Some(last_page.map_or(page, |p| p.max(page)));
        }
        check_page_sequence(child, issues);
    }
}
