//! Heading structure: WCAG 1.3.1, 2.4.6 and 2.4.1
//!
//! Documents without heading tags are inspected for text runs set in a
//! noticeably larger font; those are the candidates the auto-fixer promotes.

use shared_types::{CheckId, Criterion, Document, FixKind, Issue, NodeId, Severity, StructureNode};

use crate::checks::visit;
use crate::config::{EngineSettings, Heuristics};

pub fn check_headings(document: &Document, settings: &EngineSettings) -> Vec<Issue> {
    let mut issues = Vec::new();
    let headings = document.headings();

    if headings.is_empty() {
        if !document.has_text() {
            return issues;
        }

        let candidates = heading_candidates(document, &settings.heuristics);
        if candidates.is_empty() {
            issues.push(
                Issue::new(
                    CheckId::Headings,
                    Criterion::HeadingsAndLabels,
                    Severity::Warning,
                    "Document has no headings",
                )
                .with_suggestion("Add headings that describe each section"),
            );
        } else {
            issues.push(
                Issue::new(
                    CheckId::Headings,
                    Criterion::InfoAndRelationships,
                    Severity::Warning,
                    &format!(
                        "Document has no heading tags but {} text run(s) are styled as headings",
                        candidates.len()
                    ),
                )
                .with_suggestion("Tag the large-font text as headings")
                .fixable_by(FixKind::TagHeadings),
            );
        }

        if document.page_count > 1 {
            issues.push(
                Issue::new(
                    CheckId::Headings,
                    Criterion::BypassBlocks,
                    Severity::Warning,
                    "Multi-page document has no headings to navigate by",
                )
                .with_suggestion("Add headings so readers can skip between sections"),
            );
        }
        return issues;
    }

    let mut previous: Option<u8> = None;
    for heading in &headings {
        let Some(level) = heading.tag.heading_level() else {
            continue;
        };
        let page = document.effective_page(heading.id);

        let skipped = match previous {
            None if level > 1 => Some(format!(
                "First heading is H{}, expected H1",
                level
            )),
            Some(prev) if level > prev + 1 => Some(format!(
                "Heading level skipped: H{} to H{}",
                prev, level
            )),
            _ => None,
        };
        if let Some(message) = skipped {
            issues.push(
                Issue::new(
                    CheckId::Headings,
                    Criterion::InfoAndRelationships,
                    Severity::Error,
                    &message,
                )
                .with_page(page)
                .with_location(heading.bbox)
                .with_node(heading.id)
                .with_suggestion("Use heading levels in sequence without skipping")
                .fixable_by(FixKind::RelevelHeading),
            );
        }

        if heading.text_content().is_empty() {
            issues.push(
                Issue::new(
                    CheckId::Headings,
                    Criterion::HeadingsAndLabels,
                    Severity::Warning,
                    &format!("H{} heading is empty", level),
                )
                .with_page(page)
                .with_location(heading.bbox)
                .with_node(heading.id)
                .with_suggestion("Give the heading text that describes its section"),
            );
        }

        previous = Some(level);
    }

    issues
}

/// Body-text runs whose font is larger than `heading_size_ratio` times the
/// average, in document order
pub fn heading_candidates<'a>(
    document: &'a Document,
    heuristics: &Heuristics,
) -> Vec<&'a StructureNode> {
    let sized: Vec<(&StructureNode, f64)> = visit(document)
        .into_iter()
        .filter(|v| v.node.has_text())
        .filter_map(|v| v.node.attributes.font_size.map(|size| (v.node, size)))
        .collect();
    if sized.is_empty() {
        return Vec::new();
    }

    let average = sized.iter().map(|(_, size)| size).sum::<f64>() / sized.len() as f64;
    let cutoff = average * heuristics.heading_size_ratio;

    sized
        .into_iter()
        .filter(|(node, size)| node.tag.is_plain_text() && *size > cutoff)
        .map(|(node, _)| node)
        .collect()
}

/// Heading level for each candidate: distinct sizes, largest first, map to
/// H1..H6 and everything smaller than the sixth size is H6
pub fn rank_heading_levels(candidates: &[&StructureNode]) -> Vec<(NodeId, u8)> {
    let mut sizes: Vec<f64> = candidates
        .iter()
        .filter_map(|node| node.attributes.font_size)
        .collect();
    sizes.sort_by(|a, b| b.total_cmp(a));
    sizes.dedup();

    candidates
        .iter()
        .filter_map(|node| {
            let size = node.attributes.font_size?;
            let rank = sizes.iter().position(|s| *s == size)?;
            Some((node.id, (rank + 1).min(6) as u8))
        })
        .collect()
}
