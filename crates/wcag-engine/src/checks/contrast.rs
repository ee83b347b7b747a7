//! Text contrast, WCAG 1.4.3 (AA) and 1.4.6 (AAA)

use shared_types::{CheckId, Criterion, Document, Issue, Rgb, Severity, StructureNode, Tag};

use crate::checks::visit;
use crate::color::{contrast_ratio, required_ratios};
use crate::config::{EngineSettings, Heuristics};

pub fn check_contrast(document: &Document, settings: &EngineSettings) -> Vec<Issue> {
    let mut issues = Vec::new();

    for v in visit(document) {
        if !v.node.has_text() || v.node.tag == Tag::Artifact {
            continue;
        }

        let fg = v.node.attributes.color.unwrap_or(Rgb::BLACK);
        let bg = v.node.attributes.background_color.unwrap_or(Rgb::WHITE);
        let ratio = contrast_ratio(fg, bg);
        let large = is_large_text(v.node, &settings.heuristics);
        let (aa, aaa) = required_ratios(large);
        let size_class = if large { "large" } else { "normal" };

        if ratio < aa {
            issues.push(
                Issue::new(
                    CheckId::ColorContrast,
                    Criterion::ContrastMinimum,
                    Severity::Error,
                    &format!(
                        "Contrast {:.2}:1 ({} on {}) is below {}:1 for {} text",
                        ratio, fg, bg, aa, size_class
                    ),
                )
                .with_page(v.page)
                .with_location(v.node.bbox)
                .with_node(v.node.id)
                .with_suggestion("Darken the text or lighten the background"),
            );
        }
        if ratio < aaa {
            issues.push(
                Issue::new(
                    CheckId::ColorContrast,
                    Criterion::ContrastEnhanced,
                    Severity::Warning,
                    &format!(
                        "Contrast {:.2}:1 ({} on {}) is below the enhanced {}:1 for {} text",
                        ratio, fg, bg, aaa, size_class
                    ),
                )
                .with_page(v.page)
                .with_location(v.node.bbox)
                .with_node(v.node.id),
            );
        }
    }

    issues
}

/// 18pt and up, or 14pt and up when bold. Unknown size counts as normal text.
pub fn is_large_text(node: &StructureNode, heuristics: &Heuristics) -> bool {
    match node.attributes.font_size {
        Some(size) if size >= heuristics.large_text_size => true,
        Some(size) => node.attributes.bold && size >= heuristics.large_bold_text_size,
        None => false,
    }
}
