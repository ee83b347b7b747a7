//! Document fixtures shared by the integration tests

#![allow(dead_code)]

use shared_types::{Document, Rgb, StructureNode, Tag};

/// Untagged one-page scan: title is the file name, no language, one figure
/// without alt text, no text at all
pub fn untitled_scan() -> Document {
    let root = StructureNode::new(0, Tag::Untagged)
        .with_child(StructureNode::new(1, Tag::Figure).on_page(1));
    Document::new(root, 1)
        .with_title("report")
        .with_file_name("report.pdf")
}

/// Tagged document with the given heading levels, one per page-1 section
pub fn with_headings(levels: &[u8]) -> Document {
    let mut root = StructureNode::new(0, Tag::Document);
    let mut id = 1;
    for level in levels {
        root.children.push(
            StructureNode::new(id, Tag::Heading(*level))
                .on_page(1)
                .with_text(&format!("Section {}", id)),
        );
        root.children.push(
            StructureNode::new(id + 1, Tag::Paragraph)
                .on_page(1)
                .with_text("Body text for the section."),
        );
        id += 2;
    }
    Document::new(root, 1)
        .with_title("Structured Notes")
        .with_language("en")
        .tagged(true)
}

/// Tagged document with one text run in the given colours
pub fn coloured_text(fg: Rgb, bg: Rgb, size: f64) -> Document {
    let root = StructureNode::new(0, Tag::Document).with_children([
        StructureNode::new(1, Tag::Heading(1)).on_page(1).with_text("Colours"),
        StructureNode::new(2, Tag::Paragraph)
            .on_page(1)
            .with_text("Sample text")
            .with_font_size(size)
            .with_colors(fg, bg),
    ]);
    Document::new(root, 1)
        .with_title("Colour Sample")
        .with_language("en")
        .tagged(true)
}

/// Tagged document with one figure and nothing else wrong
pub fn figure_document(alt: Option<&str>) -> Document {
    let mut figure = StructureNode::new(2, Tag::Figure)
        .on_page(1)
        .with_bbox(72.0, 200.0, 400.0, 420.0);
    if let Some(alt) = alt {
        figure = figure.with_alt_text(alt);
    }
    let root = StructureNode::new(0, Tag::Document).with_children([
        StructureNode::new(1, Tag::Heading(1)).on_page(1).with_text("Revenue"),
        figure,
    ]);
    Document::new(root, 1)
        .with_title("Quarterly Revenue")
        .with_language("en")
        .tagged(true)
}
