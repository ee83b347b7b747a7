//! In-memory structure model of a tagged document
//!
//! The parsing collaborator builds a [`Document`] and hands ownership to the
//! engine. Children are owned, so the tree cannot contain cycles; the
//! remaining integrity rules (page range, unique ids, heading levels) are
//! enforced by [`Document::check_integrity`].

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::StructureError;

/// Stable identifier of a node, unique within one document
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Semantic role of a structure node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Tag {
    Document,
    /// Heading level 1-6
    Heading(u8),
    Paragraph,
    Figure,
    Table,
    TableRow,
    TableHeaderCell,
    TableDataCell,
    Link,
    List,
    ListItem,
    FormField,
    Artifact,
    Untagged,
}

impl Tag {
    pub fn heading_level(&self) -> Option<u8> {
        match self {
            Tag::Heading(level) => Some(*level),
            _ => None,
        }
    }

    pub fn is_heading(&self) -> bool {
        matches!(self, Tag::Heading(_))
    }

    /// Text-carrying roles with no semantics beyond "body text"
    pub fn is_plain_text(&self) -> bool {
        matches!(self, Tag::Paragraph | Tag::Untagged)
    }

    /// PDF structure role name
    pub fn role_name(&self) -> String {
        match self {
            Tag::Document => "Document".to_string(),
            Tag::Heading(level) => format!("H{}", level),
            Tag::Paragraph => "P".to_string(),
            Tag::Figure => "Figure".to_string(),
            Tag::Table => "Table".to_string(),
            Tag::TableRow => "TR".to_string(),
            Tag::TableHeaderCell => "TH".to_string(),
            Tag::TableDataCell => "TD".to_string(),
            Tag::Link => "Link".to_string(),
            Tag::List => "L".to_string(),
            Tag::ListItem => "LI".to_string(),
            Tag::FormField => "Form".to_string(),
            Tag::Artifact => "Artifact".to_string(),
            Tag::Untagged => "Untagged".to_string(),
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.role_name())
    }
}

impl FromStr for Tag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = match s {
            "Document" => Tag::Document,
            "P" => Tag::Paragraph,
            "Figure" => Tag::Figure,
            "Table" => Tag::Table,
            "TR" => Tag::TableRow,
            "TH" => Tag::TableHeaderCell,
            "TD" => Tag::TableDataCell,
            "Link" => Tag::Link,
            "L" => Tag::List,
            "LI" => Tag::ListItem,
            "Form" => Tag::FormField,
            "Artifact" => Tag::Artifact,
            "Untagged" => Tag::Untagged,
            other => {
                let level = other
                    .strip_prefix('H')
                    .and_then(|digits| digits.parse::<u8>().ok())
                    .filter(|level| (1..=6).contains(level))
                    .ok_or_else(|| format!("Unknown structure tag: {}", other))?;
                Tag::Heading(level)
            }
        };
        Ok(tag)
    }
}

impl TryFrom<String> for Tag {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Tag> for String {
    fn from(tag: Tag) -> Self {
        tag.role_name()
    }
}

/// Axis-aligned rectangle in page coordinates (origin top-left, y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl BoundingBox {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { x0, y0, x1, y1 }
    }
}

/// 8-bit sRGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const WHITE: Rgb = Rgb(255, 255, 255);
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    /// Font size in points
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(default)]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Rgb>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<Rgb>,
    /// Accessible name of a form field (tooltip / associated label)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// A node of the logical structure tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureNode {
    pub id: NodeId,
    pub tag: Tag,
    /// 1-based page reference
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub bbox: Option<BoundingBox>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub attributes: NodeAttributes,
    /// Ordered children; order is the current reading order
    #[serde(default)]
    pub children: Vec<StructureNode>,
}

impl StructureNode {
    pub fn new(id: u32, tag: Tag) -> Self {
        Self {
            id: NodeId(id),
            tag,
            page: None,
            bbox: None,
            text: String::new(),
            attributes: NodeAttributes::default(),
            children: Vec::new(),
        }
    }

    pub fn on_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn with_bbox(mut self, x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        self.bbox = Some(BoundingBox::new(x0, y0, x1, y1));
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub fn with_alt_text(mut self, alt: &str) -> Self {
        self.attributes.alt_text = Some(alt.to_string());
        self
    }

    pub fn with_lang(mut self, lang: &str) -> Self {
        self.attributes.lang = Some(lang.to_string());
        self
    }

    pub fn with_font_size(mut self, size: f64) -> Self {
        self.attributes.font_size = Some(size);
        self
    }

    pub fn bold(mut self) -> Self {
        self.attributes.bold = true;
        self
    }

    pub fn with_colors(mut self, color: Rgb, background: Rgb) -> Self {
        self.attributes.color = Some(color);
        self.attributes.background_color = Some(background);
        self
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.attributes.label = Some(label.to_string());
        self
    }

    pub fn with_child(mut self, child: StructureNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = StructureNode>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Document-level permissions relevant to assistive technology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permissions {
    /// Content extraction for accessibility is allowed
    pub accessibility_extraction: bool,
    pub encrypted: bool,
}

impl Default for Permissions {
    fn default() -> Self {
        Self {
            accessibility_extraction: true,
            encrypted: false,
        }
    }
}

/// Root-level document metadata plus the structure tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    /// File name the document was opened from, as reported by the parser
    #[serde(default)]
    pub file_name: Option<String>,
    pub is_tagged: bool,
    pub page_count: u32,
    #[serde(default)]
    pub permissions: Permissions,
    pub root: StructureNode,
    #[serde(skip)]
    revision: u64,
    #[serde(skip)]
    dirty: bool,
}

impl Document {
    pub fn new(root: StructureNode, page_count: u32) -> Self {
        Self {
            title: None,
            language: None,
            file_name: None,
            is_tagged: false,
            page_count,
            permissions: Permissions::default(),
            root,
            revision: 0,
            dirty: false,
        }
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn with_language(mut self, language: &str) -> Self {
        self.language = Some(language.to_string());
        self
    }

    pub fn with_file_name(mut self, file_name: &str) -> Self {
        self.file_name = Some(file_name.to_string());
        self
    }

    pub fn tagged(mut self, is_tagged: bool) -> Self {
        self.is_tagged = is_tagged;
        self
    }

    pub fn with_permissions(mut self, permissions: Permissions) -> Self {
        self.permissions = permissions;
        self
    }

    /// Number of mutations applied since the document was handed over
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// True when the document changed since it was last marked clean
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Record a mutation. Any result computed at an earlier revision is stale.
    pub fn mark_mutated(&mut self) {
        self.revision += 1;
        self.dirty = true;
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// File-name stem ("report" for "report.pdf")
    pub fn file_stem(&self) -> Option<&str> {
        self.file_name.as_deref().map(file_stem)
    }

    /// Reject trees the engine cannot score honestly
    pub fn check_integrity(&self) -> Result<(), StructureError> {
        let mut seen = HashSet::new();
        for node in self.walk() {
            if !seen.insert(node.id) {
                return Err(StructureError::DuplicateNode(node.id));
            }
            if let Some(page) = node.page {
                if page == 0 || page > self.page_count {
                    return Err(StructureError::DanglingPage {
                        node: node.id,
                        page,
                        page_count: self.page_count,
                    });
                }
            }
            if let Tag::Heading(level) = node.tag {
                if !(1..=6).contains(&level) {
                    return Err(StructureError::InvalidHeadingLevel {
                        node: node.id,
                        level,
                    });
                }
            }
        }
        Ok(())
    }
}

/// Strip directory components and the final extension from a file name
pub fn file_stem(file_name: &str) -> &str {
    let name = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(file_name);
    match name.rfind('.') {
        Some(0) | None => name,
        Some(dot) => &name[..dot],
    }
}
