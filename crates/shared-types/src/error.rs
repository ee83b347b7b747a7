use thiserror::Error;

use crate::structure::NodeId;

/// Structural-integrity failures in a document handed over by the parser
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StructureError {
    #[error("Node {node} references page {page}, but the document has {page_count} page(s)")]
    DanglingPage {
        node: NodeId,
        page: u32,
        page_count: u32,
    },

    #[error("Node id {0} appears more than once in the structure tree")]
    DuplicateNode(NodeId),

    #[error("Node {node} has invalid heading level H{level}")]
    InvalidHeadingLevel { node: NodeId, level: u8 },
}
