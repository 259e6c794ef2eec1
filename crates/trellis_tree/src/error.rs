use alloc::string::String;

use thiserror::Error;

/// Errors raised while navigating or building a tree.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TreeError {
    #[error("node `{parent}` has no more children")]
    NoMoreChildren { parent: String },

    #[error("cannot move up from the root node")]
    AtRoot,

    #[error("no node is open for writing")]
    NoOpenNode,

    #[error("attribute `{attribute}` written after a child of node `{node}`")]
    AttributeAfterChild { node: String, attribute: String },

    #[error("a tree may only have one root node")]
    MultipleRoots,

    #[error("node `{node}` was never closed")]
    Unclosed { node: String },

    #[error("no node was written")]
    Empty,
}
