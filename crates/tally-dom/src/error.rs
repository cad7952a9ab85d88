use thiserror::Error;

use crate::node::NodeId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomError {
    #[error("node {0:?} does not exist (removed or never created)")]
    StaleNode(NodeId),

    #[error("node {node:?} is not {expected}")]
    WrongKind {
        node: NodeId,
        expected: &'static str,
    },

    #[error("cannot insert {child:?} into {parent:?}: it would become its own ancestor")]
    HierarchyRequest { parent: NodeId, child: NodeId },

    #[error("{reference:?} is not a child of {parent:?}")]
    NotAChild { parent: NodeId, reference: NodeId },

    #[error("{0:?} already has a shadow root")]
    ShadowRootExists(NodeId),
}
