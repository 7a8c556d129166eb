use thiserror::Error;

use crate::tree::NodeId;

/// Structural violations of the tree. The offending call is aborted and the
/// tree is left exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("node {0:?} cannot be its own parent")]
    SelfParent(NodeId),
    #[error("adding {child:?} under {parent:?} would create a cycle")]
    Cycle { parent: NodeId, child: NodeId },
    #[error("node {0:?} cannot hold children")]
    NotAContainer(NodeId),
    #[error("node {0:?} is not (or no longer) part of the tree")]
    StaleNode(NodeId),
    #[error("node {0:?} is the root and cannot be attached under another node")]
    IsRoot(NodeId),
    #[error("node {0:?} already has a parent and cannot become the root")]
    HasParent(NodeId),
}

/// Misuse of a scheduler.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchedulerError {
    #[error("scheduler has no clock; the owning node is not loaded yet")]
    NoClock,
    #[error("repeat interval must be positive and finite, got {0}")]
    InvalidInterval(f64),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error(transparent)]
    Tree(#[from] TreeError),
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
