//! Core algorithm trait definitions
//!
//! This module establishes the handle type shared by every graph algorithm
//! in the crate and the trait seam through which the feasibility pipeline
//! drives a maximum-flow engine.
//!
//! # Key Design Principles
//! - Graph algorithms operate on dense integer handles, never on labels
//! - Engines are interchangeable behind [`MaxFlowEngine`]
//! - Deterministic behavior for given inputs

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::algorithm::graph::max_flow::{Flow, FlowError, FlowMetrics, FlowNetwork};

/// Node identifier ensuring type safety and preventing mixing with other numeric types
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

impl NodeId {
    #[inline]
    pub fn as_usize(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Maximum flow engine contract
///
/// # Guarantees
/// - Per-edge flows are nonnegative and never exceed capacity
/// - Conservation holds at every vertex except `source` and `sink`
/// - The returned value is the net flow delivered into `sink`
pub trait MaxFlowEngine {
    /// Returns the engine's descriptive name
    fn name(&self) -> &'static str;

    /// Computes a maximum flow in place on `network`
    fn solve(&mut self, network: &mut FlowNetwork, source: NodeId, sink: NodeId)
        -> Result<Flow, FlowError>;

    /// Operation counters of the most recent solve
    fn metrics(&self) -> &FlowMetrics;
}
