//! Graph algorithms over dense vertex handles
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod max_flow;

pub use self::max_flow::{
    Capacity, EdgeIndex, Flow, FlowEdge, FlowError, FlowMetrics, FlowNetwork, MaxFlowAlgorithm, MaxFlowSolver,
};
