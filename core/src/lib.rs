//! beltflow core
//!
//! Decides whether a flow network with node capacities, lower-bounded edges
//! and fixed-supply sources can route every unit of supply into its sink.
//! Feasible networks yield a per-edge flow assignment; infeasible ones yield
//! a minimum-cut certificate naming the saturated edges and nodes and the
//! unmet demand.
//!
//! ```
//! use beltflow_core::{check_feasibility, Network};
//!
//! let network = Network::new("t")
//!     .with_node("a", Some(80.0))
//!     .with_edge("s1", "a", 0.0, 100.0)
//!     .with_edge("a", "t", 0.0, 100.0)
//!     .with_source("s1", 100.0);
//!
//! let report = check_feasibility(&network).unwrap();
//! assert_eq!(report.status(), "infeasible");
//! assert_eq!(report.deficit().unwrap().tight_nodes, vec!["a".to_string()]);
//! ```
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod algorithm;
pub mod config;
pub mod data_structures;
pub mod feasibility;

pub use crate::algorithm::graph::max_flow::MaxFlowAlgorithm;
pub use crate::config::{ConfigError, SolverConfig};
pub use crate::data_structures::network::{EdgeSpec, Network, NetworkError, NodeSpec};
pub use crate::feasibility::{
    check_feasibility, Deficit, EdgeFlow, FeasibilityChecker, FeasibilityError, FeasibilityReport, TightEdge,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
