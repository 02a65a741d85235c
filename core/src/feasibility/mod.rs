//! Flow feasibility pipeline
//!
//! Validation, normalization, indexing, maximum flow, then a single branch:
//! project the flow back onto caller edges when the demand is met, or build
//! an infeasibility certificate when it is not.

pub mod certificate;
pub mod index;
pub mod normalize;
pub mod projection;
pub mod report;

use log::{debug, info};

use crate::algorithm::graph::max_flow::{EdgeIndex, Flow, FlowError, FlowNetwork, MaxFlowSolver};
use crate::algorithm::traits::{MaxFlowEngine, NodeId};
use crate::config::{ConfigError, SolverConfig};
use crate::data_structures::network::{Network, NetworkError};

pub use self::certificate::{Certificate, CertificateBuilder};
pub use self::index::NodeIndex;
pub use self::normalize::{normalize, EdgeOrigin, NodeKey, NormalizedEdge, NormalizedGraph, Role};
pub use self::projection::project_flows;
pub use self::report::{Deficit, EdgeFlow, FeasibilityReport, TightEdge};

/// Pipeline failures; none of these describe an infeasible network
#[derive(Debug, thiserror::Error)]
pub enum FeasibilityError {
    #[error("Invalid network: {0}")]
    Network(#[from] NetworkError),

    #[error("Invalid solver configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Max-flow engine failure: {0}")]
    Flow(#[from] FlowError),

    #[error("Normalized vertex {0} has no handle")]
    UnindexedNode(String),

    #[error("Achieved flow {achieved} exceeds total demand {demand}")]
    FlowExceedsDemand { achieved: Flow, demand: Flow },

    #[error("Infeasible path reached with non-positive deficit {0}")]
    NonPositiveDeficit(Flow),
}

/// Outcome of comparing achieved flow against total demand
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decision {
    Feasible,
    Infeasible { deficit: Flow },
}

/// Tolerance-based comparison of achieved flow against total demand
pub fn decide(achieved: Flow, demand: Flow, tolerance: f64) -> Result<Decision, FeasibilityError> {
    let deficit = demand - achieved;
    if deficit < -tolerance {
        Err(FeasibilityError::FlowExceedsDemand { achieved, demand })
    } else if deficit <= tolerance {
        Ok(Decision::Feasible)
    } else {
        Ok(Decision::Infeasible { deficit })
    }
}

/// Normalized graph loaded into a [`FlowNetwork`]
#[derive(Debug, Clone)]
pub struct IndexedGraph {
    pub index: NodeIndex,
    pub flow_network: FlowNetwork,
    /// Forward edge in `flow_network` for each normalized edge
    pub edge_slots: Vec<EdgeIndex>,
    pub source: NodeId,
    pub sink: NodeId,
}

impl IndexedGraph {
    pub fn build(graph: &NormalizedGraph) -> Result<Self, FeasibilityError> {
        let index = NodeIndex::assign(&graph.keys);
        let lookup = |key: &NodeKey| -> Result<NodeId, FeasibilityError> {
            index
                .handle(key)
                .ok_or_else(|| FeasibilityError::UnindexedNode(key.to_string()))
        };

        let mut flow_network = FlowNetwork::new(index.len());
        let mut edge_slots = Vec::with_capacity(graph.edges.len());
        for edge in &graph.edges {
            let slot = flow_network.add_edge(lookup(&edge.from)?, lookup(&edge.to)?, edge.capacity)?;
            edge_slots.push(slot);
        }

        let source = lookup(&NodeKey::SuperSource)?;
        let sink = lookup(&NodeKey::SuperSink)?;

        Ok(Self {
            index,
            flow_network,
            edge_slots,
            source,
            sink,
        })
    }

    /// Flow on each normalized edge, in `NormalizedGraph::edges` order
    pub fn edge_flows(&self) -> Vec<Flow> {
        self.edge_slots
            .iter()
            .map(|&slot| self.flow_network.flow_on(slot))
            .collect()
    }
}

/// Entry point of one batch feasibility evaluation
#[derive(Debug, Clone, Default)]
pub struct FeasibilityChecker {
    config: SolverConfig,
}

impl FeasibilityChecker {
    pub fn new(config: SolverConfig) -> Result<Self, FeasibilityError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Evaluate `network` with the configured max-flow algorithm
    pub fn check(&self, network: &Network) -> Result<FeasibilityReport, FeasibilityError> {
        let mut engine = MaxFlowSolver::new(self.config.algorithm, self.config.tolerance);
        self.check_with(network, &mut engine)
    }

    /// Evaluate `network` with a caller-supplied engine
    pub fn check_with<E>(&self, network: &Network, engine: &mut E) -> Result<FeasibilityReport, FeasibilityError>
    where
        E: MaxFlowEngine + ?Sized,
    {
        let tolerance = self.config.tolerance;

        network.validate()?;
        debug!(
            "Evaluating network: {} nodes, {} edges, {} sources, sink '{}'",
            network.nodes.len(),
            network.edges.len(),
            network.sources.len(),
            network.sink
        );

        let graph = normalize(network, tolerance);
        let mut indexed = IndexedGraph::build(&graph)?;

        let achieved = engine.solve(&mut indexed.flow_network, indexed.source, indexed.sink)?;
        debug!("{} achieved {} of demand {}", engine.name(), achieved, graph.total_demand);

        match decide(achieved, graph.total_demand, tolerance)? {
            Decision::Feasible => {
                let flows = project_flows(network, &graph, &indexed.edge_flows(), tolerance);
                info!("Network feasible: {} units through {} edges", graph.total_supply, flows.len());
                Ok(FeasibilityReport::Ok {
                    max_flow_per_min: graph.total_supply,
                    flows,
                })
            }
            Decision::Infeasible { deficit } => {
                info!("Network infeasible: deficit {}", deficit);
                let certificate = CertificateBuilder {
                    network,
                    graph: &graph,
                    index: &indexed.index,
                    flow_network: &indexed.flow_network,
                    edge_slots: &indexed.edge_slots,
                    tolerance,
                }
                .build(achieved)?;
                Ok(certificate.into())
            }
        }
    }
}

/// Evaluate `network` with the default configuration
pub fn check_feasibility(network: &Network) -> Result<FeasibilityReport, FeasibilityError> {
    FeasibilityChecker::default().check(network)
}
