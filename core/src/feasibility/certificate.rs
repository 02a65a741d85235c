//! Infeasibility certificate construction (failure path)
//!
//! After a maximum flow, the vertices reachable from `S` in the residual
//! graph form the source side of a minimum cut. Every normalized edge leaving
//! that side is saturated, and the capacities of those edges sum to the
//! achieved flow. Caller edges and node capacities among them explain why
//! the demand cannot be met.

use std::collections::BTreeSet;

use log::debug;

use crate::algorithm::graph::max_flow::{EdgeIndex, Flow, FlowNetwork};
use crate::feasibility::index::NodeIndex;
use crate::feasibility::normalize::{EdgeOrigin, NodeKey, NormalizedGraph};
use crate::feasibility::report::{Deficit, FeasibilityReport, TightEdge};
use crate::feasibility::FeasibilityError;
use crate::data_structures::network::Network;

/// Proof that the network cannot carry its demand
#[derive(Debug, Clone, PartialEq)]
pub struct Certificate {
    /// Caller labels on the `S` side of the cut
    pub cut_reachable: Vec<String>,
    /// Capacitated nodes saturated across the cut
    pub tight_nodes: Vec<String>,
    /// Caller edges saturated across the cut
    pub tight_edges: Vec<TightEdge>,
    /// Total demand minus achieved flow
    pub deficit: Flow,
    /// Capacity of the normalized cut, equal to the achieved flow
    pub cut_capacity: Flow,
}

impl From<Certificate> for FeasibilityReport {
    fn from(certificate: Certificate) -> Self {
        FeasibilityReport::Infeasible {
            cut_reachable: certificate.cut_reachable,
            deficit: Deficit {
                demand_balance: certificate.deficit,
                tight_nodes: certificate.tight_nodes,
                tight_edges: certificate.tight_edges,
            },
        }
    }
}

/// Inputs of certificate construction, borrowed from a solved pipeline run
pub struct CertificateBuilder<'a> {
    pub network: &'a Network,
    pub graph: &'a NormalizedGraph,
    pub index: &'a NodeIndex,
    pub flow_network: &'a FlowNetwork,
    /// Forward edge in `flow_network` for each `graph.edges` entry
    pub edge_slots: &'a [EdgeIndex],
    pub tolerance: f64,
}

impl<'a> CertificateBuilder<'a> {
    pub fn build(&self, achieved: Flow) -> Result<Certificate, FeasibilityError> {
        let deficit = self.graph.total_demand - achieved;
        if deficit <= self.tolerance {
            return Err(FeasibilityError::NonPositiveDeficit(deficit));
        }

        let source = self
            .index
            .handle(&NodeKey::SuperSource)
            .ok_or_else(|| FeasibilityError::UnindexedNode(NodeKey::SuperSource.to_string()))?;
        let reachable = self.flow_network.residual_reachable(source, self.tolerance)?;
        let on_source_side = |key: &NodeKey| -> bool {
            self.index
                .handle(key)
                .and_then(|id| reachable.get(id.as_usize()).copied())
                .unwrap_or(false)
        };

        let cut_reachable: BTreeSet<String> = self
            .index
            .iter()
            .filter(|(id, _)| reachable.get(id.as_usize()).copied().unwrap_or(false))
            .filter_map(|(_, key)| key.label().map(str::to_owned))
            .collect();

        let mut tight_nodes = BTreeSet::new();
        let mut tight_edges = BTreeSet::new();

        for (edge, &slot) in self.graph.edges.iter().zip(self.edge_slots) {
            let restored_offset = match &edge.origin {
                EdgeOrigin::Supply | EdgeOrigin::Demand => continue,
                EdgeOrigin::NodeCapacity(_) => 0.0,
                EdgeOrigin::Original(index) => self.graph.lower_bounds.get(*index).copied().unwrap_or(0.0),
            };

            let flow = self.flow_network.flow_on(slot);
            let saturated = flow >= edge.capacity - self.tolerance;
            let crosses = on_source_side(&edge.from) && !on_source_side(&edge.to);
            if !(saturated && crosses && flow + restored_offset > self.tolerance) {
                continue;
            }

            match &edge.origin {
                EdgeOrigin::NodeCapacity(label) => {
                    tight_nodes.insert(label.clone());
                }
                EdgeOrigin::Original(index) => {
                    if let Some(spec) = self.network.edges.get(*index) {
                        tight_edges.insert(TightEdge {
                            from: spec.from.clone(),
                            to: spec.to.clone(),
                        });
                    }
                }
                EdgeOrigin::Supply | EdgeOrigin::Demand => {}
            }
        }

        let certificate = Certificate {
            cut_reachable: cut_reachable.into_iter().collect(),
            tight_nodes: tight_nodes.into_iter().collect(),
            tight_edges: tight_edges.into_iter().collect(),
            deficit,
            cut_capacity: self.flow_network.cut_capacity(&reachable),
        };

        debug!(
            "Certificate: {} reachable labels, {} tight nodes, {} tight edges, deficit {}",
            certificate.cut_reachable.len(),
            certificate.tight_nodes.len(),
            certificate.tight_edges.len(),
            certificate.deficit
        );

        Ok(certificate)
    }
}
