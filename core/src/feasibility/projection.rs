//! Flow projection back onto caller edges (success path)

use log::trace;

use crate::algorithm::graph::max_flow::Flow;
use crate::data_structures::network::Network;
use crate::feasibility::normalize::{EdgeOrigin, NormalizedGraph};
use crate::feasibility::report::EdgeFlow;

/// Restore each caller edge's flow from its normalized counterpart
///
/// `flows[j]` is the flow on `graph.edges[j]`. Self-loops, synthetic edges
/// and edges carrying no more than `tolerance` are not reported. The result
/// is sorted by `(from, to)`, with parallel edges ordered by flow.
pub fn project_flows(network: &Network, graph: &NormalizedGraph, flows: &[Flow], tolerance: f64) -> Vec<EdgeFlow> {
    let mut projected: Vec<EdgeFlow> = graph
        .edges
        .iter()
        .zip(flows)
        .filter_map(|(edge, &flow)| match edge.origin {
            EdgeOrigin::Original(index) => Some((index, flow)),
            _ => None,
        })
        .filter_map(|(index, flow)| {
            let spec = network.edges.get(index)?;
            if spec.is_self_loop() {
                trace!("Skipping self-loop on {}", spec.from);
                return None;
            }
            let lower_bound = graph.lower_bounds.get(index).copied().unwrap_or(0.0);
            let restored = flow + lower_bound;
            if restored <= tolerance {
                return None;
            }
            Some(EdgeFlow {
                from: spec.from.clone(),
                to: spec.to.clone(),
                flow: restored,
            })
        })
        .collect();

    projected.sort_by(|a, b| {
        a.from
            .cmp(&b.from)
            .then_with(|| a.to.cmp(&b.to))
            .then_with(|| a.flow.total_cmp(&b.flow))
    });
    projected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feasibility::normalize::normalize;

    #[test]
    fn test_lower_bounds_are_restored() {
        let network = Network::new("t")
            .with_node("a", None)
            .with_edge("a", "t", 3.0, 10.0)
            .with_edge("s", "a", 0.0, 10.0)
            .with_source("s", 8.0);
        let graph = normalize(&network, 1e-9);

        // Canonical order puts a -> t before s -> a
        let mut flows = vec![0.0; graph.edges.len()];
        flows[0] = 5.0;
        flows[1] = 8.0;

        let projected = project_flows(&network, &graph, &flows, 1e-9);
        assert_eq!(
            projected,
            vec![
                EdgeFlow { from: "a".to_string(), to: "t".to_string(), flow: 8.0 },
                EdgeFlow { from: "s".to_string(), to: "a".to_string(), flow: 8.0 },
            ]
        );
    }

    #[test]
    fn test_split_edges_and_self_loops_are_hidden() {
        let network = Network::new("t")
            .with_node("a", Some(10.0))
            .with_edge("a", "a", 1.0, 2.0)
            .with_edge("a", "t", 0.0, 10.0)
            .with_edge("s", "a", 0.0, 10.0)
            .with_source("s", 4.0);
        let graph = normalize(&network, 1e-9);
        let flows = vec![4.0; graph.edges.len()];

        let projected = project_flows(&network, &graph, &flows, 1e-9);
        let pairs: Vec<(&str, &str)> = projected.iter().map(|f| (f.from.as_str(), f.to.as_str())).collect();
        assert_eq!(pairs, vec![("a", "t"), ("s", "a")]);
    }

    #[test]
    fn test_idle_edges_are_omitted() {
        let network = Network::new("t")
            .with_node("a", None)
            .with_node("b", None)
            .with_edge("s1", "a", 0.0, 100.0)
            .with_edge("s1", "b", 0.0, 100.0)
            .with_edge("a", "t", 0.0, 100.0)
            .with_edge("b", "t", 0.0, 100.0)
            .with_source("s1", 50.0);
        let graph = normalize(&network, 1e-9);

        // Canonical order: a -> t, b -> t, s1 -> a, s1 -> b
        let mut flows = vec![0.0; graph.edges.len()];
        flows[0] = 50.0;
        flows[1] = 1e-12;
        flows[2] = 50.0;

        let projected = project_flows(&network, &graph, &flows, 1e-9);
        let pairs: Vec<(&str, &str)> = projected.iter().map(|f| (f.from.as_str(), f.to.as_str())).collect();
        assert_eq!(pairs, vec![("a", "t"), ("s1", "a")]);
    }

    #[test]
    fn test_lower_bound_alone_is_reported() {
        let network = Network::new("t")
            .with_edge("s", "t", 2.0, 2.0)
            .with_source("s", 2.0);
        let graph = normalize(&network, 1e-9);
        let flows = vec![0.0; graph.edges.len()];

        let projected = project_flows(&network, &graph, &flows, 1e-9);
        assert_eq!(projected, vec![EdgeFlow { from: "s".to_string(), to: "t".to_string(), flow: 2.0 }]);
    }
}
