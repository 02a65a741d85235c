//! Caller-facing flow network description
//!
//! A [`Network`] is the batch input of one feasibility evaluation: labeled
//! nodes with optional throughput capacities, lower/upper bounded edges,
//! sources with exact supplies, and a single sink. Labels are opaque; nothing
//! about their spelling carries meaning.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::algorithm::graph::max_flow::{Capacity, Flow};

/// Per-node declaration; absence of `cap` means unbounded throughput
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cap: Option<Capacity>,
}

impl NodeSpec {
    pub fn unbounded() -> Self {
        Self { cap: None }
    }

    pub fn with_capacity(cap: Capacity) -> Self {
        Self { cap: Some(cap) }
    }
}

/// Directed edge whose flow must lie in `[lo, hi]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeSpec {
    pub from: String,
    pub to: String,
    pub lo: Flow,
    pub hi: Flow,
}

impl EdgeSpec {
    pub fn new(from: impl Into<String>, to: impl Into<String>, lo: Flow, hi: Flow) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            lo,
            hi,
        }
    }

    pub fn is_self_loop(&self) -> bool {
        self.from == self.to
    }
}

/// Complete network description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Network {
    pub nodes: BTreeMap<String, NodeSpec>,
    pub edges: Vec<EdgeSpec>,
    /// Exact supply injected at each source
    pub sources: BTreeMap<String, Flow>,
    pub sink: String,
}

impl Network {
    /// Empty network draining into `sink`
    pub fn new(sink: impl Into<String>) -> Self {
        let sink = sink.into();
        let mut nodes = BTreeMap::new();
        nodes.insert(sink.clone(), NodeSpec::unbounded());
        Self {
            nodes,
            edges: Vec::new(),
            sources: BTreeMap::new(),
            sink,
        }
    }

    pub fn with_node(mut self, label: impl Into<String>, cap: Option<Capacity>) -> Self {
        self.nodes.insert(label.into(), NodeSpec { cap });
        self
    }

    pub fn with_edge(mut self, from: impl Into<String>, to: impl Into<String>, lo: Flow, hi: Flow) -> Self {
        self.edges.push(EdgeSpec::new(from, to, lo, hi));
        self
    }

    pub fn with_source(mut self, label: impl Into<String>, supply: Flow) -> Self {
        self.sources.insert(label.into(), supply);
        self
    }

    /// Every label the network mentions: declared nodes, sources, sink and
    /// edge endpoints
    pub fn labels(&self) -> BTreeSet<&str> {
        let mut labels: BTreeSet<&str> = self.nodes.keys().map(String::as_str).collect();
        labels.extend(self.sources.keys().map(String::as_str));
        labels.insert(self.sink.as_str());
        for edge in &self.edges {
            labels.insert(edge.from.as_str());
            labels.insert(edge.to.as_str());
        }
        labels
    }

    pub fn capacity_of(&self, label: &str) -> Option<Capacity> {
        self.nodes.get(label).and_then(|spec| spec.cap)
    }

    pub fn total_supply(&self) -> Flow {
        self.sources.values().sum()
    }

    pub fn is_terminal(&self, label: &str) -> bool {
        label == self.sink || self.sources.contains_key(label)
    }

    /// Reject networks whose semantics would be undefined
    ///
    /// Edge endpoints must be declared as a node, a source, or the sink.
    pub fn validate(&self) -> Result<(), NetworkError> {
        if self.sink.is_empty() {
            return Err(NetworkError::EmptyLabel);
        }
        if self.sources.contains_key(&self.sink) {
            return Err(NetworkError::SinkIsSource(self.sink.clone()));
        }

        for (label, spec) in &self.nodes {
            if label.is_empty() {
                return Err(NetworkError::EmptyLabel);
            }
            if let Some(cap) = spec.cap {
                if !cap.is_finite() || cap < 0.0 {
                    return Err(NetworkError::InvalidCapacity { label: label.clone(), cap });
                }
            }
        }

        for (label, &supply) in &self.sources {
            if label.is_empty() {
                return Err(NetworkError::EmptyLabel);
            }
            if !supply.is_finite() || supply < 0.0 {
                return Err(NetworkError::InvalidSupply { label: label.clone(), supply });
            }
        }

        for edge in &self.edges {
            for endpoint in [&edge.from, &edge.to] {
                if !self.is_declared(endpoint) {
                    return Err(NetworkError::UndeclaredNode {
                        from: edge.from.clone(),
                        to: edge.to.clone(),
                        label: endpoint.clone(),
                    });
                }
            }
            let finite = edge.lo.is_finite() && edge.hi.is_finite();
            if !finite || edge.lo < 0.0 || edge.hi < edge.lo {
                return Err(NetworkError::InvalidBounds {
                    from: edge.from.clone(),
                    to: edge.to.clone(),
                    lo: edge.lo,
                    hi: edge.hi,
                });
            }
        }

        Ok(())
    }

    fn is_declared(&self, label: &str) -> bool {
        self.nodes.contains_key(label) || self.is_terminal(label)
    }
}

/// Semantic validation failures
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NetworkError {
    #[error("Node labels must be non-empty")]
    EmptyLabel,

    #[error("Edge {from} -> {to} references undeclared node '{label}'")]
    UndeclaredNode { from: String, to: String, label: String },

    #[error("Node '{label}' has invalid capacity {cap}")]
    InvalidCapacity { label: String, cap: Capacity },

    #[error("Source '{label}' has invalid supply {supply}")]
    InvalidSupply { label: String, supply: Flow },

    #[error("Edge {from} -> {to} has invalid bounds [{lo}, {hi}]")]
    InvalidBounds { from: String, to: String, lo: Flow, hi: Flow },

    #[error("Sink '{0}' is also declared as a source")]
    SinkIsSource(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> Network {
        Network::new("t")
            .with_node("a", None)
            .with_edge("s1", "a", 0.0, 100.0)
            .with_edge("a", "t", 0.0, 100.0)
            .with_source("s1", 100.0)
    }

    #[test]
    fn test_labels_include_every_mention() {
        let network = chain();
        let labels: Vec<&str> = network.labels().into_iter().collect();
        assert_eq!(labels, vec!["a", "s1", "t"]);
        assert_eq!(network.total_supply(), 100.0);
        assert!(network.is_terminal("s1"));
        assert!(!network.is_terminal("a"));
    }

    #[test]
    fn test_valid_network_passes() {
        assert_eq!(chain().validate(), Ok(()));
    }

    #[test]
    fn test_undeclared_endpoint_rejected() {
        let network = chain().with_edge("a", "ghost", 0.0, 1.0);
        assert_eq!(
            network.validate(),
            Err(NetworkError::UndeclaredNode {
                from: "a".to_string(),
                to: "ghost".to_string(),
                label: "ghost".to_string(),
            })
        );
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let network = chain().with_edge("a", "t", 5.0, 4.0);
        assert!(matches!(network.validate(), Err(NetworkError::InvalidBounds { lo, hi, .. }) if lo == 5.0 && hi == 4.0));

        let network = chain().with_edge("a", "t", -1.0, 4.0);
        assert!(matches!(network.validate(), Err(NetworkError::InvalidBounds { .. })));

        let network = chain().with_edge("a", "t", 0.0, f64::INFINITY);
        assert!(matches!(network.validate(), Err(NetworkError::InvalidBounds { .. })));
    }

    #[test]
    fn test_negative_capacity_and_supply_rejected() {
        let network = chain().with_node("a", Some(-3.0));
        assert!(matches!(network.validate(), Err(NetworkError::InvalidCapacity { .. })));

        let network = chain().with_source("s1", -1.0);
        assert!(matches!(network.validate(), Err(NetworkError::InvalidSupply { .. })));
    }

    #[test]
    fn test_sink_cannot_be_source() {
        let network = chain().with_source("t", 5.0);
        assert_eq!(network.validate(), Err(NetworkError::SinkIsSource("t".to_string())));
    }

    #[test]
    fn test_deserialize_request_shape() {
        let network: Network = serde_json::from_str(
            r#"{
                "nodes": {"a": {"cap": 80}, "t": {}},
                "edges": [{"from": "s1", "to": "a", "lo": 0, "hi": 100}],
                "sources": {"s1": 50},
                "sink": "t"
            }"#,
        )
        .unwrap();

        assert_eq!(network.capacity_of("a"), Some(80.0));
        assert_eq!(network.capacity_of("t"), None);
        assert_eq!(network.edges[0], EdgeSpec::new("s1", "a", 0.0, 100.0));
        assert_eq!(network.sources["s1"], 50.0);
    }

    #[test]
    fn test_missing_field_is_a_parse_error() {
        let parsed: Result<Network, _> = serde_json::from_str(r#"{"nodes": {}, "edges": [], "sources": {}}"#);
        assert!(parsed.is_err());
    }
}
