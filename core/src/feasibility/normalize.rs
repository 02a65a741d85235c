//! Model normalization
//!
//! Rewrites a [`Network`] with node capacities, edge lower bounds and
//! several fixed-supply sources into a lower-bound-free capacitated graph
//! with one synthetic super-source and one super-sink.
//!
//! # Reduction
//! - A capacitated node `x` becomes `x[in] -> x[out]` with capacity `cap(x)`.
//! - An edge `(u, v, lo, hi)` becomes `out(u) -> in(v)` with capacity
//!   `hi - lo`; the pre-routed `lo` units leave a deficit of `lo` at `out(u)`
//!   and a surplus of `lo` at `in(v)`.
//! - Supplies add surplus at `in(source)`; the sink's `out` role carries the
//!   matching deficit.
//! - Surplus nodes hang off `S`, deficit nodes drain into `T`.
//!
//! The original network is feasible iff a maximum `S`-`T` flow saturates
//! every `S` edge.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use log::{debug, trace};

use crate::algorithm::graph::max_flow::{Capacity, Flow};
use crate::data_structures::network::Network;

/// Role a node key plays after splitting
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Role {
    /// Unsplit node; its in and out roles coincide
    Plain,
    In,
    Out,
}

/// Identity of a vertex in the normalized graph
///
/// Ordering is by label, then role, with the synthetic terminals last.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NodeKey {
    Node { label: String, role: Role },
    SuperSource,
    SuperSink,
}

impl NodeKey {
    pub fn new(label: impl Into<String>, role: Role) -> Self {
        NodeKey::Node { label: label.into(), role }
    }

    pub fn plain(label: impl Into<String>) -> Self {
        Self::new(label, Role::Plain)
    }

    /// Caller label this key stands for; `None` for `S` and `T`
    pub fn label(&self) -> Option<&str> {
        match self {
            NodeKey::Node { label, .. } => Some(label),
            NodeKey::SuperSource | NodeKey::SuperSink => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, NodeKey::SuperSource | NodeKey::SuperSink)
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKey::Node { label, role: Role::Plain } => write!(f, "{}", label),
            NodeKey::Node { label, role: Role::In } => write!(f, "{}[in]", label),
            NodeKey::Node { label, role: Role::Out } => write!(f, "{}[out]", label),
            NodeKey::SuperSource => write!(f, "<S>"),
            NodeKey::SuperSink => write!(f, "<T>"),
        }
    }
}

/// What a normalized edge stands for in the caller's network
#[derive(Debug, Clone, PartialEq)]
pub enum EdgeOrigin {
    /// Internal `in -> out` edge of a capacitated node
    NodeCapacity(String),
    /// Caller edge at this position of `Network::edges`
    Original(usize),
    /// `S -> node` edge absorbing a positive balance
    Supply,
    /// `node -> T` edge absorbing a negative balance
    Demand,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedEdge {
    pub from: NodeKey,
    pub to: NodeKey,
    pub capacity: Capacity,
    pub origin: EdgeOrigin,
}

/// Lower-bound-free graph plus the metadata needed to invert results
#[derive(Debug, Clone)]
pub struct NormalizedGraph {
    /// Node-split edges, then caller edges in canonical order, then
    /// `S`/`T` edges in key order
    pub edges: Vec<NormalizedEdge>,
    /// Net surplus (positive) or deficit (negative) per key
    pub balances: BTreeMap<NodeKey, Flow>,
    /// Labels split into `In`/`Out` roles
    pub split_labels: BTreeSet<String>,
    /// `lo` of each caller edge, indexed like `Network::edges`
    pub lower_bounds: Vec<Flow>,
    /// Every vertex of the graph, `S` and `T` included
    pub keys: BTreeSet<NodeKey>,
    /// Sum of `S`-outgoing capacities
    pub total_demand: Flow,
    /// Sum of source supplies
    pub total_supply: Flow,
}

impl NormalizedGraph {
    /// Key through which flow enters `label`
    pub fn in_role(&self, label: &str) -> NodeKey {
        role_key(&self.split_labels, label, Role::In)
    }

    /// Key through which flow leaves `label`
    pub fn out_role(&self, label: &str) -> NodeKey {
        role_key(&self.split_labels, label, Role::Out)
    }

    pub fn balance(&self, key: &NodeKey) -> Flow {
        self.balances.get(key).copied().unwrap_or(0.0)
    }
}

/// Resolves a role only when the split actually created it
fn role_key(split_labels: &BTreeSet<String>, label: &str, role: Role) -> NodeKey {
    if split_labels.contains(label) {
        NodeKey::new(label, role)
    } else {
        NodeKey::plain(label)
    }
}

/// Caller edge indices sorted by `(from, to, lo, hi)`
fn canonical_edge_order(network: &Network) -> Vec<usize> {
    let mut order: Vec<usize> = (0..network.edges.len()).collect();
    order.sort_by(|&a, &b| {
        let (ea, eb) = (&network.edges[a], &network.edges[b]);
        ea.from
            .cmp(&eb.from)
            .then_with(|| ea.to.cmp(&eb.to))
            .then_with(|| ea.lo.total_cmp(&eb.lo))
            .then_with(|| ea.hi.total_cmp(&eb.hi))
    });
    order
}

fn add_balance(balances: &mut BTreeMap<NodeKey, Flow>, key: NodeKey, delta: Flow) {
    *balances.entry(key).or_insert(0.0) += delta;
}

/// Build the normalized graph; balances within `tolerance` of zero produce
/// no terminal edge
pub fn normalize(network: &Network, tolerance: f64) -> NormalizedGraph {
    let split_labels: BTreeSet<String> = network
        .nodes
        .iter()
        .filter(|(_, spec)| spec.cap.is_some())
        .map(|(label, _)| label.clone())
        .collect();

    let mut edges = Vec::with_capacity(split_labels.len() + network.edges.len());
    let mut balances = BTreeMap::new();

    for label in &split_labels {
        let capacity = network.capacity_of(label).unwrap_or(0.0);
        edges.push(NormalizedEdge {
            from: NodeKey::new(label.as_str(), Role::In),
            to: NodeKey::new(label.as_str(), Role::Out),
            capacity,
            origin: EdgeOrigin::NodeCapacity(label.clone()),
        });
    }

    for index in canonical_edge_order(network) {
        let edge = &network.edges[index];
        let from = role_key(&split_labels, &edge.from, Role::Out);
        let to = role_key(&split_labels, &edge.to, Role::In);

        add_balance(&mut balances, from.clone(), -edge.lo);
        add_balance(&mut balances, to.clone(), edge.lo);

        edges.push(NormalizedEdge {
            from,
            to,
            capacity: edge.hi - edge.lo,
            origin: EdgeOrigin::Original(index),
        });
    }

    let total_supply = network.total_supply();
    for (label, &supply) in &network.sources {
        add_balance(&mut balances, role_key(&split_labels, label, Role::In), supply);
    }
    add_balance(&mut balances, role_key(&split_labels, &network.sink, Role::Out), -total_supply);

    let mut total_demand = 0.0;
    for (key, &balance) in &balances {
        if balance > tolerance {
            total_demand += balance;
            edges.push(NormalizedEdge {
                from: NodeKey::SuperSource,
                to: key.clone(),
                capacity: balance,
                origin: EdgeOrigin::Supply,
            });
        } else if balance < -tolerance {
            edges.push(NormalizedEdge {
                from: key.clone(),
                to: NodeKey::SuperSink,
                capacity: -balance,
                origin: EdgeOrigin::Demand,
            });
        } else {
            trace!("Balance of {} within tolerance, no terminal edge", key);
        }
    }

    let mut keys = BTreeSet::new();
    keys.insert(NodeKey::SuperSource);
    keys.insert(NodeKey::SuperSink);
    for label in network.labels() {
        keys.insert(role_key(&split_labels, label, Role::In));
        keys.insert(role_key(&split_labels, label, Role::Out));
    }

    let lower_bounds = network.edges.iter().map(|edge| edge.lo).collect();

    debug!(
        "Normalized network: {} vertices, {} edges, {} split nodes, total demand {}",
        keys.len(),
        edges.len(),
        split_labels.len(),
        total_demand
    );

    NormalizedGraph {
        edges,
        balances,
        split_labels,
        lower_bounds,
        keys,
        total_demand,
        total_supply,
    }
}
