//! Maximum Flow Algorithm Implementation
//!
//! This module implements the maximum flow engines used by the feasibility
//! pipeline: Dinic's blocking-flow method and Goldberg-Tarjan FIFO
//! push-relabel. Both operate on a [`FlowNetwork`] whose edges are stored in
//! forward/reverse pairs, so the residual graph is implicit in the flow
//! values and never materialized separately.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::collections::VecDeque;

use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};

use crate::algorithm::traits::{MaxFlowEngine, NodeId};

/// Flow capacity type with algebraic properties
pub type Capacity = f64;

/// Flow value type supporting arithmetic operations
pub type Flow = f64;

/// Distance label type for push-relabel algorithm
pub type DistanceLabel = usize;

/// Position of an edge inside [`FlowNetwork`]'s edge arena
pub type EdgeIndex = usize;

/// Maximum flow algorithm variants
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaxFlowAlgorithm {
    /// Dinic with BFS level graphs and DFS blocking flows
    #[default]
    Dinic,
    /// Goldberg-Tarjan push-relabel with FIFO vertex selection
    PushRelabelFifo,
}

/// Flow edge representation with residual capacity tracking
///
/// Flow is skew-symmetric: the reverse twin of a forward edge carrying `f`
/// carries `-f` against a capacity of zero, which makes its residual
/// capacity exactly `f`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowEdge {
    /// Source vertex
    pub from: NodeId,
    /// Target vertex
    pub to: NodeId,
    /// Original edge capacity
    pub capacity: Capacity,
    /// Current flow through edge
    pub flow: Flow,
    /// Index of the paired edge in the residual graph
    pub reverse_edge_index: EdgeIndex,
}

impl FlowEdge {
    /// Create new flow edge with specified capacity
    pub fn new(from: NodeId, to: NodeId, capacity: Capacity, reverse_edge_index: EdgeIndex) -> Self {
        Self {
            from,
            to,
            capacity,
            flow: 0.0,
            reverse_edge_index,
        }
    }

    /// Get residual capacity in the edge's own direction
    #[inline]
    pub fn residual_capacity(&self) -> Capacity {
        self.capacity - self.flow
    }
}

/// Flow network representation with residual graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowNetwork {
    /// Number of vertices in network
    vertex_count: usize,
    /// Adjacency list of edge indices, forward and reverse interleaved
    adjacency: Vec<Vec<EdgeIndex>>,
    /// All edges in the network; forward edges at even indices
    edges: Vec<FlowEdge>,
}

impl FlowNetwork {
    /// Create new flow network with specified vertex count
    pub fn new(vertex_count: usize) -> Self {
        Self {
            vertex_count,
            adjacency: vec![Vec::new(); vertex_count],
            edges: Vec::new(),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// Number of forward (caller-added) edges
    pub fn edge_count(&self) -> usize {
        self.edges.len() / 2
    }

    /// Add edge to flow network with bidirectional residual edges
    ///
    /// Returns the index of the forward edge, which stays valid for the
    /// lifetime of the network.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId, capacity: Capacity) -> Result<EdgeIndex, FlowError> {
        self.check_vertex(from)?;
        self.check_vertex(to)?;
        if !capacity.is_finite() || capacity < 0.0 {
            return Err(FlowError::InvalidCapacity(capacity));
        }

        let forward_edge_index = self.edges.len();
        let reverse_edge_index = forward_edge_index + 1;

        self.adjacency[from.as_usize()].push(forward_edge_index);
        self.adjacency[to.as_usize()].push(reverse_edge_index);

        self.edges.push(FlowEdge::new(from, to, capacity, reverse_edge_index));
        self.edges.push(FlowEdge::new(to, from, 0.0, forward_edge_index));

        Ok(forward_edge_index)
    }

    pub fn edge(&self, index: EdgeIndex) -> Option<&FlowEdge> {
        self.edges.get(index)
    }

    /// Flow carried by a forward edge; reverse edges report zero
    pub fn flow_on(&self, index: EdgeIndex) -> Flow {
        match self.edges.get(index) {
            Some(edge) if index % 2 == 0 => edge.flow.max(0.0),
            _ => 0.0,
        }
    }

    /// Iterate over forward edges with their indices
    pub fn forward_edges(&self) -> impl Iterator<Item = (EdgeIndex, &FlowEdge)> + '_ {
        self.edges.iter().enumerate().step_by(2)
    }

    /// Net flow leaving `vertex` (negative when flow accumulates there)
    pub fn net_outflow(&self, vertex: NodeId) -> Flow {
        self.adjacency
            .get(vertex.as_usize())
            .map(|incident| incident.iter().map(|&e| self.edges[e].flow).sum())
            .unwrap_or(0.0)
    }

    /// Discard all flow, keeping topology and capacities
    pub fn reset_flow(&mut self) {
        for edge in &mut self.edges {
            edge.flow = 0.0;
        }
    }

    /// Vertices reachable from `source` through edges whose residual
    /// capacity exceeds `tolerance`
    pub fn residual_reachable(&self, source: NodeId, tolerance: f64) -> Result<Vec<bool>, FlowError> {
        self.check_vertex(source)?;

        let mut reachable = vec![false; self.vertex_count];
        let mut queue = VecDeque::new();
        reachable[source.as_usize()] = true;
        queue.push_back(source.as_usize());

        while let Some(vertex) = queue.pop_front() {
            for &edge_index in &self.adjacency[vertex] {
                let edge = &self.edges[edge_index];
                let to = edge.to.as_usize();
                if edge.residual_capacity() > tolerance && !reachable[to] {
                    reachable[to] = true;
                    queue.push_back(to);
                }
            }
        }

        Ok(reachable)
    }

    /// Total capacity of forward edges leaving the `reachable` side
    pub fn cut_capacity(&self, reachable: &[bool]) -> Capacity {
        self.forward_edges()
            .filter(|(_, edge)| {
                let from = reachable.get(edge.from.as_usize()).copied().unwrap_or(false);
                let to = reachable.get(edge.to.as_usize()).copied().unwrap_or(false);
                from && !to
            })
            .map(|(_, edge)| edge.capacity)
            .sum()
    }

    #[inline]
    fn push(&mut self, edge_index: EdgeIndex, delta: Flow) {
        let reverse_index = self.edges[edge_index].reverse_edge_index;
        self.edges[edge_index].flow += delta;
        self.edges[reverse_index].flow -= delta;
    }

    fn check_vertex(&self, vertex: NodeId) -> Result<(), FlowError> {
        if vertex.as_usize() < self.vertex_count {
            Ok(())
        } else {
            Err(FlowError::InvalidVertex(vertex))
        }
    }
}

/// Flow algorithm performance metrics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowMetrics {
    /// Number of level graphs built (Dinic)
    pub phases: usize,
    /// Number of augmenting paths saturated (Dinic)
    pub augmenting_paths: usize,
    /// Number of push operations (push-relabel)
    pub push_operations: usize,
    /// Number of relabel operations (push-relabel)
    pub relabel_operations: usize,
}

/// Maximum flow solver dispatching to the selected algorithm
#[derive(Debug, Clone)]
pub struct MaxFlowSolver {
    /// Selected algorithm variant
    algorithm: MaxFlowAlgorithm,
    /// Residual capacities at or below this are treated as exhausted
    tolerance: f64,
    /// Performance monitoring
    metrics: FlowMetrics,
}

impl MaxFlowSolver {
    /// Create new maximum flow solver with specified algorithm
    pub fn new(algorithm: MaxFlowAlgorithm, tolerance: f64) -> Self {
        Self {
            algorithm,
            tolerance,
            metrics: FlowMetrics::default(),
        }
    }

    pub fn algorithm(&self) -> MaxFlowAlgorithm {
        self.algorithm
    }

    /// Solve maximum flow using Dinic's blocking-flow method
    pub fn solve_dinic(&mut self, network: &mut FlowNetwork, source: NodeId, sink: NodeId) -> Result<Flow, FlowError> {
        let vertex_count = network.vertex_count;
        let mut level = vec![None; vertex_count];
        let mut next_arc = vec![0; vertex_count];
        let mut total_flow = 0.0;

        while self.build_levels(network, source, sink, &mut level) {
            self.metrics.phases += 1;
            next_arc.fill(0);

            loop {
                let pushed = self.augment(network, source.as_usize(), sink.as_usize(), &level, &mut next_arc);
                if pushed <= self.tolerance {
                    break;
                }
                self.metrics.augmenting_paths += 1;
                total_flow += pushed;
            }
            trace!("Dinic phase {} complete, flow so far {}", self.metrics.phases, total_flow);
        }

        Ok(total_flow)
    }

    /// BFS from source over residual edges; returns whether sink was reached
    fn build_levels(&self, network: &FlowNetwork, source: NodeId, sink: NodeId, level: &mut [Option<usize>]) -> bool {
        level.fill(None);
        let mut queue = VecDeque::new();
        level[source.as_usize()] = Some(0);
        queue.push_back(source.as_usize());

        while let Some(vertex) = queue.pop_front() {
            let next = level[vertex].map(|l| l + 1);
            for &edge_index in &network.adjacency[vertex] {
                let edge = &network.edges[edge_index];
                let to = edge.to.as_usize();
                if edge.residual_capacity() > self.tolerance && level[to].is_none() {
                    level[to] = next;
                    queue.push_back(to);
                }
            }
        }

        level[sink.as_usize()].is_some()
    }

    /// Find one source-sink path along strictly increasing levels and push
    /// its bottleneck through it
    ///
    /// The path is kept on an explicit stack of edge indices so chain length
    /// is bounded by the heap, not the call stack. Dead ends advance the
    /// current arc of their predecessor.
    fn augment(
        &self,
        network: &mut FlowNetwork,
        source: usize,
        sink: usize,
        level: &[Option<usize>],
        next_arc: &mut [usize],
    ) -> Flow {
        let mut path: Vec<EdgeIndex> = Vec::new();
        let mut vertex = source;

        loop {
            if vertex == sink {
                let bottleneck = path
                    .iter()
                    .map(|&e| network.edges[e].residual_capacity())
                    .fold(Flow::INFINITY, Flow::min);
                for &edge_index in &path {
                    network.push(edge_index, bottleneck);
                }
                return bottleneck;
            }

            match self.admissible_arc(network, vertex, level, next_arc) {
                Some(edge_index) => {
                    path.push(edge_index);
                    vertex = network.edges[edge_index].to.as_usize();
                }
                None => match path.pop() {
                    Some(edge_index) => {
                        vertex = network.edges[edge_index].from.as_usize();
                        next_arc[vertex] += 1;
                    }
                    None => return 0.0,
                },
            }
        }
    }

    /// First residual edge at or after the current arc that climbs one level
    fn admissible_arc(
        &self,
        network: &FlowNetwork,
        vertex: usize,
        level: &[Option<usize>],
        next_arc: &mut [usize],
    ) -> Option<EdgeIndex> {
        while let Some(&edge_index) = network.adjacency[vertex].get(next_arc[vertex]) {
            let edge = &network.edges[edge_index];
            let admissible = match (level[vertex], level[edge.to.as_usize()]) {
                (Some(here), Some(there)) => there == here + 1,
                _ => false,
            };
            if admissible && edge.residual_capacity() > self.tolerance {
                return Some(edge_index);
            }
            next_arc[vertex] += 1;
        }
        None
    }

    /// Solve maximum flow using Goldberg-Tarjan push-relabel
    pub fn solve_push_relabel(&mut self, network: &mut FlowNetwork, source: NodeId, sink: NodeId) -> Result<Flow, FlowError> {
        let vertex_count = network.vertex_count;
        let (s, t) = (source.as_usize(), sink.as_usize());

        let mut labels: Vec<DistanceLabel> = vec![0; vertex_count];
        let mut excess: Vec<Flow> = vec![0.0; vertex_count];
        let mut next_arc = vec![0; vertex_count];
        let mut queued = vec![false; vertex_count];
        let mut active = VecDeque::new();

        // Saturate all edges from source
        labels[s] = vertex_count;
        for position in 0..network.adjacency[s].len() {
            let edge_index = network.adjacency[s][position];
            let residual = network.edges[edge_index].residual_capacity();
            if residual > self.tolerance {
                let to = network.edges[edge_index].to.as_usize();
                network.push(edge_index, residual);
                excess[s] -= residual;
                excess[to] += residual;
                if to != s && to != t && !queued[to] {
                    queued[to] = true;
                    active.push_back(to);
                }
            }
        }

        while let Some(vertex) = active.pop_front() {
            queued[vertex] = false;

            while excess[vertex] > self.tolerance {
                if next_arc[vertex] == network.adjacency[vertex].len() {
                    let lowest = network.adjacency[vertex]
                        .iter()
                        .map(|&e| &network.edges[e])
                        .filter(|edge| edge.residual_capacity() > self.tolerance)
                        .map(|edge| labels[edge.to.as_usize()])
                        .min();
                    match lowest {
                        Some(lowest) => {
                            labels[vertex] = lowest + 1;
                            next_arc[vertex] = 0;
                            self.metrics.relabel_operations += 1;
                        }
                        None => {
                            warn!("Vertex {} stranded with excess {}", vertex, excess[vertex]);
                            break;
                        }
                    }
                    continue;
                }

                let edge_index = network.adjacency[vertex][next_arc[vertex]];
                let edge = &network.edges[edge_index];
                let to = edge.to.as_usize();
                let residual = edge.residual_capacity();

                if residual > self.tolerance && labels[vertex] == labels[to] + 1 {
                    let delta = excess[vertex].min(residual);
                    network.push(edge_index, delta);
                    excess[vertex] -= delta;
                    excess[to] += delta;
                    self.metrics.push_operations += 1;

                    if to != s && to != t && !queued[to] && excess[to] > self.tolerance {
                        queued[to] = true;
                        active.push_back(to);
                    }
                } else {
                    next_arc[vertex] += 1;
                }
            }
        }

        Ok(excess[t])
    }
}

impl MaxFlowEngine for MaxFlowSolver {
    fn name(&self) -> &'static str {
        match self.algorithm {
            MaxFlowAlgorithm::Dinic => "Dinic",
            MaxFlowAlgorithm::PushRelabelFifo => "Push-Relabel FIFO",
        }
    }

    fn solve(&mut self, network: &mut FlowNetwork, source: NodeId, sink: NodeId) -> Result<Flow, FlowError> {
        network.check_vertex(source)?;
        network.check_vertex(sink)?;
        if source == sink {
            return Err(FlowError::SourceIsSink(source));
        }

        self.metrics = FlowMetrics::default();
        network.reset_flow();

        let value = match self.algorithm {
            MaxFlowAlgorithm::Dinic => self.solve_dinic(network, source, sink),
            MaxFlowAlgorithm::PushRelabelFifo => self.solve_push_relabel(network, source, sink),
        }?;

        debug!("{} finished: flow={} metrics={:?}", self.name(), value, self.metrics);
        Ok(value)
    }

    fn metrics(&self) -> &FlowMetrics {
        &self.metrics
    }
}

/// Flow algorithm errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FlowError {
    #[error("Vertex {0} is outside the network")]
    InvalidVertex(NodeId),
    #[error("Edge capacity {0} must be finite and nonnegative")]
    InvalidCapacity(Capacity),
    #[error("Source and sink are the same vertex {0}")]
    SourceIsSink(NodeId),
}
