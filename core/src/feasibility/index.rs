//! Dense handle assignment for normalized-graph vertices

use std::collections::BTreeMap;

use crate::algorithm::traits::NodeId;
use crate::feasibility::normalize::NodeKey;

/// Bijection between [`NodeKey`]s and zero-based [`NodeId`]s
///
/// Handles follow sorted key order, so the same set of keys always receives
/// the same handles.
#[derive(Debug, Clone, Default)]
pub struct NodeIndex {
    keys: Vec<NodeKey>,
    handles: BTreeMap<NodeKey, NodeId>,
}

impl NodeIndex {
    pub fn assign<'a>(keys: impl IntoIterator<Item = &'a NodeKey>) -> Self {
        let mut keys: Vec<NodeKey> = keys.into_iter().cloned().collect();
        keys.sort();
        keys.dedup();

        let handles = keys
            .iter()
            .enumerate()
            .map(|(position, key)| (key.clone(), NodeId(position)))
            .collect();

        Self { keys, handles }
    }

    pub fn handle(&self, key: &NodeKey) -> Option<NodeId> {
        self.handles.get(key).copied()
    }

    pub fn key(&self, id: NodeId) -> Option<&NodeKey> {
        self.keys.get(id.as_usize())
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &NodeKey)> + '_ {
        self.keys.iter().enumerate().map(|(position, key)| (NodeId(position), key))
    }
}
