//! Input data model for flow feasibility evaluation

pub mod network;

pub use self::network::{EdgeSpec, Network, NetworkError, NodeSpec};
