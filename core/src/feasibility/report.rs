//! Feasibility report vocabulary
//!
//! Reports speak only in caller labels. Amounts that are whole numbers
//! serialize as integers so `80.0` is written as `80`.

use serde::{Deserialize, Serialize, Serializer};

use crate::algorithm::graph::max_flow::Flow;

/// Largest magnitude at which every integer is exactly representable in f64
const EXACT_INTEGER_LIMIT: f64 = 9_007_199_254_740_992.0;

fn serialize_amount<S: Serializer>(value: &Flow, serializer: S) -> Result<S::Ok, S::Error> {
    if value.fract() == 0.0 && value.abs() < EXACT_INTEGER_LIMIT {
        // -0.0 collapses to 0 here
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

/// Flow assigned to one caller edge, lower bound included
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeFlow {
    pub from: String,
    pub to: String,
    #[serde(serialize_with = "serialize_amount")]
    pub flow: Flow,
}

/// Caller edge saturated across the minimal cut
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TightEdge {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deficit {
    /// Total demand minus achieved flow
    #[serde(serialize_with = "serialize_amount")]
    pub demand_balance: Flow,
    pub tight_nodes: Vec<String>,
    pub tight_edges: Vec<TightEdge>,
}

/// Outcome of one feasibility evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FeasibilityReport {
    Ok {
        #[serde(serialize_with = "serialize_amount")]
        max_flow_per_min: Flow,
        flows: Vec<EdgeFlow>,
    },
    Infeasible {
        cut_reachable: Vec<String>,
        deficit: Deficit,
    },
}

impl FeasibilityReport {
    pub fn is_feasible(&self) -> bool {
        matches!(self, FeasibilityReport::Ok { .. })
    }

    pub fn status(&self) -> &'static str {
        match self {
            FeasibilityReport::Ok { .. } => "ok",
            FeasibilityReport::Infeasible { .. } => "infeasible",
        }
    }

    pub fn flows(&self) -> Option<&[EdgeFlow]> {
        match self {
            FeasibilityReport::Ok { flows, .. } => Some(flows),
            FeasibilityReport::Infeasible { .. } => None,
        }
    }

    pub fn deficit(&self) -> Option<&Deficit> {
        match self {
            FeasibilityReport::Ok { .. } => None,
            FeasibilityReport::Infeasible { deficit, .. } => Some(deficit),
        }
    }
}
