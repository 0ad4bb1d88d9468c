use std::collections::{HashMap, HashSet};

use serde::Serialize;

use super::record::{Field, RecordSet};

/// Role a node plays in the supplier → device → customer flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeRole {
    Supplier,
    Device,
    Customer,
}

impl NodeRole {
    /// Numeric group used by force-directed renderers (1, 2, 3).
    pub fn group(self) -> u8 {
        match self {
            NodeRole::Supplier => 1,
            NodeRole::Device => 2,
            NodeRole::Customer => 3,
        }
    }

    fn field(self) -> Field {
        match self {
            NodeRole::Supplier => Field::Supplier,
            NodeRole::Device => Field::DeviceName,
            NodeRole::Customer => Field::Customer,
        }
    }

    fn unknown(self) -> &'static str {
        match self {
            NodeRole::Supplier => "Unknown Supplier",
            NodeRole::Device => "Unknown Device",
            NodeRole::Customer => "Unknown Customer",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    pub id: String,
    pub role: NodeRole,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
    pub weight: u32,
}

/// Tripartite shipment graph. Nodes are unique by id; edges are a multiset
/// with one supplier→device and one device→customer edge per record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Graph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl Graph {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Number of edges from `source` to `target`.
    pub fn multiplicity(&self, source: &str, target: &str) -> usize {
        self.edges
            .iter()
            .filter(|e| e.source == source && e.target == target)
            .count()
    }

    /// Edge weights summed per `(source, target)` pair, in first-seen order.
    pub fn link_weights(&self) -> Vec<Edge> {
        let mut index: HashMap<(&str, &str), usize> = HashMap::new();
        let mut out: Vec<Edge> = Vec::new();
        for e in &self.edges {
            let key = (e.source.as_str(), e.target.as_str());
            match index.get(&key) {
                Some(&i) => out[i].weight += e.weight,
                None => {
                    index.insert(key, out.len());
                    out.push(e.clone());
                }
            }
        }
        out
    }
}

/// Build the supplier → device → customer graph. Empty fields map to an
/// "Unknown <Role>" node. When one string appears under two roles, the role
/// it was first seen with wins.
pub fn build_graph(set: &RecordSet) -> Graph {
    let mut seen: HashSet<String> = HashSet::new();
    let mut graph = Graph::default();

    for record in set {
        let [supplier, device, customer] =
            [NodeRole::Supplier, NodeRole::Device, NodeRole::Customer].map(|role| {
                let raw = record.field(role.field());
                let id = if raw.is_empty() { role.unknown() } else { raw };
                if seen.insert(id.to_string()) {
                    graph.nodes.push(Node {
                        id: id.to_string(),
                        role,
                    });
                }
                id.to_string()
            });

        graph.edges.push(Edge {
            source: supplier,
            target: device.clone(),
            weight: 1,
        });
        graph.edges.push(Edge {
            source: device,
            target: customer,
            weight: 1,
        });
    }

    tracing::debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "built supply graph"
    );
    graph
}
