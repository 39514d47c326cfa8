use std::collections::{BTreeSet, HashMap};
use std::fmt::Display;

use log::info;
use serde::{Deserialize, Serialize};

use crate::dijkstra::dijkstra_query;
use crate::router::RouteOutcome;
use crate::topology::{Topology, TopologyError};
use crate::FlowConfig;

pub type NodeIndex = u32;
pub type Weight = u32;

// A station as seen from one line. The same station on two lines is two nodes joined by a transfer edge.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeKey {
    pub line: String,
    pub station: String,
}

impl NodeKey {
    pub fn new(line: &str, station: &str) -> Self {
        Self {
            line: line.to_owned(),
            station: station.to_owned(),
        }
    }
}

impl Display for NodeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.line, self.station)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EdgeKind {
    Ride,
    Transfer,
}

// Undirected, stored with origin < destination.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Edge {
    pub origin: NodeIndex,
    pub destination: NodeIndex,
    pub kind: EdgeKind,
    pub weight: Weight,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Neighbour {
    pub node: NodeIndex,
    pub weight: Weight,
    pub kind: EdgeKind,
}

pub struct Node {
    pub key: NodeKey,
    pub neighbours_idx: usize,
    pub num_neighbours: usize,
}

impl Node {
    pub fn new(key: NodeKey) -> Self {
        Self {
            key,
            neighbours_idx: 0,
            num_neighbours: 0,
        }
    }

    pub fn get_neighbours<'a>(&self, neighbours: &'a [Neighbour]) -> &'a [Neighbour] {
        &neighbours[self.neighbours_idx..(self.neighbours_idx + self.num_neighbours)]
    }
}

pub struct Network {
    pub nodes: Vec<Node>,
    pub node_index: HashMap<NodeKey, NodeIndex>,
    pub edges: Vec<Edge>,
    pub neighbours: Vec<Neighbour>,
    pub ride_weight: Weight,
    pub transfer_weight: Weight,
}

impl Network {
    pub fn new(topology: &Topology, config: &FlowConfig) -> Result<Self, TopologyError> {
        for (kind, weight) in [(EdgeKind::Ride, config.ride_weight), (EdgeKind::Transfer, config.transfer_weight)] {
            if weight == 0 {
                return Err(TopologyError::InvalidWeight { kind, weight });
            }
        }

        // Nodes are numbered in the order they first appear in the ride pairs.
        let mut nodes = Vec::new();
        let mut node_index = HashMap::new();
        let mut get_or_insert = |key: NodeKey| -> NodeIndex {
            *node_index.entry(key).or_insert_with_key(|key| {
                nodes.push(Node::new(key.clone()));
                (nodes.len() - 1) as NodeIndex
            })
        };

        let mut ride_edges = BTreeSet::new();
        for pair in topology.ride_pairs.iter() {
            let origin = get_or_insert(NodeKey::new(&pair.line_id, &pair.origin));
            let destination = get_or_insert(NodeKey::new(&pair.line_id, &pair.destination));
            if origin != destination {
                ride_edges.insert((origin.min(destination), origin.max(destination)));
            }
        }

        if nodes.is_empty() {
            return Err(TopologyError::EmptyNetwork);
        }
        assert!(
            nodes.len() < NodeIndex::MAX as usize,
            "Too many nodes ({}) for a {}-bit node index.",
            nodes.len(),
            std::mem::size_of::<NodeIndex>() * 8
        );

        let mut edges: Vec<Edge> = ride_edges
            .into_iter()
            .map(|(origin, destination)| Edge {
                origin,
                destination,
                kind: EdgeKind::Ride,
                weight: config.ride_weight,
            })
            .collect();

        // Every unordered pair of lines sharing a station gets one transfer edge, k lines giving C(k, 2) edges.
        for (station, line_ids) in topology.transfer_stations.iter() {
            let station_nodes: Vec<NodeIndex> = line_ids
                .iter()
                .filter_map(|line_id| node_index.get(&NodeKey::new(line_id, station)).copied())
                .collect();
            for (i, &a) in station_nodes.iter().enumerate() {
                for &b in station_nodes.iter().skip(i + 1) {
                    edges.push(Edge {
                        origin: a.min(b),
                        destination: a.max(b),
                        kind: EdgeKind::Transfer,
                        weight: config.transfer_weight,
                    });
                }
            }
        }

        // Index the neighbours of each node, both directions of every edge.
        let mut adjacency = vec![Vec::new(); nodes.len()];
        for edge in edges.iter() {
            adjacency[edge.origin as usize].push(Neighbour {
                node: edge.destination,
                weight: edge.weight,
                kind: edge.kind,
            });
            adjacency[edge.destination as usize].push(Neighbour {
                node: edge.origin,
                weight: edge.weight,
                kind: edge.kind,
            });
        }
        let mut neighbours = Vec::with_capacity(edges.len() * 2);
        for (node, mut node_neighbours) in nodes.iter_mut().zip(adjacency) {
            node_neighbours.sort_unstable_by_key(|neighbour| (neighbour.node, neighbour.kind));
            node.neighbours_idx = neighbours.len();
            node.num_neighbours = node_neighbours.len();
            neighbours.extend(node_neighbours);
        }

        Ok(Self {
            nodes,
            node_index,
            edges,
            neighbours,
            ride_weight: config.ride_weight,
            transfer_weight: config.transfer_weight,
        })
    }

    pub fn contains(&self, key: &NodeKey) -> bool { self.node_index.contains_key(key) }

    pub fn get_node(&self, node: NodeIndex) -> &Node { &self.nodes[node as usize] }

    pub fn get_node_idx(&self, key: &NodeKey) -> Option<NodeIndex> { self.node_index.get(key).copied() }

    pub fn get_key(&self, node: NodeIndex) -> &NodeKey { &self.get_node(node).key }

    pub fn get_neighbours(&self, node: NodeIndex) -> &[Neighbour] { self.get_node(node).get_neighbours(&self.neighbours) }

    pub fn get_edge_weight(&self, a: NodeIndex, b: NodeIndex) -> Option<Weight> {
        self.get_neighbours(a).iter().find(|neighbour| neighbour.node == b).map(|neighbour| neighbour.weight)
    }

    pub fn num_nodes(&self) -> usize { self.nodes.len() }

    pub fn num_edges(&self) -> usize { self.edges.len() }

    pub fn num_edges_of_kind(&self, kind: EdgeKind) -> usize { self.edges.iter().filter(|edge| edge.kind == kind).count() }

    // Shortest path between two line-qualified stations; missing nodes and disconnected pairs are outcomes, not errors.
    pub fn shortest_path(&self, origin: &NodeKey, destination: &NodeKey, max_visited: Option<usize>) -> RouteOutcome {
        match (self.get_node_idx(origin), self.get_node_idx(destination)) {
            (Some(start), Some(end)) => match dijkstra_query(self, start, end, max_visited) {
                Some(path) => RouteOutcome::Found(path),
                None => RouteOutcome::NoPath,
            },
            _ => RouteOutcome::UnknownNode,
        }
    }

    pub fn print_stats(&self) {
        info!(
            "Network has {} nodes, {} ride edges and {} transfer edges.",
            self.num_nodes(),
            self.num_edges_of_kind(EdgeKind::Ride),
            self.num_edges_of_kind(EdgeKind::Transfer)
        );
    }
}
