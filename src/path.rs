use std::fmt::Display;

use crate::network::{Network, NodeIndex, Weight};

// A shortest route through the network, always at least one node long.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Path {
    nodes: Vec<NodeIndex>,
    weight: Weight,
}

// A run of consecutive nodes on one line.
pub struct Leg<'a> {
    pub line: &'a str,
    pub boarded_station: &'a str,
    pub arrival_station: &'a str,
    pub num_stops: usize,
}

impl Path {
    // None for an empty node list.
    pub fn new(nodes: Vec<NodeIndex>, weight: Weight) -> Option<Self> {
        if nodes.is_empty() {
            return None;
        }
        Some(Self { nodes, weight })
    }

    pub fn nodes(&self) -> &[NodeIndex] { &self.nodes }

    pub fn weight(&self) -> Weight { self.weight }

    pub fn origin(&self) -> NodeIndex { self.nodes[0] }

    pub fn destination(&self) -> NodeIndex { self.nodes[self.nodes.len() - 1] }

    // Consecutive directed node pairs along the path.
    pub fn segments(&self) -> impl Iterator<Item = (NodeIndex, NodeIndex)> + '_ {
        self.nodes.windows(2).map(|pair| (pair[0], pair[1]))
    }

    pub fn num_segments(&self) -> usize { self.nodes.len() - 1 }

    pub fn legs<'a>(&self, network: &'a Network) -> Vec<Leg<'a>> {
        let mut legs: Vec<Leg<'a>> = Vec::new();
        for (a, b) in self.segments() {
            let (origin, destination) = (network.get_key(a), network.get_key(b));
            // Transfer edges change line without moving.
            if origin.line != destination.line {
                continue;
            }
            let last = legs.last_mut().filter(|leg| leg.line == origin.line && leg.arrival_station == origin.station);
            if let Some(leg) = last {
                leg.arrival_station = &destination.station;
                leg.num_stops += 1;
                continue;
            }
            legs.push(Leg {
                line: &origin.line,
                boarded_station: &origin.station,
                arrival_station: &destination.station,
                num_stops: 1,
            });
        }
        legs
    }

    pub fn num_transfers(&self, network: &Network) -> usize {
        self.segments()
            .filter(|&(a, b)| network.get_key(a).line != network.get_key(b).line)
            .count()
    }

    pub fn display<'a>(&'a self, network: &'a Network) -> PathDisplay<'a> { PathDisplay { path: self, network } }
}

pub struct PathDisplay<'a> {
    path: &'a Path,
    network: &'a Network,
}

impl Display for PathDisplay<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "-----------------------------------------------")?;
        let legs = self.path.legs(self.network);
        if legs.is_empty() {
            writeln!(f)?;
            writeln!(f, "Already at {}.", self.network.get_key(self.path.origin()))?;
        }
        for (i, leg) in legs.iter().enumerate() {
            writeln!(f)?;
            if i > 0 {
                writeln!(f, "Transfer to {} at {}.", leg.line, leg.boarded_station)?;
            }
            writeln!(f, "Board {} at {}.", leg.line, leg.boarded_station)?;
            writeln!(
                f,
                "Arrive at {} after {} {}.",
                leg.arrival_station,
                leg.num_stops,
                if leg.num_stops == 1 { "stop" } else { "stops" }
            )?;
        }
        writeln!(f)?;
        writeln!(f, "Total weight: {}.", self.path.weight)?;
        writeln!(f, "-----------------------------------------------")?;
        Ok(())
    }
}
