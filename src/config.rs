use std::collections::{BTreeSet, HashMap};

use serde::Deserialize;

use crate::network::Weight;

// Everything the flow engine can be tuned with. Passed in at construction, never read from the environment.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct FlowConfig {
    // Weight of a ride edge between adjacent stations on one line.
    pub ride_weight: Weight,
    // Weight of a transfer edge between two lines at the same station.
    pub transfer_weight: Weight,
    // Stripped from the front of line display names, e.g. "地铁2号线" -> "2号线".
    pub line_prefix: String,
    // Branch line id -> parent line id, e.g. "5号线支线" -> "5号线".
    pub branch_lines: HashMap<String, String>,
    // Line ids whose last station connects back to the first.
    pub ring_lines: BTreeSet<String>,
    // Fare-system station name -> topology station name.
    pub station_corrections: HashMap<String, String>,
    // Tap station strings look like "2号线人民广场"; the line id runs up to and including this.
    pub fare_line_delimiter: char,
    // Only taps of this mode are paired into trips, if set.
    pub rail_mode: Option<String>,
    // Give up on an OD pair after settling this many nodes.
    pub max_visited: Option<usize>,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            ride_weight: 3,
            transfer_weight: 5,
            line_prefix: String::from("地铁"),
            branch_lines: HashMap::new(),
            ring_lines: BTreeSet::new(),
            station_corrections: HashMap::new(),
            fare_line_delimiter: '线',
            rail_mode: None,
            max_visited: None,
        }
    }
}

impl FlowConfig {
    pub fn with_weights(mut self, ride_weight: Weight, transfer_weight: Weight) -> Self {
        self.ride_weight = ride_weight;
        self.transfer_weight = transfer_weight;
        self
    }

    pub fn with_branch_line(mut self, branch: &str, parent: &str) -> Self {
        self.branch_lines.insert(branch.to_owned(), parent.to_owned());
        self
    }

    pub fn with_ring_line(mut self, line_id: &str) -> Self {
        self.ring_lines.insert(line_id.to_owned());
        self
    }

    pub fn with_station_corrections<'a>(mut self, corrections: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        self.station_corrections
            .extend(corrections.into_iter().map(|(from, to)| (from.to_owned(), to.to_owned())));
        self
    }

    pub fn with_rail_mode(mut self, mode: &str) -> Self {
        self.rail_mode = Some(mode.to_owned());
        self
    }

    pub fn with_max_visited(mut self, max_visited: usize) -> Self {
        self.max_visited = Some(max_visited);
        self
    }

    // Resolve a raw station name from the fare system to its topology name.
    pub fn correct_station<'a>(&'a self, station: &'a str) -> &'a str {
        self.station_corrections.get(station).map(String::as_str).unwrap_or(station)
    }
}
