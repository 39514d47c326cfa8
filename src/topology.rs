use std::collections::{BTreeMap, BTreeSet, HashMap};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::network::{EdgeKind, Weight};
use crate::{utils, FlowConfig};

// One row of the station topology: a station at some position along a (direction-qualified) line.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StationRecord {
    pub station_name: String,
    pub line_name: String,
    pub sequence: u32,
}

impl StationRecord {
    pub fn new(station_name: &str, line_name: &str, sequence: u32) -> Self {
        Self {
            station_name: station_name.to_owned(),
            line_name: line_name.to_owned(),
            sequence,
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum TopologyError {
    #[error("Station record {sequence} on line '{line_name}' has no station name.")]
    MissingStationName { line_name: String, sequence: u32 },
    #[error("Station record {sequence} for '{station_name}' has no usable line name ('{line_name}').")]
    MissingLineName { station_name: String, line_name: String, sequence: u32 },
    #[error("No nodes could be built from the topology.")]
    EmptyNetwork,
    #[error("{kind:?} edges need a positive weight, got {weight}.")]
    InvalidWeight { kind: EdgeKind, weight: Weight },
}

// The stations of one raw line (e.g. one direction of a line) in travel order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineSequence {
    pub line_name: String,
    pub line_id: String,
    pub stations: Vec<String>,
}

// Two stations adjacent on a line, in travel order.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RidePair {
    pub line_id: String,
    pub origin: String,
    pub destination: String,
}

pub struct Topology {
    pub lines: Vec<LineSequence>,
    pub ride_pairs: Vec<RidePair>,
    // Station name -> the line ids it appears on, for stations on two or more lines.
    pub transfer_stations: BTreeMap<String, BTreeSet<String>>,
}

impl Topology {
    pub fn load(records: &[StationRecord], config: &FlowConfig) -> Result<Self, TopologyError> {
        // Group records by raw line name, keeping the order lines first appear in.
        let mut line_index: HashMap<&str, usize> = HashMap::new();
        let mut grouped: Vec<(&str, Vec<(u32, &str)>)> = Vec::new();
        for record in records {
            let station_name = record.station_name.trim();
            let line_name = record.line_name.trim();
            if station_name.is_empty() {
                return Err(TopologyError::MissingStationName {
                    line_name: record.line_name.clone(),
                    sequence: record.sequence,
                });
            }
            if line_name.is_empty() || utils::get_line_id(line_name, &config.line_prefix).is_empty() {
                return Err(TopologyError::MissingLineName {
                    station_name: record.station_name.clone(),
                    line_name: record.line_name.clone(),
                    sequence: record.sequence,
                });
            }

            let idx = *line_index.entry(line_name).or_insert_with(|| {
                grouped.push((line_name, Vec::new()));
                grouped.len() - 1
            });
            grouped[idx].1.push((record.sequence, station_name));
        }

        let mut lines = Vec::with_capacity(grouped.len());
        for (line_name, mut stations) in grouped {
            // Stable, so duplicate sequence numbers keep their input order.
            stations.sort_by_key(|&(sequence, _)| sequence);

            let line_id = canonical_line_id(line_name, config);
            let mut stations: Vec<String> = stations.into_iter().map(|(_, name)| name.to_owned()).collect();

            if config.ring_lines.contains(&line_id) && stations.len() > 2 && stations.first() != stations.last() {
                let first = stations[0].clone();
                stations.push(first);
            }

            lines.push(LineSequence {
                line_name: line_name.to_owned(),
                line_id,
                stations,
            });
        }

        let mut ride_pairs = Vec::new();
        for line in lines.iter() {
            for pair in line.stations.windows(2) {
                if pair[0] == pair[1] {
                    debug!("Skipping repeated station {} on {}.", pair[0], line.line_name);
                    continue;
                }
                ride_pairs.push(RidePair {
                    line_id: line.line_id.clone(),
                    origin: pair[0].clone(),
                    destination: pair[1].clone(),
                });
            }
        }

        let mut station_lines: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for line in lines.iter() {
            for station in line.stations.iter() {
                station_lines.entry(station.clone()).or_default().insert(line.line_id.clone());
            }
        }
        let transfer_stations: BTreeMap<_, _> = station_lines
            .into_iter()
            .filter(|(_, line_ids)| line_ids.len() > 1)
            .collect();

        info!(
            "Topology loaded with {} lines, {} ride pairs and {} transfer stations.",
            lines.len(),
            ride_pairs.len(),
            transfer_stations.len()
        );

        Ok(Self {
            lines,
            ride_pairs,
            transfer_stations,
        })
    }

    pub fn is_transfer_station(&self, station_name: &str) -> bool {
        self.transfer_stations.contains_key(station_name)
    }

    pub fn line_ids(&self) -> BTreeSet<&str> {
        self.lines.iter().map(|line| line.line_id.as_str()).collect()
    }

    pub fn get_lines<'a>(&'a self, line_id: &'a str) -> impl Iterator<Item = &'a LineSequence> + 'a {
        self.lines.iter().filter(move |line| line.line_id == line_id)
    }
}

fn canonical_line_id(line_name: &str, config: &FlowConfig) -> String {
    let line_id = utils::get_line_id(line_name, &config.line_prefix);
    match config.branch_lines.get(line_id) {
        Some(parent) => parent.clone(),
        None => line_id.to_owned(),
    }
}
