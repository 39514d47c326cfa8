use std::collections::{BTreeMap, HashMap};

use log::info;
use serde::{Deserialize, Serialize};

use crate::network::{Network, NodeKey};
use crate::router::PathTable;
use crate::topology::Topology;
use crate::trip::{OdKey, Trip};

// A directed hop between two consecutive nodes of a path.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Segment {
    pub origin: NodeKey,
    pub destination: NodeKey,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionLoadRow {
    pub origin: NodeKey,
    pub destination: NodeKey,
    pub trip_count: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScaledRow {
    pub origin: NodeKey,
    pub destination: NodeKey,
    pub trip_count: f64,
}

// One section of one direction of a line, in line order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRow {
    pub line_name: String,
    pub position: usize,
    pub origin_station: String,
    pub destination_station: String,
    pub trip_count: u64,
}

// The segments of the shortest path for one OD pair. Same-node pairs resolve to no segments.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OdSegments {
    pub od: OdKey,
    pub segments: Vec<Segment>,
}

// A segment tagged with the OD pair that owns it, one row of the flattened decomposition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentRow {
    pub o: NodeKey,
    pub d: NodeKey,
    pub origin: NodeKey,
    pub destination: NodeKey,
}

// Every resolved OD pair broken into segments. Enough to rebuild section loads for any subset of
// trips without routing again.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<OdSegments>", into = "Vec<OdSegments>")]
pub struct OdDecomposition {
    paths: Vec<OdSegments>,
}

impl From<Vec<OdSegments>> for OdDecomposition {
    fn from(mut paths: Vec<OdSegments>) -> Self {
        paths.sort_by(|a, b| a.od.cmp(&b.od));
        paths.dedup_by(|a, b| a.od == b.od);
        Self { paths }
    }
}

impl From<OdDecomposition> for Vec<OdSegments> {
    fn from(decomposition: OdDecomposition) -> Self { decomposition.paths }
}

impl OdDecomposition {
    pub fn new(network: &Network, paths: &PathTable) -> Self {
        let paths: Vec<OdSegments> = paths
            .iter()
            .filter_map(|(od, outcome)| outcome.path().map(|path| (od, path)))
            .map(|(od, path)| OdSegments {
                od: od.clone(),
                segments: path
                    .segments()
                    .map(|(a, b)| Segment {
                        origin: network.get_key(a).clone(),
                        destination: network.get_key(b).clone(),
                    })
                    .collect(),
            })
            .collect();
        Self::from(paths)
    }

    pub fn get(&self, od: &OdKey) -> Option<&[Segment]> {
        self.paths
            .binary_search_by(|entry| entry.od.cmp(od))
            .ok()
            .map(|i| self.paths[i].segments.as_slice())
    }

    pub fn len(&self) -> usize { self.paths.len() }

    pub fn is_empty(&self) -> bool { self.paths.is_empty() }

    pub fn paths(&self) -> &[OdSegments] { &self.paths }

    pub fn rows(&self) -> Vec<SegmentRow> {
        self.paths
            .iter()
            .flat_map(|entry| {
                entry.segments.iter().map(move |segment| SegmentRow {
                    o: segment.origin.clone(),
                    d: segment.destination.clone(),
                    origin: entry.od.origin.clone(),
                    destination: entry.od.destination.clone(),
                })
            })
            .collect()
    }

    // Join trips to their segments and count. Trips with no entry here are unresolved.
    pub fn aggregate<'t>(&self, trips: impl IntoIterator<Item = &'t Trip>) -> SectionLoad {
        let mut load = SectionLoad::default();

        // Count trips per OD first, then spread each count over its path.
        let mut trips_per_od: HashMap<&OdKey, u64> = HashMap::new();
        for trip in trips {
            if self.get(&trip.od).is_some() {
                load.resolved_trips += 1;
                *trips_per_od.entry(&trip.od).or_default() += 1;
            } else {
                load.unresolved_trips += 1;
            }
        }

        for (od, num_trips) in trips_per_od {
            for segment in self.get(od).unwrap_or_default() {
                *load.counts.entry(segment.clone()).or_default() += num_trips;
            }
        }

        info!(
            "Aggregated {} trips over {} segments, {} unresolved.",
            load.resolved_trips,
            load.counts.len(),
            load.unresolved_trips
        );
        load
    }
}

// Trip counts per directed segment. Counts are raw; scaling only happens on export.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SectionLoad {
    counts: BTreeMap<Segment, u64>,
    pub resolved_trips: u64,
    pub unresolved_trips: u64,
}

impl SectionLoad {
    pub fn aggregate<'t>(network: &Network, paths: &PathTable, trips: impl IntoIterator<Item = &'t Trip>) -> Self {
        OdDecomposition::new(network, paths).aggregate(trips)
    }

    pub fn get(&self, origin: &NodeKey, destination: &NodeKey) -> u64 {
        let segment = Segment {
            origin: origin.clone(),
            destination: destination.clone(),
        };
        self.counts.get(&segment).copied().unwrap_or(0)
    }

    pub fn num_segments(&self) -> usize { self.counts.len() }

    pub fn total_trips(&self) -> u64 { self.resolved_trips + self.unresolved_trips }

    // Sum over all segments, i.e. trip-segments rather than trips.
    pub fn total_segment_count(&self) -> u64 { self.counts.values().sum() }

    pub fn rows(&self) -> Vec<SectionLoadRow> {
        self.counts
            .iter()
            .map(|(segment, &trip_count)| SectionLoadRow {
                origin: segment.origin.clone(),
                destination: segment.destination.clone(),
                trip_count,
            })
            .collect()
    }

    // Rows multiplied by a uniform expansion factor, e.g. 25 for a 4% sample.
    pub fn scaled(&self, factor: f64) -> Vec<ScaledRow> {
        self.counts
            .iter()
            .map(|(segment, &trip_count)| ScaledRow {
                origin: segment.origin.clone(),
                destination: segment.destination.clone(),
                trip_count: trip_count as f64 * factor,
            })
            .collect()
    }

    // Section loads along every direction of a line, in station order, with unused sections as zero.
    pub fn line_profile(&self, topology: &Topology, line_id: &str) -> Vec<ProfileRow> {
        let mut rows = Vec::new();
        for line in topology.get_lines(line_id) {
            for (position, pair) in line.stations.windows(2).enumerate() {
                rows.push(ProfileRow {
                    line_name: line.line_name.clone(),
                    position,
                    origin_station: pair[0].clone(),
                    destination_station: pair[1].clone(),
                    trip_count: self.get(&NodeKey::new(line_id, &pair[0]), &NodeKey::new(line_id, &pair[1])),
                });
            }
        }
        rows
    }
}
