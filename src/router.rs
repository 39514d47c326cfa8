use std::collections::{BTreeSet, HashMap};

use log::{debug, info};
use rayon::prelude::*;

use crate::network::Network;
use crate::trip::{OdKey, Trip};
use crate::{FlowConfig, Path};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RouteOutcome {
    Found(Path),
    // Both nodes exist but nothing connects them.
    NoPath,
    // At least one node was never seen in the topology.
    UnknownNode,
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum RouteError {
    #[error("No path found from {0} to {1}.")]
    NoPath(String, String),
    #[error("Unknown node in OD pair {0} -> {1}.")]
    UnknownNode(String, String),
}

impl RouteOutcome {
    pub fn path(&self) -> Option<&Path> {
        match self {
            RouteOutcome::Found(path) => Some(path),
            _ => None,
        }
    }

    pub fn into_path(self) -> Option<Path> {
        match self {
            RouteOutcome::Found(path) => Some(path),
            _ => None,
        }
    }

    pub fn is_resolved(&self) -> bool { matches!(self, RouteOutcome::Found(_)) }

    pub fn into_result(self, od: &OdKey) -> Result<Path, RouteError> {
        match self {
            RouteOutcome::Found(path) => Ok(path),
            RouteOutcome::NoPath => Err(RouteError::NoPath(od.origin.to_string(), od.destination.to_string())),
            RouteOutcome::UnknownNode => Err(RouteError::UnknownNode(od.origin.to_string(), od.destination.to_string())),
        }
    }
}

// Route outcome per distinct OD pair, filled in before anyone reads it.
#[derive(Default)]
pub struct PathTable {
    outcomes: HashMap<OdKey, RouteOutcome>,
}

impl PathTable {
    pub fn get(&self, od: &OdKey) -> Option<&RouteOutcome> { self.outcomes.get(od) }

    pub fn get_path(&self, od: &OdKey) -> Option<&Path> { self.get(od).and_then(RouteOutcome::path) }

    pub fn len(&self) -> usize { self.outcomes.len() }

    pub fn is_empty(&self) -> bool { self.outcomes.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = (&OdKey, &RouteOutcome)> { self.outcomes.iter() }

    pub fn num_found(&self) -> usize { self.outcomes.values().filter(|outcome| outcome.is_resolved()).count() }

    pub fn num_no_path(&self) -> usize { self.outcomes.values().filter(|outcome| **outcome == RouteOutcome::NoPath).count() }

    pub fn num_unknown_node(&self) -> usize {
        self.outcomes.values().filter(|outcome| **outcome == RouteOutcome::UnknownNode).count()
    }

    // The OD pairs that could not be routed, in key order.
    pub fn unresolved(&self) -> Vec<(&OdKey, &RouteOutcome)> {
        let mut unresolved: Vec<_> = self.outcomes.iter().filter(|(_, outcome)| !outcome.is_resolved()).collect();
        unresolved.sort_by(|a, b| a.0.cmp(b.0));
        unresolved
    }
}

pub struct Router<'a> {
    network: &'a Network,
    max_visited: Option<usize>,
    cache: HashMap<OdKey, RouteOutcome>,
}

impl<'a> Router<'a> {
    pub fn new(network: &'a Network, config: &FlowConfig) -> Self {
        Self {
            network,
            max_visited: config.max_visited,
            cache: HashMap::new(),
        }
    }

    fn compute(&self, od: &OdKey) -> RouteOutcome {
        self.network.shortest_path(&od.origin, &od.destination, self.max_visited)
    }

    // Route one OD pair, computing it at most once.
    pub fn route(&mut self, od: &OdKey) -> &RouteOutcome {
        if !self.cache.contains_key(od) {
            let outcome = self.compute(od);
            self.cache.insert(od.clone(), outcome);
        }
        &self.cache[od]
    }

    pub fn num_cached(&self) -> usize { self.cache.len() }

    // Route every distinct OD pair among the trips, in parallel. Each worker reads the shared network;
    // results are only gathered into the table once all of them are done.
    pub fn route_all<'t>(&self, trips: impl IntoIterator<Item = &'t Trip>) -> PathTable {
        let distinct: BTreeSet<&OdKey> = trips.into_iter().map(|trip| &trip.od).collect();
        debug!("Routing {} distinct OD pairs.", distinct.len());

        let outcomes: HashMap<OdKey, RouteOutcome> = distinct
            .into_iter()
            .collect::<Vec<_>>()
            .into_par_iter()
            .map(|od| {
                let outcome = match self.cache.get(od) {
                    Some(outcome) => outcome.clone(),
                    None => self.compute(od),
                };
                (od.clone(), outcome)
            })
            .collect();

        let table = PathTable { outcomes };
        info!(
            "Routed {} OD pairs: {} found, {} without a path, {} with an unknown node.",
            table.len(),
            table.num_found(),
            table.num_no_path(),
            table.num_unknown_node()
        );
        table
    }
}

#[cfg(test)]
mod test {
    use chrono::NaiveDate;

    use super::*;
    use crate::network::NodeKey;
    use crate::topology::{StationRecord, Topology};

    fn network(config: &FlowConfig) -> Network {
        let records = vec![
            StationRecord::new("S1", "1号线", 1),
            StationRecord::new("S2", "1号线", 2),
            StationRecord::new("S3", "1号线", 3),
            StationRecord::new("S3", "2号线", 1),
            StationRecord::new("S4", "2号线", 2),
            StationRecord::new("S8", "8号线", 1),
            StationRecord::new("S9", "8号线", 2),
        ];
        let topology = Topology::load(&records, config).expect("valid topology");
        Network::new(&topology, config).expect("non-empty network")
    }

    fn od(origin: (&str, &str), destination: (&str, &str)) -> OdKey {
        OdKey::new(NodeKey::new(origin.0, origin.1), NodeKey::new(destination.0, destination.1))
    }

    fn trip(od: OdKey) -> Trip {
        let departure = NaiveDate::from_ymd_opt(2015, 4, 1).and_then(|date| date.and_hms_opt(8, 0, 0)).expect("valid datetime");
        Trip {
            card_id: "1".to_owned(),
            od,
            departure,
            arrival: departure,
            fare: 3.0,
        }
    }

    #[test]
    fn test_tri_state_outcomes() {
        let config = FlowConfig::default();
        let network = network(&config);
        let mut router = Router::new(&network, &config);

        let found = od(("1号线", "S1"), ("2号线", "S4"));
        let path = router.route(&found).path().expect("connected").clone();
        assert_eq!(path.weight(), 14);
        assert_eq!(path.nodes().len(), 5);

        let disconnected = od(("1号线", "S1"), ("8号线", "S9"));
        assert_eq!(router.route(&disconnected), &RouteOutcome::NoPath);

        let unknown = od(("1号线", "S1"), ("3号线", "S1"));
        assert_eq!(router.route(&unknown), &RouteOutcome::UnknownNode);
        assert_eq!(
            router.route(&unknown).clone().into_result(&unknown),
            Err(RouteError::UnknownNode("1号线S1".to_owned(), "3号线S1".to_owned()))
        );
    }

    #[test]
    fn test_route_is_memoised() {
        let config = FlowConfig::default();
        let network = network(&config);
        let mut router = Router::new(&network, &config);
        let key = od(("1号线", "S1"), ("1号线", "S3"));
        let first = router.route(&key).clone();
        let second = router.route(&key).clone();
        assert_eq!(first, second);
        assert_eq!(router.num_cached(), 1);
    }

    #[test]
    fn test_visited_cap_gives_no_path() {
        let config = FlowConfig::default().with_max_visited(1);
        let network = network(&config);
        let mut router = Router::new(&network, &config);
        assert_eq!(router.route(&od(("1号线", "S1"), ("2号线", "S4"))), &RouteOutcome::NoPath);
        assert!(router.route(&od(("1号线", "S1"), ("1号线", "S2"))).is_resolved());
    }

    #[test]
    fn test_route_all_covers_distinct_pairs() {
        let config = FlowConfig::default();
        let network = network(&config);
        let router = Router::new(&network, &config);

        let trips = vec![
            trip(od(("1号线", "S1"), ("2号线", "S4"))),
            trip(od(("1号线", "S1"), ("2号线", "S4"))),
            trip(od(("1号线", "S2"), ("1号线", "S1"))),
            trip(od(("1号线", "S1"), ("8号线", "S8"))),
            trip(od(("", "磁悬浮"), ("1号线", "S1"))),
        ];
        let table = router.route_all(&trips);

        assert_eq!(table.len(), 4);
        assert_eq!(table.num_found(), 2);
        assert_eq!(table.num_no_path(), 1);
        assert_eq!(table.num_unknown_node(), 1);
        assert_eq!(table.unresolved().len(), 2);

        // Matches the sequential router.
        let mut sequential = Router::new(&network, &config);
        for (key, outcome) in table.iter() {
            assert_eq!(sequential.route(key), outcome);
        }
    }
}
