pub mod config;

pub use config::FlowConfig;

pub mod topology;

pub use topology::{StationRecord, Topology, TopologyError};

pub mod network;

pub use network::{EdgeKind, Network, NodeKey};

pub mod path;

pub use path::Path;

pub mod dijkstra;

pub use dijkstra::dijkstra_query;

pub mod trip;

pub use trip::{HourWindow, OdKey, TapEvent, Trip, TripResolver};

pub mod router;

pub use router::{PathTable, RouteOutcome, Router};

pub mod aggregate;

pub use aggregate::{OdDecomposition, SectionLoad};

pub mod utils;
