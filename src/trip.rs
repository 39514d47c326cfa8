use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::network::NodeKey;
use crate::{utils, FlowConfig};

// A smart-card tap. Entry taps record a zero fare, exit taps the fare charged.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TapEvent {
    pub card_id: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    // Line and station together, e.g. "2号线人民广场".
    pub station: String,
    pub mode: String,
    pub fare: f64,
    #[serde(rename = "type")]
    pub kind: String,
}

impl TapEvent {
    pub fn datetime(&self) -> NaiveDateTime { self.date.and_time(self.time) }

    pub fn is_entry(&self) -> bool { self.fare == 0.0 }

    pub fn is_exit(&self) -> bool { self.fare > 0.0 }
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OdKey {
    pub origin: NodeKey,
    pub destination: NodeKey,
}

impl OdKey {
    pub fn new(origin: NodeKey, destination: NodeKey) -> Self { Self { origin, destination } }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    pub card_id: String,
    pub od: OdKey,
    pub departure: NaiveDateTime,
    pub arrival: NaiveDateTime,
    pub fare: f64,
}

impl Trip {
    pub fn origin(&self) -> &NodeKey { &self.od.origin }

    pub fn destination(&self) -> &NodeKey { &self.od.destination }

    pub fn departure_hour(&self) -> u32 { self.departure.hour() }
}

// Half-open range of departure hours, [start, end).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HourWindow {
    pub start: u32,
    pub end: u32,
}

impl HourWindow {
    pub fn new(start: u32, end: u32) -> Self { Self { start, end } }

    pub fn hour(hour: u32) -> Self { Self::new(hour, hour + 1) }

    pub fn contains(&self, trip: &Trip) -> bool { (self.start..self.end).contains(&trip.departure_hour()) }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResolveStats {
    pub events: usize,
    pub other_mode: usize,
    pub trips: usize,
    // Entry taps with no exit tap straight after on the same card.
    pub unmatched_entries: usize,
    // Exit taps with no entry tap straight before on the same card.
    pub unmatched_exits: usize,
}

pub struct TripResolver<'a> {
    config: &'a FlowConfig,
}

impl<'a> TripResolver<'a> {
    pub fn new(config: &'a FlowConfig) -> Self { Self { config } }

    // Node key for a fare-system station string. Never fails: unknown lines and stations make keys
    // that simply aren't in the network.
    pub fn node_key(&self, station: &str) -> NodeKey {
        let (line, station) = utils::split_fare_station(station.trim(), self.config.fare_line_delimiter);
        let line = line.trim();
        let line = self.config.branch_lines.get(line).map(String::as_str).unwrap_or(line);
        let station = self.config.correct_station(station.trim()).trim();
        NodeKey::new(line, station)
    }

    // Pair consecutive taps of the same card into trips: an entry (zero fare) followed by an exit
    // (positive fare). Anything else is dropped.
    pub fn resolve(&self, events: &[TapEvent]) -> (Vec<Trip>, ResolveStats) {
        let mut stats = ResolveStats { events: events.len(), ..Default::default() };

        let mut taps: Vec<&TapEvent> = events
            .iter()
            .filter(|event| match &self.config.rail_mode {
                Some(mode) => event.mode == *mode,
                None => true,
            })
            .collect();
        stats.other_mode = events.len() - taps.len();
        // Stable, so taps with identical timestamps keep their input order.
        taps.sort_by(|a, b| (&a.card_id, a.date, a.time).cmp(&(&b.card_id, b.date, b.time)));

        let mut trips = Vec::new();
        let mut paired_exit = false;
        for (i, tap) in taps.iter().enumerate() {
            let next = taps.get(i + 1).filter(|next| next.card_id == tap.card_id);
            if tap.is_exit() {
                if !paired_exit {
                    stats.unmatched_exits += 1;
                }
                paired_exit = false;
                continue;
            }
            paired_exit = false;
            if !tap.is_entry() {
                continue;
            }
            match next {
                Some(exit) if exit.is_exit() => {
                    trips.push(Trip {
                        card_id: tap.card_id.clone(),
                        od: OdKey::new(self.node_key(&tap.station), self.node_key(&exit.station)),
                        departure: tap.datetime(),
                        arrival: exit.datetime(),
                        fare: exit.fare,
                    });
                    paired_exit = true;
                }
                _ => stats.unmatched_entries += 1,
            }
        }
        stats.trips = trips.len();

        debug!("{stats:?}");
        info!("Resolved {} trips from {} tap events.", stats.trips, stats.events);
        (trips, stats)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::utils;

    fn tap(card_id: &str, time: &str, station: &str, fare: f64) -> TapEvent {
        TapEvent {
            card_id: card_id.to_owned(),
            date: utils::parse_date("2015-04-01").expect("valid date"),
            time: utils::parse_time(time).expect("valid time"),
            station: station.to_owned(),
            mode: "地铁".to_owned(),
            fare,
            kind: "非优惠".to_owned(),
        }
    }

    #[test]
    fn test_pairs_entry_with_exit() {
        let config = FlowConfig::default();
        let events = vec![
            tap("1001", "08:02:11", "1号线莘庄", 0.0),
            tap("1001", "08:31:40", "2号线人民广场", 4.0),
            tap("1001", "18:10:00", "2号线人民广场", 0.0),
            tap("1001", "18:41:00", "1号线莘庄", 4.0),
        ];
        let (trips, stats) = TripResolver::new(&config).resolve(&events);

        assert_eq!(trips.len(), 2);
        assert_eq!(trips[0].origin(), &NodeKey::new("1号线", "莘庄"));
        assert_eq!(trips[0].destination(), &NodeKey::new("2号线", "人民广场"));
        assert_eq!(trips[0].departure_hour(), 8);
        assert_eq!(trips[1].departure_hour(), 18);
        assert_eq!(stats.unmatched_entries + stats.unmatched_exits, 0);
    }

    #[test]
    fn test_taps_are_sorted_per_card() {
        let config = FlowConfig::default();
        let events = vec![
            tap("2", "09:30:00", "1号线徐家汇", 3.0),
            tap("1", "08:30:00", "1号线徐家汇", 3.0),
            tap("2", "09:00:00", "9号线宜山路", 0.0),
            tap("1", "08:00:00", "9号线宜山路", 0.0),
        ];
        let (trips, _) = TripResolver::new(&config).resolve(&events);
        assert_eq!(trips.len(), 2);
        assert_eq!(trips[0].card_id, "1");
        assert_eq!(trips[1].card_id, "2");
    }

    #[test]
    fn test_pairs_never_cross_cards() {
        let config = FlowConfig::default();
        let events = vec![tap("1", "08:00:00", "1号线莘庄", 0.0), tap("2", "08:20:00", "1号线外环路", 3.0)];
        let (trips, stats) = TripResolver::new(&config).resolve(&events);
        assert!(trips.is_empty());
        assert_eq!(stats.unmatched_entries, 1);
        assert_eq!(stats.unmatched_exits, 1);
    }

    #[test]
    fn test_malformed_pairs_are_dropped() {
        let config = FlowConfig::default();
        let events = vec![
            // Two entries in a row: only the second pairs up.
            tap("1", "07:00:00", "1号线莘庄", 0.0),
            tap("1", "07:05:00", "1号线莘庄", 0.0),
            tap("1", "07:30:00", "1号线外环路", 3.0),
            // Exit with no entry.
            tap("1", "12:00:00", "1号线外环路", 3.0),
        ];
        let (trips, stats) = TripResolver::new(&config).resolve(&events);
        assert_eq!(trips.len(), 1);
        assert_eq!(trips[0].departure.time(), utils::parse_time("07:05:00").expect("valid time"));
        assert_eq!(stats.unmatched_entries, 1);
        assert_eq!(stats.unmatched_exits, 1);
    }

    #[test]
    fn test_mode_filter() {
        let config = FlowConfig::default().with_rail_mode("地铁");
        let mut bus = tap("1", "08:10:00", "公交123路", 2.0);
        bus.mode = "公交".to_owned();
        let events = vec![tap("1", "08:00:00", "1号线莘庄", 0.0), bus, tap("1", "08:30:00", "1号线外环路", 3.0)];
        let (trips, stats) = TripResolver::new(&config).resolve(&events);
        assert_eq!(trips.len(), 1);
        assert_eq!(stats.other_mode, 1);
    }

    #[test]
    fn test_station_corrections_and_whitespace() {
        let config = FlowConfig::default().with_station_corrections([("淞浜路", "淞滨路"), ("上海大学站", "上海大学")]);
        let resolver = TripResolver::new(&config);
        assert_eq!(resolver.node_key("3号线淞浜路"), NodeKey::new("3号线", "淞滨路"));
        assert_eq!(resolver.node_key(" 7号线上海大学站 "), NodeKey::new("7号线", "上海大学"));
        assert_eq!(resolver.node_key("7号线 静安寺 "), NodeKey::new("7号线", "静安寺"));
    }

    #[test]
    fn test_unmapped_station_still_makes_a_trip() {
        let config = FlowConfig::default();
        let events = vec![tap("1", "08:00:00", "磁悬浮龙阳路", 0.0), tap("1", "08:10:00", "2号线龙阳路", 50.0)];
        let (trips, _) = TripResolver::new(&config).resolve(&events);
        assert_eq!(trips.len(), 1);
        assert_eq!(trips[0].origin(), &NodeKey::new("", "磁悬浮龙阳路"));
    }

    #[test]
    fn test_hour_window() {
        let config = FlowConfig::default();
        let events = vec![
            tap("1", "07:59:59", "1号线莘庄", 0.0),
            tap("1", "08:20:00", "1号线外环路", 3.0),
            tap("2", "08:00:00", "1号线莘庄", 0.0),
            tap("2", "08:20:00", "1号线外环路", 3.0),
        ];
        let (trips, _) = TripResolver::new(&config).resolve(&events);
        let peak = HourWindow::hour(8);
        assert_eq!(trips.iter().filter(|trip| peak.contains(trip)).count(), 1);
        assert_eq!(trips.iter().filter(|trip| HourWindow::new(7, 9).contains(trip)).count(), 2);
    }

    #[test]
    fn test_schema_requires_every_field() {
        let complete = r#"{"card_id": "1", "date": "2015-04-01", "time": "08:00:00", "station": "1号线莘庄", "mode": "地铁", "fare": 0.0, "type": "非优惠"}"#;
        let event: TapEvent = serde_json::from_str(complete).expect("valid event");
        assert!(event.is_entry());

        let missing_fare = r#"{"card_id": "1", "date": "2015-04-01", "time": "08:00:00", "station": "1号线莘庄", "mode": "地铁", "type": "非优惠"}"#;
        assert!(serde_json::from_str::<TapEvent>(missing_fare).is_err());
    }
}
