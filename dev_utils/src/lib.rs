use chrono::{NaiveDate, NaiveTime};
use railflow::{FlowConfig, Network, StationRecord, TapEvent, Topology, Trip, TripResolver};

// Common example data for the demos and benchmarks: a slice of the Shanghai metro and random smart-card taps over it.

const LINE_1: &[&str] = &[
    "莘庄", "外环路", "莲花路", "锦江乐园", "上海南站", "漕宝路", "上海体育馆", "徐家汇", "衡山路", "常熟路", "陕西南路", "黄陂南路",
    "人民广场", "新闸路", "汉中路", "上海火车站",
];
const LINE_2: &[&str] = &[
    "徐泾东", "虹桥火车站", "虹桥2号航站楼", "淞虹路", "北新泾", "威宁路", "娄山关路", "中山公园", "江苏路", "静安寺", "南京西路",
    "人民广场", "南京东路", "陆家嘴", "东昌路", "世纪大道",
];
const LINE_3: &[&str] = &[
    "上海南站", "石龙路", "龙漕路", "漕溪路", "宜山路", "虹桥路", "延安西路", "中山公园", "金沙江路", "曹杨路", "镇坪路", "中潭路",
    "上海火车站", "宝山路", "东宝兴路", "虹口足球场", "赤峰路", "大柏树", "江湾镇", "殷高西路", "长江南路", "淞发路", "张华浜", "淞滨路",
];
const LINE_4: &[&str] = &[
    "宜山路", "虹桥路", "延安西路", "中山公园", "金沙江路", "曹杨路", "镇坪路", "中潭路", "上海火车站", "宝山路", "海伦路", "临平路",
    "大连路", "杨树浦路", "浦东大道", "世纪大道", "浦电路", "蓝村路", "塘桥", "南浦大桥", "西藏南路", "鲁班路", "大木桥路", "东安路",
    "上海体育场", "上海体育馆",
];
const LINE_5: &[&str] = &["莘庄", "春申路", "银都路", "颛桥", "北桥", "剑川路", "东川路", "金平路", "华宁路", "文井路", "闵行开发区"];
const LINE_5_BRANCH: &[&str] = &["东川路", "江川路", "西渡", "萧塘", "奉浦大道", "环城东路", "望园路", "金海湖", "奉贤新城"];
const LINE_9: &[&str] = &["漕河泾开发区", "桂林路", "宜山路", "徐家汇", "肇嘉浜路", "嘉善路", "打浦桥", "马当路", "陆家浜路"];

// Known differences between fare-system and topology station names.
pub const STATION_CORRECTIONS: &[(&str, &str)] = &[
    ("淞浜路", "淞滨路"),
    ("上海大学站", "上海大学"),
    ("上海野生动物园", "野生动物园"),
    ("外高桥保税区北", "外高桥保税区北站"),
    ("外高桥保税区南", "外高桥保税区南站"),
    ("李子园路", "李子园"),
];

pub fn get_example_config() -> FlowConfig {
    FlowConfig::default()
        .with_branch_line("5号线支线", "5号线")
        .with_ring_line("4号线")
        .with_station_corrections(STATION_CORRECTIONS.iter().copied())
        .with_rail_mode("地铁")
}

fn push_line(records: &mut Vec<StationRecord>, line_name: &str, stations: &[&str]) {
    for (i, station) in stations.iter().enumerate() {
        records.push(StationRecord::new(station, line_name, i as u32 + 1));
    }
}

// Both directions of every line, named the way the map provider names them.
pub fn get_example_records() -> Vec<StationRecord> {
    let mut records = Vec::new();
    for (line, stations) in [
        ("地铁1号线", LINE_1),
        ("地铁2号线", LINE_2),
        ("地铁3号线", LINE_3),
        ("地铁5号线", LINE_5),
        ("地铁5号线支线", LINE_5_BRANCH),
        ("地铁9号线", LINE_9),
    ] {
        let (first, last) = (stations[0], stations[stations.len() - 1]);
        push_line(&mut records, &format!("{line}({first}-{last})"), stations);
        let reversed: Vec<&str> = stations.iter().rev().copied().collect();
        push_line(&mut records, &format!("{line}({last}-{first})"), &reversed);
    }
    push_line(&mut records, "地铁4号线(内圈(宜山路-宜山路))", LINE_4);
    let outer: Vec<&str> = LINE_4[..1].iter().chain(LINE_4[1..].iter().rev()).copied().collect();
    push_line(&mut records, "地铁4号线(外圈(宜山路-宜山路))", &outer);
    records
}

pub fn build_example_network(config: &FlowConfig) -> (Topology, Network) {
    let topology = Topology::load(&get_example_records(), config).unwrap();
    let network = Network::new(&topology, config).unwrap();
    (topology, network)
}

pub fn get_example_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2015, 4, 1).unwrap()
}

fn tap(card_id: &str, seconds: u32, station: String, mode: &str, fare: f64) -> TapEvent {
    TapEvent {
        card_id: card_id.to_owned(),
        date: get_example_date(),
        time: NaiveTime::from_num_seconds_from_midnight_opt(seconds.min(86_399), 0).unwrap(),
        station,
        mode: mode.to_owned(),
        fare,
        kind: "非优惠".to_owned(),
    }
}

// Fare-system station string for a topology station, misspelt the way the fare system sometimes does.
fn fare_station(line_id: &str, station: &str) -> String {
    let station = STATION_CORRECTIONS
        .iter()
        .find(|(_, correct)| *correct == station)
        .map(|(misspelt, _)| *misspelt)
        .unwrap_or(station);
    format!("{line_id}{station}")
}

// Random taps over the example network: mostly complete metro trips, plus some bus taps and lost exits.
pub fn generate_example_taps(topology: &Topology, num_cards: usize, seed: u64) -> Vec<TapEvent> {
    fastrand::seed(seed);
    let stations: Vec<(&str, &str)> = topology
        .lines
        .iter()
        .flat_map(|line| line.stations.iter().map(move |station| (line.line_id.as_str(), station.as_str())))
        .collect();

    let mut taps = Vec::new();
    for card in 0..num_cards {
        let card_id = format!("{:010}", 2_000_000_000 + card);
        let mut seconds = fastrand::u32(6 * 3600..10 * 3600);
        for _ in 0..fastrand::usize(1..=3) {
            let (o_line, o_station) = stations[fastrand::usize(..stations.len())];
            let (d_line, d_station) = stations[fastrand::usize(..stations.len())];
            taps.push(tap(&card_id, seconds, fare_station(o_line, o_station), "地铁", 0.0));
            seconds += fastrand::u32(10 * 60..70 * 60);
            // Roughly one in twenty exits never gets recorded.
            if fastrand::u8(..20) > 0 {
                let fare = 3.0 + fastrand::u8(..6) as f64;
                taps.push(tap(&card_id, seconds, fare_station(d_line, d_station), "地铁", fare));
            }
            if fastrand::bool() {
                seconds += fastrand::u32(5 * 60..30 * 60);
                taps.push(tap(&card_id, seconds, format!("{}路", fastrand::u32(1..1000)), "公交", 2.0));
            }
            seconds += fastrand::u32(30 * 60..4 * 3600);
        }
    }
    taps
}

pub fn get_example_scenario(num_cards: usize) -> (FlowConfig, Topology, Network, Vec<Trip>) {
    let config = get_example_config();
    let (topology, network) = build_example_network(&config);
    let taps = generate_example_taps(&topology, num_cards, 7);
    let (trips, _) = TripResolver::new(&config).resolve(&taps);
    (config, topology, network, trips)
}
