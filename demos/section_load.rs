use railflow::{HourWindow, OdDecomposition, Router, SectionLoad};

use dev_utils::get_example_scenario;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let (config, topology, network, trips) = get_example_scenario(20_000);
    network.print_stats();

    let router = Router::new(&network, &config);
    let paths = router.route_all(&trips);
    for (od, outcome) in paths.unresolved().iter().take(5) {
        println!("Unresolved: {} -> {} ({outcome:?})", od.origin, od.destination);
    }

    // The 8 o'clock peak, expanded from a 4% sample.
    let peak = HourWindow::hour(8);
    let decomposition = OdDecomposition::new(&network, &paths);
    let load = decomposition.aggregate(trips.iter().filter(|trip| peak.contains(trip)));
    println!(
        "{} trips in the peak hour, {} unresolved.",
        load.total_trips(),
        load.unresolved_trips
    );

    let mut rows = load.scaled(25.0);
    rows.sort_by(|a, b| b.trip_count.total_cmp(&a.trip_count));
    println!();
    println!("Busiest sections:");
    for row in rows.iter().take(10) {
        println!("{} -> {}: {}", row.origin, row.destination, row.trip_count);
    }

    println!();
    println!("2号线 profile:");
    for row in load.line_profile(&topology, "2号线") {
        println!(
            "{} #{:02} {} -> {}: {}",
            row.line_name, row.position, row.origin_station, row.destination_station, row.trip_count
        );
    }

    // Same table straight from the path table.
    let direct = SectionLoad::aggregate(&network, &paths, trips.iter().filter(|trip| peak.contains(trip)));
    assert_eq!(direct, load);

    Ok(())
}
