use railflow::TripResolver;

use dev_utils::{build_example_network, get_example_config};

// cargo run --example route_query -- 1号线莘庄 2号线世纪大道
fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let (Some(origin), Some(destination)) = (args.next(), args.next()) else {
        println!("Usage: route_query <origin> <destination>, e.g. 1号线莘庄 2号线世纪大道");
        return Ok(());
    };

    let config = get_example_config();
    let (_, network) = build_example_network(&config);
    network.print_stats();

    let resolver = TripResolver::new(&config);
    let od = railflow::OdKey::new(resolver.node_key(&origin), resolver.node_key(&destination));

    let query_start = std::time::Instant::now();
    let outcome = network.shortest_path(&od.origin, &od.destination, config.max_visited);
    println!("Query took {:?}", query_start.elapsed());

    let path = outcome.into_result(&od)?;
    println!("{}", path.display(&network));

    Ok(())
}
