use clap::Parser;
use robin_hash::HashMap;

#[derive(Parser, Debug)]
struct Args {
    /// Number of entries to insert.
    #[arg(short = 'n', long = "count", default_value_t = 1000)]
    count: usize,

    /// Fraction of the entries to remove again after filling.
    #[arg(short = 'r', long = "remove_fraction", default_value_t = 0.0)]
    remove_fraction: f64,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    println!("Filling HashMap with {} u64 keys...", args.count);

    let mut map: HashMap<u64, u64> = HashMap::new();
    for i in 0..args.count as u64 {
        assert!(map.insert(i, i), "key {} inserted twice", i);
    }

    println!("Inserted {} entries, capacity {}", map.len(), map.capacity());
    map.probe_histogram().print();
    map.debug_stats().print();

    let to_remove = (args.count as f64 * args.remove_fraction.clamp(0.0, 1.0)) as u64;
    if to_remove > 0 {
        for i in 0..to_remove {
            map.remove(&i);
        }
        println!();
        println!(
            "Removed {} entries, {} left, capacity {}",
            to_remove,
            map.len(),
            map.capacity()
        );
        map.probe_histogram().print();
        map.debug_stats().print();
    }

    if !map.is_empty() {
        println!(
            "Final load factor: {:.2}%",
            (map.len() as f64 / map.capacity() as f64) * 100.0
        );
    }
}
