use clap::Parser;
use flat_multimap::HashMap;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;

#[derive(Parser, Debug)]
struct Args {
    #[arg(short = 'c', long = "target_capacity", default_value_t = 10)]
    target_capacity: usize,

    #[arg(short = 'n', long = "inserts", default_value_t = 100_000)]
    inserts: usize,

    #[arg(short = 'v', long = "values_per_key", default_value_t = 10)]
    values_per_key: usize,

    /// Ratio between gets and inserts: 0 means only inserts, 1 only gets.
    #[arg(short = 'g', long = "get_ratio", default_value_t = 0.7)]
    get_ratio: f64,
}

const BATCH_SIZE: usize = 10_000;

fn main() {
    let args = Args::parse();
    let every = (BATCH_SIZE / args.values_per_key.max(1)).max(1);

    println!(
        "Creating HashMap<(i32, i64)> with target capacity: {}",
        args.target_capacity
    );

    let mut map: HashMap<(i32, i64)> = HashMap::with_capacity(args.target_capacity);
    let mut rng = SmallRng::from_os_rng();

    let mut inserted = 0usize;
    let mut gets = 0usize;
    let mut fetched = 0usize;
    let mut buf = Vec::new();

    while inserted < args.inserts {
        if rng.random::<f64>() < args.get_ratio {
            gets += 1;
            fetched += map.get_into(0, &mut buf);
            continue;
        }

        let batch = inserted / BATCH_SIZE;
        let offset = inserted % BATCH_SIZE;
        let key = (batch * BATCH_SIZE + offset % every) as i64;
        let value = (inserted as i32, inserted as i64);
        if let Err(err) = map.insert(key, &value) {
            eprintln!("insert {inserted} failed: {err}");
            std::process::exit(2);
        }
        inserted += 1;
    }

    println!("Inserted {} values, did {} gets ({} values fetched)", map.len(), gets, fetched);
    println!("Final capacity: {}", map.capacity());
    println!(
        "Final load factor: {:.2}%",
        (map.len() as f64 / map.capacity() as f64) * 100.0
    );

    let table = map.as_table();
    table.print_probe_histogram();
    table.debug_stats().print();
}
