use bamboofilter::bamboo::BambooFilter;

fn main() {
    let mut filter = BambooFilter::builder()
        .initial_buckets(1024)
        .slots_per_bucket(4)
        .load_threshold(0.95)
        .max_evictions(500)
        .segment_size(8)
        .build()
        .unwrap();

    println!("Created Bamboo filter with {} buckets", filter.capacity());

    let items_to_insert = ["apple", "banana", "cherry", "date", "elderberry"];
    let items_to_check = ["apple", "banana", "fig", "grape"];

    println!("\nInserting items...");
    for item in items_to_insert {
        filter.insert(item);
        println!(
            "Inserted: {}, size: {}, load factor: {:.4}",
            item,
            filter.size(),
            filter.load_factor()
        );
    }

    println!("\nChecking items...");
    for item in items_to_check {
        if filter.contains(&item) {
            println!("'{}' is probably in the filter", item);
        } else {
            println!("'{}' is definitely NOT in the filter", item);
        }
    }

    // Push the filter past its threshold to watch it grow.
    println!("\nInserting 10,000 synthetic keys to trigger expansion...");
    for i in 0..10_000 {
        filter.insert(format!("synthetic-key-{}", i));
    }

    println!("Final size: {} items", filter.size());
    println!("Final bucket count: {}", filter.capacity());
    println!("Still migrating: {}", filter.is_expanding());
    println!("Migration drops: {}", filter.migration_drops());
    println!(
        "Estimated memory: {:.1} KB",
        filter.memory_usage() as f64 / 1024.0
    );
}
