use std::path::Path;

use workshop_bench::run_workshop;
use workshop_bench::workshop_config::FibonacciWorkload;

fn main() {
    let settings_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "workshop.json".to_string());

    if let Err(e) = run_workshop(&FibonacciWorkload, Path::new(&settings_path)) {
        eprintln!("Fatal error: {e}");
        std::process::exit(1);
    }
}
