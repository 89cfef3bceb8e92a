use std::time::Instant;
use tracing::{error, info, warn};

use jx_logging::init::init_tracing_from_env;

fn main() {
    if let Err(e) = init_tracing_from_env() {
        eprintln!("tracing subscriber already installed: {}", e);
        return;
    }

    info!("starting service");
    warn!(user_id = 42, reason = "invalid password", "authentication failed");

    let n: u64 = 10_000;
    let start = Instant::now();
    for i in 0..n {
        error!(iteration = i, "load test error");
    }
    let elapsed = start.elapsed();

    println!(
        "sent {} events in {:?} (~{:.0} ev/s)",
        n,
        elapsed,
        n as f64 / elapsed.as_secs_f64()
    );
}
