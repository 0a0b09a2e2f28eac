//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `geoattend_core` linkage with an in-memory database.
//! - Print the reference geofence fixtures with deterministic formatting.
//! - Start file logging when an absolute log directory is passed as the
//!   first argument.

use geoattend_core::db::open_db_in_memory;
use geoattend_core::{default_log_level, init_logging_with, is_within, Coordinate, LoggingConfig};

fn main() {
    if let Some(log_dir) = std::env::args().nth(1) {
        let config = LoggingConfig::new(default_log_level(), log_dir);
        match init_logging_with(&config) {
            Ok(()) => println!("logging level={} log_dir={}", config.level, config.log_dir),
            Err(err) => {
                eprintln!("logging bootstrap=error {err}");
                std::process::exit(2);
            }
        }
    }

    println!("geoattend_core version={}", geoattend_core::core_version());

    let center = Coordinate::new(6.5244, 3.3792);
    for point in [Coordinate::new(6.5245, 3.3793), Coordinate::new(6.6, 3.3792)] {
        let (within, distance) = is_within(point, center, 100.0);
        println!(
            "fixture lat={} lon={} radius_m=100 within={} distance_m={:.1}",
            point.latitude, point.longitude, within, distance
        );
    }

    match open_db_in_memory() {
        Ok(_) => println!("db in-memory bootstrap=ok"),
        Err(err) => {
            eprintln!("db in-memory bootstrap=error {err}");
            std::process::exit(1);
        }
    }
}
