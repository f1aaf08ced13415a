//! Runnable example exercising `api::generate` against demo data, printing
//! the resulting schedule and its quality score. Mirrors the teacher's
//! `src/bin/bench.rs` as a non-HTTP demonstration binary, but against the
//! `generate`/`quality::score` surface instead of incremental scoring.
//!
//! Run with: cargo run --bin demo -- [SMALL|LARGE]

use std::str::FromStr;

use chrono::NaiveDate;
use grundschule_timetabler::api::{self, SolveConfigDto};
use grundschule_timetabler::demo_data::{self, DemoData};

fn main() {
    tracing_subscriber::fmt::init();

    let size = std::env::args()
        .nth(1)
        .and_then(|s| DemoData::from_str(&s).ok())
        .unwrap_or(DemoData::Small);

    tracing::info!(size = size.as_str(), "generating demo instance");
    let (_, entities) = demo_data::generate(size);

    let config = SolveConfigDto {
        time_limit_seconds: 20.0,
        reference_date: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
        ..Default::default()
    };

    match api::generate(&entities, &config) {
        Ok(result) => {
            println!("solved with {} lessons placed", result.schedule.len());
            println!("objective value: {:?}", result.objective_value);
            println!("quality score: {:.1}/100", result.quality.total);
            println!(
                "  availability {:.0} qualification {:.0} timing {:.0} workload {:.0} efficiency {:.0} compliance {:.0}",
                result.quality.availability,
                result.quality.qualification,
                result.quality.timing,
                result.quality.workload,
                result.quality.efficiency,
                result.quality.compliance,
            );
        }
        Err(err) => {
            tracing::error!(error = %err, "solve failed");
            std::process::exit(1);
        }
    }
}
