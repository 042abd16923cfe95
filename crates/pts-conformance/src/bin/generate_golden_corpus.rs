#![forbid(unsafe_code)]

use pts_conformance::log::init_logging;
use pts_conformance::{HarnessConfig, HarnessError, generate_golden_corpus};

fn main() {
    if let Err(err) = run() {
        match &err {
            HarnessError::Mismatch(bundle) => eprintln!("{bundle}"),
            other => eprintln!("generate_golden_corpus failed: {other}"),
        }
        eprintln!("reason_code={}", err.reason_code());
        std::process::exit(1);
    }
}

fn run() -> Result<(), HarnessError> {
    let verbose = std::env::args().skip(1).any(|arg| arg == "-v" || arg == "--verbose");
    init_logging(verbose)?;

    let cfg = HarnessConfig::default_paths();
    let summary = generate_golden_corpus(&cfg)?;

    for wave in &summary.build.waves {
        if let Some(timing) = &wave.timing {
            for solver in [&timing.lhs, &timing.rhs] {
                println!(
                    "{} {}: p50={:.2}ms max={:.2}ms",
                    wave.tier, solver.solver, solver.percentiles.p50_ms, solver.percentiles.max_ms
                );
            }
        }
    }
    println!(
        "generated {} cases ({} manual)",
        summary.persisted.case_count, summary.build.manual_cases
    );
    println!(
        "wrote {} sha256={}",
        summary.persisted.path.display(),
        summary.persisted.sha256
    );
    Ok(())
}
