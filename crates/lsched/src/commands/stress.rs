//! Stress command: many random schedules per block, each checked.

use std::path::Path;

use lsched::{BlockScheduler, MachFunction, OpcodeInfo, OpcodeTable, SchedConfig, verify_schedule};
use rayon::prelude::*;
use tracing::{debug, error, info, warn};

use crate::cli::{ArchArg, EXIT_FAILURE, EXIT_SUCCESS};

/// A stress schedule that failed a check.
struct Failure {
    seed: u64,
    function: String,
    block: String,
    message: String,
}

/// Handle the `stress` command.
pub fn cmd_stress(input: &Path, arch: ArchArg, seeds: u64, start_seed: u64, jobs: usize) -> i32 {
    info!(input = %input.display(), arch = ?arch, seeds, start_seed, "stress testing");

    let funcs = match lsched::load_listing(input) {
        Ok(funcs) => funcs,
        Err(e) => {
            error!(error = %e, "failed to load listing");
            return EXIT_FAILURE;
        }
    };

    let table = arch.table();
    if !table.scheduler_supported() {
        warn!(arch = %table.arch(), "target has no latency model, nothing to schedule");
        return EXIT_SUCCESS;
    }

    let job_count = if jobs == 0 { num_cpus::get() } else { jobs };
    let pool = match rayon::ThreadPoolBuilder::new().num_threads(job_count).build() {
        Ok(pool) => pool,
        Err(e) => {
            error!(error = %e, "failed to create thread pool");
            return EXIT_FAILURE;
        }
    };
    debug!(jobs = job_count, "thread pool ready");

    let end = start_seed.saturating_add(seeds);
    let failures: Vec<Failure> = pool.install(|| {
        (start_seed..end)
            .into_par_iter()
            .flat_map_iter(|seed| stress_seed(&table, &funcs, seed))
            .collect()
    });

    for failure in &failures {
        error!(
            seed = failure.seed,
            function = %failure.function,
            block = %failure.block,
            "{}",
            failure.message
        );
    }

    if failures.is_empty() {
        info!(seeds, "all schedules valid");
        EXIT_SUCCESS
    } else {
        error!(failures = failures.len(), "stress test failed");
        EXIT_FAILURE
    }
}

/// Schedule every block with one seed and check each schedule.
fn stress_seed(table: &OpcodeTable, funcs: &[MachFunction], seed: u64) -> Vec<Failure> {
    let mut failures = Vec::new();
    for (i, func) in funcs.iter().enumerate() {
        let config = SchedConfig::stress(seed ^ i as u64).with_verify(false);
        let mut sched = BlockScheduler::new(table, &config);
        for block in &func.blocks {
            let schedule = sched.schedule(&block.insts);
            if let Err(violation) =
                verify_schedule(table, &block.insts, Some(sched.graph()), &schedule.order)
            {
                failures.push(Failure {
                    seed,
                    function: func.name.clone(),
                    block: block.label.clone(),
                    message: violation.to_string(),
                });
            }
        }
    }
    failures
}
