//! Scheduling metrics.
//!
//! Recorded through the `metrics` facade; the embedding application installs
//! a recorder if it wants them.

use metrics::{Unit, counter, describe_counter, describe_histogram, histogram};

use crate::scheduler::ScheduleStats;

/// Initialize metric descriptions.
///
/// Call this once at startup to register metric descriptions.
pub fn init() {
    describe_counter!(
        "lsched_blocks_scheduled_total",
        Unit::Count,
        "Basic blocks scheduled"
    );
    describe_counter!(
        "lsched_blocks_skipped_total",
        Unit::Count,
        "Basic blocks passed through on targets without a latency model"
    );
    describe_counter!(
        "lsched_instructions_scheduled_total",
        Unit::Count,
        "Instructions in scheduled blocks"
    );
    describe_counter!(
        "lsched_instructions_moved_total",
        Unit::Count,
        "Instructions whose position changed"
    );
    describe_histogram!(
        "lsched_stall_cycles",
        Unit::Count,
        "Estimated stall cycles per scheduled block"
    );
}

/// Record one scheduled block.
pub fn record_block(stats: &ScheduleStats, insts: usize) {
    counter!("lsched_blocks_scheduled_total").increment(1);
    counter!("lsched_instructions_scheduled_total").increment(insts as u64);
    counter!("lsched_instructions_moved_total").increment(stats.moved as u64);
    histogram!("lsched_stall_cycles").record(f64::from(stats.stall_cycles));
}

/// Record blocks skipped because the target is unsupported.
pub fn record_skipped(blocks: usize) {
    counter!("lsched_blocks_skipped_total").increment(blocks as u64);
}
