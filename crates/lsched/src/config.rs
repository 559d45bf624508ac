//! Scheduler configuration.

/// Ready-queue strategy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Strategy {
    /// Longest remaining dependency chain first; ties go to program order.
    #[default]
    CriticalPath,
    /// Uniformly random among ready nodes. For testing only.
    Stress,
}

/// Scheduler configuration, owned by the compilation pipeline.
#[derive(Clone, Debug)]
pub struct SchedConfig {
    /// Ready-queue strategy.
    pub strategy: Strategy,
    /// Seed for the stress strategy.
    pub seed: u64,
    /// Check every schedule against the ordering invariants and panic on violation.
    pub verify: bool,
    /// Forward scheduling events to `tracing` at TRACE level.
    pub trace: bool,
}

impl Default for SchedConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::CriticalPath,
            seed: 0,
            verify: cfg!(debug_assertions),
            trace: false,
        }
    }
}

impl SchedConfig {
    /// Stress configuration with the given seed.
    #[must_use]
    pub fn stress(seed: u64) -> Self {
        Self {
            strategy: Strategy::Stress,
            seed,
            ..Default::default()
        }
    }

    /// Set the strategy.
    #[must_use]
    pub const fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set the stress seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Enable or disable schedule verification.
    #[must_use]
    pub const fn with_verify(mut self, enabled: bool) -> Self {
        self.verify = enabled;
        self
    }

    /// Enable or disable event tracing.
    #[must_use]
    pub const fn with_trace(mut self, enabled: bool) -> Self {
        self.trace = enabled;
        self
    }
}
