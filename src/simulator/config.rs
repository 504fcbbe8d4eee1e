//! Simulation configuration.

/// Configuration for a simulation run.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Number of playthroughs to perform
    pub num_runs: u32,

    /// Random seed for reproducibility (None = random)
    pub seed: Option<u64>,

    /// Story resumes plus combat actions allowed before a run times out
    pub max_actions_per_run: u32,

    /// Log verbosity (0 = silent, 1 = summary, 2 = per run)
    pub verbosity: u8,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            num_runs: 100,
            seed: None,
            max_actions_per_run: 10_000,
            verbosity: 1,
        }
    }
}

impl SimConfig {
    /// Small seeded batch for quick balance checks.
    pub fn quick(seed: u64) -> Self {
        Self {
            num_runs: 10,
            seed: Some(seed),
            verbosity: 0,
            ..Default::default()
        }
    }
}
