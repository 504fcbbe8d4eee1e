//! Simulation report generation.

use super::runner::RunStats;
use crate::core::constants::PHASE_COUNT;
use std::collections::BTreeMap;

/// Aggregated results from multiple simulation runs.
#[derive(Debug, Clone)]
pub struct SimReport {
    pub num_runs: u32,
    pub runs_completed: u32,
    pub runs_defeated: u32,
    pub runs_timed_out: u32,

    // Aggregated stats
    pub avg_final_level: f64,
    pub avg_final_gold: f64,
    pub avg_encounters_won: f64,
    pub avg_rounds_fought: f64,
    pub avg_items_used: f64,

    // Distribution data
    pub level_distribution: BTreeMap<u32, u32>,
    /// Runs that reached each phase, indexed by phase.
    pub phase_reached: Vec<u32>,
    /// Defeats per phase, indexed by phase.
    pub defeats_per_phase: Vec<u32>,

    // Individual run stats for detailed analysis
    pub run_stats: Vec<RunStats>,
}

fn average(runs: &[RunStats], value: impl Fn(&RunStats) -> f64) -> f64 {
    if runs.is_empty() {
        return 0.0;
    }
    runs.iter().map(value).sum::<f64>() / runs.len() as f64
}

impl SimReport {
    /// Create a new report from completed run stats.
    pub fn from_runs(runs: Vec<RunStats>) -> Self {
        let num_runs = runs.len() as u32;
        let runs_completed = runs.iter().filter(|r| r.completed).count() as u32;
        let runs_defeated = runs.iter().filter(|r| r.defeated_in.is_some()).count() as u32;
        let runs_timed_out = runs.iter().filter(|r| r.timed_out).count() as u32;

        let mut level_distribution = BTreeMap::new();
        let mut phase_reached = vec![0; PHASE_COUNT];
        let mut defeats_per_phase = vec![0; PHASE_COUNT];
        for run in &runs {
            *level_distribution.entry(run.final_level).or_insert(0) += 1;
            let last = (run.final_phase as usize).min(PHASE_COUNT - 1);
            for reached in phase_reached.iter_mut().take(last + 1) {
                *reached += 1;
            }
            if let Some(phase) = run.defeated_in {
                if let Some(count) = defeats_per_phase.get_mut(phase as usize) {
                    *count += 1;
                }
            }
        }

        Self {
            num_runs,
            runs_completed,
            runs_defeated,
            runs_timed_out,
            avg_final_level: average(&runs, |r| r.final_level as f64),
            avg_final_gold: average(&runs, |r| r.final_gold as f64),
            avg_encounters_won: average(&runs, |r| r.encounters_won as f64),
            avg_rounds_fought: average(&runs, |r| r.rounds_fought as f64),
            avg_items_used: average(&runs, |r| r.items_used as f64),
            level_distribution,
            phase_reached,
            defeats_per_phase,
            run_stats: runs,
        }
    }

    /// Share of runs that finished the story, 0.0 to 1.0.
    pub fn completion_rate(&self) -> f64 {
        if self.num_runs == 0 {
            return 0.0;
        }
        self.runs_completed as f64 / self.num_runs as f64
    }

    /// Generate a text report.
    pub fn to_text(&self) -> String {
        let mut report = String::new();

        report.push_str("═══════════════════════════════════════════════════════════════\n");
        report.push_str("                    SIMULATION REPORT\n");
        report.push_str("═══════════════════════════════════════════════════════════════\n\n");

        report.push_str(&format!(
            "Runs: {} total, {} completed ({:.1}%), {} defeated, {} timed out\n\n",
            self.num_runs,
            self.runs_completed,
            self.completion_rate() * 100.0,
            self.runs_defeated,
            self.runs_timed_out
        ));

        report.push_str("── PROGRESSION ──────────────────────────────────────────────────\n");
        report.push_str(&format!(
            "  Avg Final Level:     {:.1}\n",
            self.avg_final_level
        ));
        report.push_str(&format!(
            "  Avg Final Gold:      {:.0}\n",
            self.avg_final_gold
        ));
        report.push_str(&format!(
            "  Avg Encounters Won:  {:.1}\n",
            self.avg_encounters_won
        ));
        report.push_str(&format!(
            "  Avg Rounds Fought:   {:.1}\n",
            self.avg_rounds_fought
        ));
        report.push_str(&format!(
            "  Avg Items Used:      {:.1}\n\n",
            self.avg_items_used
        ));

        report.push_str("── PHASE REACHED ────────────────────────────────────────────────\n");
        for (phase, reached) in self.phase_reached.iter().enumerate() {
            let pct = if self.num_runs == 0 {
                0.0
            } else {
                (*reached as f64 / self.num_runs as f64) * 100.0
            };
            let bar: String = "█".repeat((pct / 5.0) as usize);
            report.push_str(&format!(
                "  Phase {:2}: {:>5.1}% {:<20} {} defeats\n",
                phase + 1,
                pct,
                bar,
                self.defeats_per_phase.get(phase).copied().unwrap_or(0)
            ));
        }
        report.push('\n');

        report.push_str("── FINAL LEVELS ─────────────────────────────────────────────────\n");
        for (level, count) in &self.level_distribution {
            report.push_str(&format!("  Level {:2}: {} runs\n", level, count));
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(final_phase: u8, level: u32, defeated: bool) -> RunStats {
        RunStats {
            completed: !defeated && final_phase as usize == PHASE_COUNT - 1,
            defeated_in: defeated.then_some(final_phase),
            final_phase,
            final_level: level,
            encounters_won: 3,
            ..Default::default()
        }
    }

    #[test]
    fn test_from_runs_aggregates() {
        let report = SimReport::from_runs(vec![run(9, 12, false), run(2, 4, true), run(2, 5, true)]);
        assert_eq!(report.num_runs, 3);
        assert_eq!(report.runs_completed, 1);
        assert_eq!(report.runs_defeated, 2);
        assert_eq!(report.phase_reached[0], 3);
        assert_eq!(report.phase_reached[2], 3);
        assert_eq!(report.phase_reached[3], 1);
        assert_eq!(report.defeats_per_phase[2], 2);
        assert_eq!(report.level_distribution.get(&4), Some(&1));
        assert!((report.avg_encounters_won - 3.0).abs() < f64::EPSILON);
        assert!((report.avg_final_level - 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_report() {
        let report = SimReport::from_runs(Vec::new());
        assert_eq!(report.completion_rate(), 0.0);
        assert!(report.to_text().contains("Runs: 0 total"));
    }

    #[test]
    fn test_text_lists_every_phase() {
        let report = SimReport::from_runs(vec![run(9, 12, false)]);
        let text = report.to_text();
        assert!(text.contains("Phase  1"));
        assert!(text.contains("Phase 10"));
        assert!(text.contains("100.0%"));
    }
}
