//! Main simulation runner. Each run plays the built-in story through a real
//! `Session`; statistics are tracked externally from the returned events.

use super::autopilot::{choose_action, prepare};
use super::config::SimConfig;
use super::report::SimReport;
use crate::combat::types::{Action, CombatEvent, CombatantId};
use crate::content::builtin;
use crate::core::error::SessionError;
use crate::core::session::{Progress, Session};
use crate::story::types::{ResumePayload, StepDescriptor, StoryEvent};
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Outcome of a single playthrough.
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    pub completed: bool,
    /// Phase index the character fell in, if they did.
    pub defeated_in: Option<u8>,
    pub timed_out: bool,
    pub final_phase: u8,
    pub final_level: u32,
    pub final_gold: u64,
    pub encounters_won: u32,
    pub rounds_fought: u32,
    pub items_used: u32,
    pub actions_taken: u32,
}

impl RunStats {
    fn record(&mut self, progress: &Progress) {
        for event in &progress.combat {
            match event {
                CombatEvent::Victory => self.encounters_won += 1,
                CombatEvent::RoundStarted { .. } => self.rounds_fought += 1,
                CombatEvent::ItemUsed {
                    user: CombatantId::Character,
                    ..
                } => self.items_used += 1,
                _ => {}
            }
        }
        if progress.story.contains(&StoryEvent::StoryComplete) {
            self.completed = true;
        }
    }
}

/// Run the full simulation and return a report.
pub fn run_simulation(config: &SimConfig) -> Result<SimReport, SessionError> {
    let mut all_runs = Vec::with_capacity(config.num_runs as usize);

    for run_idx in 0..config.num_runs {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(run_idx as u64)),
            None => StdRng::from_entropy(),
        };

        let r = simulate_single_run(config, &mut rng)?;
        if config.verbosity >= 2 {
            println!(
                "Run {}/{} - Phase {}, Level {}, Wins {}, Rounds {}, {}",
                run_idx + 1,
                config.num_runs,
                r.final_phase + 1,
                r.final_level,
                r.encounters_won,
                r.rounds_fought,
                if r.completed {
                    "completed".to_string()
                } else if let Some(phase) = r.defeated_in {
                    format!("defeated in phase {}", phase + 1)
                } else {
                    "timed out".to_string()
                }
            );
        }
        all_runs.push(r);
    }

    Ok(SimReport::from_runs(all_runs))
}

/// Plays one autopilot run from a new game until the story ends or the
/// action budget runs out.
pub fn simulate_single_run(
    config: &SimConfig,
    rng: &mut impl Rng,
) -> Result<RunStats, SessionError> {
    let (mut session, progress) = Session::new_game("Autopilot", builtin())?;
    let mut stats = RunStats::default();
    stats.record(&progress);

    while stats.actions_taken < config.max_actions_per_run {
        match session.current_step() {
            StepDescriptor::Narrative { id, .. } => {
                let progress = session.resume(id, ResumePayload::Acknowledge)?;
                stats.record(&progress);
                stats.actions_taken += 1;
            }
            StepDescriptor::Choice { id, options, .. } => {
                let pick = if options.is_empty() {
                    0
                } else {
                    rng.gen_range(0..options.len())
                };
                let progress = session.resume(id, ResumePayload::Choose(pick))?;
                stats.record(&progress);
                stats.actions_taken += 1;
            }
            StepDescriptor::Combat { enemies, .. } => {
                debug!("Fighting {:?}", enemies);
                prepare(&mut session)?;
                fight(&mut session, config, &mut stats, rng)?;
            }
            StepDescriptor::GameOver => {
                stats.defeated_in = Some(session.state().phase.phase_index);
                break;
            }
            StepDescriptor::Complete => {
                stats.completed = true;
                break;
            }
        }
    }

    stats.timed_out = !stats.completed && stats.defeated_in.is_none();
    stats.final_phase = session.state().phase.phase_index;
    stats.final_level = session.character().level;
    stats.final_gold = session.character().gold;
    Ok(stats)
}

fn fight(
    session: &mut Session,
    config: &SimConfig,
    stats: &mut RunStats,
    rng: &mut impl Rng,
) -> Result<(), SessionError> {
    let progress = session.start_encounter(rng)?;
    stats.record(&progress);

    while stats.actions_taken < config.max_actions_per_run {
        let Some(action) = choose_action(session) else {
            break;
        };
        let progress = match session.act(action, rng) {
            Ok(progress) => progress,
            Err(SessionError::Action(e)) => {
                debug!("Autopilot action rejected: {}", e);
                session.act(Action::Defend, rng)?
            }
            Err(e) => return Err(e),
        };
        stats.record(&progress);
        stats.actions_taken += 1;
    }
    Ok(())
}
