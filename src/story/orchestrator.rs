//! Drives the phase scripts as an explicit state machine.
//!
//! All mutable story position lives in `PhaseState`; the orchestrator itself
//! only borrows the scripts. Reward and branch steps run automatically while
//! settling. Narrative, choice, and combat steps suspend until `resume` is
//! called with the matching step id and payload.

use super::types::{
    PhaseScript, PhaseState, ResumePayload, Step, StepDescriptor, StepId, StoryEvent, StoryStatus,
};
use crate::combat::types::EncounterOutcome;
use crate::core::error::StoryError;
use log::{debug, info, warn};

pub struct Orchestrator<'a> {
    phases: &'a [PhaseScript],
}

impl<'a> Orchestrator<'a> {
    pub fn new(phases: &'a [PhaseScript]) -> Self {
        Self { phases }
    }

    fn step(&self, state: &PhaseState) -> Option<&'a Step> {
        self.phases
            .get(state.phase_index as usize)
            .and_then(|phase| phase.steps.get(state.cursor as usize))
    }

    fn is_settled(&self, state: &PhaseState) -> bool {
        state.status != StoryStatus::InProgress || self.step(state).is_some_and(Step::is_suspension)
    }

    /// Announces the current phase if it has not begun yet, then settles.
    pub fn start(&self, state: &mut PhaseState) -> Vec<StoryEvent> {
        let mut events = Vec::new();
        if state.status == StoryStatus::InProgress && state.cursor == 0 {
            if let Some(phase) = self.phases.get(state.phase_index as usize) {
                info!("Phase {} begins: {}", state.phase_index, phase.title);
                events.push(StoryEvent::PhaseStarted {
                    phase: state.phase_index,
                    title: phase.title.clone(),
                });
            }
        }
        events.extend(self.settle(state));
        events
    }

    /// Runs non-suspending steps and phase transitions until the story waits
    /// on the presentation layer or ends.
    pub fn settle(&self, state: &mut PhaseState) -> Vec<StoryEvent> {
        let mut events = Vec::new();

        while state.status == StoryStatus::InProgress {
            let index = state.phase_index;
            let Some(phase) = self.phases.get(index as usize) else {
                warn!("Phase {} has no script; ending the story", index);
                state.status = StoryStatus::Complete;
                events.push(StoryEvent::StoryComplete);
                break;
            };

            match phase.steps.get(state.cursor as usize) {
                None => {
                    info!("Phase {} complete: {}", index, phase.title);
                    events.push(StoryEvent::PhaseCompleted { phase: index });
                    match self.phases.get(index as usize + 1) {
                        Some(next) => {
                            state.phase_index += 1;
                            state.cursor = 0;
                            info!("Phase {} begins: {}", state.phase_index, next.title);
                            events.push(StoryEvent::PhaseStarted {
                                phase: state.phase_index,
                                title: next.title.clone(),
                            });
                        }
                        None => {
                            info!("Story complete");
                            state.status = StoryStatus::Complete;
                            events.push(StoryEvent::StoryComplete);
                        }
                    }
                }
                Some(Step::Reward(reward)) => {
                    events.push(StoryEvent::RewardGranted(reward.clone()));
                    state.cursor += 1;
                }
                Some(Step::Branch { flag, equals, skip }) => {
                    let taken = state.flag(flag) == Some(equals);
                    debug!(
                        "Branch on {}={} at {}: {}",
                        flag,
                        equals,
                        state.step_id(),
                        if taken { "skipping" } else { "falling through" }
                    );
                    state.cursor += 1;
                    if taken {
                        state.cursor = state.cursor.saturating_add(*skip);
                    }
                }
                Some(_) => break,
            }
        }

        events
    }

    /// What the story is waiting on.
    pub fn current_step(&self, state: &PhaseState) -> StepDescriptor {
        if !self.is_settled(state) {
            let mut view = state.clone();
            self.settle(&mut view);
            return self.describe(&view);
        }
        self.describe(state)
    }

    fn describe(&self, state: &PhaseState) -> StepDescriptor {
        match state.status {
            StoryStatus::GameOver => return StepDescriptor::GameOver,
            StoryStatus::Complete => return StepDescriptor::Complete,
            StoryStatus::InProgress => {}
        }
        let id = state.step_id();
        match self.step(state) {
            Some(Step::Narrative { title, segments }) => StepDescriptor::Narrative {
                id,
                title: title.clone(),
                segments: segments.clone(),
            },
            Some(Step::Choice { prompt, options }) => StepDescriptor::Choice {
                id,
                prompt: prompt.clone(),
                options: options.iter().map(|o| o.label.clone()).collect(),
            },
            Some(Step::Combat {
                enemies,
                fleeable,
                victory_text,
            }) => StepDescriptor::Combat {
                id,
                enemies: enemies.clone(),
                fleeable: *fleeable,
                victory_text: victory_text.clone(),
            },
            Some(Step::Reward(_)) | Some(Step::Branch { .. }) | None => StepDescriptor::Complete,
        }
    }

    /// Feeds the awaited signal back in and advances to the next suspension.
    ///
    /// The state is only written on success; any error leaves it as it was.
    pub fn resume(
        &self,
        state: &mut PhaseState,
        id: StepId,
        payload: ResumePayload,
    ) -> Result<Vec<StoryEvent>, StoryError> {
        if state.status != StoryStatus::InProgress {
            return Err(StoryError::Finished);
        }

        let mut next = state.clone();
        let mut events = self.settle(&mut next);
        if next.status != StoryStatus::InProgress {
            return Err(StoryError::Finished);
        }

        let expected = next.step_id();
        if id != expected {
            return Err(StoryError::StepMismatch { expected, got: id });
        }
        let Some(step) = self.step(&next) else {
            return Err(StoryError::Finished);
        };

        match (step, payload) {
            (Step::Narrative { .. }, ResumePayload::Acknowledge) => {
                next.cursor += 1;
            }
            (Step::Choice { options, .. }, ResumePayload::Choose(index)) => {
                let option = options.get(index).ok_or(StoryError::ChoiceOutOfRange {
                    index,
                    options: options.len(),
                })?;
                if let Some(flag) = &option.flag {
                    next.flags.insert(flag.clone(), option.value.clone());
                    events.push(StoryEvent::FlagSet {
                        flag: flag.clone(),
                        value: option.value.clone(),
                    });
                }
                next.cursor += 1;
            }
            (Step::Combat { .. }, ResumePayload::CombatResult(EncounterOutcome::Defeat)) => {
                info!("Defeated at {}; game over", expected);
                next.status = StoryStatus::GameOver;
                events.push(StoryEvent::GameOver);
            }
            (Step::Combat { .. }, ResumePayload::CombatResult(_)) => {
                next.cursor += 1;
            }
            _ => return Err(StoryError::UnexpectedPayload),
        }

        events.extend(self.settle(&mut next));
        *state = next;
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::builtin;
    use crate::story::types::{ChoiceOption, FlagValue, Reward};

    fn say(text: &str) -> Step {
        Step::Narrative {
            title: String::new(),
            segments: vec![text.to_string()],
        }
    }

    fn fight() -> Step {
        Step::Combat {
            enemies: vec!["green_goblin".to_string()],
            fleeable: true,
            victory_text: None,
        }
    }

    fn gold(amount: u64) -> Step {
        Step::Reward(Reward {
            gold: amount,
            ..Default::default()
        })
    }

    fn scripts() -> Vec<PhaseScript> {
        vec![
            PhaseScript {
                title: "One".to_string(),
                steps: vec![
                    say("hello"),
                    Step::Choice {
                        prompt: "Help?".to_string(),
                        options: vec![
                            ChoiceOption {
                                label: "Yes".to_string(),
                                flag: Some("helped".to_string()),
                                value: FlagValue::Bool(true),
                            },
                            ChoiceOption {
                                label: "No".to_string(),
                                flag: Some("helped".to_string()),
                                value: FlagValue::Bool(false),
                            },
                        ],
                    },
                    Step::Branch {
                        flag: "helped".to_string(),
                        equals: FlagValue::Bool(false),
                        skip: 1,
                    },
                    gold(10),
                    fight(),
                ],
            },
            PhaseScript {
                title: "Two".to_string(),
                steps: vec![gold(5), say("bye")],
            },
        ]
    }

    fn answer(
        orch: &Orchestrator,
        state: &mut PhaseState,
        payload: ResumePayload,
    ) -> Result<Vec<StoryEvent>, StoryError> {
        let id = state.step_id();
        orch.resume(state, id, payload)
    }

    fn ack(orch: &Orchestrator, state: &mut PhaseState) -> Vec<StoryEvent> {
        answer(orch, state, ResumePayload::Acknowledge).unwrap()
    }

    #[test]
    fn test_start_stops_at_first_suspension() {
        let phases = scripts();
        let orch = Orchestrator::new(&phases);
        let mut state = PhaseState::new();
        let events = orch.start(&mut state);
        assert_eq!(
            events,
            vec![StoryEvent::PhaseStarted {
                phase: 0,
                title: "One".to_string()
            }]
        );
        assert!(matches!(
            orch.current_step(&state),
            StepDescriptor::Narrative { id: StepId { phase: 0, cursor: 0 }, .. }
        ));
    }

    #[test]
    fn test_choice_sets_flag_and_reward_follows() {
        let phases = scripts();
        let orch = Orchestrator::new(&phases);
        let mut state = PhaseState::new();
        orch.start(&mut state);
        ack(&orch, &mut state);

        let events = answer(&orch, &mut state, ResumePayload::Choose(0)).unwrap();
        assert_eq!(
            events,
            vec![
                StoryEvent::FlagSet {
                    flag: "helped".to_string(),
                    value: FlagValue::Bool(true)
                },
                StoryEvent::RewardGranted(Reward {
                    gold: 10,
                    ..Default::default()
                }),
            ]
        );
        assert!(state.flag_is_set("helped"));
        assert!(matches!(orch.current_step(&state), StepDescriptor::Combat { .. }));
    }

    #[test]
    fn test_branch_skips_reward() {
        let phases = scripts();
        let orch = Orchestrator::new(&phases);
        let mut state = PhaseState::new();
        orch.start(&mut state);
        ack(&orch, &mut state);
        let events = answer(&orch, &mut state, ResumePayload::Choose(1))
            .unwrap();
        assert!(!events
            .iter()
            .any(|e| matches!(e, StoryEvent::RewardGranted(_))));
        assert_eq!(state.cursor, 4);
    }

    #[test]
    fn test_victory_moves_to_next_phase() {
        let phases = scripts();
        let orch = Orchestrator::new(&phases);
        let mut state = PhaseState::new();
        orch.start(&mut state);
        ack(&orch, &mut state);
        answer(&orch, &mut state, ResumePayload::Choose(0)).unwrap();
        let events = answer(&orch, &mut state, ResumePayload::CombatResult(EncounterOutcome::Fled))
            .unwrap();
        assert_eq!(
            events,
            vec![
                StoryEvent::PhaseCompleted { phase: 0 },
                StoryEvent::PhaseStarted {
                    phase: 1,
                    title: "Two".to_string()
                },
                StoryEvent::RewardGranted(Reward {
                    gold: 5,
                    ..Default::default()
                }),
            ]
        );
        assert_eq!(state.step_id(), StepId { phase: 1, cursor: 1 });

        let events = ack(&orch, &mut state);
        assert_eq!(
            events,
            vec![
                StoryEvent::PhaseCompleted { phase: 1 },
                StoryEvent::StoryComplete
            ]
        );
        assert_eq!(orch.current_step(&state), StepDescriptor::Complete);
        assert_eq!(
            orch.resume(&mut state, StepId { phase: 1, cursor: 1 }, ResumePayload::Acknowledge),
            Err(StoryError::Finished)
        );
    }

    #[test]
    fn test_defeat_is_game_over() {
        let phases = scripts();
        let orch = Orchestrator::new(&phases);
        let mut state = PhaseState::new();
        orch.start(&mut state);
        ack(&orch, &mut state);
        answer(&orch, &mut state, ResumePayload::Choose(0)).unwrap();
        let events = answer(&orch, &mut state, ResumePayload::CombatResult(EncounterOutcome::Defeat))
            .unwrap();
        assert_eq!(events, vec![StoryEvent::GameOver]);
        assert_eq!(state.status, StoryStatus::GameOver);
        assert_eq!(state.phase_index, 0);
        assert_eq!(orch.current_step(&state), StepDescriptor::GameOver);
    }

    #[test]
    fn test_errors_leave_state_untouched() {
        let phases = scripts();
        let orch = Orchestrator::new(&phases);
        let mut state = PhaseState::new();
        orch.start(&mut state);
        let before = state.clone();

        let wrong = StepId { phase: 0, cursor: 3 };
        assert_eq!(
            orch.resume(&mut state, wrong, ResumePayload::Acknowledge),
            Err(StoryError::StepMismatch {
                expected: StepId { phase: 0, cursor: 0 },
                got: wrong
            })
        );
        assert_eq!(
            answer(&orch, &mut state, ResumePayload::Choose(0)),
            Err(StoryError::UnexpectedPayload)
        );
        assert_eq!(state, before);

        ack(&orch, &mut state);
        let before = state.clone();
        assert_eq!(
            answer(&orch, &mut state, ResumePayload::Choose(7)),
            Err(StoryError::ChoiceOutOfRange {
                index: 7,
                options: 2
            })
        );
        assert_eq!(state, before);
    }

    #[test]
    fn test_restored_state_settles_on_resume() {
        let phases = scripts();
        let orch = Orchestrator::new(&phases);
        // Parked on a reward step, as an older save might be.
        let mut state = PhaseState {
            phase_index: 1,
            cursor: 0,
            ..Default::default()
        };
        let descriptor = orch.current_step(&state);
        let id = descriptor.id().unwrap();
        assert_eq!(id, StepId { phase: 1, cursor: 1 });

        let events = orch
            .resume(&mut state, id, ResumePayload::Acknowledge)
            .unwrap();
        assert_eq!(
            events.first(),
            Some(&StoryEvent::RewardGranted(Reward {
                gold: 5,
                ..Default::default()
            }))
        );
        assert_eq!(state.status, StoryStatus::Complete);
    }

    #[test]
    fn test_builtin_story_runs_forward_to_completion() {
        let content = builtin();
        let orch = Orchestrator::new(&content.phases);
        let mut state = PhaseState::new();
        orch.start(&mut state);

        let mut last_phase = 0;
        let mut completed = 0;
        for _ in 0..1000 {
            let payload = match orch.current_step(&state) {
                StepDescriptor::Narrative { .. } => ResumePayload::Acknowledge,
                StepDescriptor::Choice { .. } => ResumePayload::Choose(0),
                StepDescriptor::Combat { .. } => {
                    ResumePayload::CombatResult(EncounterOutcome::Victory)
                }
                StepDescriptor::GameOver => panic!("no defeats were fed in"),
                StepDescriptor::Complete => break,
            };
            let events = answer(&orch, &mut state, payload).unwrap();
            completed += events
                .iter()
                .filter(|e| matches!(e, StoryEvent::PhaseCompleted { .. }))
                .count();
            assert!(state.phase_index >= last_phase);
            last_phase = state.phase_index;
        }
        assert_eq!(state.status, StoryStatus::Complete);
        assert_eq!(completed, 10);
        assert_eq!(state.phase_index, 9);
    }
}
