use crate::combat::types::EncounterOutcome;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Value of a narrative flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlagValue {
    Bool(bool),
    Text(String),
}

impl fmt::Display for FlagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlagValue::Bool(b) => write!(f, "{}", b),
            FlagValue::Text(s) => write!(f, "{}", s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceOption {
    pub label: String,
    /// Flag recorded when this option is picked.
    #[serde(default)]
    pub flag: Option<String>,
    #[serde(default = "flag_true")]
    pub value: FlagValue,
}

fn flag_true() -> FlagValue {
    FlagValue::Bool(true)
}

fn fleeable_default() -> bool {
    true
}

/// Non-suspending grant applied to the character when the script reaches it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Reward {
    pub items: Vec<(String, u32)>,
    pub equipment: Vec<String>,
    pub abilities: Vec<String>,
    pub gold: u64,
    pub experience: u64,
    /// Refill HP/MP, as after a rest.
    pub restore: bool,
}

/// One beat of a phase script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Step {
    /// Suspends until acknowledged.
    Narrative { title: String, segments: Vec<String> },
    /// Suspends until an option is chosen.
    Choice {
        prompt: String,
        options: Vec<ChoiceOption>,
    },
    /// Suspends until the encounter reaches a terminal state.
    Combat {
        enemies: Vec<String>,
        #[serde(default = "fleeable_default")]
        fleeable: bool,
        /// Shown by the presentation layer after a win.
        #[serde(default)]
        victory_text: Option<String>,
    },
    Reward(Reward),
    /// Skips the next `skip` steps when `flag` equals `equals`.
    Branch {
        flag: String,
        equals: FlagValue,
        skip: u32,
    },
}

impl Step {
    pub fn is_suspension(&self) -> bool {
        matches!(
            self,
            Step::Narrative { .. } | Step::Choice { .. } | Step::Combat { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseScript {
    pub title: String,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StoryStatus {
    #[default]
    InProgress,
    GameOver,
    Complete,
}

/// Where the story stands. Serializable, so mid-phase saves are exact.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PhaseState {
    /// 0-based, only ever increases.
    pub phase_index: u8,
    pub cursor: u32,
    #[serde(default)]
    pub flags: BTreeMap<String, FlagValue>,
    #[serde(default)]
    pub status: StoryStatus,
}

impl PhaseState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step_id(&self) -> StepId {
        StepId {
            phase: self.phase_index,
            cursor: self.cursor,
        }
    }

    pub fn flag(&self, name: &str) -> Option<&FlagValue> {
        self.flags.get(name)
    }

    pub fn flag_is_set(&self, name: &str) -> bool {
        self.flags.get(name) == Some(&FlagValue::Bool(true))
    }
}

/// Address of a step, echoed back by the presentation layer on resume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StepId {
    pub phase: u8,
    pub cursor: u32,
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.phase, self.cursor)
    }
}

/// What the story is waiting for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepDescriptor {
    Narrative {
        id: StepId,
        title: String,
        segments: Vec<String>,
    },
    Choice {
        id: StepId,
        prompt: String,
        options: Vec<String>,
    },
    Combat {
        id: StepId,
        enemies: Vec<String>,
        fleeable: bool,
        victory_text: Option<String>,
    },
    GameOver,
    Complete,
}

impl StepDescriptor {
    pub fn id(&self) -> Option<StepId> {
        match self {
            StepDescriptor::Narrative { id, .. }
            | StepDescriptor::Choice { id, .. }
            | StepDescriptor::Combat { id, .. } => Some(*id),
            StepDescriptor::GameOver | StepDescriptor::Complete => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumePayload {
    Acknowledge,
    Choose(usize),
    CombatResult(EncounterOutcome),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoryEvent {
    PhaseStarted { phase: u8, title: String },
    FlagSet { flag: String, value: FlagValue },
    RewardGranted(Reward),
    PhaseCompleted { phase: u8 },
    GameOver,
    StoryComplete,
}
