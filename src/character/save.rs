//! Save codec and the on-disk save slot.
//!
//! Byte layout:
//! - magic (8 bytes, LE)
//! - format version (4 bytes, LE)
//! - payload length (4 bytes, LE)
//! - JSON payload
//! - SHA-256 over everything before it (32 bytes)
//!
//! Decoding either returns a complete, validated `GameState` or an error.

use super::attributes::Attributes;
use super::combatant::Pool;
use super::status::{StatusEffect, StatusEffects, StatusKind};
use super::types::Character;
use crate::core::constants::*;
use crate::core::error::SaveError;
use crate::core::game_state::GameState;
use crate::items::{Equipment, EquipmentPiece, Inventory};
use crate::story::types::{FlagValue, PhaseState};
use directories::ProjectDirs;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Metadata stored next to the state, outside of `GameState`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveInfo {
    pub format_version: u32,
    /// Unix timestamp, seconds.
    pub saved_at: i64,
    pub game_version: String,
}

/// Current (version 2) payload.
#[derive(Debug, Serialize, Deserialize)]
struct SaveRecord {
    format_version: u32,
    saved_at: i64,
    game_version: String,
    character: Character,
    phase: PhaseState,
}

// =============================================================================
// Version 1
// =============================================================================

// Version 1 only stored turn counters for these buffs; magnitudes were fixed.
const LEGACY_DEFENSE_BUFF: u32 = 5;
const LEGACY_FURY_BONUS: u32 = 8;
const LEGACY_REGENERATION: u32 = 5;

#[derive(Debug, Deserialize)]
struct LegacyRecord {
    #[serde(default)]
    saved_at: i64,
    character: LegacyCharacter,
}

#[derive(Debug, Deserialize)]
struct LegacyStack {
    id: String,
    quantity: u32,
}

fn legacy_speed() -> u32 {
    STARTING_SPEED
}

fn legacy_magic() -> u32 {
    STARTING_MAGIC
}

/// Version 1 character: flat stats, a 1-based phase number with no cursor,
/// the sailor choice as its own field, and per-kind status counters.
#[derive(Debug, Deserialize)]
struct LegacyCharacter {
    name: String,
    hp: u32,
    max_hp: u32,
    mp: u32,
    max_mp: u32,
    strength: u32,
    defense: u32,
    #[serde(default = "legacy_speed")]
    speed: u32,
    #[serde(default = "legacy_magic")]
    magic: u32,
    level: u32,
    experience: u64,
    #[serde(default)]
    gold: u64,
    phase: u8,
    #[serde(default)]
    poison_turns: u32,
    #[serde(default)]
    poison_damage: u32,
    #[serde(default)]
    defense_buff_turns: u32,
    #[serde(default)]
    fury_turns: u32,
    #[serde(default)]
    regeneration_turns: u32,
    #[serde(default)]
    helped_sailor: bool,
    #[serde(default)]
    weapon: Option<EquipmentPiece>,
    #[serde(default)]
    armor: Option<EquipmentPiece>,
    #[serde(default)]
    shield: Option<EquipmentPiece>,
    #[serde(default)]
    inventory: Vec<LegacyStack>,
    #[serde(default)]
    abilities: Vec<String>,
}

fn migrate_legacy(record: LegacyRecord) -> Result<GameState, SaveError> {
    let old = record.character;
    warn!(
        "Migrating version {} save for {}",
        LEGACY_SAVE_FORMAT_VERSION, old.name
    );

    let phase_index = old
        .phase
        .checked_sub(1)
        .ok_or_else(|| SaveError::CorruptSaveData("phase number 0 in legacy save".to_string()))?;

    if old.hp > old.max_hp || old.mp > old.max_mp {
        return Err(SaveError::CorruptSaveData(format!(
            "legacy pools out of bounds: hp {}/{}, mp {}/{}",
            old.hp, old.max_hp, old.mp, old.max_mp
        )));
    }

    let mut statuses = StatusEffects::new();
    let counters = [
        (StatusKind::Poison, old.poison_turns, old.poison_damage),
        (StatusKind::DefenseUp, old.defense_buff_turns, LEGACY_DEFENSE_BUFF),
        (StatusKind::StrengthUp, old.fury_turns, LEGACY_FURY_BONUS),
        (StatusKind::Regeneration, old.regeneration_turns, LEGACY_REGENERATION),
    ];
    for (kind, turns, magnitude) in counters {
        if turns > 0 {
            statuses.apply(StatusEffect::new(kind, turns, magnitude));
        }
    }

    let mut equipment = Equipment::new();
    for piece in [old.weapon, old.armor, old.shield].into_iter().flatten() {
        equipment.equip(piece);
    }

    let mut inventory = Inventory::new();
    for stack in &old.inventory {
        inventory.add(&stack.id, stack.quantity);
    }

    let mut flags = BTreeMap::new();
    if old.helped_sailor {
        flags.insert(HELPED_SAILOR_FLAG.to_string(), FlagValue::Bool(true));
    }

    let character = Character {
        id: Uuid::new_v4(),
        name: old.name,
        hp: Pool::new(old.hp, old.max_hp),
        mp: Pool::new(old.mp, old.max_mp),
        attributes: Attributes::new(old.strength, old.defense, old.speed, old.magic),
        statuses,
        level: old.level,
        experience: old.experience,
        gold: old.gold,
        equipment,
        inventory,
        abilities: old.abilities.into_iter().collect::<BTreeSet<_>>(),
    };

    Ok(GameState {
        character,
        phase: PhaseState {
            phase_index,
            cursor: 0,
            flags,
            ..PhaseState::default()
        },
    })
}

// =============================================================================
// Codec
// =============================================================================

fn checksum(bytes: &[u8]) -> [u8; SAVE_CHECKSUM_LEN] {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let mut sum = [0u8; SAVE_CHECKSUM_LEN];
    sum.copy_from_slice(&hasher.finalize());
    sum
}

/// Wraps a payload in the versioned, checksummed envelope.
fn seal(version: u32, payload: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(SAVE_HEADER_LEN + payload.len() + SAVE_CHECKSUM_LEN);
    bytes.extend_from_slice(&SAVE_MAGIC.to_le_bytes());
    bytes.extend_from_slice(&version.to_le_bytes());
    bytes.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    bytes.extend_from_slice(payload);
    let sum = checksum(&bytes);
    bytes.extend_from_slice(&sum);
    bytes
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes[at..at + 4]);
    u32::from_le_bytes(buf)
}

fn corrupt(reason: impl Into<String>) -> SaveError {
    SaveError::CorruptSaveData(reason.into())
}

/// Serializes the state into the current save format.
pub fn encode(state: &GameState) -> Result<Vec<u8>, SaveError> {
    let record = SaveRecord {
        format_version: SAVE_FORMAT_VERSION,
        saved_at: chrono::Utc::now().timestamp(),
        game_version: env!("CARGO_PKG_VERSION").to_string(),
        character: state.character.clone(),
        phase: state.phase.clone(),
    };
    let payload =
        serde_json::to_vec(&record).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    Ok(seal(SAVE_FORMAT_VERSION, &payload))
}

/// Inverse of `encode`; also reads and migrates version 1 saves.
pub fn decode(bytes: &[u8]) -> Result<GameState, SaveError> {
    decode_with_info(bytes).map(|(state, _)| state)
}

pub fn decode_with_info(bytes: &[u8]) -> Result<(GameState, SaveInfo), SaveError> {
    if bytes.len() < SAVE_HEADER_LEN + SAVE_CHECKSUM_LEN {
        return Err(corrupt("save is truncated"));
    }

    let mut magic = [0u8; 8];
    magic.copy_from_slice(&bytes[..8]);
    if u64::from_le_bytes(magic) != SAVE_MAGIC {
        return Err(corrupt("not a save file"));
    }

    let version = read_u32(bytes, 8);
    let payload_len = read_u32(bytes, 12) as usize;
    let body_end = SAVE_HEADER_LEN + payload_len;
    if bytes.len() != body_end + SAVE_CHECKSUM_LEN {
        return Err(corrupt(format!(
            "expected {} bytes, found {}",
            body_end + SAVE_CHECKSUM_LEN,
            bytes.len()
        )));
    }
    if checksum(&bytes[..body_end]) != bytes[body_end..] {
        return Err(corrupt("checksum verification failed"));
    }

    let payload = &bytes[SAVE_HEADER_LEN..body_end];
    let (state, info) = match version {
        SAVE_FORMAT_VERSION => {
            let record: SaveRecord =
                serde_json::from_slice(payload).map_err(|e| corrupt(e.to_string()))?;
            if record.format_version != version {
                return Err(corrupt(format!(
                    "header says version {} but payload says {}",
                    version, record.format_version
                )));
            }
            let info = SaveInfo {
                format_version: version,
                saved_at: record.saved_at,
                game_version: record.game_version,
            };
            (
                GameState {
                    character: record.character,
                    phase: record.phase,
                },
                info,
            )
        }
        LEGACY_SAVE_FORMAT_VERSION => {
            let record: LegacyRecord =
                serde_json::from_slice(payload).map_err(|e| corrupt(e.to_string()))?;
            let info = SaveInfo {
                format_version: version,
                saved_at: record.saved_at,
                game_version: String::new(),
            };
            (migrate_legacy(record)?, info)
        }
        other => return Err(SaveError::IncompatibleVersion(other)),
    };

    validate(&state)?;
    Ok((state, info))
}

/// Rejects states no normal play could produce.
fn validate(state: &GameState) -> Result<(), SaveError> {
    let character = &state.character;
    if !character.hp.is_valid() {
        return Err(corrupt("HP out of bounds"));
    }
    if !character.mp.is_valid() {
        return Err(corrupt("MP out of bounds"));
    }
    if character.level < STARTING_LEVEL {
        return Err(corrupt("level below 1"));
    }
    if state.phase.phase_index > LAST_PHASE_INDEX {
        return Err(corrupt(format!(
            "phase index {} past the last phase",
            state.phase.phase_index
        )));
    }
    Ok(())
}

// =============================================================================
// Save slot
// =============================================================================

/// One save file on disk, written atomically with a single backup.
pub struct SaveManager {
    save_path: PathBuf,
}

impl SaveManager {
    /// Uses `ZORG_SAVE_DIR` when set, otherwise the platform data directory.
    pub fn new() -> Result<Self, SaveError> {
        if let Some(dir) = std::env::var_os(SAVE_DIR_ENV) {
            return Self::with_dir(dir);
        }
        let project_dirs = ProjectDirs::from("", "", "zorg").ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "Could not determine data directory")
        })?;
        Self::with_dir(project_dirs.data_dir())
    }

    pub fn with_dir(dir: impl AsRef<Path>) -> Result<Self, SaveError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        Ok(Self {
            save_path: dir.join(SAVE_FILE_NAME),
        })
    }

    #[cfg(test)]
    fn new_for_test() -> Result<Self, SaveError> {
        use std::sync::atomic::{AtomicU64, Ordering};
        static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

        let test_id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        let dir = std::env::temp_dir().join(format!(
            "zorg-test-{}-{}",
            std::process::id(),
            test_id
        ));
        Self::with_dir(dir)
    }

    pub fn path(&self) -> &Path {
        &self.save_path
    }

    pub fn backup_path(&self) -> PathBuf {
        self.save_path.with_extension("bak")
    }

    /// Writes to a temp file then renames it over the save. The previous save,
    /// if any, is kept as the backup.
    pub fn save(&self, state: &GameState) -> Result<(), SaveError> {
        let bytes = encode(state)?;
        if self.save_path.exists() {
            fs::copy(&self.save_path, self.backup_path())?;
        }
        let temp = self.save_path.with_extension("tmp");
        fs::write(&temp, &bytes)?;
        fs::rename(&temp, &self.save_path)?;
        info!(
            "Saved {} at phase {} ({} bytes)",
            state.character.name,
            state.phase.step_id(),
            bytes.len()
        );
        Ok(())
    }

    pub fn load(&self) -> Result<GameState, SaveError> {
        let bytes = fs::read(&self.save_path)?;
        let state = decode(&bytes)?;
        info!(
            "Loaded {} at phase {}",
            state.character.name,
            state.phase.step_id()
        );
        Ok(state)
    }

    /// Loads the backup written by the previous `save`.
    pub fn load_backup(&self) -> Result<GameState, SaveError> {
        let bytes = fs::read(self.backup_path())?;
        decode(&bytes)
    }

    pub fn save_exists(&self) -> bool {
        self.save_path.exists()
    }

    /// Removes the save and its backup. Missing files are fine.
    pub fn delete(&self) -> Result<(), SaveError> {
        for path in [self.save_path.clone(), self.backup_path()] {
            match fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}
