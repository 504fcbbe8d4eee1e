//! Integration test: saving and restoring sessions
//!
//! Saves taken between steps restore to exactly the same place, the save slot
//! keeps a backup, and version 1 saves are migrated into the current story.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use zorg::character::save::{decode, decode_with_info, encode};
use zorg::character::SaveManager;
use zorg::combat::{Action, CombatantId};
use zorg::content::builtin;
use zorg::core::constants::{
    HELPED_SAILOR_FLAG, LEGACY_SAVE_FORMAT_VERSION, SAVE_FORMAT_VERSION, SAVE_MAGIC,
};
use zorg::core::error::{SaveError, SessionError};
use zorg::story::{FlagValue, ResumePayload, StepDescriptor};
use zorg::{GameState, Session};

fn temp_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("zorg-{}-{}", name, uuid::Uuid::new_v4()))
}

fn sealed(version: u32, payload: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&SAVE_MAGIC.to_le_bytes());
    bytes.extend_from_slice(&version.to_le_bytes());
    bytes.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    bytes.extend_from_slice(payload);
    let sum = Sha256::digest(&bytes);
    bytes.extend_from_slice(&sum);
    bytes
}

/// Plays up to and through the first fight.
fn session_after_first_fight() -> Session {
    let mut rng = ChaCha8Rng::seed_from_u64(13);
    let (mut session, _) = Session::new_game("Manu", builtin()).unwrap();
    let id = session.current_step().id().unwrap();
    session.resume(id, ResumePayload::Acknowledge).unwrap();
    session.start_encounter(&mut rng).unwrap();
    while session.encounter().is_some() {
        session
            .act(
                Action::Attack {
                    target: CombatantId::Enemy(0),
                },
                &mut rng,
            )
            .unwrap();
    }
    session
}

// =========================================================================
// Session save points
// =========================================================================

#[test]
fn test_restored_session_continues_identically() {
    let session = session_after_first_fight();
    let bytes = session.save_bytes().unwrap();
    let (mut restored, _) = Session::from_save(&bytes, builtin()).unwrap();
    let mut original = session;

    assert_eq!(restored.state(), original.state());
    assert_eq!(restored.current_step(), original.current_step());

    let id = original.current_step().id().unwrap();
    let a = original.resume(id, ResumePayload::Acknowledge).unwrap();
    let b = restored.resume(id, ResumePayload::Acknowledge).unwrap();
    assert_eq!(a, b);

    let mut rng_a = ChaCha8Rng::seed_from_u64(99);
    let mut rng_b = ChaCha8Rng::seed_from_u64(99);
    assert_eq!(
        original.start_encounter(&mut rng_a).unwrap(),
        restored.start_encounter(&mut rng_b).unwrap()
    );
    assert_eq!(restored.state(), original.state());
}

#[test]
fn test_cannot_save_mid_fight() {
    let mut rng = ChaCha8Rng::seed_from_u64(13);
    let (mut session, _) = Session::new_game("Manu", builtin()).unwrap();
    let id = session.current_step().id().unwrap();
    session.resume(id, ResumePayload::Acknowledge).unwrap();
    session.start_encounter(&mut rng).unwrap();
    assert!(matches!(
        session.save_bytes(),
        Err(SessionError::EncounterActive)
    ));
}

#[test]
fn test_save_info_is_not_part_of_state() {
    let state = session_after_first_fight().into_state();
    let first = encode(&state).unwrap();
    let (decoded, info) = decode_with_info(&first).unwrap();
    assert_eq!(decoded, state);
    assert_eq!(info.format_version, SAVE_FORMAT_VERSION);
    assert_eq!(info.game_version, env!("CARGO_PKG_VERSION"));
    assert!(info.saved_at > 0);
}

// =========================================================================
// Save slot
// =========================================================================

#[test]
fn test_save_slot_round_trip_with_backup() {
    let dir = temp_dir("slot");
    let manager = SaveManager::with_dir(&dir).unwrap();
    assert!(!manager.save_exists());

    let early = GameState::new("Manu".to_string());
    manager.save(&early).unwrap();
    let later = session_after_first_fight().into_state();
    manager.save(&later).unwrap();

    assert!(manager.save_exists());
    assert_eq!(manager.load().unwrap(), later);
    assert_eq!(manager.load_backup().unwrap(), early);

    manager.delete().unwrap();
    assert!(!manager.save_exists());
    assert!(matches!(manager.load(), Err(SaveError::Io(_))));
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_damaged_file_is_rejected_and_backup_survives() {
    let dir = temp_dir("damaged");
    let manager = SaveManager::with_dir(&dir).unwrap();
    let state = session_after_first_fight().into_state();
    manager.save(&state).unwrap();
    manager.save(&state).unwrap();

    let mut bytes = std::fs::read(manager.path()).unwrap();
    let middle = bytes.len() / 2;
    bytes[middle] ^= 0x55;
    std::fs::write(manager.path(), &bytes).unwrap();

    assert!(matches!(
        manager.load(),
        Err(SaveError::CorruptSaveData(_))
    ));
    assert_eq!(manager.load_backup().unwrap(), state);
    let _ = std::fs::remove_dir_all(&dir);
}

// =========================================================================
// Versions
// =========================================================================

#[test]
fn test_future_version_is_incompatible() {
    let state = GameState::new("Manu".to_string());
    let current = encode(&state).unwrap();
    let payload = &current[16..current.len() - 32];
    let future = sealed(SAVE_FORMAT_VERSION + 1, payload);
    assert!(matches!(
        decode(&future),
        Err(SaveError::IncompatibleVersion(v)) if v == SAVE_FORMAT_VERSION + 1
    ));
}

#[test]
fn test_legacy_save_resumes_at_start_of_its_phase() {
    let legacy = serde_json::json!({
        "saved_at": 1_600_000_000,
        "character": {
            "name": "Manu",
            "hp": 80,
            "max_hp": 120,
            "mp": 30,
            "max_mp": 60,
            "strength": 20,
            "defense": 9,
            "level": 6,
            "experience": 1500,
            "gold": 340,
            "phase": 5,
            "helped_sailor": true,
            "poison_turns": 2,
            "poison_damage": 4,
            "inventory": [{ "id": "healing_potion", "quantity": 3 }],
            "abilities": ["power_strike", "ice_lance"]
        }
    });
    let bytes = sealed(
        LEGACY_SAVE_FORMAT_VERSION,
        &serde_json::to_vec(&legacy).unwrap(),
    );

    let (session, _) = Session::from_save(&bytes, builtin()).unwrap();
    let state = session.state();
    assert_eq!(state.phase.phase_index, 4);
    assert_eq!(
        state.phase.flags.get(HELPED_SAILOR_FLAG),
        Some(&FlagValue::Bool(true))
    );
    assert_eq!(state.character.level, 6);
    assert_eq!(state.character.gold, 340);
    assert_eq!(state.character.inventory.quantity("healing_potion"), 3);
    assert!(state.character.knows_ability("ice_lance"));
    assert!(matches!(
        session.current_step(),
        StepDescriptor::Narrative { .. }
    ));

    // Migrated saves are written back in the current format.
    let rewritten = session.save_bytes().unwrap();
    let (_, info) = decode_with_info(&rewritten).unwrap();
    assert_eq!(info.format_version, SAVE_FORMAT_VERSION);
}
