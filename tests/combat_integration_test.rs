//! Integration test: encounters against built-in enemies
//!
//! Drives full encounters with a kitted character: turn flow, rewards, loot,
//! level-ups during combat, and determinism under a fixed seed.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use zorg::character::{Character, Combatant};
use zorg::combat::{Action, CombatEvent, CombatantId, Encounter, EncounterOutcome, EncounterState};
use zorg::content::{builtin, Content};
use zorg::core::error::ActionError;
use zorg::Session;

fn kitted_character(content: &Content) -> Character {
    let (session, _) = Session::new_game("Manu", content.clone()).unwrap();
    session.into_state().character
}

fn encounter(ids: &[&str], content: &Content) -> Encounter {
    let ids: Vec<String> = ids.iter().map(|s| s.to_string()).collect();
    Encounter::from_ids(&ids, true, content).unwrap()
}

/// Attacks the first living enemy until the encounter ends.
fn brawl(
    encounter: &mut Encounter,
    character: &mut Character,
    content: &Content,
    rng: &mut ChaCha8Rng,
) -> Vec<CombatEvent> {
    let mut log = encounter.begin(character, content, rng);
    for _ in 0..200 {
        if encounter.outcome().is_some() {
            break;
        }
        let target = encounter.living_enemies().next().map(|(i, _)| i).unwrap();
        let events = encounter
            .submit(
                Action::Attack {
                    target: CombatantId::Enemy(target),
                },
                character,
                content,
                rng,
            )
            .unwrap();
        log.extend(events);
    }
    log
}

// =========================================================================
// Basic flow
// =========================================================================

#[test]
fn test_kitted_character_beats_goblin() {
    let content = builtin();
    let mut character = kitted_character(&content);
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    let mut fight = encounter(&["green_goblin"], &content);

    let log = brawl(&mut fight, &mut character, &content, &mut rng);

    assert_eq!(fight.outcome(), Some(EncounterOutcome::Victory));
    assert!(log.contains(&CombatEvent::Victory));
    assert!(log.contains(&CombatEvent::ExperienceGained { amount: 40 }));
    assert!(log.contains(&CombatEvent::GoldGained { amount: 15 }));
    assert_eq!(character.experience, 40);
    assert_eq!(character.gold, 15);
    assert!(character.is_alive());
    // 10 STR against 2 DEF: three hits for 20 HP.
    let hits = log
        .iter()
        .filter(|e| {
            matches!(
                e,
                CombatEvent::Attacked {
                    attacker: CombatantId::Character,
                    ..
                }
            )
        })
        .count();
    assert_eq!(hits, 3);
}

#[test]
fn test_loot_lands_in_inventory() {
    let content = builtin();
    let mut character = kitted_character(&content);
    let potions_before = character.inventory.quantity("healing_potion");
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let mut fight = encounter(&["green_goblin"], &content);

    let log = brawl(&mut fight, &mut character, &content, &mut rng);

    let dropped: u32 = log
        .iter()
        .filter_map(|e| match e {
            CombatEvent::LootDropped { item, quantity, .. } if item == "healing_potion" => {
                Some(*quantity)
            }
            _ => None,
        })
        .sum();
    assert_eq!(
        character.inventory.quantity("healing_potion"),
        potions_before + dropped
    );
}

#[test]
fn test_experience_from_combat_levels_up() {
    let content = builtin();
    let mut character = kitted_character(&content);
    character.experience = 90;
    let mut rng = ChaCha8Rng::seed_from_u64(2);
    let mut fight = encounter(&["green_goblin"], &content);

    let log = brawl(&mut fight, &mut character, &content, &mut rng);

    let report = log
        .iter()
        .find_map(|e| match e {
            CombatEvent::LevelUp(report) => Some(report.clone()),
            _ => None,
        })
        .expect("130 XP crosses the first threshold");
    assert_eq!(report.old_level, 1);
    assert_eq!(report.new_level, 2);
    assert_eq!(character.level, 2);
    assert_eq!(character.hp().current(), character.hp().max());
    assert!(character.hp().max() > 50);
}

// =========================================================================
// Multi-enemy encounters
// =========================================================================

#[test]
fn test_defeated_enemy_stays_in_roster() {
    let content = builtin();
    let mut character = kitted_character(&content);
    let mut rng = ChaCha8Rng::seed_from_u64(9);
    let mut fight = encounter(&["green_goblin", "green_goblin"], &content);
    fight.begin(&mut character, &content, &mut rng);

    for _ in 0..3 {
        fight
            .submit(
                Action::Attack {
                    target: CombatantId::Enemy(0),
                },
                &mut character,
                &content,
                &mut rng,
            )
            .unwrap();
    }
    assert_eq!(fight.enemies().len(), 2);
    assert!(!fight.enemies()[0].is_alive());
    assert_eq!(fight.living_enemies().count(), 1);
    assert_eq!(fight.state(), EncounterState::AwaitingAction);

    let err = fight
        .submit(
            Action::Attack {
                target: CombatantId::Enemy(0),
            },
            &mut character,
            &content,
            &mut rng,
        )
        .unwrap_err();
    assert!(matches!(err, ActionError::InvalidTarget(_)));
}

#[test]
fn test_rejected_action_changes_nothing() {
    let content = builtin();
    let mut character = kitted_character(&content);
    let mut rng = ChaCha8Rng::seed_from_u64(4);
    let mut fight = encounter(&["shadow_wolf"], &content);
    fight.begin(&mut character, &content, &mut rng);

    let mana = character.mp().current();
    character.mp_mut().drain(mana);
    let before_character = character.clone();
    let before_round = fight.round();
    let before_enemy_hp = fight.enemies()[0].hp().current();

    let err = fight
        .submit(
            Action::Ability {
                id: "power_strike".to_string(),
                target: Some(CombatantId::Enemy(0)),
            },
            &mut character,
            &content,
            &mut rng,
        )
        .unwrap_err();
    assert_eq!(
        err,
        ActionError::InsufficientMana {
            required: 10,
            available: 0
        }
    );
    assert_eq!(character, before_character);
    assert_eq!(fight.round(), before_round);
    assert_eq!(fight.enemies()[0].hp().current(), before_enemy_hp);
    assert_eq!(fight.state(), EncounterState::AwaitingAction);
}

#[test]
fn test_finished_encounter_rejects_actions() {
    let content = builtin();
    let mut character = kitted_character(&content);
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let mut fight = encounter(&["green_goblin"], &content);
    brawl(&mut fight, &mut character, &content, &mut rng);

    assert_eq!(
        fight.submit(Action::Defend, &mut character, &content, &mut rng),
        Err(ActionError::EncounterOver)
    );
}

// =========================================================================
// Determinism
// =========================================================================

#[test]
fn test_same_seed_same_fight() {
    let content = builtin();
    let run = |seed: u64| {
        let mut character = kitted_character(&content);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut fight = encounter(&["shadow_wolf", "green_goblin"], &content);
        let log = brawl(&mut fight, &mut character, &content, &mut rng);
        (log, character.hp().current(), character.inventory.clone())
    };

    let (first_log, first_hp, first_inv) = run(77);
    let (second_log, second_hp, second_inv) = run(77);
    assert_eq!(first_log, second_log);
    assert_eq!(first_hp, second_hp);
    assert_eq!(first_inv, second_inv);
}
