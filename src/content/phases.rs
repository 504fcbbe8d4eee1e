//! The ten built-in phase scripts.

use crate::core::constants::HELPED_SAILOR_FLAG;
use crate::story::types::{ChoiceOption, FlagValue, PhaseScript, Reward, Step};

fn titled(title: &str, segments: &[&str]) -> Step {
    Step::Narrative {
        title: title.to_string(),
        segments: segments.iter().map(|s| s.to_string()).collect(),
    }
}

fn text(segments: &[&str]) -> Step {
    titled("", segments)
}

fn fight(enemy: &str, victory_text: &str) -> Step {
    Step::Combat {
        enemies: vec![enemy.to_string()],
        fleeable: true,
        victory_text: Some(victory_text.to_string()),
    }
}

fn boss(enemy: &str, victory_text: &str) -> Step {
    Step::Combat {
        enemies: vec![enemy.to_string()],
        fleeable: false,
        victory_text: Some(victory_text.to_string()),
    }
}

fn gear_reward(id: &str) -> Step {
    Step::Reward(Reward {
        equipment: vec![id.to_string()],
        ..Reward::default()
    })
}

fn phase(title: &str, steps: Vec<Step>) -> PhaseScript {
    PhaseScript {
        title: title.to_string(),
        steps,
    }
}

pub fn all_phases() -> Vec<PhaseScript> {
    vec![
        phase_1(),
        phase_2(),
        phase_3(),
        phase_4(),
        phase_5(),
        phase_6(),
        phase_7(),
        phase_8(),
        phase_9(),
        phase_10(),
    ]
}

fn phase_1() -> PhaseScript {
    phase(
        "The Whispering Forest",
        vec![
            titled(
                "PHASE 1: THE WHISPERING FOREST",
                &[
                    "Manu clutches the medallion Ramon gave her, her last memory of him. 'I will find you, my love.'",
                    "A bush rustles. A scaly green creature leaps out, eyes hungry with malice.",
                    "'Fresh meat! Zorg will love your bones!' snarls the goblin.",
                ],
            ),
            fight(
                "green_goblin",
                "Manu looks at her trembling hands. The thought of Ramon hardens her heart.",
            ),
            text(&[
                "Deeper in, the shadows come alive. A howl cuts through the night.",
                "Red eyes emerge from the dark. A Shadow Wolf growls low.",
            ]),
            fight(
                "shadow_wolf",
                "Her courage grows with every victory. Fear gives way to resolve.",
            ),
            text(&[
                "In a clearing under a red moon, a massive figure blocks the path.",
                "'I AM GARG! NOBODY PASSES!' bellows the goblin chief, pounding his club on the ground.",
            ]),
            boss(
                "garg",
                "With Garg defeated, the forest sighs in relief. The shadows retreat.",
            ),
            titled(
                "END OF PHASE 1",
                &[
                    "Beside the fallen goblin lies a short sword, still sharp, and a map sketched on old leather.",
                    "It points to a single destination: the Echoing Caves.",
                ],
            ),
            Step::Reward(Reward {
                equipment: vec!["short_sword".to_string()],
                items: vec![("leather_map".to_string(), 1)],
                ..Reward::default()
            }),
        ],
    )
}

fn phase_2() -> PhaseScript {
    phase(
        "The Echoing Caves",
        vec![
            titled(
                "PHASE 2: THE ECHOING CAVES",
                &[
                    "Every footstep returns a hundred times from the cave walls.",
                    "Something leathery beats the air above her head.",
                ],
            ),
            fight("giant_bat", "The bat crashes into the stalagmites and is still."),
            text(&["The floor glistens. A mass of bubbling green slime slides toward her."]),
            fight("acid_slime", "The slime dissolves into a harmless puddle."),
            text(&[
                "A foul smell and heavy breathing. A Cave Troll rises from its bed of bones.",
            ]),
            boss("cave_troll", "The troll collapses with a thunderous crash."),
            titled(
                "END OF PHASE 2",
                &["Among the troll's hoard, Manu finds a sturdy suit of leather armor."],
            ),
            gear_reward("leather_armor"),
        ],
    )
}

fn phase_3() -> PhaseScript {
    phase(
        "Zorg's Dark Swamp",
        vec![
            titled(
                "PHASE 3: ZORG'S DARK SWAMP",
                &[
                    "The caves open onto a swamp where the air itself feels poisoned.",
                    "For the first time, Manu weeps. 'Ramon... give me strength.'",
                ],
            ),
            text(&["Something with too many legs skitters across the water."]),
            fight("venom_spider", "The spider curls up and sinks beneath the murk."),
            text(&["A lizardman in bone charms chants over a bubbling cauldron."]),
            fight("lizard_shaman", "The shaman's chant breaks off mid-word."),
            text(&["The swamp heaves. Three serpent heads rise from the water at once."]),
            boss("swamp_hydra", "The hydra's last head slumps into the mud."),
            titled(
                "END OF PHASE 3",
                &["Half-buried in the bank lies a bronze shield, green with age but solid."],
            ),
            gear_reward("bronze_shield"),
        ],
    )
}

fn phase_4() -> PhaseScript {
    phase(
        "Nullhaven",
        vec![
            titled(
                "PHASE 4: NULLHAVEN, CITY OF REFUGE",
                &[
                    "After days of terror, Manu smells salt and fresh bread. Human voices. Children laughing.",
                    "On the horizon, the Tower of the Null Pointer still casts its shadow.",
                ],
            ),
            Step::Reward(Reward {
                items: vec![("healing_potion".to_string(), 3), ("mana_potion".to_string(), 1)],
                restore: true,
                ..Reward::default()
            }),
            text(&[
                "At the docks, an old sailor struggles with a net tangled around his boat.",
                "'Please, miss, the tide's turning. I'll lose the boat.'",
            ]),
            Step::Choice {
                prompt: "Help the old sailor?".to_string(),
                options: vec![
                    ChoiceOption {
                        label: "Help him free the boat".to_string(),
                        flag: Some(HELPED_SAILOR_FLAG.to_string()),
                        value: FlagValue::Bool(true),
                    },
                    ChoiceOption {
                        label: "Keep walking".to_string(),
                        flag: Some(HELPED_SAILOR_FLAG.to_string()),
                        value: FlagValue::Bool(false),
                    },
                ],
            },
            Step::Branch {
                flag: HELPED_SAILOR_FLAG.to_string(),
                equals: FlagValue::Bool(false),
                skip: 2,
            },
            text(&[
                "The sailor grins. 'The ghost ship's crew fears the dawn bell. Ring it and the officer will not stand in your way.'",
            ]),
            Step::Reward(Reward {
                items: vec![("fire_flask".to_string(), 2)],
                gold: 50,
                ..Reward::default()
            }),
            titled(
                "END OF PHASE 4",
                &["As night falls, an unnatural fog rolls in from the sea."],
            ),
        ],
    )
}

fn phase_5() -> PhaseScript {
    phase(
        "The Spectral Vengeance",
        vec![
            titled(
                "PHASE 5: THE SPECTRAL VENGEANCE",
                &[
                    "A ship that should not exist floats on the fog, its torn sails moving without wind.",
                    "The gangplank crumbles to dust behind her. There is no way back.",
                ],
            ),
            text(&["A translucent figure takes shape on the deck. 'Mortal... on our ship...'"]),
            fight(
                "spectral_pirate",
                "The pirate fades with a sigh of relief, finally free of his curse.",
            ),
            Step::Branch {
                flag: HELPED_SAILOR_FLAG.to_string(),
                equals: FlagValue::Bool(true),
                skip: 2,
            },
            text(&[
                "A ghost officer bars the captain's cabin. 'I still have my honor, even in death.'",
            ]),
            fight("ghost_officer", "The officer salutes as he fades."),
            text(&["Captain Drybones rises from his throne of rotten planks."]),
            boss(
                "captain_drybones",
                "The captain's bones scatter across the deck. The fog begins to lift.",
            ),
            titled(
                "END OF PHASE 5",
                &["In the captain's cabin hangs an enchanted scimitar, its runes glowing faintly."],
            ),
            gear_reward("enchanted_scimitar"),
        ],
    )
}

fn phase_6() -> PhaseScript {
    phase(
        "The Rocky Shores",
        vec![
            titled(
                "PHASE 6: THE ROCKY SHORES",
                &["The ship runs aground on a coast of black rock and crashing waves."],
            ),
            text(&["One of the rocks moves. A crab the size of a cart clacks its claws."]),
            fight("rockshell_crab", "The crab's shell cracks open."),
            text(&["A song drifts over the water, beautiful and wrong."]),
            fight("ominous_siren", "The song ends in a shriek."),
            text(&["The sea boils. Tentacles as thick as trees rise from the deep."]),
            boss("young_kraken", "The kraken sinks back into the dark water."),
            titled(
                "END OF PHASE 6",
                &["Washed up on the rocks lies a suit of reinforced steel armor."],
            ),
            gear_reward("reinforced_steel_armor"),
        ],
    )
}

fn phase_7() -> PhaseScript {
    phase(
        "The Windswept Cliff",
        vec![
            titled(
                "PHASE 7: THE WINDSWEPT CLIFF",
                &["The path to the tower climbs a cliff where the wind never stops howling."],
            ),
            text(&["A shriek from above. A harpy dives, claws first."]),
            fight("harpy", "The harpy tumbles into the abyss."),
            text(&["Another shriek answers the first."]),
            fight("harpy", "The second harpy follows the first."),
            text(&["At the summit, a great griffin spreads its wings over its nest."]),
            boss("alpha_griffin", "The griffin bows its head and lets her pass."),
            titled(
                "END OF PHASE 7",
                &["In the nest, among bones and feathers, rests a steel shield."],
            ),
            gear_reward("steel_shield"),
        ],
    )
}

fn phase_8() -> PhaseScript {
    phase(
        "The Shadowed Hall",
        vec![
            titled(
                "PHASE 8: THE SHADOWED HALL",
                &["The doors of Zorg's tower open on their own. Inside, statues line the hall."],
            ),
            text(&["One of the statues turns its head."]),
            fight("stone_gargoyle", "The gargoyle crumbles to gravel."),
            text(&["The floor shakes with heavy iron footsteps."]),
            boss("iron_golem", "The golem grinds to a halt, its core dark."),
            titled(
                "END OF PHASE 8",
                &["A spiral staircase leads up into silence."],
            ),
            Step::Reward(Reward {
                restore: true,
                ..Reward::default()
            }),
        ],
    )
}

fn phase_9() -> PhaseScript {
    phase(
        "The Forbidden Library",
        vec![
            titled(
                "PHASE 9: THE FORBIDDEN LIBRARY",
                &["Books float in the air and runes on the walls pulse like exposed veins."],
            ),
            text(&["A heavy tome snaps open, its pages sharp as teeth."]),
            fight("cursed_book", "The book slams shut and falls to ashes."),
            text(&["A robed figure steps out between the shelves. 'The master is not to be disturbed.'"]),
            boss("dark_mage", "The mage dissolves into a cloud of black smoke."),
            titled(
                "END OF PHASE 9",
                &[
                    "On a lectern lies a spell of light, and beside it a sword carved with runes.",
                ],
            ),
            Step::Reward(Reward {
                abilities: vec!["light_shield".to_string()],
                equipment: vec!["runic_sword".to_string()],
                ..Reward::default()
            }),
        ],
    )
}

fn phase_10() -> PhaseScript {
    phase(
        "The Top of the Tower",
        vec![
            titled(
                "PHASE 10: THE TOP OF THE TOWER",
                &[
                    "At the top of the tower, Ramon hangs in a cage of crackling light.",
                    "Zorg turns from the window. 'You came all this way to die beside him?'",
                ],
            ),
            boss("sorcerer_zorg", "Zorg falls, and the cage of light flickers out."),
            text(&["Manu catches Ramon as the bars vanish. 'I promised I would find you.'"]),
            titled(
                "THE END",
                &["Together they walk down the tower stairs into the dawn."],
            ),
        ],
    )
}
