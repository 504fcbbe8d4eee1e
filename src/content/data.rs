//! Built-in item, equipment, ability, and enemy tables.

use super::StartingKit;
use crate::abilities::{Ability, AbilityEffect, AbilityUnlock, DamageFormula, DamageSpec, TargetRule};
use crate::character::attributes::Attributes;
use crate::character::status::{StatusEffect, StatusKind};
use crate::combat::elements::{Affinities, Affinity, Element};
use crate::combat::types::{AiPolicy, EnemyTemplate, OnHit};
use crate::items::{
    EquipmentPiece, EquipmentSlot, ItemCategory, ItemDef, ItemEffect, LootEntry, LootTable, Rarity,
};

fn item(id: &str, name: &str, description: &str, price: u64, effect: ItemEffect) -> ItemDef {
    ItemDef {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        category: ItemCategory::Consumable,
        price,
        effect,
    }
}

pub fn items() -> Vec<ItemDef> {
    vec![
        item(
            "healing_potion",
            "Healing Potion",
            "A simple potion that restores 30 HP.",
            50,
            ItemEffect {
                heal_hp: 30,
                ..ItemEffect::default()
            },
        ),
        item(
            "greater_healing_potion",
            "Greater Healing Potion",
            "A thick red draught that restores 80 HP.",
            150,
            ItemEffect {
                heal_hp: 80,
                ..ItemEffect::default()
            },
        ),
        item(
            "antidote",
            "Antidote",
            "A bitter herb that neutralizes poison.",
            75,
            ItemEffect {
                cure: vec![StatusKind::Poison],
                ..ItemEffect::default()
            },
        ),
        item(
            "mana_potion",
            "Mana Potion",
            "A shimmering blue liquid that restores 25 MP.",
            60,
            ItemEffect {
                restore_mp: 25,
                ..ItemEffect::default()
            },
        ),
        item(
            "fire_flask",
            "Fire Flask",
            "Bursts into flame on impact.",
            80,
            ItemEffect {
                damage: 25,
                ..ItemEffect::default()
            },
        ),
        ItemDef {
            id: "leather_map".to_string(),
            name: "Leather Map".to_string(),
            description: "A rough map pointing to the Echoing Caves.".to_string(),
            category: ItemCategory::KeyItem,
            price: 0,
            effect: ItemEffect::default(),
        },
    ]
}

/// Weapons carry strength, armor and shields carry defense.
fn gear(id: &str, name: &str, slot: EquipmentSlot, rarity: Rarity, bonus: u32, price: u64) -> EquipmentPiece {
    let bonuses = match slot {
        EquipmentSlot::Weapon => Attributes::new(bonus, 0, 0, 0),
        _ => Attributes::new(0, bonus, 0, 0),
    };
    EquipmentPiece {
        id: id.to_string(),
        name: name.to_string(),
        slot,
        rarity,
        bonuses,
        grants_ability: None,
        price,
    }
}

pub fn equipment() -> Vec<EquipmentPiece> {
    use EquipmentSlot::*;
    vec![
        gear("rusty_dagger", "Rusty Dagger", Weapon, Rarity::Common, 3, 10),
        gear("short_sword", "Short Sword", Weapon, Rarity::Common, 6, 50),
        gear("enchanted_scimitar", "Enchanted Scimitar", Weapon, Rarity::Rare, 10, 150),
        EquipmentPiece {
            grants_ability: Some("flame_strike".to_string()),
            ..gear("runic_sword", "Runic Sword", Weapon, Rarity::Epic, 15, 400)
        },
        gear("cloth_clothes", "Cloth Clothes", Armor, Rarity::Common, 1, 5),
        gear("leather_armor", "Leather Armor", Armor, Rarity::Common, 3, 25),
        gear("reinforced_steel_armor", "Reinforced Steel Armor", Armor, Rarity::Rare, 6, 100),
        gear("wooden_shield", "Wooden Shield", Shield, Rarity::Common, 2, 15),
        gear("bronze_shield", "Bronze Shield", Shield, Rarity::Common, 4, 40),
        gear("steel_shield", "Steel Shield", Shield, Rarity::Rare, 7, 120),
    ]
}

fn ability(
    id: &str,
    name: &str,
    mp_cost: u32,
    target: TargetRule,
    element: Element,
    effect: AbilityEffect,
) -> Ability {
    Ability {
        id: id.to_string(),
        name: name.to_string(),
        description: String::new(),
        mp_cost,
        target,
        element,
        effect,
    }
}

fn strike(formula: DamageFormula, power: u32) -> AbilityEffect {
    AbilityEffect {
        damage: Some(DamageSpec { formula, power }),
        ..AbilityEffect::default()
    }
}

fn buff(kind: StatusKind, duration: u32, magnitude: u32) -> AbilityEffect {
    AbilityEffect {
        inflict: Some(StatusEffect::new(kind, duration, magnitude)),
        ..AbilityEffect::default()
    }
}

pub fn abilities() -> Vec<Ability> {
    use DamageFormula::*;
    use TargetRule::*;
    vec![
        ability("power_strike", "Power Strike", 10, SingleEnemy, Element::Physical, strike(Physical, 20)),
        ability("ice_lance", "Ice Lance", 12, SingleEnemy, Element::Ice, strike(Magical, 25)),
        ability(
            "restoring_touch",
            "Restoring Touch",
            15,
            SingleAlly,
            Element::Divine,
            AbilityEffect {
                heal: 50,
                ..AbilityEffect::default()
            },
        ),
        ability(
            "defensive_stance",
            "Defensive Stance",
            8,
            SelfOnly,
            Element::Neutral,
            buff(StatusKind::DefenseUp, 3, 10),
        ),
        ability(
            "berserker_fury",
            "Berserker Fury",
            20,
            SelfOnly,
            Element::Neutral,
            buff(StatusKind::StrengthUp, 4, 8),
        ),
        ability(
            "vital_regeneration",
            "Vital Regeneration",
            25,
            SelfOnly,
            Element::Nature,
            buff(StatusKind::Regeneration, 5, 8),
        ),
        ability(
            "flame_strike",
            "Flame Strike",
            18,
            SingleEnemy,
            Element::Fire,
            AbilityEffect {
                inflict: Some(StatusEffect::new(StatusKind::Poison, 3, 4)),
                ..strike(Magical, 30)
            },
        ),
        ability("shadow_blade", "Shadow Blade", 14, SingleEnemy, Element::Shadow, strike(Physical, 22)),
        ability(
            "light_shield",
            "Light Shield",
            22,
            SelfOnly,
            Element::Light,
            AbilityEffect {
                heal: 30,
                inflict: Some(StatusEffect::new(StatusKind::DefenseUp, 2, 5)),
                ..AbilityEffect::default()
            },
        ),
        ability("arcane_burst", "Arcane Burst", 16, AllEnemies, Element::Arcane, strike(Magical, 18)),
        ability(
            "natures_blessing",
            "Nature's Blessing",
            20,
            SelfOnly,
            Element::Nature,
            AbilityEffect {
                heal: 25,
                inflict: Some(StatusEffect::new(StatusKind::Regeneration, 3, 5)),
                cure: vec![StatusKind::Poison, StatusKind::Weaken, StatusKind::Stun],
                ..AbilityEffect::default()
            },
        ),
        ability(
            "crippling_hex",
            "Crippling Hex",
            12,
            SingleEnemy,
            Element::Shadow,
            buff(StatusKind::Weaken, 3, 6),
        ),
    ]
}

pub fn unlocks() -> Vec<AbilityUnlock> {
    [
        (2, "restoring_touch"),
        (3, "ice_lance"),
        (5, "berserker_fury"),
        (6, "vital_regeneration"),
        (8, "arcane_burst"),
        (10, "natures_blessing"),
    ]
    .into_iter()
    .map(|(level, id)| AbilityUnlock {
        level,
        ability: id.to_string(),
    })
    .collect()
}

pub fn starting_kit() -> StartingKit {
    StartingKit {
        equipment: vec![
            "rusty_dagger".to_string(),
            "cloth_clothes".to_string(),
            "wooden_shield".to_string(),
        ],
        items: vec![("healing_potion".to_string(), 2), ("antidote".to_string(), 1)],
        abilities: vec!["power_strike".to_string(), "defensive_stance".to_string()],
    }
}

/// Stat line shared by the enemy table: hp, mp, STR, DEF, SPD, MAG, xp, gold.
struct Stats(u32, u32, u32, u32, u32, u32, u64, u64);

fn enemy(id: &str, name: &str, stats: Stats, policy: AiPolicy) -> EnemyTemplate {
    let Stats(hp, mp, strength, defense, speed, magic, xp, gold) = stats;
    EnemyTemplate {
        id: id.to_string(),
        name: name.to_string(),
        max_hp: hp,
        max_mp: mp,
        attributes: Attributes::new(strength, defense, speed, magic),
        xp_yield: xp,
        gold_yield: gold,
        loot: LootTable::default(),
        policy,
        abilities: Vec::new(),
        pouch: Vec::new(),
        affinities: Affinities::default(),
        on_hit: None,
    }
}

fn loot(entries: &[(&str, u32)], nothing_weight: u32) -> LootTable {
    LootTable::new(
        entries
            .iter()
            .map(|(item, weight)| LootEntry {
                item: item.to_string(),
                weight: *weight,
                quantity: 1,
            })
            .collect(),
        nothing_weight,
    )
}

fn poison_on_hit(magnitude: u32, chance_percent: u32) -> Option<OnHit> {
    Some(OnHit {
        status: StatusEffect::new(StatusKind::Poison, 3, magnitude),
        chance_percent,
    })
}

fn ids(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

pub fn enemies() -> Vec<EnemyTemplate> {
    use AiPolicy::*;
    use Affinity::*;
    vec![
        // Phase 1: the Whispering Forest
        EnemyTemplate {
            loot: loot(&[("healing_potion", 30)], 70),
            ..enemy("green_goblin", "Green Goblin", Stats(20, 10, 6, 2, 8, 0, 40, 15), Aggressive)
        },
        EnemyTemplate {
            affinities: Affinities::new(vec![(Element::Light, Weak)]),
            ..enemy("shadow_wolf", "Shadow Wolf", Stats(35, 0, 9, 3, 12, 0, 65, 25), Aggressive)
        },
        EnemyTemplate {
            abilities: ids(&["power_strike"]),
            loot: loot(&[("healing_potion", 1)], 1),
            ..enemy("garg", "Garg, the Goblin Chief", Stats(70, 20, 12, 6, 9, 0, 150, 80), Caster)
        },
        // Phase 2: the Echoing Caves
        EnemyTemplate {
            affinities: Affinities::new(vec![(Element::Shadow, Resist)]),
            ..enemy("giant_bat", "Giant Bat", Stats(40, 0, 13, 2, 15, 0, 80, 30), Aggressive)
        },
        EnemyTemplate {
            affinities: Affinities::new(vec![(Element::Physical, Resist), (Element::Fire, Weak)]),
            on_hit: poison_on_hit(2, 30),
            loot: loot(&[("antidote", 1)], 2),
            ..enemy("acid_slime", "Acid Slime", Stats(70, 0, 10, 6, 4, 0, 100, 50), Aggressive)
        },
        EnemyTemplate {
            abilities: ids(&["vital_regeneration"]),
            affinities: Affinities::new(vec![(Element::Fire, Weak)]),
            loot: loot(&[("leather_armor", 1)], 0),
            ..enemy("cave_troll", "Cave Troll", Stats(120, 30, 16, 8, 6, 0, 300, 150), Tactical)
        },
        // Phase 3: the Whispering Swamp
        EnemyTemplate {
            on_hit: poison_on_hit(4, 50),
            loot: loot(&[("antidote", 1)], 1),
            ..enemy("venom_spider", "Venomous Spider", Stats(60, 0, 15, 6, 13, 0, 150, 60), Aggressive)
        },
        EnemyTemplate {
            abilities: ids(&["restoring_touch", "ice_lance"]),
            pouch: vec![("healing_potion".to_string(), 1)],
            on_hit: poison_on_hit(6, 25),
            ..enemy("lizard_shaman", "Lizardman Shaman", Stats(90, 40, 16, 9, 10, 12, 220, 110), Tactical)
        },
        EnemyTemplate {
            on_hit: poison_on_hit(8, 40),
            affinities: Affinities::new(vec![(Element::Fire, Weak), (Element::Nature, Resist)]),
            loot: loot(&[("bronze_shield", 1)], 0),
            ..enemy("swamp_hydra", "Swamp Hydra", Stats(180, 0, 22, 11, 9, 0, 500, 400), Aggressive)
        },
        // Phase 5: the Spectral Ship
        EnemyTemplate {
            affinities: Affinities::new(vec![(Element::Physical, Resist), (Element::Light, Weak)]),
            ..enemy("spectral_pirate", "Spectral Pirate", Stats(100, 0, 24, 12, 12, 0, 250, 120), Aggressive)
        },
        EnemyTemplate {
            pouch: vec![("healing_potion".to_string(), 2)],
            affinities: Affinities::new(vec![(Element::Light, Weak)]),
            ..enemy("ghost_officer", "Ghost Officer", Stats(140, 0, 26, 14, 11, 0, 350, 180), Defensive)
        },
        EnemyTemplate {
            abilities: ids(&["shadow_blade"]),
            affinities: Affinities::new(vec![(Element::Shadow, Immune), (Element::Light, Weak)]),
            loot: loot(&[("enchanted_scimitar", 1)], 0),
            ..enemy("captain_drybones", "Captain Drybones", Stats(250, 50, 30, 16, 12, 10, 800, 500), Caster)
        },
        // Phase 6: the Siren Coast
        EnemyTemplate {
            abilities: ids(&["defensive_stance"]),
            affinities: Affinities::new(vec![(Element::Ice, Weak), (Element::Physical, Resist)]),
            ..enemy("rockshell_crab", "Rockshell Crab", Stats(80, 20, 26, 22, 5, 0, 300, 150), Tactical)
        },
        EnemyTemplate {
            abilities: ids(&["arcane_burst"]),
            loot: loot(&[("mana_potion", 1)], 1),
            ..enemy("ominous_siren", "Ominous Siren", Stats(120, 60, 28, 10, 14, 20, 400, 200), Caster)
        },
        EnemyTemplate {
            affinities: Affinities::new(vec![(Element::Ice, Resist), (Element::Nature, Weak)]),
            loot: loot(&[("reinforced_steel_armor", 1)], 0),
            ..enemy("young_kraken", "Young Kraken", Stats(300, 0, 32, 18, 10, 0, 1200, 800), Aggressive)
        },
        // Phase 7: the Windswept Peaks
        EnemyTemplate {
            affinities: Affinities::new(vec![(Element::Ice, Weak)]),
            ..enemy("harpy", "Slender Harpy", Stats(150, 0, 34, 14, 20, 0, 500, 250), Aggressive)
        },
        EnemyTemplate {
            abilities: ids(&["natures_blessing"]),
            loot: loot(&[("steel_shield", 1)], 0),
            ..enemy("alpha_griffin", "Alpha Griffin", Stats(350, 80, 36, 22, 18, 10, 1500, 1000), Tactical)
        },
        // Phase 8-9: the Fortress of Zorg
        EnemyTemplate {
            affinities: Affinities::new(vec![(Element::Physical, Resist), (Element::Arcane, Weak)]),
            ..enemy("stone_gargoyle", "Stone Gargoyle", Stats(120, 0, 30, 30, 6, 0, 600, 300), Defensive)
        },
        EnemyTemplate {
            affinities: Affinities::new(vec![(Element::Physical, Resist), (Element::Arcane, Weak)]),
            loot: loot(&[("greater_healing_potion", 1)], 1),
            ..enemy("iron_golem", "Iron Golem", Stats(280, 0, 38, 28, 5, 0, 1800, 1200), Aggressive)
        },
        EnemyTemplate {
            abilities: ids(&["flame_strike"]),
            affinities: Affinities::new(vec![(Element::Fire, Weak)]),
            loot: loot(&[("greater_healing_potion", 1)], 1),
            ..enemy("cursed_book", "Cursed Book", Stats(180, 100, 36, 18, 11, 30, 900, 450), Caster)
        },
        EnemyTemplate {
            abilities: ids(&["ice_lance", "light_shield", "crippling_hex"]),
            pouch: vec![("healing_potion".to_string(), 1)],
            loot: loot(&[("greater_healing_potion", 1)], 0),
            ..enemy("dark_mage", "Dark Mage", Stats(220, 150, 40, 20, 15, 35, 2500, 1500), Tactical)
        },
        // Phase 10: the sorcerer himself
        EnemyTemplate {
            abilities: ids(&["flame_strike", "shadow_blade", "restoring_touch"]),
            on_hit: poison_on_hit(10, 30),
            affinities: Affinities::new(vec![(Element::Shadow, Resist), (Element::Light, Weak)]),
            ..enemy("sorcerer_zorg", "Zorg the Sorcerer", Stats(500, 200, 46, 28, 16, 40, 10000, 5000), Tactical)
        },
    ]
}
