//! Magic item database.
//!
//! Items are the same shape as feats: a name, a source, a price, and an
//! equip effect that wires a handful of constants into the character's
//! trackers. Equipping twice stacks (or doesn't) purely by the rules of
//! the trackers the item touches.

use crate::character::Character;
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

const CORE_RULEBOOK: &str = "Core Rulebook";

/// A wondrous item, armor, or other equipment with a statistical effect.
pub struct MagicItem {
    pub name: String,
    pub source: &'static str,
    pub price_gp: u32,
    effect: Box<dyn Fn(&Character) + Send + Sync>,
}

impl MagicItem {
    pub fn new(
        name: impl Into<String>,
        source: &'static str,
        price_gp: u32,
        effect: impl Fn(&Character) + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            source,
            price_gp,
            effect: Box::new(effect),
        }
    }

    /// Apply this item's effect to the wearer.
    pub fn equip(&self, character: &Character) {
        (self.effect)(character);
    }
}

impl fmt::Debug for MagicItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MagicItem")
            .field("name", &self.name)
            .field("source", &self.source)
            .field("price_gp", &self.price_gp)
            .finish()
    }
}

impl fmt::Display for MagicItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} gp)", self.name, self.price_gp)
    }
}

// ============================================================================
// Item Database
// ============================================================================

/// Global item database, keyed by lowercase name.
static ITEM_DATABASE: LazyLock<HashMap<String, MagicItem>> = LazyLock::new(build_item_database);

/// Look up an item by name (case-insensitive).
pub fn get_item(name: &str) -> Option<&'static MagicItem> {
    ITEM_DATABASE.get(&name.to_lowercase())
}

/// All items in the database.
pub fn all_items() -> impl Iterator<Item = &'static MagicItem> {
    ITEM_DATABASE.values()
}

fn build_item_database() -> HashMap<String, MagicItem> {
    let items = vec![
        MagicItem::new("Ring of Protection +1", CORE_RULEBOOK, 2_000, |character| {
            character.armor_class.deflection.add_flat(1);
        }),
        MagicItem::new("Amulet of Natural Armor +1", CORE_RULEBOOK, 2_000, |character| {
            character.armor_class.natural_armor.add_flat(1);
        }),
        MagicItem::new("Cloak of Resistance +1", CORE_RULEBOOK, 1_000, |character| {
            for save in character.saves() {
                save.resistance.add_flat(1);
            }
        }),
        MagicItem::new("Dusty Rose Prism Ioun Stone", CORE_RULEBOOK, 5_000, |character| {
            character.armor_class.insight.add_flat(1);
        }),
        MagicItem::new("Stone of Good Luck", CORE_RULEBOOK, 20_000, |character| {
            for save in character.saves() {
                save.luck.add_flat(1);
            }
        }),
        MagicItem::new(
            "Boots of Striding and Springing",
            CORE_RULEBOOK,
            5_500,
            |character| {
                character.speed.enhancement.add_flat(10);
            },
        ),
        MagicItem::new("+1 Chain Shirt", CORE_RULEBOOK, 1_250, |character| {
            character.armor_class.armor.add_flat(5);
        }),
        MagicItem::new("Heavy Steel Shield", CORE_RULEBOOK, 20, |character| {
            character.armor_class.shield.add_flat(2);
        }),
        MagicItem::new("Adamantine Breastplate", CORE_RULEBOOK, 10_200, |character| {
            character.armor_class.armor.add_flat(6);
            character
                .damage_reduction
                .add_flat("-", 2)
                .expect("bypass descriptor is not blank");
        }),
    ];
    items
        .into_iter()
        .map(|item| (item.name.to_lowercase(), item))
        .collect()
}
