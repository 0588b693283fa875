//! Derived character statistics.
//!
//! Each statistic owns its bonus trackers, holds shared handles to the
//! state it is keyed on (ability score, level, size), and recomputes its
//! total from scratch on every read. There is no caching anywhere, so the
//! dependency graph is walked fresh each call and always reflects the
//! current state.
//!
//! Cross-statistic reads form a shallow acyclic graph: the combat maneuver
//! statistics read base attack and armor class, and nothing reads them
//! back.

use crate::abilities::AbilityScore;
use crate::bonus::{BonusTracker, BonusType};
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

/// Convert a composite sum back to the statistic's range, fatally on
/// overflow rather than clamping.
fn narrow(statistic: &str, total: i64) -> i32 {
    i32::try_from(total).unwrap_or_else(|_| {
        panic!("{statistic} total {total} exceeds the representable range")
    })
}

// ============================================================================
// Size
// ============================================================================

/// Creature size categories covered by the formula tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Size {
    Small,
    Medium,
    Large,
}

impl Size {
    pub fn name(&self) -> &'static str {
        match self {
            Size::Small => "Small",
            Size::Medium => "Medium",
            Size::Large => "Large",
        }
    }

    /// Size modifier to armor class and attack rolls.
    pub fn modifier(&self) -> i32 {
        match self {
            Size::Small => 1,
            Size::Medium => 0,
            Size::Large => -1,
        }
    }

    /// Special size modifier used by combat maneuvers, which favors bulk.
    pub fn special_modifier(&self) -> i32 {
        match self {
            Size::Small => -1,
            Size::Medium => 0,
            Size::Large => 1,
        }
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// Base Attack Bonus
// ============================================================================

/// Per-level base attack progression: full (1.00), three-quarters (0.75),
/// or half (0.50), applied as `floor(level * rate)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BabProgression {
    Full,
    ThreeQuarters,
    Half,
}

impl BabProgression {
    pub fn name(&self) -> &'static str {
        match self {
            BabProgression::Full => "full",
            BabProgression::ThreeQuarters => "three-quarters",
            BabProgression::Half => "half",
        }
    }

    pub fn base_bonus(&self, level: u8) -> i32 {
        let level = i32::from(level);
        match self {
            BabProgression::Full => level,
            BabProgression::ThreeQuarters => level * 3 / 4,
            BabProgression::Half => level / 2,
        }
    }
}

/// Base attack bonus, derived entirely from level and progression.
#[derive(Debug)]
pub struct BaseAttackBonus {
    progression: BabProgression,
    level: Rc<Cell<u8>>,
}

impl BaseAttackBonus {
    pub fn new(progression: BabProgression, level: Rc<Cell<u8>>) -> Self {
        Self { progression, level }
    }

    pub fn progression(&self) -> BabProgression {
        self.progression
    }

    pub fn total(&self) -> i32 {
        self.progression.base_bonus(self.level.get())
    }
}

// ============================================================================
// Saving Throws
// ============================================================================

/// Whether a save uses the good or the poor level progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SaveProgression {
    Good,
    Poor,
}

impl SaveProgression {
    pub fn name(&self) -> &'static str {
        match self {
            SaveProgression::Good => "good",
            SaveProgression::Poor => "poor",
        }
    }

    /// Good saves start at +2 and gain every other level; poor saves gain
    /// every third level.
    pub fn base_bonus(&self, level: u8) -> i32 {
        let level = i32::from(level);
        match self {
            SaveProgression::Good => 2 + level / 2,
            SaveProgression::Poor => level / 3,
        }
    }
}

/// The three saving throws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Save {
    Fortitude,
    Reflex,
    Will,
}

impl Save {
    pub fn name(&self) -> &'static str {
        match self {
            Save::Fortitude => "Fortitude",
            Save::Reflex => "Reflex",
            Save::Will => "Will",
        }
    }

    pub fn all() -> [Save; 3] {
        [Save::Fortitude, Save::Reflex, Save::Will]
    }
}

impl fmt::Display for Save {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A saving throw: level-derived base, key ability modifier, and its own
/// bonus trackers.
#[derive(Debug)]
pub struct SavingThrow {
    save: Save,
    progression: SaveProgression,
    level: Rc<Cell<u8>>,
    key_ability: Rc<AbilityScore>,
    pub resistance: BonusTracker,
    pub luck: BonusTracker,
    pub untyped: BonusTracker,
    pub penalty: BonusTracker,
}

impl SavingThrow {
    pub fn new(
        save: Save,
        progression: SaveProgression,
        level: Rc<Cell<u8>>,
        key_ability: Rc<AbilityScore>,
    ) -> Self {
        Self {
            save,
            progression,
            level,
            key_ability,
            resistance: BonusTracker::of(BonusType::Resistance),
            luck: BonusTracker::of(BonusType::Luck),
            untyped: BonusTracker::of(BonusType::Untyped),
            penalty: BonusTracker::of(BonusType::Penalty),
        }
    }

    pub fn save(&self) -> Save {
        self.save
    }

    pub fn progression(&self) -> SaveProgression {
        self.progression
    }

    /// The level-derived part of the save, before ability and bonuses.
    pub fn base_bonus(&self) -> i32 {
        self.progression.base_bonus(self.level.get())
    }

    pub fn total(&self) -> i32 {
        let total = i64::from(self.base_bonus())
            + i64::from(self.key_ability.modifier())
            + i64::from(self.resistance.total())
            + i64::from(self.luck.total())
            + i64::from(self.untyped.total())
            - i64::from(self.penalty.total());
        narrow("saving throw", total)
    }
}

// ============================================================================
// Initiative
// ============================================================================

/// Initiative: Dexterity modifier plus bonuses, minus penalties.
#[derive(Debug)]
pub struct Initiative {
    dexterity: Rc<AbilityScore>,
    pub luck: BonusTracker,
    pub untyped: BonusTracker,
    pub penalty: BonusTracker,
}

impl Initiative {
    pub fn new(dexterity: Rc<AbilityScore>) -> Self {
        Self {
            dexterity,
            luck: BonusTracker::of(BonusType::Luck),
            untyped: BonusTracker::of(BonusType::Untyped),
            penalty: BonusTracker::of(BonusType::Penalty),
        }
    }

    pub fn total(&self) -> i32 {
        let total = i64::from(self.dexterity.modifier())
            + i64::from(self.luck.total())
            + i64::from(self.untyped.total())
            - i64::from(self.penalty.total());
        narrow("initiative", total)
    }
}

// ============================================================================
// Armor Class
// ============================================================================

/// Armor class and its typed trackers.
///
/// The combat maneuver defense borrows the deflection, dodge, and insight
/// totals from here, so the two statistics can never drift apart.
#[derive(Debug)]
pub struct ArmorClass {
    dexterity: Rc<AbilityScore>,
    size: Rc<Cell<Size>>,
    pub armor: BonusTracker,
    pub shield: BonusTracker,
    pub natural_armor: BonusTracker,
    pub deflection: BonusTracker,
    pub dodge: BonusTracker,
    pub insight: BonusTracker,
    pub penalty: BonusTracker,
}

impl ArmorClass {
    pub fn new(dexterity: Rc<AbilityScore>, size: Rc<Cell<Size>>) -> Self {
        Self {
            dexterity,
            size,
            armor: BonusTracker::of(BonusType::Armor),
            shield: BonusTracker::of(BonusType::Shield),
            natural_armor: BonusTracker::of(BonusType::NaturalArmor),
            deflection: BonusTracker::of(BonusType::Deflection),
            dodge: BonusTracker::of(BonusType::Dodge),
            insight: BonusTracker::of(BonusType::Insight),
            penalty: BonusTracker::of(BonusType::Penalty),
        }
    }

    pub fn total(&self) -> i32 {
        let total = 10
            + i64::from(self.dexterity.modifier())
            + i64::from(self.size.get().modifier())
            + i64::from(self.armor.total())
            + i64::from(self.shield.total())
            + i64::from(self.natural_armor.total())
            + i64::from(self.deflection.total())
            + i64::from(self.dodge.total())
            + i64::from(self.insight.total())
            - i64::from(self.penalty.total());
        narrow("armor class", total)
    }

    /// Armor class against touch attacks: armor, shield, and natural armor
    /// do not apply.
    pub fn touch(&self) -> i32 {
        let total = 10
            + i64::from(self.dexterity.modifier())
            + i64::from(self.size.get().modifier())
            + i64::from(self.deflection.total())
            + i64::from(self.dodge.total())
            + i64::from(self.insight.total())
            - i64::from(self.penalty.total());
        narrow("touch armor class", total)
    }

    /// Armor class while flat-footed: no Dexterity, no dodge bonuses.
    pub fn flat_footed(&self) -> i32 {
        let total = 10
            + i64::from(self.size.get().modifier())
            + i64::from(self.armor.total())
            + i64::from(self.shield.total())
            + i64::from(self.natural_armor.total())
            + i64::from(self.deflection.total())
            + i64::from(self.insight.total())
            - i64::from(self.penalty.total());
        narrow("flat-footed armor class", total)
    }
}

// ============================================================================
// Combat Maneuvers
// ============================================================================

/// Combat maneuver bonus: base attack, Strength, and the special size
/// modifier.
#[derive(Debug)]
pub struct CombatManeuverBonus {
    base_attack: Rc<BaseAttackBonus>,
    strength: Rc<AbilityScore>,
    size: Rc<Cell<Size>>,
    pub untyped: BonusTracker,
    pub penalty: BonusTracker,
}

impl CombatManeuverBonus {
    pub fn new(
        base_attack: Rc<BaseAttackBonus>,
        strength: Rc<AbilityScore>,
        size: Rc<Cell<Size>>,
    ) -> Self {
        Self {
            base_attack,
            strength,
            size,
            untyped: BonusTracker::of(BonusType::Untyped),
            penalty: BonusTracker::of(BonusType::Penalty),
        }
    }

    pub fn total(&self) -> i32 {
        let total = i64::from(self.base_attack.total())
            + i64::from(self.strength.modifier())
            + i64::from(self.size.get().special_modifier())
            + i64::from(self.untyped.total())
            - i64::from(self.penalty.total());
        narrow("combat maneuver bonus", total)
    }
}

/// Combat maneuver defense: 10 plus base attack, Strength, Dexterity, the
/// special size modifier, and the deflection, dodge, and insight totals
/// borrowed from the character's armor class.
#[derive(Debug)]
pub struct CombatManeuverDefense {
    base_attack: Rc<BaseAttackBonus>,
    strength: Rc<AbilityScore>,
    dexterity: Rc<AbilityScore>,
    size: Rc<Cell<Size>>,
    armor_class: Rc<ArmorClass>,
    pub untyped: BonusTracker,
    pub penalty: BonusTracker,
}

impl CombatManeuverDefense {
    pub fn new(
        base_attack: Rc<BaseAttackBonus>,
        strength: Rc<AbilityScore>,
        dexterity: Rc<AbilityScore>,
        size: Rc<Cell<Size>>,
        armor_class: Rc<ArmorClass>,
    ) -> Self {
        Self {
            base_attack,
            strength,
            dexterity,
            size,
            armor_class,
            untyped: BonusTracker::of(BonusType::Untyped),
            penalty: BonusTracker::of(BonusType::Penalty),
        }
    }

    pub fn total(&self) -> i32 {
        let total = 10
            + i64::from(self.base_attack.total())
            + i64::from(self.strength.modifier())
            + i64::from(self.dexterity.modifier())
            + i64::from(self.size.get().special_modifier())
            + i64::from(self.armor_class.deflection.total())
            + i64::from(self.armor_class.dodge.total())
            + i64::from(self.armor_class.insight.total())
            + i64::from(self.untyped.total())
            - i64::from(self.penalty.total());
        narrow("combat maneuver defense", total)
    }
}

// ============================================================================
// Movement
// ============================================================================

/// Movement speed: an optional base speed plus enhancement bonuses.
///
/// The total is absent until a base speed has been set.
#[derive(Debug)]
pub struct Movement {
    base_speed: Cell<Option<u32>>,
    pub enhancement: BonusTracker,
}

impl Movement {
    pub fn new() -> Self {
        Self {
            base_speed: Cell::new(None),
            enhancement: BonusTracker::of(BonusType::Enhancement),
        }
    }

    pub fn base_speed(&self) -> Option<u32> {
        self.base_speed.get()
    }

    pub fn set_base_speed(&self, feet: u32) {
        self.base_speed.set(Some(feet));
    }

    pub fn total(&self) -> Option<u32> {
        let base = self.base_speed.get()?;
        let total = i64::from(base) + i64::from(self.enhancement.total());
        Some(u32::try_from(total).unwrap_or_else(|_| {
            panic!("movement total {total} exceeds the representable range")
        }))
    }
}

impl Default for Movement {
    fn default() -> Self {
        Self::new()
    }
}
