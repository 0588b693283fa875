//! The character aggregate.
//!
//! A character owns every tracker and derived statistic for its lifetime,
//! all created exactly once at construction. Statistics hold shared
//! handles to the level, size, and ability scores they are keyed on, so a
//! mutation here is visible on their next read with no invalidation step.

use crate::abilities::{Ability, AbilityScore, AbilityScores};
use crate::damage_reduction::DamageReduction;
use crate::spells::Spellbook;
use crate::statistics::{
    ArmorClass, BabProgression, BaseAttackBonus, CombatManeuverBonus, CombatManeuverDefense,
    Initiative, Movement, Save, SaveProgression, SavingThrow, Size,
};
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use thiserror::Error;
use uuid::Uuid;

/// The legal character level range.
pub const MIN_LEVEL: u8 = 1;
pub const MAX_LEVEL: u8 = 20;

/// Unique identifier for characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CharacterId(pub Uuid);

impl CharacterId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CharacterId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error from character construction or mutation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CharacterError {
    #[error("character level must be between 1 and 20, got {0}")]
    LevelOutOfRange(u8),
}

/// A class's progressions: base attack plus the three saves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassProfile {
    pub base_attack: BabProgression,
    pub fortitude: SaveProgression,
    pub reflex: SaveProgression,
    pub will: SaveProgression,
}

impl ClassProfile {
    pub fn fighter() -> Self {
        Self {
            base_attack: BabProgression::Full,
            fortitude: SaveProgression::Good,
            reflex: SaveProgression::Poor,
            will: SaveProgression::Poor,
        }
    }

    pub fn rogue() -> Self {
        Self {
            base_attack: BabProgression::ThreeQuarters,
            fortitude: SaveProgression::Poor,
            reflex: SaveProgression::Good,
            will: SaveProgression::Poor,
        }
    }

    pub fn cleric() -> Self {
        Self {
            base_attack: BabProgression::ThreeQuarters,
            fortitude: SaveProgression::Good,
            reflex: SaveProgression::Poor,
            will: SaveProgression::Good,
        }
    }

    pub fn wizard() -> Self {
        Self {
            base_attack: BabProgression::Half,
            fortitude: SaveProgression::Poor,
            reflex: SaveProgression::Poor,
            will: SaveProgression::Good,
        }
    }
}

/// One character: ability scores, derived statistics, damage reduction,
/// and the spellbook registration channel.
#[derive(Debug)]
pub struct Character {
    pub id: CharacterId,
    pub name: String,
    level: Rc<Cell<u8>>,
    size: Rc<Cell<Size>>,
    pub abilities: AbilityScores,
    pub base_attack: Rc<BaseAttackBonus>,
    pub armor_class: Rc<ArmorClass>,
    pub maneuver_bonus: CombatManeuverBonus,
    pub maneuver_defense: CombatManeuverDefense,
    pub fortitude: SavingThrow,
    pub reflex: SavingThrow,
    pub will: SavingThrow,
    pub initiative: Initiative,
    pub speed: Movement,
    pub damage_reduction: DamageReduction,
    pub spellbook: Spellbook,
}

impl Character {
    /// Create a character and wire up all of its statistics.
    ///
    /// Fails if `level` is outside [`MIN_LEVEL`]..=[`MAX_LEVEL`].
    pub fn new(
        name: impl Into<String>,
        level: u8,
        size: Size,
        abilities: AbilityScores,
        profile: ClassProfile,
    ) -> Result<Self, CharacterError> {
        if !(MIN_LEVEL..=MAX_LEVEL).contains(&level) {
            return Err(CharacterError::LevelOutOfRange(level));
        }

        let level = Rc::new(Cell::new(level));
        let size = Rc::new(Cell::new(size));
        let base_attack = Rc::new(BaseAttackBonus::new(profile.base_attack, level.clone()));
        let armor_class = Rc::new(ArmorClass::new(abilities.dexterity.clone(), size.clone()));

        Ok(Self {
            id: CharacterId::new(),
            name: name.into(),
            maneuver_bonus: CombatManeuverBonus::new(
                base_attack.clone(),
                abilities.strength.clone(),
                size.clone(),
            ),
            maneuver_defense: CombatManeuverDefense::new(
                base_attack.clone(),
                abilities.strength.clone(),
                abilities.dexterity.clone(),
                size.clone(),
                armor_class.clone(),
            ),
            fortitude: SavingThrow::new(
                Save::Fortitude,
                profile.fortitude,
                level.clone(),
                abilities.constitution.clone(),
            ),
            reflex: SavingThrow::new(
                Save::Reflex,
                profile.reflex,
                level.clone(),
                abilities.dexterity.clone(),
            ),
            will: SavingThrow::new(
                Save::Will,
                profile.will,
                level.clone(),
                abilities.wisdom.clone(),
            ),
            initiative: Initiative::new(abilities.dexterity.clone()),
            speed: Movement::new(),
            damage_reduction: DamageReduction::new(),
            spellbook: Spellbook::new(),
            base_attack,
            armor_class,
            abilities,
            level,
            size,
        })
    }

    pub fn level(&self) -> u8 {
        self.level.get()
    }

    /// Change the character's level. Every level-derived statistic
    /// reflects the new value on its next read.
    pub fn set_level(&self, level: u8) -> Result<(), CharacterError> {
        if !(MIN_LEVEL..=MAX_LEVEL).contains(&level) {
            return Err(CharacterError::LevelOutOfRange(level));
        }
        self.level.set(level);
        Ok(())
    }

    pub fn size(&self) -> Size {
        self.size.get()
    }

    pub fn set_size(&self, size: Size) {
        self.size.set(size);
    }

    /// The shared holder of a given ability score.
    pub fn ability(&self, ability: Ability) -> &Rc<AbilityScore> {
        self.abilities.get(ability)
    }

    pub fn saving_throw(&self, save: Save) -> &SavingThrow {
        match save {
            Save::Fortitude => &self.fortitude,
            Save::Reflex => &self.reflex,
            Save::Will => &self.will,
        }
    }

    /// All three saves, for effects that touch every save at once.
    pub fn saves(&self) -> [&SavingThrow; 3] {
        [&self.fortitude, &self.reflex, &self.will]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fighter(level: u8) -> Result<Character, CharacterError> {
        Character::new(
            "Valeros",
            level,
            Size::Medium,
            AbilityScores::new(16, 14, 14, 10, 12, 8),
            ClassProfile::fighter(),
        )
    }

    #[test]
    fn test_level_range_is_enforced() {
        assert_eq!(
            fighter(0).unwrap_err(),
            CharacterError::LevelOutOfRange(0)
        );
        assert_eq!(
            fighter(21).unwrap_err(),
            CharacterError::LevelOutOfRange(21)
        );
        assert!(fighter(1).is_ok());
        assert!(fighter(20).is_ok());
    }

    #[test]
    fn test_set_level_revalidates() {
        let character = fighter(5).unwrap();
        assert_eq!(
            character.set_level(0),
            Err(CharacterError::LevelOutOfRange(0))
        );
        assert_eq!(character.level(), 5);

        character.set_level(9).unwrap();
        assert_eq!(character.level(), 9);
        assert_eq!(character.base_attack.total(), 9);
    }

    #[test]
    fn test_construction_wires_the_statistics() {
        let character = fighter(1).unwrap();
        // Full progression at level 1.
        assert_eq!(character.base_attack.total(), 1);
        // Good Fortitude (+2 base) + CON 2.
        assert_eq!(character.fortitude.total(), 4);
        // Poor Will (+0 base) + WIS 1.
        assert_eq!(character.will.total(), 1);
        // DEX 2 flows into initiative and armor class.
        assert_eq!(character.initiative.total(), 2);
        assert_eq!(character.armor_class.total(), 12);
        // CMB: 1 BAB + 3 STR; CMD: 10 + 1 + 3 + 2.
        assert_eq!(character.maneuver_bonus.total(), 4);
        assert_eq!(character.maneuver_defense.total(), 16);
        // No base speed until the race or player sets one.
        assert_eq!(character.speed.total(), None);
        assert!(character.damage_reduction.all().is_empty());
        assert!(character.spellbook.is_empty());
    }

    #[test]
    fn test_ability_changes_flow_into_statistics() {
        let character = fighter(1).unwrap();
        character.abilities.set(Ability::Dexterity, 20);
        assert_eq!(character.initiative.total(), 5);
        assert_eq!(character.armor_class.total(), 15);
        assert_eq!(character.maneuver_defense.total(), 19);
    }

    #[test]
    fn test_size_changes_flow_into_statistics() {
        let character = fighter(1).unwrap();
        let medium_cmb = character.maneuver_bonus.total();
        let medium_ac = character.armor_class.total();

        character.set_size(Size::Large);
        assert_eq!(character.maneuver_bonus.total(), medium_cmb + 1);
        assert_eq!(character.armor_class.total(), medium_ac - 1);
    }

    #[test]
    fn test_class_profiles() {
        let wizard = ClassProfile::wizard();
        assert_eq!(wizard.base_attack, BabProgression::Half);
        assert_eq!(wizard.will, SaveProgression::Good);
        assert_eq!(wizard.fortitude, SaveProgression::Poor);

        let cleric = ClassProfile::cleric();
        assert_eq!(cleric.base_attack, BabProgression::ThreeQuarters);
        assert_eq!(cleric.reflex, SaveProgression::Poor);
    }

    #[test]
    fn test_character_ids_are_unique() {
        let a = fighter(1).unwrap();
        let b = fighter(1).unwrap();
        assert_ne!(a.id, b.id);
        assert!(!a.id.to_string().is_empty());
    }
}
