//! Pathfinder character statistics engine.
//!
//! This crate provides:
//! - Bonus trackers with the game's stacking rules (most bonus types
//!   accumulate; a known subset keeps only the best source)
//! - Grouped damage reduction with case-insensitive bypass descriptors
//! - Derived statistics (base attack, armor class, combat maneuvers,
//!   saving throws, initiative, movement) recomputed fresh on every read
//! - Feats and magic items that wire constants into those trackers,
//!   including feats that retroactively reach spells learned later
//!
//! # Quick Start
//!
//! ```
//! use pathfinder_core::{AbilityScores, Character, ClassProfile, Size};
//!
//! let character = Character::new(
//!     "Valeros",
//!     5,
//!     Size::Medium,
//!     AbilityScores::new(16, 14, 14, 10, 12, 8),
//!     ClassProfile::fighter(),
//! )?;
//!
//! pathfinder_core::feats::get_feat("Dodge").unwrap().apply(&character);
//! assert_eq!(character.armor_class.total(), 13);
//! # Ok::<(), pathfinder_core::CharacterError>(())
//! ```

pub mod abilities;
pub mod bonus;
pub mod character;
pub mod damage_reduction;
pub mod feats;
pub mod items;
pub mod spells;
pub mod statistics;

// Primary public API
pub use abilities::{Ability, AbilityScore, AbilityScores};
pub use bonus::{BonusTracker, BonusType, Stacking};
pub use character::{Character, CharacterError, CharacterId, ClassProfile, MAX_LEVEL, MIN_LEVEL};
pub use damage_reduction::{DamageReduction, DamageReductionError, DamageReductionValue};
pub use feats::Feat;
pub use items::MagicItem;
pub use spells::{DifficultyClass, Spell, SpellError, SpellSchool, Spellbook};
pub use statistics::{
    ArmorClass, BabProgression, BaseAttackBonus, CombatManeuverBonus, CombatManeuverDefense,
    Initiative, Movement, Save, SaveProgression, SavingThrow, Size,
};
