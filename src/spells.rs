//! Spells, difficulty classes, and the spellbook registration channel.
//!
//! Registered spells are shared handles so that feats can keep adjusting a
//! spell's difficulty class after registration. The spellbook doubles as a
//! notification channel: subscribers hear about every spell registered
//! after they signed up, which is how a trained feat reaches spells that
//! do not exist yet.

use crate::abilities::AbilityScore;
use crate::bonus::{BonusTracker, BonusType};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use thiserror::Error;

/// Schools of magic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpellSchool {
    Abjuration,
    Conjuration,
    Divination,
    Enchantment,
    Evocation,
    Illusion,
    Necromancy,
    Transmutation,
}

impl SpellSchool {
    pub fn name(&self) -> &'static str {
        match self {
            SpellSchool::Abjuration => "Abjuration",
            SpellSchool::Conjuration => "Conjuration",
            SpellSchool::Divination => "Divination",
            SpellSchool::Enchantment => "Enchantment",
            SpellSchool::Evocation => "Evocation",
            SpellSchool::Illusion => "Illusion",
            SpellSchool::Necromancy => "Necromancy",
            SpellSchool::Transmutation => "Transmutation",
        }
    }

    pub fn all() -> [SpellSchool; 8] {
        [
            SpellSchool::Abjuration,
            SpellSchool::Conjuration,
            SpellSchool::Divination,
            SpellSchool::Enchantment,
            SpellSchool::Evocation,
            SpellSchool::Illusion,
            SpellSchool::Necromancy,
            SpellSchool::Transmutation,
        ]
    }
}

impl fmt::Display for SpellSchool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Error from creating a spell.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpellError {
    #[error("spell name must not be empty or whitespace")]
    BlankName,
}

/// The save difficulty class of one spell: 10 + spell level + casting
/// ability modifier + accumulated bonuses, recomputed per read.
#[derive(Debug)]
pub struct DifficultyClass {
    spell_level: u8,
    casting_ability: Rc<AbilityScore>,
    pub bonuses: BonusTracker,
}

impl DifficultyClass {
    pub fn new(spell_level: u8, casting_ability: Rc<AbilityScore>) -> Self {
        Self {
            spell_level,
            casting_ability,
            bonuses: BonusTracker::of(BonusType::Untyped),
        }
    }

    pub fn total(&self) -> i32 {
        let total = 10
            + i64::from(self.spell_level)
            + i64::from(self.casting_ability.modifier())
            + i64::from(self.bonuses.total());
        i32::try_from(total).unwrap_or_else(|_| {
            panic!("difficulty class total {total} exceeds the representable range")
        })
    }
}

/// A spell known to a character.
#[derive(Debug)]
pub struct Spell {
    pub name: String,
    pub level: u8,
    pub school: SpellSchool,
    pub difficulty_class: DifficultyClass,
}

impl Spell {
    pub fn new(
        name: impl Into<String>,
        level: u8,
        school: SpellSchool,
        casting_ability: Rc<AbilityScore>,
    ) -> Result<Self, SpellError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(SpellError::BlankName);
        }
        Ok(Self {
            name,
            level,
            school,
            difficulty_class: DifficultyClass::new(level, casting_ability),
        })
    }
}

type RegistrationCallback = Box<dyn Fn(&Rc<Spell>)>;

/// A character's registered spells plus the registration-notification
/// channel.
///
/// Subscriptions are append-only, like bonus entries: nothing in the rules
/// ever untrains a listener.
#[derive(Default)]
pub struct Spellbook {
    spells: RefCell<Vec<Rc<Spell>>>,
    subscribers: RefCell<Vec<RegistrationCallback>>,
}

impl Spellbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a spell and synchronously notify every subscriber.
    pub fn register(&self, spell: Rc<Spell>) {
        self.spells.borrow_mut().push(spell.clone());
        for subscriber in self.subscribers.borrow().iter() {
            subscriber(&spell);
        }
    }

    /// Subscribe to future registrations. Already-registered spells are
    /// not replayed; callers that want them walk [`Spellbook::spells`].
    pub fn on_register(&self, callback: impl Fn(&Rc<Spell>) + 'static) {
        self.subscribers.borrow_mut().push(Box::new(callback));
    }

    /// Snapshot of the currently registered spells.
    pub fn spells(&self) -> Vec<Rc<Spell>> {
        self.spells.borrow().clone()
    }

    /// Snapshot of the registered spells of one school.
    pub fn spells_of_school(&self, school: SpellSchool) -> Vec<Rc<Spell>> {
        self.spells
            .borrow()
            .iter()
            .filter(|spell| spell.school == school)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.spells.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.spells.borrow().is_empty()
    }
}

impl fmt::Debug for Spellbook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Spellbook")
            .field("spells", &self.len())
            .field("subscribers", &self.subscribers.borrow().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn intelligence(score: u8) -> Rc<AbilityScore> {
        Rc::new(AbilityScore::new(score))
    }

    #[test]
    fn test_difficulty_class_formula() {
        let ability = intelligence(16);
        let spell = Spell::new("Fireball", 3, SpellSchool::Evocation, ability.clone()).unwrap();
        // 10 + 3 + 3
        assert_eq!(spell.difficulty_class.total(), 16);

        spell.difficulty_class.bonuses.add_flat(1);
        assert_eq!(spell.difficulty_class.total(), 17);

        // A later ability change is picked up on the next read.
        ability.set_score(20);
        assert_eq!(spell.difficulty_class.total(), 19);
    }

    #[test]
    fn test_blank_spell_name_is_rejected() {
        let result = Spell::new("  ", 1, SpellSchool::Illusion, intelligence(10));
        assert_eq!(result.unwrap_err(), SpellError::BlankName);
    }

    #[test]
    fn test_registration_notifies_subscribers() {
        let book = Spellbook::new();
        let notified = Rc::new(Cell::new(0u32));

        let counter = notified.clone();
        book.on_register(move |_| counter.set(counter.get() + 1));

        let spell =
            Rc::new(Spell::new("Magic Missile", 1, SpellSchool::Evocation, intelligence(14)).unwrap());
        book.register(spell);

        assert_eq!(notified.get(), 1);
        assert_eq!(book.len(), 1);
    }

    #[test]
    fn test_subscribers_only_hear_future_registrations() {
        let book = Spellbook::new();
        let ability = intelligence(14);
        book.register(Rc::new(
            Spell::new("Shield", 1, SpellSchool::Abjuration, ability.clone()).unwrap(),
        ));

        let notified = Rc::new(Cell::new(0u32));
        let counter = notified.clone();
        book.on_register(move |_| counter.set(counter.get() + 1));
        assert_eq!(notified.get(), 0);

        book.register(Rc::new(
            Spell::new("Haste", 3, SpellSchool::Transmutation, ability).unwrap(),
        ));
        assert_eq!(notified.get(), 1);
    }

    #[test]
    fn test_spells_of_school_filters() {
        let book = Spellbook::new();
        let ability = intelligence(14);
        book.register(Rc::new(
            Spell::new("Fireball", 3, SpellSchool::Evocation, ability.clone()).unwrap(),
        ));
        book.register(Rc::new(
            Spell::new("Charm Person", 1, SpellSchool::Enchantment, ability.clone()).unwrap(),
        ));
        book.register(Rc::new(
            Spell::new("Lightning Bolt", 3, SpellSchool::Evocation, ability).unwrap(),
        ));

        let evocations = book.spells_of_school(SpellSchool::Evocation);
        assert_eq!(evocations.len(), 2);
        assert!(evocations.iter().all(|s| s.school == SpellSchool::Evocation));
    }
}
