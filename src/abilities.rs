//! Ability scores and their modifiers.
//!
//! Scores are shared value holders: derived statistics keep a handle to
//! their key ability and read its modifier fresh on every computation, so
//! a score change is visible everywhere immediately.

use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

/// The six ability scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ability {
    Strength,
    Dexterity,
    Constitution,
    Intelligence,
    Wisdom,
    Charisma,
}

impl Ability {
    pub fn abbreviation(&self) -> &'static str {
        match self {
            Ability::Strength => "STR",
            Ability::Dexterity => "DEX",
            Ability::Constitution => "CON",
            Ability::Intelligence => "INT",
            Ability::Wisdom => "WIS",
            Ability::Charisma => "CHA",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Ability::Strength => "Strength",
            Ability::Dexterity => "Dexterity",
            Ability::Constitution => "Constitution",
            Ability::Intelligence => "Intelligence",
            Ability::Wisdom => "Wisdom",
            Ability::Charisma => "Charisma",
        }
    }

    pub fn all() -> [Ability; 6] {
        [
            Ability::Strength,
            Ability::Dexterity,
            Ability::Constitution,
            Ability::Intelligence,
            Ability::Wisdom,
            Ability::Charisma,
        ]
    }
}

impl fmt::Display for Ability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.abbreviation())
    }
}

/// A single mutable ability score.
///
/// Shared as `Rc<AbilityScore>` between the owning character and the
/// derived statistics keyed on it.
#[derive(Debug)]
pub struct AbilityScore {
    score: Cell<u8>,
}

impl AbilityScore {
    pub fn new(score: u8) -> Self {
        Self {
            score: Cell::new(score),
        }
    }

    pub fn score(&self) -> u8 {
        self.score.get()
    }

    pub fn set_score(&self, score: u8) {
        self.score.set(score);
    }

    /// The signed modifier: score 8-9 is -1, 10-11 is 0, 12-13 is +1.
    /// Floor division keeps odd scores below 10 correct.
    pub fn modifier(&self) -> i32 {
        (i32::from(self.score.get()) - 10).div_euclid(2)
    }
}

/// The six ability-score holders of one character.
#[derive(Debug, Clone)]
pub struct AbilityScores {
    pub strength: Rc<AbilityScore>,
    pub dexterity: Rc<AbilityScore>,
    pub constitution: Rc<AbilityScore>,
    pub intelligence: Rc<AbilityScore>,
    pub wisdom: Rc<AbilityScore>,
    pub charisma: Rc<AbilityScore>,
}

impl AbilityScores {
    pub fn new(str: u8, dex: u8, con: u8, int: u8, wis: u8, cha: u8) -> Self {
        Self {
            strength: Rc::new(AbilityScore::new(str)),
            dexterity: Rc::new(AbilityScore::new(dex)),
            constitution: Rc::new(AbilityScore::new(con)),
            intelligence: Rc::new(AbilityScore::new(int)),
            wisdom: Rc::new(AbilityScore::new(wis)),
            charisma: Rc::new(AbilityScore::new(cha)),
        }
    }

    pub fn get(&self, ability: Ability) -> &Rc<AbilityScore> {
        match ability {
            Ability::Strength => &self.strength,
            Ability::Dexterity => &self.dexterity,
            Ability::Constitution => &self.constitution,
            Ability::Intelligence => &self.intelligence,
            Ability::Wisdom => &self.wisdom,
            Ability::Charisma => &self.charisma,
        }
    }

    pub fn set(&self, ability: Ability, value: u8) {
        self.get(ability).set_score(value);
    }

    pub fn modifier(&self, ability: Ability) -> i32 {
        self.get(ability).modifier()
    }
}

impl Default for AbilityScores {
    fn default() -> Self {
        Self::new(10, 10, 10, 10, 10, 10)
    }
}
