//! Feats: trained capabilities that mutate a character's trackers.
//!
//! A feat is one concrete data structure with an attached effect function;
//! only "apply to a character" is polymorphic, so there is no type
//! hierarchy here, just a catalog of values.
//!
//! Applying a feat is synchronous and happens exactly once per call. There
//! is deliberately no idempotence guard: applying the same feat twice
//! doubles its effect, and rejecting retraining is the job of whatever
//! validation layer sits above this crate.

use crate::character::Character;
use crate::spells::SpellSchool;
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

const CORE_RULEBOOK: &str = "Core Rulebook";

/// A trained, named capability.
pub struct Feat {
    pub name: String,
    pub source: &'static str,
    effect: Box<dyn Fn(&Character) + Send + Sync>,
}

impl Feat {
    pub fn new(
        name: impl Into<String>,
        source: &'static str,
        effect: impl Fn(&Character) + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            source,
            effect: Box::new(effect),
        }
    }

    /// Apply this feat's effect to a character.
    pub fn apply(&self, character: &Character) {
        (self.effect)(character);
    }
}

impl fmt::Debug for Feat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Feat")
            .field("name", &self.name)
            .field("source", &self.source)
            .finish()
    }
}

impl fmt::Display for Feat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Add a difficulty-class bonus to every spell of a school the character
/// knows now or registers later.
///
/// The two halves must be indistinguishable in outcome: spells already in
/// the book get the bonus immediately, and the registration subscription
/// hands the identical bonus to matching spells the moment they arrive.
fn school_dc_bonus(character: &Character, school: SpellSchool, amount: u32) {
    for spell in character.spellbook.spells_of_school(school) {
        spell.difficulty_class.bonuses.add_flat(amount);
    }
    character.spellbook.on_register(move |spell| {
        if spell.school == school {
            spell.difficulty_class.bonuses.add_flat(amount);
        }
    });
}

fn spell_focus(school: SpellSchool) -> Feat {
    Feat::new(
        format!("Spell Focus ({})", school.name()),
        CORE_RULEBOOK,
        move |character| school_dc_bonus(character, school, 1),
    )
}

fn greater_spell_focus(school: SpellSchool) -> Feat {
    Feat::new(
        format!("Greater Spell Focus ({})", school.name()),
        CORE_RULEBOOK,
        move |character| school_dc_bonus(character, school, 1),
    )
}

// ============================================================================
// Feat Database
// ============================================================================

/// Global feat database, keyed by lowercase name.
static FEAT_DATABASE: LazyLock<HashMap<String, Feat>> = LazyLock::new(build_feat_database);

/// Look up a feat by name (case-insensitive).
pub fn get_feat(name: &str) -> Option<&'static Feat> {
    FEAT_DATABASE.get(&name.to_lowercase())
}

/// All feats in the database.
pub fn all_feats() -> impl Iterator<Item = &'static Feat> {
    FEAT_DATABASE.values()
}

fn build_feat_database() -> HashMap<String, Feat> {
    let mut feats = vec![
        Feat::new("Dodge", CORE_RULEBOOK, |character: &Character| {
            character.armor_class.dodge.add_flat(1);
        }),
        Feat::new("Improved Initiative", CORE_RULEBOOK, |character: &Character| {
            character.initiative.untyped.add_flat(4);
        }),
        Feat::new("Great Fortitude", CORE_RULEBOOK, |character: &Character| {
            character.fortitude.untyped.add_flat(2);
        }),
        Feat::new("Lightning Reflexes", CORE_RULEBOOK, |character: &Character| {
            character.reflex.untyped.add_flat(2);
        }),
        Feat::new("Iron Will", CORE_RULEBOOK, |character: &Character| {
            character.will.untyped.add_flat(2);
        }),
    ];
    for school in SpellSchool::all() {
        feats.push(spell_focus(school));
        feats.push(greater_spell_focus(school));
    }
    feats
        .into_iter()
        .map(|feat| (feat.name.to_lowercase(), feat))
        .collect()
}
