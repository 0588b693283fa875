//! Bonus tracking and stacking rules.
//!
//! Every numeric modifier in the game flows through a [`BonusTracker`]: an
//! append-only list of deferred magnitude producers combined under one of
//! two stacking policies. Magnitudes are evaluated on every read, never at
//! add time, so a bonus whose size depends on mutable state (character
//! level, another tracker's total) always reflects the current value.

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;

/// How simultaneous bonuses of the same kind combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stacking {
    /// Unrelated sources accumulate: the total is the sum of all bonuses.
    Stacks,
    /// Only the single largest currently-active source applies.
    BestOnly,
}

/// The named bonus categories of the game rules.
///
/// A category is a semantic label plus a stacking policy; it adds no
/// behavior of its own. New categories need configuration, not new logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BonusType {
    Alchemical,
    Armor,
    Circumstance,
    Competence,
    Deflection,
    Dodge,
    Enhancement,
    Insight,
    Luck,
    Morale,
    NaturalArmor,
    Profane,
    Racial,
    Resistance,
    Sacred,
    Shield,
    Size,
    Untyped,
    Penalty,
}

impl BonusType {
    pub fn name(&self) -> &'static str {
        match self {
            BonusType::Alchemical => "alchemical",
            BonusType::Armor => "armor",
            BonusType::Circumstance => "circumstance",
            BonusType::Competence => "competence",
            BonusType::Deflection => "deflection",
            BonusType::Dodge => "dodge",
            BonusType::Enhancement => "enhancement",
            BonusType::Insight => "insight",
            BonusType::Luck => "luck",
            BonusType::Morale => "morale",
            BonusType::NaturalArmor => "natural armor",
            BonusType::Profane => "profane",
            BonusType::Racial => "racial",
            BonusType::Resistance => "resistance",
            BonusType::Sacred => "sacred",
            BonusType::Shield => "shield",
            BonusType::Size => "size",
            BonusType::Untyped => "untyped",
            BonusType::Penalty => "penalty",
        }
    }

    /// The stacking policy for this category.
    pub fn stacking(&self) -> Stacking {
        match self {
            BonusType::Alchemical
            | BonusType::Armor
            | BonusType::Shield
            | BonusType::NaturalArmor => Stacking::BestOnly,
            _ => Stacking::Stacks,
        }
    }
}

impl fmt::Display for BonusType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// An ordered, append-only collection of bonus magnitudes.
///
/// Entries are zero-argument producers so their values can track mutable
/// game state. Trackers never remove entries; there is no "untrain"
/// operation anywhere in the rules.
pub struct BonusTracker {
    label: Option<BonusType>,
    stacking: Stacking,
    bonuses: RefCell<Vec<Box<dyn Fn() -> u32>>>,
}

impl BonusTracker {
    /// Create an unlabeled tracker with an explicit stacking policy.
    pub fn new(stacking: Stacking) -> Self {
        Self {
            label: None,
            stacking,
            bonuses: RefCell::new(Vec::new()),
        }
    }

    /// Create a tracker for a named bonus category, with that category's
    /// stacking policy.
    pub fn of(bonus_type: BonusType) -> Self {
        Self {
            label: Some(bonus_type),
            stacking: bonus_type.stacking(),
            bonuses: RefCell::new(Vec::new()),
        }
    }

    /// The category this tracker was configured for, if any.
    pub fn bonus_type(&self) -> Option<BonusType> {
        self.label
    }

    pub fn stacking(&self) -> Stacking {
        self.stacking
    }

    /// Append a deferred bonus. The producer is evaluated on every read of
    /// [`BonusTracker::total`], not here.
    pub fn add(&self, magnitude: impl Fn() -> u32 + 'static) {
        self.bonuses.borrow_mut().push(Box::new(magnitude));
    }

    /// Append a constant bonus.
    pub fn add_flat(&self, value: u32) {
        self.add(move || value);
    }

    pub fn len(&self) -> usize {
        self.bonuses.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.bonuses.borrow().is_empty()
    }

    /// Aggregate the current magnitudes under the stacking policy.
    ///
    /// Recomputed from the live entries on every call. An empty tracker
    /// totals 0 under either policy. A total outside the `i32` range is a
    /// fatal error, never clamped.
    pub fn total(&self) -> i32 {
        let bonuses = self.bonuses.borrow();
        let total: i64 = match self.stacking {
            Stacking::Stacks => bonuses.iter().map(|b| i64::from(b())).sum(),
            Stacking::BestOnly => bonuses.iter().map(|b| i64::from(b())).max().unwrap_or(0),
        };
        i32::try_from(total).unwrap_or_else(|_| {
            panic!(
                "{} bonus total {} exceeds the representable range",
                self.label.map_or("unlabeled", |l| l.name()),
                total
            )
        })
    }
}

// Producers are opaque closures, so the tracker prints its configuration
// and entry count.
impl fmt::Debug for BonusTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BonusTracker")
            .field("label", &self.label)
            .field("stacking", &self.stacking)
            .field("entries", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_empty_tracker_totals_zero() {
        assert_eq!(BonusTracker::new(Stacking::Stacks).total(), 0);
        assert_eq!(BonusTracker::new(Stacking::BestOnly).total(), 0);
    }

    #[test]
    fn test_stacking_sums_all_entries() {
        let tracker = BonusTracker::of(BonusType::Luck);
        tracker.add_flat(2);
        tracker.add_flat(3);
        tracker.add(|| 5);
        assert_eq!(tracker.total(), 10);
    }

    #[test]
    fn test_best_only_keeps_the_largest() {
        let tracker = BonusTracker::of(BonusType::Alchemical);
        tracker.add_flat(2);
        tracker.add_flat(7);
        tracker.add_flat(4);
        assert_eq!(tracker.total(), 7);
    }

    #[test]
    fn test_totals_track_mutable_state() {
        let level = Rc::new(Cell::new(3u32));
        let tracker = BonusTracker::of(BonusType::Untyped);
        let captured = level.clone();
        tracker.add(move || captured.get() / 2);

        assert_eq!(tracker.total(), 1);
        level.set(10);
        assert_eq!(tracker.total(), 5);
    }

    #[test]
    fn test_best_only_reevaluates_per_read() {
        let strength = Rc::new(Cell::new(4u32));
        let tracker = BonusTracker::new(Stacking::BestOnly);
        tracker.add_flat(3);
        let captured = strength.clone();
        tracker.add(move || captured.get());

        assert_eq!(tracker.total(), 4);
        strength.set(1);
        assert_eq!(tracker.total(), 3);
    }

    #[test]
    fn test_category_stacking_configuration() {
        assert_eq!(BonusType::Luck.stacking(), Stacking::Stacks);
        assert_eq!(BonusType::Dodge.stacking(), Stacking::Stacks);
        assert_eq!(BonusType::Alchemical.stacking(), Stacking::BestOnly);
        assert_eq!(BonusType::Armor.stacking(), Stacking::BestOnly);
        assert_eq!(BonusTracker::of(BonusType::Shield).stacking(), Stacking::BestOnly);
    }

    #[test]
    #[should_panic(expected = "exceeds the representable range")]
    fn test_overflowing_total_is_fatal() {
        let tracker = BonusTracker::new(Stacking::Stacks);
        tracker.add_flat(u32::MAX);
        tracker.add_flat(u32::MAX);
        let _ = tracker.total();
    }
}
