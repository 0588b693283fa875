//! Damage reduction tracking.
//!
//! A creature can carry several damage-reduction sources that share a
//! bypass descriptor ("silver", "cold iron", "-"). Only the strongest
//! source per descriptor applies, and a reduction of zero is the same as
//! having none, so it is dropped from the output entirely.

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Error from adding a damage-reduction entry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DamageReductionError {
    #[error("bypass descriptor must not be empty or whitespace")]
    BlankBypassDescriptor,
}

/// One effective damage-reduction value, e.g. `DR 5/silver`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageReductionValue {
    pub amount: u32,
    /// What defeats this reduction, e.g. "silver". "-" means nothing does.
    pub bypassed_by: String,
}

impl fmt::Display for DamageReductionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.amount, self.bypassed_by)
    }
}

struct Entry {
    bypassed_by: String,
    magnitude: Box<dyn Fn() -> u32>,
}

/// Append-only collection of damage-reduction sources, grouped per bypass
/// descriptor on read.
#[derive(Default)]
pub struct DamageReduction {
    entries: RefCell<Vec<Entry>>,
}

impl DamageReduction {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a deferred damage-reduction source.
    ///
    /// The descriptor comparison is case-insensitive, so "Silver" and
    /// "silver" land in the same group. A blank descriptor is rejected.
    pub fn add(
        &self,
        bypassed_by: &str,
        magnitude: impl Fn() -> u32 + 'static,
    ) -> Result<(), DamageReductionError> {
        if bypassed_by.trim().is_empty() {
            return Err(DamageReductionError::BlankBypassDescriptor);
        }
        self.entries.borrow_mut().push(Entry {
            bypassed_by: bypassed_by.to_string(),
            magnitude: Box::new(magnitude),
        });
        Ok(())
    }

    /// Append a constant damage-reduction source.
    pub fn add_flat(&self, bypassed_by: &str, amount: u32) -> Result<(), DamageReductionError> {
        self.add(bypassed_by, move || amount)
    }

    /// The effective reductions: per case-insensitive descriptor, the
    /// maximum of the currently-computed magnitudes, skipping descriptors
    /// whose maximum is zero. Recomputed from the live entries every call.
    pub fn all(&self) -> Vec<DamageReductionValue> {
        let entries = self.entries.borrow();
        let mut order = Vec::new();
        let mut best: HashMap<String, DamageReductionValue> = HashMap::new();
        for entry in entries.iter() {
            let key = entry.bypassed_by.to_lowercase();
            let amount = (entry.magnitude)();
            match best.get_mut(&key) {
                Some(value) => value.amount = value.amount.max(amount),
                None => {
                    order.push(key.clone());
                    best.insert(
                        key,
                        DamageReductionValue {
                            amount,
                            bypassed_by: entry.bypassed_by.clone(),
                        },
                    );
                }
            }
        }
        order
            .into_iter()
            .filter_map(|key| best.remove(&key))
            .filter(|value| value.amount > 0)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl fmt::Debug for DamageReduction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DamageReduction")
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
    fn test_descriptor_grouping_is_case_insensitive() {
        let dr = DamageReduction::new();
        dr.add_flat("Silver", 1).unwrap();
        dr.add_flat("silver", 2).unwrap();

        let all = dr.all();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].amount, 2);
        assert!(all[0].bypassed_by.eq_ignore_ascii_case("silver"));
    }

    #[test]
    fn test_zero_magnitude_groups_are_omitted() {
        let dr = DamageReduction::new();
        dr.add_flat("cold iron", 0).unwrap();
        assert!(dr.all().is_empty());
    }

    #[test]
    fn test_distinct_descriptors_are_kept_apart() {
        let dr = DamageReduction::new();
        dr.add_flat("silver", 5).unwrap();
        dr.add_flat("cold iron", 3).unwrap();
        dr.add_flat("-", 2).unwrap();

        let all = dr.all();
        assert_eq!(all.len(), 3);
        assert!(all.iter().any(|v| v.bypassed_by == "silver" && v.amount == 5));
        assert!(all.iter().any(|v| v.bypassed_by == "cold iron" && v.amount == 3));
        assert!(all.iter().any(|v| v.bypassed_by == "-" && v.amount == 2));
    }

    #[test]
    fn test_blank_descriptor_is_rejected() {
        let dr = DamageReduction::new();
        assert_eq!(
            dr.add_flat("", 5),
            Err(DamageReductionError::BlankBypassDescriptor)
        );
        assert_eq!(
            dr.add_flat("   ", 5),
            Err(DamageReductionError::BlankBypassDescriptor)
        );
        assert!(dr.is_empty());
    }

    #[test]
    fn test_magnitudes_are_read_live() {
        let rage = Rc::new(Cell::new(0u32));
        let dr = DamageReduction::new();
        let captured = rage.clone();
        dr.add("-", move || captured.get()).unwrap();

        assert!(dr.all().is_empty());
        rage.set(3);
        assert_eq!(dr.all(), vec![DamageReductionValue { amount: 3, bypassed_by: "-".into() }]);
    }

    #[test]
    fn test_display_notation() {
        let value = DamageReductionValue {
            amount: 10,
            bypassed_by: "cold iron".into(),
        };
        assert_eq!(value.to_string(), "10/cold iron");
    }
}
