//! The blood unit ledger.
//!
//! The [`Inventory`] tracks every collected unit individually so that expiry
//! can be enforced per unit. Nothing here touches the filesystem.

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};
use tracing::instrument;

use crate::domain::{BloodGroup, RecordId};

/// Number of days a collected unit stays usable.
pub const SHELF_LIFE_DAYS: u64 = 42;

/// A single unit of collected blood.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BloodUnit {
    group: BloodGroup,
    collected: NaiveDate,
    expires: NaiveDate,
    donor: Option<RecordId>,
}

impl BloodUnit {
    /// Creates a unit collected on `collected`.
    ///
    /// The expiry date is always [`SHELF_LIFE_DAYS`] after collection.
    #[must_use]
    pub fn new(group: BloodGroup, collected: NaiveDate, donor: Option<RecordId>) -> Self {
        let expires = collected
            .checked_add_days(Days::new(SHELF_LIFE_DAYS))
            .unwrap_or(NaiveDate::MAX);

        Self {
            group,
            collected,
            expires,
            donor,
        }
    }

    /// The blood group of the unit.
    #[must_use]
    pub const fn group(&self) -> BloodGroup {
        self.group
    }

    /// The date the unit was collected.
    #[must_use]
    pub const fn collected(&self) -> NaiveDate {
        self.collected
    }

    /// The first date on which the unit is no longer usable.
    #[must_use]
    pub const fn expires(&self) -> NaiveDate {
        self.expires
    }

    /// The donor the unit was collected from, if known.
    ///
    /// This is informational only; the donor may no longer exist.
    #[must_use]
    pub const fn donor(&self) -> Option<RecordId> {
        self.donor
    }

    /// Whether the unit can still be used on `today`.
    #[must_use]
    pub fn is_available(&self, today: NaiveDate) -> bool {
        today < self.expires
    }
}

/// An unordered collection of blood units.
///
/// Expired units may linger until [`Inventory::prune_expired`] is called, but
/// they are never counted or handed out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventory {
    units: Vec<BloodUnit>,
}

impl Inventory {
    /// Creates an inventory holding the given units.
    #[must_use]
    pub fn from_units(units: Vec<BloodUnit>) -> Self {
        Self { units }
    }

    /// Adds one unit collected on `collected`.
    pub fn add_unit(
        &mut self,
        group: BloodGroup,
        collected: NaiveDate,
        donor: Option<RecordId>,
    ) -> &BloodUnit {
        self.units.push(BloodUnit::new(group, collected, donor));
        tracing::debug!("Added {group} unit collected {collected}");
        &self.units[self.units.len() - 1]
    }

    /// Every unit in the ledger, including expired ones that have not been
    /// pruned yet.
    pub fn units(&self) -> impl Iterator<Item = &BloodUnit> {
        self.units.iter()
    }

    /// The total number of units held, expired or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Whether the ledger holds no units at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// The number of usable units of `group` on `today`.
    #[must_use]
    pub fn count_available(&self, group: BloodGroup, today: NaiveDate) -> usize {
        self.units
            .iter()
            .filter(|unit| unit.group == group && unit.is_available(today))
            .count()
    }

    /// Removes up to `count` usable units of `group`, oldest first.
    ///
    /// Returns the number of units actually removed, which may be less than
    /// requested.
    #[instrument(level = "debug", skip(self))]
    pub fn consume(&mut self, group: BloodGroup, count: usize, today: NaiveDate) -> usize {
        self.consume_where(count, today, |unit| unit.group == group)
    }

    /// Removes up to `count` units collected on `collected` from any of
    /// `donors`.
    ///
    /// Returns the number of units actually removed.
    #[instrument(level = "debug", skip(self))]
    pub fn take_donations(
        &mut self,
        donors: &[RecordId],
        collected: NaiveDate,
        count: usize,
    ) -> usize {
        self.consume_where(count, collected, |unit| {
            unit.collected == collected && unit.donor.is_some_and(|donor| donors.contains(&donor))
        })
    }

    fn consume_where(
        &mut self,
        count: usize,
        today: NaiveDate,
        matches: impl Fn(&BloodUnit) -> bool,
    ) -> usize {
        // Stable, so units collected on the same day keep their relative order
        self.units.sort_by_key(BloodUnit::collected);

        let mut removed = 0;
        self.units.retain(|unit| {
            if removed < count && unit.is_available(today) && matches(unit) {
                removed += 1;
                false
            } else {
                true
            }
        });

        tracing::debug!("Consumed {removed} of {count} requested units");
        removed
    }

    /// Removes every unit that is no longer usable on `today`.
    ///
    /// Returns the number of units removed.
    pub fn prune_expired(&mut self, today: NaiveDate) -> usize {
        let before = self.units.len();
        self.units.retain(|unit| unit.is_available(today));
        let pruned = before - self.units.len();
        if pruned > 0 {
            tracing::info!("Pruned {pruned} expired units");
        }
        pruned
    }

    /// Usable units on `today`, bucketed by blood group.
    ///
    /// Every group is present in the result, with a count of zero if none are
    /// held.
    #[must_use]
    pub fn summary(&self, today: NaiveDate) -> BTreeMap<BloodGroup, usize> {
        let mut summary: BTreeMap<_, _> = BloodGroup::ALL.into_iter().map(|g| (g, 0)).collect();
        for unit in self.units.iter().filter(|unit| unit.is_available(today)) {
            *summary.entry(unit.group).or_insert(0) += 1;
        }
        summary
    }

    /// Blood groups with fewer than `threshold` usable units on `today`,
    /// together with their counts.
    #[must_use]
    pub fn low_stock(&self, today: NaiveDate, threshold: usize) -> Vec<(BloodGroup, usize)> {
        self.summary(today)
            .into_iter()
            .filter(|&(_, count)| count < threshold)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BloodGroup::{AbNeg, AbPos, APos, ONeg, OPos};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .checked_add_days(Days::new(u64::from(d)))
            .unwrap()
    }

    #[test]
    fn expiry_is_collection_plus_shelf_life() {
        let unit = BloodUnit::new(APos, day(0), None);
        assert_eq!(unit.expires(), day(42));
    }

    #[test]
    fn unit_is_counted_until_the_day_before_expiry() {
        let mut inventory = Inventory::default();
        inventory.add_unit(OPos, day(0), None);

        assert_eq!(inventory.count_available(OPos, day(0)), 1);
        assert_eq!(inventory.count_available(OPos, day(41)), 1);
        assert_eq!(inventory.count_available(OPos, day(42)), 0);
    }

    #[test]
    fn count_ignores_other_groups() {
        let mut inventory = Inventory::default();
        inventory.add_unit(OPos, day(0), None);
        inventory.add_unit(ONeg, day(0), None);
        inventory.add_unit(OPos, day(1), None);

        assert_eq!(inventory.count_available(OPos, day(2)), 2);
        assert_eq!(inventory.count_available(APos, day(2)), 0);
    }

    #[test]
    fn counting_does_not_remove_expired_units() {
        let mut inventory = Inventory::default();
        inventory.add_unit(OPos, day(0), None);

        assert_eq!(inventory.count_available(OPos, day(50)), 0);
        assert_eq!(inventory.len(), 1);
    }

    #[test]
    fn consume_takes_oldest_first() {
        let mut inventory = Inventory::default();
        let d1 = "D1".parse().unwrap();
        let d2 = "D2".parse().unwrap();
        let d3 = "D3".parse().unwrap();
        inventory.add_unit(APos, day(10), Some(d1));
        inventory.add_unit(APos, day(2), Some(d2));
        inventory.add_unit(APos, day(6), Some(d3));

        assert_eq!(inventory.consume(APos, 2, day(12)), 2);

        let remaining: Vec<_> = inventory.units().map(BloodUnit::collected).collect();
        assert_eq!(remaining, vec![day(10)]);
    }

    #[test]
    fn consume_reports_shortfall() {
        let mut inventory = Inventory::default();
        inventory.add_unit(APos, day(0), None);
        inventory.add_unit(OPos, day(0), None);

        assert_eq!(inventory.consume(APos, 3, day(1)), 1);
        assert_eq!(inventory.count_available(OPos, day(1)), 1);
    }

    #[test]
    fn consume_skips_expired_units() {
        let mut inventory = Inventory::default();
        inventory.add_unit(APos, day(0), None);
        inventory.add_unit(APos, day(30), None);

        assert_eq!(inventory.consume(APos, 2, day(45)), 1);
        // The expired unit is still held until pruned
        assert_eq!(inventory.len(), 1);
        assert_eq!(inventory.units().next().unwrap().collected(), day(0));
    }

    #[test]
    fn take_donations_leaves_other_units_alone() {
        let d1: RecordId = "D1".parse().unwrap();
        let d2: RecordId = "D2".parse().unwrap();
        let mut inventory = Inventory::default();
        inventory.add_unit(ONeg, day(0), None);
        inventory.add_unit(ONeg, day(0), Some(d2));
        inventory.add_unit(ONeg, day(5), Some(d1));
        inventory.add_unit(AbNeg, day(5), Some(d2));

        assert_eq!(inventory.take_donations(&[d2], day(5), 3), 1);

        let remaining: Vec<_> = inventory
            .units()
            .map(|unit| (unit.group(), unit.donor()))
            .collect();
        assert_eq!(
            remaining,
            vec![(ONeg, None), (ONeg, Some(d2)), (ONeg, Some(d1))]
        );
    }

    #[test]
    fn prune_is_idempotent() {
        let mut inventory = Inventory::default();
        inventory.add_unit(APos, day(0), None);
        inventory.add_unit(APos, day(10), None);

        assert_eq!(inventory.prune_expired(day(45)), 1);
        assert_eq!(inventory.prune_expired(day(45)), 0);
        assert_eq!(inventory.len(), 1);
    }

    #[test]
    fn summary_covers_every_group_and_skips_expired() {
        let mut inventory = Inventory::default();
        inventory.add_unit(AbPos, day(0), None);
        inventory.add_unit(AbPos, day(20), None);
        inventory.add_unit(OPos, day(20), None);

        let summary = inventory.summary(day(43));

        assert_eq!(summary.len(), 8);
        assert_eq!(summary[&AbPos], 1);
        assert_eq!(summary[&OPos], 1);
        assert_eq!(summary[&ONeg], 0);
    }

    #[test]
    fn low_stock_lists_groups_under_threshold() {
        let mut inventory = Inventory::default();
        for _ in 0..5 {
            inventory.add_unit(OPos, day(0), None);
        }
        inventory.add_unit(APos, day(0), None);

        let low = inventory.low_stock(day(1), 5);

        assert_eq!(low.len(), 7);
        assert!(low.contains(&(APos, 1)));
        assert!(!low.iter().any(|(group, _)| *group == OPos));
    }
}
