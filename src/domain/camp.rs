use chrono::NaiveDate;

use crate::domain::{Record, RecordId, RecordKind};

/// A blood donation camp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DonationCamp {
    pub(crate) id: RecordId,
    pub(crate) date: NaiveDate,
    pub(crate) location: String,
    pub(crate) organizer: String,
    pub(crate) registered: Vec<RecordId>,
    pub(crate) units_collected: u32,
}

/// The details collected when a camp is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCamp {
    /// The day the camp runs.
    pub date: NaiveDate,
    /// Where the camp is held.
    pub location: String,
    /// Who runs the camp.
    pub organizer: String,
}

impl DonationCamp {
    pub(crate) fn new(id: RecordId, details: NewCamp) -> Self {
        Self {
            id,
            date: details.date,
            location: details.location,
            organizer: details.organizer,
            registered: Vec::new(),
            units_collected: 0,
        }
    }

    /// The camp's identifier.
    #[must_use]
    pub const fn id(&self) -> RecordId {
        self.id
    }

    /// The day the camp runs.
    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        self.date
    }

    /// Where the camp is held.
    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Who runs the camp.
    #[must_use]
    pub fn organizer(&self) -> &str {
        &self.organizer
    }

    /// Donors registered for the camp, in registration order.
    #[must_use]
    pub fn registered(&self) -> &[RecordId] {
        &self.registered
    }

    /// Units collected at the camp so far.
    #[must_use]
    pub const fn units_collected(&self) -> u32 {
        self.units_collected
    }

    /// Registers a donor; returns `false` if they were already registered.
    pub(crate) fn register(&mut self, donor: RecordId) -> bool {
        if self.registered.contains(&donor) {
            return false;
        }
        self.registered.push(donor);
        true
    }

    pub(crate) fn record_collection(&mut self) {
        self.units_collected = self.units_collected.saturating_add(1);
    }
}

impl Record for DonationCamp {
    const KIND: RecordKind = RecordKind::Camp;

    fn id(&self) -> RecordId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_is_deduplicated() {
        let mut camp = DonationCamp::new(
            "C1".parse().unwrap(),
            NewCamp {
                date: NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
                location: "Town Hall".to_string(),
                organizer: "Red Cross".to_string(),
            },
        );
        let donor = "D4".parse().unwrap();

        assert!(camp.register(donor));
        assert!(!camp.register(donor));
        assert_eq!(camp.registered(), &[donor]);
    }
}
