use chrono::NaiveDate;
use non_empty_string::NonEmptyString;

use crate::domain::{BloodGroup, Record, RecordId, RecordKind, eligibility};

/// A registered blood donor.
///
/// The donation history (last donation date and donation count) can only
/// change through a successful donation, so it is not directly settable.
#[derive(Debug, Clone, PartialEq)]
pub struct Donor {
    pub(crate) id: RecordId,
    pub(crate) name: NonEmptyString,
    pub(crate) contact: String,
    pub(crate) address: String,
    pub(crate) blood_group: BloodGroup,
    pub(crate) age: u32,
    pub(crate) weight_kg: f64,
    pub(crate) last_donation: Option<NaiveDate>,
    pub(crate) total_donations: u32,
}

/// The details collected when a donor registers.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDonor {
    /// Full name. Must not be empty.
    pub name: String,
    /// Phone number or other contact detail.
    pub contact: String,
    /// Postal address.
    pub address: String,
    /// The donor's blood group.
    pub blood_group: BloodGroup,
    /// Age in whole years.
    pub age: u32,
    /// Body weight in kilograms.
    pub weight_kg: f64,
    /// Date of the most recent donation made elsewhere, if any.
    pub last_donation: Option<NaiveDate>,
}

impl Donor {
    pub(crate) fn new(id: RecordId, name: NonEmptyString, details: NewDonor) -> Self {
        let NewDonor {
            name: _,
            contact,
            address,
            blood_group,
            age,
            weight_kg,
            last_donation,
        } = details;

        Self {
            id,
            name,
            contact,
            address,
            blood_group,
            age,
            weight_kg,
            last_donation,
            total_donations: 0,
        }
    }

    /// The donor's identifier.
    #[must_use]
    pub const fn id(&self) -> RecordId {
        self.id
    }

    /// The donor's name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Contact detail.
    #[must_use]
    pub fn contact(&self) -> &str {
        &self.contact
    }

    /// Postal address.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// The donor's blood group.
    #[must_use]
    pub const fn blood_group(&self) -> BloodGroup {
        self.blood_group
    }

    /// Age in whole years.
    #[must_use]
    pub const fn age(&self) -> u32 {
        self.age
    }

    /// Body weight in kilograms.
    #[must_use]
    pub const fn weight_kg(&self) -> f64 {
        self.weight_kg
    }

    /// The date of the most recent donation, if the donor has ever donated.
    #[must_use]
    pub const fn last_donation(&self) -> Option<NaiveDate> {
        self.last_donation
    }

    /// The number of donations recorded for this donor.
    #[must_use]
    pub const fn total_donations(&self) -> u32 {
        self.total_donations
    }

    /// Whether the donor may donate on `today`.
    ///
    /// See [`eligibility::is_eligible`].
    #[must_use]
    pub fn is_eligible(&self, today: NaiveDate) -> bool {
        eligibility::is_eligible(self, today)
    }

    /// Records a donation made on `today`.
    ///
    /// Callers are responsible for checking eligibility first.
    pub(crate) fn record_donation(&mut self, today: NaiveDate) {
        self.last_donation = Some(today);
        self.total_donations = self.total_donations.saturating_add(1);
    }
}

impl Record for Donor {
    const KIND: RecordKind = RecordKind::Donor;

    fn id(&self) -> RecordId {
        self.id
    }
}
