//! The blood bank aggregate.
//!
//! A [`BloodBank`] is the single owner of every donor, request, camp and unit.
//! All state changes go through it, and every operation validates its input
//! before touching anything, so a rejected operation leaves the bank exactly
//! as it was.

use chrono::NaiveDate;
use non_empty_string::NonEmptyString;
use tracing::instrument;

use crate::domain::{
    BloodGroup, BloodRequest, DonationCamp, Donor, Inventory, MatchReport, NewCamp, NewDonor,
    NewRequest, RecordId, RecordKind, Registry, RequestStatus,
    eligibility::{self, Ineligibility},
    matching,
};

/// A rejected operation.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ValidationError {
    /// No donor has the given identifier.
    #[error("Donor {0} not found")]
    UnknownDonor(RecordId),

    /// No request has the given identifier.
    #[error("Request {0} not found")]
    UnknownRequest(RecordId),

    /// No camp has the given identifier.
    #[error("Camp {0} not found")]
    UnknownCamp(RecordId),

    /// The donor may not donate today.
    #[error("Donor {donor} is not eligible ({}). Next eligible: {next_eligible}", join(.reasons))]
    NotEligible {
        /// The donor who was turned away.
        donor: RecordId,
        /// Every rule the donor fails.
        reasons: Vec<Ineligibility>,
        /// The first day the donation interval allows another donation.
        next_eligible: NaiveDate,
    },

    /// A required name was blank.
    #[error("{0} must not be empty")]
    EmptyName(&'static str),

    /// A unit count of zero was given.
    #[error("Number of units must be at least 1")]
    InvalidUnits,

    /// Every identifier of this kind is already in use.
    #[error("No {0:?} identifiers are left to issue")]
    IdsExhausted(RecordKind),

    /// The request has already been fulfilled or cancelled.
    #[error("Request {request} is {status}, not pending")]
    NotPending {
        /// The request.
        request: RecordId,
        /// Its current status.
        status: RequestStatus,
    },
}

fn join(reasons: &[Ineligibility]) -> String {
    reasons
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// A receipt for a recorded donation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Donation {
    /// The donor who gave.
    pub donor: RecordId,
    /// The group of the collected unit.
    pub group: BloodGroup,
    /// The collection date.
    pub date: NaiveDate,
    /// The camp the donation was made at, if any.
    pub camp: Option<RecordId>,
    /// The donor's donation count including this one.
    pub total_donations: u32,
}

/// Donors, requests, camps and the unit ledger of one blood bank.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BloodBank {
    donors: Registry<Donor>,
    requests: Registry<BloodRequest>,
    camps: Registry<DonationCamp>,
    inventory: Inventory,
}

impl BloodBank {
    /// Assembles a bank from previously stored records.
    #[must_use]
    pub const fn from_parts(
        donors: Registry<Donor>,
        requests: Registry<BloodRequest>,
        camps: Registry<DonationCamp>,
        inventory: Inventory,
    ) -> Self {
        Self {
            donors,
            requests,
            camps,
            inventory,
        }
    }

    /// The registered donors.
    #[must_use]
    pub const fn donors(&self) -> &Registry<Donor> {
        &self.donors
    }

    /// All requests, whatever their status.
    #[must_use]
    pub const fn requests(&self) -> &Registry<BloodRequest> {
        &self.requests
    }

    /// The donation camps.
    #[must_use]
    pub const fn camps(&self) -> &Registry<DonationCamp> {
        &self.camps
    }

    /// The unit ledger.
    #[must_use]
    pub const fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    /// Looks up a donor.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnknownDonor`] if there is no such donor.
    pub fn donor(&self, id: RecordId) -> Result<&Donor, ValidationError> {
        self.donors.get(id).ok_or(ValidationError::UnknownDonor(id))
    }

    /// Donors of exactly `group`, eligible or not.
    pub fn donors_by_group(&self, group: BloodGroup) -> impl Iterator<Item = &Donor> {
        self.donors
            .iter()
            .filter(move |donor| donor.blood_group() == group)
    }

    /// Donors of exactly `group` who may donate on `today`.
    pub fn eligible_donors(
        &self,
        group: BloodGroup,
        today: NaiveDate,
    ) -> impl Iterator<Item = &Donor> {
        self.donors_by_group(group)
            .filter(move |donor| donor.is_eligible(today))
    }

    /// Registers a new donor under the next free identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyName`] if the name is blank, or
    /// [`ValidationError::IdsExhausted`] if no identifier is left.
    #[instrument(level = "debug", skip_all)]
    pub fn register_donor(&mut self, details: NewDonor) -> Result<&Donor, ValidationError> {
        let name = NonEmptyString::new(details.name.trim().to_string())
            .map_err(|_| ValidationError::EmptyName("Donor name"))?;

        let donor = self
            .donors
            .insert_with(|id| Donor::new(id, name, details))
            .ok_or(ValidationError::IdsExhausted(RecordKind::Donor))?;
        tracing::info!("Registered donor {}", donor.id());
        Ok(donor)
    }

    /// Records a donation by `donor` on `today`, optionally at a camp.
    ///
    /// One unit of the donor's group is added to the ledger. When a camp is
    /// given the donor is registered there if they were not already, and the
    /// camp is credited with the unit.
    ///
    /// # Errors
    ///
    /// Returns an error if the donor or camp does not exist, or if the donor is
    /// not eligible on `today`.
    #[instrument(level = "debug", skip(self))]
    pub fn donate(
        &mut self,
        donor: RecordId,
        camp: Option<RecordId>,
        today: NaiveDate,
    ) -> Result<Donation, ValidationError> {
        if let Some(camp) = camp.filter(|&camp| !self.camps.contains(camp)) {
            return Err(ValidationError::UnknownCamp(camp));
        }

        let record = self
            .donors
            .get_mut(donor)
            .ok_or(ValidationError::UnknownDonor(donor))?;

        let reasons = eligibility::assess(record, today);
        if !reasons.is_empty() {
            return Err(ValidationError::NotEligible {
                donor,
                reasons,
                next_eligible: eligibility::next_eligible_date(record, today),
            });
        }

        record.record_donation(today);
        let group = record.blood_group();
        let total_donations = record.total_donations();
        self.inventory.add_unit(group, today, Some(donor));

        if let Some(camp) = camp.and_then(|id| self.camps.get_mut(id)) {
            camp.register(donor);
            camp.record_collection();
        }

        tracing::info!("Donation recorded for {donor}");
        Ok(Donation {
            donor,
            group,
            date: today,
            camp,
            total_donations,
        })
    }

    /// Adds `count` units of `group` collected on `today` with no donor
    /// attached.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidUnits`] if `count` is zero.
    pub fn add_stock(
        &mut self,
        group: BloodGroup,
        count: u32,
        today: NaiveDate,
    ) -> Result<(), ValidationError> {
        if count == 0 {
            return Err(ValidationError::InvalidUnits);
        }
        for _ in 0..count {
            self.inventory.add_unit(group, today, None);
        }
        tracing::info!("{count} unit(s) added to inventory for {group}");
        Ok(())
    }

    /// Removes expired units from the ledger, returning how many were removed.
    pub fn prune_expired(&mut self, today: NaiveDate) -> usize {
        self.inventory.prune_expired(today)
    }

    /// Submits a new pending request dated `today`.
    ///
    /// No matching happens here; run [`BloodBank::match_requests`] afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if the patient name is blank or no units are asked for.
    #[instrument(level = "debug", skip_all)]
    pub fn submit_request(
        &mut self,
        details: NewRequest,
        today: NaiveDate,
    ) -> Result<RecordId, ValidationError> {
        let patient = NonEmptyString::new(details.patient.trim().to_string())
            .map_err(|_| ValidationError::EmptyName("Patient name"))?;
        if details.units_needed == 0 {
            return Err(ValidationError::InvalidUnits);
        }

        let request = self
            .requests
            .insert_with(|id| {
                BloodRequest::new(
                    id,
                    patient,
                    details.blood_group,
                    details.units_needed,
                    details.priority,
                    today,
                )
            })
            .ok_or(ValidationError::IdsExhausted(RecordKind::Request))?;
        tracing::info!("Request created: {}", request.id());
        Ok(request.id())
    }

    /// Cancels a pending request.
    ///
    /// # Errors
    ///
    /// Returns an error if the request does not exist or is no longer pending.
    pub fn cancel_request(&mut self, id: RecordId) -> Result<(), ValidationError> {
        let request = self
            .requests
            .get_mut(id)
            .ok_or(ValidationError::UnknownRequest(id))?;
        if !request.cancel() {
            return Err(ValidationError::NotPending {
                request: id,
                status: request.status(),
            });
        }
        tracing::info!("Request {id} cancelled");
        Ok(())
    }

    /// Creates a donation camp under the next free identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyName`] if the location is blank.
    pub fn create_camp(&mut self, details: NewCamp) -> Result<&DonationCamp, ValidationError> {
        if details.location.trim().is_empty() {
            return Err(ValidationError::EmptyName("Camp location"));
        }
        let camp = self
            .camps
            .insert_with(|id| DonationCamp::new(id, details))
            .ok_or(ValidationError::IdsExhausted(RecordKind::Camp))?;
        tracing::info!("Camp created: {}", camp.id());
        Ok(camp)
    }

    /// Registers a donor for a camp.
    ///
    /// Returns `false` if the donor was already registered.
    ///
    /// # Errors
    ///
    /// Returns an error if the camp or the donor does not exist.
    pub fn register_for_camp(
        &mut self,
        camp: RecordId,
        donor: RecordId,
    ) -> Result<bool, ValidationError> {
        if !self.donors.contains(donor) {
            return Err(ValidationError::UnknownDonor(donor));
        }
        let record = self
            .camps
            .get_mut(camp)
            .ok_or(ValidationError::UnknownCamp(camp))?;
        Ok(record.register(donor))
    }

    /// Runs a matching pass over every pending request.
    pub fn match_requests(&mut self, today: NaiveDate) -> MatchReport {
        matching::match_requests(
            &mut self.requests,
            &mut self.donors,
            &mut self.inventory,
            today,
        )
    }
}

#[cfg(test)]
mod tests {
    use chrono::Days;

    use super::*;
    use crate::domain::{Priority, RecordKind};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    fn new_donor(name: &str, blood_group: BloodGroup) -> NewDonor {
        NewDonor {
            name: name.to_string(),
            contact: "555-0100".to_string(),
            address: "1 High Street".to_string(),
            blood_group,
            age: 34,
            weight_kg: 72.5,
            last_donation: None,
        }
    }

    fn new_request(units_needed: u32) -> NewRequest {
        NewRequest {
            patient: "Alex Doe".to_string(),
            blood_group: BloodGroup::BPos,
            units_needed,
            priority: Priority::Urgent,
        }
    }

    fn new_camp() -> NewCamp {
        NewCamp {
            date: today(),
            location: "Community Centre".to_string(),
            organizer: "Rotary".to_string(),
        }
    }

    fn id(s: &str) -> RecordId {
        s.parse().unwrap()
    }

    #[test]
    fn registered_donors_get_sequential_ids() {
        let mut bank = BloodBank::default();

        let first = bank.register_donor(new_donor("Ann", BloodGroup::APos)).unwrap().id();
        let second = bank.register_donor(new_donor("Bo", BloodGroup::ONeg)).unwrap().id();

        assert_eq!(first.to_string(), "D1");
        assert_eq!(second.to_string(), "D2");
        assert_eq!(first.kind(), RecordKind::Donor);
    }

    #[test]
    fn registration_fails_when_no_donor_id_is_left() {
        let last =
            crate::domain::donor::tests::donor(&format!("D{}", usize::MAX), BloodGroup::APos);
        let mut bank = BloodBank::from_parts(
            Registry::from_records([last.clone()]),
            Registry::default(),
            Registry::default(),
            Inventory::default(),
        );

        let error = bank
            .register_donor(new_donor("Ann", BloodGroup::ONeg))
            .unwrap_err();

        assert_eq!(error, ValidationError::IdsExhausted(RecordKind::Donor));
        assert_eq!(bank.donors().len(), 1);
        assert_eq!(bank.donor(last.id()).unwrap(), &last);
    }

    #[test]
    fn blank_donor_name_is_rejected() {
        let mut bank = BloodBank::default();

        let error = bank.register_donor(new_donor("   ", BloodGroup::APos)).unwrap_err();

        assert_eq!(error, ValidationError::EmptyName("Donor name"));
        assert!(bank.donors().is_empty());
    }

    #[test]
    fn donation_adds_a_unit_and_updates_history() {
        let mut bank = BloodBank::default();
        let donor = bank.register_donor(new_donor("Ann", BloodGroup::APos)).unwrap().id();

        let donation = bank.donate(donor, None, today()).unwrap();

        assert_eq!(donation.total_donations, 1);
        assert_eq!(donation.group, BloodGroup::APos);
        assert_eq!(bank.inventory().count_available(BloodGroup::APos, today()), 1);
        let unit = bank.inventory().units().next().unwrap();
        assert_eq!(unit.donor(), Some(donor));
        assert_eq!(bank.donor(donor).unwrap().last_donation(), Some(today()));
    }

    #[test]
    fn ineligible_donation_is_rejected_without_changes() {
        let mut bank = BloodBank::default();
        let donor = bank.register_donor(new_donor("Ann", BloodGroup::APos)).unwrap().id();
        bank.donate(donor, None, today()).unwrap();
        let before = bank.clone();

        let later = today().checked_add_days(Days::new(10)).unwrap();
        let error = bank.donate(donor, None, later).unwrap_err();

        match error {
            ValidationError::NotEligible {
                reasons,
                next_eligible,
                ..
            } => {
                assert_eq!(reasons.len(), 1);
                assert_eq!(next_eligible, today().checked_add_days(Days::new(90)).unwrap());
            }
            other => panic!("expected an eligibility error, got {other:?}"),
        }
        assert_eq!(bank, before);
    }

    #[test]
    fn donation_at_a_camp_registers_and_credits_it() {
        let mut bank = BloodBank::default();
        let donor = bank.register_donor(new_donor("Ann", BloodGroup::APos)).unwrap().id();
        let camp = bank.create_camp(new_camp()).unwrap().id();

        bank.donate(donor, Some(camp), today()).unwrap();

        let camp = bank.camps().get(camp).unwrap();
        assert_eq!(camp.registered(), &[donor]);
        assert_eq!(camp.units_collected(), 1);
    }

    #[test]
    fn donation_at_an_unknown_camp_changes_nothing() {
        let mut bank = BloodBank::default();
        let donor = bank.register_donor(new_donor("Ann", BloodGroup::APos)).unwrap().id();
        let before = bank.clone();

        let error = bank.donate(donor, Some(id("C9")), today()).unwrap_err();

        assert_eq!(error, ValidationError::UnknownCamp(id("C9")));
        assert_eq!(bank, before);
    }

    #[test]
    fn unknown_donor_cannot_donate() {
        let mut bank = BloodBank::default();
        let error = bank.donate(id("D4"), None, today()).unwrap_err();
        assert_eq!(error, ValidationError::UnknownDonor(id("D4")));
    }

    #[test]
    fn submitted_requests_are_pending() {
        let mut bank = BloodBank::default();

        let request = bank.submit_request(new_request(2), today()).unwrap();

        let request = bank.requests().get(request).unwrap();
        assert_eq!(request.id().to_string(), "R1");
        assert_eq!(request.status(), RequestStatus::Pending);
        assert_eq!(request.created(), today());
    }

    #[test]
    fn zero_unit_request_is_rejected() {
        let mut bank = BloodBank::default();
        let error = bank.submit_request(new_request(0), today()).unwrap_err();
        assert_eq!(error, ValidationError::InvalidUnits);
        assert!(bank.requests().is_empty());
    }

    #[test]
    fn blank_patient_is_rejected() {
        let mut bank = BloodBank::default();
        let mut details = new_request(1);
        details.patient = String::new();

        let error = bank.submit_request(details, today()).unwrap_err();

        assert_eq!(error, ValidationError::EmptyName("Patient name"));
    }

    #[test]
    fn only_pending_requests_can_be_cancelled() {
        let mut bank = BloodBank::default();
        let request = bank.submit_request(new_request(1), today()).unwrap();

        bank.cancel_request(request).unwrap();
        let error = bank.cancel_request(request).unwrap_err();

        assert_eq!(
            error,
            ValidationError::NotPending {
                request,
                status: RequestStatus::Cancelled
            }
        );
        assert_eq!(
            bank.cancel_request(id("R7")).unwrap_err(),
            ValidationError::UnknownRequest(id("R7"))
        );
    }

    #[test]
    fn add_stock_adds_anonymous_units() {
        let mut bank = BloodBank::default();

        bank.add_stock(BloodGroup::ONeg, 3, today()).unwrap();

        assert_eq!(bank.inventory().count_available(BloodGroup::ONeg, today()), 3);
        assert!(bank.inventory().units().all(|unit| unit.donor().is_none()));
        assert_eq!(
            bank.add_stock(BloodGroup::ONeg, 0, today()).unwrap_err(),
            ValidationError::InvalidUnits
        );
    }

    #[test]
    fn camp_registration_requires_known_records() {
        let mut bank = BloodBank::default();
        let donor = bank.register_donor(new_donor("Ann", BloodGroup::APos)).unwrap().id();
        let camp = bank.create_camp(new_camp()).unwrap().id();

        assert!(bank.register_for_camp(camp, donor).unwrap());
        assert!(!bank.register_for_camp(camp, donor).unwrap());
        assert_eq!(
            bank.register_for_camp(camp, id("D9")).unwrap_err(),
            ValidationError::UnknownDonor(id("D9"))
        );
        assert_eq!(
            bank.register_for_camp(id("C9"), donor).unwrap_err(),
            ValidationError::UnknownCamp(id("C9"))
        );
    }

    #[test]
    fn search_returns_eligible_donors_of_the_exact_group() {
        let mut bank = BloodBank::default();
        let ann = bank.register_donor(new_donor("Ann", BloodGroup::APos)).unwrap().id();
        let bo = bank.register_donor(new_donor("Bo", BloodGroup::APos)).unwrap().id();
        bank.register_donor(new_donor("Cy", BloodGroup::ONeg)).unwrap();
        bank.donate(bo, None, today()).unwrap();

        let all: Vec<_> = bank.donors_by_group(BloodGroup::APos).map(Donor::id).collect();
        let eligible: Vec<_> = bank
            .eligible_donors(BloodGroup::APos, today())
            .map(Donor::id)
            .collect();

        assert_eq!(all, vec![ann, bo]);
        assert_eq!(eligible, vec![ann]);
    }

    #[test]
    fn request_then_match_uses_stock() {
        let mut bank = BloodBank::default();
        bank.add_stock(BloodGroup::BPos, 2, today()).unwrap();
        let request = bank.submit_request(new_request(2), today()).unwrap();

        let report = bank.match_requests(today());

        assert_eq!(report.fulfilled().collect::<Vec<_>>(), vec![request]);
        assert!(bank.inventory().is_empty());
    }
}
