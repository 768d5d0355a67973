//! CSV row layouts for each stored collection.
//!
//! Rows hold raw field values. Converting a row into a domain record validates
//! it; a row that fails is reported by the caller and skipped.

use chrono::NaiveDate;
use non_empty_string::NonEmptyString;
use serde::{Deserialize, Serialize};

use crate::domain::{
    BloodGroup, BloodRequest, BloodUnit, DonationCamp, Donor, IdError, InvalidBloodGroup,
    Priority, RecordId, request::UnknownStatus,
};

/// Why a stored row could not be turned into a record.
#[derive(Debug, thiserror::Error)]
pub enum RowError {
    /// An identifier column did not parse.
    #[error(transparent)]
    Id(#[from] IdError),

    /// The blood group column was not one of the eight groups.
    #[error(transparent)]
    BloodGroup(#[from] InvalidBloodGroup),

    /// The status column was not a known status.
    #[error(transparent)]
    Status(#[from] UnknownStatus),

    /// A required name column was blank.
    #[error("{0} is empty")]
    Empty(&'static str),

    /// A request asked for zero units.
    #[error("units needed must be at least 1")]
    NoUnits,
}

fn non_empty(value: String, column: &'static str) -> Result<NonEmptyString, RowError> {
    NonEmptyString::new(value).map_err(|_| RowError::Empty(column))
}

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct DonorRow {
    id: String,
    name: String,
    age: u32,
    weight: f64,
    blood_group: String,
    contact: String,
    address: String,
    last_donation: Option<String>,
    total_donations: u32,
}

impl From<&Donor> for DonorRow {
    fn from(donor: &Donor) -> Self {
        Self {
            id: donor.id.to_string(),
            name: donor.name.to_string(),
            age: donor.age,
            weight: donor.weight_kg,
            blood_group: donor.blood_group.to_string(),
            contact: donor.contact.clone(),
            address: donor.address.clone(),
            last_donation: donor.last_donation.map(|date| date.to_string()),
            total_donations: donor.total_donations,
        }
    }
}

impl TryFrom<DonorRow> for Donor {
    type Error = RowError;

    fn try_from(row: DonorRow) -> Result<Self, Self::Error> {
        let id: RecordId = row.id.parse()?;

        // A garbled date is treated as "never donated" rather than losing the donor
        let last_donation = row
            .last_donation
            .filter(|date| !date.trim().is_empty())
            .and_then(|date| {
                date.trim()
                    .parse::<NaiveDate>()
                    .inspect_err(|e| {
                        tracing::warn!("Donor {id}: ignoring last donation date '{date}': {e}");
                    })
                    .ok()
            });

        Ok(Self {
            id,
            name: non_empty(row.name, "name")?,
            contact: row.contact,
            address: row.address,
            blood_group: row.blood_group.parse()?,
            age: row.age,
            weight_kg: row.weight,
            last_donation,
            total_donations: row.total_donations,
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct UnitRow {
    group: String,
    collected: NaiveDate,
    expiry: NaiveDate,
    donor_id: Option<String>,
}

impl From<&BloodUnit> for UnitRow {
    fn from(unit: &BloodUnit) -> Self {
        Self {
            group: unit.group().to_string(),
            collected: unit.collected(),
            expiry: unit.expires(),
            donor_id: unit.donor().map(|id| id.to_string()),
        }
    }
}

impl TryFrom<UnitRow> for BloodUnit {
    type Error = RowError;

    /// The stored expiry is ignored and recomputed from the collection date.
    fn try_from(row: UnitRow) -> Result<Self, Self::Error> {
        let donor = row
            .donor_id
            .filter(|id| !id.trim().is_empty())
            .map(|id| id.trim().parse::<RecordId>())
            .transpose()?;

        Ok(Self::new(row.group.parse()?, row.collected, donor))
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct RequestRow {
    id: String,
    patient_name: String,
    blood_group: String,
    units: u32,
    priority: u8,
    request_date: NaiveDate,
    status: String,
    fulfilled_date: Option<NaiveDate>,
}

impl From<&BloodRequest> for RequestRow {
    fn from(request: &BloodRequest) -> Self {
        Self {
            id: request.id.to_string(),
            patient_name: request.patient.to_string(),
            blood_group: request.blood_group.to_string(),
            units: request.units_needed,
            priority: request.priority.level(),
            request_date: request.created,
            status: request.status.to_string(),
            fulfilled_date: request.fulfilled_on,
        }
    }
}

impl TryFrom<RequestRow> for BloodRequest {
    type Error = RowError;

    fn try_from(row: RequestRow) -> Result<Self, Self::Error> {
        if row.units == 0 {
            return Err(RowError::NoUnits);
        }

        let mut request = Self::new(
            row.id.parse()?,
            non_empty(row.patient_name, "patient name")?,
            row.blood_group.parse::<BloodGroup>()?,
            row.units,
            Priority::from_level(row.priority),
            row.request_date,
        );
        request.status = row.status.parse()?;
        request.fulfilled_on = row.fulfilled_date;
        Ok(request)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct CampRow {
    id: String,
    date: NaiveDate,
    location: String,
    organizer: String,
    units_collected: u32,
    registered_donors: String,
}

impl From<&DonationCamp> for CampRow {
    fn from(camp: &DonationCamp) -> Self {
        let registered: Vec<_> = camp.registered.iter().map(ToString::to_string).collect();
        Self {
            id: camp.id.to_string(),
            date: camp.date,
            location: camp.location.clone(),
            organizer: camp.organizer.clone(),
            units_collected: camp.units_collected,
            registered_donors: registered.join(";"),
        }
    }
}

impl TryFrom<CampRow> for DonationCamp {
    type Error = RowError;

    fn try_from(row: CampRow) -> Result<Self, Self::Error> {
        let id: RecordId = row.id.parse()?;

        let mut registered: Vec<RecordId> = Vec::new();
        for donor in row.registered_donors.split(';').map(str::trim) {
            if donor.is_empty() {
                continue;
            }
            match donor.parse::<RecordId>() {
                Ok(donor) if !registered.contains(&donor) => registered.push(donor),
                Ok(_) => {}
                Err(e) => tracing::warn!("Camp {id}: skipping registered donor: {e}"),
            }
        }

        Ok(Self {
            id,
            date: row.date,
            location: row.location,
            organizer: row.organizer,
            registered,
            units_collected: row.units_collected,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RequestStatus, donor::tests::donor, request::tests::request};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
    }

    #[test]
    fn donor_row_keeps_history() {
        let mut original = donor("D3", BloodGroup::BNeg);
        original.last_donation = Some(date());
        original.total_donations = 4;

        let restored = Donor::try_from(DonorRow::from(&original)).unwrap();

        assert_eq!(restored, original);
    }

    #[test]
    fn garbled_last_donation_becomes_none() {
        let mut row = DonorRow::from(&donor("D1", BloodGroup::APos));
        row.last_donation = Some("last tuesday".to_string());

        let donor = Donor::try_from(row).unwrap();

        assert_eq!(donor.last_donation(), None);
    }

    #[test]
    fn donor_with_invalid_group_is_rejected() {
        let mut row = DonorRow::from(&donor("D1", BloodGroup::APos));
        row.blood_group = "C+".to_string();

        assert!(matches!(
            Donor::try_from(row),
            Err(RowError::BloodGroup(_))
        ));
    }

    #[test]
    fn unit_expiry_is_recomputed() {
        let row = UnitRow {
            group: "O-".to_string(),
            collected: date(),
            expiry: NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
            donor_id: Some("D2".to_string()),
        };

        let unit = BloodUnit::try_from(row).unwrap();

        assert_eq!(unit.expires(), NaiveDate::from_ymd_opt(2024, 4, 11).unwrap());
        assert_eq!(unit.donor(), Some("D2".parse().unwrap()));
    }

    #[test]
    fn request_row_keeps_status_and_priority() {
        let mut original = request("R2", BloodGroup::AbPos, 3, Priority::Urgent, date());
        original.fulfil(date());

        let row = RequestRow::from(&original);
        assert_eq!(row.priority, 2);

        let restored = BloodRequest::try_from(row).unwrap();
        assert_eq!(restored.status(), RequestStatus::Fulfilled);
        assert_eq!(restored, original);
    }

    #[test]
    fn request_for_zero_units_is_rejected() {
        let mut row = RequestRow::from(&request("R1", BloodGroup::APos, 1, Priority::Normal, date()));
        row.units = 0;

        assert!(matches!(BloodRequest::try_from(row), Err(RowError::NoUnits)));
    }

    #[test]
    fn camp_donors_are_semicolon_separated() {
        let row = CampRow {
            id: "C1".to_string(),
            date: date(),
            location: "Library".to_string(),
            organizer: "Lions Club".to_string(),
            units_collected: 2,
            registered_donors: "D1;D4;;bogus;D1".to_string(),
        };

        let camp = DonationCamp::try_from(row).unwrap();
        let donors: Vec<_> = camp.registered().iter().map(ToString::to_string).collect();
        assert_eq!(donors, vec!["D1", "D4"]);

        assert_eq!(CampRow::from(&camp).registered_donors, "D1;D4");
    }
}
