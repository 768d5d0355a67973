use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use non_empty_string::NonEmptyString;
use serde::Serialize;

use crate::domain::{BloodGroup, Record, RecordId, RecordKind};

/// How urgently a request must be serviced.
///
/// Priorities order from most to least urgent, so sorting ascending puts
/// critical requests first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Priority {
    /// Life-threatening; serviced before everything else.
    Critical,
    /// Serviced before routine requests.
    Urgent,
    /// Routine.
    Normal,
}

impl Priority {
    /// The numeric level used in storage, from 1 (critical) to 3 (normal).
    #[must_use]
    pub const fn level(self) -> u8 {
        match self {
            Self::Critical => 1,
            Self::Urgent => 2,
            Self::Normal => 3,
        }
    }

    /// The priority for a numeric level.
    ///
    /// Anything other than 1 or 2 is treated as normal.
    #[must_use]
    pub const fn from_level(level: u8) -> Self {
        match level {
            1 => Self::Critical,
            2 => Self::Urgent,
            _ => Self::Normal,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Critical => "Critical",
            Self::Urgent => "Urgent",
            Self::Normal => "Normal",
        })
    }
}

/// The lifecycle state of a request.
///
/// Transitions only ever leave [`RequestStatus::Pending`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RequestStatus {
    /// Waiting for stock or donors.
    Pending,
    /// Fully supplied.
    Fulfilled,
    /// Withdrawn by the operator.
    Cancelled,
}

impl RequestStatus {
    /// The name used in storage and output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Fulfilled => "Fulfilled",
            Self::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not a known request status.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Unknown request status '{0}'")]
pub struct UnknownStatus(String);

impl FromStr for RequestStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "fulfilled" => Ok(Self::Fulfilled),
            "cancelled" | "canceled" => Ok(Self::Cancelled),
            _ => Err(UnknownStatus(s.to_string())),
        }
    }
}

/// A request for blood on behalf of a patient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BloodRequest {
    pub(crate) id: RecordId,
    pub(crate) patient: NonEmptyString,
    pub(crate) blood_group: BloodGroup,
    pub(crate) units_needed: u32,
    pub(crate) priority: Priority,
    pub(crate) created: NaiveDate,
    pub(crate) status: RequestStatus,
    pub(crate) fulfilled_on: Option<NaiveDate>,
}

/// The details collected when a request is submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRequest {
    /// The patient's name. Must not be empty.
    pub patient: String,
    /// The blood group the patient needs.
    pub blood_group: BloodGroup,
    /// Number of units needed. Must be at least one.
    pub units_needed: u32,
    /// How urgently the request must be serviced.
    pub priority: Priority,
}

impl BloodRequest {
    pub(crate) const fn new(
        id: RecordId,
        patient: NonEmptyString,
        blood_group: BloodGroup,
        units_needed: u32,
        priority: Priority,
        created: NaiveDate,
    ) -> Self {
        Self {
            id,
            patient,
            blood_group,
            units_needed,
            priority,
            created,
            status: RequestStatus::Pending,
            fulfilled_on: None,
        }
    }

    /// The request's identifier.
    #[must_use]
    pub const fn id(&self) -> RecordId {
        self.id
    }

    /// The patient's name.
    #[must_use]
    pub fn patient(&self) -> &str {
        self.patient.as_str()
    }

    /// The blood group the patient needs.
    #[must_use]
    pub const fn blood_group(&self) -> BloodGroup {
        self.blood_group
    }

    /// Number of units needed.
    #[must_use]
    pub const fn units_needed(&self) -> u32 {
        self.units_needed
    }

    /// How urgently the request must be serviced.
    #[must_use]
    pub const fn priority(&self) -> Priority {
        self.priority
    }

    /// The date the request was submitted.
    #[must_use]
    pub const fn created(&self) -> NaiveDate {
        self.created
    }

    /// The current status.
    #[must_use]
    pub const fn status(&self) -> RequestStatus {
        self.status
    }

    /// The date the request was fulfilled, if it has been.
    #[must_use]
    pub const fn fulfilled_on(&self) -> Option<NaiveDate> {
        self.fulfilled_on
    }

    /// Whether the request is still waiting to be serviced.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }

    /// The key requests are serviced in: most urgent first, then oldest, then
    /// by identifier.
    pub(crate) const fn service_order(&self) -> (Priority, NaiveDate, RecordId) {
        (self.priority, self.created, self.id)
    }

    /// Marks a pending request as fulfilled on `today`.
    ///
    /// Returns `false`, leaving the request untouched, if it was not pending.
    pub(crate) fn fulfil(&mut self, today: NaiveDate) -> bool {
        if !self.is_pending() {
            return false;
        }
        self.status = RequestStatus::Fulfilled;
        self.fulfilled_on = Some(today);
        true
    }

    /// Marks a pending request as cancelled.
    ///
    /// Returns `false`, leaving the request untouched, if it was not pending.
    pub(crate) fn cancel(&mut self) -> bool {
        if !self.is_pending() {
            return false;
        }
        self.status = RequestStatus::Cancelled;
        true
    }
}

impl Record for BloodRequest {
    const KIND: RecordKind = RecordKind::Request;

    fn id(&self) -> RecordId {
        self.id
    }
}
