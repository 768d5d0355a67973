//! Domain models for blood bank management.
//!
//! This module contains the core domain types (donors, requests, blood units
//! and camps) together with the eligibility, compatibility and matching rules
//! that operate on them.

/// The eight ABO/Rh blood groups.
pub mod blood_group;
pub use blood_group::{BloodGroup, InvalidBloodGroup};

/// Donor-to-recipient transfusion compatibility.
pub mod compatibility;

mod config;
pub use config::Config;

/// Donor records.
pub mod donor;
pub use donor::{Donor, NewDonor};

/// Donor eligibility rules.
pub mod eligibility;

/// Record identities (`D1`, `R7`, `C2`) and their generation.
pub mod id;
pub use id::{Error as IdError, RecordId, RecordKind};

/// The blood unit ledger.
pub mod inventory;
pub use inventory::{BloodUnit, Inventory};

/// Allocation of stock and donors to pending requests.
pub mod matching;
pub use matching::{MatchEvent, MatchReport};

/// Blood requests.
pub mod request;
pub use request::{BloodRequest, NewRequest, Priority, RequestStatus};

/// Donation camps.
pub mod camp;
pub use camp::{DonationCamp, NewCamp};

mod registry;
pub use registry::{Record, Registry};

/// The blood bank aggregate.
pub mod bank;
pub use bank::{BloodBank, Donation, ValidationError};

/// Read-only reporting.
pub mod report;
pub use report::Report;
