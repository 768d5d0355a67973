//! Plain-text Blood Bank Management
//!
//! Donors, blood requests, a per-unit inventory and donation camps, held in
//! memory and persisted as delimited text files in a data directory.

pub mod domain;
pub use domain::{
    BloodBank, BloodGroup, BloodRequest, BloodUnit, Config, DonationCamp, Donor, Inventory,
    MatchReport, Priority, RecordId, RecordKind, Registry, RequestStatus,
};

/// Filesystem storage for the blood bank.
pub mod storage;
pub use storage::Directory;
