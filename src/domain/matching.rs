//! Allocation of inventory and donors to pending blood requests.
//!
//! A matching pass walks every pending request, most urgent and oldest first.
//! A request whose group is in stock is supplied from the ledger. Otherwise
//! eligible, compatible donors are asked to donate on the spot, one unit each,
//! until the request is covered or the donors run out.
//!
//! Donations solicited for a request that still ends up short are kept: the
//! units stay in the ledger and the donors' histories stay updated, while the
//! request remains pending.

use std::fmt;

use chrono::NaiveDate;
use nonempty::NonEmpty;
use tracing::instrument;

use crate::domain::{
    BloodGroup, BloodRequest, Donor, Inventory, RecordId, Registry, compatibility,
};

/// Something that happened during a matching pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchEvent {
    /// A request was supplied entirely from existing stock.
    FulfilledFromStock {
        /// The fulfilled request.
        request: RecordId,
        /// Units taken from the ledger.
        units: u32,
    },
    /// A donor was asked to give one unit towards a request.
    DonorSolicited {
        /// The request the donation was made for.
        request: RecordId,
        /// The donor who gave.
        donor: RecordId,
        /// The donor's blood group, which is the group of the added unit.
        group: BloodGroup,
    },
    /// A request was covered by newly solicited donations.
    FulfilledFromDonors {
        /// The fulfilled request.
        request: RecordId,
        /// The donors whose units covered it.
        donors: NonEmpty<RecordId>,
    },
    /// Donors were solicited for a request but there were too few of them.
    PartiallyMatched {
        /// The request that remains pending.
        request: RecordId,
        /// Units donated towards it during this pass.
        solicited: u32,
        /// Units still missing.
        outstanding: u32,
    },
}

impl fmt::Display for MatchEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FulfilledFromStock { request, units } => {
                write!(f, "Request {request} fulfilled from inventory ({units} units)")
            }
            Self::DonorSolicited {
                request,
                donor,
                group,
            } => write!(f, "Notified donor {donor} ({group}) for request {request}"),
            Self::FulfilledFromDonors { request, donors } => {
                let donors: Vec<_> = donors.iter().map(ToString::to_string).collect();
                write!(
                    f,
                    "Request {request} fulfilled via matched donors ({})",
                    donors.join(", ")
                )
            }
            Self::PartiallyMatched {
                request,
                solicited,
                outstanding,
            } => write!(
                f,
                "Partial donors found for {request}: {solicited} donated, {outstanding} still \
                 needed"
            ),
        }
    }
}

/// The outcome of a matching pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchReport {
    /// Everything that changed, in the order it happened.
    pub events: Vec<MatchEvent>,
    /// Requests still pending after the pass, in service order.
    pub pending: Vec<RecordId>,
}

impl MatchReport {
    /// Whether the pass changed nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Requests fulfilled during the pass.
    pub fn fulfilled(&self) -> impl Iterator<Item = RecordId> + '_ {
        self.events.iter().filter_map(|event| match event {
            MatchEvent::FulfilledFromStock { request, .. }
            | MatchEvent::FulfilledFromDonors { request, .. } => Some(*request),
            _ => None,
        })
    }

    /// Donors who donated during the pass, in the order they were asked.
    pub fn solicited_donors(&self) -> impl Iterator<Item = RecordId> + '_ {
        self.events.iter().filter_map(|event| match event {
            MatchEvent::DonorSolicited { donor, .. } => Some(*donor),
            _ => None,
        })
    }
}

/// Runs a matching pass over every pending request.
///
/// The pass repeats its sweep until nothing changes, because donations
/// solicited for one request can put enough stock on the shelf for a request
/// that was already visited. Calling this again without new requests, donors
/// or stock is therefore a no-op.
#[instrument(level = "debug", skip_all)]
pub fn match_requests(
    requests: &mut Registry<BloodRequest>,
    donors: &mut Registry<Donor>,
    inventory: &mut Inventory,
    today: NaiveDate,
) -> MatchReport {
    let mut report = MatchReport::default();

    // Terminates: after the first sweep no donor becomes eligible again on the
    // same day, so later sweeps can only fulfil requests from stock.
    while sweep(requests, donors, inventory, today, &mut report) {}

    report.pending = service_queue(requests);
    report
}

/// Pending requests, most urgent first, then oldest first.
fn service_queue(requests: &Registry<BloodRequest>) -> Vec<RecordId> {
    let mut queue: Vec<_> = requests
        .iter()
        .filter(|request| request.is_pending())
        .map(BloodRequest::service_order)
        .collect();
    queue.sort_unstable();
    queue.into_iter().map(|(_, _, id)| id).collect()
}

/// Services every pending request once. Returns whether anything changed.
fn sweep(
    requests: &mut Registry<BloodRequest>,
    donors: &mut Registry<Donor>,
    inventory: &mut Inventory,
    today: NaiveDate,
    report: &mut MatchReport,
) -> bool {
    let mut changed = false;
    for id in service_queue(requests) {
        if let Some(request) = requests.get_mut(id) {
            changed |= service(request, donors, inventory, today, report);
        }
    }
    changed
}

fn service(
    request: &mut BloodRequest,
    donors: &mut Registry<Donor>,
    inventory: &mut Inventory,
    today: NaiveDate,
    report: &mut MatchReport,
) -> bool {
    let id = request.id();
    let group = request.blood_group();
    let units = request.units_needed();
    let needed = usize::try_from(units).unwrap_or(usize::MAX);

    inventory.prune_expired(today);
    let available = inventory.count_available(group, today);

    if available >= needed {
        inventory.consume(group, needed, today);
        request.fulfil(today);
        tracing::info!("Request {id} fulfilled from inventory");
        report
            .events
            .push(MatchEvent::FulfilledFromStock { request: id, units });
        return true;
    }

    let eligible = candidates(donors, group, today);
    let Some(solicited) = NonEmpty::from_vec(eligible.into_iter().take(needed).collect()) else {
        tracing::debug!("No eligible donors currently for request {id}");
        return false;
    };

    for &donor_id in solicited.iter() {
        let Some(donor) = donors.get_mut(donor_id) else {
            continue;
        };
        inventory.add_unit(donor.blood_group(), today, Some(donor_id));
        donor.record_donation(today);
        tracing::info!("Notified donor {donor_id} for request {id}");
        report.events.push(MatchEvent::DonorSolicited {
            request: id,
            donor: donor_id,
            group: donor.blood_group(),
        });
    }

    let outstanding = needed - solicited.len();
    if outstanding == 0 {
        // The request's own group first, then what the solicited donors gave
        let taken = inventory.consume(group, needed, today);
        let donated: Vec<RecordId> = solicited.iter().copied().collect();
        inventory.take_donations(&donated, today, needed - taken);
        request.fulfil(today);
        tracing::info!("Request {id} fulfilled via matched donors");
        report.events.push(MatchEvent::FulfilledFromDonors {
            request: id,
            donors: solicited,
        });
    } else {
        tracing::info!("Partial donors found for {id}; still pending");
        report.events.push(MatchEvent::PartiallyMatched {
            request: id,
            solicited: u32::try_from(solicited.len()).unwrap_or(u32::MAX),
            outstanding: u32::try_from(outstanding).unwrap_or(u32::MAX),
        });
    }

    true
}

/// Donors who may give to `recipient` today, longest since last donation
/// first. Donors who have never donated come before everyone else.
fn candidates(donors: &Registry<Donor>, recipient: BloodGroup, today: NaiveDate) -> Vec<RecordId> {
    let mut candidates: Vec<&Donor> = donors
        .iter()
        .filter(|donor| compatibility::is_compatible(donor.blood_group(), recipient))
        .filter(|donor| donor.is_eligible(today))
        .collect();
    candidates.sort_by_key(|donor| (donor.last_donation(), donor.id()));
    candidates.into_iter().map(Donor::id).collect()
}
