use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::{BloodBank, BloodGroup, Config, RecordId, RequestStatus};

/// A donor's place in the donation ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DonorRanking {
    /// The donor.
    pub id: RecordId,
    /// The donor's name.
    pub name: String,
    /// Donations made so far.
    pub donations: u32,
}

/// A blood group running short.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LowStock {
    /// The group.
    pub group: BloodGroup,
    /// Usable units left.
    pub units: usize,
}

/// A snapshot of the bank's activity and stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    /// The date the snapshot describes.
    pub date: NaiveDate,
    /// The most active donors, most donations first.
    pub top_donors: Vec<DonorRanking>,
    /// Usable units per blood group.
    pub stock: BTreeMap<BloodGroup, usize>,
    /// Groups below the configured threshold.
    pub low_stock: Vec<LowStock>,
    /// The threshold used for `low_stock`.
    pub low_stock_threshold: usize,
    /// Requests that have been fulfilled.
    pub requests_fulfilled: usize,
    /// Requests ever submitted, whatever their status.
    pub requests_total: usize,
}

impl Report {
    /// Builds a report of `bank` as of `today`.
    ///
    /// Donors are ranked by donation count; donors with equal counts are
    /// listed in identifier order.
    #[must_use]
    pub fn generate(bank: &BloodBank, config: &Config, today: NaiveDate) -> Self {
        let mut ranking: Vec<_> = bank
            .donors()
            .iter()
            .map(|donor| DonorRanking {
                id: donor.id(),
                name: donor.name().to_string(),
                donations: donor.total_donations(),
            })
            .collect();
        ranking.sort_by(|a, b| b.donations.cmp(&a.donations).then(a.id.cmp(&b.id)));
        ranking.truncate(config.top_donors());

        let threshold = config.low_stock_threshold();
        let low_stock = bank
            .inventory()
            .low_stock(today, threshold)
            .into_iter()
            .map(|(group, units)| LowStock { group, units })
            .collect();

        let requests = bank.requests();
        let requests_fulfilled = requests
            .iter()
            .filter(|request| request.status() == RequestStatus::Fulfilled)
            .count();

        Self {
            date: today,
            top_donors: ranking,
            stock: bank.inventory().summary(today),
            low_stock,
            low_stock_threshold: threshold,
            requests_fulfilled,
            requests_total: requests.len(),
        }
    }
}
