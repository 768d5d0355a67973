use std::path::Path;

use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use lifelink::{BloodGroup, BloodRequest, Priority, RecordId, RequestStatus, domain::NewRequest};
use tracing::instrument;

use super::{
    announce_matches, open, parse_group, parse_id,
    terminal::{Colorize, is_narrow},
};

#[derive(Debug, clap::Subcommand)]
pub enum RequestCommand {
    /// Submit a blood request and try to match it straight away
    Create(Create),

    /// List blood requests
    List(List),

    /// Cancel a pending request
    Cancel(Cancel),
}

impl RequestCommand {
    pub fn run(self, root: &Path, today: NaiveDate) -> anyhow::Result<()> {
        match self {
            Self::Create(command) => command.run(root, today),
            Self::List(command) => command.run(root),
            Self::Cancel(command) => command.run(root),
        }
    }
}

/// Request priority as accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum PriorityArg {
    Critical,
    Urgent,
    #[default]
    Normal,
}

impl From<PriorityArg> for Priority {
    fn from(priority: PriorityArg) -> Self {
        match priority {
            PriorityArg::Critical => Self::Critical,
            PriorityArg::Urgent => Self::Urgent,
            PriorityArg::Normal => Self::Normal,
        }
    }
}

#[derive(Debug, Parser)]
pub struct Create {
    /// The patient's name
    #[arg(long)]
    pub patient: String,

    /// Blood group the patient needs
    #[arg(long, value_parser = parse_group)]
    pub group: BloodGroup,

    /// Number of units needed
    #[arg(long, default_value_t = 1)]
    pub units: u32,

    /// How urgently the blood is needed
    #[arg(long, value_enum, default_value_t)]
    pub priority: PriorityArg,
}

impl Create {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: &Path, today: NaiveDate) -> anyhow::Result<()> {
        let mut directory = open(root)?;
        let id = directory.bank_mut().submit_request(
            NewRequest {
                patient: self.patient,
                blood_group: self.group,
                units_needed: self.units,
                priority: self.priority.into(),
            },
            today,
        )?;
        println!("{}", format!("Request created with ID: {id}").success());

        let report = directory.bank_mut().match_requests(today);
        directory.save()?;

        announce_matches(&directory, &report, today);
        Ok(())
    }
}

#[derive(Debug, Parser, Default)]
pub struct List {
    /// Only list requests with this status (pending, fulfilled, cancelled)
    #[arg(long)]
    pub status: Option<RequestStatus>,
}

impl List {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let directory = open(root)?;
        let requests: Vec<&BloodRequest> = directory
            .bank()
            .requests()
            .iter()
            .filter(|request| self.status.is_none_or(|status| request.status() == status))
            .collect();

        if requests.is_empty() {
            println!("No requests found.");
            return Ok(());
        }

        println!("-- Requests ({}) --", requests.len());
        let narrow = is_narrow();
        for request in requests {
            let status = colored_status(request.status());
            if narrow {
                println!(
                    "{} {} {}x{} {status}",
                    request.id(),
                    request.patient(),
                    request.units_needed(),
                    request.blood_group()
                );
                continue;
            }

            let fulfilled = request
                .fulfilled_on()
                .map(|date| format!(" on {date}"))
                .unwrap_or_default();
            println!(
                "{:<6} {:<24} {:<4} {:>3} unit(s)  {:<8} created {}  {status}{fulfilled}",
                request.id().to_string(),
                request.patient(),
                request.blood_group().as_str(),
                request.units_needed(),
                request.priority().to_string(),
                request.created(),
            );
        }
        Ok(())
    }
}

fn colored_status(status: RequestStatus) -> String {
    match status {
        RequestStatus::Pending => status.as_str().warning(),
        RequestStatus::Fulfilled => status.as_str().success(),
        RequestStatus::Cancelled => status.as_str().dim(),
    }
}

#[derive(Debug, Parser)]
pub struct Cancel {
    /// The request's identifier
    #[clap(value_parser = parse_id)]
    pub id: RecordId,
}

impl Cancel {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let mut directory = open(root)?;
        directory.bank_mut().cancel_request(self.id)?;
        directory.save()?;

        println!("Request {} cancelled", self.id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use lifelink::domain::NewDonor;
    use tempfile::tempdir;

    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
    }

    fn create(group: BloodGroup, units: u32) -> Create {
        Create {
            patient: "Pat".to_string(),
            group,
            units,
            priority: PriorityArg::Urgent,
        }
    }

    #[test]
    fn create_matches_from_stock() {
        let tmp = tempdir().unwrap();
        let mut directory = open(tmp.path()).unwrap();
        directory
            .bank_mut()
            .add_stock(BloodGroup::APos, 3, today())
            .unwrap();
        directory.save().unwrap();

        create(BloodGroup::APos, 2).run(tmp.path(), today()).unwrap();

        let directory = open(tmp.path()).unwrap();
        let request = directory.bank().requests().iter().next().unwrap();
        assert_eq!(request.status(), RequestStatus::Fulfilled);
        assert_eq!(request.priority(), Priority::Urgent);
        assert_eq!(directory.bank().inventory().len(), 1);
    }

    #[test]
    fn create_without_supply_stays_pending() {
        let tmp = tempdir().unwrap();

        create(BloodGroup::BNeg, 1).run(tmp.path(), today()).unwrap();

        let directory = open(tmp.path()).unwrap();
        let request = directory.bank().requests().iter().next().unwrap();
        assert_eq!(request.status(), RequestStatus::Pending);
    }

    #[test]
    fn create_solicits_an_eligible_donor() {
        let tmp = tempdir().unwrap();
        let mut directory = open(tmp.path()).unwrap();
        directory
            .bank_mut()
            .register_donor(NewDonor {
                name: "Ola".to_string(),
                contact: String::new(),
                address: String::new(),
                blood_group: BloodGroup::OPos,
                age: 33,
                weight_kg: 70.0,
                last_donation: None,
            })
            .unwrap();
        directory.save().unwrap();

        create(BloodGroup::OPos, 1).run(tmp.path(), today()).unwrap();

        let directory = open(tmp.path()).unwrap();
        let request = directory.bank().requests().iter().next().unwrap();
        assert_eq!(request.status(), RequestStatus::Fulfilled);
        assert!(
            tmp.path()
                .join("certificates")
                .join("D1_certificate.txt")
                .exists()
        );
    }

    #[test]
    fn zero_units_is_rejected() {
        let tmp = tempdir().unwrap();

        assert!(create(BloodGroup::APos, 0).run(tmp.path(), today()).is_err());
        assert!(open(tmp.path()).unwrap().bank().requests().is_empty());
    }

    #[test]
    fn cancel_only_pending_requests() {
        let tmp = tempdir().unwrap();
        create(BloodGroup::BNeg, 1).run(tmp.path(), today()).unwrap();
        let id: RecordId = "R1".parse().unwrap();

        Cancel { id }.run(tmp.path()).unwrap();
        let error = Cancel { id }.run(tmp.path()).unwrap_err();

        assert_eq!(error.to_string(), "Request R1 is Cancelled, not pending");
    }
}
