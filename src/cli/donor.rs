use std::path::Path;

use chrono::NaiveDate;
use clap::Parser;
use lifelink::{
    BloodGroup, Donor, RecordId,
    domain::{NewDonor, eligibility},
};
use tracing::instrument;

use super::{
    open, parse_date, parse_group, parse_id,
    terminal::{Colorize, is_narrow},
};

#[derive(Debug, clap::Subcommand)]
pub enum DonorCommand {
    /// Register a new donor
    Register(Register),

    /// List registered donors
    List(List),

    /// Show a donor's details and eligibility
    Show(Show),

    /// Find donors of a blood group who can donate today
    Search(Search),
}

impl DonorCommand {
    pub fn run(self, root: &Path, today: NaiveDate) -> anyhow::Result<()> {
        match self {
            Self::Register(command) => command.run(root),
            Self::List(command) => command.run(root, today),
            Self::Show(command) => command.run(root, today),
            Self::Search(command) => command.run(root, today),
        }
    }
}

#[derive(Debug, Parser)]
pub struct Register {
    /// Full name
    #[arg(long)]
    pub name: String,

    /// Age in whole years
    #[arg(long)]
    pub age: u32,

    /// Body weight in kilograms
    #[arg(long)]
    pub weight: f64,

    /// Blood group (A+, A-, B+, B-, AB+, AB-, O+, O-)
    #[arg(long, value_parser = parse_group)]
    pub group: BloodGroup,

    /// Phone number or other contact detail
    #[arg(long, default_value = "")]
    pub contact: String,

    /// Postal address
    #[arg(long, default_value = "")]
    pub address: String,

    /// Date of the most recent donation made elsewhere (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub last_donation: Option<NaiveDate>,
}

impl Register {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let mut directory = open(root)?;
        let donor = directory.bank_mut().register_donor(NewDonor {
            name: self.name,
            contact: self.contact,
            address: self.address,
            blood_group: self.group,
            age: self.age,
            weight_kg: self.weight,
            last_donation: self.last_donation,
        })?;
        let id = donor.id();
        directory.save()?;

        println!("{}", format!("✅ Donor registered with ID: {id}").success());
        Ok(())
    }
}

#[derive(Debug, Parser, Default)]
pub struct List {
    /// Only list donors of this blood group
    #[arg(long, value_parser = parse_group)]
    pub group: Option<BloodGroup>,
}

impl List {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: &Path, today: NaiveDate) -> anyhow::Result<()> {
        let directory = open(root)?;
        let bank = directory.bank();

        let donors: Vec<&Donor> = self.group.map_or_else(
            || bank.donors().iter().collect(),
            |group| bank.donors_by_group(group).collect(),
        );

        if donors.is_empty() {
            println!("No donors found. Register one with 'lifelink donor register'.");
            return Ok(());
        }

        println!("-- Donors ({}) --", donors.len());
        print_donors(&donors, today);
        Ok(())
    }
}

#[derive(Debug, Parser)]
pub struct Show {
    /// The donor's identifier
    #[clap(value_parser = parse_id)]
    pub id: RecordId,
}

impl Show {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: &Path, today: NaiveDate) -> anyhow::Result<()> {
        let directory = open(root)?;
        let donor = directory.bank().donor(self.id)?;

        println!("{}", format!("{} {}", donor.id(), donor.name()).info());
        println!("  Blood group:     {}", donor.blood_group());
        println!("  Age:             {}", donor.age());
        println!("  Weight:          {} kg", donor.weight_kg());
        println!("  Contact:         {}", donor.contact());
        println!("  Address:         {}", donor.address());
        println!(
            "  Last donation:   {}",
            donor
                .last_donation()
                .map_or_else(|| "never".to_string(), |date| date.to_string())
        );
        println!("  Total donations: {}", donor.total_donations());

        let reasons = eligibility::assess(donor, today);
        if reasons.is_empty() {
            println!("  {}", "Eligible to donate".success());
        } else {
            println!("  {}", "Not eligible to donate".warning());
            for reason in &reasons {
                println!("    • {reason}");
            }
            println!(
                "  {}",
                format!(
                    "Next eligible: {}",
                    eligibility::next_eligible_date(donor, today)
                )
                .dim()
            );
        }
        Ok(())
    }
}

#[derive(Debug, Parser)]
pub struct Search {
    /// Blood group to search for
    #[clap(value_parser = parse_group)]
    pub group: BloodGroup,
}

impl Search {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: &Path, today: NaiveDate) -> anyhow::Result<()> {
        let directory = open(root)?;
        let donors: Vec<_> = directory
            .bank()
            .eligible_donors(self.group, today)
            .collect();

        if donors.is_empty() {
            println!(
                "{}",
                format!("No eligible {} donors today", self.group).warning()
            );
            return Ok(());
        }

        print_donors(&donors, today);
        Ok(())
    }
}

fn print_donors(donors: &[&Donor], today: NaiveDate) {
    let narrow = is_narrow();
    for donor in donors {
        let status = if donor.is_eligible(today) {
            "eligible".success()
        } else {
            "not eligible".dim()
        };

        if narrow {
            println!(
                "{} {} ({}) {status}",
                donor.id(),
                donor.name(),
                donor.blood_group()
            );
        } else {
            let last = donor
                .last_donation()
                .map_or_else(|| "-".to_string(), |date| date.to_string());
            println!(
                "{:<6} {:<24} {:<4} {:>3}y {:>6.1}kg  last: {:<10}  donations: {:<3} {status}",
                donor.id().to_string(),
                donor.name(),
                donor.blood_group().as_str(),
                donor.age(),
                donor.weight_kg(),
                last,
                donor.total_donations(),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    fn register(name: &str) -> Register {
        Register {
            name: name.to_string(),
            age: 40,
            weight: 75.0,
            group: BloodGroup::BPos,
            contact: String::new(),
            address: String::new(),
            last_donation: None,
        }
    }

    #[test]
    fn register_persists_donor() {
        let tmp = tempdir().unwrap();

        register("Kim").run(tmp.path()).unwrap();
        register("Lee").run(tmp.path()).unwrap();

        let directory = open(tmp.path()).unwrap();
        let names: Vec<_> = directory
            .bank()
            .donors()
            .iter()
            .map(|donor| donor.name().to_string())
            .collect();
        assert_eq!(names, vec!["Kim", "Lee"]);
    }

    #[test]
    fn register_rejects_blank_name() {
        let tmp = tempdir().unwrap();

        assert!(register("  ").run(tmp.path()).is_err());
        assert!(open(tmp.path()).unwrap().bank().donors().is_empty());
    }

    #[test]
    fn show_unknown_donor_fails() {
        let tmp = tempdir().unwrap();
        let show = Show {
            id: "D5".parse().unwrap(),
        };

        let error = show
            .run(tmp.path(), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
            .unwrap_err();

        assert_eq!(error.to_string(), "Donor D5 not found");
    }
}
