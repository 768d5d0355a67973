use std::path::Path;

use chrono::NaiveDate;
use clap::Parser;
use lifelink::{RecordId, domain::NewCamp};
use tracing::instrument;

use super::{open, parse_date, parse_id, terminal::Colorize};

#[derive(Debug, clap::Subcommand)]
pub enum CampCommand {
    /// Schedule a donation camp
    Create(Create),

    /// Register a donor for a camp
    Register(Register),

    /// List donation camps
    List,
}

impl CampCommand {
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        match self {
            Self::Create(command) => command.run(root),
            Self::Register(command) => command.run(root),
            Self::List => list(root),
        }
    }
}

#[derive(Debug, Parser)]
pub struct Create {
    /// The day the camp runs (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub date: NaiveDate,

    /// Where the camp is held
    #[arg(long)]
    pub location: String,

    /// Who runs the camp
    #[arg(long, default_value = "")]
    pub organizer: String,
}

impl Create {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let mut directory = open(root)?;
        let id = directory
            .bank_mut()
            .create_camp(NewCamp {
                date: self.date,
                location: self.location,
                organizer: self.organizer,
            })?
            .id();
        directory.save()?;

        println!("{}", format!("Camp created with ID: {id}").success());
        Ok(())
    }
}

#[derive(Debug, Parser)]
pub struct Register {
    /// The camp's identifier
    #[clap(value_parser = parse_id)]
    pub camp: RecordId,

    /// The donor's identifier
    #[clap(value_parser = parse_id)]
    pub donor: RecordId,
}

impl Register {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let mut directory = open(root)?;
        if directory
            .bank_mut()
            .register_for_camp(self.camp, self.donor)?
        {
            directory.save()?;
            println!(
                "{}",
                format!("Donor {} registered for camp {}", self.donor, self.camp).success()
            );
        } else {
            println!(
                "{}",
                format!(
                    "Donor {} is already registered for camp {}",
                    self.donor, self.camp
                )
                .dim()
            );
        }
        Ok(())
    }
}

#[instrument(level = "debug")]
pub fn list(root: &Path) -> anyhow::Result<()> {
    let directory = open(root)?;
    let camps = directory.bank().camps();

    if camps.is_empty() {
        println!("No camps scheduled.");
        return Ok(());
    }

    for camp in camps.iter() {
        println!(
            "{}",
            format!("{} {} at {}", camp.id(), camp.date(), camp.location()).info()
        );
        if !camp.organizer().is_empty() {
            println!("  Organizer:       {}", camp.organizer());
        }
        let donors: Vec<_> = camp.registered().iter().map(ToString::to_string).collect();
        println!("  Registered:      {}", donors.len());
        if !donors.is_empty() {
            println!("  Donors:          {}", donors.join(", ").dim());
        }
        println!("  Units collected: {}", camp.units_collected());
    }
    Ok(())
}
