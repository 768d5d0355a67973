use std::path::Path;

use chrono::NaiveDate;
use clap::Parser;
use lifelink::BloodGroup;
use tracing::instrument;

use super::{
    open, parse_group,
    terminal::{Colorize, is_narrow},
};

#[derive(Debug, clap::Subcommand)]
pub enum InventoryCommand {
    /// Show usable units per blood group
    Show,

    /// Add units collected today
    Add(Add),

    /// Remove expired units
    Prune,

    /// List blood groups below the low stock threshold
    Low,
}

impl InventoryCommand {
    pub fn run(self, root: &Path, today: NaiveDate) -> anyhow::Result<()> {
        match self {
            Self::Show => show(root, today),
            Self::Add(command) => command.run(root, today),
            Self::Prune => prune(root, today),
            Self::Low => low(root, today),
        }
    }
}

#[instrument(level = "debug")]
pub fn show(root: &Path, today: NaiveDate) -> anyhow::Result<()> {
    let mut directory = open(root)?;
    if directory.bank_mut().prune_expired(today) > 0 {
        directory.save()?;
    }

    let threshold = directory.config().low_stock_threshold();
    let summary = directory.bank().inventory().summary(today);

    println!("-- Inventory on {today} --");
    let narrow = is_narrow();
    for (group, count) in summary {
        let line = if narrow {
            format!("{group}: {count}")
        } else {
            format!("{:<4} {count:>4} unit(s)", group.as_str())
        };
        if count < threshold {
            println!("{}  {}", line.alert(), "LOW".alert());
        } else {
            println!("{line}");
        }
    }
    Ok(())
}

#[derive(Debug, Parser)]
pub struct Add {
    /// Blood group of the units
    #[clap(value_parser = parse_group)]
    pub group: BloodGroup,

    /// Number of units to add
    #[arg(long, default_value_t = 1)]
    pub count: u32,
}

impl Add {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: &Path, today: NaiveDate) -> anyhow::Result<()> {
        let mut directory = open(root)?;
        directory
            .bank_mut()
            .add_stock(self.group, self.count, today)?;
        directory.save()?;

        println!(
            "{}",
            format!("{} unit(s) of {} added to inventory", self.count, self.group).success()
        );
        Ok(())
    }
}

#[instrument(level = "debug")]
pub fn prune(root: &Path, today: NaiveDate) -> anyhow::Result<()> {
    let mut directory = open(root)?;
    let pruned = directory.bank_mut().prune_expired(today);
    directory.save()?;

    if pruned == 0 {
        println!("{}", "No expired units".dim());
    } else {
        println!("Removed {pruned} expired unit(s)");
    }
    Ok(())
}

#[instrument(level = "debug")]
pub fn low(root: &Path, today: NaiveDate) -> anyhow::Result<()> {
    let directory = open(root)?;
    let threshold = directory.config().low_stock_threshold();
    let low = directory.bank().inventory().low_stock(today, threshold);

    if low.is_empty() {
        println!(
            "{}",
            format!("Every blood group has at least {threshold} unit(s)").success()
        );
        return Ok(());
    }

    for (group, count) in low {
        println!(
            "{}",
            format!("⚠️  Low stock: {group} has {count} unit(s), below {threshold}").alert()
        );
    }
    Ok(())
}
