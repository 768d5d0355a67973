use std::path::{Path, PathBuf};

mod camp;
mod donor;
mod inventory;
mod menu;
mod report;
mod request;
mod terminal;

use camp::CampCommand;
use chrono::NaiveDate;
use clap::ArgAction;
use donor::DonorCommand;
use inventory::InventoryCommand;
use lifelink::{
    BloodGroup, Directory, MatchReport, RecordId,
    domain::MatchEvent,
    storage::{CONFIG_FILE, Loaded},
};
use report::Report;
use request::RequestCommand;
use tracing::instrument;

/// Parse a record identifier from a string, normalizing to uppercase.
///
/// This is a CLI boundary function that accepts lowercase input
/// and normalizes it before parsing.
fn parse_id(s: &str) -> Result<RecordId, String> {
    let uppercase = s.trim().to_uppercase();
    uppercase.parse().map_err(|e| format!("{e}"))
}

/// Parse a blood group such as `AB-` (case-insensitive).
fn parse_group(s: &str) -> Result<BloodGroup, String> {
    s.parse().map_err(|e| format!("{e}"))
}

/// Parse a `YYYY-MM-DD` date.
fn parse_date(s: &str) -> Result<NaiveDate, String> {
    s.trim()
        .parse()
        .map_err(|e| format!("Invalid date '{s}' (expected YYYY-MM-DD): {e}"))
}

/// Loads the blood bank stored under `root`.
///
/// A missing `root` is an empty bank; it is created on the first save.
fn open(root: &Path) -> anyhow::Result<Directory<Loaded>> {
    anyhow::ensure!(
        !root.exists() || root.is_dir(),
        "{} is not a directory",
        root.display()
    );
    Ok(Directory::new(root.to_path_buf()).load_all())
}

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// The path to the blood bank data directory
    #[arg(short, long, default_value = ".", global = true)]
    root: PathBuf,

    /// Treat this date (YYYY-MM-DD) as today instead of the system date
    #[arg(long, value_parser = parse_date, global = true)]
    today: Option<NaiveDate>,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        let today = self
            .today
            .unwrap_or_else(|| chrono::Local::now().date_naive());

        self.command
            .unwrap_or(Command::Menu)
            .run(&self.root, today)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Initialize a new blood bank data directory
    Init,

    /// Register, list and search donors
    #[command(subcommand)]
    Donor(DonorCommand),

    /// Record a donation by an eligible donor
    ///
    /// One unit of the donor's blood group is added to the inventory and a
    /// certificate is written.
    Donate(Donate),

    /// Create, list and cancel blood requests
    #[command(subcommand)]
    Request(RequestCommand),

    /// Inspect and update the blood unit inventory
    #[command(subcommand)]
    Inventory(InventoryCommand),

    /// Match pending requests against inventory and eligible donors
    Match,

    /// Show donor rankings, stock levels and request totals
    Report(Report),

    /// Manage donation camps
    #[command(subcommand)]
    Camp(CampCommand),

    /// Interactive menu (default)
    Menu,
}

impl Command {
    fn run(self, root: &Path, today: NaiveDate) -> anyhow::Result<()> {
        match self {
            Self::Init => init(root)?,
            Self::Donor(command) => command.run(root, today)?,
            Self::Donate(command) => command.run(root, today)?,
            Self::Request(command) => command.run(root, today)?,
            Self::Inventory(command) => command.run(root, today)?,
            Self::Match => match_pending(root, today)?,
            Self::Report(command) => command.run(root, today)?,
            Self::Camp(command) => command.run(root)?,
            Self::Menu => menu::run(root, today)?,
        }
        Ok(())
    }
}

/// Creates the configuration file and empty record files under `root`.
#[instrument]
fn init(root: &Path) -> anyhow::Result<()> {
    if root.join(CONFIG_FILE).exists() {
        anyhow::bail!(
            "Blood bank already initialized (found existing {CONFIG_FILE} in {})",
            root.display()
        );
    }

    Directory::new(root.to_path_buf()).init()?;

    println!("Initialized blood bank in {}", root.display());
    println!("  Created: {CONFIG_FILE}");
    println!("  Created: donors.csv, inventory.csv, requests.csv, camps.csv");
    println!();
    println!("Next steps:");
    println!("  lifelink donor register --name \"Jane Doe\" --age 30 --weight 65 --group O+");

    Ok(())
}

#[derive(Debug, clap::Parser)]
pub struct Donate {
    /// The donor's identifier
    #[clap(value_parser = parse_id)]
    pub donor: RecordId,

    /// Credit the donation to this camp
    #[arg(long, value_parser = parse_id)]
    pub camp: Option<RecordId>,
}

impl Donate {
    #[instrument]
    fn run(self, root: &Path, today: NaiveDate) -> anyhow::Result<()> {
        use terminal::Colorize;

        let mut directory = open(root)?;
        let donation = directory.bank_mut().donate(self.donor, self.camp, today)?;
        directory.save()?;

        let place = donation
            .camp
            .map(|camp| format!(" at camp {camp}"))
            .unwrap_or_default();
        let message = format!(
            "✅ Donation recorded{place}. 1 unit of {} added to inventory.",
            donation.group
        );
        println!("{}", message.success());
        println!(
            "{}",
            format!(
                "{} has donated {} time(s)",
                donation.donor, donation.total_donations
            )
            .dim()
        );

        if let Some(path) = directory.issue_certificate(donation.donor, today) {
            println!("Certificate generated: {}", path.display());
        }
        Ok(())
    }
}

/// Runs one matching pass over the pending requests and saves the result.
#[instrument]
fn match_pending(root: &Path, today: NaiveDate) -> anyhow::Result<()> {
    let mut directory = open(root)?;
    let report = directory.bank_mut().match_requests(today);
    directory.save()?;

    announce_matches(&directory, &report, today);
    Ok(())
}

/// Prints the outcome of a matching pass and writes certificates for every
/// donor who gave during it.
fn announce_matches(directory: &Directory<Loaded>, report: &MatchReport, today: NaiveDate) {
    use terminal::Colorize;

    if report.is_empty() {
        if report.pending.is_empty() {
            println!("{}", "No pending requests".dim());
        } else {
            println!(
                "{}",
                "No pending requests could be matched right now".warning()
            );
        }
    }

    for event in &report.events {
        let line = event.to_string();
        match event {
            MatchEvent::FulfilledFromStock { .. } | MatchEvent::FulfilledFromDonors { .. } => {
                println!("{}", format!("✅ {line}").success());
            }
            MatchEvent::DonorSolicited { .. } => println!("{}", line.info()),
            MatchEvent::PartiallyMatched { .. } => {
                println!("{}", format!("⚠️  {line}").warning());
            }
        }
    }

    for donor in report.solicited_donors() {
        if let Some(path) = directory.issue_certificate(donor, today) {
            println!(
                "{}",
                format!("Certificate generated: {}", path.display()).dim()
            );
        }
    }

    if !report.pending.is_empty() {
        let pending: Vec<_> = report.pending.iter().map(ToString::to_string).collect();
        println!(
            "{}",
            format!("Still pending: {}", pending.join(", ")).dim()
        );
    }
}
