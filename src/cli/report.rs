use std::path::Path;

use chrono::NaiveDate;
use clap::Parser;
use lifelink::domain::Report as Snapshot;
use tracing::instrument;

use super::{
    open,
    terminal::{Colorize, is_narrow},
};

#[derive(Debug, Parser, Default)]
#[command(about = "Show donor rankings, stock levels and request totals")]
pub struct Report {
    /// Output format (table, json)
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    pub output: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl Report {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: &Path, today: NaiveDate) -> anyhow::Result<()> {
        let directory = open(root)?;
        let snapshot = Snapshot::generate(directory.bank(), directory.config(), today);

        match self.output {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&snapshot)?),
            OutputFormat::Table => output_table(&snapshot),
        }
        Ok(())
    }
}

fn output_table(snapshot: &Snapshot) {
    println!("-- Report for {} --", snapshot.date);

    println!();
    println!("{}", "Top donors".info());
    if snapshot.top_donors.is_empty() {
        println!("  {}", "No donors registered".dim());
    }
    for (rank, donor) in snapshot.top_donors.iter().enumerate() {
        println!(
            "  {}. {} {} ({} donation(s))",
            rank + 1,
            donor.id,
            donor.name,
            donor.donations
        );
    }

    println!();
    println!("{}", "Stock".info());
    let narrow = is_narrow();
    let stock: Vec<_> = snapshot
        .stock
        .iter()
        .map(|(group, units)| format!("{group}: {units}"))
        .collect();
    if narrow {
        for entry in &stock {
            println!("  {entry}");
        }
    } else {
        println!("  {}", stock.join("  "));
    }

    for low in &snapshot.low_stock {
        println!(
            "  {}",
            format!(
                "⚠️  {} is low: {} unit(s), below {}",
                low.group, low.units, snapshot.low_stock_threshold
            )
            .alert()
        );
    }

    println!();
    println!("{}", "Requests".info());
    println!(
        "  {}/{} fulfilled",
        snapshot.requests_fulfilled, snapshot.requests_total
    );
}
