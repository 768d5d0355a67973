//! A filesystem backed blood bank
//!
//! The [`Directory`] keeps a [`BloodBank`] in a data directory as one CSV file
//! per collection, next to an optional `config.toml`. It is a wrapper around
//! the filesystem agnostic [`BloodBank`].

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use chrono::NaiveDate;
use serde::{Serialize, de::DeserializeOwned};

use crate::{
    domain::{
        BloodBank, BloodRequest, BloodUnit, Config, DonationCamp, Donor, Inventory, RecordId,
        Registry,
    },
    storage::{
        certificate,
        records::{CampRow, DonorRow, RequestRow, UnitRow},
    },
};

/// Donor records.
pub const DONORS_FILE: &str = "donors.csv";
/// The unit ledger.
pub const INVENTORY_FILE: &str = "inventory.csv";
/// Blood requests.
pub const REQUESTS_FILE: &str = "requests.csv";
/// Donation camps.
pub const CAMPS_FILE: &str = "camps.csv";
/// Bank settings.
pub const CONFIG_FILE: &str = "config.toml";

/// The loaded state of a [`Directory`].
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded {
    bank: BloodBank,
    config: Config,
}

/// The state of a [`Directory`] that has not been read yet.
#[derive(Debug, PartialEq, Eq)]
pub struct Unloaded;

/// A filesystem backed blood bank.
pub struct Directory<S> {
    /// The root of the directory the bank is stored in.
    root: PathBuf,
    state: S,
}

impl<S> Directory<S> {
    /// The data directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Directory<Unloaded> {
    /// Opens a directory at the given path.
    #[must_use]
    pub const fn new(root: PathBuf) -> Self {
        Self {
            root,
            state: Unloaded,
        }
    }

    /// Loads every collection from disk.
    ///
    /// Loading never fails. A missing or unreadable file gives an empty
    /// collection, and rows that cannot be parsed are skipped with a warning.
    #[must_use]
    pub fn load_all(self) -> Directory<Loaded> {
        let config = load_config(&self.root);

        let donors: Registry<Donor> =
            Registry::from_records(load_records::<DonorRow, _>(&self.root, DONORS_FILE));
        let requests: Registry<BloodRequest> =
            Registry::from_records(load_records::<RequestRow, _>(&self.root, REQUESTS_FILE));
        let camps: Registry<DonationCamp> =
            Registry::from_records(load_records::<CampRow, _>(&self.root, CAMPS_FILE));
        let inventory = Inventory::from_units(load_records::<UnitRow, BloodUnit>(
            &self.root,
            INVENTORY_FILE,
        ));

        tracing::debug!(
            "Loaded {} donors, {} requests, {} camps and {} units from {}",
            donors.len(),
            requests.len(),
            camps.len(),
            inventory.len(),
            self.root.display()
        );

        Directory {
            root: self.root,
            state: Loaded {
                bank: BloodBank::from_parts(donors, requests, camps, inventory),
                config,
            },
        }
    }

    /// Creates the data directory with a default configuration and empty
    /// collections, then loads it.
    ///
    /// Existing files are left untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or any of its files cannot be
    /// written.
    pub fn init(self) -> Result<Directory<Loaded>, SaveError> {
        fs::create_dir_all(&self.root).map_err(|source| SaveError::Io {
            path: self.root.clone(),
            source,
        })?;

        let config_path = self.root.join(CONFIG_FILE);
        if !config_path.exists() {
            Config::default().save(&config_path).map_err(SaveError::Config)?;
        }

        let directory = self.load_all();
        for file in [DONORS_FILE, INVENTORY_FILE, REQUESTS_FILE, CAMPS_FILE] {
            if !directory.root.join(file).exists() {
                directory.save()?;
                break;
            }
        }
        Ok(directory)
    }
}

/// An error writing the bank to disk.
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    /// A file or directory could not be written.
    #[error("Failed to write {}: {source}", .path.display())]
    Io {
        /// The file or directory.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },

    /// A collection could not be encoded as CSV.
    #[error("Failed to write {}: {source}", .path.display())]
    Csv {
        /// The CSV file.
        path: PathBuf,
        /// The underlying error.
        source: csv::Error,
    },

    /// The configuration could not be written.
    #[error("{0}")]
    Config(String),
}

fn load_config(root: &Path) -> Config {
    let path = root.join(CONFIG_FILE);
    Config::load(&path).unwrap_or_else(|e| {
        tracing::debug!("Failed to load config: {e}");
        Config::default()
    })
}

/// Reads every row of a CSV file, skipping rows that fail to parse or
/// validate.
fn load_records<R, T>(root: &Path, file: &str) -> Vec<T>
where
    R: DeserializeOwned,
    T: TryFrom<R>,
    T::Error: std::fmt::Display,
{
    let path = root.join(file);
    if !path.exists() {
        tracing::debug!("{} not found; starting empty", path.display());
        return Vec::new();
    }

    let mut reader = match csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(&path)
    {
        Ok(reader) => reader,
        Err(e) => {
            tracing::warn!("Failed to read {}: {e}", path.display());
            return Vec::new();
        }
    };

    let mut records = Vec::new();
    for (index, row) in reader.deserialize::<R>().enumerate() {
        // Line 1 is the header
        let line = index + 2;
        match row {
            Ok(row) => match T::try_from(row) {
                Ok(record) => records.push(record),
                Err(e) => tracing::warn!("Skipping {file} line {line}: {e}"),
            },
            Err(e) => tracing::warn!("Skipping {file} line {line}: {e}"),
        }
    }
    records
}

fn save_records<'a, T, R>(
    root: &Path,
    file: &str,
    records: impl IntoIterator<Item = &'a T>,
) -> Result<(), SaveError>
where
    T: 'a,
    R: Serialize + From<&'a T>,
{
    let path = root.join(file);
    let csv_error = |source: csv::Error| SaveError::Csv {
        path: path.clone(),
        source,
    };

    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_path(&path)
        .map_err(csv_error)?;
    for record in records {
        writer.serialize(R::from(record)).map_err(csv_error)?;
    }
    writer.flush().map_err(|source| SaveError::Io {
        path: path.clone(),
        source,
    })
}

impl Directory<Loaded> {
    /// The bank as loaded, plus any changes made since.
    #[must_use]
    pub const fn bank(&self) -> &BloodBank {
        &self.state.bank
    }

    /// Mutable access to the bank. Changes are only persisted by
    /// [`Directory::save`].
    pub const fn bank_mut(&mut self) -> &mut BloodBank {
        &mut self.state.bank
    }

    /// The bank's configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.state.config
    }

    /// Writes every collection back to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory or any collection file cannot be
    /// written.
    pub fn save(&self) -> Result<(), SaveError> {
        fs::create_dir_all(&self.root).map_err(|source| SaveError::Io {
            path: self.root.clone(),
            source,
        })?;

        let bank = &self.state.bank;
        save_records::<_, DonorRow>(&self.root, DONORS_FILE, bank.donors().iter())?;
        save_records::<_, UnitRow>(&self.root, INVENTORY_FILE, bank.inventory().units())?;
        save_records::<_, RequestRow>(&self.root, REQUESTS_FILE, bank.requests().iter())?;
        save_records::<_, CampRow>(&self.root, CAMPS_FILE, bank.camps().iter())?;

        tracing::debug!("Saved bank to {}", self.root.display());
        Ok(())
    }

    /// Writes a donation certificate for `donor`, if certificates are enabled.
    ///
    /// A failure is logged and otherwise ignored; the donation stands either
    /// way. Returns the path written, if any.
    #[must_use]
    pub fn issue_certificate(&self, donor: RecordId, date: NaiveDate) -> Option<PathBuf> {
        if !self.state.config.certificates {
            return None;
        }

        let donor = self.state.bank.donors().get(donor)?;
        match certificate::write_certificate(&self.root, donor, date) {
            Ok(path) => Some(path),
            Err(e) => {
                tracing::warn!("Failed to write certificate for {}: {e}", donor.id());
                None
            }
        }
    }
}
