use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use chrono::NaiveDate;

use crate::domain::Donor;

/// Directory, relative to the data root, certificates are written to.
pub const CERTIFICATE_DIR: &str = "certificates";

/// The path of a donor's certificate under `root`.
///
/// Each donor has a single certificate file, rewritten on every donation.
#[must_use]
pub fn certificate_path(root: &Path, donor: &Donor) -> PathBuf {
    root.join(CERTIFICATE_DIR)
        .join(format!("{}_certificate.txt", donor.id()))
}

/// Writes an appreciation certificate for a donation made on `date`.
///
/// # Errors
///
/// Returns an error if the certificate directory cannot be created or the
/// file cannot be written.
pub fn write_certificate(root: &Path, donor: &Donor, date: NaiveDate) -> io::Result<PathBuf> {
    let path = certificate_path(root, donor);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut file = io::BufWriter::new(fs::File::create(&path)?);
    writeln!(file, "--- Donor Appreciation Certificate ---")?;
    writeln!(file, "Donor ID: {}", donor.id())?;
    writeln!(file, "Name: {}", donor.name())?;
    writeln!(file, "Blood Group: {}", donor.blood_group())?;
    writeln!(file, "Date: {date}")?;
    writeln!(file, "Total donations: {}", donor.total_donations())?;
    writeln!(file, "Thank you for your life-saving donation!")?;
    file.flush()?;

    tracing::debug!("Wrote certificate {}", path.display());
    Ok(path)
}
