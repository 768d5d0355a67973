pub mod directory;
/// Donation certificates.
pub mod certificate;
mod records;

pub use directory::{
    CAMPS_FILE, CONFIG_FILE, DONORS_FILE, Directory, INVENTORY_FILE, Loaded, REQUESTS_FILE,
    SaveError, Unloaded,
};
