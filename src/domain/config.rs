use std::path::Path;

use serde::{Deserialize, Serialize};

/// Configuration for a blood bank.
///
/// This struct holds the operator-tunable settings: when stock counts as low,
/// how many donors the report ranks, and whether donation certificates are
/// written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// A blood group is reported as low when it has fewer usable units than
    /// this.
    low_stock_threshold: usize,

    /// How many donors the report lists, ranked by total donations.
    top_donors: usize,

    /// Whether a certificate file is written for every donation.
    pub certificates: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            low_stock_threshold: default_low_stock_threshold(),
            top_donors: default_top_donors(),
            certificates: true,
        }
    }
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {e}"))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {e}"))
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content =
            toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize config: {e}"))?;
        std::fs::write(path, content).map_err(|e| format!("Failed to write config file: {e}"))
    }

    /// Returns the unit count below which a group is reported as low.
    #[must_use]
    pub const fn low_stock_threshold(&self) -> usize {
        self.low_stock_threshold
    }

    /// Returns how many donors the report ranks.
    #[must_use]
    pub const fn top_donors(&self) -> usize {
        self.top_donors
    }
}

const fn default_low_stock_threshold() -> usize {
    5
}

const fn default_top_donors() -> usize {
    5
}

const fn default_certificates() -> bool {
    true
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_low_stock_threshold")]
        low_stock_threshold: usize,

        #[serde(default = "default_top_donors")]
        top_donors: usize,

        #[serde(default = "default_certificates")]
        certificates: bool,
    },
}

impl From<Versions> for super::Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                low_stock_threshold,
                top_donors,
                certificates,
            } => Self {
                low_stock_threshold,
                top_donors,
                certificates,
            },
        }
    }
}

impl From<super::Config> for Versions {
    fn from(config: super::Config) -> Self {
        Self::V1 {
            low_stock_threshold: config.low_stock_threshold,
            top_donors: config.top_donors,
            certificates: config.certificates,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn load_reads_valid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            b"_version = \"1\"\nlow_stock_threshold = 8\ntop_donors = 3\ncertificates = false\n",
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.low_stock_threshold(), 8);
        assert_eq!(config.top_donors(), 3);
        assert!(!config.certificates);
    }

    #[test]
    fn load_missing_file_returns_error() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("missing.toml");

        let error = Config::load(&missing).unwrap_err();
        assert!(error.starts_with("Failed to read config file:"));
    }

    #[test]
    fn load_invalid_toml_returns_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"_version = \"1\"\ntop_donors = \"five\"\n")
            .unwrap();

        let error = Config::load(file.path()).unwrap_err();
        assert!(error.starts_with("Failed to parse config file:"));
    }

    #[test]
    fn unknown_version_is_rejected() {
        let result: Result<Config, _> = toml::from_str(r#"_version = "9""#);
        assert!(result.is_err());
    }

    #[test]
    fn empty_file_returns_default() {
        let expected = Config::default();
        let actual: Config = toml::from_str(r#"_version = "1""#).unwrap();
        assert_eq!(actual, expected);
    }

    #[test]
    fn saved_config_loads_back() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        let mut config = Config::default();
        config.certificates = false;

        config.save(&path).unwrap();

        assert_eq!(Config::load(&path).unwrap(), config);
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("_version = \"1\""));
    }
}
