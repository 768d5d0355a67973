use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// One of the eight ABO/Rh blood groups.
///
/// The textual form is the conventional one (`A+`, `AB-`, `O-`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum BloodGroup {
    /// A, Rh positive.
    APos,
    /// A, Rh negative.
    ANeg,
    /// B, Rh positive.
    BPos,
    /// B, Rh negative.
    BNeg,
    /// AB, Rh positive. The universal recipient.
    AbPos,
    /// AB, Rh negative.
    AbNeg,
    /// O, Rh positive.
    OPos,
    /// O, Rh negative. The universal donor.
    ONeg,
}

impl BloodGroup {
    /// Every blood group, in the conventional display order.
    pub const ALL: [Self; 8] = [
        Self::APos,
        Self::ANeg,
        Self::BPos,
        Self::BNeg,
        Self::AbPos,
        Self::AbNeg,
        Self::OPos,
        Self::ONeg,
    ];

    /// Returns the conventional string form, e.g. `"AB-"`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::APos => "A+",
            Self::ANeg => "A-",
            Self::BPos => "B+",
            Self::BNeg => "B-",
            Self::AbPos => "AB+",
            Self::AbNeg => "AB-",
            Self::OPos => "O+",
            Self::ONeg => "O-",
        }
    }
}

impl fmt::Display for BloodGroup {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not one of the eight blood groups.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Invalid blood group '{0}': expected one of A+, A-, B+, B-, AB+, AB-, O+, O-")]
pub struct InvalidBloodGroup(String);

impl FromStr for BloodGroup {
    type Err = InvalidBloodGroup;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Typographic minus signs show up when groups are pasted from documents
        let normalized = s.trim().to_ascii_uppercase().replace('−', "-");

        Self::ALL
            .into_iter()
            .find(|group| group.as_str() == normalized)
            .ok_or_else(|| InvalidBloodGroup(s.to_string()))
    }
}

impl TryFrom<String> for BloodGroup {
    type Error = InvalidBloodGroup;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl TryFrom<&str> for BloodGroup {
    type Error = InvalidBloodGroup;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BloodGroup> for String {
    fn from(group: BloodGroup) -> Self {
        group.as_str().to_string()
    }
}
