use std::{fmt, num::NonZeroUsize, str::FromStr};

use serde::{Deserialize, Serialize};

/// The kind of record an identifier refers to.
///
/// The kind is encoded as the single-letter prefix of a [`RecordId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RecordKind {
    /// A registered blood donor (`D`).
    Donor,
    /// A blood request (`R`).
    Request,
    /// A donation camp (`C`).
    Camp,
}

impl RecordKind {
    /// The prefix letter used in the textual form of identifiers of this kind.
    #[must_use]
    pub const fn prefix(self) -> char {
        match self {
            Self::Donor => 'D',
            Self::Request => 'R',
            Self::Camp => 'C',
        }
    }

    const fn from_prefix(c: char) -> Option<Self> {
        match c {
            'D' => Some(Self::Donor),
            'R' => Some(Self::Request),
            'C' => Some(Self::Camp),
            _ => None,
        }
    }
}

/// A record identifier, such as `D12` or `R3`.
///
/// Format: `{PREFIX}{NUMBER}`, where `PREFIX` is the [`RecordKind`] letter and
/// `NUMBER` is a positive non-zero integer without padding.
///
/// Identifiers order by kind, then numerically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RecordId {
    kind: RecordKind,
    number: NonZeroUsize,
}

impl RecordId {
    /// Create an identifier from pre-validated parts.
    #[must_use]
    pub const fn new(kind: RecordKind, number: NonZeroUsize) -> Self {
        Self { kind, number }
    }

    /// Returns the kind of record this identifier refers to.
    #[must_use]
    pub const fn kind(&self) -> RecordKind {
        self.kind
    }

    /// Returns the numeric part of the identifier.
    #[must_use]
    pub const fn number(&self) -> NonZeroUsize {
        self.number
    }

    /// The identifier that follows the largest existing one of `kind`.
    ///
    /// Identifiers of other kinds are ignored. Gaps left by missing numbers
    /// are never reused.
    ///
    /// # Examples
    ///
    /// ```
    /// use lifelink::{RecordId, RecordKind};
    ///
    /// let existing: Vec<RecordId> = ["D1", "D7", "R9"]
    ///     .iter()
    ///     .map(|s| s.parse().unwrap())
    ///     .collect();
    ///
    /// let next = RecordId::next(RecordKind::Donor, existing.iter());
    /// assert_eq!(next.to_string(), "D8");
    /// ```
    #[must_use]
    pub fn next<'a>(kind: RecordKind, existing: impl IntoIterator<Item = &'a Self>) -> Self {
        let max = existing
            .into_iter()
            .filter(|id| id.kind == kind)
            .map(|id| id.number.get())
            .max()
            .unwrap_or(0);

        Self::new(kind, NonZeroUsize::MIN.saturating_add(max))
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.kind.prefix(), self.number)
    }
}

/// Errors that can occur when parsing a record identifier.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    /// The prefix is not one of the known record kinds.
    #[error("Invalid identifier '{0}': expected a D, R or C prefix")]
    Prefix(String),

    /// The numeric part is missing, non-numeric or zero.
    #[error("Invalid identifier '{0}': expected a non-zero number after the prefix")]
    Number(String),
}

impl FromStr for RecordId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let kind = chars
            .next()
            .and_then(RecordKind::from_prefix)
            .ok_or_else(|| Error::Prefix(s.to_string()))?;

        let digits = chars.as_str();
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(Error::Number(s.to_string()));
        }

        let number = digits
            .parse::<usize>()
            .ok()
            .and_then(NonZeroUsize::new)
            .ok_or_else(|| Error::Number(s.to_string()))?;

        Ok(Self::new(kind, number))
    }
}

impl TryFrom<&str> for RecordId {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::from_str(value)
    }
}

impl TryFrom<String> for RecordId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_str(&value)
    }
}

impl From<RecordId> for String {
    fn from(id: RecordId) -> Self {
        id.to_string()
    }
}
