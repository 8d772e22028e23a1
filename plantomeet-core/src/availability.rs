//! Availability vocabulary.
//!
//! Clients speak `yes` / `no` / `maybe`. The backing store speaks
//! `available` / `unavailable` / `maybe`. The mapping is total and bijective,
//! and any other store value fails to decode instead of defaulting.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PlanToMeetError;

/// A participant's answer for one slot (domain vocabulary).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    Yes,
    No,
    Maybe,
}

/// The same answer as stored in the `responses` table (wire vocabulary).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DbAvailability {
    Available,
    Unavailable,
    Maybe,
}

impl Availability {
    pub const ALL: [Availability; 3] = [Availability::Yes, Availability::No, Availability::Maybe];

    pub fn as_str(&self) -> &'static str {
        match self {
            Availability::Yes => "yes",
            Availability::No => "no",
            Availability::Maybe => "maybe",
        }
    }

    pub fn to_db(self) -> DbAvailability {
        DbAvailability::from(self)
    }
}

impl DbAvailability {
    pub fn as_str(&self) -> &'static str {
        match self {
            DbAvailability::Available => "available",
            DbAvailability::Unavailable => "unavailable",
            DbAvailability::Maybe => "maybe",
        }
    }
}

impl From<Availability> for DbAvailability {
    fn from(availability: Availability) -> Self {
        match availability {
            Availability::Yes => DbAvailability::Available,
            Availability::No => DbAvailability::Unavailable,
            Availability::Maybe => DbAvailability::Maybe,
        }
    }
}

impl From<DbAvailability> for Availability {
    fn from(db: DbAvailability) -> Self {
        match db {
            DbAvailability::Available => Availability::Yes,
            DbAvailability::Unavailable => Availability::No,
            DbAvailability::Maybe => Availability::Maybe,
        }
    }
}

impl FromStr for Availability {
    type Err = PlanToMeetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "yes" => Ok(Availability::Yes),
            "no" => Ok(Availability::No),
            "maybe" => Ok(Availability::Maybe),
            other => Err(PlanToMeetError::Vocabulary(other.to_string())),
        }
    }
}

impl FromStr for DbAvailability {
    type Err = PlanToMeetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(DbAvailability::Available),
            "unavailable" => Ok(DbAvailability::Unavailable),
            "maybe" => Ok(DbAvailability::Maybe),
            other => Err(PlanToMeetError::Vocabulary(other.to_string())),
        }
    }
}

/// Decode a raw store value straight into the domain vocabulary.
pub fn from_db_value(value: &str) -> Result<Availability, PlanToMeetError> {
    value.parse::<DbAvailability>().map(Availability::from)
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for DbAvailability {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_mapping_is_bijective() {
        for a in Availability::ALL {
            assert_eq!(Availability::from(a.to_db()), a);
        }
        assert_eq!(Availability::Yes.to_db(), DbAvailability::Available);
        assert_eq!(Availability::No.to_db(), DbAvailability::Unavailable);
        assert_eq!(Availability::Maybe.to_db(), DbAvailability::Maybe);
    }

    #[test]
    fn unknown_db_value_fails_closed() {
        let err = from_db_value("busy").unwrap_err();
        assert!(matches!(err, PlanToMeetError::Vocabulary(v) if v == "busy"));

        // Domain words are not wire words
        assert!(from_db_value("yes").is_err());
        assert!(from_db_value("Available").is_err());
    }

    #[test]
    fn serde_uses_lowercase_words() {
        let json = serde_json::to_string(&DbAvailability::Unavailable).unwrap();
        assert_eq!(json, "\"unavailable\"");

        let parsed: Availability = serde_json::from_str("\"maybe\"").unwrap();
        assert_eq!(parsed, Availability::Maybe);
    }

    #[test]
    fn parse_domain_words() {
        assert_eq!("yes".parse::<Availability>().unwrap(), Availability::Yes);
        assert!("available".parse::<Availability>().is_err());
    }
}
