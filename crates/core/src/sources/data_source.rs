use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::Error;

/// Environment variable selecting the goal repository.
pub const GOALS_SOURCE_VAR: &str = "AMB_GOALS_SOURCE";

/// Environment variable selecting the user repository.
pub const USERS_SOURCE_VAR: &str = "AMB_USERS_SOURCE";

pub const DEFAULT_DATA_SOURCE: DataSource = DataSource::Sqlite;

/// Known backing stores. Each one is registered under `key()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Sqlite,
    Vendor,
    Mock,
}

impl DataSource {
    pub const ALL: [DataSource; 3] = [DataSource::Sqlite, DataSource::Vendor, DataSource::Mock];

    pub fn key(&self) -> &'static str {
        match self {
            DataSource::Sqlite => "sqlite",
            DataSource::Vendor => "vendor",
            DataSource::Mock => "mock",
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for DataSource {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        DataSource::ALL
            .into_iter()
            .find(|source| source.key().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| Error::InvalidConfigValue(format!("Unknown data source '{}'", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_round_trip_through_from_str() {
        for source in DataSource::ALL {
            assert_eq!(source.key().parse::<DataSource>().unwrap(), source);
        }
        assert_eq!(" MOCK ".parse::<DataSource>().unwrap(), DataSource::Mock);
        assert!("postgres".parse::<DataSource>().is_err());
    }
}
