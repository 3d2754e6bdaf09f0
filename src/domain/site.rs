// Site and time range domain model
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteInfo {
    pub id: String,
    pub name: String,
    pub currency: Option<String>,
    pub timezone: Option<String>,
}

impl SiteInfo {
    pub fn new(id: String) -> Self {
        let name = Self::format_name(&id);
        Self {
            id,
            name,
            currency: None,
            timezone: None,
        }
    }

    fn format_name(id: &str) -> String {
        // Convert "north_plant" to "North Plant"
        id.split('_')
            .filter(|word| !word.is_empty())
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            })
            .collect::<Vec<String>>()
            .join(" ")
    }
}

/// Site details as published by the upstream `/api/sites` route
#[derive(Debug, Clone, Deserialize)]
pub struct SiteDetails {
    pub name: String,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
}

impl SiteDetails {
    pub fn into_site(self, id: String) -> SiteInfo {
        SiteInfo {
            id,
            name: self.name,
            currency: self.currency,
            timezone: self.timezone,
        }
    }
}

/// Window of history shown on the production trend chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeRange {
    LastHour,
    #[default]
    LastDay,
    LastWeek,
}

impl TimeRange {
    pub fn as_str(self) -> &'static str {
        match self {
            TimeRange::LastHour => "1h",
            TimeRange::LastDay => "24h",
            TimeRange::LastWeek => "7d",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown time range '{0}', expected one of 1h, 24h, 7d")]
pub struct ParseTimeRangeError(pub String);

impl FromStr for TimeRange {
    type Err = ParseTimeRangeError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token {
            "1h" => Ok(TimeRange::LastHour),
            "24h" => Ok(TimeRange::LastDay),
            "7d" => Ok(TimeRange::LastWeek),
            other => Err(ParseTimeRangeError(other.to_string())),
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for TimeRange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
