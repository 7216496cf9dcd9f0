use std::cmp::Ordering;
use std::fmt::Display;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

use crate::error::FieldError;

/// The category and period sentinel that stands for "every category" or "every period".
pub const ALL: &str = "all";

/// One measurement emitted by the analytics source for one topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub ranking: i64,
    pub percentile: i64,
    pub normalized_value: i64,
    #[serde(rename = "type")]
    pub kind: MetricType,
    pub category: String,
    pub period: Period,
    pub absolute_value: f64,
}

impl RawRecord {
    /// The record covers every category, not a named subcategory.
    pub fn is_global(&self) -> bool {
        self.category == ALL
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricType {
    Conflict,
    Polemic,
}

impl MetricType {
    pub const ALL: [MetricType; 2] = [MetricType::Conflict, MetricType::Polemic];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricType::Conflict => "conflict",
            MetricType::Polemic => "polemic",
        }
    }
}

impl Display for MetricType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricType {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "conflict" => Ok(MetricType::Conflict),
            "polemic" => Ok(MetricType::Polemic),
            _ => Err(FieldError::UnknownType),
        }
    }
}

/// The time span a record measures: a single year or the whole history of the topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Period {
    All,
    Year(i32),
}

impl Period {
    pub fn year(&self) -> Option<i32> {
        match *self {
            Period::All => None,
            Period::Year(year) => Some(year),
        }
    }
}

impl PartialOrd for Period {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Years compare numerically; `All` sorts after every year.
impl Ord for Period {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Period::Year(a), Period::Year(b)) => a.cmp(b),
            (Period::Year(_), Period::All) => Ordering::Less,
            (Period::All, Period::Year(_)) => Ordering::Greater,
            (Period::All, Period::All) => Ordering::Equal,
        }
    }
}

impl Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Period::All => f.write_str(ALL),
            Period::Year(year) => Display::fmt(year, f),
        }
    }
}

impl FromStr for Period {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == ALL {
            return Ok(Period::All);
        }

        s.parse::<i32>()
            .map(Period::Year)
            .map_err(|_| FieldError::Period)
    }
}

impl Serialize for Period {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Period {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}
