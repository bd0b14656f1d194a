//! Result filters: `key=v1,v2` keeps rows whose field is one of the
//! values, `key!=v1,v2` keeps rows whose field is none of them.
//!
//! Every expression is validated up front so a typo fails the run before
//! any network call. Filters combine with AND; values within one filter
//! combine with OR.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::adapters::ProbeResult;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("invalid filter {0:?} (expected key=value or key!=value)")]
    InvalidExpression(String),
    #[error("unsupported filter key: {0}")]
    UnsupportedKey(String),
    #[error("invalid filter {0:?} (missing value)")]
    MissingValue(String),
    #[error("invalid boolean {0:?}")]
    InvalidBoolean(String),
}

/// The result field a filter inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKey {
    Available,
    Status,
    Model,
    Platform,
}

impl FilterKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterKey::Available => "available",
            FilterKey::Status => "status",
            FilterKey::Model => "model",
            FilterKey::Platform => "platform",
        }
    }
}

impl FromStr for FilterKey {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "available" => Ok(FilterKey::Available),
            "status" => Ok(FilterKey::Status),
            "model" => Ok(FilterKey::Model),
            "platform" => Ok(FilterKey::Platform),
            other => Err(FilterError::UnsupportedKey(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    /// Field equals one of the values.
    Eq,
    /// Field equals none of the values.
    NotEq,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub key: FilterKey,
    pub op: FilterOp,
    /// For `available`, normalized to lowercase "true"/"false".
    pub values: Vec<String>,
}

impl Filter {
    pub fn matches(&self, result: &ProbeResult) -> bool {
        let actual: &str = match self.key {
            FilterKey::Available => {
                if result.available { "true" } else { "false" }
            }
            FilterKey::Status => result.status.as_str(),
            FilterKey::Model => &result.model,
            FilterKey::Platform => &result.platform,
        };
        let hit = self.values.iter().any(|v| v == actual);
        match self.op {
            FilterOp::Eq => hit,
            FilterOp::NotEq => !hit,
        }
    }
}

impl FromStr for Filter {
    type Err = FilterError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        // `!=` first: "a!=b" also contains "=".
        let (key, value, op) = if let Some((k, v)) = raw.split_once("!=") {
            (k, v, FilterOp::NotEq)
        } else if let Some((k, v)) = raw.split_once('=') {
            (k, v, FilterOp::Eq)
        } else {
            return Err(FilterError::InvalidExpression(raw.to_string()));
        };

        let key = key.trim();
        if key.is_empty() {
            return Err(FilterError::InvalidExpression(raw.to_string()));
        }
        let key: FilterKey = key.parse()?;

        let mut values = split_values(value);
        if values.is_empty() {
            return Err(FilterError::MissingValue(raw.to_string()));
        }
        if key == FilterKey::Available {
            values = values
                .iter()
                .map(|v| parse_bool(v).map(|b| b.to_string()))
                .collect::<Result<Vec<_>, FilterError>>()?;
        }

        Ok(Filter { key, op, values })
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self.op {
            FilterOp::Eq => "=",
            FilterOp::NotEq => "!=",
        };
        write!(f, "{}{}{}", self.key.as_str(), op, self.values.join(","))
    }
}

/// Parse every expression; blank entries are skipped.
pub fn parse_filters<S: AsRef<str>>(inputs: &[S]) -> Result<Vec<Filter>, FilterError> {
    inputs
        .iter()
        .map(AsRef::<str>::as_ref)
        .filter(|raw| !raw.trim().is_empty())
        .map(str::parse)
        .collect()
}

/// Keep the results that satisfy every filter, preserving order.
pub fn apply_filters(results: Vec<ProbeResult>, filters: &[Filter]) -> Vec<ProbeResult> {
    if filters.is_empty() {
        return results;
    }
    results
        .into_iter()
        .filter(|r| filters.iter().all(|f| f.matches(r)))
        .collect()
}

fn split_values(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_bool(raw: &str) -> Result<bool, FilterError> {
    match raw.to_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(FilterError::InvalidBoolean(raw.to_string())),
    }
}
