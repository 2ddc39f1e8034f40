//! Video length filters written as `+5m`, `-2h`, `+90`.
//!
//! A leading `+` means "longer than", `-` means "shorter than". The unit is
//! one of `s`, `m`, `h` and defaults to seconds.

use std::{fmt, str::FromStr, sync::LazyLock};

use regex::Regex;
use thiserror::Error;

static LENGTH_EXPR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([+-])(\d+(?:\.\d+)?)([smh])?$").expect("length expression pattern is valid")
});

static TOKEN_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[,\s]+").expect("separator pattern is valid"));

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Bad length filter: {token:?} (expected e.g. +5m, -2h, +90s)")]
pub struct LengthParseError {
    pub token: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
}

impl Comparator {
    pub fn holds(&self, value: f64, threshold: f64) -> bool {
        match self {
            Comparator::Less => value < threshold,
            Comparator::LessOrEqual => value <= threshold,
            Comparator::Greater => value > threshold,
            Comparator::GreaterOrEqual => value >= threshold,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Comparator::Less => "<",
            Comparator::LessOrEqual => "<=",
            Comparator::Greater => ">",
            Comparator::GreaterOrEqual => ">=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LengthExpr {
    pub comparator: Comparator,
    pub seconds: f64,
}

impl LengthExpr {
    pub fn new(comparator: Comparator, seconds: f64) -> Self {
        Self {
            comparator,
            seconds,
        }
    }

    pub fn matches(&self, duration_secs: f64) -> bool {
        self.comparator.holds(duration_secs, self.seconds)
    }
}

impl FromStr for LengthExpr {
    type Err = LengthParseError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let token = token.trim();
        let err = || LengthParseError {
            token: token.to_string(),
        };
        let caps = LENGTH_EXPR.captures(token).ok_or_else(err)?;

        let comparator = match &caps[1] {
            "+" => Comparator::Greater,
            _ => Comparator::Less,
        };
        let number: f64 = caps[2].parse().map_err(|_| err())?;
        let multiplier = match caps.get(3).map(|m| m.as_str()) {
            Some("m") => 60.0,
            Some("h") => 3600.0,
            _ => 1.0,
        };

        Ok(Self::new(comparator, number * multiplier))
    }
}

impl fmt::Display for LengthExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}s", self.comparator.symbol(), self.seconds)
    }
}

/// Split raw arguments on any mix of commas and whitespace.
pub fn tokenize<S: AsRef<str>>(raw: &[S]) -> Vec<String> {
    raw.iter()
        .flat_map(|chunk| {
            TOKEN_SEPARATOR
                .split(chunk.as_ref().trim())
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Parse every token; the first malformed one fails the whole batch.
pub fn parse_length_filters<S: AsRef<str>>(raw: &[S]) -> Result<Vec<LengthExpr>, LengthParseError> {
    tokenize(raw).iter().map(|t| t.parse()).collect()
}
