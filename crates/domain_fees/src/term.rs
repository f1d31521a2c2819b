//! School terms
//!
//! The academic year is split into three terms. Fees accrue per term and the
//! ledger is folded in term order.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// One of the three terms of an academic year
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Term {
    First,
    Second,
    Third,
}

impl Term {
    /// All terms in fold order
    pub const ALL: [Term; 3] = [Term::First, Term::Second, Term::Third];

    /// Returns the term number (1, 2 or 3)
    pub fn number(&self) -> u8 {
        match self {
            Term::First => 1,
            Term::Second => 2,
            Term::Third => 3,
        }
    }

    /// Returns the term for a number, if it is 1..=3
    pub fn from_number(number: i64) -> Option<Self> {
        match number {
            1 => Some(Term::First),
            2 => Some(Term::Second),
            3 => Some(Term::Third),
            _ => None,
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Term {}", self.number())
    }
}

impl FromStr for Term {
    type Err = ValidationError;

    /// Accepts "1", "2", "3" as stored by the record store, with optional
    /// surrounding whitespace and an optional "Term " prefix.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("Term")
            .or_else(|| trimmed.strip_prefix("term"))
            .unwrap_or(trimmed)
            .trim();

        digits
            .parse::<i64>()
            .ok()
            .and_then(Term::from_number)
            .ok_or_else(|| ValidationError::InvalidTerm(s.to_string()))
    }
}

impl TryFrom<u8> for Term {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Term::from_number(value as i64).ok_or_else(|| ValidationError::InvalidTerm(value.to_string()))
    }
}

impl From<Term> for u8 {
    fn from(term: Term) -> u8 {
        term.number()
    }
}
