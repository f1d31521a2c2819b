//! Money types with precise decimal arithmetic
//!
//! School fees, payments and balances are all carried as [`Money`], which
//! wraps a `rust_decimal::Decimal` so that sums and differences never pick
//! up floating-point drift. Amounts keep 4 decimal places internally and are
//! only rounded to the currency's minor unit when displayed.
//!
//! Arithmetic is checked: combining two currencies is an error, never a panic.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Neg;
use std::str::FromStr;
use thiserror::Error;

/// Internal precision of every amount
const AMOUNT_SCALE: u32 = 4;

/// East African school currencies, plus USD for international schools
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    KES,
    UGX,
    TZS,
    RWF,
    USD,
}

impl Currency {
    const ALL: [Currency; 5] = [Currency::KES, Currency::UGX, Currency::TZS, Currency::RWF, Currency::USD];

    /// Minor-unit digits shown on statements
    pub fn decimal_places(&self) -> u32 {
        match self {
            Currency::UGX | Currency::RWF => 0,
            Currency::KES | Currency::TZS | Currency::USD => 2,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::KES => "KSh",
            Currency::UGX => "USh",
            Currency::TZS => "TSh",
            Currency::RWF => "FRw",
            Currency::USD => "$",
        }
    }

    /// ISO 4217 code
    pub fn code(&self) -> &'static str {
        match self {
            Currency::KES => "KES",
            Currency::UGX => "UGX",
            Currency::TZS => "TZS",
            Currency::RWF => "RWF",
            Currency::USD => "USD",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        Currency::ALL
            .into_iter()
            .find(|c| c.code().eq_ignore_ascii_case(code))
            .ok_or_else(|| MoneyError::UnknownCurrency(code.to_string()))
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Currency mismatch: {left} vs {right}")]
    CurrencyMismatch { left: Currency, right: Currency },

    #[error("Unknown currency: {0}")]
    UnknownCurrency(String),

    #[error("Ratio against a zero amount")]
    DivisionByZero,
}

/// A signed amount in one currency
///
/// The sign is meaningful: ledger balances are positive when the student
/// owes the school and negative when the school holds a credit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    amount: Decimal,
    currency: Currency,
}

impl Money {
    pub fn new(amount: Decimal, currency: Currency) -> Self {
        Self {
            amount: amount.round_dp(AMOUNT_SCALE),
            currency,
        }
    }

    /// From an integer count of the currency's minor unit
    pub fn from_minor(minor_units: i64, currency: Currency) -> Self {
        Self::new(Decimal::new(minor_units, currency.decimal_places()), currency)
    }

    pub fn zero(currency: Currency) -> Self {
        Self::new(Decimal::ZERO, currency)
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        self.amount > Decimal::ZERO
    }

    pub fn is_negative(&self) -> bool {
        self.amount < Decimal::ZERO
    }

    pub fn abs(&self) -> Self {
        Self::new(self.amount.abs(), self.currency)
    }

    /// Rounded half-to-even to the currency's minor unit
    pub fn round_to_currency(&self) -> Self {
        Self {
            amount: self.amount.round_dp(self.currency.decimal_places()),
            currency: self.currency,
        }
    }

    pub fn checked_add(&self, other: &Money) -> Result<Money, MoneyError> {
        self.same_currency(other)?;
        Ok(Self::new(self.amount + other.amount, self.currency))
    }

    pub fn checked_sub(&self, other: &Money) -> Result<Money, MoneyError> {
        self.same_currency(other)?;
        Ok(Self::new(self.amount - other.amount, self.currency))
    }

    /// Sums `amounts`; an empty sequence is zero in `currency`
    pub fn checked_sum<'a, I>(amounts: I, currency: Currency) -> Result<Money, MoneyError>
    where
        I: IntoIterator<Item = &'a Money>,
    {
        amounts
            .into_iter()
            .try_fold(Money::zero(currency), |acc, m| acc.checked_add(m))
    }

    /// `self / whole` as a plain ratio
    pub fn ratio_of(&self, whole: &Money) -> Result<Decimal, MoneyError> {
        self.same_currency(whole)?;
        if whole.is_zero() {
            return Err(MoneyError::DivisionByZero);
        }
        Ok(self.amount / whole.amount)
    }

    fn same_currency(&self, other: &Money) -> Result<(), MoneyError> {
        if self.currency == other.currency {
            Ok(())
        } else {
            Err(MoneyError::CurrencyMismatch {
                left: self.currency,
                right: other.currency,
            })
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self.round_to_currency();
        write!(
            f,
            "{} {:.dp$}",
            self.currency.symbol(),
            rounded.amount,
            dp = self.currency.decimal_places() as usize
        )
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.amount, self.currency)
    }
}

/// A fraction, displayed as a percentage (0.25 is 25%)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rate(Decimal);

impl Rate {
    pub fn new(fraction: Decimal) -> Self {
        Self(fraction)
    }

    pub fn from_percentage(percentage: Decimal) -> Self {
        Self(percentage / dec!(100))
    }

    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    pub fn as_percentage(&self) -> Decimal {
        self.0 * dec!(100)
    }

    pub fn capped_at(self, max: Rate) -> Self {
        self.min(max)
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}%", self.as_percentage())
    }
}
