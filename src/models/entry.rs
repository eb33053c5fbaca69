//! Ledger entry model
//!
//! An entry is one income or expense record. Amounts are always stored as
//! positive values; the sign applied to the balance comes from the kind.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ids::EntryId;
use super::money::Money;
use crate::error::LedgerError;

/// Date format accepted for user-entered dates
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Largest amount a single entry or the starting balance may hold
///
/// Keeps every ledger total far inside the i64 cent range.
pub const MAX_AMOUNT: Money = Money::from_cents(1_000_000_000_000);

/// Whether an entry adds to or subtracts from the balance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Income,
    Expense,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Income => f.pad("Income"),
            Self::Expense => f.pad("Expense"),
        }
    }
}

impl FromStr for EntryKind {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" | "in" => Ok(Self::Income),
            "expense" | "out" => Ok(Self::Expense),
            other => Err(LedgerError::Validation(format!(
                "Unknown entry kind '{}'. Use 'income' or 'expense'",
                other
            ))),
        }
    }
}

/// A single income or expense record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Unique identifier, assigned at creation and never changed
    pub id: EntryId,

    pub date: NaiveDate,

    pub description: String,

    /// Always positive
    pub amount: Money,

    pub kind: EntryKind,
}

impl Entry {
    /// Create a new entry with a fresh id
    pub fn new(
        date: NaiveDate,
        description: impl Into<String>,
        amount: Money,
        kind: EntryKind,
    ) -> Self {
        Self {
            id: EntryId::new(),
            date,
            description: description.into(),
            amount,
            kind,
        }
    }

    pub fn is_income(&self) -> bool {
        self.kind == EntryKind::Income
    }

    pub fn is_expense(&self) -> bool {
        self.kind == EntryKind::Expense
    }

    /// The amount with the sign implied by the kind
    pub fn signed_amount(&self) -> Money {
        match self.kind {
            EntryKind::Income => self.amount,
            EntryKind::Expense => -self.amount,
        }
    }

    /// Validate the entry
    pub fn validate(&self) -> Result<(), EntryValidationError> {
        if self.description.trim().is_empty() {
            return Err(EntryValidationError::EmptyDescription);
        }

        if !self.amount.is_positive() {
            return Err(EntryValidationError::NonPositiveAmount(self.amount));
        }

        if self.amount > MAX_AMOUNT {
            return Err(EntryValidationError::AmountTooLarge(self.amount));
        }

        Ok(())
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.date.format(DATE_FORMAT),
            self.description,
            self.signed_amount()
        )
    }
}

/// Validation errors for entries
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryValidationError {
    EmptyDescription,
    NonPositiveAmount(Money),
    AmountTooLarge(Money),
}

impl fmt::Display for EntryValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyDescription => write!(f, "Description cannot be empty"),
            Self::NonPositiveAmount(amount) => {
                write!(f, "Amount must be greater than zero (got {})", amount)
            }
            Self::AmountTooLarge(amount) => {
                write!(f, "Amount {} is larger than the limit of {}", amount, MAX_AMOUNT)
            }
        }
    }
}

impl std::error::Error for EntryValidationError {}

impl From<EntryValidationError> for LedgerError {
    fn from(err: EntryValidationError) -> Self {
        LedgerError::Validation(err.to_string())
    }
}

/// Input for creating a new entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEntry {
    pub description: String,
    pub amount: Money,
    pub date: NaiveDate,
    pub kind: EntryKind,
}

impl NewEntry {
    /// Build an input from raw user text
    ///
    /// Fails with a validation error when the amount is not a positive
    /// number or the date is not a real `YYYY-MM-DD` calendar date.
    pub fn parse(
        description: &str,
        amount: &str,
        date: &str,
        kind: EntryKind,
    ) -> Result<Self, LedgerError> {
        let input = Self {
            description: description.trim().to_string(),
            amount: parse_amount(amount)?,
            date: parse_date(date)?,
            kind,
        };
        input.validate()?;
        Ok(input)
    }

    pub fn validate(&self) -> Result<(), EntryValidationError> {
        self.clone().into_entry().validate()
    }

    /// Turn the input into an entry with a fresh id
    pub fn into_entry(self) -> Entry {
        Entry::new(self.date, self.description.trim(), self.amount, self.kind)
    }
}

/// Field changes for an existing entry; `None` leaves a field untouched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryUpdate {
    pub description: Option<String>,
    pub amount: Option<Money>,
    pub date: Option<NaiveDate>,
    pub kind: Option<EntryKind>,
}

impl EntryUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn amount(mut self, amount: Money) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn kind(mut self, kind: EntryKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.description.is_none()
            && self.amount.is_none()
            && self.date.is_none()
            && self.kind.is_none()
    }

    /// Return `entry` with these changes applied; the id is never touched
    pub fn apply_to(&self, entry: &Entry) -> Entry {
        let mut updated = entry.clone();
        if let Some(description) = &self.description {
            updated.description = description.trim().to_string();
        }
        if let Some(amount) = self.amount {
            updated.amount = amount;
        }
        if let Some(date) = self.date {
            updated.date = date;
        }
        if let Some(kind) = self.kind {
            updated.kind = kind;
        }
        updated
    }
}

/// Parse a user-entered starting balance, which may be negative
pub fn parse_balance(text: &str) -> Result<Money, LedgerError> {
    let amount = Money::parse(text).map_err(|e| {
        LedgerError::Validation(format!(
            "Invalid amount '{}'. Use a format like '1500.00'. {}",
            text.trim(),
            e
        ))
    })?;

    if amount.abs() > MAX_AMOUNT {
        return Err(EntryValidationError::AmountTooLarge(amount).into());
    }

    Ok(amount)
}

/// Parse a user-entered positive amount
pub fn parse_amount(text: &str) -> Result<Money, LedgerError> {
    let amount = Money::parse(text).map_err(|e| {
        LedgerError::Validation(format!(
            "Invalid amount '{}'. Use a format like '42.50'. {}",
            text.trim(),
            e
        ))
    })?;

    if !amount.is_positive() {
        return Err(EntryValidationError::NonPositiveAmount(amount).into());
    }

    if amount > MAX_AMOUNT {
        return Err(EntryValidationError::AmountTooLarge(amount).into());
    }

    Ok(amount)
}

/// Parse a user-entered calendar date (`YYYY-MM-DD`)
pub fn parse_date(text: &str) -> Result<NaiveDate, LedgerError> {
    NaiveDate::parse_from_str(text.trim(), DATE_FORMAT).map_err(|_| {
        LedgerError::Validation(format!(
            "Invalid date '{}'. Use YYYY-MM-DD",
            text.trim()
        ))
    })
}
