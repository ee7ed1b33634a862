use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::category::UNCATEGORIZED;
use super::money::Money;

/// Whether a statement row is money going out (Debit) or coming in (Credit).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Flow {
    Debit,
    Credit,
}

impl FromStr for Flow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "debit" => Ok(Flow::Debit),
            "credit" => Ok(Flow::Credit),
            other => Err(format!("Unknown debit/credit value: '{other}'")),
        }
    }
}

impl fmt::Display for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Flow::Debit => write!(f, "Debit"),
            Flow::Credit => write!(f, "Credit"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub date: NaiveDate,
    pub details: String,
    pub amount: Money,
    pub flow: Flow,
    pub category: String,
}

impl Transaction {
    pub fn new(date: NaiveDate, details: String, amount: Money, flow: Flow) -> Self {
        Transaction {
            date,
            details,
            amount,
            flow,
            category: UNCATEGORIZED.to_string(),
        }
    }

    pub fn is_uncategorized(&self) -> bool {
        self.category == UNCATEGORIZED
    }
}

/// Filters to one side of the statement, keeping row order.
pub fn with_flow(transactions: &[Transaction], flow: Flow) -> impl Iterator<Item = &Transaction> {
    transactions.iter().filter(move |tx| tx.flow == flow)
}
