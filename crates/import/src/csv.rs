use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::io::Read;
use std::str::FromStr;
use thiserror::Error;

use tally_core::{CategoryMap, Flow, Money, Transaction};

use crate::categorize::categorize;

/// Statement exports carry dates like `05 Jan 2024`.
pub const DATE_FORMAT: &str = "%d %b %Y";

#[derive(Error, Debug)]
pub enum StatementError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("Missing required column: {0}")]
    MissingColumn(&'static str),
    #[error("Invalid date '{0}': expected e.g. 05 Jan 2024")]
    InvalidDate(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid debit/credit value: {0}")]
    InvalidFlow(String),
    #[error("No data rows")]
    NoDataRows,
}

struct Columns {
    date: usize,
    details: usize,
    amount: usize,
    flow: usize,
}

/// Required columns are located by trimmed header name, in any order.
fn locate_columns(headers: &csv::StringRecord) -> Result<Columns, StatementError> {
    let find = |name: &'static str| {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or(StatementError::MissingColumn(name))
    };
    Ok(Columns {
        date: find("Date")?,
        details: find("Details")?,
        amount: find("Amount")?,
        flow: find("Debit/Credit")?,
    })
}

/// Parses a bank-statement CSV export and runs keyword categorization over
/// the result before returning it.
///
/// Any row that fails to parse aborts the whole load; the caller gets the
/// error and no transactions, never a partially-categorized table.
pub fn load_statement<R: Read>(
    data: R,
    categories: &CategoryMap,
) -> Result<Vec<Transaction>, StatementError> {
    let mut reader = csv::Reader::from_reader(data);
    let columns = locate_columns(reader.headers()?)?;

    let mut transactions = Vec::new();
    for result in reader.records() {
        let record = result?;
        if record.is_empty() {
            continue;
        }

        let date = parse_date(record.get(columns.date).unwrap_or_default())?;
        let details = record.get(columns.details).unwrap_or_default().to_string();
        let amount = parse_amount(record.get(columns.amount).unwrap_or_default())?;
        let flow = parse_flow(record.get(columns.flow).unwrap_or_default())?;

        transactions.push(Transaction::new(date, details, amount, flow));
    }

    if transactions.is_empty() {
        return Err(StatementError::NoDataRows);
    }

    categorize(&mut transactions, categories);
    Ok(transactions)
}

fn parse_date(s: &str) -> Result<NaiveDate, StatementError> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .map_err(|_| StatementError::InvalidDate(s.to_string()))
}

/// Strips thousands separators before numeric conversion: `"1,234.50"` parses
/// as 1234.50.
fn parse_amount(s: &str) -> Result<Money, StatementError> {
    let s = s.trim();
    let cleaned = s.replace(',', "");
    let decimal =
        Decimal::from_str(&cleaned).map_err(|_| StatementError::InvalidAmount(s.to_string()))?;
    Ok(Money::from_decimal(decimal))
}

fn parse_flow(s: &str) -> Result<Flow, StatementError> {
    s.parse()
        .map_err(|_| StatementError::InvalidFlow(s.trim().to_string()))
}
