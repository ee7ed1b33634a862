use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::money::Money;
use super::transaction::Transaction;

/// Grouping interval for the time-series chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Interval {
    FiveDays,
    SevenDays,
    TenDays,
    ThirtyDays,
}

impl Interval {
    pub const ALL: [Interval; 4] = [
        Interval::FiveDays,
        Interval::SevenDays,
        Interval::TenDays,
        Interval::ThirtyDays,
    ];

    pub fn from_days(days: i64) -> Option<Self> {
        match days {
            5 => Some(Interval::FiveDays),
            7 => Some(Interval::SevenDays),
            10 => Some(Interval::TenDays),
            30 => Some(Interval::ThirtyDays),
            _ => None,
        }
    }

    pub fn days(self) -> i64 {
        match self {
            Interval::FiveDays => 5,
            Interval::SevenDays => 7,
            Interval::TenDays => 10,
            Interval::ThirtyDays => 30,
        }
    }
}

/// One bar of the interval chart: a fixed-length day range, counted from the
/// earliest transaction date, and the amount it accumulated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntervalBucket {
    pub index: u32,
    pub label: String,
    pub total: Money,
}

/// Sums amounts per fixed-length day range starting at the earliest
/// transaction date. Ranges with no transactions are omitted; output is
/// ordered by range index ascending.
pub fn bucket_totals<'a, I>(transactions: I, interval: Interval) -> Vec<IntervalBucket>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let transactions: Vec<&Transaction> = transactions.into_iter().collect();
    let Some(start) = transactions.iter().map(|tx| tx.date).min() else {
        return Vec::new();
    };

    let mut totals: BTreeMap<u32, Money> = BTreeMap::new();
    for tx in &transactions {
        let index = ((tx.date - start).num_days() / interval.days()) as u32;
        let entry = totals.entry(index).or_insert_with(Money::zero);
        *entry = *entry + tx.amount;
    }

    totals
        .into_iter()
        .map(|(index, total)| IntervalBucket {
            index,
            label: range_label(start, interval, index),
            total,
        })
        .collect()
}

/// `"01 Jan – 05 Jan"` for the inclusive range covered by bucket `index`.
fn range_label(start: NaiveDate, interval: Interval, index: u32) -> String {
    let days = interval.days();
    let first = start + Duration::days(index as i64 * days);
    let last = start + Duration::days((index as i64 + 1) * days - 1);
    format!("{} – {}", first.format("%d %b"), last.format("%d %b"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::Flow;
    use rust_decimal::Decimal;

    fn tx(date: (i32, u32, u32), amount_minor: i64) -> Transaction {
        Transaction::new(
            NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            "COFFEE SHOP".to_string(),
            Money::from_decimal(Decimal::new(amount_minor, 2)),
            Flow::Debit,
        )
    }

    #[test]
    fn from_days_accepts_only_supported_lengths() {
        for interval in Interval::ALL {
            assert_eq!(Interval::from_days(interval.days()), Some(interval));
        }
        assert_eq!(Interval::from_days(6), None);
        assert_eq!(Interval::from_days(0), None);
    }

    #[test]
    fn empty_input_yields_no_buckets() {
        assert!(bucket_totals(std::iter::empty::<&Transaction>(), Interval::FiveDays).is_empty());
    }

    #[test]
    fn skips_ranges_with_no_transactions() {
        // Days 0 and 4 land in bucket 0; day 10 lands in bucket 2; bucket 1
        // (days 5-9) has no rows and must not appear.
        let txs = vec![
            tx((2024, 1, 1), 1000),
            tx((2024, 1, 5), 500),
            tx((2024, 1, 11), 250),
        ];
        let buckets = bucket_totals(&txs, Interval::FiveDays);
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].index, 0);
        assert_eq!(buckets[0].total, Money::from_decimal(Decimal::new(1500, 2)));
        assert_eq!(buckets[1].index, 2);
        assert_eq!(buckets[1].total, Money::from_decimal(Decimal::new(250, 2)));
    }

    #[test]
    fn labels_cover_inclusive_day_ranges() {
        let txs = vec![tx((2024, 1, 1), 1000), tx((2024, 1, 11), 250)];
        let buckets = bucket_totals(&txs, Interval::FiveDays);
        assert_eq!(buckets[0].label, "01 Jan – 05 Jan");
        assert_eq!(buckets[1].label, "11 Jan – 15 Jan");
    }

    #[test]
    fn labels_cross_month_boundaries() {
        let txs = vec![tx((2024, 1, 28), 1000), tx((2024, 2, 2), 500)];
        let buckets = bucket_totals(&txs, Interval::SevenDays);
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].label, "28 Jan – 03 Feb");
    }

    #[test]
    fn start_date_is_earliest_regardless_of_input_order() {
        let txs = vec![tx((2024, 1, 11), 250), tx((2024, 1, 1), 1000)];
        let buckets = bucket_totals(&txs, Interval::FiveDays);
        assert_eq!(buckets[0].index, 0);
        assert_eq!(buckets[0].label, "01 Jan – 05 Jan");
    }

    #[test]
    fn thirty_day_interval_groups_a_whole_month() {
        let txs = vec![
            tx((2024, 1, 1), 1000),
            tx((2024, 1, 30), 500),
            tx((2024, 1, 31), 250),
        ];
        let buckets = bucket_totals(&txs, Interval::ThirtyDays);
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].total, Money::from_decimal(Decimal::new(1500, 2)));
        assert_eq!(buckets[1].index, 1);
    }
}
