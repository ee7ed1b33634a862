use serde::Serialize;
use std::collections::HashMap;

use super::money::Money;
use super::transaction::Transaction;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: Money,
}

/// Per-category amount totals, largest first. Ties break on category name so
/// the table is stable across runs.
pub fn category_totals<'a, I>(transactions: I) -> Vec<CategoryTotal>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut totals: HashMap<&str, Money> = HashMap::new();
    for tx in transactions {
        let entry = totals.entry(tx.category.as_str()).or_insert_with(Money::zero);
        *entry = *entry + tx.amount;
    }

    let mut rows: Vec<CategoryTotal> = totals
        .into_iter()
        .map(|(category, total)| CategoryTotal {
            category: category.to_string(),
            total,
        })
        .collect();
    rows.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.category.cmp(&b.category)));
    rows
}

/// Grand total over the given rows (the payments-tab metric).
pub fn total<'a, I>(transactions: I) -> Money
where
    I: IntoIterator<Item = &'a Transaction>,
{
    transactions.into_iter().map(|tx| tx.amount).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::Flow;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn tx(category: &str, amount_minor: i64) -> Transaction {
        let mut t = Transaction::new(
            NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            "SOMEWHERE".to_string(),
            Money::from_decimal(Decimal::new(amount_minor, 2)),
            Flow::Debit,
        );
        t.category = category.to_string();
        t
    }

    #[test]
    fn totals_are_sorted_descending() {
        let txs = vec![tx("Food", 1000), tx("Rent", 90000), tx("Food", 500)];
        let rows = category_totals(&txs);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].category, "Rent");
        assert_eq!(rows[1].category, "Food");
        assert_eq!(rows[1].total, Money::from_decimal(Decimal::new(1500, 2)));
    }

    #[test]
    fn equal_totals_sort_by_name() {
        let txs = vec![tx("Travel", 1000), tx("Food", 1000)];
        let rows = category_totals(&txs);
        assert_eq!(rows[0].category, "Food");
        assert_eq!(rows[1].category, "Travel");
    }

    #[test]
    fn empty_input_has_no_rows_and_zero_total() {
        let rows = category_totals(std::iter::empty::<&Transaction>());
        assert!(rows.is_empty());
        assert!(total(std::iter::empty::<&Transaction>()).is_zero());
    }

    #[test]
    fn grand_total_sums_all_rows() {
        let txs = vec![tx("Food", 1250), tx("Travel", 300000)];
        assert_eq!(total(&txs), Money::from_decimal(Decimal::new(301250, 2)));
    }
}
