use tally_core::{CategoryMap, Transaction, UNCATEGORIZED};

/// Assigns a category to every transaction still marked `Uncategorized` by
/// exact match of its lower-cased, trimmed details against each category's
/// lower-cased, trimmed keywords. The first matching category in map
/// insertion order wins; rows that already carry a category are left alone,
/// so keywords added after the fact never reclassify them.
///
/// Returns the number of rows assigned during this pass. Running the pass
/// twice over the same rows assigns nothing the second time.
pub fn categorize(transactions: &mut [Transaction], categories: &CategoryMap) -> usize {
    let mut assigned = 0;

    for (name, keywords) in categories.iter() {
        if name == UNCATEGORIZED || keywords.is_empty() {
            continue;
        }
        let keywords: Vec<String> = keywords.iter().map(|k| k.trim().to_lowercase()).collect();

        for tx in transactions.iter_mut() {
            if !tx.is_uncategorized() {
                continue;
            }
            let details = tx.details.trim().to_lowercase();
            if keywords.iter().any(|k| *k == details) {
                tx.category = name.to_string();
                assigned += 1;
            }
        }
    }

    assigned
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use tally_core::{Flow, Money};

    fn tx(details: &str) -> Transaction {
        Transaction::new(
            NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            details.to_string(),
            Money::from_decimal(Decimal::new(1250, 2)),
            Flow::Debit,
        )
    }

    fn food_map() -> CategoryMap {
        let mut map = CategoryMap::new();
        map.add_category("Food");
        map.add_keyword("Food", "coffee shop").unwrap();
        map
    }

    #[test]
    fn matches_case_insensitively_after_trimming() {
        let mut txs = vec![tx("COFFEE SHOP"), tx("  Coffee Shop  "), tx("BOOKSTORE")];
        let assigned = categorize(&mut txs, &food_map());
        assert_eq!(assigned, 2);
        assert_eq!(txs[0].category, "Food");
        assert_eq!(txs[1].category, "Food");
        assert_eq!(txs[2].category, UNCATEGORIZED);
    }

    #[test]
    fn requires_exact_match_not_substring() {
        let mut txs = vec![tx("COFFEE SHOP DOWNTOWN")];
        assert_eq!(categorize(&mut txs, &food_map()), 0);
        assert_eq!(txs[0].category, UNCATEGORIZED);
    }

    #[test]
    fn keyword_whitespace_is_normalized_too() {
        let mut map = CategoryMap::new();
        map.add_category("Food");
        // Keywords are trimmed on insert, but matching trims again anyway.
        map.add_keyword("Food", "Coffee Shop").unwrap();
        let mut txs = vec![tx("coffee shop")];
        assert_eq!(categorize(&mut txs, &map), 1);
        assert_eq!(txs[0].category, "Food");
    }

    #[test]
    fn skips_rows_that_already_have_a_category() {
        let mut txs = vec![tx("COFFEE SHOP")];
        txs[0].category = "Eating Out".to_string();
        assert_eq!(categorize(&mut txs, &food_map()), 0);
        assert_eq!(txs[0].category, "Eating Out");
    }

    #[test]
    fn first_category_in_insertion_order_wins() {
        let mut map = food_map();
        map.add_category("Drinks");
        map.add_keyword("Drinks", "coffee shop").unwrap();
        let mut txs = vec![tx("COFFEE SHOP")];
        categorize(&mut txs, &map);
        assert_eq!(txs[0].category, "Food");
    }

    #[test]
    fn empty_keyword_lists_are_skipped() {
        let mut map = CategoryMap::new();
        map.add_category("Food");
        let mut txs = vec![tx("COFFEE SHOP")];
        assert_eq!(categorize(&mut txs, &map), 0);
        assert_eq!(txs[0].category, UNCATEGORIZED);
    }

    #[test]
    fn uncategorized_keywords_are_never_matched() {
        let mut map = CategoryMap::new();
        map.add_keyword(UNCATEGORIZED, "coffee shop").unwrap();
        let mut txs = vec![tx("COFFEE SHOP")];
        assert_eq!(categorize(&mut txs, &map), 0);
        assert_eq!(txs[0].category, UNCATEGORIZED);
    }

    #[test]
    fn repeat_run_is_idempotent() {
        let map = food_map();
        let mut txs = vec![tx("COFFEE SHOP"), tx("BOOKSTORE")];
        assert_eq!(categorize(&mut txs, &map), 1);
        let categories_after_first: Vec<String> =
            txs.iter().map(|t| t.category.clone()).collect();
        assert_eq!(categorize(&mut txs, &map), 0);
        let categories_after_second: Vec<String> =
            txs.iter().map(|t| t.category.clone()).collect();
        assert_eq!(categories_after_first, categories_after_second);
    }
}
