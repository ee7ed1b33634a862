use tally_core::{transaction::with_flow, CategoryMap, Flow, Transaction};
use tally_import::categorize;
use tally_storage::CategoryStore;

/// Everything the single active dashboard session owns: the persisted
/// category dictionary and the statement currently loaded into it.
pub struct AppState {
    pub store: CategoryStore,
    pub session: Option<Session>,
}

impl AppState {
    pub fn new(store: CategoryStore) -> Self {
        AppState {
            store,
            session: None,
        }
    }
}

/// The parsed and categorized statement table. Row indices are stable for
/// the lifetime of the session, so the grid can address rows by position.
pub struct Session {
    transactions: Vec<Transaction>,
}

impl Session {
    pub fn new(transactions: Vec<Transaction>) -> Self {
        Session { transactions }
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn get(&self, index: usize) -> Option<&Transaction> {
        self.transactions.get(index)
    }

    pub fn with_flow(&self, flow: Flow) -> impl Iterator<Item = &Transaction> {
        with_flow(&self.transactions, flow)
    }

    /// Applies a user override to one row. Returns the updated row, or None
    /// when the index is out of range.
    pub fn set_category(&mut self, index: usize, category: &str) -> Option<&Transaction> {
        let tx = self.transactions.get_mut(index)?;
        tx.category = category.to_string();
        Some(tx)
    }

    /// Recompute pass over the current table: keyword-matches rows still
    /// `Uncategorized` against the given dictionary. Rows that already carry
    /// a category, including user overrides, are untouched; a keyword added
    /// after a row was classified never reclassifies it.
    pub fn recategorize(&mut self, categories: &CategoryMap) -> usize {
        categorize(&mut self.transactions, categories)
    }
}
