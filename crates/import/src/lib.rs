pub mod categorize;
pub mod csv;

pub use categorize::categorize;
pub use csv::{load_statement, StatementError};
