pub mod category;
pub mod interval;
pub mod money;
pub mod summary;
pub mod transaction;

pub use category::{CategoryError, CategoryMap, UNCATEGORIZED};
pub use interval::{Interval, IntervalBucket};
pub use money::Money;
pub use summary::CategoryTotal;
pub use transaction::{Flow, Transaction};
