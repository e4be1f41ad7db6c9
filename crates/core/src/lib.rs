pub mod money;
pub mod period;
pub mod result;
pub mod transaction;

pub use money::Money;
pub use period::DateRange;
pub use result::{ProcessingLog, ProcessingResult};
pub use transaction::{BankInfo, CanonicalTransaction, Categorization, RawTransaction, TransactionType};
