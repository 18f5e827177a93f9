//! Types that represent the core data model, such as `ExpenseRecord` and `Category`.
mod amount;
mod category;
mod date;
mod record;

pub use amount::{Amount, AmountError};
pub use category::{Categories, Category};
pub use date::{ExpenseDate, DATE_FORMAT};
pub use record::{Expense, ExpenseDraft, ExpensePatch, ExpenseRecord, RecordId};
