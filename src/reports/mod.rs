//! Reports module for m-track
//!
//! Pure functions over the transaction list: the monthly dashboard and
//! multi-criteria search.

pub mod monthly;
pub mod search;

pub use monthly::{ModeTotal, MonthlySummary, Totals};
pub use search::SearchFilter;
