pub mod apply;
pub mod phrase;
pub mod range;

pub use apply::{Decision, RecordFilter};
pub use phrase::PhraseFilter;
pub use range::{DateRange, parse_date};
