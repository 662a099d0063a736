// Raw counters and the rate stats derived from them.

pub mod formulas;
pub mod record;

pub use record::{Counter, DerivedStats, FormattedStats, PartialRecord, PlayerRecord};
