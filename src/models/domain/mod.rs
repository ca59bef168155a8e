pub mod attempt;
pub mod cutoff;
pub mod purchase;
pub mod ranking;
pub mod test_series;
pub mod user;
pub use attempt::{Attempt, Response};
pub use cutoff::{CutoffRecord, CutoffStatus};
pub use purchase::Purchase;
pub use ranking::RankingEntry;
pub use test_series::{Question, Section, Test, TestSeries};
pub use user::{User, UserRole};
