pub mod booking;
pub mod changes;
pub mod mention;
pub mod normalize;
pub mod report;

pub use booking::BookingRecord;
pub use mention::{AliasMap, MentionResolver};
pub use normalize::{Normalizer, NormalizerConfig, RawRow};
pub use report::{ReportConfig, ReportOutcome, Reporter};
