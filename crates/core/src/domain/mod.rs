pub mod holding;
pub mod verdict;

pub use holding::{EnrichedRecord, ExchangeCandidate, Holding, ResolvedIdentifier};
pub use verdict::{ComplianceVerdict, Screen};
