//! Engine services for minibooks-ledger.

mod balancer;
mod contacts;
mod normalize;
mod posting;
mod registry;
mod report;
mod store;

pub use balancer::{build_journal_set, group_imported_lines, validate_journal_lines};
pub use contacts::{ContactDirectory, MemoryContactDirectory};
pub use normalize::normalize;
pub use posting::{BatchPostOutcome, PostingEngine, SkippedDocument};
pub use registry::{AccountRegistry, AccountResolver, MemoryAccountRegistry};
pub use report::{periods_for, ReportEngine};
pub use store::{LedgerQuery, LedgerStore, MemoryLedgerStore};
