//! Engine-agnostic domain types: identifiers, orders, counters, and the
//! result types reported by the collector and the batch jobs.

mod backfill;
mod cleanup;
mod counters;
mod ids;
mod order;
mod outcome;

pub use backfill::{BackfillState, BackfillStatus, BatchResult};
pub use cleanup::CleanupReport;
pub use counters::{PairCounter, ProductStat};
pub use ids::{OrderId, ProductId};
pub use order::{CompletedOrder, LineItem};
pub use outcome::{BatchSummary, Outcome};
