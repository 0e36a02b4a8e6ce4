//! Collector result types.

use serde::Serialize;

/// Result of folding a single order into the stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Outcome {
    /// The order already carried a processed marker; nothing changed.
    Skipped,
    /// The order was folded in (possibly with zero pair impact).
    Processed {
        /// Distinct parent products seen in the order.
        products: usize,
        /// Unordered pairs written (C(n,2)).
        pairs: usize,
    },
}

/// Tally for a batch of orders. Per-order failures never abort the batch;
/// they show up in `errors` instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct BatchSummary {
    pub requested: u64,
    pub processed: u64,
    pub errors: u64,
}

impl BatchSummary {
    pub fn record_success(&mut self) {
        self.processed += 1;
    }

    pub fn record_error(&mut self) {
        self.errors += 1;
    }
}
