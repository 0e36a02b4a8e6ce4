//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! - [`MemoryHost`] — in-memory [`OrderSource`](crate::host::OrderSource) +
//!   [`Catalog`](crate::host::Catalog) with scriptable poison orders.
//! - [`FixedCart`] — a [`Cart`](crate::host::Cart) with preset contents.

mod host;

pub use host::{FixedCart, MemoryHost};
