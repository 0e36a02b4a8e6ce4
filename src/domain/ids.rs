//! Identifier newtypes for type safety.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Product identifier.
///
/// Opaque to the engine; the inner String is private so all construction
/// goes through the defined constructors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProductId(String);

impl ProductId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ProductId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for ProductId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Order identifier.
///
/// Numeric because the backfill cursor relies on the host assigning
/// ascending order ids.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct OrderId(i64);

impl OrderId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn as_i64(self) -> i64 {
        self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for OrderId {
    fn from(id: i64) -> Self {
        Self::new(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_id_display_roundtrip() {
        let id = ProductId::new("sku-123");
        assert_eq!(id.as_str(), "sku-123");
        assert_eq!(id.to_string(), "sku-123");
        assert_eq!(ProductId::from("sku-123"), id);
    }

    #[test]
    fn order_ids_order_by_value() {
        assert!(OrderId::new(10) < OrderId::new(11));
        assert_eq!(OrderId::new(7).as_i64(), 7);
    }
}
