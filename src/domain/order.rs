//! Completed-order types as consumed from the host order system.

use std::collections::BTreeSet;

use super::ids::{OrderId, ProductId};

/// One line item of a completed order.
///
/// Variation items carry the parent product id; pair signals are always
/// recorded against the parent so variations of one product collapse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    pub product_id: ProductId,
    pub parent_id: Option<ProductId>,
}

impl LineItem {
    pub fn new(product_id: impl Into<ProductId>) -> Self {
        Self {
            product_id: product_id.into(),
            parent_id: None,
        }
    }

    pub fn variation(product_id: impl Into<ProductId>, parent_id: impl Into<ProductId>) -> Self {
        Self {
            product_id: product_id.into(),
            parent_id: Some(parent_id.into()),
        }
    }

    /// The product the item counts as: the parent for variations.
    pub fn effective_product(&self) -> &ProductId {
        self.parent_id.as_ref().unwrap_or(&self.product_id)
    }
}

/// A completed order resolved to its line items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedOrder {
    pub id: OrderId,
    pub items: Vec<LineItem>,
}

impl CompletedOrder {
    pub fn new(id: impl Into<OrderId>, items: Vec<LineItem>) -> Self {
        Self {
            id: id.into(),
            items,
        }
    }

    /// Distinct parent-level products in this order, in stable order.
    pub fn distinct_products(&self) -> Vec<ProductId> {
        let set: BTreeSet<&ProductId> = self.items.iter().map(LineItem::effective_product).collect();
        set.into_iter().cloned().collect()
    }
}
