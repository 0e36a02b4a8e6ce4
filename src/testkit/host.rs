//! In-memory host fakes.

use std::collections::{BTreeMap, HashMap};

use parking_lot::RwLock;

use crate::domain::{CompletedOrder, LineItem, OrderId, ProductId};
use crate::error::{Error, Result};
use crate::host::{Cart, Catalog, OrderSource};

#[derive(Debug, Clone)]
struct MemoryOrder {
    completed: bool,
    processed: bool,
    poison: bool,
    items: Vec<LineItem>,
}

/// In-memory order source and catalog.
///
/// Orders marked poison fail to load, simulating malformed host records.
#[derive(Default)]
pub struct MemoryHost {
    orders: RwLock<BTreeMap<i64, MemoryOrder>>,
    // (in_stock, purchasable) per product
    catalog: RwLock<HashMap<ProductId, (bool, bool)>>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a completed order with simple (non-variation) products.
    pub fn add_completed_order(&self, id: i64, products: &[&str]) {
        self.add_order(id, true, products.iter().map(|p| LineItem::new(*p)).collect());
    }

    pub fn add_order(&self, id: i64, completed: bool, items: Vec<LineItem>) {
        self.orders.write().insert(
            id,
            MemoryOrder {
                completed,
                processed: false,
                poison: false,
                items,
            },
        );
    }

    /// Add a completed order whose line items cannot be read.
    pub fn add_poison_order(&self, id: i64) {
        self.orders.write().insert(
            id,
            MemoryOrder {
                completed: true,
                processed: false,
                poison: true,
                items: Vec::new(),
            },
        );
    }

    /// Add a catalog product that is in stock and purchasable.
    pub fn add_product(&self, id: &str) {
        self.set_product(id, true, true);
    }

    pub fn set_product(&self, id: &str, in_stock: bool, purchasable: bool) {
        self.catalog
            .write()
            .insert(ProductId::new(id), (in_stock, purchasable));
    }

    pub fn remove_product(&self, id: &str) {
        self.catalog.write().remove(&ProductId::new(id));
    }

    pub fn processed_count(&self) -> usize {
        self.orders.read().values().filter(|o| o.processed).count()
    }
}

impl OrderSource for MemoryHost {
    async fn load_order(&self, id: OrderId) -> Result<Option<CompletedOrder>> {
        let orders = self.orders.read();
        match orders.get(&id.as_i64()) {
            Some(order) if order.poison => Err(Error::MalformedOrder {
                order_id: id.as_i64(),
                reason: "line items unreadable".into(),
            }),
            Some(order) if order.completed => {
                Ok(Some(CompletedOrder::new(id, order.items.clone())))
            }
            _ => Ok(None),
        }
    }

    async fn is_processed(&self, id: OrderId) -> Result<bool> {
        Ok(self
            .orders
            .read()
            .get(&id.as_i64())
            .map(|o| o.processed)
            .unwrap_or(false))
    }

    async fn mark_processed(&self, id: OrderId) -> Result<()> {
        if let Some(order) = self.orders.write().get_mut(&id.as_i64()) {
            order.processed = true;
        }
        Ok(())
    }

    async fn completed_orders_after(
        &self,
        cursor: OrderId,
        limit: i64,
        unprocessed_only: bool,
    ) -> Result<Vec<OrderId>> {
        let orders = self.orders.read();
        Ok(orders
            .range((cursor.as_i64() + 1)..)
            .filter(|(_, o)| o.completed && (!unprocessed_only || !o.processed))
            .take(limit as usize)
            .map(|(&id, _)| OrderId::new(id))
            .collect())
    }

    async fn count_completed_after(&self, cursor: OrderId, unprocessed_only: bool) -> Result<u64> {
        let orders = self.orders.read();
        Ok(orders
            .range((cursor.as_i64() + 1)..)
            .filter(|(_, o)| o.completed && (!unprocessed_only || !o.processed))
            .count() as u64)
    }
}

impl Catalog for MemoryHost {
    async fn existing(&self, ids: &[ProductId]) -> Result<Vec<ProductId>> {
        let catalog = self.catalog.read();
        Ok(ids
            .iter()
            .filter(|id| catalog.contains_key(id))
            .cloned()
            .collect())
    }

    async fn is_purchasable(&self, id: &ProductId) -> Result<bool> {
        Ok(self
            .catalog
            .read()
            .get(id)
            .map(|&(in_stock, purchasable)| in_stock && purchasable)
            .unwrap_or(false))
    }
}

/// Cart with preset contents.
#[derive(Debug, Clone, Default)]
pub struct FixedCart(pub Vec<ProductId>);

impl FixedCart {
    pub fn with(products: &[&str]) -> Self {
        Self(products.iter().map(|p| ProductId::new(*p)).collect())
    }
}

impl Cart for FixedCart {
    async fn contents(&self) -> Result<Vec<ProductId>> {
        Ok(self.0.clone())
    }
}
