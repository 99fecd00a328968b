use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use super::{RecordStore, StoreError};
use crate::domain::category::CategoryNode;
use crate::domain::order::{MilestoneDates, Order};

/// In-process record store.
///
/// Behaves like the API for the calls the admin shell makes. Queued failures
/// are returned by the next calls, in order, before touching any data.
#[derive(Clone, Default)]
pub struct MemoryRecordStore {
    orders: Arc<RwLock<HashMap<Uuid, Order>>>,
    order_ids: Arc<RwLock<Vec<Uuid>>>,
    categories: Arc<RwLock<Vec<CategoryNode>>>,
    failures: Arc<Mutex<VecDeque<StoreError>>>,
    writes: Arc<AtomicUsize>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_order(&self, order: Order) {
        let mut orders = self.orders.write().await;
        if orders.insert(order.id, order.clone()).is_none() {
            self.order_ids.write().await.push(order.id);
        }
    }

    pub async fn set_categories(&self, forest: Vec<CategoryNode>) {
        *self.categories.write().await = forest;
    }

    /// Make the next call fail with `error`
    pub async fn fail_next(&self, error: StoreError) {
        self.failures.lock().await.push_back(error);
    }

    /// Number of write calls that reached the store
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    async fn injected_failure(&self) -> Result<(), StoreError> {
        match self.failures.lock().await.pop_front() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn count_write(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

fn remove_node(nodes: &mut Vec<CategoryNode>, id: Uuid) -> Result<bool, StoreError> {
    if let Some(index) = nodes.iter().position(|node| node.id == id) {
        if !nodes[index].children.is_empty() {
            return Err(StoreError::Rejected {
                status: 409,
                body: format!("category {id} still has subcategories"),
            });
        }
        nodes.remove(index);
        return Ok(true);
    }

    for node in nodes.iter_mut() {
        if remove_node(&mut node.children, id)? {
            return Ok(true);
        }
    }
    Ok(false)
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn fetch_order(&self, id: Uuid) -> Result<Order, StoreError> {
        self.injected_failure().await?;
        self.orders
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("order {id}")))
    }

    async fn list_orders(&self) -> Result<Vec<Order>, StoreError> {
        self.injected_failure().await?;
        let orders = self.orders.read().await;
        let ids = self.order_ids.read().await;
        Ok(ids.iter().filter_map(|id| orders.get(id).cloned()).collect())
    }

    async fn update_order_status(&self, order_id: Uuid, status_id: Uuid) -> Result<(), StoreError> {
        self.injected_failure().await?;
        self.count_write();

        let mut orders = self.orders.write().await;
        let order = orders
            .get_mut(&order_id)
            .ok_or_else(|| StoreError::NotFound(format!("order {order_id}")))?;
        order.status_id = status_id;
        Ok(())
    }

    async fn update_order_timeline(
        &self,
        order_id: Uuid,
        dates: &MilestoneDates,
    ) -> Result<(), StoreError> {
        self.injected_failure().await?;
        self.count_write();

        let mut orders = self.orders.write().await;
        let order = orders
            .get_mut(&order_id)
            .ok_or_else(|| StoreError::NotFound(format!("order {order_id}")))?;
        order.order_approved_at = dates.order_approved_at;
        order.order_delivered_carrier_date = dates.order_delivered_carrier_date;
        order.order_delivered_customer_date = dates.order_delivered_customer_date;
        Ok(())
    }

    async fn fetch_category_forest(&self) -> Result<Vec<CategoryNode>, StoreError> {
        self.injected_failure().await?;
        Ok(self.categories.read().await.clone())
    }

    async fn delete_category(&self, id: Uuid) -> Result<(), StoreError> {
        self.injected_failure().await?;
        self.count_write();

        let mut categories = self.categories.write().await;
        if remove_node(&mut categories, id)? {
            Ok(())
        } else {
            Err(StoreError::NotFound(format!("category {id}")))
        }
    }
}
