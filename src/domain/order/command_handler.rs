use std::sync::Arc;

use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use uuid::Uuid;

use super::commands::OrderCommand;
use super::errors::OrderCommandError;
use super::lifecycle::{apply_status_update, apply_timeline_update};
use super::pricing::{NoCharges, PricingPolicy};
use super::query::OrderFilter;
use super::value_objects::{status_label, Order, OrderStatus};
use super::view::OrderView;
use crate::metrics::Metrics;
use crate::store::RecordStore;

// ============================================================================
// Order Command Handler
// ============================================================================
//
// Orchestrates: Command -> Lifecycle check -> Record store write -> Refetch
//
// The locally patched order is only used for validation and is thrown away;
// the view returned after a write always comes from a fresh fetch.
//
// ============================================================================

/// How writes deal with concurrent edits by other operators
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WritePolicy {
    /// Write without checking; the last write wins.
    #[default]
    LastWriteWins,
    /// Refetch before writing and refuse if the order moved on.
    VerifyBeforeWrite,
}

pub struct OrderCommandHandler {
    store: Arc<dyn RecordStore>,
    pricing: Arc<dyn PricingPolicy>,
    write_policy: WritePolicy,
    metrics: Option<Arc<Metrics>>,
}

impl OrderCommandHandler {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            pricing: Arc::new(NoCharges),
            write_policy: WritePolicy::default(),
            metrics: None,
        }
    }

    pub fn with_pricing(mut self, pricing: Arc<dyn PricingPolicy>) -> Self {
        self.pricing = pricing;
        self
    }

    pub fn with_write_policy(mut self, write_policy: WritePolicy) -> Self {
        self.write_policy = write_policy;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub async fn load(&self, order_id: Uuid) -> Result<OrderView, OrderCommandError> {
        let order = self.store.fetch_order(order_id).await?;
        Ok(self.view(order))
    }

    pub async fn list(
        &self,
        filter: &OrderFilter,
        now: DateTime<FixedOffset>,
    ) -> Result<Vec<OrderView>, OrderCommandError> {
        let orders = self.store.list_orders().await?;
        Ok(filter
            .apply(&orders, now)
            .into_iter()
            .map(|order| self.view(order))
            .collect())
    }

    /// Apply `command` to the order the operator is looking at.
    ///
    /// Validation failures return before any store call. On success the
    /// canonical order is refetched and returned as a fresh view.
    pub async fn handle(
        &self,
        displayed: &Order,
        command: OrderCommand,
    ) -> Result<OrderView, OrderCommandError> {
        let command_name = command.name();
        let result = self.execute(displayed, command).await;

        let outcome = match &result {
            Ok(_) => "applied",
            Err(error) => error.kind(),
        };
        if let Some(metrics) = &self.metrics {
            metrics.record_order_command(command_name, outcome);
        }

        if let Err(error) = &result {
            tracing::warn!(
                order_id = %displayed.id,
                command = command_name,
                error = %error,
                "Order command not applied"
            );
        }

        result
    }

    async fn execute(
        &self,
        displayed: &Order,
        command: OrderCommand,
    ) -> Result<OrderView, OrderCommandError> {
        // Validate locally; the patched copy is never persisted as such.
        let patched = match &command {
            OrderCommand::UpdateStatus { target } => apply_status_update(displayed, *target)?,
            OrderCommand::Cancel => apply_status_update(displayed, OrderStatus::Cancelled)?,
            OrderCommand::UpdateTimeline { dates } => apply_timeline_update(displayed, *dates)?,
        };

        if self.write_policy == WritePolicy::VerifyBeforeWrite {
            self.ensure_unchanged(displayed).await?;
        }

        match command {
            OrderCommand::UpdateStatus { .. } | OrderCommand::Cancel => {
                self.store
                    .update_order_status(displayed.id, patched.status_id)
                    .await?;

                tracing::info!(
                    order_id = %displayed.id,
                    from = %status_label(displayed.status_id),
                    to = %status_label(patched.status_id),
                    "Order status updated"
                );
            }
            OrderCommand::UpdateTimeline { dates } => {
                self.store.update_order_timeline(displayed.id, &dates).await?;

                tracing::info!(
                    order_id = %displayed.id,
                    approved_at = ?dates.order_approved_at,
                    carrier_date = ?dates.order_delivered_carrier_date,
                    customer_date = ?dates.order_delivered_customer_date,
                    "Order timeline updated"
                );
            }
        }

        let canonical = self.store.fetch_order(displayed.id).await?;
        Ok(self.view(canonical))
    }

    async fn ensure_unchanged(&self, displayed: &Order) -> Result<(), OrderCommandError> {
        let current = self.store.fetch_order(displayed.id).await?;

        if current.status_id != displayed.status_id || current.milestones() != displayed.milestones() {
            return Err(OrderCommandError::StaleOrder {
                order_id: displayed.id,
            });
        }
        Ok(())
    }

    fn view(&self, order: Order) -> OrderView {
        OrderView::build(order, self.pricing.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::{FlatRate, MilestoneDates, OrderError, OrderItem, PlacedWithin};
    use crate::store::{MemoryRecordStore, StoreError};
    use rust_decimal::Decimal;

    fn order(status: OrderStatus) -> Order {
        Order {
            id: Uuid::new_v4(),
            status_id: status.id(),
            customer_id: Uuid::new_v4(),
            coupon_id: None,
            items: vec![OrderItem {
                product_id: Uuid::new_v4(),
                price: Decimal::from(10),
                quantity: 2,
            }],
            total_price: Decimal::from(20),
            created_at: "2025-05-20T08:15:00Z".parse().unwrap(),
            order_approved_at: None,
            order_delivered_carrier_date: None,
            order_delivered_customer_date: None,
        }
    }

    async fn setup(status: OrderStatus) -> (MemoryRecordStore, OrderCommandHandler, Order) {
        let store = MemoryRecordStore::new();
        let order = order(status);
        store.insert_order(order.clone()).await;
        let handler = OrderCommandHandler::new(Arc::new(store.clone()));
        (store, handler, order)
    }

    fn approved_on_new_year() -> MilestoneDates {
        MilestoneDates {
            order_approved_at: Some("2025-01-01T00:00:00Z".parse().unwrap()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_status_update_returns_refetched_order() {
        let (store, handler, order) = setup(OrderStatus::Processing).await;

        let view = handler
            .handle(&order, OrderCommand::UpdateStatus { target: OrderStatus::Delivered })
            .await
            .unwrap();

        assert_eq!(view.status, Some(OrderStatus::Delivered));
        assert_eq!(view.progress_step(), 3);
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn test_lifecycle_scenario_through_store() {
        let (_store, handler, order) = setup(OrderStatus::Processing).await;

        let delivered = handler
            .handle(&order, OrderCommand::UpdateStatus { target: OrderStatus::Delivered })
            .await
            .unwrap();
        let cancelled = handler
            .handle(&delivered.order, OrderCommand::Cancel)
            .await
            .unwrap();
        assert_eq!(cancelled.status, Some(OrderStatus::Cancelled));

        let reopened = handler
            .handle(&cancelled.order, OrderCommand::UpdateStatus { target: OrderStatus::Processing })
            .await;
        assert!(matches!(
            reopened,
            Err(OrderCommandError::Rejected(OrderError::InvalidTransition { .. }))
        ));
    }

    #[tokio::test]
    async fn test_rejected_command_never_reaches_store() {
        let (store, handler, order) = setup(OrderStatus::Cancelled).await;

        let result = handler
            .handle(&order, OrderCommand::UpdateTimeline { dates: approved_on_new_year() })
            .await;

        assert!(matches!(
            result,
            Err(OrderCommandError::Rejected(OrderError::TimelineLocked))
        ));
        assert_eq!(store.write_count(), 0);
        let stored = store.fetch_order(order.id).await.unwrap();
        assert_eq!(stored.order_approved_at, None);
    }

    #[tokio::test]
    async fn test_unchanged_status_rejected() {
        let (store, handler, order) = setup(OrderStatus::Processed).await;

        let result = handler
            .handle(&order, OrderCommand::UpdateStatus { target: OrderStatus::Processed })
            .await;

        assert!(matches!(result, Err(OrderCommandError::Rejected(_))));
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_timeline_update_persists_instants() {
        let (_store, handler, order) = setup(OrderStatus::Delivering).await;

        let view = handler
            .handle(&order, OrderCommand::UpdateTimeline { dates: approved_on_new_year() })
            .await
            .unwrap();

        assert_eq!(view.order.milestones(), approved_on_new_year());
    }

    #[tokio::test]
    async fn test_store_failure_surfaces_unchanged() {
        let (store, handler, order) = setup(OrderStatus::Processing).await;
        let failure = StoreError::Rejected {
            status: 400,
            body: "bad status".into(),
        };
        store.fail_next(failure.clone()).await;

        let result = handler.handle(&order, OrderCommand::Cancel).await;

        match result {
            Err(OrderCommandError::Store(error)) => assert_eq!(error, failure),
            other => panic!("expected store error, got {other:?}"),
        }
        let stored = store.fetch_order(order.id).await.unwrap();
        assert_eq!(stored.status(), Some(OrderStatus::Processing));
    }

    #[tokio::test]
    async fn test_last_write_wins_by_default() {
        let (store, handler, order) = setup(OrderStatus::Processing).await;
        store
            .update_order_status(order.id, OrderStatus::Delivering.id())
            .await
            .unwrap();

        let view = handler
            .handle(&order, OrderCommand::UpdateStatus { target: OrderStatus::Processed })
            .await
            .unwrap();
        assert_eq!(view.status, Some(OrderStatus::Processed));
    }

    #[tokio::test]
    async fn test_verify_before_write_detects_stale_order() {
        let (store, handler, order) = setup(OrderStatus::Processing).await;
        let handler = handler.with_write_policy(WritePolicy::VerifyBeforeWrite);

        // another operator moves the order on
        store
            .update_order_status(order.id, OrderStatus::Delivering.id())
            .await
            .unwrap();
        let writes_before = store.write_count();

        let result = handler
            .handle(&order, OrderCommand::UpdateStatus { target: OrderStatus::Processed })
            .await;

        assert!(matches!(result, Err(OrderCommandError::StaleOrder { order_id }) if order_id == order.id));
        assert_eq!(store.write_count(), writes_before);
    }

    #[tokio::test]
    async fn test_verify_before_write_allows_fresh_order() {
        let (_store, handler, order) = setup(OrderStatus::Processing).await;
        let handler = handler.with_write_policy(WritePolicy::VerifyBeforeWrite);

        let view = handler.handle(&order, OrderCommand::Cancel).await.unwrap();
        assert!(view.order.is_cancelled());
    }

    #[tokio::test]
    async fn test_metrics_record_outcomes() {
        let (_store, handler, order) = setup(OrderStatus::Cancelled).await;
        let metrics = Arc::new(Metrics::new().unwrap());
        let handler = handler.with_metrics(metrics.clone());

        let _ = handler.handle(&order, OrderCommand::Cancel).await;

        let counter = metrics
            .order_commands
            .with_label_values(&["cancel", "rejected"])
            .get();
        assert_eq!(counter, 1);
    }

    #[tokio::test]
    async fn test_list_filters_and_prices() {
        let (store, handler, _) = setup(OrderStatus::Processing).await;
        store.insert_order(order(OrderStatus::Cancelled)).await;
        let handler = handler.with_pricing(Arc::new(FlatRate {
            tax_rate: Decimal::new(1, 1),
            shipping_fee: Decimal::from(5),
        }));

        let filter = OrderFilter {
            status: Some(OrderStatus::Processing),
            placed: PlacedWithin::Any,
            ..Default::default()
        };
        let now = DateTime::parse_from_rfc3339("2025-05-21T12:00:00+00:00").unwrap();
        let views = handler.list(&filter, now).await.unwrap();

        assert_eq!(views.len(), 1);
        assert_eq!(views[0].summary.computed_total, Decimal::from(27));
    }

    #[tokio::test]
    async fn test_load_missing_order() {
        let (_store, handler, _) = setup(OrderStatus::Processing).await;
        let result = handler.load(Uuid::new_v4()).await;
        assert!(matches!(result, Err(OrderCommandError::Store(StoreError::NotFound(_)))));
    }
}
