//! Order lifecycle: recording, status transitions, operator notes and removal.

use std::cmp::Reverse;

use bakery_domain::{
    generate_order_number, Displayable, Order, OrderNote, OrderStatus, TransitionPolicy,
};
use tracing::{debug, info, warn};

use crate::{
    storage::{OrderFilter, OrderPatch, RecordStore},
    time::Clock,
    CoreError, CoreResult,
};

/// Re-reads allowed when an order changes between the check and the write.
const STATUS_WRITE_ATTEMPTS: usize = 3;

/// Stateless order operations over a [`RecordStore`].
pub struct OrderService;

impl OrderService {
    /// Inserts an order coming from checkout as a fresh `pending` order.
    pub fn record(store: &dyn RecordStore, clock: &dyn Clock, mut order: Order) -> CoreResult<Order> {
        if order.is_empty() {
            return Err(CoreError::invalid(
                "order must contain at least one item or a product",
            ));
        }
        let now = clock.now();
        order.order_number = order.order_number.trim().to_string();
        if order.order_number.is_empty() {
            order.order_number = generate_order_number(now);
        }
        if !store
            .find_orders(&OrderFilter::by_number(&order.order_number))?
            .is_empty()
        {
            return Err(CoreError::invalid(format!(
                "order number {} already exists",
                order.order_number
            )));
        }
        order.status = OrderStatus::Pending;
        order.notes.clear();
        order.created_at = Some(now);
        order.updated_at = Some(now);
        store.insert_order(&order)?;
        info!("recorded {}", order.display_label());
        Ok(order)
    }

    /// All orders, newest first. Undated orders go last in store order.
    pub fn list(store: &dyn RecordStore) -> CoreResult<Vec<Order>> {
        let mut orders = store.find_orders(&OrderFilter::all())?;
        orders.sort_by_key(|order| Reverse(order.created_at));
        Ok(orders)
    }

    pub fn get(store: &dyn RecordStore, order_number: &str) -> CoreResult<Order> {
        store
            .find_orders(&OrderFilter::by_number(order_number))?
            .into_iter()
            .next()
            .ok_or_else(|| CoreError::order_not_found(order_number))
    }

    /// Moves an order to `next`. Setting the current status again is a no-op.
    ///
    /// The write only lands while the stored status is still the one the
    /// transition was checked against; a concurrent change is re-read and
    /// re-checked.
    pub fn set_status(
        store: &dyn RecordStore,
        clock: &dyn Clock,
        policy: TransitionPolicy,
        order_number: &str,
        next: OrderStatus,
    ) -> CoreResult<Order> {
        for _ in 0..STATUS_WRITE_ATTEMPTS {
            let current = Self::get(store, order_number)?;
            let from = current.status;
            if from == next {
                debug!("order {} already {}", order_number, next);
                return Ok(current);
            }
            if !policy.permits(from, next) {
                return Err(CoreError::InvalidTransition { from, to: next });
            }

            let patch = OrderPatch::default().status(next).touched(clock.now());
            let filter = OrderFilter::by_number(order_number).with_status(from);
            let Some(updated) = store.update_order(&filter, &patch)? else {
                debug!("order {} changed while moving to {}", order_number, next);
                continue;
            };
            if !from.can_transition_to(next) {
                warn!(
                    "order {} moved along illegal edge {} -> {} under {} policy",
                    order_number, from, next, policy
                );
            }
            info!("order {} status {} -> {}", order_number, from, next);
            return Ok(updated);
        }
        Err(CoreError::StoreUnavailable(format!(
            "order {} kept changing while its status was updated",
            order_number
        )))
    }

    /// Appends a trimmed operator note stamped with the current time.
    pub fn append_note(
        store: &dyn RecordStore,
        clock: &dyn Clock,
        order_number: &str,
        text: &str,
    ) -> CoreResult<Order> {
        let text = text.trim();
        if text.is_empty() {
            return Err(CoreError::invalid("note text must not be empty"));
        }
        let now = clock.now();
        let note = OrderNote {
            text: text.to_string(),
            timestamp: now,
        };
        let patch = OrderPatch::default().note(note).touched(now);
        let updated = store
            .update_order(&OrderFilter::by_number(order_number), &patch)?
            .ok_or_else(|| CoreError::order_not_found(order_number))?;
        info!(
            "added note to order {} ({} total)",
            order_number,
            updated.notes.len()
        );
        Ok(updated)
    }

    pub fn delete(store: &dyn RecordStore, order_number: &str) -> CoreResult<()> {
        let removed = store.delete_order(&OrderFilter::by_number(order_number))?;
        if removed == 0 {
            return Err(CoreError::order_not_found(order_number));
        }
        info!("deleted order {}", order_number);
        Ok(())
    }
}
