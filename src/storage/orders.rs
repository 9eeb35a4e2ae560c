//! Order collection accessors.
//!
//! Orders point at their customer by id and the customer keeps a list of
//! order ids. Both sides are maintained here by hand; nothing stops them
//! drifting apart if a write fails halfway.

use super::{Storage, generate_id, keys};
use crate::Result;
use crate::models::{Order, OrderDraft, OrderPatch, OrderStatus, seed};
use chrono::Utc;

/// Filter for listing orders.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    /// Case-insensitive match against id, shipping name and shipping email
    pub query: Option<String>,
}

impl OrderFilter {
    fn matches(&self, order: &Order) -> bool {
        if let Some(status) = self.status {
            if order.status != status {
                return false;
            }
        }
        match self.query.as_deref().map(str::trim) {
            Some(q) if !q.is_empty() => {
                let q = q.to_lowercase();
                order.id.to_lowercase().contains(&q)
                    || order.shipping_details.full_name.to_lowercase().contains(&q)
                    || order.shipping_details.email.to_lowercase().contains(&q)
            }
            _ => true,
        }
    }
}

impl Storage {
    // === Order Operations ===

    /// All orders, seeding the demo orders on first use.
    pub fn orders(&mut self) -> Result<Vec<Order>> {
        self.load_or_seed(keys::ORDERS, seed::orders)
    }

    /// Get an order by ID.
    pub fn order(&mut self, id: &str) -> Result<Option<Order>> {
        Ok(self.orders()?.into_iter().find(|o| o.id == id))
    }

    /// Orders matching `filter`, in stored order.
    pub fn list_orders(&mut self, filter: &OrderFilter) -> Result<Vec<Order>> {
        Ok(self
            .orders()?
            .into_iter()
            .filter(|o| filter.matches(o))
            .collect())
    }

    /// Add a new order and record it on its customer, if that customer exists.
    pub fn add_order(&mut self, draft: OrderDraft) -> Result<Order> {
        let mut orders = self.orders()?;
        let mut customers = self.customers()?;

        let id = generate_id("order", |candidate| orders.iter().any(|o| o.id == candidate));
        let now = Utc::now();
        let order = Order {
            id,
            customer_id: draft.customer_id,
            items: draft.items,
            shipping_details: draft.shipping_details,
            total_amount: draft.total_amount,
            status: draft.status,
            payment_status: draft.payment_status,
            created_at: now,
            updated_at: now,
        };

        orders.push(order.clone());
        self.write_json(keys::ORDERS, &orders)?;

        if let Some(customer) = customers.iter_mut().find(|c| c.id == order.customer_id) {
            customer.orders.push(order.id.clone());
            self.write_json(keys::CUSTOMERS, &customers)?;
        } else {
            tracing::warn!(order = %order.id, customer = %order.customer_id, "order placed for unknown customer");
        }

        tracing::info!(id = %order.id, total = order.total_amount, "added order");
        Ok(order)
    }

    /// Merge `patch` into an order and refresh its `updated_at`.
    pub fn update_order(&mut self, id: &str, patch: OrderPatch) -> Result<Option<Order>> {
        let mut orders = self.orders()?;
        let Some(order) = orders.iter_mut().find(|o| o.id == id) else {
            return Ok(None);
        };

        patch.apply(order);
        order.updated_at = Utc::now();
        let updated = order.clone();

        self.write_json(keys::ORDERS, &orders)?;
        tracing::info!(id, status = %updated.status, payment = %updated.payment_status, "updated order");
        Ok(Some(updated))
    }

    /// Delete an order, first removing it from its customer's order list.
    pub fn delete_order(&mut self, id: &str) -> Result<bool> {
        let orders = self.orders()?;
        let Some(order) = orders.iter().find(|o| o.id == id) else {
            return Ok(false);
        };

        let mut customers = self.customers()?;
        if let Some(customer) = customers.iter_mut().find(|c| c.id == order.customer_id) {
            customer.orders.retain(|o| o != id);
            self.write_json(keys::CUSTOMERS, &customers)?;
        }

        let remaining: Vec<Order> = orders.into_iter().filter(|o| o.id != id).collect();
        self.write_json(keys::ORDERS, &remaining)?;
        tracing::info!(id, "deleted order");
        Ok(true)
    }
}
