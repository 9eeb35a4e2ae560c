//! Order commands.

use super::catalog::Deleted;
use super::{Output, json, money, plural};
use crate::models::{Order, OrderPatch, OrderStatus, PaymentStatus};
use crate::storage::Storage;
use crate::storage::orders::OrderFilter;
use crate::{Error, Result};
use serde::Serialize;

#[derive(Serialize)]
pub struct OrderList {
    pub orders: Vec<Order>,
    pub count: usize,
}

impl Output for OrderList {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        if self.orders.is_empty() {
            return "No orders found.".to_string();
        }
        let mut lines = vec![format!("{}:", plural(self.count, "order"))];
        for o in &self.orders {
            lines.push(format!(
                "  [{}] {} - {} {}/{} ({})",
                o.id,
                o.shipping_details.full_name,
                money(o.total_amount),
                o.status,
                o.payment_status,
                o.created_at.format("%Y-%m-%d")
            ));
        }
        lines.join("\n")
    }
}

#[derive(Serialize)]
#[serde(transparent)]
pub struct OrderShow(pub Order);

impl Output for OrderShow {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        format_order(&self.0)
    }
}

/// Multi-line order summary shared with checkout output.
pub(crate) fn format_order(o: &Order) -> String {
    let s = &o.shipping_details;
    let mut lines = vec![
        format!("Order {}", o.id),
        format!("  Status:   {} (payment {})", o.status, o.payment_status),
        format!("  Customer: {}", o.customer_id),
        format!("  Placed:   {}", o.created_at.format("%Y-%m-%d %H:%M:%S UTC")),
        format!("  Ship to:  {} <{}>, {}", s.full_name, s.email, s.phone),
        format!("            {}, {} {}, {}", s.address, s.city, s.postal_code, s.country),
        "  Items:".to_string(),
    ];
    for item in &o.items {
        lines.push(format!(
            "    {} x {} @ {}",
            item.quantity,
            item.product.name,
            money(item.product.price)
        ));
    }
    lines.push(format!("  Total:    {}", money(o.total_amount)));
    lines.join("\n")
}

/// Orders filtered by status and a free-text query.
pub fn order_list(storage: &mut Storage, status: Option<&str>, query: Option<&str>) -> Result<OrderList> {
    let filter = OrderFilter {
        status: status.map(str::parse::<OrderStatus>).transpose()?,
        query: query.map(str::to_string),
    };
    let orders = storage.list_orders(&filter)?;
    Ok(OrderList {
        count: orders.len(),
        orders,
    })
}

pub fn order_show(storage: &mut Storage, id: &str) -> Result<OrderShow> {
    storage
        .order(id)?
        .map(OrderShow)
        .ok_or_else(|| Error::NotFound(format!("Order {}", id)))
}

/// Change an order's fulfilment and/or payment status.
pub fn order_update(
    storage: &mut Storage,
    id: &str,
    status: Option<&str>,
    payment_status: Option<&str>,
) -> Result<OrderShow> {
    let patch = OrderPatch {
        status: status.map(str::parse::<OrderStatus>).transpose()?,
        payment_status: payment_status.map(str::parse::<PaymentStatus>).transpose()?,
        ..Default::default()
    };
    if patch.is_empty() {
        return Err(Error::InvalidInput("No fields to update".to_string()));
    }
    storage
        .update_order(id, patch)?
        .map(OrderShow)
        .ok_or_else(|| Error::NotFound(format!("Order {}", id)))
}

pub fn order_delete(storage: &mut Storage, id: &str) -> Result<Deleted> {
    if !storage.delete_order(id)? {
        return Err(Error::NotFound(format!("Order {}", id)));
    }
    Ok(Deleted {
        id: id.to_string(),
        deleted: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_status() {
        let mut storage = Storage::in_memory();
        let id = storage.orders().unwrap()[0].id.clone();

        let updated = order_update(&mut storage, &id, Some("shipped"), Some("paid")).unwrap().0;
        assert_eq!(updated.status, OrderStatus::Shipped);
        assert_eq!(updated.payment_status, PaymentStatus::Paid);

        assert!(matches!(
            order_update(&mut storage, &id, None, None),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            order_update(&mut storage, &id, Some("lost"), None),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            order_update(&mut storage, "order-0", Some("pending"), None),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_list_by_status() {
        let mut storage = Storage::in_memory();
        let id = storage.orders().unwrap()[0].id.clone();
        order_update(&mut storage, &id, Some("delivered"), None).unwrap();

        let delivered = order_list(&mut storage, Some("delivered"), None).unwrap();
        assert!(delivered.orders.iter().any(|o| o.id == id));
        assert!(delivered.orders.iter().all(|o| o.status == OrderStatus::Delivered));
    }

    #[test]
    fn test_show_and_delete() {
        let mut storage = Storage::in_memory();
        let id = storage.orders().unwrap()[0].id.clone();
        assert!(order_show(&mut storage, &id).unwrap().to_human().contains(&id));

        order_delete(&mut storage, &id).unwrap();
        assert!(matches!(order_show(&mut storage, &id), Err(Error::NotFound(_))));
        assert!(order_delete(&mut storage, &id).is_err());
    }
}
