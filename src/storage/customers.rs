//! Customer collection accessors.

use super::{Storage, generate_id, keys};
use crate::Result;
use crate::models::{Customer, CustomerDraft, CustomerPatch, Order, round_cents, seed};
use chrono::Utc;
use serde::Serialize;

/// Order totals for one customer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerSummary {
    pub customer: Customer,
    /// Orders resolved from the customer's back-references
    pub orders: Vec<Order>,
    pub total_spent: f64,
    pub average_order_value: f64,
}

impl Storage {
    // === Customer Operations ===

    /// All customers, seeding the demo customers on first use.
    pub fn customers(&mut self) -> Result<Vec<Customer>> {
        self.load_or_seed(keys::CUSTOMERS, seed::customers)
    }

    /// Get a customer by ID.
    pub fn customer(&mut self, id: &str) -> Result<Option<Customer>> {
        Ok(self.customers()?.into_iter().find(|c| c.id == id))
    }

    /// Get a customer by email, ignoring ASCII case.
    pub fn customer_by_email(&mut self, email: &str) -> Result<Option<Customer>> {
        Ok(self
            .customers()?
            .into_iter()
            .find(|c| c.email.eq_ignore_ascii_case(email)))
    }

    /// Add a customer, or return the existing one with the same email.
    pub fn add_customer(&mut self, draft: CustomerDraft) -> Result<Customer> {
        if let Some(existing) = self.customer_by_email(&draft.email)? {
            tracing::debug!(id = %existing.id, "customer with this email already exists");
            return Ok(existing);
        }

        let mut customers = self.customers()?;
        let id = generate_id("customer", |candidate| {
            customers.iter().any(|c| c.id == candidate)
        });
        let customer = Customer {
            id,
            full_name: draft.full_name,
            email: draft.email,
            phone: draft.phone,
            address: draft.address,
            city: draft.city,
            postal_code: draft.postal_code,
            country: draft.country,
            orders: Vec::new(),
            created_at: Utc::now(),
        };

        customers.push(customer.clone());
        self.write_json(keys::CUSTOMERS, &customers)?;
        tracing::info!(id = %customer.id, "added customer");

        Ok(customer)
    }

    /// Merge `patch` into a customer. `None` when it does not exist.
    pub fn update_customer(&mut self, id: &str, patch: CustomerPatch) -> Result<Option<Customer>> {
        let mut customers = self.customers()?;
        let Some(customer) = customers.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };

        patch.apply(customer);
        let updated = customer.clone();

        self.write_json(keys::CUSTOMERS, &customers)?;
        tracing::info!(id, "updated customer");
        Ok(Some(updated))
    }

    /// Delete a customer together with every order that names them.
    ///
    /// Orders are removed one at a time before the customer record; an
    /// interruption part way leaves the customer with fewer orders. Returns
    /// false when no customer with this id was stored.
    pub fn delete_customer(&mut self, id: &str) -> Result<bool> {
        let owned: Vec<String> = self
            .orders()?
            .into_iter()
            .filter(|o| o.customer_id == id)
            .map(|o| o.id)
            .collect();
        for order_id in &owned {
            self.delete_order(order_id)?;
        }

        let customers = self.customers()?;
        let before = customers.len();
        let remaining: Vec<Customer> = customers.into_iter().filter(|c| c.id != id).collect();
        if remaining.len() == before {
            return Ok(false);
        }

        self.write_json(keys::CUSTOMERS, &remaining)?;
        tracing::info!(id, orders = owned.len(), "deleted customer and their orders");
        Ok(true)
    }

    /// Case-insensitive search over name, email, phone and city.
    pub fn search_customers(&mut self, query: &str) -> Result<Vec<Customer>> {
        let needle = query.trim().to_lowercase();
        let customers = self.customers()?;
        if needle.is_empty() {
            return Ok(customers);
        }
        Ok(customers
            .into_iter()
            .filter(|c| {
                c.full_name.to_lowercase().contains(&needle)
                    || c.email.to_lowercase().contains(&needle)
                    || c.phone.to_lowercase().contains(&needle)
                    || c.city.to_lowercase().contains(&needle)
            })
            .collect())
    }

    /// Resolve a customer's order back-references, skipping ids that no
    /// longer exist. `None` when the customer does not exist.
    pub fn customer_orders(&mut self, id: &str) -> Result<Option<Vec<Order>>> {
        let Some(customer) = self.customer(id)? else {
            return Ok(None);
        };
        let all = self.orders()?;
        Ok(Some(
            customer
                .orders
                .iter()
                .filter_map(|oid| all.iter().find(|o| &o.id == oid).cloned())
                .collect(),
        ))
    }

    /// A customer with their resolved orders and spend totals.
    pub fn customer_summary(&mut self, id: &str) -> Result<Option<CustomerSummary>> {
        let Some(customer) = self.customer(id)? else {
            return Ok(None);
        };
        let orders = self.customer_orders(id)?.unwrap_or_default();

        let total: f64 = orders.iter().map(|o| o.total_amount).sum();
        let average = if orders.is_empty() {
            0.0
        } else {
            total / orders.len() as f64
        };

        Ok(Some(CustomerSummary {
            customer,
            orders,
            total_spent: round_cents(total),
            average_order_value: round_cents(average),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CartItem, OrderDraft, OrderStatus, PaymentStatus, ShippingDetails};

    fn draft(name: &str, email: &str) -> CustomerDraft {
        CustomerDraft {
            full_name: name.to_string(),
            email: email.to_string(),
            phone: "+1 555-000-0000".to_string(),
            address: "1 Elm St".to_string(),
            city: "Portland".to_string(),
            postal_code: "97201".to_string(),
            country: "us".to_string(),
        }
    }

    #[test]
    fn test_customer_by_email_ignores_case() {
        let mut storage = Storage::in_memory();
        let found = storage.customer_by_email("JOHN.DOE@Example.com").unwrap().unwrap();
        assert_eq!(found.id, "customer-1");
        assert!(storage.customer_by_email("nobody@example.com").unwrap().is_none());
    }

    #[test]
    fn test_add_customer_keeps_records_without_timestamps() {
        let mut storage = Storage::in_memory();
        storage
            .set_item(
                keys::CUSTOMERS,
                r#"[{"id":"c-real","fullName":"Real Person","email":"real@x.com","orders":[]}]"#,
            )
            .unwrap();
        storage.add_customer(draft("Ada Lovelace", "ada@example.com")).unwrap();

        let ids: Vec<String> = storage.customers().unwrap().into_iter().map(|c| c.id).collect();
        assert_eq!(ids.len(), 2);
        assert_eq!(ids[0], "c-real");
        let raw = storage.get_item(keys::CUSTOMERS).unwrap().unwrap();
        assert!(raw.contains("Real Person"));
    }

    #[test]
    fn test_add_customer_new() {
        let mut storage = Storage::in_memory();
        let customer = storage.add_customer(draft("Ada Lovelace", "ada@example.com")).unwrap();
        assert!(customer.id.starts_with("customer-"));
        assert!(customer.orders.is_empty());
        assert_eq!(storage.customers().unwrap().len(), 4);
    }

    #[test]
    fn test_add_customer_dedupes_by_email() {
        let mut storage = Storage::in_memory();
        let customer = storage
            .add_customer(draft("Someone Else", "Jane.Smith@example.com"))
            .unwrap();
        assert_eq!(customer.id, "customer-2");
        assert_eq!(customer.full_name, "Jane Smith");
        assert_eq!(storage.customers().unwrap().len(), 3);
    }

    #[test]
    fn test_update_customer() {
        let mut storage = Storage::in_memory();
        let updated = storage
            .update_customer(
                "customer-3",
                CustomerPatch {
                    phone: Some("+1 555-111-2222".to_string()),
                    ..Default::default()
                },
            )
            .unwrap()
            .unwrap();
        assert_eq!(updated.phone, "+1 555-111-2222");
        assert_eq!(updated.orders, vec!["order-3".to_string()]);
        assert!(storage.update_customer("customer-x", CustomerPatch::default()).unwrap().is_none());
    }

    #[test]
    fn test_delete_customer_cascades_orders() {
        let mut storage = Storage::in_memory();
        // A second order for customer-1
        let product = crate::models::seed::products().remove(2);
        let extra = storage
            .add_order(OrderDraft {
                customer_id: "customer-1".to_string(),
                items: vec![CartItem::new(product, 1)],
                shipping_details: ShippingDetails::default(),
                total_amount: 69.99,
                status: OrderStatus::Pending,
                payment_status: PaymentStatus::Pending,
            })
            .unwrap();

        assert!(storage.delete_customer("customer-1").unwrap());
        assert!(storage.customer("customer-1").unwrap().is_none());
        assert!(storage.order("order-1").unwrap().is_none());
        assert!(storage.order(&extra.id).unwrap().is_none());
        assert_eq!(storage.orders().unwrap().len(), 2);
    }

    #[test]
    fn test_delete_missing_customer_still_removes_orphan_orders() {
        let mut storage = Storage::in_memory();
        storage.update_order("order-2", crate::models::OrderPatch {
            customer_id: Some("ghost".to_string()),
            ..Default::default()
        }).unwrap();

        assert!(!storage.delete_customer("ghost").unwrap());
        assert!(storage.order("order-2").unwrap().is_none());
    }

    #[test]
    fn test_search_customers() {
        let mut storage = Storage::in_memory();
        assert_eq!(storage.search_customers("chicago").unwrap()[0].id, "customer-3");
        assert_eq!(storage.search_customers("555-987").unwrap()[0].id, "customer-2");
        assert_eq!(storage.search_customers("").unwrap().len(), 3);
        assert!(storage.search_customers("zzz").unwrap().is_empty());
    }

    #[test]
    fn test_customer_summary_skips_dangling_orders() {
        let mut storage = Storage::in_memory();
        storage
            .update_customer(
                "customer-1",
                CustomerPatch {
                    orders: Some(vec!["order-1".to_string(), "order-gone".to_string()]),
                    ..Default::default()
                },
            )
            .unwrap();

        let summary = storage.customer_summary("customer-1").unwrap().unwrap();
        assert_eq!(summary.orders.len(), 1);
        assert_eq!(summary.total_spent, 229.97);
        assert_eq!(summary.average_order_value, 229.97);
        assert!(storage.customer_summary("customer-9").unwrap().is_none());
    }
}
