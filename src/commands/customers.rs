//! Customer commands.

use super::catalog::Deleted;
use super::{Output, json, money, plural};
use crate::models::{Customer, CustomerDraft, CustomerPatch};
use crate::storage::Storage;
use crate::storage::customers::CustomerSummary;
use crate::{Error, Result};
use serde::Serialize;

#[derive(Serialize)]
pub struct CustomerList {
    pub customers: Vec<Customer>,
    pub count: usize,
}

impl Output for CustomerList {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        if self.customers.is_empty() {
            return "No customers found.".to_string();
        }
        let mut lines = vec![format!("{}:", plural(self.count, "customer"))];
        for c in &self.customers {
            lines.push(format!(
                "  [{}] {} <{}> - {}",
                c.id,
                c.full_name,
                c.email,
                plural(c.orders.len(), "order")
            ));
        }
        lines.join("\n")
    }
}

#[derive(Serialize)]
#[serde(transparent)]
pub struct CustomerShow(pub Customer);

impl Output for CustomerShow {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        format_customer(&self.0)
    }
}

fn format_customer(c: &Customer) -> String {
    [
        format!("{} [{}]", c.full_name, c.id),
        format!("  Email:   {}", c.email),
        format!("  Phone:   {}", c.phone),
        format!("  Address: {}, {} {}, {}", c.address, c.city, c.postal_code, c.country),
        format!("  Since:   {}", c.created_at.format("%Y-%m-%d")),
        format!("  Orders:  {}", c.orders.join(", ")),
    ]
    .join("\n")
}

#[derive(Serialize)]
#[serde(transparent)]
pub struct SummaryResult(pub CustomerSummary);

impl Output for SummaryResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let s = &self.0;
        let mut lines = vec![format_customer(&s.customer)];
        lines.push(format!("  Spent:   {} over {}", money(s.total_spent), plural(s.orders.len(), "order")));
        lines.push(format!("  Average: {}", money(s.average_order_value)));
        for o in &s.orders {
            lines.push(format!(
                "    [{}] {} {} ({})",
                o.id,
                money(o.total_amount),
                o.status,
                o.created_at.format("%Y-%m-%d")
            ));
        }
        lines.join("\n")
    }
}

/// Customers, optionally narrowed by a search over name, email, phone and city.
pub fn customer_list(storage: &mut Storage, query: Option<&str>) -> Result<CustomerList> {
    let customers = match query {
        Some(q) => storage.search_customers(q)?,
        None => storage.customers()?,
    };
    Ok(CustomerList {
        count: customers.len(),
        customers,
    })
}

pub fn customer_show(storage: &mut Storage, id: &str) -> Result<CustomerShow> {
    storage
        .customer(id)?
        .map(CustomerShow)
        .ok_or_else(|| Error::NotFound(format!("Customer {}", id)))
}

pub fn customer_summary(storage: &mut Storage, id: &str) -> Result<SummaryResult> {
    storage
        .customer_summary(id)?
        .map(SummaryResult)
        .ok_or_else(|| Error::NotFound(format!("Customer {}", id)))
}

/// Add a customer. An existing customer with the same email is returned as-is.
pub fn customer_add(storage: &mut Storage, draft: CustomerDraft) -> Result<CustomerShow> {
    if draft.full_name.trim().is_empty() || draft.email.trim().is_empty() {
        return Err(Error::InvalidInput(
            "Customer name and email are required".to_string(),
        ));
    }
    Ok(CustomerShow(storage.add_customer(draft)?))
}

pub fn customer_update(storage: &mut Storage, id: &str, patch: CustomerPatch) -> Result<CustomerShow> {
    if patch.is_empty() {
        return Err(Error::InvalidInput("No fields to update".to_string()));
    }
    storage
        .update_customer(id, patch)?
        .map(CustomerShow)
        .ok_or_else(|| Error::NotFound(format!("Customer {}", id)))
}

/// Delete a customer together with every order they own.
pub fn customer_delete(storage: &mut Storage, id: &str) -> Result<Deleted> {
    if !storage.delete_customer(id)? {
        return Err(Error::NotFound(format!("Customer {}", id)));
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
    fn test_list_and_search() {
        let mut storage = Storage::in_memory();
        let all = customer_list(&mut storage, None).unwrap();
        assert_eq!(all.count, 3);

        let jane = customer_list(&mut storage, Some("JANE")).unwrap();
        assert_eq!(jane.count, 1);
        assert_eq!(jane.customers[0].email, "jane.smith@example.com");
    }

    #[test]
    fn test_summary() {
        let mut storage = Storage::in_memory();
        let summary = customer_summary(&mut storage, "customer-1").unwrap().0;
        assert_eq!(summary.customer.id, "customer-1");
        assert!(summary.orders.iter().all(|o| o.customer_id == "customer-1"));
        assert!(matches!(
            customer_summary(&mut storage, "customer-99"),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_add_requires_name_and_email() {
        let mut storage = Storage::in_memory();
        assert!(customer_add(&mut storage, CustomerDraft::default()).is_err());

        let added = customer_add(
            &mut storage,
            CustomerDraft {
                full_name: "Mia Wong".to_string(),
                email: "mia@example.com".to_string(),
                ..Default::default()
            },
        )
        .unwrap()
        .0;
        assert!(added.id.starts_with("customer-"));
        assert!(added.orders.is_empty());
    }

    #[test]
    fn test_update_and_delete() {
        let mut storage = Storage::in_memory();
        let updated = customer_update(
            &mut storage,
            "customer-2",
            CustomerPatch {
                city: Some("Boston".to_string()),
                ..Default::default()
            },
        )
        .unwrap()
        .0;
        assert_eq!(updated.city, "Boston");
        assert!(customer_update(&mut storage, "customer-2", CustomerPatch::default()).is_err());

        customer_delete(&mut storage, "customer-2").unwrap();
        assert!(storage.orders().unwrap().iter().all(|o| o.customer_id != "customer-2"));
        assert!(matches!(
            customer_delete(&mut storage, "customer-2"),
            Err(Error::NotFound(_))
        ));
    }
}
