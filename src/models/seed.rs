//! Seed records written on first read of an empty store.

use super::{
    CartItem, Customer, Order, OrderStatus, PaymentStatus, Product, ShippingDetails,
};
use chrono::{DateTime, NaiveDate, Utc};

const PLACEHOLDER_IMAGE: &str = "/placeholder.svg?height=600&width=600";

fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(y, m, d)
        .and_then(|date| date.and_hms_opt(h, min, 0))
        .map(|naive| naive.and_utc())
        .unwrap_or_default()
}

fn product(id: &str, name: &str, price: f64, description: &str, category: &str) -> Product {
    Product {
        id: id.to_string(),
        name: name.to_string(),
        price,
        image: PLACEHOLDER_IMAGE.to_string(),
        description: description.to_string(),
        source_url: format!("https://example.com/original-product-{}", id),
        category: category.to_string(),
    }
}

/// The six demo products.
pub fn products() -> Vec<Product> {
    vec![
        product(
            "1",
            "Designer Tote Bag",
            129.99,
            "A stylish tote bag perfect for everyday use.",
            "bags",
        ),
        product(
            "2",
            "Leather Crossbody",
            89.99,
            "Elegant crossbody bag made from premium leather.",
            "bags",
        ),
        product(
            "3",
            "Canvas Backpack",
            69.99,
            "Durable canvas backpack with multiple compartments.",
            "bags",
        ),
        product(
            "4",
            "Digital SLR Camera",
            899.99,
            "Professional digital SLR camera with 24MP sensor.",
            "cameras",
        ),
        product(
            "5",
            "Mirrorless Camera",
            799.99,
            "Compact mirrorless camera with 4K video capability.",
            "cameras",
        ),
        product(
            "6",
            "Camera Lens Filter",
            49.99,
            "Professional UV filter for camera lenses.",
            "accessories",
        ),
    ]
}

fn seed_product(id: &str) -> Product {
    products()
        .into_iter()
        .find(|p| p.id == id)
        .unwrap_or_else(|| product(id, "Unknown", 0.0, "", ""))
}

struct Person {
    name: &'static str,
    email: &'static str,
    phone: &'static str,
    address: &'static str,
    city: &'static str,
    postal_code: &'static str,
}

const PEOPLE: [Person; 3] = [
    Person {
        name: "John Doe",
        email: "john.doe@example.com",
        phone: "+1 555-123-4567",
        address: "123 Main St",
        city: "New York",
        postal_code: "10001",
    },
    Person {
        name: "Jane Smith",
        email: "jane.smith@example.com",
        phone: "+1 555-987-6543",
        address: "456 Oak Ave",
        city: "Los Angeles",
        postal_code: "90001",
    },
    Person {
        name: "Robert Johnson",
        email: "robert.johnson@example.com",
        phone: "+1 555-456-7890",
        address: "789 Pine St",
        city: "Chicago",
        postal_code: "60007",
    },
];

fn shipping(p: &Person) -> ShippingDetails {
    ShippingDetails {
        full_name: p.name.to_string(),
        address: p.address.to_string(),
        city: p.city.to_string(),
        postal_code: p.postal_code.to_string(),
        country: "us".to_string(),
        phone: p.phone.to_string(),
        email: p.email.to_string(),
    }
}

/// Three demo orders, one per demo customer.
pub fn orders() -> Vec<Order> {
    vec![
        Order {
            id: "order-1".to_string(),
            customer_id: "customer-1".to_string(),
            items: vec![
                CartItem::new(seed_product("1"), 1),
                CartItem::new(seed_product("6"), 2),
            ],
            shipping_details: shipping(&PEOPLE[0]),
            total_amount: 229.97,
            status: OrderStatus::Delivered,
            payment_status: PaymentStatus::Paid,
            created_at: at(2023, 12, 15, 10, 30),
            updated_at: at(2023, 12, 18, 14, 20),
        },
        Order {
            id: "order-2".to_string(),
            customer_id: "customer-2".to_string(),
            items: vec![CartItem::new(seed_product("4"), 1)],
            shipping_details: shipping(&PEOPLE[1]),
            total_amount: 899.99,
            status: OrderStatus::Shipped,
            payment_status: PaymentStatus::Paid,
            created_at: at(2024, 1, 5, 15, 45),
            updated_at: at(2024, 1, 7, 9, 10),
        },
        Order {
            id: "order-3".to_string(),
            customer_id: "customer-3".to_string(),
            items: vec![
                CartItem::new(seed_product("2"), 1),
                CartItem::new(seed_product("5"), 1),
            ],
            shipping_details: shipping(&PEOPLE[2]),
            total_amount: 889.98,
            status: OrderStatus::Processing,
            payment_status: PaymentStatus::Paid,
            created_at: at(2024, 2, 20, 8, 15),
            updated_at: at(2024, 2, 20, 8, 15),
        },
    ]
}

/// Three demo customers matching the demo orders.
pub fn customers() -> Vec<Customer> {
    let created = [
        at(2023, 12, 10, 8, 30),
        at(2024, 1, 3, 14, 45),
        at(2024, 2, 18, 11, 20),
    ];
    PEOPLE
        .iter()
        .zip(created)
        .enumerate()
        .map(|(i, (p, created_at))| Customer {
            id: format!("customer-{}", i + 1),
            full_name: p.name.to_string(),
            email: p.email.to_string(),
            phone: p.phone.to_string(),
            address: p.address.to_string(),
            city: p.city.to_string(),
            postal_code: p.postal_code.to_string(),
            country: "us".to_string(),
            orders: vec![format!("order-{}", i + 1)],
            created_at,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::items_subtotal;

    #[test]
    fn test_seed_orders_reference_seed_customers() {
        let customers = customers();
        for order in orders() {
            let owner = customers.iter().find(|c| c.id == order.customer_id).unwrap();
            assert!(owner.orders.contains(&order.id));
            assert_eq!(owner.email, order.shipping_details.email);
        }
    }

    #[test]
    fn test_seed_totals_match_items() {
        for order in orders() {
            assert_eq!(items_subtotal(&order.items), order.total_amount);
        }
    }

    #[test]
    fn test_seed_timestamps() {
        let first = &orders()[0];
        assert_eq!(first.created_at.to_rfc3339(), "2023-12-15T10:30:00+00:00");
    }
}
