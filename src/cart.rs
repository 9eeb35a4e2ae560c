//! Shopping cart persisted under the `cart` key.
//!
//! Cart lines hold a snapshot of the product as it was when added; later
//! catalog edits do not reach items already in the cart.

use crate::Result;
use crate::models::{CartItem, Product, items_subtotal};
use crate::storage::{Storage, keys};

impl Storage {
    // === Cart Operations ===

    /// Current cart lines. Absent or unreadable carts are empty.
    pub fn cart(&self) -> Result<Vec<CartItem>> {
        match self.read_json::<Vec<CartItem>>(keys::CART) {
            Ok(items) => Ok(items.unwrap_or_default()),
            Err(crate::Error::Json(e)) => {
                tracing::warn!(error = %e, "stored cart is not valid JSON; treating as empty");
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    /// Add `quantity` of a product, merging with an existing line.
    pub fn add_to_cart(&mut self, product: Product, quantity: u32) -> Result<Vec<CartItem>> {
        let mut items = self.cart()?;
        match items.iter_mut().find(|i| i.product.id == product.id) {
            Some(line) => line.quantity = line.quantity.saturating_add(quantity),
            None => items.push(CartItem::new(product, quantity)),
        }
        self.write_json(keys::CART, &items)?;
        Ok(items)
    }

    /// Set a line's quantity; 0 removes the line. False when the product is
    /// not in the cart.
    pub fn set_cart_quantity(&mut self, product_id: &str, quantity: u32) -> Result<bool> {
        if quantity == 0 {
            return self.remove_from_cart(product_id);
        }
        let mut items = self.cart()?;
        let Some(line) = items.iter_mut().find(|i| i.product.id == product_id) else {
            return Ok(false);
        };
        line.quantity = quantity;
        self.write_json(keys::CART, &items)?;
        Ok(true)
    }

    /// Remove a product's line from the cart.
    pub fn remove_from_cart(&mut self, product_id: &str) -> Result<bool> {
        let items = self.cart()?;
        let before = items.len();
        let remaining: Vec<CartItem> = items
            .into_iter()
            .filter(|i| i.product.id != product_id)
            .collect();
        if remaining.len() == before {
            return Ok(false);
        }
        self.write_json(keys::CART, &remaining)?;
        Ok(true)
    }

    pub fn clear_cart(&mut self) -> Result<()> {
        self.remove_item(keys::CART)
    }

    /// Sum of price times quantity, rounded to cents.
    pub fn cart_subtotal(&self) -> Result<f64> {
        Ok(items_subtotal(&self.cart()?))
    }

    /// Total number of units across all lines.
    pub fn cart_item_count(&self) -> Result<u32> {
        Ok(self.cart()?.iter().map(|i| i.quantity).sum())
    }
}

#[cfg(test)]
mod tests {
    use crate::models::seed;
    use crate::storage::{Storage, keys};

    #[test]
    fn test_empty_cart() {
        let storage = Storage::in_memory();
        assert!(storage.cart().unwrap().is_empty());
        assert_eq!(storage.cart_subtotal().unwrap(), 0.0);
        assert_eq!(storage.cart_item_count().unwrap(), 0);
    }

    #[test]
    fn test_add_merges_lines() {
        let mut storage = Storage::in_memory();
        let products = seed::products();
        storage.add_to_cart(products[0].clone(), 1).unwrap();
        storage.add_to_cart(products[1].clone(), 2).unwrap();
        let items = storage.add_to_cart(products[0].clone(), 2).unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].quantity, 3);
        assert_eq!(storage.cart_item_count().unwrap(), 5);
    }

    #[test]
    fn test_set_quantity_and_remove() {
        let mut storage = Storage::in_memory();
        let products = seed::products();
        storage.add_to_cart(products[0].clone(), 1).unwrap();
        storage.add_to_cart(products[1].clone(), 1).unwrap();

        assert!(storage.set_cart_quantity(&products[0].id, 4).unwrap());
        assert_eq!(storage.cart().unwrap()[0].quantity, 4);

        assert!(storage.set_cart_quantity(&products[1].id, 0).unwrap());
        assert_eq!(storage.cart().unwrap().len(), 1);

        assert!(!storage.set_cart_quantity("missing", 2).unwrap());
        assert!(!storage.remove_from_cart("missing").unwrap());
    }

    #[test]
    fn test_subtotal_and_clear() {
        let mut storage = Storage::in_memory();
        let mut a = seed::products().remove(0);
        a.price = 129.99;
        let mut b = seed::products().remove(1);
        b.price = 49.99;
        storage.add_to_cart(a, 1).unwrap();
        storage.add_to_cart(b, 2).unwrap();
        assert_eq!(storage.cart_subtotal().unwrap(), 229.97);

        storage.clear_cart().unwrap();
        assert!(storage.get_item(keys::CART).unwrap().is_none());
        assert!(storage.cart().unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_cart_reads_empty() {
        let mut storage = Storage::in_memory();
        storage.set_item(keys::CART, "{oops").unwrap();
        assert!(storage.cart().unwrap().is_empty());
    }
}
