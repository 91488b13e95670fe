//! # Cart Store
//!
//! Line items and quantities, persisted write-through to a key-value store.
//! Browser storage sits behind the small `KvStore` trait so the store can be
//! exercised against an in-memory implementation.

use crate::error::{CheckoutError, CheckoutResult};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// Fixed storage key for the serialized cart
pub const CART_STORAGE_KEY: &str = "voltride_cart_v1";

/// Clamp a raw quantity into the cart invariant: integer, at least 1.
/// Non-finite input clamps to 1.
pub fn clamp_qty(raw: f64) -> u32 {
    if !raw.is_finite() {
        return 1;
    }
    (raw.floor() as u32).max(1)
}

fn default_qty() -> u32 {
    1
}

fn deserialize_qty<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    Ok(clamp_qty(raw))
}

/// A line item in the cart
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    /// Unique identifier within the cart
    pub id: String,

    /// Display name
    pub name: String,

    /// Unit price in USD
    pub price: f64,

    /// Quantity, always >= 1 (clamped on deserialize)
    #[serde(default = "default_qty", deserialize_with = "deserialize_qty")]
    pub qty: u32,

    /// Optional SKU
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,

    /// Optional image reference
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// Optional canonical product URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl CartItem {
    /// Create an item with required fields only
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: f64, qty: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price: price.max(0.0),
            qty: qty.max(1),
            sku: None,
            image: None,
            url: None,
        }
    }

    /// Builder: set SKU
    pub fn with_sku(mut self, sku: impl Into<String>) -> Self {
        self.sku = Some(sku.into());
        self
    }

    /// Builder: set image reference
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Builder: set canonical URL
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Line total in USD
    pub fn total(&self) -> f64 {
        self.price * self.qty as f64
    }
}

/// Minimal string key-value persistence interface.
///
/// In the browser this is backed by local storage; tests use `MemoryStore`.
pub trait KvStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> CheckoutResult<()>;
}

/// In-memory `KvStore` implementation
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> CheckoutResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// The shopping cart: holds line items, computes totals, persists
/// write-through after every mutation.
///
/// Persistence is an explicit `Result`; callers decide whether a failed
/// write is worth surfacing.
pub struct CartStore<S: KvStore> {
    storage: S,
    items: Vec<CartItem>,
}

impl<S: KvStore> CartStore<S> {
    /// Load the cart from storage, dropping any non-conforming entries.
    pub fn load(storage: S) -> Self {
        let items = storage
            .get(CART_STORAGE_KEY)
            .map(|raw| sanitize_items(&raw))
            .unwrap_or_default();
        Self { storage, items }
    }

    /// Create an empty cart on top of the given storage
    pub fn empty(storage: S) -> Self {
        Self {
            storage,
            items: Vec::new(),
        }
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total quantity across all line items
    pub fn count_items(&self) -> u32 {
        self.items.iter().map(|it| it.qty).sum()
    }

    /// Cart total in USD
    pub fn total_usd(&self) -> f64 {
        self.items.iter().map(CartItem::total).sum()
    }

    /// Add an item. If an item with the same id exists, quantities are
    /// summed instead of creating a second entry.
    pub fn add_item(&mut self, item: CartItem) -> CheckoutResult<()> {
        match self.items.iter_mut().find(|it| it.id == item.id) {
            Some(existing) => {
                existing.qty = existing.qty.saturating_add(item.qty.max(1));
            }
            None => {
                let mut item = item;
                item.qty = item.qty.max(1);
                self.items.push(item);
            }
        }
        self.save()
    }

    /// Set the quantity of an existing item (clamped to >= 1).
    /// Unknown ids are a no-op, matching the forgiving storefront behavior.
    pub fn set_qty(&mut self, id: &str, qty: f64) -> CheckoutResult<()> {
        let clamped = clamp_qty(qty);
        if let Some(item) = self.items.iter_mut().find(|it| it.id == id) {
            item.qty = clamped;
        }
        self.save()
    }

    /// Remove a single item by id
    pub fn remove_item(&mut self, id: &str) -> CheckoutResult<()> {
        self.items.retain(|it| it.id != id);
        self.save()
    }

    /// Remove all items
    pub fn clear(&mut self) -> CheckoutResult<()> {
        self.items.clear();
        self.save()
    }

    /// Persist the current items under the fixed storage key
    pub fn save(&mut self) -> CheckoutResult<()> {
        let serialized = serde_json::to_string(&self.items)
            .map_err(|e| CheckoutError::Serialization(e.to_string()))?;
        self.storage.set(CART_STORAGE_KEY, &serialized)
    }
}

/// Parse and sanitize a persisted cart payload.
///
/// Entries must carry a non-empty id and name; price coerces to a
/// non-negative number (default 0), quantity clamps to >= 1. Anything else
/// is dropped rather than failing the whole load.
fn sanitize_items(raw: &str) -> Vec<CartItem> {
    let parsed: serde_json::Value = match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(_) => return Vec::new(),
    };

    let entries = match parsed.as_array() {
        Some(arr) => arr,
        None => return Vec::new(),
    };

    entries
        .iter()
        .filter_map(|entry| {
            let id = coerce_string(entry.get("id")?)?;
            let name = entry
                .get("name")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string();
            if id.is_empty() || name.is_empty() {
                return None;
            }

            let price = entry
                .get("price")
                .and_then(|v| v.as_f64())
                .unwrap_or(0.0)
                .max(0.0);
            let qty = clamp_qty(entry.get("qty").and_then(|v| v.as_f64()).unwrap_or(1.0));

            Some(CartItem {
                id,
                name,
                price,
                qty,
                sku: entry.get("sku").and_then(coerce_opt_string),
                image: entry.get("image").and_then(coerce_opt_string),
                url: entry.get("url").and_then(coerce_opt_string),
            })
        })
        .collect()
}

fn coerce_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn coerce_opt_string(value: &serde_json::Value) -> Option<String> {
    coerce_string(value).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scooter() -> CartItem {
        CartItem::new("5", "Volt Scooter X", 1500.0, 1).with_sku("VX-500")
    }

    #[test]
    fn test_clamp_qty() {
        assert_eq!(clamp_qty(0.0), 1);
        assert_eq!(clamp_qty(-3.0), 1);
        assert_eq!(clamp_qty(2.9), 2);
        assert_eq!(clamp_qty(f64::NAN), 1);
        assert_eq!(clamp_qty(f64::INFINITY), 1);
    }

    #[test]
    fn test_add_same_id_merges() {
        let mut cart = CartStore::empty(MemoryStore::new());
        cart.add_item(scooter()).unwrap();
        cart.add_item(scooter()).unwrap();

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].qty, 2);
        assert_eq!(cart.count_items(), 2);
    }

    #[test]
    fn test_total_usd() {
        let mut cart = CartStore::empty(MemoryStore::new());
        cart.add_item(scooter()).unwrap();
        cart.add_item(CartItem::new("7", "Helmet", 49.99, 2)).unwrap();

        assert!((cart.total_usd() - 1599.98).abs() < 1e-9);
    }

    #[test]
    fn test_set_qty_and_remove() {
        let mut cart = CartStore::empty(MemoryStore::new());
        cart.add_item(scooter()).unwrap();

        cart.set_qty("5", 0.0).unwrap();
        assert_eq!(cart.items()[0].qty, 1);

        cart.set_qty("5", 4.0).unwrap();
        assert_eq!(cart.items()[0].qty, 4);

        cart.remove_item("5").unwrap();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_persistence_roundtrip() {
        let mut storage = MemoryStore::new();
        {
            let mut cart = CartStore::empty(storage.clone());
            cart.add_item(scooter()).unwrap();
            storage = cart.storage;
        }

        let reloaded = CartStore::load(storage);
        assert_eq!(reloaded.items().len(), 1);
        assert_eq!(reloaded.items()[0].id, "5");
        assert_eq!(reloaded.items()[0].sku.as_deref(), Some("VX-500"));
    }

    #[test]
    fn test_load_drops_malformed_entries() {
        let mut storage = MemoryStore::new();
        storage
            .set(
                CART_STORAGE_KEY,
                r#"[
                    {"id": "1", "name": "Good", "price": 10, "qty": 2},
                    {"id": "", "name": "No id", "price": 10, "qty": 1},
                    {"id": "3", "price": 10, "qty": 1},
                    {"id": 4, "name": "Numeric id", "price": "weird", "qty": -5},
                    "not an object"
                ]"#,
            )
            .unwrap();

        let cart = CartStore::load(storage);
        assert_eq!(cart.items().len(), 2);
        assert_eq!(cart.items()[0].qty, 2);
        // Numeric id coerced, bad price defaults to 0, qty clamped
        assert_eq!(cart.items()[1].id, "4");
        assert_eq!(cart.items()[1].price, 0.0);
        assert_eq!(cart.items()[1].qty, 1);
    }

    #[test]
    fn test_load_non_array_payload() {
        let mut storage = MemoryStore::new();
        storage.set(CART_STORAGE_KEY, r#"{"not": "a cart"}"#).unwrap();
        assert!(CartStore::load(storage).is_empty());

        let mut storage = MemoryStore::new();
        storage.set(CART_STORAGE_KEY, "garbage{{").unwrap();
        assert!(CartStore::load(storage).is_empty());
    }

    #[test]
    fn test_save_error_surfaces() {
        struct FailingStore;
        impl KvStore for FailingStore {
            fn get(&self, _key: &str) -> Option<String> {
                None
            }
            fn set(&mut self, _key: &str, _value: &str) -> CheckoutResult<()> {
                Err(CheckoutError::Storage("quota exceeded".into()))
            }
        }

        let mut cart = CartStore::empty(FailingStore);
        let err = cart.add_item(scooter()).unwrap_err();
        assert!(matches!(err, CheckoutError::Storage(_)));
        // The mutation itself still applied
        assert_eq!(cart.items().len(), 1);
    }
}
