//! Cart persistence: the whole cache is one record (`carts` / `active_carts`)
//! whose `carts` field maps user ids to cart snapshots.

use serde_json::{Map, Value as JsonValue};
use tracing::{debug, warn};

use webstore_cart::{Cart, CartSnapshot};
use webstore_core::UserId;

use super::CartEngine;
use crate::storage::{Record, StorageBackend};

pub const CARTS: &str = "carts";
pub const CARTS_RECORD_ID: &str = "active_carts";

impl<S> CartEngine<S>
where
    S: StorageBackend,
{
    /// Write every cached cart. Failures are logged; the cache stays authoritative.
    pub fn save_all_carts(&self) -> bool {
        let mut carts = Map::new();
        for (user_id, cart) in &self.carts {
            match serde_json::to_value(cart.snapshot()) {
                Ok(value) => {
                    carts.insert(user_id.to_string(), value);
                }
                Err(err) => warn!(user_id = %user_id, error = %err, "could not encode cart"),
            }
        }

        let mut record = Record::new();
        record.insert("id".into(), JsonValue::from(CARTS_RECORD_ID));
        record.insert("carts".into(), JsonValue::Object(carts));

        let saved = self.store.save(CARTS, record);
        if !saved {
            warn!(carts = self.carts.len(), "failed to persist carts");
        }
        saved
    }

    /// Restore persisted carts into the cache and mark the engine as loaded.
    ///
    /// Users already present in the cache keep their in-memory cart. Returns
    /// the number of carts restored.
    pub fn load_carts(&mut self) -> usize {
        self.loaded = true;

        let Some(record) = self.store.load_by_id(CARTS, CARTS_RECORD_ID) else {
            return 0;
        };
        let stored = match record.get("carts") {
            Some(JsonValue::Object(stored)) => stored,
            Some(JsonValue::Null) | None => return 0,
            Some(_) => {
                warn!("stored carts are not an object; starting with no carts");
                return 0;
            }
        };

        let mut restored = 0;
        for (key, value) in stored {
            let user_id = UserId::new(key.as_str());
            if self.carts.contains_key(&user_id) {
                continue;
            }
            let snapshot: CartSnapshot = match serde_json::from_value(value.clone()) {
                Ok(snapshot) => snapshot,
                Err(err) => {
                    warn!(user_id = %user_id, error = %err, "skipping unreadable cart");
                    continue;
                }
            };
            let cart = rebuild(user_id.clone(), snapshot);
            self.carts.insert(user_id, cart);
            restored += 1;
        }
        debug!(restored, "carts loaded");
        restored
    }
}

/// Replay each stored line through `add_item`, so duplicate lines merge and
/// bad quantities are dropped rather than trusted.
fn rebuild(user_id: UserId, snapshot: CartSnapshot) -> Cart {
    let mut cart = Cart::with_created_at(user_id, snapshot.created_at);
    for line in snapshot.items {
        let quantity = match u32::try_from(line.quantity) {
            Ok(q) if q > 0 => q,
            _ => {
                warn!(
                    user_id = %cart.user_id(),
                    product_id = %line.product_id,
                    quantity = line.quantity,
                    "dropping cart line with invalid quantity"
                );
                continue;
            }
        };
        if let Err(err) = cart.add_item(
            line.product_id,
            line.product_name,
            line.price_per_unit,
            quantity,
        ) {
            warn!(user_id = %cart.user_id(), error = %err, "dropping cart line");
        }
    }
    cart
}
