//! Live caches mirroring the subscribed collections.
//!
//! Views hold the latest snapshot projection plus any local adjustments a
//! successful delete applied, so counts and totals stay right without
//! waiting for the next push from the store.

use clinica_shared::{AppointmentId, ProductId, SaleId, UserId, VendorId};
use clinica_store::models::{Product, Sale};
use clinica_store::Snapshot;

use crate::projection::{
    flatten_appointments, flatten_sales, flatten_vendor_products, total_price, FlatAppointment,
    FlatSale,
};

/// Cached appointment collection.
#[derive(Debug, Clone, Default)]
pub struct AppointmentsCache {
    items: Vec<FlatAppointment>,
}

impl AppointmentsCache {
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        Self {
            items: flatten_appointments(snapshot),
        }
    }

    pub fn items(&self) -> &[FlatAppointment] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn total_price(&self) -> f64 {
        total_price(&self.items)
    }

    /// Remove one appointment locally after a confirmed remote delete.
    /// Returns whether anything was removed.
    pub fn remove(&mut self, user: &UserId, id: &AppointmentId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| !(item.user_id == *user && item.id == *id));
        self.items.len() != before
    }
}

/// One row of the live stock list.
#[derive(Debug, Clone, PartialEq)]
pub struct StockEntry {
    pub vendor_id: VendorId,
    pub product_id: ProductId,
    pub record: Product,
}

/// Cached sales list and product stock, adjusted in place when a sale is
/// deleted so the stock invariant holds locally without a re-fetch.
#[derive(Debug, Clone, Default)]
pub struct SalesState {
    pub sales: Vec<FlatSale>,
    pub stock: Vec<StockEntry>,
}

impl SalesState {
    pub fn from_snapshots(sales: &Snapshot, vendors: &Snapshot) -> Self {
        Self {
            sales: flatten_sales(sales),
            stock: flatten_vendor_products(vendors)
                .into_iter()
                .map(|(vendor_id, product_id, record)| StockEntry {
                    vendor_id,
                    product_id,
                    record,
                })
                .collect(),
        }
    }

    /// Currently-known stock of a product, if the product is still listed.
    pub fn stock_of(&self, vendor: &VendorId, product: &ProductId) -> Option<u32> {
        self.stock
            .iter()
            .find(|entry| entry.vendor_id == *vendor && entry.product_id == *product)
            .map(|entry| entry.record.quantity)
    }

    /// Apply a committed sale deletion: drop the sale and restore each
    /// line's quantity onto the matching stock row.
    pub fn apply_sale_deletion(&mut self, sale_id: &SaleId, sale: &Sale) {
        self.sales.retain(|item| item.id != *sale_id);
        for (product_id, line) in &sale.products {
            if let Some(entry) = self.stock.iter_mut().find(|entry| {
                entry.vendor_id == line.vendor_id && entry.product_id == *product_id
            }) {
                entry.record.quantity += line.quantity;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clinica_store::{StoreClient, StorePath};
    use serde_json::json;

    #[tokio::test]
    async fn cache_removal_keeps_totals_consistent() {
        let store = StoreClient::with_root(json!({
            "appointments": {
                "u1": {
                    "a1": {"appointmentDate": "2024-03-10", "price": 100.0},
                    "a2": {"appointmentDate": "2024-03-11", "price": 50.0}
                }
            }
        }));
        let snap = store.read(&StorePath::appointments()).await;
        let mut cache = AppointmentsCache::from_snapshot(&snap);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.total_price(), 150.0);

        assert!(cache.remove(&"u1".into(), &"a1".into()));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.total_price(), 50.0);

        // Removing again is a no-op.
        assert!(!cache.remove(&"u1".into(), &"a1".into()));
    }

    #[tokio::test]
    async fn sale_deletion_restores_local_stock() {
        let store = StoreClient::with_root(json!({
            "sales": {
                "s1": {
                    "customerName": "Meera",
                    "timestamp": "2024-03-10T10:00:00Z",
                    "paymentMethod": "Cash",
                    "products": {
                        "p1": {"productName": "Oil", "vendorId": "v1",
                               "quantity": 2, "mrpPrice": 50.0, "totalPrice": 100.0}
                    }
                }
            },
            "vendors": {"v1": {"products": {"p1": {"name": "Oil", "quantity": 3}}}}
        }));
        let sales = store.read(&StorePath::sales()).await;
        let vendors = store.read(&StorePath::vendors()).await;
        let mut state = SalesState::from_snapshots(&sales, &vendors);

        let sale = state.sales[0].record.clone();
        state.apply_sale_deletion(&"s1".into(), &sale);

        assert!(state.sales.is_empty());
        assert_eq!(state.stock_of(&"v1".into(), &"p1".into()), Some(5));
    }
}
