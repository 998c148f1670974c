//! Point-of-sale recording and the sale-deletion inventory reconciler.
//!
//! Invariant maintained here: a product's stored stock equals its initial
//! stock minus the quantities consumed by active sales.  Recording a sale
//! deducts stock and appends sell-history in the same atomic commit that
//! stores the sale; deleting a sale reverses all of it, also atomically.

use std::collections::BTreeMap;

use chrono::Utc;
use serde_json::json;
use tracing::info;

use clinica_shared::validate;
use clinica_shared::{PaymentMethod, ProductId, SaleId, ValidationError, VendorId};
use clinica_store::models::{Product, Sale, SaleLine, SellHistoryEntry};
use clinica_store::{MultiWrite, StoreClient, StorePath};

use crate::commands::Confirmation;
use crate::state::SalesState;
use crate::{ClientError, Result};

/// One product line on the sell form.
#[derive(Debug, Clone)]
pub struct SaleFormLine {
    pub vendor_id: VendorId,
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: u32,
    /// Per-unit price charged; line total is `unit_price * quantity`.
    pub unit_price: f64,
}

/// Fields collected by the sell form.
#[derive(Debug, Clone)]
pub struct SaleForm {
    pub customer_name: String,
    pub customer_phone: String,
    pub discount: f64,
    pub payment_method: PaymentMethod,
    pub lines: Vec<SaleFormLine>,
}

impl SaleForm {
    fn validate(&self) -> Result<()> {
        validate::require_non_empty("customerName", &self.customer_name)?;
        validate::validate_customer_phone(&self.customer_phone)?;
        if self.lines.is_empty() {
            return Err(ValidationError::EmptySale.into());
        }
        for (index, line) in self.lines.iter().enumerate() {
            if line.product_name.trim().is_empty() {
                return Err(ValidationError::InvalidSaleLine {
                    index,
                    reason: "missing product name".into(),
                }
                .into());
            }
            if line.quantity == 0 {
                return Err(ValidationError::InvalidSaleLine {
                    index,
                    reason: "quantity must be at least 1".into(),
                }
                .into());
            }
            if line.unit_price <= 0.0 || !line.unit_price.is_finite() {
                return Err(ValidationError::InvalidSaleLine {
                    index,
                    reason: format!("invalid unit price {}", line.unit_price),
                }
                .into());
            }
        }
        let subtotal = self.subtotal();
        validate::validate_discount(self.discount, subtotal)?;
        Ok(())
    }

    fn subtotal(&self) -> f64 {
        self.lines
            .iter()
            .map(|line| line.unit_price * line.quantity as f64)
            .sum()
    }
}

/// Record a sale.
///
/// After local validation, stock for every line is checked against the
/// store and the whole effect is staged as one commit: the sale record,
/// each product's decremented quantity, and each product's sell-history
/// entry.  Insufficient stock rejects the sale before anything is staged,
/// so stock can never go negative.
pub async fn record_sale(store: &StoreClient, form: SaleForm) -> Result<SaleId> {
    form.validate()?;

    let timestamp = Utc::now();
    let sale_id = SaleId::new(store.generate_key());
    let mut write = MultiWrite::new();
    let mut products = BTreeMap::new();

    for line in &form.lines {
        let product_path = StorePath::vendor_product(&line.vendor_id, &line.product_id)?;
        let snapshot = store.read(&product_path).await;
        if !snapshot.exists() {
            return Err(ClientError::UnknownProduct {
                vendor: line.vendor_id.clone(),
                product: line.product_id.clone(),
            });
        }
        let product: Product = snapshot.decode()?;
        if product.quantity < line.quantity {
            return Err(ClientError::InsufficientStock {
                product: line.product_id.clone(),
                available: product.quantity,
                requested: line.quantity,
            });
        }

        write = write
            .set(
                StorePath::vendor_product_quantity(&line.vendor_id, &line.product_id)?,
                json!(product.quantity - line.quantity),
            )
            .set(
                StorePath::sell_history_entry(&line.vendor_id, &line.product_id, &sale_id)?,
                serde_json::to_value(SellHistoryEntry {
                    quantity: line.quantity,
                    sold_at: timestamp,
                })
                .expect("entry serializes"),
            );

        products.insert(
            line.product_id.clone(),
            SaleLine {
                product_name: line.product_name.clone(),
                vendor_id: line.vendor_id.clone(),
                quantity: line.quantity,
                mrp_price: line.unit_price,
                total_price: line.unit_price * line.quantity as f64,
            },
        );
    }

    let sale = Sale {
        customer_name: form.customer_name.trim().to_string(),
        customer_number: form.customer_phone.trim().to_string(),
        timestamp,
        discount: form.discount,
        payment_method: form.payment_method,
        products,
    };
    write = write.set(
        StorePath::sale(&sale_id)?,
        serde_json::to_value(&sale).expect("sale serializes"),
    );

    store.commit(write).await?;
    info!(sale = %sale_id, total = sale.total(), lines = form.lines.len(), "sale recorded");
    Ok(sale_id)
}

/// The flat product catalogue backing the sell form's name suggestions.
///
/// Lives at `products/{id}`, separate from vendor stock; a missing
/// catalogue is an empty list.
pub async fn catalog_suggestions(store: &StoreClient) -> Result<Vec<(ProductId, Product)>> {
    let snapshot = store.read(&StorePath::catalog_products()).await;
    Ok(snapshot
        .decode_children()?
        .into_iter()
        .map(|(key, product)| (ProductId::new(key), product))
        .collect())
}

/// Delete a sale, restoring the stock it consumed.
///
/// For every product line the restored quantity is the currently-known
/// stock plus the quantity this sale sold; a product that vanished from
/// the live list counts as zero current stock.  Stock restoration,
/// sell-history removal, and sale removal commit as one all-or-nothing
/// write, and only then is the local state adjusted.
pub async fn delete_sale(
    store: &StoreClient,
    state: &mut SalesState,
    sale_id: &SaleId,
    confirmation: Confirmation,
) -> Result<bool> {
    if confirmation == Confirmation::Cancelled {
        return Ok(false);
    }

    let sale = match state.sales.iter().find(|item| item.id == *sale_id) {
        Some(item) => item.record.clone(),
        None => {
            let snapshot = store.read(&StorePath::sale(sale_id)?).await;
            snapshot.decode()?
        }
    };

    let mut write = MultiWrite::new();
    for (product_id, line) in &sale.products {
        let current = state.stock_of(&line.vendor_id, product_id).unwrap_or(0);
        write = write
            .set(
                StorePath::vendor_product_quantity(&line.vendor_id, product_id)?,
                json!(current + line.quantity),
            )
            .remove(StorePath::sell_history_entry(
                &line.vendor_id,
                product_id,
                sale_id,
            )?);
    }
    write = write.remove(StorePath::sale(sale_id)?);

    store.commit(write).await?;
    state.apply_sale_deletion(sale_id, &sale);
    info!(sale = %sale_id, customer = %sale.customer_name, "sale deleted, stock restored");
    Ok(true)
}
