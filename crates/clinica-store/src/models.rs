//! Typed records persisted in the store tree.
//!
//! Serde field names are the wire schema; partially filled records coming
//! back from the store must keep decoding, so almost every field carries a
//! default.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use clinica_shared::{AppointmentId, Attendance, DoctorId, PaymentMethod, ProductId, Role, VendorId};

/// A booked treatment slot, stored at `appointments/{userId}/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub doctor: DoctorId,
    #[serde(default)]
    pub treatment: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_category: Option<String>,
    /// `YYYY-MM-DD`.
    #[serde(default)]
    pub appointment_date: String,
    #[serde(default)]
    pub appointment_time: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default)]
    pub approved: bool,
    /// Absent = outcome pending; see [`Attendance`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attended: Option<bool>,
}

impl Appointment {
    pub fn attendance(&self) -> Attendance {
        Attendance::from_stored_flag(self.attended)
    }

    /// Price with absence counted as zero, the way every total does.
    pub fn price_or_zero(&self) -> f64 {
        self.price.unwrap_or(0.0)
    }
}

/// Read-only staff record at `doctors/{uid}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Doctor {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub role: String,
}

/// One product line inside a sale.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SaleLine {
    pub product_name: String,
    pub vendor_id: VendorId,
    pub quantity: u32,
    #[serde(default)]
    pub mrp_price: f64,
    #[serde(default)]
    pub total_price: f64,
}

/// A point-of-sale transaction at `sales/{saleId}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub customer_name: String,
    #[serde(default)]
    pub customer_number: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub discount: f64,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub products: BTreeMap<ProductId, SaleLine>,
}

impl Sale {
    /// Sum of the per-line totals (the subtotal before discount).
    pub fn products_total(&self) -> f64 {
        self.products.values().map(|line| line.total_price).sum()
    }

    /// Amount actually charged.
    pub fn total(&self) -> f64 {
        self.products_total() - self.discount
    }
}

/// Vendor-scoped stock record at `vendors/{vendorId}/products/{productId}`.
///
/// The `sellhistory` child lives under the same node but is addressed and
/// written by path, so decoding a `Product` ignores it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub mrp_price: f64,
    #[serde(default)]
    pub product_price: f64,
    #[serde(default)]
    pub quantity: u32,
}

/// Per-product log entry recording which sale consumed stock.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SellHistoryEntry {
    pub quantity: u32,
    pub sold_at: DateTime<Utc>,
}

/// Blog post at `blogs/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Blog {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Contact-form submission pushed under `contacts/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub message: String,
}

/// User record at `users/{uid}`; only the fields the workflow reads.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    /// Mirror flags written on approval, keyed by appointment id.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub approved_appointments: BTreeMap<AppointmentId, serde_json::Value>,
}
