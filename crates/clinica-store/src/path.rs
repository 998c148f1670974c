//! Slash-separated path addressing into the store tree.

use clinica_shared::{AppointmentId, BlogId, DoctorId, ProductId, SaleId, UserId, VendorId};

use crate::error::StoreError;
use crate::Result;

/// Characters that may not appear inside a path segment.
const RESERVED: &[char] = &['/', '.', '$', '#', '[', ']'];

/// An absolute location in the store tree.
///
/// The empty path addresses the root.  Segments are non-empty and free of
/// the reserved characters above; constructors validate this once so the
/// rest of the crate can treat paths as well-formed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorePath {
    segments: Vec<String>,
}

impl StorePath {
    /// The root of the tree.
    pub fn root() -> Self {
        Self { segments: Vec::new() }
    }

    /// Parse a slash-separated path such as `appointments/u1/a1`.
    pub fn parse(raw: &str) -> Result<Self> {
        let mut path = Self::root();
        for segment in raw.split('/').filter(|s| !s.is_empty()) {
            path = path.child(segment)?;
        }
        Ok(path)
    }

    /// Extend the path by one validated segment.
    pub fn child(&self, segment: impl AsRef<str>) -> Result<Self> {
        let segment = segment.as_ref();
        if segment.is_empty() || segment.chars().any(|c| RESERVED.contains(&c)) {
            return Err(StoreError::InvalidPath(format!(
                "bad segment {segment:?} under {self}"
            )));
        }
        let mut segments = self.segments.clone();
        segments.push(segment.to_string());
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Whether `self` addresses `other` or one of its ancestors.
    pub fn is_prefix_of(&self, other: &StorePath) -> bool {
        other.segments.len() >= self.segments.len()
            && other.segments[..self.segments.len()] == self.segments[..]
    }

    /// Whether writes at `self` change the value visible at `other`.
    ///
    /// True when either path is an ancestor of (or equal to) the other.
    pub fn intersects(&self, other: &StorePath) -> bool {
        self.is_prefix_of(other) || other.is_prefix_of(self)
    }

    // ---------------------------------------------------------------
    // The de-facto schema.  Segment content comes from generated ids,
    // so the unwraps below cannot fire; ids typed elsewhere keep the
    // reserved characters out.
    // ---------------------------------------------------------------

    pub fn appointments() -> Self {
        Self::parse("appointments").expect("static path")
    }

    pub fn user_appointments(user: &UserId) -> Result<Self> {
        Self::appointments().child(user.as_str())
    }

    pub fn appointment(user: &UserId, id: &AppointmentId) -> Result<Self> {
        Self::user_appointments(user)?.child(id.as_str())
    }

    pub fn users() -> Self {
        Self::parse("users").expect("static path")
    }

    pub fn user(user: &UserId) -> Result<Self> {
        Self::users().child(user.as_str())
    }

    pub fn approved_appointment(user: &UserId, id: &AppointmentId) -> Result<Self> {
        Self::user(user)?
            .child("approvedAppointments")?
            .child(id.as_str())
    }

    pub fn doctors() -> Self {
        Self::parse("doctors").expect("static path")
    }

    pub fn doctor(id: &DoctorId) -> Result<Self> {
        Self::doctors().child(id.as_str())
    }

    pub fn blogs() -> Self {
        Self::parse("blogs").expect("static path")
    }

    pub fn blog(id: &BlogId) -> Result<Self> {
        Self::blogs().child(id.as_str())
    }

    pub fn contacts() -> Self {
        Self::parse("contacts").expect("static path")
    }

    pub fn sales() -> Self {
        Self::parse("sales").expect("static path")
    }

    pub fn sale(id: &SaleId) -> Result<Self> {
        Self::sales().child(id.as_str())
    }

    pub fn vendors() -> Self {
        Self::parse("vendors").expect("static path")
    }

    pub fn vendor_product(vendor: &VendorId, product: &ProductId) -> Result<Self> {
        Self::vendors()
            .child(vendor.as_str())?
            .child("products")?
            .child(product.as_str())
    }

    pub fn vendor_product_quantity(vendor: &VendorId, product: &ProductId) -> Result<Self> {
        Self::vendor_product(vendor, product)?.child("quantity")
    }

    pub fn sell_history_entry(
        vendor: &VendorId,
        product: &ProductId,
        sale: &SaleId,
    ) -> Result<Self> {
        Self::vendor_product(vendor, product)?
            .child("sellhistory")?
            .child(sale.as_str())
    }

    /// The flat product catalogue used for sell-form suggestions.
    pub fn catalog_products() -> Self {
        Self::parse("products").expect("static path")
    }
}

impl std::fmt::Display for StorePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.segments.is_empty() {
            f.write_str("/")
        } else {
            f.write_str(&self.segments.join("/"))
        }
    }
}
