//! Client-side file exports: CSV spreadsheets and the invoice PDF.

pub mod csv;
pub mod invoice;
