//! Printable invoice PDF for a recorded sale.

use printpdf::{BuiltinFont, Mm, PdfDocument};

use clinica_shared::SaleId;
use clinica_store::models::Sale;

use crate::{ClientError, Result};

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const LEFT: f32 = 20.0;

/// Render an A4 invoice and return the PDF bytes.
pub fn invoice_pdf(clinic_name: &str, sale_id: &SaleId, sale: &Sale) -> Result<Vec<u8>> {
    let title = format!("Invoice {sale_id}");
    let (doc, page, layer) =
        PdfDocument::new(&title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
    let layer = doc.get_page(page).get_layer(layer);
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ClientError::Pdf(e.to_string()))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| ClientError::Pdf(e.to_string()))?;

    let mut y = Mm(PAGE_HEIGHT - 20.0);

    layer.use_text(clinic_name, 16.0, Mm(LEFT), y, &bold);
    y -= Mm(8.0);
    layer.use_text(&title, 11.0, Mm(LEFT), y, &font);
    y -= Mm(6.0);
    layer.use_text(
        &format!("Date: {}", sale.timestamp.format("%d %b %Y, %H:%M")),
        10.0,
        Mm(LEFT),
        y,
        &font,
    );
    y -= Mm(10.0);

    layer.use_text("BILLED TO:", 11.0, Mm(LEFT), y, &bold);
    y -= Mm(5.5);
    layer.use_text(&sale.customer_name, 10.0, Mm(LEFT + 5.0), y, &font);
    y -= Mm(5.0);
    if !sale.customer_number.is_empty() {
        layer.use_text(&sale.customer_number, 10.0, Mm(LEFT + 5.0), y, &font);
        y -= Mm(5.0);
    }
    y -= Mm(6.0);

    layer.use_text("ITEMS:", 11.0, Mm(LEFT), y, &bold);
    y -= Mm(6.0);
    for line in sale.products.values() {
        let text = format!(
            "{}  x{}  @ {:.2}  =  {:.2}",
            line.product_name, line.quantity, line.mrp_price, line.total_price
        );
        layer.use_text(&text, 10.0, Mm(LEFT + 5.0), y, &font);
        y -= Mm(5.0);
    }
    y -= Mm(6.0);

    layer.use_text(
        &format!("Subtotal: {:.2}", sale.products_total()),
        10.0,
        Mm(LEFT),
        y,
        &font,
    );
    y -= Mm(5.0);
    layer.use_text(&format!("Discount: {:.2}", sale.discount), 10.0, Mm(LEFT), y, &font);
    y -= Mm(6.0);
    layer.use_text(&format!("Total: {:.2}", sale.total()), 12.0, Mm(LEFT), y, &bold);
    y -= Mm(6.0);
    layer.use_text(
        &format!("Paid by: {}", sale.payment_method),
        10.0,
        Mm(LEFT),
        y,
        &font,
    );

    doc.save_to_bytes().map_err(|e| ClientError::Pdf(e.to_string()))
}
