//! CSV spreadsheet export of flattened records.
//!
//! Quoting follows RFC 4180; cells starting with `= + - @` are prefixed
//! with a quote so spreadsheet applications do not execute them as
//! formulas.

use crate::projection::{FlatAppointment, FlatSale};

fn should_neutralize(value: &str) -> bool {
    let trimmed = value.trim_start();
    if trimmed.is_empty() || trimmed.starts_with('\'') {
        return false;
    }
    matches!(trimmed.chars().next(), Some('=') | Some('+') | Some('-') | Some('@'))
}

fn escape(value: &str) -> String {
    let safe = if should_neutralize(value) {
        format!("'{value}")
    } else {
        value.to_string()
    };
    if safe.contains(',') || safe.contains('"') || safe.contains('\n') || safe.contains('\r') {
        format!("\"{}\"", safe.replace('"', "\"\""))
    } else {
        safe
    }
}

fn write_row(out: &mut String, cells: &[String]) {
    let line: Vec<String> = cells.iter().map(|c| escape(c)).collect();
    out.push_str(&line.join(","));
    out.push('\n');
}

fn number(value: f64) -> String {
    // Trim the trailing ".0" spreadsheet users never want to see.
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// Appointment list as spreadsheet rows, one per record.
pub fn appointments_csv(items: &[FlatAppointment]) -> String {
    let mut out = String::new();
    write_row(
        &mut out,
        &[
            "User".into(),
            "Appointment".into(),
            "Name".into(),
            "Phone".into(),
            "Doctor".into(),
            "Treatment".into(),
            "Date".into(),
            "Time".into(),
            "Price".into(),
            "Payment".into(),
            "Approved".into(),
            "Attendance".into(),
        ],
    );
    for item in items {
        let r = &item.record;
        write_row(
            &mut out,
            &[
                item.user_id.to_string(),
                item.id.to_string(),
                r.name.clone(),
                r.phone.clone(),
                r.doctor.to_string(),
                r.treatment.clone(),
                r.appointment_date.clone(),
                r.appointment_time.clone(),
                number(r.price_or_zero()),
                r.payment_method.map(|m| m.to_string()).unwrap_or_default(),
                if r.approved { "Yes" } else { "No" }.into(),
                format!("{:?}", r.attendance()),
            ],
        );
    }
    out
}

/// Sales list as spreadsheet rows; product lines are folded into one cell.
pub fn sales_csv(items: &[FlatSale]) -> String {
    let mut out = String::new();
    write_row(
        &mut out,
        &[
            "Sale".into(),
            "Customer".into(),
            "Phone".into(),
            "Date".into(),
            "Products".into(),
            "Subtotal".into(),
            "Discount".into(),
            "Total".into(),
            "Payment".into(),
        ],
    );
    for item in items {
        let r = &item.record;
        let products: Vec<String> = r
            .products
            .values()
            .map(|line| {
                format!(
                    "{} (Qty: {}, Total: {})",
                    line.product_name,
                    line.quantity,
                    number(line.total_price)
                )
            })
            .collect();
        write_row(
            &mut out,
            &[
                item.id.to_string(),
                r.customer_name.clone(),
                r.customer_number.clone(),
                r.timestamp.date_naive().to_string(),
                products.join("\n"),
                number(r.products_total()),
                number(r.discount),
                number(r.total()),
                r.payment_method.to_string(),
            ],
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use clinica_store::models::Appointment;

    #[test]
    fn quoting_and_formula_neutralization() {
        assert_eq!(escape("plain"), "plain");
        assert_eq!(escape("a,b"), "\"a,b\"");
        assert_eq!(escape("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape("=SUM(A1)"), "'=SUM(A1)");
        assert_eq!(escape("+91 98765"), "'+91 98765");
        assert_eq!(escape("'=already quoted"), "'=already quoted");
    }

    #[test]
    fn appointment_rows_round_numbers() {
        let item = FlatAppointment {
            user_id: "u1".into(),
            id: "a1".into(),
            record: Appointment {
                name: "Asha, Jr.".into(),
                price: Some(150.0),
                ..Default::default()
            },
        };
        let csv = appointments_csv(&[item]);
        let mut lines = csv.lines();
        assert!(lines.next().unwrap().starts_with("User,Appointment"));
        let row = lines.next().unwrap();
        assert!(row.contains("\"Asha, Jr.\""));
        assert!(row.contains(",150,"));
    }

    #[test]
    fn empty_list_is_just_the_header() {
        let csv = appointments_csv(&[]);
        assert_eq!(csv.lines().count(), 1);
    }
}
