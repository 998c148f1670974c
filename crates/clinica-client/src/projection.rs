//! Pure projection of store snapshots into view models.
//!
//! Nothing in this module touches the store; every function takes a
//! snapshot (or an already flattened list) and returns plain data, so the
//! whole layer is testable without a live connection.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::warn;

use clinica_shared::{AppointmentId, Attendance, ProductId, SaleId, UserId, VendorId};
use clinica_store::models::{Appointment, Product, Sale};
use clinica_store::Snapshot;

/// An appointment annotated with its owning user and its own key.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatAppointment {
    pub user_id: UserId,
    pub id: AppointmentId,
    pub record: Appointment,
}

/// Flatten the full `appointments/{userId}/{id}` collection.
///
/// Order is store key order, which is insertion order for pushed keys.
/// A missing collection yields an empty list; records that fail to decode
/// are skipped with a warning rather than poisoning the whole view.
pub fn flatten_appointments(snapshot: &Snapshot) -> Vec<FlatAppointment> {
    let mut out = Vec::new();
    for (user_key, bucket) in snapshot.children() {
        let Some(bucket) = bucket.as_object() else {
            continue;
        };
        for (id, value) in bucket {
            match serde_json::from_value::<Appointment>(value.clone()) {
                Ok(record) => out.push(FlatAppointment {
                    user_id: UserId::new(user_key),
                    id: AppointmentId::new(id.clone()),
                    record,
                }),
                Err(error) => {
                    warn!(user = user_key, id = %id, %error, "skipping undecodable appointment");
                }
            }
        }
    }
    out
}

/// The admin list filters: all optional, all conjunctive.
#[derive(Debug, Clone, Default)]
pub struct AppointmentFilter {
    /// Exact `YYYY-MM-DD` match.
    pub date: Option<String>,
    /// Two-digit month compared against the date's middle component.
    pub month: Option<String>,
    /// Four-digit year compared against the date's first component.
    pub year: Option<String>,
    /// Case-insensitive over doctor/message/name; raw substring over phone.
    pub search: String,
}

impl AppointmentFilter {
    pub fn matches(&self, record: &Appointment) -> bool {
        let date = &record.appointment_date;
        let mut parts = date.split('-');
        let year = parts.next().unwrap_or("");
        let month = parts.next().unwrap_or("");

        let date_ok = self.date.as_deref().map_or(true, |d| date == d);
        let month_ok = self.month.as_deref().map_or(true, |m| month == m);
        let year_ok = self.year.as_deref().map_or(true, |y| year == y);

        let needle = self.search.trim();
        let search_ok = needle.is_empty() || {
            let lowered = needle.to_lowercase();
            record.doctor.as_str().to_lowercase().contains(&lowered)
                || record.message.to_lowercase().contains(&lowered)
                || record.name.to_lowercase().contains(&lowered)
                || record.phone.contains(needle)
        };

        date_ok && month_ok && year_ok && search_ok
    }
}

/// Records matching every active predicate, in input order.
pub fn filter_appointments(
    items: &[FlatAppointment],
    filter: &AppointmentFilter,
) -> Vec<FlatAppointment> {
    items
        .iter()
        .filter(|item| filter.matches(&item.record))
        .cloned()
        .collect()
}

/// The approval queue: everything not yet approved.
pub fn unapproved(items: &[FlatAppointment]) -> Vec<FlatAppointment> {
    items.iter().filter(|i| !i.record.approved).cloned().collect()
}

/// The attendance queue: everything not yet marked attended (pending and
/// explicitly absent both stay visible).
pub fn not_yet_attended(items: &[FlatAppointment]) -> Vec<FlatAppointment> {
    items
        .iter()
        .filter(|i| i.record.attendance() != Attendance::Attended)
        .cloned()
        .collect()
}

/// Appointments attended on a given date.
pub fn attended_on(items: &[FlatAppointment], date: &str) -> Vec<FlatAppointment> {
    items
        .iter()
        .filter(|i| {
            i.record.attendance() == Attendance::Attended && i.record.appointment_date == date
        })
        .cloned()
        .collect()
}

/// Arithmetic total of the `price` field; absent prices contribute zero.
pub fn total_price(items: &[FlatAppointment]) -> f64 {
    items.iter().map(|i| i.record.price_or_zero()).sum()
}

/// Sort by combined date+time, newest first.  Only views that display a
/// timeline use this; everything else keeps insertion order.
pub fn sort_by_date_time_desc(items: &mut [FlatAppointment]) {
    items.sort_by(|a, b| {
        let ka = (&a.record.appointment_date, &a.record.appointment_time);
        let kb = (&b.record.appointment_date, &b.record.appointment_time);
        kb.cmp(&ka)
    });
}

/// Bookings per `YYYY-MM`, for the booking graph.
pub fn monthly_booking_counts(items: &[FlatAppointment]) -> BTreeMap<String, u32> {
    let mut out = BTreeMap::new();
    for item in items {
        if let Some(key) = month_key(&item.record.appointment_date) {
            *out.entry(key).or_insert(0) += 1;
        }
    }
    out
}

/// Billed amount per `YYYY-MM`, for the revenue graph.
pub fn monthly_revenue(items: &[FlatAppointment]) -> BTreeMap<String, f64> {
    let mut out = BTreeMap::new();
    for item in items {
        if let Some(key) = month_key(&item.record.appointment_date) {
            *out.entry(key).or_insert(0.0) += item.record.price_or_zero();
        }
    }
    out
}

fn month_key(date: &str) -> Option<String> {
    let mut parts = date.split('-');
    let year = parts.next().filter(|s| !s.is_empty())?;
    let month = parts.next().filter(|s| !s.is_empty())?;
    Some(format!("{year}-{month}"))
}

/// Entity counts shown on the admin dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DashboardCounts {
    pub appointments: usize,
    pub users: usize,
    pub blogs: usize,
}

pub fn dashboard_counts(
    appointments: &Snapshot,
    users: &Snapshot,
    blogs: &Snapshot,
) -> DashboardCounts {
    DashboardCounts {
        appointments: flatten_appointments(appointments).len(),
        users: users.children().count(),
        blogs: blogs.children().count(),
    }
}

// ---------------------------------------------------------------------------
// Sales
// ---------------------------------------------------------------------------

/// A sale annotated with its store key.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatSale {
    pub id: SaleId,
    pub record: Sale,
}

/// Flatten `sales/{saleId}`; missing collection yields an empty list.
pub fn flatten_sales(snapshot: &Snapshot) -> Vec<FlatSale> {
    let mut out = Vec::new();
    for (key, value) in snapshot.children() {
        match serde_json::from_value::<Sale>(value.clone()) {
            Ok(record) => out.push(FlatSale {
                id: SaleId::new(key),
                record,
            }),
            Err(error) => warn!(sale = key, %error, "skipping undecodable sale"),
        }
    }
    out
}

/// Search plus inclusive date-range filtering for the sales list.
#[derive(Debug, Clone, Default)]
pub struct SalesFilter {
    /// Case-insensitive substring over the customer name.
    pub search: String,
    /// Inclusive lower bound, `YYYY-MM-DD`.
    pub from: Option<String>,
    /// Inclusive upper bound, `YYYY-MM-DD`.
    pub to: Option<String>,
}

impl SalesFilter {
    /// Both bounds set to one day: the "today" shortcut.
    pub fn for_day(date: impl Into<String>) -> Self {
        let date = date.into();
        Self {
            search: String::new(),
            from: Some(date.clone()),
            to: Some(date),
        }
    }

    pub fn matches(&self, sale: &Sale) -> bool {
        let needle = self.search.trim().to_lowercase();
        let search_ok =
            needle.is_empty() || sale.customer_name.to_lowercase().contains(&needle);

        let day = sale.timestamp.date_naive().to_string();
        let from_ok = self.from.as_deref().map_or(true, |from| day.as_str() >= from);
        let to_ok = self.to.as_deref().map_or(true, |to| day.as_str() <= to);

        search_ok && from_ok && to_ok
    }
}

pub fn filter_sales(items: &[FlatSale], filter: &SalesFilter) -> Vec<FlatSale> {
    items
        .iter()
        .filter(|item| filter.matches(&item.record))
        .cloned()
        .collect()
}

/// Headline numbers for the sales list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SalesSummary {
    /// Sum of per-product line totals across all sales.
    pub total_amount: f64,
    pub count: usize,
    /// Customer with the highest summed line totals.
    pub top_customer: Option<(String, f64)>,
}

pub fn summarize_sales(items: &[FlatSale]) -> SalesSummary {
    let mut by_customer: BTreeMap<&str, f64> = BTreeMap::new();
    let mut total = 0.0;
    for item in items {
        let amount = item.record.products_total();
        total += amount;
        *by_customer.entry(item.record.customer_name.as_str()).or_insert(0.0) += amount;
    }
    let top_customer = by_customer
        .into_iter()
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(name, amount)| (name.to_string(), amount));

    SalesSummary {
        total_amount: total,
        count: items.len(),
        top_customer,
    }
}

/// Flatten every vendor's product map into `(vendor, product, record)`
/// rows, the shape the sales reconciler and the sell form consume.
pub fn flatten_vendor_products(snapshot: &Snapshot) -> Vec<(VendorId, ProductId, Product)> {
    let mut out = Vec::new();
    for (vendor_key, vendor) in snapshot.children() {
        let Some(products) = vendor.get("products").and_then(Value::as_object) else {
            continue;
        };
        for (product_key, value) in products {
            match serde_json::from_value(value.clone()) {
                Ok(record) => out.push((
                    VendorId::new(vendor_key),
                    ProductId::new(product_key.clone()),
                    record,
                )),
                Err(error) => {
                    warn!(vendor = vendor_key, product = %product_key, %error,
                          "skipping undecodable product");
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use clinica_shared::{PaymentMethod, ProductId, VendorId};
    use clinica_store::models::SaleLine;
    use clinica_store::{StoreClient, StorePath};
    use serde_json::json;

    fn appt(date: &str, price: Option<f64>) -> Appointment {
        Appointment {
            name: "Asha".into(),
            phone: "9876543210".into(),
            doctor: "dr-rao".into(),
            message: "knee pain".into(),
            appointment_date: date.into(),
            appointment_time: "10:00".into(),
            price,
            ..Default::default()
        }
    }

    fn flat(user: &str, id: &str, record: Appointment) -> FlatAppointment {
        FlatAppointment {
            user_id: user.into(),
            id: id.into(),
            record,
        }
    }

    #[tokio::test]
    async fn missing_collection_projects_to_empty_list() {
        let store = StoreClient::new();
        let snap = store.read(&StorePath::appointments()).await;
        assert!(flatten_appointments(&snap).is_empty());
    }

    #[test]
    fn month_and_year_filter_follow_the_date_components() {
        let items = vec![flat("u1", "a1", appt("2024-03-10", Some(100.0)))];

        let march = AppointmentFilter {
            month: Some("03".into()),
            year: Some("2024".into()),
            ..Default::default()
        };
        assert_eq!(filter_appointments(&items, &march).len(), 1);

        let april = AppointmentFilter {
            month: Some("04".into()),
            ..Default::default()
        };
        assert!(filter_appointments(&items, &april).is_empty());
    }

    #[test]
    fn search_is_case_insensitive_except_phone() {
        let items = vec![flat("u1", "a1", appt("2024-03-10", None))];

        for needle in ["DR-RAO", "Knee", "asha", "98765"] {
            let filter = AppointmentFilter {
                search: needle.into(),
                ..Default::default()
            };
            assert_eq!(filter_appointments(&items, &filter).len(), 1, "needle {needle}");
        }

        let miss = AppointmentFilter {
            search: "nobody".into(),
            ..Default::default()
        };
        assert!(filter_appointments(&items, &miss).is_empty());
    }

    #[test]
    fn absent_fields_match_as_empty_strings() {
        let bare = FlatAppointment {
            user_id: "u1".into(),
            id: "a1".into(),
            record: Appointment::default(),
        };
        let filter = AppointmentFilter {
            search: "anything".into(),
            ..Default::default()
        };
        // Must not panic, must simply not match.
        assert!(filter_appointments(&[bare], &filter).is_empty());
    }

    #[test]
    fn total_price_counts_absent_prices_as_zero() {
        let items = vec![
            flat("u1", "a1", appt("2024-03-10", Some(100.0))),
            flat("u1", "a2", appt("2024-03-11", None)),
            flat("u2", "a3", appt("2024-03-12", Some(50.5))),
        ];
        assert_eq!(total_price(&items), 150.5);
        assert_eq!(total_price(&[]), 0.0);
    }

    #[test]
    fn view_predicates_split_on_approval_and_attendance() {
        let mut approved = appt("2024-03-10", None);
        approved.approved = true;
        let mut attended = appt("2024-03-10", None);
        attended.attended = Some(true);
        let mut absent = appt("2024-03-10", None);
        absent.attended = Some(false);

        let items = vec![
            flat("u1", "a1", approved),
            flat("u1", "a2", attended),
            flat("u1", "a3", absent),
        ];

        let queue = unapproved(&items);
        assert_eq!(queue.len(), 2);
        assert!(queue.iter().all(|i| !i.record.approved));

        let pending = not_yet_attended(&items);
        assert_eq!(pending.len(), 2);

        assert_eq!(attended_on(&items, "2024-03-10").len(), 1);
        assert!(attended_on(&items, "2024-03-11").is_empty());
    }

    #[test]
    fn sort_is_newest_first_by_date_then_time() {
        let mut items = vec![
            flat("u1", "a1", appt("2024-03-10", None)),
            flat("u1", "a2", appt("2024-03-12", None)),
            {
                let mut late = appt("2024-03-12", None);
                late.appointment_time = "18:00".into();
                flat("u1", "a3", late)
            },
        ];
        sort_by_date_time_desc(&mut items);
        let ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["a3", "a2", "a1"]);
    }

    #[test]
    fn monthly_rollups() {
        let items = vec![
            flat("u1", "a1", appt("2024-03-10", Some(100.0))),
            flat("u1", "a2", appt("2024-03-20", Some(50.0))),
            flat("u2", "a3", appt("2024-04-01", Some(25.0))),
        ];
        let counts = monthly_booking_counts(&items);
        assert_eq!(counts["2024-03"], 2);
        assert_eq!(counts["2024-04"], 1);

        let revenue = monthly_revenue(&items);
        assert_eq!(revenue["2024-03"], 150.0);
        assert_eq!(revenue["2024-04"], 25.0);
    }

    #[tokio::test]
    async fn dashboard_counts_span_the_three_collections() {
        let store = StoreClient::with_root(json!({
            "appointments": {"u1": {"a1": {"appointmentDate": "2024-03-10"}}},
            "users": {"u1": {}, "u2": {}},
            "blogs": {"b1": {"title": "Stretching"}}
        }));
        let counts = dashboard_counts(
            &store.read(&StorePath::appointments()).await,
            &store.read(&StorePath::users()).await,
            &store.read(&StorePath::blogs()).await,
        );
        assert_eq!(counts.appointments, 1);
        assert_eq!(counts.users, 2);
        assert_eq!(counts.blogs, 1);
    }

    fn sale(name: &str, day: &str, lines: &[(u32, f64)]) -> Sale {
        let mut products = std::collections::BTreeMap::new();
        for (i, (quantity, total)) in lines.iter().enumerate() {
            products.insert(
                ProductId::new(format!("p{i}")),
                SaleLine {
                    product_name: format!("Product {i}"),
                    vendor_id: VendorId::new("v1"),
                    quantity: *quantity,
                    mrp_price: total / *quantity as f64,
                    total_price: *total,
                },
            );
        }
        Sale {
            customer_name: name.into(),
            customer_number: "9876543210".into(),
            timestamp: Utc
                .from_utc_datetime(&format!("{day}T10:00:00").parse().unwrap()),
            discount: 0.0,
            payment_method: PaymentMethod::Cash,
            products,
        }
    }

    #[test]
    fn sales_filter_by_name_and_day_range() {
        let items = vec![
            FlatSale { id: "s1".into(), record: sale("Meera", "2024-03-10", &[(2, 100.0)]) },
            FlatSale { id: "s2".into(), record: sale("Arjun", "2024-03-15", &[(1, 50.0)]) },
        ];

        let by_name = SalesFilter { search: "meera".into(), ..Default::default() };
        assert_eq!(filter_sales(&items, &by_name).len(), 1);

        let range = SalesFilter {
            from: Some("2024-03-11".into()),
            to: Some("2024-03-31".into()),
            ..Default::default()
        };
        let hits = filter_sales(&items, &range);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id.as_str(), "s2");

        let day = SalesFilter::for_day("2024-03-10");
        assert_eq!(filter_sales(&items, &day).len(), 1);
    }

    #[test]
    fn sales_summary_totals_and_top_customer() {
        let items = vec![
            FlatSale { id: "s1".into(), record: sale("Meera", "2024-03-10", &[(2, 100.0), (1, 50.0)]) },
            FlatSale { id: "s2".into(), record: sale("Arjun", "2024-03-15", &[(1, 40.0)]) },
        ];
        let summary = summarize_sales(&items);
        assert_eq!(summary.total_amount, 190.0);
        assert_eq!(summary.count, 2);
        assert_eq!(summary.top_customer, Some(("Meera".to_string(), 150.0)));

        assert_eq!(summarize_sales(&[]), SalesSummary::default());
    }

    #[tokio::test]
    async fn vendor_products_flatten_across_vendors() {
        let store = StoreClient::with_root(json!({
            "vendors": {
                "v1": {"products": {"p1": {"name": "Oil", "quantity": 5}}},
                "v2": {"products": {"p2": {"name": "Balm", "quantity": 2}},
                        "contact": "ignored"}
            }
        }));
        let snap = store.read(&StorePath::vendors()).await;
        let rows = flatten_vendor_products(&snap);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].2.name, "Oil");
    }
}
