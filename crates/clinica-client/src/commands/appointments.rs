//! Appointment lifecycle: booking, approval, attendance, billing edits,
//! deletion.

use serde_json::{json, Map, Value};
use tracing::{info, warn};

use clinica_shared::validate;
use clinica_shared::{AppointmentId, Attendance, DoctorId, PaymentMethod, UserId};
use clinica_store::models::Appointment;
use clinica_store::{StoreClient, StorePath};

use crate::commands::Confirmation;
use crate::notify::{self, MailRelay};
use crate::state::AppointmentsCache;
use crate::{ClientError, Result};

/// Owner bucket for admin direct entries (walk-ins without an account).
pub const WALK_IN_OWNER: &str = "walk-in";

/// Fields collected by the booking form.
#[derive(Debug, Clone, Default)]
pub struct BookingForm {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub doctor: DoctorId,
    pub treatment: String,
    pub sub_category: Option<String>,
    pub appointment_date: String,
    pub appointment_time: String,
    pub message: String,
    pub price: Option<f64>,
    pub payment_method: Option<PaymentMethod>,
}

impl BookingForm {
    fn validate(&self) -> Result<()> {
        validate::require_non_empty("name", &self.name)?;
        validate::require_non_empty("phone", &self.phone)?;
        validate::require_non_empty("doctor", self.doctor.as_str())?;
        validate::require_non_empty("appointmentDate", &self.appointment_date)?;
        validate::require_non_empty("appointmentTime", &self.appointment_time)?;
        Ok(())
    }

    fn into_record(self) -> Appointment {
        Appointment {
            name: self.name,
            phone: self.phone,
            email: self.email,
            doctor: self.doctor,
            treatment: self.treatment,
            sub_category: self.sub_category,
            appointment_date: self.appointment_date,
            appointment_time: self.appointment_time,
            message: self.message,
            price: self.price,
            payment_method: self.payment_method,
            approved: false,
            attended: None,
        }
    }
}

/// Book an appointment for a signed-in user.
pub async fn book(store: &StoreClient, user: &UserId, form: BookingForm) -> Result<AppointmentId> {
    form.validate()?;
    let record = form.into_record();
    let path = StorePath::user_appointments(user)?;
    let key = store.push(&path, serde_json::to_value(&record).expect("record is json")).await?;
    info!(user = %user, id = %key, date = %record.appointment_date, "appointment booked");
    Ok(AppointmentId::new(key))
}

/// Admin direct entry: book under the shared walk-in bucket.
pub async fn book_walk_in(store: &StoreClient, form: BookingForm) -> Result<AppointmentId> {
    book(store, &UserId::new(WALK_IN_OWNER), form).await
}

/// What happened to the best-effort side effects of an approval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationStatus {
    Sent,
    /// No relay configured or no recipient address on the record.
    Skipped,
    /// Attempted and failed; the approval itself stands.
    Failed(String),
}

/// Result of an approval: the write succeeded, side effects as reported.
#[derive(Debug, Clone, PartialEq)]
pub struct ApprovalOutcome {
    pub email: NotificationStatus,
    /// Prefilled WhatsApp chat link for the patient, when a phone exists.
    pub whatsapp_link: Option<String>,
}

/// Approve an appointment.
///
/// Sets `approved` on the record and mirrors the flag under the owning
/// user's `approvedAppointments`, then fires the approval email and
/// builds the WhatsApp link.  Notification failure never rolls back the
/// approval; it is reported in the outcome.  The `attended` field is
/// never touched.
pub async fn approve(
    store: &StoreClient,
    relay: Option<&MailRelay>,
    user: &UserId,
    id: &AppointmentId,
) -> Result<ApprovalOutcome> {
    let path = StorePath::appointment(user, id)?;
    let record: Appointment = store.read(&path).await.decode()?;

    store.update(&path, fields(json!({"approved": true}))).await?;
    store
        .update(
            &StorePath::approved_appointment(user, id)?,
            fields(json!({"approved": true})),
        )
        .await?;
    info!(user = %user, id = %id, "appointment approved");

    let email = match (relay, record.email.trim()) {
        (Some(relay), recipient) if !recipient.is_empty() => {
            let (subject, body) = notify::approval_email(&record);
            match relay.send(recipient, &subject, &body).await {
                Ok(()) => NotificationStatus::Sent,
                Err(error) => {
                    warn!(%error, user = %user, id = %id, "approval email failed");
                    NotificationStatus::Failed(error.to_string())
                }
            }
        }
        _ => NotificationStatus::Skipped,
    };

    let whatsapp_link = if record.phone.trim().is_empty() {
        None
    } else {
        Some(notify::whatsapp_chat_link(
            &record.phone,
            &notify::approval_message(&record),
        ))
    };

    Ok(ApprovalOutcome { email, whatsapp_link })
}

/// Record the attendance outcome.
///
/// `Attended`/`NotAttended` write the boolean; `Pending` clears the field
/// back to the unrecorded state.  `approved` is never touched.
pub async fn set_attendance(
    store: &StoreClient,
    user: &UserId,
    id: &AppointmentId,
    attendance: Attendance,
) -> Result<()> {
    let path = StorePath::appointment(user, id)?;
    let value = match attendance.stored_flag() {
        Some(flag) => json!({"attended": flag}),
        None => json!({"attended": null}),
    };
    store.update(&path, fields(value)).await?;
    info!(user = %user, id = %id, ?attendance, "attendance recorded");
    Ok(())
}

/// Parse and store a new price.  Rejected input never reaches the store.
pub async fn set_price(
    store: &StoreClient,
    user: &UserId,
    id: &AppointmentId,
    raw: &str,
) -> Result<f64> {
    let price = validate::parse_price(raw)?;
    let path = StorePath::appointment(user, id)?;
    store.update(&path, fields(json!({"price": price}))).await?;
    info!(user = %user, id = %id, price, "price updated");
    Ok(price)
}

/// Validate and store a new payment method (`Cash` or `Online` only).
pub async fn set_payment_method(
    store: &StoreClient,
    user: &UserId,
    id: &AppointmentId,
    raw: &str,
) -> Result<PaymentMethod> {
    let method = validate::parse_payment_method(raw)?;
    let path = StorePath::appointment(user, id)?;
    store
        .update(&path, fields(json!({"paymentMethod": method.as_str()})))
        .await?;
    info!(user = %user, id = %id, method = %method, "payment method updated");
    Ok(method)
}

/// Delete an appointment after interactive confirmation.
///
/// On success the record is removed remotely and the local cache is
/// repaired in place (including dropping an emptied user bucket remotely,
/// which the tree prunes automatically).  Returns `Ok(false)` when the
/// caller cancelled.
pub async fn delete(
    store: &StoreClient,
    cache: &mut AppointmentsCache,
    user: &UserId,
    id: &AppointmentId,
    confirmation: Confirmation,
) -> Result<bool> {
    if confirmation == Confirmation::Cancelled {
        return Ok(false);
    }
    let path = StorePath::appointment(user, id)?;
    store.remove(&path).await?;
    cache.remove(user, id);
    info!(user = %user, id = %id, "appointment deleted");
    Ok(true)
}

fn fields(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap_or_default()
}
