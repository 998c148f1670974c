//! Contact-form submissions and simple content reads (blogs, doctors).

use tracing::info;

use clinica_shared::validate;
use clinica_shared::{BlogId, DoctorId};
use clinica_store::models::{Blog, ContactMessage, Doctor};
use clinica_store::{StoreClient, StorePath};

use crate::Result;
use crate::{notify, ClientError};

/// Push a contact-form message; returns the generated key.
pub async fn submit_contact(store: &StoreClient, message: ContactMessage) -> Result<String> {
    validate::require_non_empty("name", &message.name)?;
    validate::require_non_empty("email", &message.email)?;
    validate::require_non_empty("message", &message.message)?;

    let key = store
        .push(
            &StorePath::contacts(),
            serde_json::to_value(&message).expect("message serializes"),
        )
        .await?;
    info!(key = %key, "contact message stored");
    Ok(key)
}

/// All blog posts in insertion order.
pub async fn list_blogs(store: &StoreClient) -> Result<Vec<(BlogId, Blog)>> {
    let snapshot = store.read(&StorePath::blogs()).await;
    Ok(snapshot
        .decode_children()?
        .into_iter()
        .map(|(key, blog)| (BlogId::new(key), blog))
        .collect())
}

/// Build the WhatsApp feedback link for a doctor, looked up by uid.
pub async fn doctor_feedback_link(
    store: &StoreClient,
    base_url: &str,
    doctor_id: &DoctorId,
) -> Result<String> {
    let snapshot = store.read(&StorePath::doctor(doctor_id)?).await;
    if !snapshot.exists() {
        return Err(ClientError::UnknownDoctor(doctor_id.clone()));
    }
    let doctor: Doctor = snapshot.decode()?;
    Ok(notify::feedback_whatsapp_link(base_url, doctor_id, &doctor))
}
