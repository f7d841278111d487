//! Partner referral program: access requests, approval, and the
//! referral dashboard. Earnings are only ever moved by the booking
//! completion path, never set directly.

use serde_json::json;

use crate::errors::AppError;
use crate::models::{Booking, Partner, PartnerStatus};
use crate::store::{collections, DocStore};

fn valid_contact(contact: &str) -> bool {
    (10..=15).contains(&contact.len()) && contact.chars().all(|c| c.is_ascii_digit())
}

/// File a partner access request. One request per contact number; a
/// repeat submission is rejected whatever state the first one is in.
pub fn request_access(
    store: &DocStore,
    contact: &str,
    message: Option<String>,
) -> Result<Partner, AppError> {
    let contact = contact.trim();
    if !valid_contact(contact) {
        return Err(AppError::Validation(
            "contact must be 10 to 15 digits".to_string(),
        ));
    }
    if store
        .get_one_by::<Partner>(collections::PARTNERS, "contact", contact)?
        .is_some()
    {
        return Err(AppError::DuplicateRequest);
    }

    let partner = Partner {
        id: String::new(),
        contact: contact.to_string(),
        status: PartnerStatus::Pending,
        earnings: 0.0,
        message: message.map(|m| m.trim().to_string()).filter(|m| !m.is_empty()),
        created_at: String::new(),
    };
    let id = store.create(collections::PARTNERS, &partner)?;
    tracing::info!(partner_id = %id, "partner access requested");
    store
        .get::<Partner>(collections::PARTNERS, &id)?
        .ok_or_else(|| anyhow::anyhow!("partner {id} missing after insert").into())
}

/// Admin decision on a request. Always allowed, in any direction, and
/// may carry a note shown to the partner. Earnings are left alone.
pub fn set_status(
    store: &DocStore,
    id: &str,
    status: PartnerStatus,
    message: Option<String>,
) -> Result<Partner, AppError> {
    let mut patch = serde_json::Map::new();
    patch.insert("status".into(), json!(status.as_str()));
    if let Some(message) = message {
        patch.insert("message".into(), json!(message));
    }
    if !store.update(collections::PARTNERS, id, &serde_json::Value::Object(patch))? {
        return Err(AppError::NotFound(format!("partner {id}")));
    }
    tracing::info!(partner_id = %id, status = %status, "partner status updated");
    store
        .get::<Partner>(collections::PARTNERS, id)?
        .ok_or_else(|| AppError::NotFound(format!("partner {id}")))
}

/// Partner record for a contact number, if any. Serves both the inbound
/// referral-link check at booking time and the self-service status page.
pub fn resolve_by_contact(store: &DocStore, contact: &str) -> Result<Option<Partner>, AppError> {
    Ok(store.get_one_by(collections::PARTNERS, "contact", contact.trim())?)
}

pub fn list_partners(store: &DocStore) -> Result<Vec<Partner>, AppError> {
    let mut partners: Vec<Partner> = store.list(collections::PARTNERS)?;
    partners.reverse();
    Ok(partners)
}

/// A partner plus the bookings referred through them, newest first.
pub fn referral_dashboard(
    store: &DocStore,
    id: &str,
) -> Result<(Partner, Vec<Booking>), AppError> {
    let partner = store
        .get::<Partner>(collections::PARTNERS, id)?
        .ok_or_else(|| AppError::NotFound(format!("partner {id}")))?;

    let mut bookings: Vec<Booking> = store.list(collections::BOOKINGS)?;
    bookings.retain(|b| b.partner_id.as_deref() == Some(id));
    bookings.reverse();
    Ok((partner, bookings))
}
