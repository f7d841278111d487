//! Booking lifecycle: creation, the confirmation handshake, completion
//! with partner credit, and cancellation.
//!
//! Allowed status moves:
//!   Pending -> Confirmed | Cancelled
//!   Confirmed -> UserConfirmed | Completed | Cancelled
//!   UserConfirmed -> Completed
//! Completed and Cancelled are terminal. Anything else is rejected, and
//! bookings are never deleted.

use serde_json::{json, Value};

use crate::errors::AppError;
use crate::models::{Booking, BookingStatus, NewBooking, PartnerStatus};
use crate::services::{customers, notifications, partners, pricing};
use crate::store::{collections, DocStore};

/// Share of the final price credited to the referring partner.
pub const COMMISSION_RATE: f64 = 0.10;

pub fn create_booking(store: &DocStore, new: NewBooking) -> Result<Booking, AppError> {
    let name = new.name.trim().to_string();
    if name.len() < 2 {
        return Err(AppError::Validation(
            "name must be at least 2 characters".to_string(),
        ));
    }
    let phone = new.phone.trim().to_string();
    if phone.len() < 10 || !phone.chars().all(|c| c.is_ascii_digit()) {
        return Err(AppError::Validation(
            "phone must be at least 10 digits".to_string(),
        ));
    }
    let service = new.service.trim().to_string();
    if service.is_empty() {
        return Err(AppError::Validation("service is required".to_string()));
    }

    customers::find_or_create(store, &phone, &name)?;

    // A referral only counts while the partner is approved; otherwise the
    // booking goes through as a plain one.
    let mut partner_id = None;
    let mut partner_contact = None;
    if let Some(contact) = new.referral.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
        match partners::resolve_by_contact(store, contact)? {
            Some(partner) if partner.status == PartnerStatus::Approved => {
                partner_id = Some(partner.id);
                partner_contact = Some(partner.contact);
            }
            _ => {
                tracing::debug!(contact, "referral did not match an approved partner");
            }
        }
    }

    let booking = Booking {
        id: String::new(),
        service,
        date: new.date,
        name,
        phone,
        notes: new.notes.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
        promo_code: new
            .promo_code
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty()),
        status: BookingStatus::Pending,
        partner_id,
        partner_contact,
        final_price: None,
        partner_earning: None,
        created_at: String::new(),
    };

    let id = store.create(collections::BOOKINGS, &booking)?;
    let stored = store
        .get::<Booking>(collections::BOOKINGS, &id)?
        .ok_or_else(|| anyhow::anyhow!("booking {id} missing after insert"))?;
    tracing::info!(booking_id = %stored.id, service = %stored.service, "booking created");
    Ok(stored)
}

pub fn get_booking(store: &DocStore, id: &str) -> Result<Booking, AppError> {
    store
        .get::<Booking>(collections::BOOKINGS, id)?
        .ok_or_else(|| AppError::NotFound(format!("booking {id}")))
}

/// All bookings, newest first, optionally narrowed to one status.
pub fn list_bookings(
    store: &DocStore,
    status: Option<BookingStatus>,
) -> Result<Vec<Booking>, AppError> {
    let mut bookings: Vec<Booking> = store.list(collections::BOOKINGS)?;
    if let Some(status) = status {
        bookings.retain(|b| b.status == status);
    }
    bookings.reverse();
    Ok(bookings)
}

/// Bookings made under a phone number, newest first.
pub fn bookings_for_phone(store: &DocStore, phone: &str) -> Result<Vec<Booking>, AppError> {
    let mut bookings: Vec<Booking> = store.list(collections::BOOKINGS)?;
    bookings.retain(|b| b.phone == phone);
    bookings.reverse();
    Ok(bookings)
}

/// Admin accepts a pending booking and leaves the customer a notice
/// pointing at the confirmation page.
pub fn confirm_booking(store: &DocStore, id: &str) -> Result<Booking, AppError> {
    let booking = get_booking(store, id)?;
    if booking.status != BookingStatus::Pending {
        return Err(AppError::InvalidTransition {
            from: booking.status,
            to: BookingStatus::Confirmed,
        });
    }

    store.update(
        collections::BOOKINGS,
        id,
        &json!({"status": BookingStatus::Confirmed.as_str()}),
    )?;
    tracing::info!(booking_id = %id, "booking confirmed");

    let message = format!(
        "Your {} session on {} is confirmed. Review the final price and confirm.",
        booking.service,
        booking.date.format("%Y-%m-%d %H:%M"),
    );
    if let Err(e) = notifications::emit(
        store,
        "Booking Confirmed",
        &message,
        Some(format!("/booking-confirmation/{id}")),
    ) {
        tracing::warn!(booking_id = %id, error = %e, "failed to record confirmation notice");
    }

    get_booking(store, id)
}

/// Customer acknowledges a confirmed booking. The final price is fixed
/// here; if it cannot be worked out the booking stays Confirmed.
pub fn user_confirm_booking(store: &DocStore, id: &str) -> Result<Booking, AppError> {
    let booking = get_booking(store, id)?;
    if booking.status != BookingStatus::Confirmed {
        return Err(AppError::InvalidTransition {
            from: booking.status,
            to: BookingStatus::UserConfirmed,
        });
    }

    let Some(final_price) = pricing::resolve_final_price(store, &booking)? else {
        return Err(AppError::UnresolvedPrice);
    };

    store.update(
        collections::BOOKINGS,
        id,
        &json!({
            "status": BookingStatus::UserConfirmed.as_str(),
            "final_price": final_price,
        }),
    )?;
    tracing::info!(booking_id = %id, final_price, "booking confirmed by customer");
    get_booking(store, id)
}

/// Close out a booking and credit the referring partner their share.
/// The status check and the earnings increment sit in one transaction,
/// so completing twice cannot pay twice.
pub fn complete_booking(store: &DocStore, id: &str) -> Result<Booking, AppError> {
    let booking = get_booking(store, id)?;
    // Price lookup happens outside the transaction; the in-transaction
    // status guard is what keeps the credit single.
    let price = match booking.final_price {
        Some(p) => Some(p),
        None => pricing::resolve_final_price(store, &booking)?,
    };

    store.batch(|batch| {
        let Some(current) = batch.get::<Booking>(collections::BOOKINGS, id)? else {
            return Err(AppError::NotFound(format!("booking {id}")));
        };
        if !matches!(
            current.status,
            BookingStatus::Confirmed | BookingStatus::UserConfirmed
        ) {
            return Err(AppError::InvalidTransition {
                from: current.status,
                to: BookingStatus::Completed,
            });
        }

        let mut patch = serde_json::Map::new();
        patch.insert("status".into(), json!(BookingStatus::Completed.as_str()));
        if let Some(price) = price {
            patch.insert("final_price".into(), json!(price));
            if let Some(partner_id) = current.partner_id.as_deref() {
                let commission = price * COMMISSION_RATE;
                if batch.increment(collections::PARTNERS, partner_id, "earnings", commission)? {
                    patch.insert("partner_earning".into(), json!(commission));
                    tracing::info!(booking_id = %id, partner_id, commission, "partner credited");
                }
            }
        }
        batch.update(collections::BOOKINGS, id, &Value::Object(patch))?;
        Ok(())
    })?;

    tracing::info!(booking_id = %id, "booking completed");
    get_booking(store, id)
}

pub fn cancel_booking(store: &DocStore, id: &str) -> Result<Booking, AppError> {
    let booking = get_booking(store, id)?;
    if !matches!(
        booking.status,
        BookingStatus::Pending | BookingStatus::Confirmed
    ) {
        return Err(AppError::InvalidTransition {
            from: booking.status,
            to: BookingStatus::Cancelled,
        });
    }

    store.update(
        collections::BOOKINGS,
        id,
        &json!({"status": BookingStatus::Cancelled.as_str()}),
    )?;
    tracing::info!(booking_id = %id, "booking cancelled");
    get_booking(store, id)
}
