//! Price and discount arithmetic.
//!
//! Service prices and promo discounts are stored as display strings
//! ("$250", "₹1,500", "10%"), so everything here starts by digging the
//! number out of the text. A string we cannot read is treated as "no
//! price" or "no discount" rather than an error.

use crate::errors::AppError;
use crate::models::{Booking, PromoCode, ServiceItem};
use crate::store::{collections, DocStore};

/// Numeric value of a price string, ignoring currency symbols and
/// thousands separators. `None` when no usable number remains.
pub fn parse_price(text: &str) -> Option<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Leading numeric value of a discount string: skips any non-numeric
/// prefix ("₹100" reads as 100, "SAVE10" as 10) and stops at the first
/// character that is not part of the number.
fn parse_leading_number(text: &str) -> Option<f64> {
    let start = text.find(|c: char| c.is_ascii_digit() || c == '.')?;
    let tail = &text[start..];
    let end = tail
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(tail.len());
    tail[..end].parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Apply a discount string to a price. A percent sign anywhere in the
/// string makes it a percentage, otherwise the number is an absolute
/// amount. Unreadable discounts leave the price unchanged, and the
/// result never drops below zero.
pub fn apply_discount(price: f64, discount: &str) -> f64 {
    let Some(amount) = parse_leading_number(discount) else {
        return price;
    };
    let discounted = if discount.contains('%') {
        price - price * amount / 100.0
    } else {
        price - amount
    };
    discounted.max(0.0)
}

/// Two-decimal rounding for presentation. Stored amounts stay unrounded.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Final price for a booking: the price of the service it names, less
/// its promo discount if the code exists. `Ok(None)` when the service is
/// gone or its price is not a number; an unknown promo code is ignored.
pub fn resolve_final_price(store: &DocStore, booking: &Booking) -> Result<Option<f64>, AppError> {
    let Some(service) =
        store.get_one_by::<ServiceItem>(collections::SERVICES, "name", &booking.service)?
    else {
        return Ok(None);
    };
    let Some(base) = parse_price(&service.price) else {
        return Ok(None);
    };

    let final_price = match booking.promo_code.as_deref() {
        Some(code) if !code.is_empty() => {
            match store.get_one_by::<PromoCode>(collections::PROMO_CODES, "code", code)? {
                Some(promo) => apply_discount(base, &promo.discount),
                None => base,
            }
        }
        _ => base,
    };
    Ok(Some(final_price.max(0.0)))
}
