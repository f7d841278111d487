use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub service: String,
    pub date: NaiveDateTime,
    pub name: String,
    pub phone: String,
    pub notes: Option<String>,
    pub promo_code: Option<String>,
    pub status: BookingStatus,
    pub partner_id: Option<String>,
    pub partner_contact: Option<String>,
    pub final_price: Option<f64>,
    pub partner_earning: Option<f64>,
    pub created_at: String,
}

/// Booking creation payload. The referral contact arrives under `ref`,
/// copied verbatim from the partner link's query parameter.
#[derive(Debug, Clone, Deserialize)]
pub struct NewBooking {
    pub service: String,
    pub date: NaiveDateTime,
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub promo_code: Option<String>,
    #[serde(default, rename = "ref")]
    pub referral: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum BookingStatus {
    Pending,
    Confirmed,
    UserConfirmed,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "Pending",
            BookingStatus::Confirmed => "Confirmed",
            BookingStatus::UserConfirmed => "UserConfirmed",
            BookingStatus::Completed => "Completed",
            BookingStatus::Cancelled => "Cancelled",
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
