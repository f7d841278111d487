use serde::{Deserialize, Serialize};

/// Discount codes. `discount` is a display string: a percentage ("15%")
/// or an absolute amount ("$10", "₹100").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromoCode {
    pub id: String,
    pub code: String,
    pub discount: String,
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
pub struct NewPromoCode {
    pub code: String,
    pub discount: String,
}
