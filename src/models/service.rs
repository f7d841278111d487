use serde::{Deserialize, Serialize};

/// A bookable studio service. `name` doubles as the join key bookings
/// reference, and `price` is a display string ("$250", "₹1200") that the
/// pricing engine parses on demand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceItem {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: String,
    pub image: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
pub struct NewService {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: String,
    #[serde(default)]
    pub image: Option<String>,
}

/// Partial edit; absent fields keep their stored value.
#[derive(Debug, Default, Deserialize)]
pub struct ServiceUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
    pub image: Option<String>,
}
