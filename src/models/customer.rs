use serde::{Deserialize, Serialize};

/// Customer record, upserted on every booking submission and keyed by
/// phone number. This is the legacy identity shim: there is no account
/// system behind it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub phone: String,
    pub name: String,
    pub created_at: String,
}
