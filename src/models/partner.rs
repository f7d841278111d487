use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Partner {
    pub id: String,
    /// Contact number, the external-facing referral key.
    pub contact: String,
    pub status: PartnerStatus,
    /// Accumulated commission. Only ever grows, and only through the
    /// store's atomic increment.
    pub earnings: f64,
    pub message: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PartnerStatus {
    Pending,
    Approved,
    Rejected,
}

impl PartnerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PartnerStatus::Pending => "Pending",
            PartnerStatus::Approved => "Approved",
            PartnerStatus::Rejected => "Rejected",
        }
    }
}

impl std::fmt::Display for PartnerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
