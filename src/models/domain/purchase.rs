use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PurchaseStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
}

/// A row of the purchase ledger, read only to answer entitlement questions.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Purchase {
    pub user_id: String,
    pub item_id: String,
    pub status: PurchaseStatus,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Purchase {
    pub fn grants_access(&self, now: DateTime<Utc>) -> bool {
        self.status == PurchaseStatus::Completed && self.expires_at.map_or(true, |exp| exp > now)
    }
}
