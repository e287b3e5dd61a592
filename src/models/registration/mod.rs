// Registration module
// A user's registration for an event, as returned by the backend

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    #[serde(deserialize_with = "crate::models::event::string_or_number")]
    pub id: String,
    #[serde(alias = "event_id", deserialize_with = "crate::models::event::string_or_number")]
    pub event_id: String,
    #[serde(alias = "user_id", deserialize_with = "crate::models::event::string_or_number")]
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Statuses that withdraw a registration. Anything else, including no status
/// at all, counts.
const WITHDRAWN_STATUSES: [&str; 4] = ["cancelled", "canceled", "rejected", "batal"];

impl Registration {
    pub fn is_active(&self) -> bool {
        self.status.as_deref().map_or(true, |status| {
            let status = status.trim();
            !WITHDRAWN_STATUSES
                .iter()
                .any(|withdrawn| status.eq_ignore_ascii_case(withdrawn))
        })
    }
}
