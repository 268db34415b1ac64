//! Savings goals

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Savings goal as returned by `GET /goals`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: i64,
    pub title: String,
    pub target_amount: i64,
    #[serde(default)]
    pub current_amount: i64,
    #[serde(default)]
    pub deadline: Option<NaiveDate>,
}

impl Goal {
    /// Progress towards the target in percent, capped at 100
    #[must_use]
    pub fn progress_percent(&self) -> u8 {
        if self.target_amount <= 0 {
            return 100;
        }
        let ratio = self.current_amount.max(0).saturating_mul(100) / self.target_amount;
        u8::try_from(ratio.min(100)).unwrap_or(100)
    }
}

/// Body of `POST /goals` and `PUT /goals/{id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalDraft {
    pub title: String,
    pub target_amount: i64,
    pub current_amount: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<NaiveDate>,
}
