use crate::shared::entity::{Entity, ID};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Per-user reminder delivery flags. The `same_day` flag also governs
/// whether overdue escalations fire at all, there is no separate
/// overdue preference.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPreferences {
    pub seven_days_before: bool,
    pub one_day_before: bool,
    pub same_day: bool,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            seven_days_before: true,
            one_day_before: true,
            same_day: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: ID,
    pub email: String,
    pub full_name: String,
    pub birthday: Option<NaiveDate>,
    pub verified: bool,
    pub active: bool,
    pub preferences: NotificationPreferences,
}

impl User {
    pub fn new(email: String, full_name: String) -> Self {
        Self {
            id: Default::default(),
            email,
            full_name,
            birthday: None,
            verified: false,
            active: true,
            preferences: Default::default(),
        }
    }
}

impl Entity for User {
    fn id(&self) -> ID {
        self.id.clone()
    }
}
