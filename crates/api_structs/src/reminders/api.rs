use crate::dtos::RunSummaryDTO;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub mod trigger_contribution_reminders {
    use super::*;

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        /// Run as if today were this date. Intended for operators and
        /// tests, defaults to the current day.
        #[serde(default)]
        pub as_of: Option<NaiveDate>,
    }

    pub type APIResponse = RunSummaryDTO;
}

pub mod trigger_overdue_escalations {
    use super::*;

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        #[serde(default)]
        pub as_of: Option<NaiveDate>,
    }

    pub type APIResponse = RunSummaryDTO;
}
