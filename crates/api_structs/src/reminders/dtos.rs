use serde::{Deserialize, Serialize};

/// Aggregate outcome of one reminder run. The run never fails as a
/// whole, per-item failures only show up in `errors`.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummaryDTO {
    pub users_processed: usize,
    pub notifications_sent: usize,
    pub emails_sent: usize,
    pub duplicates_skipped: usize,
    pub errors: usize,
}
