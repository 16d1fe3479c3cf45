use serde::{Deserialize, Serialize};

/// Dashboard counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminStats {
    pub registered_regions: usize,
    pub active_regions: usize,
    pub eligible_patients: usize,
    pub pending_requests: usize,
    pub total_requests: usize,
    pub active_doctors: usize,
}
